//! The snapshot registry: the mutable working set every filter reduces.

use anyhow::anyhow;
use serde_json::Value;
use sift_error::{Result, SiftError};
use sift_traits::SnapshotSource;
use sift_types::{FilterSpec, FilterType, SnapshotInfo};
use std::collections::HashMap;
use tracing::debug;

use crate::age::AgeSource;
use crate::filter::{AgeFilter, PatternFilter, PatternKind, SnapshotFilter, StateFilter};
use crate::timestring::Timestring;

/// The working set of snapshots for one repository, built from one fetch.
///
/// Construction performs the only I/O (through [`SnapshotSource`]); every
/// filter afterwards is an in-memory reduction under exclusive `&mut`
/// access. Filters only remove entries — the working set is always a subset
/// of the original fetch, preserved in [`full_identifiers`].
///
/// The registry makes no ordering guarantee; callers needing determinism
/// sort the identifiers themselves. Callers needing multiple filtered views
/// of the same fetch clone the registry before branching.
///
/// [`full_identifiers`]: SnapshotRegistry::full_identifiers
#[derive(Debug, Clone)]
pub struct SnapshotRegistry {
    repository: String,
    working: HashMap<String, SnapshotInfo>,
    full: Vec<String>,
}

impl SnapshotRegistry {
    /// Build a registry by fetching the named repository's snapshot listing.
    ///
    /// # Errors
    ///
    /// - [`SiftError::MissingArgument`] when `repository` is empty (checked
    ///   before any fetch).
    /// - [`SiftError::FailedExecution`] when either fetch call fails or the
    ///   named repository does not exist.
    pub fn from_source(source: &dyn SnapshotSource, repository: &str) -> Result<Self> {
        if repository.trim().is_empty() {
            return Err(SiftError::MissingArgument("repository".to_string()));
        }

        let repositories = source.repositories().map_err(SiftError::FailedExecution)?;
        if !repositories.contains_key(repository) {
            return Err(SiftError::FailedExecution(anyhow!(
                "repository '{repository}' does not exist"
            )));
        }

        let listing = source.snapshots(repository).map_err(SiftError::FailedExecution)?;

        let mut working = HashMap::with_capacity(listing.len());
        for snapshot in listing {
            // Duplicate names collapse to one record
            working.insert(snapshot.name.clone(), snapshot);
        }
        let full: Vec<String> = working.keys().cloned().collect();

        debug!(
            repository,
            snapshots = full.len(),
            "Built snapshot registry"
        );

        Ok(Self {
            repository: repository.to_string(),
            working,
            full,
        })
    }

    /// The repository this registry was built from.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Number of snapshots still in the working set.
    pub fn len(&self) -> usize {
        self.working.len()
    }

    /// Whether the working set is empty.
    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    /// The surviving identifiers, in no particular order.
    pub fn working_identifiers(&self) -> Vec<String> {
        self.working.keys().cloned().collect()
    }

    /// Every identifier from the original fetch, the ceiling for all
    /// filtering.
    pub fn full_identifiers(&self) -> &[String] {
        &self.full
    }

    /// The metadata record for a working-set member.
    pub fn snapshot_info(&self, name: &str) -> Option<&SnapshotInfo> {
        self.working.get(name)
    }

    /// Fail with [`SiftError::NoSnapshots`] when the working set is empty.
    pub fn assert_nonempty(&self) -> Result<()> {
        if self.working.is_empty() {
            return Err(SiftError::NoSnapshots);
        }
        Ok(())
    }

    /// Apply a validated filter to every surviving record.
    fn apply(&mut self, filter: &dyn SnapshotFilter) {
        let before = self.working.len();
        self.working.retain(|_, info| filter.keep(info));
        debug!(
            filter = %filter.description(),
            before,
            after = self.working.len(),
            "Applied filter"
        );
    }

    /// Remove snapshots whose reported state does not equal `state`
    /// (or does, with `exclude`).
    pub fn filter_by_state(&mut self, state: &str, exclude: bool) -> Result<()> {
        let filter = StateFilter::new(state, exclude)?;
        self.apply(&filter);
        Ok(())
    }

    /// Remove snapshots whose name does not match the pattern
    /// (or does, with `exclude`).
    ///
    /// `value` is a raw configuration scalar; see
    /// [`crate::filter::coerce_pattern_value`] for the coercion rules.
    pub fn filter_by_regex(&mut self, kind: &str, value: &Value, exclude: bool) -> Result<()> {
        let kind = kind.parse::<PatternKind>()?;
        let filter = PatternFilter::new(kind, value, exclude)?;
        self.apply(&filter);
        Ok(())
    }

    /// Recompute every record's name-derived age against a timestring.
    ///
    /// Records whose name does not contain the pattern get `None`. Runs on
    /// every name-sourced age filter pass; never cached across calls.
    pub fn resolve_name_ages(&mut self, timestring: &str) -> Result<()> {
        let timestring = Timestring::new(timestring)?;
        for info in self.working.values_mut() {
            info.age_by_name = timestring.parse_epoch(&info.name);
        }
        Ok(())
    }

    /// Remove snapshots on the wrong side of an age threshold.
    ///
    /// Parameters mirror the declarative filter: `source` defaults to
    /// `creation_date`, `unit` to `days`; `direction` is required; `epoch`
    /// overrides the wall clock as the reference point. Snapshots with an
    /// unresolvable age are removed regardless of direction.
    pub fn filter_by_age(
        &mut self,
        source: Option<&str>,
        direction: Option<&str>,
        timestring: Option<&str>,
        unit: Option<&str>,
        unit_count: i64,
        epoch: Option<i64>,
    ) -> Result<()> {
        let filter = AgeFilter::new(source, direction, timestring, unit, unit_count, epoch)?;

        if filter.source() == AgeSource::Name {
            for info in self.working.values_mut() {
                info.age_by_name = filter.resolve(info);
            }
        }

        self.apply(&filter);
        Ok(())
    }

    /// Apply a declarative filter chain.
    ///
    /// The whole chain is validated structurally first, so a malformed entry
    /// anywhere leaves the working set untouched. Validated entries run
    /// strictly in sequence; a filter that empties the working set does not
    /// stop the chain. Parameter-level errors surface at the offending
    /// entry's turn and propagate unchanged.
    pub fn iterate_filters(&mut self, config: &Value) -> Result<()> {
        let chain = FilterSpec::parse_chain(config)?;
        debug!(filters = chain.len(), "Applying filter chain");

        for spec in &chain {
            self.apply_spec(spec)?;
        }
        Ok(())
    }

    /// Apply one validated chain entry.
    fn apply_spec(&mut self, spec: &FilterSpec) -> Result<()> {
        match spec.filtertype {
            FilterType::None => Ok(()),
            FilterType::State => {
                let state = spec
                    .str_param("state")?
                    .ok_or_else(|| SiftError::MissingArgument("state".to_string()))?
                    .to_string();
                let exclude = spec.bool_param("exclude")?;
                self.filter_by_state(&state, exclude)
            }
            FilterType::Pattern => {
                let kind = spec
                    .str_param("kind")?
                    .ok_or_else(|| SiftError::MissingArgument("kind".to_string()))?
                    .to_string();
                let null = Value::Null;
                let value = spec.raw_param("value").unwrap_or(&null).clone();
                let exclude = spec.bool_param("exclude")?;
                self.filter_by_regex(&kind, &value, exclude)
            }
            FilterType::Age => {
                let source = spec.str_param("source")?.map(str::to_string);
                let direction = spec.str_param("direction")?.map(str::to_string);
                let timestring = spec.str_param("timestring")?.map(str::to_string);
                let unit = spec.str_param("unit")?.map(str::to_string);
                let unit_count = spec.int_param("unit_count")?.unwrap_or(0);
                let epoch = spec.int_param("epoch")?;
                self.filter_by_age(
                    source.as_deref(),
                    direction.as_deref(),
                    timestring.as_deref(),
                    unit.as_deref(),
                    unit_count,
                    epoch,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sift_types::{RepositoryInfo, SnapshotState};

    /// In-memory snapshot source for tests.
    struct StubSource {
        repositories: HashMap<String, RepositoryInfo>,
        snapshots: Vec<SnapshotInfo>,
        fail_listing: bool,
    }

    impl StubSource {
        fn new(snapshots: Vec<SnapshotInfo>) -> Self {
            let mut repositories = HashMap::new();
            repositories.insert("test_repository".to_string(), RepositoryInfo::new("fs"));
            Self {
                repositories,
                snapshots,
                fail_listing: false,
            }
        }
    }

    impl SnapshotSource for StubSource {
        fn repositories(&self) -> anyhow::Result<HashMap<String, RepositoryInfo>> {
            Ok(self.repositories.clone())
        }

        fn snapshots(&self, _repository: &str) -> anyhow::Result<Vec<SnapshotInfo>> {
            if self.fail_listing {
                anyhow::bail!("simulated listing failure");
            }
            Ok(self.snapshots.clone())
        }
    }

    fn two_snapshots() -> Vec<SnapshotInfo> {
        vec![
            SnapshotInfo::new("snap_name")
                .with_state(SnapshotState::Success)
                .with_start_time(1_422_748_800),
            SnapshotInfo::new("snapshot-2015.03.01")
                .with_state(SnapshotState::Success)
                .with_start_time(1_425_168_002),
        ]
    }

    fn registry() -> SnapshotRegistry {
        let source = StubSource::new(two_snapshots());
        SnapshotRegistry::from_source(&source, "test_repository").unwrap()
    }

    fn sorted_working(reg: &SnapshotRegistry) -> Vec<String> {
        let mut names = reg.working_identifiers();
        names.sort();
        names
    }

    #[test]
    fn test_build_populates_full_and_working_sets() {
        let reg = registry();

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.full_identifiers().len(), 2);
        assert_eq!(
            sorted_working(&reg),
            vec!["snap_name", "snapshot-2015.03.01"]
        );
        assert_eq!(reg.repository(), "test_repository");
    }

    #[test]
    fn test_build_rejects_empty_repository() {
        let source = StubSource::new(two_snapshots());
        let result = SnapshotRegistry::from_source(&source, "");
        assert!(matches!(result, Err(SiftError::MissingArgument(_))));
    }

    #[test]
    fn test_build_rejects_unknown_repository() {
        let source = StubSource::new(two_snapshots());
        let result = SnapshotRegistry::from_source(&source, "no_such_repository");
        assert!(matches!(result, Err(SiftError::FailedExecution(_))));
    }

    #[test]
    fn test_build_wraps_listing_failure() {
        let mut source = StubSource::new(two_snapshots());
        source.fail_listing = true;
        let result = SnapshotRegistry::from_source(&source, "test_repository");
        assert!(matches!(result, Err(SiftError::FailedExecution(_))));
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let source = StubSource::new(vec![
            SnapshotInfo::new("snap_name"),
            SnapshotInfo::new("snap_name").with_state(SnapshotState::Partial),
        ]);
        let reg = SnapshotRegistry::from_source(&source, "test_repository").unwrap();

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.full_identifiers().len(), 1);
    }

    #[test]
    fn test_assert_nonempty() {
        let mut reg = registry();
        assert!(reg.assert_nonempty().is_ok());

        reg.filter_by_regex("prefix", &json!("nothing-matches"), false)
            .unwrap();
        assert!(matches!(reg.assert_nonempty(), Err(SiftError::NoSnapshots)));
    }

    #[test]
    fn test_filters_only_remove() {
        let mut reg = registry();
        let full: Vec<String> = reg.full_identifiers().to_vec();

        reg.filter_by_state("SUCCESS", false).unwrap();
        for name in reg.working_identifiers() {
            assert!(full.contains(&name));
        }
        assert_eq!(reg.full_identifiers().len(), 2);
    }

    #[test]
    fn test_filter_idempotent_on_survivors() {
        let mut reg = registry();

        reg.filter_by_regex("prefix", &json!("snap_"), false).unwrap();
        let once = sorted_working(&reg);

        reg.filter_by_regex("prefix", &json!("snap_"), false).unwrap();
        assert_eq!(sorted_working(&reg), once);
    }

    #[test]
    fn test_failed_filter_leaves_working_set_untouched() {
        let mut reg = registry();

        let result = reg.filter_by_regex("prefix", &Value::Null, false);
        assert!(matches!(result, Err(SiftError::InvalidValue(_))));
        assert_eq!(reg.len(), 2);

        let result = reg.filter_by_state("invalid", false);
        assert!(matches!(result, Err(SiftError::InvalidValue(_))));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_resolve_name_ages() {
        let mut reg = registry();
        reg.resolve_name_ages("%Y.%m.%d").unwrap();

        assert_eq!(
            reg.snapshot_info("snapshot-2015.03.01").unwrap().age_by_name,
            Some(1_425_168_000)
        );
        assert_eq!(reg.snapshot_info("snap_name").unwrap().age_by_name, None);
    }

    #[test]
    fn test_filter_by_age_stamps_name_ages() {
        let mut reg = registry();
        reg.filter_by_age(
            Some("name"),
            Some("older"),
            Some("%Y.%m.%d"),
            Some("days"),
            1,
            None,
        )
        .unwrap();

        assert_eq!(reg.working_identifiers(), vec!["snapshot-2015.03.01"]);
        assert_eq!(
            reg.snapshot_info("snapshot-2015.03.01").unwrap().age_by_name,
            Some(1_425_168_000)
        );
    }

    #[test]
    fn test_clone_branches_independently() {
        let reg = registry();
        let mut branch = reg.clone();

        branch
            .filter_by_regex("prefix", &json!("snap_"), false)
            .unwrap();

        assert_eq!(branch.len(), 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_iterate_filters_empty_config_is_noop() {
        let mut reg = registry();
        reg.iterate_filters(&json!({})).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_iterate_filters_none_sentinel_is_noop() {
        let mut reg = registry();
        reg.iterate_filters(&json!({ "filters": [ { "filtertype": "none" } ] }))
            .unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_iterate_filters_malformed_entry_does_not_mutate() {
        let mut reg = registry();

        // A valid first entry followed by a malformed one: structural
        // validation happens before anything runs
        let config = json!({
            "filters": [
                { "filtertype": "pattern", "kind": "prefix", "value": "snapshot-" },
                { "filtertype": 12345.6789 },
            ]
        });

        let result = reg.iterate_filters(&config);
        assert!(matches!(result, Err(SiftError::Configuration(_))));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_iterate_filters_sequences_entries() {
        let mut reg = registry();

        let config = json!({
            "filters": [
                { "filtertype": "pattern", "kind": "prefix", "value": "snap" },
                { "filtertype": "pattern", "kind": "timestring", "value": "%Y.%m.%d" },
            ]
        });
        reg.iterate_filters(&config).unwrap();

        assert_eq!(reg.working_identifiers(), vec!["snapshot-2015.03.01"]);
    }

    #[test]
    fn test_iterate_filters_empty_set_does_not_stop_chain() {
        let mut reg = registry();

        let config = json!({
            "filters": [
                { "filtertype": "pattern", "kind": "prefix", "value": "sna", "exclude": true },
                { "filtertype": "state", "state": "SUCCESS" },
            ]
        });
        reg.iterate_filters(&config).unwrap();

        assert!(reg.is_empty());
    }

    #[test]
    fn test_iterate_filters_parameter_error_propagates() {
        let mut reg = registry();

        let config = json!({
            "filters": [ { "filtertype": "age", "unit": "days", "unit_count": 1 } ]
        });
        let result = reg.iterate_filters(&config);

        assert!(matches!(result, Err(SiftError::MissingArgument(_))));
    }
}
