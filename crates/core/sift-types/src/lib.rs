//! Core types for snapsift.
//!
//! This crate provides the foundational types used throughout the system:
//! - [`SnapshotInfo`] - Per-snapshot metadata record from the cluster
//! - [`SnapshotState`] - Enumerated completion status
//! - [`RepositoryInfo`] - Repository descriptor used for existence checks
//! - [`FilterSpec`] / [`FilterType`] - Declarative filter-chain vocabulary

pub mod config;
pub mod snapshot;

pub use config::*;
pub use snapshot::*;
