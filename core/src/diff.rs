//! Change records and reports for permission comparison.
//!
//! This module defines the types used to represent permission differences
//! between two models:
//! - [`ChangeRecord`]: A single granted or revoked (key, cylinder) pair
//! - [`DiffReport`]: A versioned collection of change records
//! - [`DiffError`]: Errors that can occur while streaming records

use crate::error_codes;
use crate::model::{Cylinder, Key};
use thiserror::Error;

/// The direction of a permission change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The key may now open the cylinder.
    Grant,
    /// The key may no longer open the cylinder.
    Revoke,
}

/// A single permission change between the source and destination models.
///
/// Titles are rendered at emission time from the destination's canonical
/// record when it knows the entity, so reports carry the most current
/// naming; ids are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub key_title: String,
    pub key_id: String,
    pub cylinder_title: String,
    pub cylinder_id: String,
}

impl ChangeRecord {
    pub fn grant(key: &Key, cylinder: &Cylinder) -> ChangeRecord {
        ChangeRecord::build(ChangeKind::Grant, key, cylinder)
    }

    pub fn revoke(key: &Key, cylinder: &Cylinder) -> ChangeRecord {
        ChangeRecord::build(ChangeKind::Revoke, key, cylinder)
    }

    fn build(kind: ChangeKind, key: &Key, cylinder: &Cylinder) -> ChangeRecord {
        ChangeRecord {
            kind,
            key_title: key.title(),
            key_id: key.id.clone(),
            cylinder_title: cylinder.title(),
            cylinder_id: cylinder.id.clone(),
        }
    }
}

/// Errors produced by diffing APIs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiffError {
    #[error(
        "[LKDIFF_DIFF_001] sink error: {message}. Suggestion: check the output destination and retry."
    )]
    SinkError { message: String },
}

impl DiffError {
    pub fn code(&self) -> &'static str {
        match self {
            DiffError::SinkError { .. } => error_codes::DIFF_SINK_ERROR,
        }
    }
}

/// Summary metadata about a diff run emitted alongside streamed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSummary {
    /// Total number of change records emitted.
    pub change_count: usize,
}

/// A versioned collection of change records between two models.
///
/// The `version` field indicates the schema version for forwards
/// compatibility of serialized reports.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiffReport {
    /// Schema version (currently "1").
    pub version: String,
    /// Change records in deterministic report order.
    pub records: Vec<ChangeRecord>,
}

impl DiffReport {
    pub const SCHEMA_VERSION: &'static str = "1";

    pub fn new(records: Vec<ChangeRecord>) -> DiffReport {
        DiffReport {
            version: Self::SCHEMA_VERSION.to_string(),
            records,
        }
    }

    /// Total number of changes found.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
