//! Core diffing engine for permission comparison.
//!
//! Provides the main entry point [`diff_models`] for comparing two permission
//! models and generating a [`DiffReport`] of all granted and revoked pairs,
//! plus streaming variants that push records through a
//! [`ChangeSink`](crate::sink::ChangeSink) as they are found.
//!
//! Iteration order is deterministic: keys in source-then-destination-novel
//! order, cylinders likewise, nested key-outer/cylinder-inner. This fixes the
//! report order across runs.

use crate::diff::{ChangeRecord, DiffError, DiffReport, DiffSummary};
use crate::model::{Cylinder, Key, PermissionModel};
use crate::sink::{ChangeSink, VecSink};

pub fn diff_models(source: &PermissionModel, destination: &PermissionModel) -> DiffReport {
    match try_diff_models(source, destination) {
        Ok(report) => report,
        Err(e) => panic!("{}", e),
    }
}

pub fn try_diff_models(
    source: &PermissionModel,
    destination: &PermissionModel,
) -> Result<DiffReport, DiffError> {
    let mut sink = VecSink::new();
    try_diff_models_streaming(source, destination, &mut sink)?;
    Ok(DiffReport::new(sink.into_records()))
}

pub fn try_diff_models_streaming<S: ChangeSink>(
    source: &PermissionModel,
    destination: &PermissionModel,
    sink: &mut S,
) -> Result<DiffSummary, DiffError> {
    sink.begin()?;

    let keys = union_keys(source, destination);
    let cylinders = union_cylinders(source, destination);

    let mut change_count = 0usize;

    for &key in &keys {
        // An ignore flag on either side suppresses the whole key.
        if source.is_key_ignored(key) || destination.is_key_ignored(key) {
            continue;
        }

        for &cylinder in &cylinders {
            if source.is_cylinder_ignored(cylinder) || destination.is_cylinder_ignored(cylinder) {
                continue;
            }

            let source_allows = source.allows(key, cylinder);
            let destination_allows = destination.allows(key, cylinder);
            if source_allows == destination_allows {
                continue;
            }

            // Report with the destination's record when it knows the entity,
            // so titles reflect the most current naming.
            let display_key = destination.canonical_key(key).unwrap_or(key);
            let display_cylinder = destination.canonical_cylinder(cylinder).unwrap_or(cylinder);

            let record = if source_allows {
                ChangeRecord::revoke(display_key, display_cylinder)
            } else {
                ChangeRecord::grant(display_key, display_cylinder)
            };

            sink.emit(record)?;
            change_count += 1;
        }
    }

    sink.finish()?;

    Ok(DiffSummary { change_count })
}

/// All of `source`'s keys in order, then any of `destination`'s keys not
/// already present by identity, in their own order.
fn union_keys<'a>(source: &'a PermissionModel, destination: &'a PermissionModel) -> Vec<&'a Key> {
    let mut union: Vec<&Key> = source.keys().collect();
    union.extend(
        destination
            .keys()
            .filter(|key| source.canonical_key(key).is_none()),
    );
    union
}

fn union_cylinders<'a>(
    source: &'a PermissionModel,
    destination: &'a PermissionModel,
) -> Vec<&'a Cylinder> {
    let mut union: Vec<&Cylinder> = source.cylinders().collect();
    union.extend(
        destination
            .cylinders()
            .filter(|cylinder| source.canonical_cylinder(cylinder).is_none()),
    );
    union
}
