//! Canonical permission model.
//!
//! This module defines the format-independent representation both extractors
//! produce:
//! - [`Key`]: A credential (transponder) that may open cylinders
//! - [`Cylinder`]: A lock unit
//! - [`PermissionModel`]: Deduplicated keys and cylinders plus the
//!   allow-relation between them
//!
//! Identity is the `id` string alone: two records sharing an id are the same
//! entity no matter how their display fields differ. The model keeps the
//! first record seen for each id as the canonical instance and preserves
//! insertion order, which later fixes the diff report order.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A credential that may be granted access to cylinders.
///
/// Equality and hashing intentionally ignore every field but `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    pub id: String,
    /// Preferred display name; when absent the title is composed from
    /// `last_name`/`first_name`.
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub group: Option<String>,
    /// Excludes the key from diff consideration when set in either model.
    pub ignore: bool,
}

impl Key {
    pub fn new(id: impl Into<String>) -> Key {
        Key {
            id: id.into(),
            name: None,
            last_name: None,
            first_name: None,
            group: None,
            ignore: false,
        }
    }

    /// The human-readable label used in change reports.
    ///
    /// `name` wins when present; otherwise last and first name compose as
    /// `"Last, First"` with absent parts omitted. A present `group` is
    /// appended as `" (group)"` in both cases. An entirely empty composition
    /// falls back to the id.
    pub fn title(&self) -> String {
        let base = match &self.name {
            Some(name) => name.clone(),
            None => {
                let mut composed = self.last_name.clone().unwrap_or_default();
                if let Some(first) = &self.first_name {
                    if !composed.is_empty() {
                        composed.push_str(", ");
                    }
                    composed.push_str(first);
                }
                composed
            }
        };

        let mut title = base;
        if let Some(group) = &self.group {
            title.push_str(" (");
            title.push_str(group);
            title.push(')');
        }

        if title.is_empty() {
            self.id.clone()
        } else {
            title
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A lock unit a key may be permitted to open.
///
/// Equality and hashing intentionally ignore every field but `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cylinder {
    pub id: String,
    pub name: String,
    pub section: Option<String>,
    pub building: Option<String>,
    /// Excludes the cylinder from diff consideration when set in either model.
    pub ignore: bool,
}

impl Cylinder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Cylinder {
        Cylinder {
            id: id.into(),
            name: name.into(),
            section: None,
            building: None,
            ignore: false,
        }
    }

    /// The human-readable label used in change reports: building, section,
    /// and name joined with `", "`, absent parts omitted. An entirely empty
    /// composition falls back to the id.
    pub fn title(&self) -> String {
        let title = [
            self.building.as_deref(),
            self.section.as_deref(),
            Some(self.name.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        if title.is_empty() {
            self.id.clone()
        } else {
            title
        }
    }
}

impl PartialEq for Cylinder {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Cylinder {}

impl Hash for Cylinder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Default)]
struct PermissionSet {
    /// Cylinder ids in first-seen order, deduplicated.
    ordered: Vec<String>,
    members: FxHashSet<String>,
}

impl PermissionSet {
    fn insert(&mut self, cylinder_id: &str) {
        if self.members.insert(cylinder_id.to_string()) {
            self.ordered.push(cylinder_id.to_string());
        }
    }

    fn contains(&self, cylinder_id: &str) -> bool {
        self.members.contains(cylinder_id)
    }
}

/// Deduplicated keys, cylinders, and the allow-relation between them.
///
/// Built once per parsed source and immutable afterwards; the diff engine
/// only reads it.
#[derive(Debug, Clone, Default)]
pub struct PermissionModel {
    keys: Vec<Key>,
    cylinders: Vec<Cylinder>,
    key_index: FxHashMap<String, usize>,
    cylinder_index: FxHashMap<String, usize>,
    permissions: FxHashMap<String, PermissionSet>,
}

impl PermissionModel {
    /// Builds a model from extractor output.
    ///
    /// Keys and cylinders are deduplicated by id with the first occurrence
    /// kept as the canonical record. Permission entries referencing unknown
    /// ids are dropped, as are entries whose cylinder list filters down to
    /// nothing; a key with no permissions simply has no entry.
    pub fn new(
        keys: impl IntoIterator<Item = Key>,
        cylinders: impl IntoIterator<Item = Cylinder>,
        permissions: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> PermissionModel {
        let mut model = PermissionModel::default();

        for key in keys {
            if !model.key_index.contains_key(&key.id) {
                model.key_index.insert(key.id.clone(), model.keys.len());
                model.keys.push(key);
            }
        }

        for cylinder in cylinders {
            if !model.cylinder_index.contains_key(&cylinder.id) {
                model
                    .cylinder_index
                    .insert(cylinder.id.clone(), model.cylinders.len());
                model.cylinders.push(cylinder);
            }
        }

        for (key_id, cylinder_ids) in permissions {
            if !model.key_index.contains_key(&key_id) {
                continue;
            }

            let mut set = PermissionSet::default();
            for cylinder_id in &cylinder_ids {
                if model.cylinder_index.contains_key(cylinder_id) {
                    set.insert(cylinder_id);
                }
            }

            if !set.ordered.is_empty() {
                model.permissions.entry(key_id).or_insert(set);
            }
        }

        model
    }

    /// True iff `key` may open `cylinder` in this model. A key without any
    /// permission entry is simply not allowed, never an error.
    pub fn allows(&self, key: &Key, cylinder: &Cylinder) -> bool {
        self.permissions
            .get(&key.id)
            .is_some_and(|set| set.contains(&cylinder.id))
    }

    /// The canonical stored record sharing `key`'s identity, if any.
    pub fn canonical_key(&self, key: &Key) -> Option<&Key> {
        self.key_index.get(&key.id).map(|&i| &self.keys[i])
    }

    /// The canonical stored record sharing `cylinder`'s identity, if any.
    pub fn canonical_cylinder(&self, cylinder: &Cylinder) -> Option<&Cylinder> {
        self.cylinder_index
            .get(&cylinder.id)
            .map(|&i| &self.cylinders[i])
    }

    /// The canonical record's ignore flag, false when the key is unknown here.
    pub fn is_key_ignored(&self, key: &Key) -> bool {
        self.canonical_key(key).map(|k| k.ignore).unwrap_or(false)
    }

    /// The canonical record's ignore flag, false when the cylinder is unknown
    /// here.
    pub fn is_cylinder_ignored(&self, cylinder: &Cylinder) -> bool {
        self.canonical_cylinder(cylinder)
            .map(|c| c.ignore)
            .unwrap_or(false)
    }

    /// Canonical keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Canonical cylinders in insertion order.
    pub fn cylinders(&self) -> impl Iterator<Item = &Cylinder> {
        self.cylinders.iter()
    }

    /// The ordered cylinder ids permitted for `key`, empty when the key has
    /// no permission entry.
    pub fn permitted_cylinder_ids(&self, key: &Key) -> &[String] {
        self.permissions
            .get(&key.id)
            .map(|set| set.ordered.as_slice())
            .unwrap_or(&[])
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn cylinder_count(&self) -> usize {
        self.cylinders.len()
    }

    /// Total number of allowed (key, cylinder) pairs.
    pub fn permission_count(&self) -> usize {
        self.permissions.values().map(|set| set.ordered.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.cylinders.is_empty()
    }
}
