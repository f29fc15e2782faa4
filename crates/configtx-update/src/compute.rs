//! Read-set / write-set computation between two configurations.
//!
//! The read-set names the versions the update depends on; the write-set
//! carries the new content. Versions follow the commit rules of the
//! ordering service:
//!
//! - a modified value or policy is written at `version + 1`
//! - an added member is written at version 0
//! - a group whose membership or mod_policy changed is written at
//!   `version + 1` and lists every retained member at its current version
//! - a group with only modified members keeps its version and lists only
//!   the modified members
//!
//! Version arithmetic wraps, so an element at `u64::MAX` is written at 0.

use std::collections::BTreeMap;

use configtx_core::{Config, ConfigGroup, ConfigPolicy, ConfigUpdate, ConfigValue};
use tracing::debug;

use crate::error::{Result, UpdateError};

/// Computes the update that turns one configuration into another.
pub trait ConfigDiff: Send + Sync {
    /// Compute the delta. The returned update has no channel id set.
    fn compute(&self, original: &Config, updated: &Config) -> Result<ConfigUpdate>;
}

/// The standard read-set / write-set diff.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadWriteSetDiff;

impl ConfigDiff for ReadWriteSetDiff {
    fn compute(&self, original: &Config, updated: &Config) -> Result<ConfigUpdate> {
        let original_group = original
            .channel_group
            .as_ref()
            .ok_or(UpdateError::MissingChannelGroup("original"))?;
        let updated_group = updated
            .channel_group
            .as_ref()
            .ok_or(UpdateError::MissingChannelGroup("updated"))?;

        let delta = diff_group(original_group, updated_group);
        if !delta.changed {
            debug!("no differences between original and updated config");
            return Ok(ConfigUpdate::default());
        }

        debug!(
            read_version = delta.read.version,
            write_version = delta.write.version,
            "computed config update"
        );
        Ok(ConfigUpdate {
            read_set: Some(delta.read),
            write_set: Some(delta.write),
            ..Default::default()
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Leaf entries (values and policies)
// ────────────────────────────────────────────────────────────────────────────

trait Leaf: Clone {
    fn version(&self) -> u64;
    fn mod_policy(&self) -> &str;
    fn same_content(&self, other: &Self) -> bool;
    fn version_only(version: u64) -> Self;
    fn with_version(&self, version: u64) -> Self;
}

impl Leaf for ConfigValue {
    fn version(&self) -> u64 {
        self.version
    }

    fn mod_policy(&self) -> &str {
        &self.mod_policy
    }

    fn same_content(&self, other: &Self) -> bool {
        self.value == other.value
    }

    fn version_only(version: u64) -> Self {
        ConfigValue {
            version,
            ..Default::default()
        }
    }

    fn with_version(&self, version: u64) -> Self {
        ConfigValue {
            version,
            ..self.clone()
        }
    }
}

impl Leaf for ConfigPolicy {
    fn version(&self) -> u64 {
        self.version
    }

    fn mod_policy(&self) -> &str {
        &self.mod_policy
    }

    fn same_content(&self, other: &Self) -> bool {
        self.policy == other.policy
    }

    fn version_only(version: u64) -> Self {
        ConfigPolicy {
            version,
            ..Default::default()
        }
    }

    fn with_version(&self, version: u64) -> Self {
        ConfigPolicy {
            version,
            ..self.clone()
        }
    }
}

/// Per-map diff result.
struct MapDelta<T> {
    read: BTreeMap<String, T>,
    write: BTreeMap<String, T>,
    same: BTreeMap<String, T>,
    members_changed: bool,
}

impl<T> Default for MapDelta<T> {
    fn default() -> Self {
        Self {
            read: BTreeMap::new(),
            write: BTreeMap::new(),
            same: BTreeMap::new(),
            members_changed: false,
        }
    }
}

impl<T> MapDelta<T> {
    fn has_modifications(&self) -> bool {
        !self.read.is_empty() || !self.write.is_empty()
    }
}

fn diff_leaves<T: Leaf>(
    original: &BTreeMap<String, T>,
    updated: &BTreeMap<String, T>,
) -> MapDelta<T> {
    let mut delta = MapDelta::default();

    for (name, before) in original {
        let Some(after) = updated.get(name) else {
            delta.members_changed = true;
            continue;
        };

        if before.mod_policy() == after.mod_policy() && before.same_content(after) {
            delta.same.insert(name.clone(), T::version_only(before.version()));
        } else {
            delta
                .write
                .insert(name.clone(), after.with_version(before.version().wrapping_add(1)));
        }
    }

    for (name, after) in updated {
        if !original.contains_key(name) {
            delta.members_changed = true;
            delta.write.insert(name.clone(), after.with_version(0));
        }
    }

    delta
}

// ────────────────────────────────────────────────────────────────────────────
// Groups
// ────────────────────────────────────────────────────────────────────────────

struct GroupDelta {
    read: ConfigGroup,
    write: ConfigGroup,
    changed: bool,
}

fn diff_groups(
    original: &BTreeMap<String, ConfigGroup>,
    updated: &BTreeMap<String, ConfigGroup>,
) -> MapDelta<ConfigGroup> {
    let mut delta = MapDelta::default();

    for (name, before) in original {
        let Some(after) = updated.get(name) else {
            delta.members_changed = true;
            continue;
        };

        let child = diff_group(before, after);
        if child.changed {
            delta.read.insert(name.clone(), child.read);
            delta.write.insert(name.clone(), child.write);
        } else {
            delta.same.insert(name.clone(), child.read);
        }
    }

    for (name, after) in updated {
        if original.contains_key(name) {
            continue;
        }
        delta.members_changed = true;

        // Diffing against an empty group writes every member at version 0.
        let full = diff_group(&ConfigGroup::default(), after);
        delta.write.insert(
            name.clone(),
            ConfigGroup {
                version: 0,
                mod_policy: after.mod_policy.clone(),
                ..full.write
            },
        );
    }

    delta
}

fn diff_group(original: &ConfigGroup, updated: &ConfigGroup) -> GroupDelta {
    let mut policies = diff_leaves(&original.policies, &updated.policies);
    let mut values = diff_leaves(&original.values, &updated.values);
    let mut groups = diff_groups(&original.groups, &updated.groups);

    let structure_changed = policies.members_changed
        || values.members_changed
        || groups.members_changed
        || original.mod_policy != updated.mod_policy;

    if !structure_changed {
        if !policies.has_modifications()
            && !values.has_modifications()
            && !groups.has_modifications()
        {
            return GroupDelta {
                read: ConfigGroup::at_version(original.version),
                write: ConfigGroup::at_version(original.version),
                changed: false,
            };
        }

        return GroupDelta {
            read: ConfigGroup {
                version: original.version,
                policies: policies.read,
                values: values.read,
                groups: groups.read,
                ..Default::default()
            },
            write: ConfigGroup {
                version: original.version,
                policies: policies.write,
                values: values.write,
                groups: groups.write,
                ..Default::default()
            },
            changed: true,
        };
    }

    merge_same(&mut policies);
    merge_same(&mut values);
    merge_same(&mut groups);

    GroupDelta {
        read: ConfigGroup {
            version: original.version,
            policies: policies.read,
            values: values.read,
            groups: groups.read,
            ..Default::default()
        },
        write: ConfigGroup {
            version: original.version.wrapping_add(1),
            policies: policies.write,
            values: values.write,
            groups: groups.write,
            mod_policy: updated.mod_policy.clone(),
        },
        changed: true,
    }
}

fn merge_same<T: Clone>(delta: &mut MapDelta<T>) {
    for (name, entry) in std::mem::take(&mut delta.same) {
        delta.read.insert(name.clone(), entry.clone());
        delta.write.insert(name, entry);
    }
}
