//! Structural sanity checks over a channel configuration.
//!
//! Problems that make the config unusable are reported as errors; problems
//! that only look suspicious are warnings. Checking never fails on a
//! well-formed `Config` message: every finding becomes a diagnostic.

use configtx_core::{Config, ConfigGroup};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, UpdateError};

const ROOT_GROUP: &str = "Channel";
const ROOT_PATH: &[&str] = &[ROOT_GROUP];

/// A diagnostic attached to one element of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMessage {
    pub path: String,
    pub message: String,
}

/// The findings of a sanity check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub general_errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub element_errors: Vec<ElementMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub element_warnings: Vec<ElementMessage>,
}

impl Messages {
    /// True when there are no errors. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        self.general_errors.is_empty() && self.element_errors.is_empty()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut out =
            serde_json::to_vec_pretty(self).map_err(|e| UpdateError::Encode(e.to_string()))?;
        out.push(b'\n');
        Ok(out)
    }

    fn error(&mut self, path: String, message: impl Into<String>) {
        self.element_errors.push(ElementMessage {
            path,
            message: message.into(),
        });
    }

    fn warning(&mut self, path: String, message: impl Into<String>) {
        self.element_warnings.push(ElementMessage {
            path,
            message: message.into(),
        });
    }
}

/// Check a configuration.
pub fn check(config: &Config) -> Messages {
    let mut messages = Messages::default();

    let Some(root) = config.channel_group.as_ref() else {
        messages
            .general_errors
            .push("config has no channel group".into());
        return messages;
    };

    let checker = Checker { root };
    checker.check_group(ROOT_PATH, root, &mut messages);

    for key in ["HashingAlgorithm", "BlockDataHashingStructure"] {
        if !root.values.contains_key(key) {
            messages.warning(
                element_path("Value", ROOT_PATH),
                format!("channel is missing the {} value", key),
            );
        }
    }

    debug!(
        general_errors = messages.general_errors.len(),
        element_errors = messages.element_errors.len(),
        element_warnings = messages.element_warnings.len(),
        "sanity check complete"
    );
    messages
}

fn child<'p>(path: &[&'p str], name: &'p str) -> Vec<&'p str> {
    let mut out = path.to_vec();
    out.push(name);
    out
}

fn element_path(kind: &str, path: &[&str]) -> String {
    format!("[{}] /{}", kind, path.join("/"))
}

struct Checker<'a> {
    root: &'a ConfigGroup,
}

impl<'a> Checker<'a> {
    fn check_group(&self, path: &[&str], group: &ConfigGroup, messages: &mut Messages) {
        // A group's relative mod_policy resolves among its own policies.
        self.check_mod_policy("Group", path, path, &group.mod_policy, messages);

        for (name, value) in &group.values {
            let value_path = child(path, name);
            if name.is_empty() {
                messages.error(element_path("Value", &value_path), "empty value name");
            }
            if value.value.is_empty() {
                messages.warning(element_path("Value", &value_path), "value has no content");
            }
            self.check_mod_policy("Value", &value_path, path, &value.mod_policy, messages);
        }

        for (name, policy) in &group.policies {
            let policy_path = child(path, name);
            if name.is_empty() {
                messages.error(element_path("Policy", &policy_path), "empty policy name");
            }
            if policy.policy.is_none() {
                messages.error(element_path("Policy", &policy_path), "policy has no body");
            }
            self.check_mod_policy("Policy", &policy_path, path, &policy.mod_policy, messages);
        }

        for (name, subgroup) in &group.groups {
            let child_path = child(path, name);
            if name.is_empty() {
                messages.error(element_path("Group", &child_path), "empty group name");
            }
            self.check_group(&child_path, subgroup, messages);
        }
    }

    fn check_mod_policy(
        &self,
        kind: &str,
        element: &[&str],
        base: &[&str],
        mod_policy: &str,
        messages: &mut Messages,
    ) {
        if mod_policy.is_empty() {
            messages.warning(
                element_path(kind, element),
                "empty mod_policy, element can never be modified",
            );
            return;
        }

        if !self.policy_exists(base, mod_policy) {
            messages.error(
                element_path(kind, element),
                format!("mod_policy '{}' does not resolve to a policy", mod_policy),
            );
        }
    }

    /// Resolve a policy reference.
    ///
    /// Absolute references start with `/Channel/`; relative ones are
    /// looked up from `base` and may descend into sub-groups.
    fn policy_exists(&self, base: &[&str], reference: &str) -> bool {
        let (start, relative) = match reference.strip_prefix('/') {
            Some(absolute) => match absolute.split_once('/') {
                Some((root, rest)) if root == ROOT_GROUP => (ROOT_PATH, rest),
                _ => return false,
            },
            None => (base, reference),
        };

        let Some(mut group) = self.group_at(start) else {
            return false;
        };

        let mut segments: Vec<&str> = relative.split('/').collect();
        let Some(policy_name) = segments.pop() else {
            return false;
        };
        for segment in segments {
            match group.groups.get(segment) {
                Some(next) => group = next,
                None => return false,
            }
        }
        group.policies.contains_key(policy_name)
    }

    fn group_at(&self, path: &[&str]) -> Option<&'a ConfigGroup> {
        let (first, rest) = path.split_first()?;
        if *first != ROOT_GROUP {
            return None;
        }
        rest.iter()
            .try_fold(self.root, |group, name| group.groups.get(*name))
    }
}
