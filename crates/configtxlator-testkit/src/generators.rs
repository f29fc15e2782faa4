//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::collection::btree_map;
use proptest::prelude::*;

use configtx_core::{
    Config, ConfigGroup, ConfigPolicy, ConfigValue, ImplicitMetaRule, Keypair, Policy, PolicyType,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a channel id.
pub fn channel_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9.-]{0,24}".prop_map(String::from)
}

/// Generate a member name.
///
/// Names are lowercase so they never collide with the well-known value keys,
/// whose bytes must parse as a specific message.
pub fn member_name() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_map(String::from)
}

/// Generate a mod_policy reference.
pub fn mod_policy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("Admins".to_string()),
        Just("Writers".to_string()),
        Just("/Channel/Application/Admins".to_string()),
    ]
}

/// Generate a config value with opaque content.
pub fn config_value() -> impl Strategy<Value = ConfigValue> {
    (0u64..5, payload(16), mod_policy()).prop_map(|(version, value, mod_policy)| ConfigValue {
        version,
        value,
        mod_policy,
    })
}

/// Generate a policy: either an implicit-meta policy or an opaque signature policy.
pub fn policy() -> impl Strategy<Value = Policy> {
    prop_oneof![
        (
            prop_oneof![
                Just(ImplicitMetaRule::Any),
                Just(ImplicitMetaRule::All),
                Just(ImplicitMetaRule::Majority),
            ],
            prop_oneof![Just("Admins"), Just("Readers"), Just("Writers")],
        )
            .prop_map(|(rule, sub_policy)| Policy::implicit_meta(rule, sub_policy)),
        payload(16).prop_map(|value| Policy {
            r#type: PolicyType::Signature.into(),
            value,
        }),
    ]
}

/// Generate a config policy.
pub fn config_policy() -> impl Strategy<Value = ConfigPolicy> {
    (0u64..5, proptest::option::of(policy()), mod_policy()).prop_map(
        |(version, policy, mod_policy)| ConfigPolicy {
            version,
            policy,
            mod_policy,
        },
    )
}

fn leaf_group() -> impl Strategy<Value = ConfigGroup> {
    (
        0u64..5,
        btree_map(member_name(), config_value(), 0..3),
        btree_map(member_name(), config_policy(), 0..3),
        mod_policy(),
    )
        .prop_map(|(version, values, policies, mod_policy)| ConfigGroup {
            version,
            groups: BTreeMap::new(),
            values,
            policies,
            mod_policy,
        })
}

/// Generate a config group tree up to three levels deep.
pub fn config_group() -> impl Strategy<Value = ConfigGroup> {
    leaf_group().prop_recursive(3, 24, 3, |inner| {
        (leaf_group(), btree_map(member_name(), inner, 0..3)).prop_map(|(mut group, groups)| {
            group.groups = groups;
            group
        })
    })
}

/// Generate a config with a channel group.
pub fn config() -> impl Strategy<Value = Config> {
    (any::<u64>(), config_group()).prop_map(|(sequence, group)| Config {
        sequence,
        channel_group: Some(group),
    })
}

/// An original config plus an edited copy of it.
#[derive(Debug, Clone)]
pub struct ConfigPairParams {
    pub original: Config,
    pub updated: Config,
    /// Name of the value added to the updated channel group.
    pub added_value: String,
}

impl Arbitrary for ConfigPairParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (config(), config_value())
            .prop_map(|(original, value)| {
                // Uppercase, so it cannot already exist in the generated tree
                let added_value = "Added".to_string();
                let mut updated = original.clone();
                if let Some(group) = updated.channel_group.as_mut() {
                    group.values.insert(added_value.clone(), value);
                }
                ConfigPairParams {
                    original,
                    updated,
                    added_value,
                }
            })
            .boxed()
    }
}
