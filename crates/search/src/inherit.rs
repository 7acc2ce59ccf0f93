//! Entity inheritance merge
//!
//! An event inherits part of its parent work's document. Each inherited
//! field has a policy:
//! - `Overwrite`: the parent's key replaces the child's key
//! - `Merge`: parent values then child values, first occurrence kept
//! - `Append`: child values then parent values, repeats kept
//!
//! Fields without a rule are never copied. A rule on `topic` also covers
//! every key derived from it (`topic-subject`, `topic-subject-hierarchy`).
//! Hierarchy keys (`topic-subject-hierarchy`) can be given their own policy.

use crate::document::{append_all, merge_unique, FieldData, IndexDocument};
use indexmap::IndexMap;

const HIERARCHY_SUFFIX: &str = "-hierarchy";

/// How a parent key combines with the child's key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Parent data replaces child data
    Overwrite,
    /// Union of parent and child values, parent first
    Merge,
    /// Child values followed by parent values
    Append,
}

/// Policy of one inherited field and its derived keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule {
    /// Policy applied to the field and its derived keys
    pub policy: MergePolicy,
    /// Policy of the field's hierarchy keys, when it differs
    pub hierarchy: Option<MergePolicy>,
}

impl MergeRule {
    /// Policy of a key derived from `field`, None when not covered
    fn policy_for(&self, field: &str, key: &str) -> Option<MergePolicy> {
        match key.strip_prefix(field) {
            Some("") => Some(self.policy),
            Some(rest) if rest.starts_with('-') => {
                let hierarchy = rest.len() > HIERARCHY_SUFFIX.len()
                    && rest.ends_with(HIERARCHY_SUFFIX);
                match self.hierarchy {
                    Some(policy) if hierarchy => Some(policy),
                    _ => Some(self.policy),
                }
            }
            _ => None,
        }
    }
}

/// Set of inherited fields, keyed by base field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeRules {
    rules: IndexMap<String, MergeRule>,
}

impl MergeRules {
    /// No inherited field
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rule of a field
    pub fn with(mut self, field: &str, policy: MergePolicy) -> Self {
        self.rules.insert(
            field.to_string(),
            MergeRule {
                policy,
                hierarchy: None,
            },
        );
        self
    }

    /// Add (or replace) a field rule whose hierarchy keys follow `hierarchy`
    pub fn with_hierarchy(
        mut self,
        field: &str,
        policy: MergePolicy,
        hierarchy: MergePolicy,
    ) -> Self {
        self.rules.insert(
            field.to_string(),
            MergeRule {
                policy,
                hierarchy: Some(hierarchy),
            },
        );
        self
    }

    /// What an event takes from its work
    ///
    /// Actors are replaced. The work's topics follow the event's own, and
    /// topic hierarchies are unioned with the work's paths first.
    pub fn event_from_work() -> Self {
        MergeRules::new()
            .with("organization", MergePolicy::Overwrite)
            .with("person", MergePolicy::Overwrite)
            .with_hierarchy("topic", MergePolicy::Append, MergePolicy::Merge)
    }

    /// Policy of a document key, None when the key is not inherited
    pub fn policy_for(&self, key: &str) -> Option<MergePolicy> {
        self.rules
            .iter()
            .find_map(|(field, rule)| rule.policy_for(field, key))
    }
}

/// Merge the inherited keys of `parent` into `child`
///
/// Keys the rules do not cover are left alone on both sides. Keys present in
/// the child only are kept as they are. Nested data is only ever replaced.
pub fn merge(child: &mut IndexDocument, parent: &IndexDocument, rules: &MergeRules) {
    for (key, data) in parent.iter() {
        let Some(policy) = rules.policy_for(key) else {
            continue;
        };
        if policy == MergePolicy::Overwrite {
            child.set(key, data.clone());
            continue;
        }
        if let FieldData::Nested(_) = data {
            continue;
        }
        let combined = match policy {
            MergePolicy::Append => append_all(child.values(key), data.values()),
            _ => merge_unique(data.values(), child.values(key)),
        };
        child.set_list(key, combined);
    }
}
