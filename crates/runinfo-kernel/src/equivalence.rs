//! Equivalence checker: may a run resolved as `old` be resumed as `new`?
//!
//! Strict comparison requires identical blocks, member order and values.
//! Relaxed comparison skips run-control options and anything that cannot
//! change a posterior: member order, parameter presentation fields,
//! input/output parameter lists, and the options a component lets the new
//! run override at resume. Options the old run keeps at resume are still
//! compared.

use crate::Options;
use crate::conventions::{Kind, option, param, root};
use crate::error::ResolveError;
use crate::params::expand_param_info;
use crate::registry::Registry;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// How two infos are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalencePolicy {
    pub strict: bool,
    /// Top-level keys skipped entirely, in addition to the run-control keys
    /// skipped in relaxed mode.
    pub ignore_blocks: BTreeSet<String>,
}

impl EquivalencePolicy {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ignore_blocks: BTreeSet::new(),
        }
    }

    pub fn relaxed() -> Self {
        Self {
            strict: false,
            ignore_blocks: BTreeSet::new(),
        }
    }

    pub fn ignoring(mut self, block: impl Into<String>) -> Self {
        self.ignore_blocks.insert(block.into());
        self
    }

    fn ignores_root(&self, key: &str) -> bool {
        self.ignore_blocks.contains(key) || (!self.strict && root::RUN_CONTROL.contains(&key))
    }
}

/// The first difference found between two infos.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoMismatch {
    /// The sets of non-null top-level keys differ.
    RootKeys { old: Vec<String>, new: Vec<String> },
    /// A top-level non-mapping option differs.
    RootOption { key: String },
    /// A block names different members, or the same ones in another order.
    Members {
        block: String,
        old: Vec<String>,
        new: Vec<String>,
    },
    /// A member's options differ. Only the differing keys are kept.
    Content {
        block: String,
        member: String,
        old: Value,
        new: Value,
    },
}

impl fmt::Display for InfoMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootKeys { old, new } => write!(
                f,
                "different blocks or options: {old:?} (old) vs {new:?} (new)"
            ),
            Self::RootOption { key } => write!(f, "different option '{key}'"),
            Self::Members { block, old, new } => write!(
                f,
                "different [{block}] or different order of them: {old:?} vs {new:?}"
            ),
            Self::Content { block, member, .. } => {
                write!(f, "different content of [{block}:{member}]")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Equivalence {
    Equal,
    Different(InfoMismatch),
}

impl Equivalence {
    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }
}

/// Compare `old` against `new` under `policy`.
///
/// Content differences are a normal [`Equivalence::Different`]; only a
/// non-mapping info or a failed registry lookup is an error.
pub fn compare_info(
    old: &Value,
    new: &Value,
    policy: &EquivalencePolicy,
    registry: &dyn Registry,
) -> Result<Equivalence, ResolveError> {
    let (Value::Object(old), Value::Object(new)) = (old, new) else {
        return Err(ResolveError::NotAMapping {
            what: "compared info".to_string(),
        });
    };

    let present = |info: &Options| -> BTreeSet<String> {
        info.iter()
            .filter(|(key, value)| !value.is_null() && !policy.ignores_root(key))
            .map(|(key, _)| key.clone())
            .collect()
    };
    if present(old) != present(new) {
        let listed = |info: &Options| -> Vec<String> {
            info.keys()
                .filter(|key| !policy.ignores_root(key))
                .cloned()
                .collect()
        };
        return Ok(Equivalence::Different(InfoMismatch::RootKeys {
            old: listed(old),
            new: listed(new),
        }));
    }

    for (block_name, old_block) in old {
        if policy.ignores_root(block_name) {
            continue;
        }
        let Some(new_block) = new.get(block_name) else {
            continue;
        };
        let (Value::Object(old_block), Value::Object(new_block)) = (old_block, new_block) else {
            if old_block != new_block {
                return Ok(Equivalence::Different(InfoMismatch::RootOption {
                    key: block_name.clone(),
                }));
            }
            continue;
        };
        if let Some(mismatch) = compare_block(block_name, old_block, new_block, policy, registry)? {
            return Ok(Equivalence::Different(mismatch));
        }
    }
    Ok(Equivalence::Equal)
}

fn compare_block(
    block_name: &str,
    old_block: &Options,
    new_block: &Options,
    policy: &EquivalencePolicy,
    registry: &dyn Registry,
) -> Result<Option<InfoMismatch>, ResolveError> {
    let old_members: Vec<String> = old_block.keys().cloned().collect();
    let new_members: Vec<String> = new_block.keys().cloned().collect();
    let same_members = if policy.strict {
        old_members == new_members
    } else {
        old_members.iter().collect::<BTreeSet<_>>() == new_members.iter().collect::<BTreeSet<_>>()
    };
    if !same_members {
        return Ok(Some(InfoMismatch::Members {
            block: block_name.to_string(),
            old: old_members,
            new: new_members,
        }));
    }

    let kind = Kind::from_block(block_name);
    for (member, old_value) in old_block {
        let mut old_value = old_value.clone();
        let mut new_value = new_block.get(member).cloned().unwrap_or(Value::Null);
        if !policy.strict {
            if block_name == root::PARAMS {
                old_value = relaxed_param(&old_value);
                new_value = relaxed_param(&new_value);
            } else if let Some(kind) = kind {
                let ignored = ignored_component_options(kind, member, &old_value, registry)?;
                for value in [&mut old_value, &mut new_value] {
                    if let Value::Object(options) = value {
                        options.retain(|key, _| !ignored.contains(key));
                    }
                }
            }
        }
        if old_value != new_value {
            let (old_value, new_value) = differing_keys(old_value, new_value);
            return Ok(Some(InfoMismatch::Content {
                block: block_name.to_string(),
                member: member.clone(),
                old: old_value,
                new: new_value,
            }));
        }
    }
    Ok(None)
}

/// A parameter in comparable form: expanded, presentation fields dropped,
/// and `derived` dropped when the value is pinned.
fn relaxed_param(info: &Value) -> Value {
    let mut expanded = expand_param_info(info, true);
    if expanded.contains_key(param::VALUE) {
        expanded.shift_remove(param::DERIVED);
    }
    expanded.retain(|field, _| !param::COSMETIC.contains(&field.as_str()));
    Value::Object(expanded)
}

/// Options of one component that relaxed comparison skips.
fn ignored_component_options(
    kind: Kind,
    name: &str,
    options: &Value,
    registry: &dyn Registry,
) -> Result<BTreeSet<String>, ResolveError> {
    let mut ignored: BTreeSet<String> = BTreeSet::from([option::COMPONENT_PATH.to_string()]);
    if kind.declares_renames() {
        ignored.insert(option::INPUT_PARAMS.to_string());
        ignored.insert(option::OUTPUT_PARAMS.to_string());
    }
    let options = options.as_object();
    if options.is_some_and(|o| o.contains_key(option::EXTERNAL)) {
        return Ok(ignored);
    }
    let lookup = |key: &str| options.and_then(|o| o.get(key)).and_then(Value::as_str);
    let class = registry.resolve_class(
        name,
        kind,
        lookup(option::COMPONENT_PATH),
        lookup(option::CLASS_NAME),
    )?;
    ignored.extend(class.resume_prefer_new());
    Ok(ignored)
}

/// Drop the keys both sides agree on, for a readable diff.
fn differing_keys(old: Value, new: Value) -> (Value, Value) {
    match (old, new) {
        (Value::Object(mut old), Value::Object(mut new)) => {
            let equal: Vec<String> = old
                .iter()
                .filter(|(key, value)| new.get(*key) == Some(*value))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &equal {
                old.shift_remove(key);
                new.shift_remove(key);
            }
            (Value::Object(old), Value::Object(new))
        }
        pair => pair,
    }
}

fn mismatch_notice(mismatch: &InfoMismatch) -> String {
    format!("{mismatch} (the differing options are logged at debug level)")
}

/// Whether `old` and `new` are equivalent, logging the first difference.
pub fn is_equal(
    old: &Value,
    new: &Value,
    strict: bool,
    registry: &dyn Registry,
) -> Result<bool, ResolveError> {
    let policy = if strict {
        EquivalencePolicy::strict()
    } else {
        EquivalencePolicy::relaxed()
    };
    match compare_info(old, new, &policy, registry)? {
        Equivalence::Equal => Ok(true),
        Equivalence::Different(mismatch) => {
            tracing::info!("{}", mismatch_notice(&mismatch));
            if let InfoMismatch::Content { old, new, .. } = &mismatch {
                tracing::debug!(%old, %new, "differing options (old vs new)");
            }
            Ok(false)
        }
    }
}
