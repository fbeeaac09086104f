//! Parameter info merger.
//!
//! A parameter definition is either a full mapping (`prior`, `value`,
//! `derived`, `ref`, `proposal`, `latex`, `min`, `max`, `renames`, `drop`)
//! or a shorthand: `null`, or a bare fixed value. Layers of definitions are
//! merged left to right; incompatible fields set by a later layer clear the
//! fields they exclude.

use crate::Options;
use crate::conventions::param;
use crate::error::{ConflictSubject, ResolveError};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Expand a parameter definition to its mapping form.
///
/// A definition with none of `prior`, `value`, `derived` gets
/// `derived: default_derived`. A string `value` is computed at run time and
/// is therefore saved as derived unless the definition says otherwise.
pub fn expand_param_info(info: &Value, default_derived: bool) -> Options {
    let mut expanded = match info {
        Value::Object(map) => map.clone(),
        Value::Null => Options::new(),
        fixed => {
            let mut map = Options::new();
            map.insert(param::VALUE.to_string(), fixed.clone());
            map
        }
    };
    if ![param::PRIOR, param::VALUE, param::DERIVED]
        .iter()
        .any(|field| expanded.contains_key(*field))
    {
        expanded.insert(param::DERIVED.to_string(), Value::Bool(default_derived));
    }
    if matches!(expanded.get(param::VALUE), Some(Value::String(_)))
        && !expanded.contains_key(param::DERIVED)
    {
        expanded.insert(param::DERIVED.to_string(), Value::Bool(true));
    }
    expanded
}

/// Merge the default parameter blocks of several components.
///
/// A parameter shared by two components must be defined identically by both.
pub fn merge_default_params<'a, I>(defaults: I) -> Result<Options, ResolveError>
where
    I: IntoIterator<Item = (&'a str, &'a Options)>,
{
    let mut merged = Options::new();
    for (component, params) in defaults {
        for (name, info) in params {
            if let Some(previous) = merged.get(name) {
                if previous != info {
                    return Err(ResolveError::ConflictingDefault {
                        subject: ConflictSubject::Parameter,
                        name: name.clone(),
                        component: component.to_string(),
                        previous: previous.clone(),
                        found: info.clone(),
                    });
                }
                tracing::debug!(
                    parameter = %name,
                    component,
                    "parameter is multiply defined but consistent"
                );
            }
            merged.insert(name.clone(), info.clone());
        }
    }
    Ok(merged)
}

/// Merge ordered layers of parameter definitions into one block.
///
/// The first layer is the base and is expanded with `default_derived`; later
/// layers are expanded with `derived: true` as their default and overlay the
/// fields they set. The result is ordered by the last layer first, then by
/// each earlier layer for parameters not yet placed.
pub fn merge_params_info(layers: &[Options], default_derived: bool) -> Options {
    let Some((base, rest)) = layers.split_first() else {
        return Options::new();
    };
    let mut current: BTreeMap<&str, Options> = base
        .iter()
        .map(|(name, info)| (name.as_str(), expand_param_info(info, default_derived)))
        .collect();

    for layer in rest {
        for (name, info) in layer {
            let update = expand_param_info(info, true);
            let existing = current.entry(name.as_str()).or_default();
            existing.extend(update.iter().map(|(k, v)| (k.clone(), v.clone())));
            for (field, excluded) in param::INCOMPATIBLE {
                if update.contains_key(*field) {
                    for cleared in *excluded {
                        existing.shift_remove(*cleared);
                    }
                }
            }
        }
    }

    let mut placed = BTreeSet::new();
    let mut merged = Options::new();
    for name in layers.iter().rev().flat_map(Options::keys) {
        if !placed.insert(name.as_str()) {
            continue;
        }
        if let Some(info) = current.remove(name.as_str()) {
            merged.insert(name.clone(), Value::Object(info));
        }
    }
    merged
}
