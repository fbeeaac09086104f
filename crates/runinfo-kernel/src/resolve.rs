//! Configuration resolver: raw info in, updated info out.
//!
//! Every component named in a kind block is looked up through the
//! [`Registry`], its defaults are overlaid with the entry's options, and the
//! defaults' `params` and `prior` sub-blocks are merged into the global
//! blocks. Aggregated chi-squared parameters, auto-parameters and rename
//! groups are added last, once the final parameter names are known.

use crate::Options;
use crate::auto_params::make_auto_params;
use crate::conventions::{Kind, chi2_label, chi2_name, option, param, root};
use crate::defaults::provider_info;
use crate::entry::ComponentEntry;
use crate::error::{ConflictSubject, ResolveError, UnrecognizedOption};
use crate::params::{merge_default_params, merge_params_info};
use crate::registry::Registry;
use crate::renames::RenameGroups;
use crate::suggest::{MAX_SUGGESTIONS, fuzzy_match};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Components used by one or more infos, per kind, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsedComponents {
    names: BTreeMap<Kind, Vec<String>>,
    entries: BTreeMap<(Kind, String), Value>,
}

impl UsedComponents {
    /// Kinds with at least one component, in [`Kind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.names.keys().copied()
    }

    pub fn names(&self, kind: Kind) -> &[String] {
        self.names.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The component's raw entry, later infos overlaid on earlier ones.
    pub fn entry(&self, kind: Kind, name: &str) -> Option<&Value> {
        self.entries.get(&(kind, name.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn record(&mut self, kind: Kind, name: &str, entry: &Value) {
        let names = self.names.entry(kind).or_default();
        if !names.iter().any(|known| known == name) {
            names.push(name.to_string());
        }
        let slot = self
            .entries
            .entry((kind, name.to_string()))
            .or_insert(Value::Null);
        match (slot, entry) {
            (Value::Object(existing), Value::Object(update)) => {
                existing.extend(update.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            (slot, entry) => *slot = entry.clone(),
        }
    }
}

/// Enumerate the components of every kind block across `infos`.
pub fn used_components(infos: &[&Value]) -> Result<UsedComponents, ResolveError> {
    let mut used = UsedComponents::default();
    for info in infos {
        let Value::Object(info) = info else {
            return Err(ResolveError::NotAMapping {
                what: "info".to_string(),
            });
        };
        for kind in Kind::ALL {
            match info.get(kind.as_str()) {
                None | Some(Value::Null) => {}
                Some(Value::Object(block)) => {
                    for (name, entry) in block {
                        used.record(kind, name, entry);
                    }
                }
                Some(_) => {
                    return Err(ResolveError::MalformedBlock {
                        block: kind.as_str().to_string(),
                    });
                }
            }
        }
    }
    Ok(used)
}

/// Resolve `raw` against the registry into a fully expanded info.
///
/// The result holds one block per used kind, the `prior` block when the raw
/// info or any component has priors, the `params` block, then every other
/// top-level key of `raw` unchanged. `auto_params` is consumed.
pub fn resolve(raw: &Value, registry: &dyn Registry) -> Result<Value, ResolveError> {
    let Value::Object(input) = raw else {
        return Err(ResolveError::NotAMapping {
            what: "input info".to_string(),
        });
    };
    let used = used_components(&[raw])?;

    let mut updated = Options::new();
    let mut default_params: Vec<(String, Options)> = Vec::new();
    let mut default_priors: Vec<(String, Options)> = Vec::new();
    for kind in used.kinds() {
        let mut block = Options::new();
        for name in used.names(kind) {
            let raw_entry = used.entry(kind, name).unwrap_or(&Value::Null);
            let entry = ComponentEntry::classify(raw_entry, registry);
            let resolved = resolve_component(kind, name, &entry, registry)?;
            default_params.push((name.clone(), resolved.default_params));
            default_priors.push((name.clone(), resolved.default_prior));
            block.insert(name.clone(), Value::Object(resolved.options));
        }
        updated.insert(kind.as_str().to_string(), Value::Object(block));
    }

    if let Some(prior) = merge_priors(input.get(root::PRIOR), &default_priors)? {
        updated.insert(root::PRIOR.to_string(), Value::Object(prior));
    }

    let defaults_merged =
        merge_default_params(default_params.iter().map(|(name, p)| (name.as_str(), p)))?;
    let input_params = mapping_or_empty(input.get(root::PARAMS), "the 'params' block")?;
    let mut params = merge_params_info(&[defaults_merged, input_params], false);

    if input.contains_key(Kind::Likelihood.as_str()) {
        add_chi2_params(&updated, &mut params);
    }

    if let Some(auto) = input.get(root::AUTO_PARAMS) {
        let auto = mapping_or_empty(Some(auto), "the 'auto_params' block")?;
        make_auto_params(&auto, &mut params)?;
    }

    let groups = rename_groups(&updated)?;
    if !groups.is_empty() {
        groups.attach(&mut params);
    }
    updated.insert(root::PARAMS.to_string(), Value::Object(params));

    for (key, value) in input {
        if key == root::AUTO_PARAMS || updated.contains_key(key) {
            continue;
        }
        updated.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(updated))
}

struct ResolvedComponent {
    options: Options,
    default_params: Options,
    default_prior: Options,
}

fn resolve_component(
    kind: Kind,
    name: &str,
    entry: &ComponentEntry,
    registry: &dyn Registry,
) -> Result<ResolvedComponent, ResolveError> {
    let input = entry.options();
    let provider = match entry {
        ComponentEntry::ExternalClass { class, .. } => class.clone(),
        ComponentEntry::ExternalCallable { .. } => registry.kind_base(kind),
        ComponentEntry::Empty | ComponentEntry::Options(_) => {
            registry.resolve_class(name, kind, entry.search_path(), entry.class_name())?
        }
    };
    tracing::debug!(
        kind = %kind,
        component = name,
        class = provider.qualified_name(),
        "resolving component defaults"
    );
    let (defaults, annotations) = provider_info(provider.as_ref(), &input)?;

    let mut unrecognized: Vec<&String> = input
        .keys()
        .filter(|key| {
            !option::RESERVED.contains(&key.as_str())
                && !defaults.contains_key(*key)
                && !annotations.contains_key(*key)
        })
        .collect();
    if !unrecognized.is_empty() {
        unrecognized.sort();
        let available: BTreeSet<&str> = option::SUGGESTIBLE
            .iter()
            .copied()
            .chain(defaults.keys().map(String::as_str))
            .collect();
        return Err(ResolveError::UnrecognizedOptions {
            kind,
            component: name.to_string(),
            options: unrecognized
                .into_iter()
                .map(|option| UnrecognizedOption {
                    name: option.clone(),
                    suggestions: fuzzy_match(
                        option,
                        available.iter().copied(),
                        MAX_SUGGESTIONS,
                    ),
                })
                .collect(),
        });
    }

    let what = |block: &str| format!("default '{block}' of {kind} '{name}'");
    let default_params = mapping_or_empty(defaults.get(root::PARAMS), &what(root::PARAMS))?;
    let default_prior = mapping_or_empty(defaults.get(root::PRIOR), &what(root::PRIOR))?;

    let mut options = defaults;
    options.extend(input);
    Ok(ResolvedComponent {
        options,
        default_params,
        default_prior,
    })
}

/// The resolved `prior` block, or `None` when nobody declares priors.
///
/// Priors from components must agree with each other and with the raw
/// info's own priors; equal repeats are harmless.
fn merge_priors(
    input_prior: Option<&Value>,
    default_priors: &[(String, Options)],
) -> Result<Option<Options>, ResolveError> {
    if input_prior.is_none() && default_priors.iter().all(|(_, p)| p.is_empty()) {
        return Ok(None);
    }
    let mut merged = mapping_or_empty(input_prior, "the 'prior' block")?;
    for (component, priors) in default_priors {
        for (name, prior) in priors {
            if let Some(previous) = merged.get(name) {
                if previous != prior {
                    return Err(ResolveError::ConflictingDefault {
                        subject: ConflictSubject::Prior,
                        name: name.clone(),
                        component: component.clone(),
                        previous: previous.clone(),
                        found: prior.clone(),
                    });
                }
            }
            merged.insert(name.clone(), prior.clone());
        }
    }
    Ok(Some(merged))
}

/// One derived chi-squared parameter per distinct likelihood `type`, sorted.
fn add_chi2_params(updated: &Options, params: &mut Options) {
    let Some(Value::Object(likelihoods)) = updated.get(Kind::Likelihood.as_str()) else {
        return;
    };
    let types: BTreeSet<String> = likelihoods
        .values()
        .filter_map(|options| options.get(option::TYPE))
        .flat_map(type_names)
        .collect();
    for likelihood_type in types {
        let mut info = Options::new();
        info.insert(
            param::LATEX.to_string(),
            Value::String(chi2_label(&likelihood_type)),
        );
        info.insert(param::DERIVED.to_string(), Value::Bool(true));
        params.insert(chi2_name(&likelihood_type), Value::Object(info));
    }
}

/// A likelihood `type` as a list of names; non-string items are written out.
fn type_names(value: &Value) -> Vec<String> {
    let name = |item: &Value| match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter(|i| !i.is_null()).map(name).collect(),
        single => vec![name(single)],
    }
}

fn rename_groups(updated: &Options) -> Result<RenameGroups, ResolveError> {
    let mut groups = RenameGroups::new();
    for kind in Kind::ALL.into_iter().filter(|kind| kind.declares_renames()) {
        let Some(Value::Object(block)) = updated.get(kind.as_str()) else {
            continue;
        };
        for (component, options) in block {
            if let Some(renames) = options.get(option::RENAMES) {
                groups.add_table(kind, component, renames)?;
            }
        }
    }
    Ok(groups)
}

fn mapping_or_empty(value: Option<&Value>, what: &str) -> Result<Options, ResolveError> {
    match value {
        None | Some(Value::Null) => Ok(Options::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ResolveError::NotAMapping {
            what: what.to_string(),
        }),
    }
}
