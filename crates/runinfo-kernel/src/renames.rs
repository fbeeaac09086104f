//! Parameter rename groups declared by theories and likelihoods.

use crate::Options;
use crate::conventions::{Kind, param};
use crate::error::ResolveError;
use serde_json::Value;
use std::collections::BTreeSet;

/// Names that refer to the same parameter, merged transitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameGroups {
    groups: Vec<BTreeSet<String>>,
}

impl RenameGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `renames` table of a component.
    ///
    /// Each row (canonical name to one alias or a list of aliases) forms a
    /// group; groups sharing any name are united.
    pub fn add_table(
        &mut self,
        kind: Kind,
        component: &str,
        renames: &Value,
    ) -> Result<(), ResolveError> {
        let table = match renames {
            Value::Null => return Ok(()),
            Value::Object(table) => table,
            _ => {
                return Err(ResolveError::MalformedRenames {
                    kind,
                    component: component.to_string(),
                });
            }
        };
        for (canonical, aliases) in table {
            let mut group = BTreeSet::from([canonical.clone()]);
            group.extend(string_list(aliases).ok_or_else(|| {
                ResolveError::MalformedRenames {
                    kind,
                    component: component.to_string(),
                }
            })?);
            self.add_group(group);
        }
        Ok(())
    }

    fn add_group(&mut self, mut group: BTreeSet<String>) {
        let (overlapping, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.groups)
            .into_iter()
            .partition(|existing| !existing.is_disjoint(&group));
        for existing in overlapping {
            group.extend(existing);
        }
        self.groups = rest;
        self.groups.push(group);
    }

    /// Other names of `name`, sorted.
    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        self.groups
            .iter()
            .find(|group| group.contains(name))
            .map(|group| group.iter().filter(|n| *n != name).cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Attach the aliases of every parameter in `params` to its `renames`
    /// field. Existing renames keep their place; new names follow, once.
    pub fn attach(&self, params: &mut Options) {
        for (name, info) in params.iter_mut() {
            let aliases = self.aliases_of(name);
            if aliases.is_empty() {
                continue;
            }
            let Value::Object(info) = info else {
                continue;
            };
            let existing = match info.get(param::RENAMES) {
                None => Vec::new(),
                Some(value) => string_list(value).unwrap_or_else(|| {
                    tracing::warn!(
                        parameter = %name,
                        renames = %value,
                        "replacing renames that are not a name or a list of names"
                    );
                    Vec::new()
                }),
            };
            let mut renames: Vec<String> = Vec::new();
            for alias in existing.into_iter().chain(aliases) {
                if alias != *name && !renames.contains(&alias) {
                    renames.push(alias);
                }
            }
            info.insert(
                param::RENAMES.to_string(),
                Value::Array(renames.into_iter().map(Value::String).collect()),
            );
        }
    }
}

/// A single string or a list of strings.
pub(crate) fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        Value::Null => Some(Vec::new()),
        _ => None,
    }
}
