//! Serde shape of a component catalog document.

use runinfo_kernel::Kind;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const CATALOG_SCHEMA: u32 = 1;
pub const CATALOG_KIND: &str = "runinfo.component_catalog.v1";

/// A whole catalog: kind bases, abstract parents, components and externals.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub schema: u32,
    pub catalog_kind: String,
    /// Base of every component of a kind, keyed by kind name.
    #[serde(default)]
    pub kind_bases: BTreeMap<String, DescriptorRow>,
    /// Parents that are never resolved by name on their own.
    #[serde(default)]
    pub abstracts: BTreeMap<String, DescriptorRow>,
    #[serde(default)]
    pub components: Vec<ComponentRow>,
    /// Classes usable as an `external` reference, keyed by the reference.
    #[serde(default)]
    pub externals: BTreeMap<String, DescriptorRow>,
}

/// A registered component of one kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRow {
    pub kind: Kind,
    pub name: String,
    /// Namespace reachable only through a `component_path` override.
    #[serde(default)]
    pub component_path: Option<String>,
    #[serde(flatten)]
    pub descriptor: DescriptorRow,
}

impl ComponentRow {
    pub fn label(&self) -> String {
        match &self.component_path {
            Some(path) => format!("{} '{}' (in {path})", self.kind, self.name),
            None => format!("{} '{}'", self.kind, self.name),
        }
    }
}

/// What every catalog row may declare about a descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorRow {
    /// Parent names, earliest overridden first. A component without parents
    /// inherits its kind base.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Attribute-style defaults.
    #[serde(default)]
    pub attributes: Option<Value>,
    /// Document-style defaults, inline.
    #[serde(default)]
    pub defaults: Option<Value>,
    /// Document-style defaults in a JSON or TOML file, relative to the catalog.
    #[serde(default)]
    pub defaults_file: Option<String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub resume_prefer_old: Vec<String>,
    #[serde(default)]
    pub resume_prefer_new: Vec<String>,
}
