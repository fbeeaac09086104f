//! Catalog rows to registry descriptors.
//!
//! A parent name is looked up among the abstracts first, then among the kind
//! bases, then among the plain (non-namespaced) components of the child's
//! kind. Each descriptor is built once and shared by every child.

use crate::schema::{Catalog, DescriptorRow};
use crate::{CatalogError, display_path, read_document};
use runinfo_kernel::{ComponentDescriptor, ComponentRegistry, Kind, Options};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Node {
    Abstract(String),
    Base(Kind),
    Component(usize),
    External(String),
}

struct Builder<'a> {
    catalog: &'a Catalog,
    base_dir: &'a Path,
    bases: BTreeMap<Kind, &'a DescriptorRow>,
    built: BTreeMap<Node, Arc<ComponentDescriptor>>,
    visiting: Vec<Node>,
}

/// Build the registry declared by `catalog`.
pub fn build_registry(
    catalog: &Catalog,
    base_dir: &Path,
) -> Result<ComponentRegistry, CatalogError> {
    let mut bases = BTreeMap::new();
    for (kind_name, row) in &catalog.kind_bases {
        let kind = kind_name
            .parse::<Kind>()
            .map_err(|reason| CatalogError::MalformedRow {
                component: format!("kind base '{kind_name}'"),
                reason,
            })?;
        bases.insert(kind, row);
    }

    let mut seen = BTreeSet::new();
    for row in &catalog.components {
        if !seen.insert((row.kind, row.component_path.as_deref(), row.name.as_str())) {
            return Err(CatalogError::Duplicate {
                component: row.label(),
            });
        }
    }

    let mut builder = Builder {
        catalog,
        base_dir,
        bases,
        built: BTreeMap::new(),
        visiting: Vec::new(),
    };
    let mut registry = ComponentRegistry::new();
    let kinds: Vec<Kind> = builder.bases.keys().copied().collect();
    for kind in kinds {
        let base = builder.build(Node::Base(kind))?;
        registry.register_kind_base(kind, base);
    }
    for (index, row) in catalog.components.iter().enumerate() {
        let descriptor = builder.build(Node::Component(index))?;
        match &row.component_path {
            Some(namespace) => {
                registry.register_in(namespace.clone(), row.kind, row.name.clone(), descriptor)
            }
            None => registry.register(row.kind, row.name.clone(), descriptor),
        };
    }
    for reference in catalog.externals.keys() {
        let descriptor = builder.build(Node::External(reference.clone()))?;
        registry.register_external(reference.clone(), descriptor);
    }
    Ok(registry)
}

impl<'a> Builder<'a> {
    fn build(&mut self, node: Node) -> Result<Arc<ComponentDescriptor>, CatalogError> {
        if let Some(descriptor) = self.built.get(&node) {
            return Ok(Arc::clone(descriptor));
        }
        if let Some(start) = self.visiting.iter().position(|n| *n == node) {
            let mut chain: Vec<String> = self.visiting[start..]
                .iter()
                .map(|n| self.label(n))
                .collect();
            chain.push(self.label(&node));
            return Err(CatalogError::ParentCycle { chain });
        }
        self.visiting.push(node.clone());

        let row = self.row(&node);
        let label = self.label(&node);
        let parents = if row.parents.is_empty() {
            self.implicit_parent(&node).into_iter().collect::<Vec<_>>()
        } else {
            row.parents
                .iter()
                .map(|parent| self.parent_node(&node, parent, &label))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut descriptor = ComponentDescriptor::new(self.name(&node));
        for parent in parents {
            descriptor = descriptor.with_parent(self.build(parent)?);
        }
        descriptor = self.apply_row(descriptor, row, &label)?;

        self.visiting.pop();
        let descriptor = Arc::new(descriptor);
        self.built.insert(node, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    fn row(&self, node: &Node) -> &'a DescriptorRow {
        let catalog = self.catalog;
        match node {
            Node::Abstract(name) => &catalog.abstracts[name],
            Node::Base(kind) => self.bases[kind],
            Node::Component(index) => &catalog.components[*index].descriptor,
            Node::External(reference) => &catalog.externals[reference],
        }
    }

    fn name(&self, node: &Node) -> String {
        match node {
            Node::Abstract(name) | Node::External(name) => name.clone(),
            Node::Base(kind) => kind.as_str().to_string(),
            Node::Component(index) => self.catalog.components[*index].name.clone(),
        }
    }

    fn label(&self, node: &Node) -> String {
        match node {
            Node::Abstract(name) => format!("abstract '{name}'"),
            Node::Base(kind) => format!("{kind} base"),
            Node::Component(index) => self.catalog.components[*index].label(),
            Node::External(reference) => format!("external '{reference}'"),
        }
    }

    fn kind_of(&self, node: &Node) -> Option<Kind> {
        match node {
            Node::Base(kind) => Some(*kind),
            Node::Component(index) => Some(self.catalog.components[*index].kind),
            Node::Abstract(_) | Node::External(_) => None,
        }
    }

    /// Components without declared parents inherit their kind base.
    fn implicit_parent(&self, node: &Node) -> Option<Node> {
        let Node::Component(index) = node else {
            return None;
        };
        let kind = self.catalog.components[*index].kind;
        self.bases.contains_key(&kind).then_some(Node::Base(kind))
    }

    fn parent_node(&self, child: &Node, parent: &str, label: &str) -> Result<Node, CatalogError> {
        if self.catalog.abstracts.contains_key(parent) {
            return Ok(Node::Abstract(parent.to_string()));
        }
        if let Some(kind) = Kind::from_block(parent).filter(|kind| self.bases.contains_key(kind)) {
            return Ok(Node::Base(kind));
        }
        if let Some(kind) = self.kind_of(child) {
            let found = self.catalog.components.iter().position(|row| {
                row.kind == kind && row.component_path.is_none() && row.name == parent
            });
            if let Some(index) = found {
                return Ok(Node::Component(index));
            }
        }
        Err(CatalogError::UnknownParent {
            component: label.to_string(),
            parent: parent.to_string(),
        })
    }

    fn apply_row(
        &self,
        mut descriptor: ComponentDescriptor,
        row: &DescriptorRow,
        label: &str,
    ) -> Result<ComponentDescriptor, CatalogError> {
        let malformed = |reason: String| CatalogError::MalformedRow {
            component: label.to_string(),
            reason,
        };
        if let Some(attributes) = optional_mapping(row.attributes.as_ref())
            .map_err(|found| malformed(format!("'attributes' must be a mapping, got {found}")))?
        {
            descriptor = descriptor.with_attributes(attributes);
        }
        let document = match (&row.defaults, &row.defaults_file) {
            (Some(_), Some(_)) => {
                return Err(malformed(
                    "declare either 'defaults' or 'defaultsFile', not both".to_string(),
                ));
            }
            (Some(inline), None) => optional_mapping(Some(inline))
                .map_err(|found| malformed(format!("'defaults' must be a mapping, got {found}")))?,
            (None, Some(file)) => {
                let path = self.base_dir.join(file);
                let document = read_document(&path)?;
                Some(optional_mapping(Some(&document)).map_err(|_| {
                    malformed(format!("{} does not hold a mapping", display_path(&path)))
                })?
                .unwrap_or_default())
            }
            (None, None) => None,
        };
        if let Some(document) = document {
            descriptor = descriptor.with_document(document);
        }
        for (option, type_name) in &row.annotations {
            descriptor = descriptor.annotate(option.clone(), type_name.clone());
        }
        Ok(descriptor
            .prefer_old_at_resume(row.resume_prefer_old.iter().cloned())
            .prefer_new_at_resume(row.resume_prefer_new.iter().cloned()))
    }
}

/// `None` for absent or null, the mapping itself, or the offending value.
fn optional_mapping(value: Option<&Value>) -> Result<Option<Options>, Value> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(other) => Err(other.clone()),
    }
}
