//! Component registry: the only way the kernel reaches component classes.
//!
//! Components are registered explicitly at process start as
//! [`ComponentDescriptor`]s keyed by `(kind, name)`. A descriptor carries an
//! ordered list of parent descriptors whose defaults are folded before its
//! own, in place of a live class hierarchy.

use crate::Options;
use crate::conventions::Kind;
use crate::defaults;
use crate::error::ResolveError;
use crate::suggest::{MAX_SUGGESTIONS, fuzzy_match};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Computes option-dependent attribute defaults from the entry's input options.
pub type DefaultsHook = Arc<dyn Fn(&Options) -> Result<Options, String> + Send + Sync>;

/// What the resolver needs from a component class.
pub trait DefaultsProvider: Send + Sync {
    /// Name used in messages.
    fn qualified_name(&self) -> &str;

    /// Flattened defaults, parents folded in. Must not be cached across
    /// different `input_options`.
    fn get_defaults(&self, input_options: &Options) -> Result<Options, ResolveError>;

    /// Declared option types, including inherited ones.
    fn get_annotations(&self) -> BTreeMap<String, String>;

    /// Options whose old value is kept when resuming.
    fn resume_prefer_old(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    /// Options whose new value is taken when resuming.
    fn resume_prefer_new(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

/// Resolves component names to providers.
pub trait Registry {
    /// Resolve `name` (or `class_name` when given) within `kind`, looking in
    /// the `search_path` namespace first when one is given.
    fn resolve_class(
        &self,
        name: &str,
        kind: Kind,
        search_path: Option<&str>,
        class_name: Option<&str>,
    ) -> Result<Arc<dyn DefaultsProvider>, ResolveError>;

    /// The class registered under an external reference, if the reference
    /// names a class rather than a bare callable.
    fn external_class(&self, reference: &str) -> Option<Arc<dyn DefaultsProvider>>;

    /// Base of every component of `kind`; supplies defaults for bare callables.
    fn kind_base(&self, kind: Kind) -> Arc<dyn DefaultsProvider>;
}

/// A registered component class.
#[derive(Clone)]
pub struct ComponentDescriptor {
    name: String,
    parents: Vec<Arc<ComponentDescriptor>>,
    document: Option<Options>,
    attributes: Options,
    hook: Option<DefaultsHook>,
    annotations: BTreeMap<String, String>,
    prefer_old: BTreeSet<String>,
    prefer_new: BTreeSet<String>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            document: None,
            attributes: Options::new(),
            hook: None,
            annotations: BTreeMap::new(),
            prefer_old: BTreeSet::new(),
            prefer_new: BTreeSet::new(),
        }
    }

    /// Append a parent; earlier parents are overridden by later ones.
    pub fn with_parent(mut self, parent: Arc<ComponentDescriptor>) -> Self {
        self.parents.push(parent);
        self
    }

    /// Defaults declared as a structured document (the file-backed form).
    pub fn with_document(mut self, document: Options) -> Self {
        self.document = Some(document);
        self
    }

    /// Defaults declared as plain attributes.
    pub fn with_attributes(mut self, attributes: Options) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attribute defaults computed from the entry's input options, overlaid
    /// on the static attributes.
    pub fn with_hook(mut self, hook: DefaultsHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Declare an option type without a default value.
    pub fn annotate(mut self, option: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.annotations.insert(option.into(), type_name.into());
        self
    }

    pub fn prefer_old_at_resume<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefer_old.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn prefer_new_at_resume<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefer_new.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &[Arc<ComponentDescriptor>] {
        &self.parents
    }

    /// This descriptor's own declarations, without parents.
    ///
    /// Fails when both a document and attributes are declared.
    pub fn own_defaults(&self, input_options: &Options) -> Result<Options, ResolveError> {
        let mut attributes = self.attributes.clone();
        if let Some(hook) = &self.hook {
            let computed = hook(input_options).map_err(|reason| ResolveError::Defaults {
                class: self.name.clone(),
                reason,
            })?;
            attributes.extend(computed);
        }
        match &self.document {
            Some(_) if !attributes.is_empty() => Err(ResolveError::ClassConfig {
                class: self.name.clone(),
                attributes: attributes.keys().cloned().collect(),
            }),
            Some(document) => Ok(document.clone()),
            None => Ok(attributes),
        }
    }

    fn own_annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("document", &self.document)
            .field("attributes", &self.attributes)
            .field("hook", &self.hook.is_some())
            .field("annotations", &self.annotations)
            .finish()
    }
}

impl DefaultsProvider for ComponentDescriptor {
    fn qualified_name(&self) -> &str {
        &self.name
    }

    fn get_defaults(&self, input_options: &Options) -> Result<Options, ResolveError> {
        defaults::get_defaults(self, input_options)
    }

    fn get_annotations(&self) -> BTreeMap<String, String> {
        let mut annotations = BTreeMap::new();
        for parent in &self.parents {
            annotations.extend(parent.get_annotations());
        }
        annotations.extend(
            self.own_annotations()
                .iter()
                .filter(|(name, _)| !name.starts_with('_'))
                .map(|(name, ty)| (name.clone(), ty.clone())),
        );
        annotations
    }

    fn resume_prefer_old(&self) -> BTreeSet<String> {
        self.prefer_old.clone()
    }

    fn resume_prefer_new(&self) -> BTreeSet<String> {
        self.prefer_new.clone()
    }
}

/// In-memory [`Registry`] populated by explicit registration.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    components: BTreeMap<(Kind, String), Arc<dyn DefaultsProvider>>,
    namespaces: BTreeMap<String, BTreeMap<(Kind, String), Arc<dyn DefaultsProvider>>>,
    externals: BTreeMap<String, Arc<dyn DefaultsProvider>>,
    bases: BTreeMap<Kind, Arc<dyn DefaultsProvider>>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("namespaces", &self.namespaces.keys().collect::<Vec<_>>())
            .field("externals", &self.externals.keys().collect::<Vec<_>>())
            .field("bases", &self.bases.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` as the component `name` of `kind`, replacing any
    /// previous registration.
    pub fn register(
        &mut self,
        kind: Kind,
        name: impl Into<String>,
        provider: Arc<dyn DefaultsProvider>,
    ) -> &mut Self {
        self.components.insert((kind, name.into()), provider);
        self
    }

    /// Register a component reachable only through a `component_path` override.
    pub fn register_in(
        &mut self,
        namespace: impl Into<String>,
        kind: Kind,
        name: impl Into<String>,
        provider: Arc<dyn DefaultsProvider>,
    ) -> &mut Self {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .insert((kind, name.into()), provider);
        self
    }

    /// Register a class usable as an `external` reference.
    pub fn register_external(
        &mut self,
        reference: impl Into<String>,
        provider: Arc<dyn DefaultsProvider>,
    ) -> &mut Self {
        self.externals.insert(reference.into(), provider);
        self
    }

    /// Set the base class of `kind`.
    pub fn register_kind_base(
        &mut self,
        kind: Kind,
        provider: Arc<dyn DefaultsProvider>,
    ) -> &mut Self {
        self.bases.insert(kind, provider);
        self
    }

    pub fn contains(&self, kind: Kind, name: &str) -> bool {
        self.components.contains_key(&(kind, name.to_string()))
    }

    /// Registered component names of `kind`, sorted.
    pub fn names(&self, kind: Kind) -> Vec<&str> {
        self.components
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

impl Registry for ComponentRegistry {
    fn resolve_class(
        &self,
        name: &str,
        kind: Kind,
        search_path: Option<&str>,
        class_name: Option<&str>,
    ) -> Result<Arc<dyn DefaultsProvider>, ResolveError> {
        let lookup = class_name.unwrap_or(name);
        let key = (kind, lookup.to_string());
        let namespaced = search_path
            .and_then(|path| self.namespaces.get(path))
            .and_then(|namespace| namespace.get(&key));
        if let Some(provider) = namespaced.or_else(|| self.components.get(&key)) {
            return Ok(Arc::clone(provider));
        }
        Err(ResolveError::RegistryLookup {
            kind,
            name: lookup.to_string(),
            suggestions: fuzzy_match(lookup, self.names(kind), MAX_SUGGESTIONS),
        })
    }

    fn external_class(&self, reference: &str) -> Option<Arc<dyn DefaultsProvider>> {
        self.externals.get(reference).cloned()
    }

    fn kind_base(&self, kind: Kind) -> Arc<dyn DefaultsProvider> {
        self.bases
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Arc::new(ComponentDescriptor::new(kind.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: serde_json::Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                Kind::Sampler,
                "mcmc",
                Arc::new(
                    ComponentDescriptor::new("mcmc")
                        .with_attributes(options(json!({"burn_in": 0}))),
                ),
            )
            .register(
                Kind::Sampler,
                "minimize",
                Arc::new(ComponentDescriptor::new("minimize")),
            )
            .register_in(
                "/opt/custom",
                Kind::Sampler,
                "mcmc",
                Arc::new(
                    ComponentDescriptor::new("custom.mcmc")
                        .with_attributes(options(json!({"burn_in": 100}))),
                ),
            );
        registry
    }

    #[test]
    fn resolves_by_name_and_by_class_override() {
        let registry = registry();
        let found = registry
            .resolve_class("mcmc", Kind::Sampler, None, None)
            .unwrap();
        assert_eq!(found.qualified_name(), "mcmc");

        let renamed = registry
            .resolve_class("my_chain", Kind::Sampler, None, Some("mcmc"))
            .unwrap();
        assert_eq!(renamed.qualified_name(), "mcmc");
    }

    #[test]
    fn search_path_namespace_wins() {
        let registry = registry();
        let found = registry
            .resolve_class("mcmc", Kind::Sampler, Some("/opt/custom"), None)
            .unwrap();
        assert_eq!(found.qualified_name(), "custom.mcmc");

        let fallback = registry
            .resolve_class("minimize", Kind::Sampler, Some("/opt/custom"), None)
            .unwrap();
        assert_eq!(fallback.qualified_name(), "minimize");
    }

    #[test]
    fn unknown_component_reports_suggestions() {
        let err = registry()
            .resolve_class("mcmx", Kind::Sampler, None, None)
            .err()
            .expect("lookup should fail");
        match err {
            ResolveError::RegistryLookup {
                kind,
                name,
                suggestions,
            } => {
                assert_eq!(kind, Kind::Sampler);
                assert_eq!(name, "mcmx");
                assert_eq!(suggestions, vec!["mcmc".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn kind_lookup_is_scoped() {
        assert!(
            registry()
                .resolve_class("mcmc", Kind::Likelihood, None, None)
                .is_err()
        );
    }

    #[test]
    fn missing_kind_base_is_empty() {
        let base = registry().kind_base(Kind::Theory);
        assert_eq!(base.qualified_name(), "theory");
        assert!(base.get_defaults(&Options::new()).unwrap().is_empty());
    }

    #[test]
    fn document_and_attributes_conflict() {
        let descriptor = ComponentDescriptor::new("both")
            .with_document(options(json!({"a": 1})))
            .with_attributes(options(json!({"b": 2})));
        let err = descriptor.own_defaults(&Options::new()).unwrap_err();
        assert!(matches!(err, ResolveError::ClassConfig { ref attributes, .. } if attributes == &vec!["b".to_string()]));
    }

    #[test]
    fn annotations_are_inherited() {
        let base = Arc::new(ComponentDescriptor::new("base").annotate("path", "str"));
        let child = ComponentDescriptor::new("child")
            .with_parent(base)
            .annotate("speed", "float")
            .annotate("_private", "int");
        let annotations = child.get_annotations();
        assert_eq!(
            annotations.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["path", "speed"]
        );
    }
}
