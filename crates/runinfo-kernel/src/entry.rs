//! Raw component entries, classified once when read.

use crate::Options;
use crate::conventions::option;
use crate::registry::{DefaultsProvider, Registry};
use serde_json::Value;
use std::sync::Arc;

/// A component's raw entry inside a kind block.
///
/// `null` is [`ComponentEntry::Empty`]; a mapping without `external` is
/// [`ComponentEntry::Options`]; any other value, or a mapping whose
/// `external` is set, is external. An external reference that the registry
/// knows as a class is [`ComponentEntry::ExternalClass`], anything else is a
/// bare callable.
#[derive(Clone)]
pub enum ComponentEntry {
    Empty,
    Options(Options),
    ExternalCallable {
        reference: Value,
        options: Options,
    },
    ExternalClass {
        reference: String,
        class: Arc<dyn DefaultsProvider>,
        options: Options,
    },
}

impl ComponentEntry {
    pub fn classify(raw: &Value, registry: &dyn Registry) -> Self {
        let options = match raw {
            Value::Null => return Self::Empty,
            Value::Object(map) => map.clone(),
            bare => {
                let mut map = Options::new();
                map.insert(option::EXTERNAL.to_string(), bare.clone());
                map
            }
        };
        let reference = match options.get(option::EXTERNAL) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => {
                return Self::Options(options);
            }
            Some(reference) => reference.clone(),
        };
        let class = reference
            .as_str()
            .and_then(|name| registry.external_class(name).map(|class| (name, class)));
        match class {
            Some((name, class)) => Self::ExternalClass {
                reference: name.to_string(),
                class,
                options,
            },
            None => Self::ExternalCallable { reference, options },
        }
    }

    /// The entry's options in mapping form (`external` included).
    pub fn options(&self) -> Options {
        match self {
            Self::Empty => Options::new(),
            Self::Options(options)
            | Self::ExternalCallable { options, .. }
            | Self::ExternalClass { options, .. } => options.clone(),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::ExternalCallable { .. } | Self::ExternalClass { .. }
        )
    }

    /// Explicit class-name override, when given.
    pub fn class_name(&self) -> Option<&str> {
        self.option_str(option::CLASS_NAME)
    }

    /// Component search-path override, when given.
    pub fn search_path(&self) -> Option<&str> {
        self.option_str(option::COMPONENT_PATH)
    }

    fn option_str(&self, key: &str) -> Option<&str> {
        match self {
            Self::Options(options) => options.get(key).and_then(Value::as_str),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Options(options) => f.debug_tuple("Options").field(options).finish(),
            Self::ExternalCallable { reference, options } => f
                .debug_struct("ExternalCallable")
                .field("reference", reference)
                .field("options", options)
                .finish(),
            Self::ExternalClass {
                reference, options, ..
            } => f
                .debug_struct("ExternalClass")
                .field("reference", reference)
                .field("options", options)
                .finish(),
        }
    }
}
