//! Error types for resolution, merging and registry lookups.

use crate::conventions::Kind;
use serde_json::Value;

/// Errors that terminate a resolve, merge or lookup call.
///
/// No partial result accompanies any of them.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A kind block is not a mapping of component name to options.
    #[error(
        "input info is not well formatted at the '{block}' block: \
         it must be a mapping {{'{block}_i': {{options}}, ...}}"
    )]
    MalformedBlock { block: String },

    /// A mapping was required but something else was found.
    #[error("{what} must be a mapping")]
    NotAMapping { what: String },

    /// Entry options that neither defaults, annotations nor reserved names know.
    #[error(
        "{kind} '{component}' does not recognize some options: {}. \
         Check the documentation for '{kind}'.",
        render_unrecognized(.options)
    )]
    UnrecognizedOptions {
        kind: Kind,
        component: String,
        options: Vec<UnrecognizedOption>,
    },

    /// The same prior or parameter is defined differently by two sources.
    #[error(
        "{subject} '{name}' multiply defined, but inconsistent: \
         '{component}' gives {found}, previously {previous}"
    )]
    ConflictingDefault {
        subject: ConflictSubject,
        name: String,
        component: String,
        previous: Value,
        found: Value,
    },

    /// A `renames` option that is not a mapping.
    #[error(
        "{kind} '{component}': 'renames' should be a mapping of name to aliases \
         (or you meant to use 'aliases')"
    )]
    MalformedRenames { kind: Kind, component: String },

    /// An auto-parameter name without the `%s` placeholder.
    #[error("auto-parameter name '{name}' must contain a %s placeholder")]
    AutoParamTemplate { name: String },

    /// An auto-parameter whose range is missing or cannot be evaluated.
    #[error("auto-parameter '{name}' has an invalid auto_range: {reason}")]
    AutoParamRange { name: String, reason: String },

    /// A class declaring both document-backed and attribute defaults.
    #[error(
        "{class}: a component can declare either a defaults document or attribute \
         defaults, but not both (attributes: {})",
        .attributes.join(", ")
    )]
    ClassConfig {
        class: String,
        attributes: Vec<String>,
    },

    /// A defaults provider failed while computing its defaults.
    #[error("failed to get defaults for '{class}': {reason}")]
    Defaults { class: String, reason: String },

    /// The registry cannot resolve a component.
    #[error("{kind} '{name}' not found{}", render_suggestions(.suggestions))]
    RegistryLookup {
        kind: Kind,
        name: String,
        suggestions: Vec<String>,
    },

    /// `merge_info` called without any info.
    #[error("at least one info is required to merge")]
    EmptyMerge,
}

/// What a [`ResolveError::ConflictingDefault`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSubject {
    Prior,
    Parameter,
}

impl std::fmt::Display for ConflictSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prior => f.write_str("prior"),
            Self::Parameter => f.write_str("parameter"),
        }
    }
}

/// One unrecognized option with its closest known names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedOption {
    pub name: String,
    pub suggestions: Vec<String>,
}

fn render_unrecognized(options: &[UnrecognizedOption]) -> String {
    options
        .iter()
        .map(|option| {
            if option.suggestions.is_empty() {
                format!("'{}'", option.name)
            } else {
                let quoted: Vec<String> = option
                    .suggestions
                    .iter()
                    .map(|s| format!("'{s}'"))
                    .collect();
                format!("'{}' (did you mean {}?)", option.name, quoted.join("|"))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join("|"))
    }
}
