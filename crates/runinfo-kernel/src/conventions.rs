//! Names shared by every layer: kinds, reserved keys, parameter fields.
//!
//! Input documents are plain nested mappings, so these strings are the
//! schema. Keep them in one place.

use serde::{Deserialize, Serialize};

/// A category of pluggable component.
///
/// Iteration order (`Kind::ALL`) is also the order of the kind blocks in a
/// resolved configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Sampler,
    Theory,
    Likelihood,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Sampler, Kind::Theory, Kind::Likelihood];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sampler => "sampler",
            Self::Theory => "theory",
            Self::Likelihood => "likelihood",
        }
    }

    /// The kind whose block is named `block`, if any.
    pub fn from_block(block: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == block)
    }

    /// Kinds whose components may declare parameter renames.
    pub fn declares_renames(self) -> bool {
        matches!(self, Self::Theory | Self::Likelihood)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_block(&s.to_lowercase()).ok_or_else(|| format!("unknown component kind: {s}"))
    }
}

/// Top-level keys of an info mapping.
pub mod root {
    pub const PARAMS: &str = "params";
    pub const PRIOR: &str = "prior";
    pub const AUTO_PARAMS: &str = "auto_params";
    pub const OUTPUT: &str = "output";
    pub const DEBUG: &str = "debug";
    pub const DEBUG_FILE: &str = "debug_file";
    pub const RESUME: &str = "resume";
    pub const FORCE: &str = "force";
    pub const PACKAGES_PATH: &str = "packages_path";
    pub const TEST_RUN: &str = "test";
    pub const VERSION: &str = "version";

    /// Run-control keys that never affect a posterior; skipped by relaxed comparison.
    pub const RUN_CONTROL: &[&str] = &[
        DEBUG,
        DEBUG_FILE,
        RESUME,
        FORCE,
        PACKAGES_PATH,
        TEST_RUN,
        VERSION,
    ];
}

/// Component option names every component accepts.
pub mod option {
    pub const EXTERNAL: &str = "external";
    pub const CLASS_NAME: &str = "class";
    pub const PROVIDES: &str = "provides";
    pub const REQUIRES: &str = "requires";
    pub const RENAMES: &str = "renames";
    pub const INPUT_PARAMS: &str = "input_params";
    pub const OUTPUT_PARAMS: &str = "output_params";
    pub const COMPONENT_PATH: &str = "component_path";
    pub const ALIASES: &str = "aliases";
    pub const TYPE: &str = "type";

    pub const RESERVED: &[&str] = &[
        EXTERNAL,
        CLASS_NAME,
        PROVIDES,
        REQUIRES,
        RENAMES,
        INPUT_PARAMS,
        OUTPUT_PARAMS,
        COMPONENT_PATH,
        ALIASES,
    ];

    /// Reserved names offered as "did you mean" candidates.
    pub const SUGGESTIBLE: &[&str] = &[EXTERNAL, CLASS_NAME, REQUIRES, RENAMES];
}

/// Fields of a single parameter definition.
pub mod param {
    pub const PRIOR: &str = "prior";
    pub const VALUE: &str = "value";
    pub const DERIVED: &str = "derived";
    pub const REF: &str = "ref";
    pub const PROPOSAL: &str = "proposal";
    pub const LATEX: &str = "latex";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const RENAMES: &str = "renames";
    pub const DROP: &str = "drop";

    /// Setting the first field of a row clears every field listed after it.
    pub const INCOMPATIBLE: &[(&str, &[&str])] = &[
        (PRIOR, &[VALUE, DERIVED, MIN, MAX]),
        (VALUE, &[PRIOR, REF, PROPOSAL]),
        (DERIVED, &[PRIOR, DROP, REF, PROPOSAL]),
    ];

    /// Presentation-only fields skipped by relaxed comparison.
    pub const COSMETIC: &[&str] = &[LATEX, RENAMES, REF, PROPOSAL, MIN, MAX];
}

/// Key of the range declaration inside an auto-parameter template.
pub const AUTO_RANGE: &str = "auto_range";

/// Placeholder substituted by auto-parameter expansion.
pub const AUTO_PLACEHOLDER: &str = "%s";

const CHI2_PREFIX: &str = "chi2";
const NAME_SEPARATOR: &str = "__";

/// Name of the aggregated chi-squared parameter for a likelihood type.
pub fn chi2_name(likelihood_type: &str) -> String {
    format!(
        "{CHI2_PREFIX}{NAME_SEPARATOR}{}",
        likelihood_type.replace('.', "_")
    )
}

/// LaTeX label of the aggregated chi-squared parameter for a likelihood type.
pub fn chi2_label(likelihood_type: &str) -> String {
    format!(
        r"\chi^2_\mathrm{{{}}}",
        likelihood_type.replace('_', r"\ ")
    )
}
