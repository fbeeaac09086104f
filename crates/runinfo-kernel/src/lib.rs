//! # Runinfo Kernel
//!
//! Turns a user-supplied, hierarchical run configuration ("raw info") into a
//! fully expanded, internally consistent one ("updated info") by merging it
//! against the default configuration declared by every component it names.
//! Two resolved configurations can then be compared to decide whether a
//! previous run may be resumed.
//!
//! The kernel never loads classes or files itself: every component is reached
//! through the [`Registry`] seam, which hands back [`DefaultsProvider`]s.
//!
//! ## Architecture
//!
//! ```text
//! Registry              ← (kind, name) → DefaultsProvider, kind bases, externals
//!     │
//! defaults              ← parents folded first, own declarations win
//!     │
//! params                ← shorthand expansion + layered merge with incompatibilities
//!     │
//! resolve               ← raw info → updated info (priors, chi2, auto params, renames)
//!     │
//! merge                 ← rightmost-wins info merge, params via the param merger
//!     │
//! equivalence / resume  ← strict/relaxed comparison, old values preferred at resume
//! ```

pub mod auto_params;
pub mod conventions;
pub mod defaults;
pub mod entry;
pub mod equivalence;
pub mod error;
pub mod merge;
pub mod params;
pub mod registry;
pub mod renames;
pub mod resolve;
pub mod resume;
pub mod suggest;

pub use auto_params::{make_auto_params, range_values};
pub use conventions::Kind;
pub use defaults::{default_info, get_defaults};
pub use entry::ComponentEntry;
pub use equivalence::{Equivalence, EquivalencePolicy, InfoMismatch, compare_info, is_equal};
pub use error::{ConflictSubject, ResolveError, UnrecognizedOption};
pub use merge::{merge_info, recursive_update};
pub use params::{expand_param_info, merge_default_params, merge_params_info};
pub use registry::{
    ComponentDescriptor, ComponentRegistry, DefaultsHook, DefaultsProvider, Registry,
};
pub use renames::RenameGroups;
pub use resolve::{UsedComponents, resolve, used_components};
pub use resume::preferred_old_values;

/// A component's option mapping, in declaration order.
pub type Options = serde_json::Map<String, serde_json::Value>;
