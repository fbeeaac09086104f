//! Defaults merger: flattens a descriptor's defaults across its parents.

use crate::Options;
use crate::conventions::Kind;
use crate::error::ResolveError;
use crate::registry::{ComponentDescriptor, DefaultsProvider, Registry};
use std::collections::BTreeMap;

/// Flattened defaults of `descriptor` for the given entry options.
///
/// Parents are folded in declaration order (a later parent overrides an
/// earlier one), then the descriptor's own declarations are laid on top.
/// The descriptor's own keys come first in the result, followed by inherited
/// keys it does not declare.
pub fn get_defaults(
    descriptor: &ComponentDescriptor,
    input_options: &Options,
) -> Result<Options, ResolveError> {
    let own = descriptor.own_defaults(input_options)?;
    let mut defaults = own.clone();
    for parent in descriptor.parents() {
        defaults.extend(get_defaults(parent, input_options)?);
    }
    defaults.extend(own);
    Ok(defaults)
}

/// Defaults of a registered component, plus the annotations it declares
/// without a default value.
pub fn default_info(
    registry: &dyn Registry,
    name: &str,
    kind: Kind,
    input_options: &Options,
    class_name: Option<&str>,
    search_path: Option<&str>,
) -> Result<(Options, BTreeMap<String, String>), ResolveError> {
    let provider = registry.resolve_class(name, kind, search_path, class_name)?;
    provider_info(provider.as_ref(), input_options)
}

/// Defaults and undefined annotations of an already resolved provider.
pub(crate) fn provider_info(
    provider: &dyn DefaultsProvider,
    input_options: &Options,
) -> Result<(Options, BTreeMap<String, String>), ResolveError> {
    let defaults = provider.get_defaults(input_options)?;
    let annotations = provider
        .get_annotations()
        .into_iter()
        .filter(|(name, _)| !defaults.contains_key(name))
        .collect();
    Ok((defaults, annotations))
}
