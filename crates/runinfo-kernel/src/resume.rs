//! Resume value selector.

use crate::Options;
use crate::conventions::{Kind, option};
use crate::registry::Registry;
use serde_json::Value;

/// Option values of `old` that must survive a resume.
///
/// For every component of every kind block, the options its class prefers
/// to keep from the old run are copied as `{kind: {component: {option:
/// value}}}`. A component whose class cannot be resolved any more
/// contributes nothing.
pub fn preferred_old_values(old: &Value, registry: &dyn Registry) -> Options {
    let mut keep_old = Options::new();
    let Value::Object(old) = old else {
        return keep_old;
    };
    for (block_name, block) in old {
        let (Some(kind), Value::Object(block)) = (Kind::from_block(block_name), block) else {
            continue;
        };
        for (name, options) in block {
            let options = options.as_object();
            let lookup = |key: &str| options.and_then(|o| o.get(key)).and_then(Value::as_str);
            let class = match registry.resolve_class(
                name,
                kind,
                lookup(option::COMPONENT_PATH),
                lookup(option::CLASS_NAME),
            ) {
                Ok(class) => class,
                Err(err) => {
                    tracing::debug!(kind = %kind, component = %name, error = %err, "no resume preferences");
                    continue;
                }
            };
            let prefer_old = class.resume_prefer_old();
            if prefer_old.is_empty() {
                continue;
            }
            let kept: Options = prefer_old
                .iter()
                .filter_map(|key| {
                    options
                        .and_then(|o| o.get(key))
                        .map(|value| (key.clone(), value.clone()))
                })
                .collect();
            let entry = keep_old
                .entry(block_name.clone())
                .or_insert_with(|| Value::Object(Options::new()));
            if let Value::Object(entry) = entry {
                entry.insert(name.clone(), Value::Object(kept));
            }
        }
    }
    keep_old
}
