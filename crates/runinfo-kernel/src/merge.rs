//! Info merger: rightmost info wins, nested mappings merged key by key.

use crate::Options;
use crate::conventions::root;
use crate::error::ResolveError;
use crate::params::merge_params_info;
use serde_json::Value;

/// Overlay `update` on `base`, recursing into mappings.
///
/// A `null` in `update` only creates an empty mapping for keys that `base`
/// does not have; it never erases a value.
pub fn recursive_update(mut base: Options, update: &Options) -> Options {
    for (key, value) in update {
        match value {
            Value::Object(nested) => {
                let previous = match base.get(key) {
                    Some(Value::Object(previous)) => previous.clone(),
                    _ => Options::new(),
                };
                base.insert(key.clone(), Value::Object(recursive_update(previous, nested)));
            }
            Value::Null => {
                if !base.contains_key(key) {
                    base.insert(key.clone(), Value::Object(Options::new()));
                }
            }
            other => {
                base.insert(key.clone(), other.clone());
            }
        }
    }
    base
}

/// Merge infos left to right; later infos take precedence.
///
/// The `params` blocks are merged with the parameter merger instead of a
/// plain overlay, so incompatible fields are cleared.
pub fn merge_info(infos: &[Value]) -> Result<Value, ResolveError> {
    let Some((first, rest)) = infos.split_first() else {
        return Err(ResolveError::EmptyMerge);
    };
    let mut current = as_info(first)?;
    for next in rest {
        let next = as_info(next)?;
        let previous_params = take_params(&mut current)?;
        let next_params = params_of(&next)?;
        let mut merged = recursive_update(current, &next);
        merged.insert(
            root::PARAMS.to_string(),
            Value::Object(merge_params_info(&[previous_params, next_params], true)),
        );
        current = merged;
    }
    Ok(Value::Object(current))
}

fn as_info(info: &Value) -> Result<Options, ResolveError> {
    match info {
        Value::Object(map) => Ok(map.clone()),
        _ => Err(ResolveError::NotAMapping {
            what: "info".to_string(),
        }),
    }
}

fn take_params(info: &mut Options) -> Result<Options, ResolveError> {
    let params = params_of(info)?;
    info.shift_remove(root::PARAMS);
    Ok(params)
}

fn params_of(info: &Options) -> Result<Options, ResolveError> {
    match info.get(root::PARAMS) {
        None | Some(Value::Null) => Ok(Options::new()),
        Some(Value::Object(params)) => Ok(params.clone()),
        Some(_) => Err(ResolveError::NotAMapping {
            what: "the 'params' block".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn nested_mappings_merge() {
        let merged = recursive_update(
            options(json!({"sampler": {"mcmc": {"burn_in": 0, "seed": 1}}, "output": "a"})),
            &options(json!({"sampler": {"mcmc": {"burn_in": 100}}, "output": "b"})),
        );
        assert_eq!(
            Value::Object(merged),
            json!({"sampler": {"mcmc": {"burn_in": 100, "seed": 1}}, "output": "b"})
        );
    }

    #[test]
    fn null_never_erases() {
        let merged = recursive_update(
            options(json!({"theory": {"camb": {"accuracy": 2}}})),
            &options(json!({"theory": {"camb": null, "classy": null}})),
        );
        assert_eq!(
            Value::Object(merged),
            json!({"theory": {"camb": {"accuracy": 2}, "classy": {}}})
        );
    }

    #[test]
    fn scalar_replaces_mapping() {
        let merged = recursive_update(
            options(json!({"likelihood": {"gauss": {"mean": 0}}})),
            &options(json!({"likelihood": {"gauss": "lambda x: x"}})),
        );
        assert_eq!(merged["likelihood"]["gauss"], json!("lambda x: x"));
    }

    #[test]
    fn params_use_the_parameter_merger() {
        let merged = merge_info(&[
            json!({"params": {"a": {"prior": {"min": 0, "max": 1}, "latex": "a"}}, "output": "x"}),
            json!({"params": {"a": 0.5, "b": null}}),
        ])
        .unwrap();
        assert_eq!(merged["params"]["a"], json!({"latex": "a", "value": 0.5}));
        assert_eq!(merged["params"]["b"], json!({"derived": true}));
        assert_eq!(merged["output"], json!("x"));
    }

    #[test]
    fn single_info_is_returned_as_is() {
        let info = json!({"params": {"a": 1}});
        assert_eq!(merge_info(std::slice::from_ref(&info)).unwrap(), info);
    }

    #[test]
    fn nothing_to_merge_fails() {
        assert!(matches!(merge_info(&[]), Err(ResolveError::EmptyMerge)));
    }
}
