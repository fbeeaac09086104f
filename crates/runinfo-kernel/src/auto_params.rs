//! Auto-parameters: one template instantiated once per value of its range.

use crate::Options;
use crate::conventions::{AUTO_PLACEHOLDER, AUTO_RANGE};
use crate::error::ResolveError;
use crate::params::expand_param_info;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Longest range an `auto_range` expression may produce.
pub const MAX_RANGE_LEN: i128 = 100_000;

fn range_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^range\(\s*(-?\d+)\s*(?:,\s*(-?\d+)\s*)?(?:,\s*(-?\d+)\s*)?\)$")
            .expect("range regex must compile")
    })
}

/// Instantiate every template of an `auto_params` block into `params`.
///
/// The template name must contain `%s`; its body must carry an `auto_range`.
/// Each value of the range replaces `%s` in the name and in every string of
/// the body, nested mappings included. Instances are stored expanded, as a
/// user-supplied parameter would be, so resolving the result again is a
/// no-op.
pub fn make_auto_params(auto_params: &Options, params: &mut Options) -> Result<(), ResolveError> {
    for (template, body) in auto_params {
        if !template.contains(AUTO_PLACEHOLDER) {
            return Err(ResolveError::AutoParamTemplate {
                name: template.clone(),
            });
        }
        let mut body = match body {
            Value::Object(map) => map.clone(),
            _ => {
                return Err(range_error(template, "the definition must be a mapping"));
            }
        };
        let range = body
            .shift_remove(AUTO_RANGE)
            .ok_or_else(|| range_error(template, "missing auto_range"))?;
        let values = range_values(template, &range)?;
        tracing::debug!(template = %template, count = values.len(), "expanding auto-parameter");
        for value in &values {
            let tag = tag_text(value);
            let instance = substitute(Value::Object(body.clone()), &tag);
            params.insert(
                template.replace(AUTO_PLACEHOLDER, &tag),
                Value::Object(expand_param_info(&instance, true)),
            );
        }
    }
    Ok(())
}

/// The values an `auto_range` declaration stands for.
///
/// Either a literal list, or a string holding a JSON list or a
/// `range(start, stop, step)` call with Python semantics.
pub fn range_values(name: &str, range: &Value) -> Result<Vec<Value>, ResolveError> {
    match range {
        Value::Array(values) => Ok(values.clone()),
        Value::String(expression) => evaluate_range(name, expression.trim()),
        other => Err(range_error(
            name,
            &format!("expected a list or a range expression, got {other}"),
        )),
    }
}

fn evaluate_range(name: &str, expression: &str) -> Result<Vec<Value>, ResolveError> {
    if expression.starts_with('[') {
        return serde_json::from_str::<Vec<Value>>(expression)
            .map_err(|e| range_error(name, &format!("'{expression}' is not a list: {e}")));
    }
    let captures = range_call_re()
        .captures(expression)
        .ok_or_else(|| range_error(name, &format!("cannot evaluate '{expression}'")))?;
    let mut args = Vec::with_capacity(3);
    for group in captures.iter().skip(1).flatten() {
        let arg = group
            .as_str()
            .parse::<i64>()
            .map_err(|e| range_error(name, &format!("bad range argument: {e}")))?;
        args.push(arg);
    }
    let (start, stop, step) = match args.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(range_error(name, &format!("cannot evaluate '{expression}'"))),
    };
    if step == 0 {
        return Err(range_error(name, "range step must not be zero"));
    }
    let len = range_len(start, stop, step);
    if len > MAX_RANGE_LEN {
        return Err(range_error(
            name,
            &format!("'{expression}' has {len} values, more than {MAX_RANGE_LEN}"),
        ));
    }
    let mut values = Vec::with_capacity(len as usize);
    let mut current = Some(start);
    while let Some(value) = current {
        if !((step > 0 && value < stop) || (step < 0 && value > stop)) {
            break;
        }
        values.push(Value::from(value));
        current = value.checked_add(step);
    }
    Ok(values)
}

/// Number of values in `range(start, stop, step)`, computed without overflow.
fn range_len(start: i64, stop: i64, step: i64) -> i128 {
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let span = if step > 0 { stop - start } else { start - stop };
    if span <= 0 {
        return 0;
    }
    let step = step.abs();
    (span + step - 1) / step
}

fn tag_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn substitute(item: Value, tag: &str) -> Value {
    match item {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, substitute(value, tag)))
                .collect(),
        ),
        Value::String(s) if s.contains(AUTO_PLACEHOLDER) => {
            Value::String(s.replace(AUTO_PLACEHOLDER, tag))
        }
        other => other,
    }
}

fn range_error(name: &str, reason: &str) -> ResolveError {
    ResolveError::AutoParamRange {
        name: name.to_string(),
        reason: reason.to_string(),
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
    fn literal_range_expands_names_and_labels() {
        let auto = options(json!({
            "bin%s": {"auto_range": [1, 2, 3], "latex": "b_%s", "prior": {"min": 0, "max": 1}}
        }));
        let mut params = Options::new();
        make_auto_params(&auto, &mut params).unwrap();
        assert_eq!(
            params.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["bin1", "bin2", "bin3"]
        );
        assert_eq!(
            params["bin2"],
            json!({"latex": "b_2", "prior": {"min": 0, "max": 1}})
        );
    }

    #[test]
    fn substitution_reaches_nested_mappings() {
        let auto = options(json!({
            "amp_%s": {"auto_range": ["lo", "hi"], "prior": {"dist": "norm", "label": "amp %s"}}
        }));
        let mut params = Options::new();
        make_auto_params(&auto, &mut params).unwrap();
        assert_eq!(params["amp_hi"]["prior"]["label"], json!("amp hi"));
    }

    #[test]
    fn range_expressions() {
        assert_eq!(
            range_values("x", &json!("range(3)")).unwrap(),
            vec![json!(0), json!(1), json!(2)]
        );
        assert_eq!(
            range_values("x", &json!("range(1, 7, 2)")).unwrap(),
            vec![json!(1), json!(3), json!(5)]
        );
        assert_eq!(
            range_values("x", &json!("range(3, 0, -1)")).unwrap(),
            vec![json!(3), json!(2), json!(1)]
        );
        assert_eq!(
            range_values("x", &json!("[0.5, 1.5]")).unwrap(),
            vec![json!(0.5), json!(1.5)]
        );
        assert!(range_values("x", &json!("range(1, 2, 0)")).is_err());
        assert!(range_values("x", &json!("linspace(0, 1)")).is_err());
        assert!(range_values("x", &json!(3)).is_err());
    }

    #[test]
    fn instances_are_stored_expanded() {
        let auto = options(json!({
            "shift%s": {"auto_range": "range(2)", "latex": "s_%s"},
            "fixed%s": {"auto_range": [7], "value": "lambda a: %s*a"}
        }));
        let mut params = Options::new();
        make_auto_params(&auto, &mut params).unwrap();
        assert_eq!(params["shift1"], json!({"latex": "s_1", "derived": true}));
        assert_eq!(
            params["fixed7"],
            json!({"value": "lambda a: 7*a", "derived": true})
        );
    }

    #[test]
    fn range_near_integer_limit_stops_without_overflow() {
        assert_eq!(
            range_values("x", &json!("range(9223372036854775806, 9223372036854775807, 10)"))
                .unwrap(),
            vec![json!(9223372036854775806_i64)]
        );
        assert_eq!(
            range_values("x", &json!("range(-9223372036854775807, -9223372036854775808, -5)"))
                .unwrap(),
            vec![json!(-9223372036854775807_i64)]
        );
    }

    #[test]
    fn oversized_range_is_rejected() {
        let err = range_values("x", &json!("range(1000000000000000000)")).unwrap_err();
        assert!(matches!(err, ResolveError::AutoParamRange { ref name, .. } if name == "x"));
        assert_eq!(
            range_values("x", &json!("range(0, 200000, 2)")).unwrap().len(),
            100_000
        );
    }

    #[test]
    fn template_without_placeholder_fails() {
        let auto = options(json!({"bin": {"auto_range": [1]}}));
        let err = make_auto_params(&auto, &mut Options::new()).unwrap_err();
        assert!(matches!(err, ResolveError::AutoParamTemplate { ref name } if name == "bin"));
    }

    #[test]
    fn missing_range_fails() {
        let auto = options(json!({"bin%s": {"latex": "b"}}));
        let err = make_auto_params(&auto, &mut Options::new()).unwrap_err();
        assert!(matches!(err, ResolveError::AutoParamRange { .. }));
    }
}
