//! Integration tests: run the resolution vectors in tests/fixtures/.
//!
//! Each fixture has:
//! - case.json: the operation (`resolve`, `compare`, `resume`, `merge`) and its input
//! - expect.json: the expected result, or the expected error variant and message
//!
//! All vectors run against the same toy registry built below. Expected key
//! orders are listed under `order`, keyed by a dotted path (`""` is the root).

use runinfo_kernel::{
    ComponentDescriptor, ComponentRegistry, Equivalence, EquivalencePolicy, Kind, Options,
    ResolveError, compare_info, is_equal, merge_info, preferred_old_values, resolve,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn options(value: Value) -> Options {
    value.as_object().cloned().unwrap_or_default()
}

fn toy_registry() -> ComponentRegistry {
    let likelihood_base = Arc::new(ComponentDescriptor::new("likelihood").with_attributes(
        options(json!({"type": null, "speed": -1, "stop_at_error": false})),
    ));
    let h0 = json!({"prior": {"min": 40, "max": 100}, "latex": "H_0"});

    let mut registry = ComponentRegistry::new();
    registry
        .register_kind_base(Kind::Likelihood, likelihood_base.clone())
        .register(
            Kind::Sampler,
            "mcmc",
            Arc::new(
                ComponentDescriptor::new("mcmc")
                    .with_attributes(options(json!({
                        "burn_in": 0, "max_tries": 40, "seed": null, "covmat": null
                    })))
                    .prefer_old_at_resume(["seed", "covmat"])
                    .prefer_new_at_resume(["max_tries"]),
            ),
        )
        .register(
            Kind::Theory,
            "camb",
            Arc::new(ComponentDescriptor::new("camb").with_attributes(options(json!({
                "accuracy": 1,
                "renames": {"H0": ["hubble"]},
                "params": {"H0": h0}
            })))),
        )
        .register(
            Kind::Theory,
            "classy",
            Arc::new(ComponentDescriptor::new("classy").with_attributes(options(json!({
                "precision": 1,
                "renames": {"hubble": "h_100"},
                "params": {"H0": h0}
            })))),
        )
        .register(
            Kind::Likelihood,
            "sn",
            Arc::new(
                ComponentDescriptor::new("sn")
                    .with_parent(likelihood_base.clone())
                    .with_attributes(options(json!({
                        "type": "sn",
                        "params": {"M": {"prior": {"min": -20, "max": -18}, "latex": "M"}},
                        "prior": {"M_gauss": "lambda M: -0.5*(M+19.3)**2"}
                    }))),
            ),
        )
        .register(
            Kind::Likelihood,
            "sn_alt",
            Arc::new(
                ComponentDescriptor::new("sn_alt")
                    .with_parent(likelihood_base.clone())
                    .with_attributes(options(json!({
                        "type": "sn",
                        "prior": {"M_gauss": "lambda M: -0.5*(M+19.0)**2"}
                    }))),
            ),
        )
        .register(
            Kind::Likelihood,
            "bao",
            Arc::new(
                ComponentDescriptor::new("bao")
                    .with_parent(likelihood_base)
                    .with_attributes(options(json!({
                        "type": ["bao"],
                        "params": {"H0": {"prior": {"min": 50, "max": 90}}}
                    }))),
            ),
        );
    registry
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn error_name(err: &ResolveError) -> &'static str {
    match err {
        ResolveError::MalformedBlock { .. } => "MalformedBlock",
        ResolveError::NotAMapping { .. } => "NotAMapping",
        ResolveError::UnrecognizedOptions { .. } => "UnrecognizedOptions",
        ResolveError::ConflictingDefault { .. } => "ConflictingDefault",
        ResolveError::MalformedRenames { .. } => "MalformedRenames",
        ResolveError::AutoParamTemplate { .. } => "AutoParamTemplate",
        ResolveError::AutoParamRange { .. } => "AutoParamRange",
        ResolveError::ClassConfig { .. } => "ClassConfig",
        ResolveError::Defaults { .. } => "Defaults",
        ResolveError::RegistryLookup { .. } => "RegistryLookup",
        ResolveError::EmptyMerge => "EmptyMerge",
    }
}

fn at_path<'a>(value: &'a Value, path: &str) -> &'a Value {
    if path.is_empty() {
        return value;
    }
    path.split('.').fold(value, |current, key| &current[key])
}

fn key_order(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case = read_json(&dir.join("case.json"));
    let expected = read_json(&dir.join("expect.json"));
    let registry = toy_registry();

    let outcome: Result<Value, ResolveError> = match case["op"].as_str() {
        Some("resolve") => resolve(&case["info"], &registry),
        Some("merge") => {
            let infos = case["infos"].as_array().cloned().unwrap_or_default();
            merge_info(&infos)
        }
        Some("resume") => Ok(Value::Object(preferred_old_values(&case["old"], &registry))),
        Some("compare") => {
            let policy = if case["strict"].as_bool().unwrap_or(true) {
                EquivalencePolicy::strict()
            } else {
                EquivalencePolicy::relaxed()
            };
            compare_info(&case["old"], &case["new"], &policy, &registry).map(|equivalence| {
                match equivalence {
                    Equivalence::Equal => json!({"equal": true}),
                    Equivalence::Different(mismatch) => {
                        json!({"equal": false, "mismatch": mismatch.to_string()})
                    }
                }
            })
        }
        other => panic!("fixture {name}: unknown op {other:?}"),
    };

    match outcome {
        Ok(got) => {
            if case["op"] == "compare" {
                assert_eq!(got, expected, "\n\nFixture: {name}\n");
                return;
            }
            assert!(
                expected.get("error").is_none(),
                "fixture {name}: expected an error, got {got}"
            );
            assert_eq!(
                got,
                expected["result"],
                "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
                serde_json::to_string_pretty(&got).unwrap(),
                serde_json::to_string_pretty(&expected["result"]).unwrap(),
            );
            if let Some(orders) = expected.get("order").and_then(Value::as_object) {
                for (path, order) in orders {
                    let order: Vec<String> = serde_json::from_value(order.clone())
                        .unwrap_or_else(|e| panic!("fixture {name}: bad order list: {e}"));
                    assert_eq!(
                        key_order(at_path(&got, path)),
                        order,
                        "fixture {name}: key order at '{path}'"
                    );
                }
            }
        }
        Err(err) => {
            assert_eq!(
                Some(error_name(&err)),
                expected["error"].as_str(),
                "fixture {name}: unexpected error {err}"
            );
            if let Some(message) = expected["message"].as_str() {
                assert_eq!(err.to_string(), message, "fixture {name}");
            }
        }
    }
}

#[test]
fn resolve_defaults_fill_entries() {
    run_fixture("resolve_defaults_fill_entries");
}

#[test]
fn resolve_rename_union() {
    run_fixture("resolve_rename_union");
}

#[test]
fn resolve_conflicting_param_default() {
    run_fixture("resolve_conflicting_param_default");
}

#[test]
fn resolve_conflicting_prior() {
    run_fixture("resolve_conflicting_prior");
}

#[test]
fn resolve_auto_params() {
    run_fixture("resolve_auto_params");
}

#[test]
fn resolve_auto_params_missing_placeholder() {
    run_fixture("resolve_auto_params_missing_placeholder");
}

#[test]
fn resolve_unrecognized_option() {
    run_fixture("resolve_unrecognized_option");
}

#[test]
fn compare_member_order_relaxed() {
    run_fixture("compare_member_order_relaxed");
}

#[test]
fn compare_member_order_strict() {
    run_fixture("compare_member_order_strict");
}

#[test]
fn compare_prior_change_relaxed() {
    run_fixture("compare_prior_change_relaxed");
}

#[test]
fn resume_prefers_old_values() {
    run_fixture("resume_prefers_old_values");
}

#[test]
fn merge_params_layers() {
    run_fixture("merge_params_layers");
}

#[test]
fn resolving_twice_is_strictly_equal() {
    let registry = toy_registry();
    for name in [
        "resolve_defaults_fill_entries",
        "resolve_rename_union",
        "resolve_auto_params",
    ] {
        let case = read_json(&fixtures_dir().join(name).join("case.json"));
        let once = resolve(&case["info"], &registry).unwrap();
        let twice = resolve(&once, &registry).unwrap();
        assert!(
            is_equal(&once, &twice, true, &registry).unwrap(),
            "fixture {name}: resolving again changed the info\n{}\nvs\n{}",
            serde_json::to_string_pretty(&once).unwrap(),
            serde_json::to_string_pretty(&twice).unwrap(),
        );
    }
}

#[test]
fn empty_entry_resolves_to_class_defaults() {
    let registry = toy_registry();
    let resolved = resolve(&json!({"likelihood": {"sn": null}}), &registry).unwrap();
    let (defaults, _) = runinfo_kernel::default_info(
        &registry,
        "sn",
        Kind::Likelihood,
        &Options::new(),
        None,
        None,
    )
    .unwrap();
    assert_eq!(resolved["likelihood"]["sn"], Value::Object(defaults));
}
