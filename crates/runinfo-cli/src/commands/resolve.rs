use crate::support::{load_registry_or_exit, member_names, print_json, read_info_or_exit, reject};
use runinfo_kernel::{Kind, resolve};
use serde_json::Value;

#[derive(Debug, Default, PartialEq, Eq)]
struct ParamCounts {
    sampled: usize,
    fixed: usize,
    derived: usize,
}

impl ParamCounts {
    fn of(params: Option<&Value>) -> Self {
        let mut counts = Self::default();
        for info in params.and_then(Value::as_object).into_iter().flat_map(|p| p.values()) {
            if info.get("prior").is_some() {
                counts.sampled += 1;
            } else if info.get("value").is_some() {
                counts.fixed += 1;
            } else {
                counts.derived += 1;
            }
        }
        counts
    }

    fn total(&self) -> usize {
        self.sampled + self.fixed + self.derived
    }
}

pub fn run(input: String, catalog: String, json_output: bool) {
    let registry = load_registry_or_exit(&catalog);
    let raw = read_info_or_exit(&input, "input info");
    let resolved = resolve(&raw, &registry).unwrap_or_else(|e| reject(e));

    if json_output {
        print_json(&resolved);
        return;
    }

    println!("runinfo resolve {input}");
    println!("  Catalog: {catalog}");
    for kind in Kind::ALL {
        let names = member_names(&resolved, kind.as_str());
        if !names.is_empty() {
            println!("  {kind}: {}", names.join(", "));
        }
    }
    let counts = ParamCounts::of(resolved.get("params"));
    println!(
        "  Parameters: {} ({} sampled, {} fixed, {} derived)",
        counts.total(),
        counts.sampled,
        counts.fixed,
        counts.derived
    );
    if let Some(prior) = resolved.get("prior").and_then(Value::as_object) {
        println!("  Priors: {}", prior.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_are_counted_by_role() {
        let params = json!({
            "a": {"prior": {"min": 0, "max": 1}},
            "b": {"value": 2},
            "c": {"value": "lambda a: 2*a", "derived": true},
            "chi2__sn": {"derived": true}
        });
        assert_eq!(
            ParamCounts::of(Some(&params)),
            ParamCounts {
                sampled: 1,
                fixed: 2,
                derived: 1
            }
        );
        assert_eq!(ParamCounts::of(None).total(), 0);
    }
}
