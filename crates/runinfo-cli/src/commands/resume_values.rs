use crate::support::{load_registry_or_exit, print_json, read_info_or_exit};
use runinfo_kernel::preferred_old_values;
use serde_json::{Value, json};

pub fn run(old: String, catalog: String, json_output: bool) {
    let registry = load_registry_or_exit(&catalog);
    let info = read_info_or_exit(&old, "old info");
    let kept = preferred_old_values(&info, &registry);

    if json_output {
        print_json(&json!({
            "old": old,
            "preferredOldValues": Value::Object(kept),
        }));
        return;
    }

    println!("runinfo resume-values {old}");
    let lines = flatten(&kept);
    if lines.is_empty() {
        println!("  No options are kept from the old run");
    }
    for line in lines {
        println!("  {line}");
    }
}

/// `kind.component.option = value`, one per kept option.
fn flatten(kept: &runinfo_kernel::Options) -> Vec<String> {
    let mut lines = Vec::new();
    for (kind, components) in kept {
        for (component, options) in components.as_object().into_iter().flatten() {
            for (option, value) in options.as_object().into_iter().flatten() {
                lines.push(format!("{kind}.{component}.{option} = {value}"));
            }
        }
    }
    lines
}
