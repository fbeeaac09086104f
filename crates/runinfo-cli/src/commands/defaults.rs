use crate::support::{load_registry_or_exit, parse_kind_or_exit, print_json, reject};
use runinfo_kernel::{Options, default_info};
use serde_json::{Value, json};

pub struct Args {
    pub kind: String,
    pub name: String,
    pub catalog: String,
    pub class: Option<String>,
    pub component_path: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let kind = parse_kind_or_exit(&args.kind);
    let registry = load_registry_or_exit(&args.catalog);
    let (defaults, annotations) = default_info(
        &registry,
        &args.name,
        kind,
        &Options::new(),
        args.class.as_deref(),
        args.component_path.as_deref(),
    )
    .unwrap_or_else(|e| reject(e));

    if args.json {
        print_json(&json!({
            "kind": kind,
            "name": args.name,
            "defaults": Value::Object(defaults),
            "annotations": annotations,
        }));
        return;
    }

    println!("runinfo defaults {kind} {}", args.name);
    for (option, value) in &defaults {
        println!("  {option}: {value}");
    }
    if !annotations.is_empty() {
        println!("  Declared without default:");
        for (option, type_name) in &annotations {
            println!("    {option}: {type_name}");
        }
    }
}
