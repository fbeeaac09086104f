use crate::support::{
    EXIT_REJECTED, load_registry_or_exit, print_json, read_info_or_exit, reject, yes_no,
};
use runinfo_kernel::{Equivalence, EquivalencePolicy, InfoMismatch, compare_info};
use serde_json::{Value, json};

pub struct Args {
    pub old: String,
    pub new: String,
    pub catalog: String,
    pub relaxed: bool,
    pub ignore_blocks: Vec<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let registry = load_registry_or_exit(&args.catalog);
    let old = read_info_or_exit(&args.old, "old info");
    let new = read_info_or_exit(&args.new, "new info");

    let policy = args.ignore_blocks.iter().fold(
        if args.relaxed {
            EquivalencePolicy::relaxed()
        } else {
            EquivalencePolicy::strict()
        },
        |policy, block| policy.ignoring(block.clone()),
    );
    let mode = if policy.strict { "strict" } else { "relaxed" };
    let outcome =
        compare_info(&old, &new, &policy, &registry).unwrap_or_else(|e| reject(e));

    let mismatch = match &outcome {
        Equivalence::Equal => None,
        Equivalence::Different(mismatch) => Some(mismatch),
    };
    let diff = match mismatch {
        Some(InfoMismatch::Content { old, new, .. }) => Some((old, new)),
        _ => None,
    };
    if let Some((old, new)) = diff {
        tracing::debug!(%old, %new, "differing options (old vs new)");
    }

    if args.json {
        let payload = json!({
            "old": args.old,
            "new": args.new,
            "mode": mode,
            "equal": outcome.is_equal(),
            "mismatch": mismatch.map(ToString::to_string),
            "diff": diff.map(|(old, new)| json!({"old": old, "new": new})).unwrap_or(Value::Null),
        });
        print_json(&payload);
    } else {
        println!("runinfo compare {} {}", args.old, args.new);
        println!("  Mode: {mode}");
        println!("  Equal: {}", yes_no(outcome.is_equal()));
        if let Some(mismatch) = mismatch {
            println!("  Mismatch: {mismatch}");
        }
        if let Some((old, new)) = diff {
            println!("  Old: {old}");
            println!("  New: {new}");
        }
    }

    if !outcome.is_equal() {
        std::process::exit(EXIT_REJECTED);
    }
}
