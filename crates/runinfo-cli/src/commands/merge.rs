use crate::support::{print_json, read_info_or_exit, reject};
use runinfo_kernel::merge_info;

pub fn run(paths: Vec<String>, json_output: bool) {
    let infos: Vec<_> = paths
        .iter()
        .map(|path| read_info_or_exit(path, "info"))
        .collect();
    let merged = merge_info(&infos).unwrap_or_else(|e| reject(e));

    if json_output {
        print_json(&merged);
        return;
    }

    println!("runinfo merge {}", paths.join(" "));
    if let Some(blocks) = merged.as_object() {
        let keys: Vec<&str> = blocks.keys().map(String::as_str).collect();
        println!("  Blocks: {}", keys.join(", "));
        let params = blocks
            .get("params")
            .and_then(|p| p.as_object())
            .map(|p| p.len())
            .unwrap_or(0);
        println!("  Parameters: {params}");
    }
}
