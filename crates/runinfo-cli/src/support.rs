use runinfo_catalog::{load_catalog, read_document};
use runinfo_kernel::{ComponentRegistry, Kind};
use serde_json::Value;
use std::fmt::Display;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Exit code for a rejected resolution or a failed comparison.
pub const EXIT_REJECTED: i32 = 1;
/// Exit code for input that cannot be read or parsed.
pub const EXIT_UNREADABLE: i32 = 2;

/// Install the stderr logger; `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

pub fn load_registry_or_exit(catalog: &str) -> ComponentRegistry {
    load_catalog(Path::new(catalog)).unwrap_or_else(|e| {
        eprintln!("error: failed to load catalog: {e}");
        std::process::exit(EXIT_UNREADABLE);
    })
}

pub fn read_info_or_exit(path: &str, label: &str) -> Value {
    let info = read_document(Path::new(path)).unwrap_or_else(|e| {
        eprintln!("error: failed to load {label}: {e}");
        std::process::exit(EXIT_UNREADABLE);
    });
    if !info.is_object() {
        eprintln!("error: {label} at {path} must be a mapping");
        std::process::exit(EXIT_UNREADABLE);
    }
    info
}

pub fn parse_kind_or_exit(kind: &str) -> Kind {
    kind.parse().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_UNREADABLE);
    })
}

pub fn reject(err: impl Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(EXIT_REJECTED);
}

pub fn print_json(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization")
    );
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

/// Member names of the `block` mapping of `info`, in order.
pub fn member_names(info: &Value, block: &str) -> Vec<String> {
    info.get(block)
        .and_then(Value::as_object)
        .map(|members| members.keys().cloned().collect())
        .unwrap_or_default()
}
