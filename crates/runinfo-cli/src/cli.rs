use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "runinfo",
    about = "Runinfo: resolve run configurations against component defaults and check resume equivalence",
    version
)]
pub struct Cli {
    /// Log merge decisions and comparison diffs (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a raw info (JSON or TOML) into the fully expanded info
    Resolve {
        /// Path to the raw info
        input: String,

        /// Path to the component catalog
        #[arg(long)]
        catalog: String,

        /// Print the resolved info as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decide whether a run resolved as OLD may be resumed as NEW (exit 1 if not)
    Compare {
        /// Path to the old resolved info
        old: String,

        /// Path to the new resolved info
        new: String,

        /// Path to the component catalog
        #[arg(long)]
        catalog: String,

        /// Ignore run-control options, member order and presentation fields
        #[arg(long)]
        relaxed: bool,

        /// Top-level block to skip entirely (repeatable)
        #[arg(long = "ignore-block")]
        ignore_blocks: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the option values of an old resolved info that survive a resume
    ResumeValues {
        /// Path to the old resolved info
        old: String,

        /// Path to the component catalog
        #[arg(long)]
        catalog: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge infos left to right, later infos taking precedence
    Merge {
        /// Paths to the infos
        #[arg(required = true)]
        infos: Vec<String>,

        /// Print the merged info as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a component's flattened defaults and undefined annotations
    Defaults {
        /// Component kind: sampler, theory, or likelihood
        kind: String,

        /// Component name
        name: String,

        /// Path to the component catalog
        #[arg(long)]
        catalog: String,

        /// Explicit class name to resolve instead of NAME
        #[arg(long)]
        class: Option<String>,

        /// Component namespace searched first
        #[arg(long)]
        component_path: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
