use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "apicorpus", version, about = "Maintain a corpus of converted API descriptions")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Collection root directory.
    #[arg(long, global = true, default_value = "APIs")]
    pub store_root: PathBuf,

    /// Config file (default: <store-root>/apicorpus.json when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Exit 0 even when some documents failed.
    #[arg(long, global = true)]
    pub force_success: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the source URL of every stored document.
    Urls,

    /// Re-run the pipeline for every stored document against its recorded source.
    Update,

    /// Re-run conversion and validation for every stored document without writing.
    Validate,

    /// Run the pipeline once for a new source.
    Add {
        /// Source format id (see `plugins`).
        format: String,

        /// Source URL or local path.
        url: String,

        /// On failure, open an editor on the converted document and record the correction.
        #[arg(long)]
        fixup: bool,
    },

    /// Emit the version index.
    Api {
        /// Prefix for every `swaggerUrl`.
        root_url: String,

        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List available converters and validators.
    Plugins,
}
