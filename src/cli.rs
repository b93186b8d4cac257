use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vodforge")]
#[command(author, version, about = "Media preparation pipeline for VOD backends")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcode a source file to HLS and upload the artifact tree
    Prepare {
        /// Source container file
        #[arg(required = true)]
        input: PathBuf,

        /// Media identifier; names the output directory and object prefix
        #[arg(long)]
        media_id: String,

        /// Transcode only, skip the upload
        #[arg(long)]
        skip_upload: bool,
    },

    /// Remove every uploaded object under a media prefix
    Delete {
        /// Media identifier whose artifacts should be removed
        #[arg(long)]
        media_id: String,
    },

    /// Probe a media file and display the discovered streams
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default locations if not specified)
        config: Option<PathBuf>,
    },
}
