use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hbrip")]
#[command(author, version, about = "Batch ripping planner and driver for HandBrakeCLI")]
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
    /// Scan a source and display its titles and tracks
    Scan {
        /// Source to scan (device, disc directory, or file)
        #[arg(required = true)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Read scan text from this file if it exists, write it otherwise
        #[arg(long)]
        scan_file: Option<PathBuf>,
    },

    /// Plan conversions without running the tool
    Plan {
        /// Source to plan for
        #[arg(required = true)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Read scan text from this file if it exists, write it otherwise
        #[arg(long)]
        scan_file: Option<PathBuf>,

        #[command(flatten)]
        opts: ConvertOpts,
    },

    /// Plan and run conversions
    Convert {
        /// Source to convert
        #[arg(required = true)]
        input: PathBuf,

        /// Read scan text from this file if it exists, write it otherwise
        #[arg(long)]
        scan_file: Option<PathBuf>,

        /// Print the commands without executing them
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        opts: ConvertOpts,
    },

    /// List the tool's preset catalog
    Presets,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Per-run overrides of the configuration file.
#[derive(Args)]
pub struct ConvertOpts {
    /// Output path template (#pos#, #size#, #fps#, #ts#, #title#, #input#)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Preset name from the tool's catalog
    #[arg(long)]
    pub preset: Option<String>,

    /// Only convert the main feature
    #[arg(long)]
    pub main_feature: bool,

    /// Overwrite existing output files
    #[arg(long)]
    pub force: bool,

    /// Title positions or ranges, e.g. 1,3-5
    #[arg(long, value_delimiter = ',')]
    pub titles: Option<Vec<String>>,

    /// Audio languages (ISO 639-2) in preference order
    #[arg(long, value_delimiter = ',')]
    pub audio: Option<Vec<String>>,

    /// Subtitle languages (ISO 639-2) in preference order
    #[arg(long, value_delimiter = ',')]
    pub subtitles: Option<Vec<String>>,

    /// Minimum title duration, hh:mm:ss
    #[arg(long)]
    pub min_length: Option<String>,

    /// Maximum title duration, hh:mm:ss
    #[arg(long)]
    pub max_length: Option<String>,

    /// Skip titles the source contains twice (by block count)
    #[arg(long)]
    pub skip_duplicates: bool,

    /// Drop commentary tracks
    #[arg(long)]
    pub skip_commentary: bool,

    /// Keep only the first track per language
    #[arg(long)]
    pub first_track_per_language: bool,

    /// Preview window, start or start-stop (hh:mm:ss or seconds)
    #[arg(long)]
    pub preview: Option<String>,

    /// Chapter range passed through, e.g. 1-4
    #[arg(long)]
    pub chapters: Option<String>,

    /// Extra argument text passed through to the tool
    #[arg(long)]
    pub extra_args: Option<String>,
}
