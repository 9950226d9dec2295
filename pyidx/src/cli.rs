// CLI argument parsing and definitions

use clap::{Args as ClapArgs, Parser, Subcommand};
use pyidx_logging::LogFormat;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pyidx")]
#[command(about = "Publish Python packages to a bucket-hosted simple index")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format (human or json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,
}

/// Where the bucket lives; each flag overrides the configuration file.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct StoreArgs {
    /// Bucket name (required with --endpoint)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Key prefix for every object, e.g. "simple"
    #[arg(long)]
    pub prefix: Option<String>,

    /// Store indexes as <dir>/index.html for static website hosting
    #[arg(long)]
    pub static_website: bool,

    /// Use a local directory as the bucket
    #[arg(long, conflicts_with = "endpoint")]
    pub store_dir: Option<PathBuf>,

    /// S3-compatible endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload distributions and update their indexes
    Upload {
        /// Distribution files, directories or glob patterns
        #[arg(required = true)]
        dists: Vec<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,

        /// Canned ACL for uploaded objects
        #[arg(long)]
        acl: Option<String>,

        /// Re-upload files the index already lists
        #[arg(long)]
        force: bool,

        /// Leave the root index untouched
        #[arg(long)]
        no_root_index: bool,

        /// Show what would be uploaded without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the publish reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the files listed in a package's index
    List {
        /// Package name
        package: String,

        #[command(flatten)]
        store: StoreArgs,

        /// Print the index as JSON
        #[arg(long)]
        json: bool,
    },
}
