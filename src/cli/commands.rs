use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "alexandria")]
#[command(version, about = "Template persistence for node-graph prompt workflows")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the template API server
    Serve {
        /// Port to bind on 127.0.0.1
        #[arg(long, default_value_t = 8189)]
        port: u16,

        /// Storage directory (defaults to ./alexandria_templates)
        #[arg(long, value_name = "DIR")]
        storage_dir: Option<PathBuf>,
    },

    /// List stored templates
    List {
        /// Storage directory (defaults to ./alexandria_templates)
        #[arg(long, value_name = "DIR")]
        storage_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a template by name
    Delete {
        /// Template name (sanitized to locate the file)
        name: String,

        /// Storage directory (defaults to ./alexandria_templates)
        #[arg(long, value_name = "DIR")]
        storage_dir: Option<PathBuf>,
    },
}
