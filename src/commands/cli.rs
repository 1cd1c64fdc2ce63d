use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `aligntool` - Align molecular complexes to a reference frame.
#[derive(Parser, Debug)]
#[command(name = "aligntool")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Align complexes to a reference complex, with undo.", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.aligntool/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Align targets to a reference once and print the result
    Align {
        /// Workspace JSON file listing the structures
        #[arg(short, long)]
        workspace: PathBuf,

        /// Id of the reference structure
        #[arg(short, long)]
        reference: u64,

        /// Ids of the target structures, in alignment order
        #[arg(short, long = "target", required = true, num_args = 1..)]
        targets: Vec<u64>,
    },

    /// Start an interactive session driven by slash commands on stdin
    Session {
        /// Workspace JSON file listing the structures
        #[arg(short, long)]
        workspace: PathBuf,
    },
}
