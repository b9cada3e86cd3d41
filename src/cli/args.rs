// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Import shared bookmark files into a bookmark database
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[arg(long = "no-color", help = "disable colored output")]
    pub no_color: bool,

    #[arg(long = "generate-config", help = "print a default config file and exit")]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Imports bookmarks from a shared file after confirmation
    Import {
        /// File path or URL of the shared bookmark file
        locator: Option<String>,

        #[arg(
            long = "extra-stream",
            value_name = "LOCATOR",
            help = "secondary attachment, used when no primary locator is given"
        )]
        extra_stream: Option<String>,

        #[arg(short = 'y', long = "yes", help = "import without asking for confirmation")]
        yes: bool,
    },
    /// Decodes a shared file and prints it as JSON without importing
    Preview {
        /// File path or URL of the shared bookmark file
        locator: String,
    },
    /// Initialize bookmark database
    CreateDb {
        /// pathname to database file
        path: String,
    },
    /// Prints the effective configuration
    ShowConfig,
}
