//! CLI tool for encvault container files.

mod commands;
mod exit_codes;
mod output;
mod password;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Password-based .enc container encryption
#[derive(Parser)]
#[command(name = "encvault")]
#[command(author, version, about = "Password-based .enc container encryption", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the container files
    #[arg(long, short = 'd', env = "ENCVAULT_DIR", global = true)]
    dir: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List container files in the directory (alias: ls)
    #[command(alias = "ls")]
    List,

    /// Create a new empty container file
    Create {
        /// Container file name
        file: String,
    },

    /// Write a fresh header onto an empty container
    Init {
        /// Container file name
        file: String,

        /// Hash mode: 1 = SHA-256, 2 = SHA-384, 3 = SHA-512
        #[arg(long, default_value = "3")]
        hash_mode: u8,

        /// Chainhash mode for both chainhashes (1-5)
        #[arg(long, default_value = "4")]
        chainhash_mode: u8,

        /// Iteration count for both chainhashes
        #[arg(long, conflicts_with = "budget_ms")]
        iterations: Option<u64>,

        /// Millisecond budget per chainhash; the iteration count is
        /// whatever this machine manages in that time
        #[arg(long)]
        budget_ms: Option<u64>,
    },

    /// Decrypt and show stored records
    Show {
        /// Container file name
        file: String,

        /// Show only this site
        site: Option<String>,

        /// Print stored passwords instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Add or update a record
    Set {
        /// Container file name
        file: String,

        /// Site the record belongs to
        site: String,
    },

    /// Remove a record
    Remove {
        /// Container file name
        file: String,

        /// Site to remove
        site: String,
    },

    /// Delete a container file
    Destroy {
        /// Container file name
        file: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.dir, cli.quiet);

    let result = match cli.command {
        Commands::List => commands::list(&ctx),
        Commands::Create { file } => commands::create(&ctx, &file),
        Commands::Init {
            file,
            hash_mode,
            chainhash_mode,
            iterations,
            budget_ms,
        } => commands::init(&ctx, &file, hash_mode, chainhash_mode, iterations, budget_ms),
        Commands::Show { file, site, reveal } => commands::show(&ctx, &file, site.as_deref(), reveal),
        Commands::Set { file, site } => commands::set(&ctx, &file, &site),
        Commands::Remove { file, site } => commands::remove(&ctx, &file, &site),
        Commands::Destroy { file, force } => commands::destroy(&ctx, &file, force),
    };

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(exit_codes::error_to_exit_code(&e));
        }
    }
}
