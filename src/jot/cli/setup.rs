use clap::{Parser, Subcommand};
use jot::limits::parse_size;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jot", bin_name = "jot", version)]
#[command(about = "Self-hosted scratch notes: name, save, lock and archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory holding config.json and the note tiers
    #[arg(long, global = true, env = "JOT_HOME", help_heading = "Options")]
    pub home: Option<PathBuf>,

    /// Verbose output (debug logging for jot)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reserve a fresh note name
    #[command(alias = "n")]
    New,

    /// Save a note (reads stdin when no content is given; empty content deletes)
    #[command(alias = "s")]
    Save {
        name: String,

        /// Note content
        content: Option<String>,

        /// Lock the note with this token
        #[arg(long, conflicts_with = "unlock")]
        lock: Option<String>,

        /// Store the note without its lock
        #[arg(long)]
        unlock: bool,

        /// Current lock token, required for locked notes
        #[arg(long)]
        token: Option<String>,
    },

    /// Print a note
    #[command(alias = "v")]
    Show {
        name: String,

        /// Lock token for locked notes
        #[arg(long)]
        token: Option<String>,

        /// Print the stored bytes, lock marker included
        #[arg(long)]
        raw: bool,
    },

    /// Delete a note
    #[command(alias = "del")]
    Rm {
        name: String,

        /// Lock token for locked notes
        #[arg(long)]
        token: Option<String>,
    },

    /// Lock a note with a token
    Lock {
        name: String,

        /// New lock token
        token: String,

        /// Current token when relocking a locked note
        #[arg(long)]
        current: Option<String>,
    },

    /// Remove a note's lock
    Unlock {
        name: String,

        /// Current lock token
        #[arg(long)]
        token: String,
    },

    /// List notes
    #[command(alias = "ls")]
    List {
        /// List the backup tier instead
        #[arg(long)]
        backup: bool,
    },

    /// Move idle date partitions to the backup tier
    Sweep {
        /// Inactivity window in days (defaults to backupDays)
        #[arg(long)]
        days: Option<u32>,

        /// Keep running, sweeping every N hours
        #[arg(long, value_name = "HOURS")]
        every: Option<u64>,
    },

    /// Repair the index and migrate legacy files
    Doctor,

    /// Show usage against the limits
    Stats,

    /// Show or change the global limits
    Limits {
        /// Maximum size of one note (e.g. 10M)
        #[arg(long, value_parser = parse_size)]
        max_file_size: Option<u64>,

        /// Maximum size of all active notes (e.g. 500M)
        #[arg(long, value_parser = parse_size)]
        max_total_size: Option<u64>,

        /// Maximum number of active notes
        #[arg(long)]
        max_note_count: Option<usize>,
    },

    /// Show the effective configuration
    Config,
}
