use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "ddmctl")]
#[command(version)]
#[command(about = "Command line client for declarative device management", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the DDM server
    #[arg(long, global = true, env = "DDM_URL")]
    pub url: Option<String>,

    /// Username for Basic authentication
    #[arg(long, global = true, env = "DDM_API_USER", default_value = "kmfddm")]
    pub api_user: String,

    /// API key for Basic authentication
    #[arg(long, global = true, env = "DDM_API_KEY")]
    pub api_key: Option<String>,

    /// Enrollment ID of the device to operate on
    #[arg(long, global = true, env = "DDM_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all declarations on the server
    Declarations,

    /// Declaration operations
    #[command(subcommand)]
    Declaration(DeclarationCommand),

    /// Set operations
    #[command(subcommand)]
    Set(SetCommand),

    /// Device (enrollment) operations, addressed by --client-id
    #[command(subcommand)]
    Device(DeviceCommand),

    /// Sync a directory of declarations and set files with the server
    Sync(SyncArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum DeclarationCommand {
    /// Create or replace a declaration from a JSON file
    Create {
        /// Path to the declaration JSON file
        path: PathBuf,
    },

    /// Get declaration details for an identifier
    Get { identifier: String },

    /// Delete a declaration
    Delete { identifier: String },

    /// List set membership for a declaration
    Sets { identifier: String },
}

#[derive(Subcommand)]
pub enum SetCommand {
    /// List all sets
    List,

    /// List the declarations in a set
    Get { name: String },

    /// Add a declaration to a set
    Add {
        /// Name of the set to add the declaration to
        #[arg(short, long)]
        name: String,

        /// Identifier of the declaration to add
        #[arg(short, long)]
        identifier: String,
    },

    /// Remove a declaration from a set
    Remove {
        /// Name of the set to remove the declaration from
        #[arg(short, long)]
        name: String,

        /// Identifier of the declaration to remove
        #[arg(short, long)]
        identifier: String,
    },
}

#[derive(Subcommand)]
pub enum DeviceCommand {
    /// List the sets applied to the device
    Sets,

    /// Add the device to a declaration set
    Add {
        /// Set name
        set: String,
    },

    /// Remove the device from a declaration set
    Remove {
        /// Set name
        set: String,
    },

    /// List declaration status reported by the device
    Declarations,

    /// List status-channel errors reported by the device
    Errors,

    /// List status values reported by the device
    Values,

    /// Show the device's DDM sync tokens
    Tokens,

    /// Show declaration items as served to the device
    DeclarationItems,
}

#[derive(Parser)]
pub struct SyncArgs {
    /// Directory containing declaration JSON files and set files
    pub dir: PathBuf,
}
