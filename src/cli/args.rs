//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::View;

/// Referral pyramid client: fetch recruiting trees and evaluate completed levels
#[derive(Parser, Debug)]
#[command(name = "pyramid")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate pyramid levels of a saved snapshot
    Levels {
        /// Snapshot file (JSON payload of a pyramid endpoint)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Fetch a pyramid from the API and evaluate its levels
    Report {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Fetch a pyramid from the API and save or print the payload
    Fetch {
        #[command(flatten)]
        target: TargetArgs,
        /// Write the payload here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show a snapshot as a tree
    Tree {
        /// Snapshot file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Manage the login session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Which pyramid to look at, and how deep.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Pyramid screen (decides endpoint and payload shape)
    #[arg(long, value_enum, default_value_t = ViewArg::Level)]
    pub view: ViewArg,

    /// Member id (default: session user)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Deepest level to evaluate (default: from config)
    #[arg(short, long)]
    pub max_level: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewArg {
    Level,
    Commissions,
    Network,
    Admin,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Level => View::Level,
            ViewArg::Commissions => View::Commissions,
            ViewArg::Network => View::Network,
            ViewArg::Admin => View::Admin,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Show the current session
    Show,

    /// Store the session used for API calls
    Set {
        /// Member id of the logged-in user
        #[arg(short, long)]
        user: String,
        /// Session token sent with every request
        #[arg(short, long, env = "PYRAMID_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Mark the session as administrator
        #[arg(long)]
        admin: bool,
    },

    /// Forget the session
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Show config file locations
    Path,

    /// Print a commented config template
    Template,
}
