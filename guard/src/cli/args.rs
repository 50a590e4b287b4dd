//! Command-line argument parsing.

use clap::{Parser, Subcommand, ValueEnum};
use signin_guard::config::settings::env;

/// Sign-in handshake guard.
///
/// Starts OAuth/OIDC sign-ins and validates the redirect callbacks they
/// produce, rejecting callbacks this session never asked for.
#[derive(Parser, Debug)]
#[command(name = "signin-guard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Session the handshake markers belong to.
    #[arg(
        short,
        long,
        global = true,
        env = env::SESSION,
        default_value = "default"
    )]
    pub session: String,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a sign-in.
    ///
    /// Records the sign-in intent, generates a CSRF state token and prints
    /// the authorization URL to open.
    Begin {
        /// Skip opening the browser automatically.
        #[arg(long)]
        no_browser: bool,
    },

    /// Validate the redirect the identity provider sent back.
    ///
    /// Accepts the full callback URL or just its query string.
    Callback {
        /// Callback URL (or query string) from the browser.
        url: String,

        /// Exchange the authorization code for tokens once approved.
        #[arg(long)]
        exchange: bool,
    },

    /// Show the handshake phase of the session.
    Status,

    /// Reset the session back to idle.
    Reset {
        /// Also delete the session file.
        #[arg(long)]
        end_session: bool,
    },

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing configuration file.
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: ShellType,
    },
}

/// Supported shell types for completions.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
}
