//! Signin Guard CLI - drives the sign-in handshake from a terminal.
//!
//! Each `--session` plays the role of one browser tab: its markers live in
//! their own session file and are never visible to another session.

mod cli;

use clap::Parser;
use signin_guard::config::settings::env;
use signin_guard::error::{GuardError, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

/// Exit code for callbacks blocked as forged.
const EXIT_SECURITY_REJECTION: i32 = 2;

const EXIT_FAILURE: i32 = 1;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(env::LOG_LEVEL)
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    // Run the command
    if let Err(e) = run(cli).await {
        if e.is_security_rejection() {
            eprintln!("Sign-in blocked: {e}");
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(exit_code(&e));
    }
}

/// Process exit code for a failed command.
const fn exit_code(err: &GuardError) -> i32 {
    if err.is_security_rejection() {
        EXIT_SECURITY_REJECTION
    } else {
        EXIT_FAILURE
    }
}

async fn run(cli: Cli) -> Result<()> {
    let session = cli.session.as_str();
    match cli.command {
        Commands::Begin { no_browser } => cli::commands::handle_begin(session, no_browser),
        Commands::Callback { url, exchange } => {
            cli::commands::handle_callback(session, &url, exchange).await
        },
        Commands::Status => cli::commands::handle_status(session),
        Commands::Reset { end_session } => cli::commands::handle_reset(session, end_session),
        Commands::Init { force } => cli::commands::handle_init(force),
        Commands::Completions { shell } => cli::commands::handle_completions(shell),
    }
}
