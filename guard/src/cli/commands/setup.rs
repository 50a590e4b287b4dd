//! Setup command handlers.

use signin_guard::config::{config_file, save_config_to, GuardConfig};
use signin_guard::error::Result;

use crate::cli::args::ShellType;

/// Handles the `signin-guard init` command.
///
/// Writes the default configuration so the provider section can be filled in.
pub fn handle_init(force: bool) -> Result<()> {
    let path = config_file()?;

    if path.exists() && !force {
        println!("Configuration already exists at {}.", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    save_config_to(&GuardConfig::default(), &path)?;

    println!("Wrote default configuration to {}.", path.display());
    println!("Set provider.client_id, provider.auth_url and provider.token_url before signing in.");

    Ok(())
}

/// Handles the `signin-guard completions <shell>` command.
///
/// Generates shell completion scripts.
pub fn handle_completions(shell: ShellType) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell};

    let mut cmd = crate::cli::Cli::command();
    let shell = match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
    };

    generate(shell, &mut cmd, "signin-guard", &mut std::io::stdout());

    Ok(())
}
