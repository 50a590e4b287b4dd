//! Handshake command handlers.
//!
//! These are the UI layer of the handshake: they start sign-ins, feed
//! redirects back through [`SignInHandshake`] and render one of three
//! outcomes (still waiting, approved, or the blocking security error).

use std::sync::Arc;

use signin_guard::auth::{exchange_code, ProviderClient};
use signin_guard::config::{load_config, GuardConfig};
use signin_guard::error::Result;
use signin_guard::handshake::{CallbackParams, Completion, SignInHandshake};
use signin_guard::storage::FileSessionStorage;
use url::Url;

/// Open the session's storage and build its handshake.
fn open_handshake(
    config: &GuardConfig,
    session: &str,
) -> Result<(Arc<FileSessionStorage>, SignInHandshake)> {
    let dir = config.session.resolve_dir()?;
    let storage = Arc::new(FileSessionStorage::with_dir(&dir, session)?);
    let handshake = SignInHandshake::new(storage.clone(), &config.security);
    Ok((storage, handshake))
}

/// Handle the `signin-guard begin` command.
pub fn handle_begin(session: &str, no_browser: bool) -> Result<()> {
    let config = load_config()?;
    let provider = ProviderClient::from_config(&config.provider)?;
    let (_, handshake) = open_handshake(&config, session)?;

    let request = handshake.begin(&provider)?;

    println!("Sign-in started for session '{session}'.");
    println!();
    println!("To continue, please visit:");
    println!();
    println!("  {}", request.url);
    println!();

    if !no_browser {
        if open::that(request.url.as_str()).is_ok() {
            println!("Browser opened automatically.");
        } else {
            println!("Could not open browser. Please visit the URL manually.");
        }
        println!();
    }

    println!("When the browser is redirected, run:");
    println!("  signin-guard callback '<redirect URL>'");

    Ok(())
}

/// Handle the `signin-guard callback <url>` command.
pub async fn handle_callback(session: &str, input: &str, exchange: bool) -> Result<()> {
    let config = load_config()?;
    let (_, handshake) = open_handshake(&config, session)?;

    let completion = match Url::parse(input) {
        Ok(url) => handshake.complete(&url)?,
        Err(_) => handshake.complete_with(&CallbackParams::from_query(input))?,
    };

    let code = match completion {
        Completion::Pending => {
            println!("No authorization response in this URL yet. Still waiting for the provider.");
            return Ok(());
        },
        Completion::Approved { code } => code,
    };

    println!("Callback approved.");

    if !exchange {
        println!("The authorization code may now be exchanged for tokens.");
        return Ok(());
    }

    println!();
    println!("Exchanging authorization code...");
    let provider = ProviderClient::from_config(&config.provider)?;
    let tokens = exchange_code(&provider, &code).await?;

    println!();
    println!("Signed in.");
    println!();
    println!("  Token type: {}", tokens.token_type);
    if let Some(expires_at) = tokens.expires_at {
        println!("  Expires:    {}", expires_at.to_rfc3339());
    }
    if let Some(scope) = &tokens.scope {
        println!("  Scopes:     {scope}");
    }
    if tokens.refresh_token.is_some() {
        println!("  Refresh token received.");
    }

    Ok(())
}

/// Handle the `signin-guard status` command.
pub fn handle_status(session: &str) -> Result<()> {
    let config = load_config()?;
    let (storage, handshake) = open_handshake(&config, session)?;

    println!("Session:  {session}");
    println!("Storage:  {}", storage.path().display());
    println!("Phase:    {}", handshake.phase());

    if let Some(at) = handshake.intent().initiated_at() {
        println!("Started:  {}", at.to_rfc3339());
    }
    if handshake.state_guard().is_outstanding() {
        println!("State:    token outstanding");
    }
    if !config.security.state_guard {
        println!();
        println!("  Warning: state parameter checking is disabled in the configuration.");
    }

    Ok(())
}

/// Handle the `signin-guard reset` command.
pub fn handle_reset(session: &str, end_session: bool) -> Result<()> {
    let config = load_config()?;
    let (storage, handshake) = open_handshake(&config, session)?;

    if end_session {
        // Deleting the file first also recovers a session whose file is unreadable.
        storage.end_session()?;
        handshake.reset()?;
        println!("Session '{session}' ended.");
    } else {
        handshake.reset()?;
        println!("Session '{session}' reset. Run 'signin-guard begin' to sign in again.");
    }

    Ok(())
}
