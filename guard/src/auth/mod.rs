//! Identity provider integration for signin-guard.
//!
//! This module wraps the `oauth2` client used on both sides of the redirect:
//! building the outbound authorization URL and, once the handshake approved
//! the callback, exchanging the authorization code for tokens.

pub mod exchange;
pub mod provider;
pub mod tokens;

pub use exchange::exchange_code;
pub use provider::ProviderClient;
pub use tokens::TokenSet;
