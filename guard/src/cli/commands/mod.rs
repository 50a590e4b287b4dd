//! Command implementations.

pub mod handshake;
pub mod setup;

pub use handshake::{handle_begin, handle_callback, handle_reset, handle_status};
pub use setup::{handle_completions, handle_init};
