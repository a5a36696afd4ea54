//! Intel Fusion Core - Entity model and inputs for the intel state engine
//!
//! This crate provides the foundational primitives:
//! - System entities with lifecycle capability markers
//! - The external token vocabulary produced by the chat tokenizer
//! - Structured understandings of a single intel message
//! - Chat message and killmail inputs
//! - Live configuration

pub mod entities;
pub mod tokens;
pub mod understanding;
pub mod inputs;
pub mod config;

pub use entities::*;
pub use tokens::*;
pub use understanding::*;
pub use inputs::*;
pub use config::*;

use std::time::Duration;

/// Default intel expiry in seconds
pub const DEFAULT_INTEL_EXPIRE_SECS: u64 = 300;

/// Messages older than this do not trigger alerts
pub const ALERT_MAX_AGE: Duration = Duration::from_secs(30);

/// Killmails older than this are not folded into intel
pub const KILLMAIL_MAX_AGE: Duration = Duration::from_secs(15 * 60);

/// Maximum same-channel messages consulted when inferring a system
pub const CONTEXT_MAX_MESSAGES: usize = 10;

/// Maximum age of a context message relative to the message being understood
pub const CONTEXT_MAX_AGE: Duration = Duration::from_secs(5 * 60);
