//! Intel Fusion Understanding
//!
//! Interprets one tokenized intel message:
//! - **Characters**: player tokens resolved through a [`CharacterDirectory`]
//! - **Scans**: remote d-scan links expanded into ships
//! - **Reports**: systems, ships, gates, keywords, kills, questions, movement
//! - **Headcounts**: "5 in local" reconciled against the named characters

pub mod traits;
pub mod directory;
pub mod understanding;

pub use traits::*;
pub use directory::*;
pub use understanding::*;
