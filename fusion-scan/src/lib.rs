//! Intel Fusion Scan Layer
//!
//! Pulls ship lists out of remote d-scan links posted in intel channels:
//! - Link detection for the supported scan-sharing services
//! - HTTP client construction
//! - JSON and HTML result parsing
//! - Ship-name normalization

pub mod client;
pub mod links;
pub mod dscan;
pub mod extractor;

pub use client::*;
pub use links::*;
pub use dscan::*;
pub use extractor::*;
