//! Intel Fusion Runtime
//!
//! The stateful side of the engine:
//! - [`IntelStateStore`]: serialized folding of messages and killmails
//! - [`SystemContents`]: dedup, movement and cleanup rules over raw state
//! - [`ChannelHistory`]: recent same-channel context for inference
//! - Seams for alerts and time

pub mod alerts;
pub mod clock;
pub mod contents;
pub mod history;
pub mod store;
pub mod ticker;

pub use alerts::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub use contents::*;
pub use history::*;
pub use store::*;
pub use ticker::*;
