//! # kafkalens-types
//!
//! Core data types shared between the kafkalens cluster gateway and the
//! terminal UI. Everything here is plain data: no I/O, no async.
//!
//! ## Features
//!
//! - `serde`: JSON export of messages and metadata via serde
//!
//! ## Example
//!
//! ```rust
//! use kafkalens_types::{ConsumeFlags, ConsumedMessage, OffsetPolicy};
//!
//! let msg = ConsumedMessage::builder(0, 42).key("user-7").value("{\"id\":7}").build();
//! assert_eq!(msg.position(), (0, 42));
//!
//! let flags = ConsumeFlags::default().toggled_offset_policy();
//! assert_eq!(flags.offset_policy, OffsetPolicy::Earliest);
//! assert_eq!(flags.tail, 0);
//! ```

mod flags;
mod message;
mod metadata;

pub use flags::*;
pub use message::*;
pub use metadata::*;
