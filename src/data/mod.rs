//! Data processing helpers shared by the resource views and the topic stream.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "5s", "100ms")
//! - [`filter`]: Case-insensitive substring filtering and cell truncation
//! - [`natural`]: Natural (alphanumeric-aware) string ordering

pub mod duration;
pub mod filter;
pub mod natural;

pub use filter::{matches_filter, message_matches, truncate_cell};
pub use natural::natural_cmp;
