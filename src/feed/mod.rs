//! Streaming feed parsing for RSS, RDF (RSS 1.0) and Atom documents.
//!
//! The three dialects use different element names and nesting shapes for
//! the same semantic fields; this module resolves them uniformly with a
//! depth-tracked state machine over XML events:
//!
//! - [`handler`] - The [`FeedHandler`] state machine and the [`parse`]
//!   driver that feeds it quick-xml events
//! - [`types`] - The value objects ([`ChannelMeta`], [`ItemRecord`]) and
//!   the [`FeedSink`] callback boundary
//!
//! # Example
//!
//! ```ignore
//! let mut sink = MySink::new(db);
//! feed::parse(&body, feed_id, CleanMode::StripHtml, fallback_tz, &mut sink);
//! ```
//!
//! Completed items are handed to the sink as soon as their closing tag is
//! seen; channel metadata arrives once, at document end. Malformed input
//! produces zero records, never an error.

mod handler;
mod types;

pub use handler::{parse, FeedHandler};
pub use types::{ChannelMeta, CleanMode, ElementAttrs, FeedSink, ItemRecord};
