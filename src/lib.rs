//! Streaming single-pass parser for heterogeneous syndication feeds.
//!
//! Turns RSS 0.9x/2.0, RDF (RSS 1.0) and Atom documents into a normalized
//! sequence of item records plus one channel metadata record, delivered
//! through a sink callback as the document streams by. No buffering of the
//! whole document, no schema validation, and no panics on malformed input:
//! unparsable documents degrade to "zero items, empty channel".
//!
//! # Architecture
//!
//! - [`feed`] - Depth-tracked state machine over `quick-xml` events that
//!   resolves the three dialect shapes by element name and nesting depth
//! - [`date`] - Permissive date/time parser for the RFC-3339-like and
//!   RFC-822-like formats found in real-world feeds
//! - [`util`] - HTML tag stripping for consumers that store cleaned content
//!
//! # Example
//!
//! ```
//! use chrono::FixedOffset;
//! use feedstream::feed::{parse, ChannelMeta, CleanMode, FeedSink, ItemRecord};
//!
//! struct Collect(Vec<ItemRecord>);
//!
//! impl FeedSink for Collect {
//!     fn on_item(&mut self, _feed_id: i64, _clean: CleanMode, item: ItemRecord) {
//!         self.0.push(item);
//!     }
//!     fn on_channel(&mut self, _feed_id: i64, _channel: ChannelMeta) {}
//! }
//!
//! let doc = r#"<rss><channel><item><title>Hi</title></item></channel></rss>"#;
//! let mut sink = Collect(Vec::new());
//! let utc = FixedOffset::east_opt(0).unwrap();
//! parse(doc, 1, CleanMode::Raw, utc, &mut sink);
//! assert_eq!(sink.0.len(), 1);
//! ```

pub mod date;
pub mod feed;
pub mod util;
