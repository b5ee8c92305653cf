//! Utility functions shared with the application layer.
//!
//! The parser itself never alters content; [`html_clean`] is the
//! companion for consumers that picked
//! [`CleanMode::StripHtml`](crate::feed::CleanMode) and want markup
//! removed before storage.

mod text;

pub use text::html_clean;
