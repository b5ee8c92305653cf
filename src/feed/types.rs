use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Feed-level metadata collected over the course of one parse.
///
/// Each field is captured the first time it is seen at channel level;
/// later occurrences are ignored. Handed to [`FeedSink::on_channel`]
/// exactly once, at document end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    /// Channel title (`<title>` directly under the channel/feed).
    pub title: Option<String>,
    /// Channel link. Either an Atom `<link href="..."/>` or the text
    /// content of an RSS `<link>` element.
    pub link: Option<String>,
    /// Channel description (`<description>` in RSS, `<subtitle>` in Atom).
    pub description: Option<String>,
}

/// One discrete piece of content from a feed (RSS `<item>`, Atom `<entry>`).
///
/// Created when the item's start tag is recognized, filled in field by
/// field as child elements close, and moved out to the sink when the item
/// closes. An item is emitted at most once; items whose closing tag never
/// arrives are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Item title.
    pub headline: Option<String>,
    /// Item body. May contain embedded markup reconstructed verbatim,
    /// e.g. a description written as `&lt;p&gt;...&lt;/p&gt;` comes out
    /// as literal `<p>...</p>`.
    pub content: Option<String>,
    /// Publication date, when one of `pubDate`/`published`/`date` parsed.
    pub date: Option<DateTime<FixedOffset>>,
    /// Item link (Atom `href` attribute or RSS text content).
    pub link: Option<String>,
    /// Deduplication id. Seeded from an RDF `about` attribute when present,
    /// overwritten by a `<guid>`/`<id>` child element.
    pub guid: Option<String>,
}

/// Whether the consumer intends to strip HTML from stored content.
///
/// Opaque pass-through: the parser carries it from construction to every
/// [`FeedSink::on_item`] call without interpreting it. Consumers that pick
/// [`CleanMode::StripHtml`] typically run [`crate::util::html_clean`] over
/// the content before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CleanMode {
    /// Store content as delivered by the feed.
    Raw,
    /// Consumer strips markup before storage.
    StripHtml,
}

/// The attributes the dispatch rules consult on a start tag.
///
/// Only three attributes matter to any dialect: `href` and `rel` on
/// `<link>` elements, and the RDF `about` attribute on RDF-described
/// items. Everything else is ignored.
#[derive(Debug, Clone, Default)]
pub struct ElementAttrs {
    pub href: Option<String>,
    pub rel: Option<String>,
    pub about: Option<String>,
}

impl ElementAttrs {
    /// True when `rel="self"` marks a link as the feed's own address
    /// rather than the channel/item link.
    pub(crate) fn is_self_link(&self) -> bool {
        self.rel.as_deref() == Some("self")
    }
}

/// Receiver for the normalized records a parse produces.
///
/// The feed id given at handler construction is passed through unchanged.
/// `on_item` is called once per completed item in document order;
/// `on_channel` exactly once, at document end, regardless of how many
/// items were emitted.
pub trait FeedSink {
    fn on_item(&mut self, feed_id: i64, clean: CleanMode, item: ItemRecord);
    fn on_channel(&mut self, feed_id: i64, channel: ChannelMeta);
}
