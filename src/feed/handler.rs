use std::borrow::Cow;

use chrono::FixedOffset;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::date;
use crate::feed::types::{ChannelMeta, CleanMode, ElementAttrs, FeedSink, ItemRecord};

/// The role an element name plays in the dialects we recognize.
///
/// Resolved once per tag instead of chains of string comparisons. The same
/// name can matter at one depth and not another (`subtitle` is only a
/// channel description, `guid` only an item field); the dispatch sites
/// decide that, this enum only classifies the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementRole {
    Title,
    Link,
    Description,
    Subtitle,
    Guid,
    Date,
    ItemBoundary,
    Unrecognized,
}

impl ElementRole {
    fn of(name: &str) -> Self {
        match name {
            "title" => Self::Title,
            "link" => Self::Link,
            "description" => Self::Description,
            "subtitle" => Self::Subtitle,
            "guid" | "id" => Self::Guid,
            "pubDate" | "published" | "date" => Self::Date,
            "item" | "entry" => Self::ItemBoundary,
            _ => Self::Unrecognized,
        }
    }
}

/// Text accumulator armed for one target element.
///
/// While armed, every event that is not the target's end tag is folded into
/// the buffer: character data verbatim, nested start/end tags re-serialized
/// as markup text. This is what lets a description containing an embedded
/// `<p>` come out whole instead of character-by-character.
struct Collector {
    until: String,
    buf: String,
}

/// Streaming dialect-resolving state machine over one feed document.
///
/// Consumes SAX-shaped events (start tag, character data, end tag, document
/// end) and emits completed [`ItemRecord`]s plus one [`ChannelMeta`] through
/// the sink. RSS 0.9x/2.0, RDF (RSS 1.0) and Atom shapes are recognized
/// uniformly by element local name and nesting depth.
///
/// The element stack holds only *recognized* open elements, so "depth 0"
/// means channel level regardless of how the dialect nests its envelope
/// (`<rss><channel>` vs `<feed>` vs `<rdf:RDF>`), and "depth 1 inside
/// item/entry" means the item body.
///
/// Defensive by construction: end tags that do not match the top of the
/// stack are ignored, so event streams from malformed documents degrade to
/// zero records instead of panics or partial emissions.
pub struct FeedHandler<'s, S: FeedSink> {
    feed_id: i64,
    clean: CleanMode,
    fallback: FixedOffset,
    sink: &'s mut S,
    elements: Vec<String>,
    channel: ChannelMeta,
    item: Option<ItemRecord>,
    collector: Option<Collector>,
    error_occurred: bool,
}

impl<'s, S: FeedSink> FeedHandler<'s, S> {
    pub fn new(feed_id: i64, clean: CleanMode, fallback: FixedOffset, sink: &'s mut S) -> Self {
        Self {
            feed_id,
            clean,
            fallback,
            sink,
            elements: Vec::new(),
            channel: ChannelMeta::default(),
            item: None,
            collector: None,
            error_occurred: false,
        }
    }

    /// Diagnostic flag for interface compatibility. No current code path
    /// sets it; unparsable input shows up as zero records, not as an error.
    pub fn has_error_occurred(&self) -> bool {
        self.error_occurred
    }

    pub fn start_element(&mut self, name: &str, attrs: &ElementAttrs) {
        if let Some(c) = self.collector.as_mut() {
            if c.until != name {
                c.buf.push('<');
                c.buf.push_str(name);
                c.buf.push('>');
                return;
            }
            // A nested element carrying the collector's own name falls
            // through to the depth dispatch, which drops it.
        }

        if self.elements.is_empty() {
            match ElementRole::of(name) {
                ElementRole::Title if self.channel.title.is_none() => self.start_collecting(name),
                ElementRole::Link if self.channel.link.is_none() => match attrs.href.as_deref() {
                    Some(href) if !attrs.is_self_link() => {
                        self.channel.link = Some(href.to_string());
                    }
                    // A rel="self" link or a text-content link collects
                    // instead; empty collected text is a no-op.
                    _ => self.start_collecting(name),
                },
                ElementRole::Description | ElementRole::Subtitle
                    if self.channel.description.is_none() =>
                {
                    self.start_collecting(name)
                }
                ElementRole::ItemBoundary => {
                    self.elements.push(name.to_string());
                    self.item = Some(ItemRecord {
                        guid: attrs.about.clone(),
                        ..ItemRecord::default()
                    });
                }
                _ => {}
            }
        } else if self.inside_item_body() {
            match ElementRole::of(name) {
                ElementRole::Title
                | ElementRole::Description
                | ElementRole::Guid
                | ElementRole::Date => self.start_collecting(name),
                ElementRole::Link => {
                    let link_unset = self.item.as_ref().is_some_and(|i| i.link.is_none());
                    match attrs.href.as_deref() {
                        Some(href) if link_unset && !attrs.is_self_link() => {
                            if let Some(item) = self.item.as_mut() {
                                item.link = Some(href.to_string());
                            }
                        }
                        _ => self.start_collecting(name),
                    }
                }
                _ => {}
            }
        }
        // Deeper nesting with no armed collector is ignored.
    }

    pub fn characters(&mut self, text: &str) {
        if let Some(c) = self.collector.as_mut() {
            c.buf.push_str(text);
            return;
        }

        // Fallback routing for producers that deliver text while no
        // collector is armed; mirrors the collector's field mapping.
        match self.elements.len() {
            1 => {
                let Some(top) = self.elements.last() else {
                    return;
                };
                match ElementRole::of(top) {
                    ElementRole::Title if self.channel.title.is_none() => {
                        self.channel.title = Some(text.trim().to_string());
                    }
                    ElementRole::Description | ElementRole::Subtitle
                        if self.channel.description.is_none() =>
                    {
                        self.channel.description = Some(text.trim().to_string());
                    }
                    ElementRole::Link if self.channel.link.is_none() => {
                        self.channel.link = Some(text.trim().to_string());
                    }
                    _ => {}
                }
            }
            2 => {
                let role = ElementRole::of(&self.elements[1]);
                let fallback = self.fallback;
                let Some(item) = self.item.as_mut() else {
                    return;
                };
                match role {
                    ElementRole::Title => item.headline = Some(text.trim().to_string()),
                    ElementRole::Description => item.content = Some(text.trim().to_string()),
                    ElementRole::Guid => item.guid = Some(text.trim().to_string()),
                    ElementRole::Link => item.link = Some(text.trim().to_string()),
                    ElementRole::Date => {
                        if let Ok(parsed) = date::parse(text, fallback) {
                            item.date = Some(parsed);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    pub fn end_element(&mut self, name: &str) {
        if let Some(c) = self.collector.as_mut() {
            if c.until != name {
                c.buf.push_str("</");
                c.buf.push_str(name);
                c.buf.push('>');
                return;
            }
        }

        // Unmatched end tags from malformed documents are absorbed here.
        if self.elements.last().map(String::as_str) != Some(name) {
            return;
        }
        self.elements.pop();
        let value = self.end_collecting();

        if self.elements.is_empty() {
            match ElementRole::of(name) {
                ElementRole::Title => {
                    if let Some(v) = value {
                        self.channel.title = Some(v);
                    }
                }
                ElementRole::Link => {
                    if let Some(v) = value.filter(|v| !v.is_empty()) {
                        self.channel.link = Some(v);
                    }
                }
                ElementRole::Description | ElementRole::Subtitle => {
                    if let Some(v) = value {
                        self.channel.description = Some(v);
                    }
                }
                ElementRole::ItemBoundary => {
                    // Ownership of the completed record transfers to the
                    // sink; an item is emitted at most once.
                    if let Some(item) = self.item.take() {
                        self.sink.on_item(self.feed_id, self.clean, item);
                    }
                }
                _ => {}
            }
        } else if self.inside_item_body() {
            let fallback = self.fallback;
            let Some(item) = self.item.as_mut() else {
                return;
            };
            match ElementRole::of(name) {
                ElementRole::Title => {
                    if let Some(v) = value {
                        item.headline = Some(v);
                    }
                }
                ElementRole::Link => {
                    if let Some(v) = value.filter(|v| !v.is_empty()) {
                        item.link = Some(v);
                    }
                }
                ElementRole::Description => {
                    if let Some(v) = value {
                        item.content = Some(v);
                    }
                }
                ElementRole::Guid => {
                    if let Some(v) = value {
                        item.guid = Some(v);
                    }
                }
                ElementRole::Date => {
                    // An unparsable date leaves the field unset.
                    if let Some(v) = value {
                        if let Ok(parsed) = date::parse(&v, fallback) {
                            item.date = Some(parsed);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Emits the final channel metadata. Called exactly once per document,
    /// after the last event.
    pub fn end_document(&mut self) {
        self.sink
            .on_channel(self.feed_id, std::mem::take(&mut self.channel));
    }

    fn start_collecting(&mut self, name: &str) {
        self.elements.push(name.to_string());
        self.collector = Some(Collector {
            until: name.to_string(),
            buf: String::new(),
        });
    }

    fn end_collecting(&mut self) -> Option<String> {
        self.collector.take().map(|c| c.buf.trim().to_string())
    }

    fn inside_item_body(&self) -> bool {
        self.elements.len() == 1
            && self
                .elements
                .first()
                .is_some_and(|top| ElementRole::of(top) == ElementRole::ItemBoundary)
    }
}

/// Parses one feed document, driving a [`FeedHandler`] from quick-xml events.
///
/// This never fails: reader errors abort the event loop, and the observable
/// outcome for input that is not well-formed feed XML is zero items plus an
/// empty channel. The channel callback fires exactly once either way.
pub fn parse<S: FeedSink>(
    content: &str,
    feed_id: i64,
    clean: CleanMode,
    fallback: FixedOffset,
    sink: &mut S,
) {
    let mut reader = Reader::from_str(content);
    let mut handler = FeedHandler::new(feed_id, clean, fallback, sink);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = decode_local_name(&reader, e.name());
                let attrs = element_attrs(&e, &reader);
                handler.start_element(&name, &attrs);
            }
            Ok(Event::Empty(e)) => {
                // Self-closing tags (Atom <link href="..."/>) are a start
                // immediately followed by an end.
                let name = decode_local_name(&reader, e.name());
                let attrs = element_attrs(&e, &reader);
                handler.start_element(&name, &attrs);
                handler.end_element(&name);
            }
            Ok(Event::Text(t)) => match t.unescape() {
                Ok(text) => handler.characters(&text),
                Err(err) => {
                    // Unknown entity references; pass the raw text through.
                    tracing::debug!(error = %err, "undecodable text node");
                    if let Ok(raw) = reader.decoder().decode(&t) {
                        handler.characters(&raw);
                    }
                }
            },
            Ok(Event::CData(c)) => {
                if let Ok(text) = reader.decoder().decode(&c) {
                    handler.characters(&text);
                }
            }
            Ok(Event::End(e)) => {
                let name = decode_local_name(&reader, e.name());
                handler.end_element(&name);
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctypes.
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(error = %err, "stopping on malformed XML");
                break;
            }
        }
        buf.clear();
    }

    handler.end_document();
}

/// Namespace-prefix-stripped element name (`dc:date` -> `date`).
fn decode_local_name(reader: &Reader<&[u8]>, name: QName<'_>) -> String {
    reader
        .decoder()
        .decode(name.local_name().as_ref())
        .map(Cow::into_owned)
        .unwrap_or_default()
}

/// Extracts the three attributes the dispatch rules consult.
///
/// The RDF `about` attribute arrives with a namespace prefix (`rdf:about`);
/// matching on the local name is the single special-cased namespace lookup
/// the dialects need, full namespace resolution is out of scope.
fn element_attrs(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> ElementAttrs {
    let mut attrs = ElementAttrs::default();
    let decoder = reader.decoder();

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed attribute");
                continue;
            }
        };
        let key = attr.key.local_name();
        if !matches!(key.as_ref(), b"href" | b"rel" | b"about") {
            continue;
        }
        let value = match attr.decode_and_unescape_value(decoder) {
            Ok(value) => value.to_string(),
            Err(err) => {
                tracing::debug!(error = %err, "skipping undecodable attribute value");
                continue;
            }
        };
        match key.as_ref() {
            b"href" => attrs.href = Some(value),
            b"rel" => attrs.rel = Some(value),
            b"about" => attrs.about = Some(value),
            _ => {}
        }
    }

    attrs
}
