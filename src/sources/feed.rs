//! Atom feed normalization for arXiv query results.
//!
//! The arXiv API answers with an Atom document (`http://www.w3.org/2005/Atom`)
//! carrying a few extension elements in `http://arxiv.org/schemas/atom`. Only
//! Atom-namespaced elements are read here; extension elements are skipped.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::models::{Paper, PaperBuilder};

/// Atom namespace URI
pub const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";

/// Errors raised while reading a feed
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Attribute error: {0}")]
    Attr(#[from] AttrError),

    #[error("Document ended with {0} unclosed element(s)")]
    Truncated(usize),
}

/// Entry child elements whose text is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

impl Field {
    fn entry_child(local: &[u8]) -> Option<Self> {
        match local {
            b"id" => Some(Field::Id),
            b"title" => Some(Field::Title),
            b"summary" => Some(Field::Summary),
            b"published" => Some(Field::Published),
            _ => None,
        }
    }
}

/// Fields collected for the entry currently being read
#[derive(Debug, Default)]
struct EntryFields {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    authors: Vec<String>,
    pdf_url: Option<String>,
}

impl EntryFields {
    fn store(&mut self, field: Field, text: String) {
        match field {
            Field::Id => self.id = arxiv_id(&text),
            Field::Title => self.title = Some(text),
            Field::Summary => self.summary = Some(text),
            Field::Published => self.published = Some(text),
            Field::AuthorName => {
                if !text.is_empty() {
                    self.authors.push(text);
                }
            }
        }
    }

    fn into_paper(self) -> Paper {
        let mut builder = PaperBuilder::new();
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(title) = self.title {
            builder = builder.title(title);
        }
        for author in self.authors {
            builder = builder.author(author);
        }
        if let Some(summary) = self.summary {
            builder = builder.summary(summary);
        }
        if let Some(published) = self.published {
            builder = builder.published(published);
        }
        if let Some(url) = self.pdf_url {
            builder = builder.pdf_url(url);
        }
        builder.build()
    }
}

/// Extract the arXiv identifier from an entry id such as
/// `http://arxiv.org/abs/2301.12345v1`.
///
/// Everything after the last `/abs/` is kept; ids without that marker are
/// returned whole.
pub fn arxiv_id(entry_id: &str) -> Option<String> {
    let entry_id = entry_id.trim();
    let id = entry_id.rsplit("/abs/").next().unwrap_or(entry_id);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Parse an arXiv Atom feed into papers, in document order.
///
/// A document that cannot be parsed yields an empty list; the failure is logged.
pub fn parse_feed(xml: &[u8]) -> Vec<Paper> {
    match try_parse_feed(xml) {
        Ok(papers) => papers,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse arXiv feed");
            Vec::new()
        }
    }
}

/// Parse an arXiv Atom feed, reporting malformed input as an error
pub fn try_parse_feed(xml: &[u8]) -> Result<Vec<Paper>, FeedError> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();

    let mut papers = Vec::new();

    // Element nesting depth, counted before the current event is applied
    let mut depth = 0usize;
    let mut entry: Option<(EntryFields, usize)> = None;
    let mut author_depth: Option<usize> = None;
    let mut capture: Option<(Field, usize)> = None;
    let mut text = String::new();

    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (ns, Event::Start(e)) => {
                depth += 1;
                if is_atom(&ns) {
                    let local = e.local_name();
                    if entry.is_none() {
                        if local.as_ref() == b"entry" {
                            entry = Some((EntryFields::default(), depth));
                        }
                    } else if let Some((fields, entry_depth)) = entry.as_mut() {
                        if depth == *entry_depth + 1 {
                            if let Some(field) = Field::entry_child(local.as_ref()) {
                                capture = Some((field, depth));
                                text.clear();
                            } else if local.as_ref() == b"author" {
                                author_depth = Some(depth);
                            } else if local.as_ref() == b"link" {
                                read_link(&e, fields)?;
                            }
                        } else if author_depth.is_some_and(|d| depth == d + 1)
                            && local.as_ref() == b"name"
                        {
                            capture = Some((Field::AuthorName, depth));
                            text.clear();
                        }
                    }
                }
            }
            (ns, Event::Empty(e)) => {
                if is_atom(&ns) {
                    if entry.is_none() {
                        if e.local_name().as_ref() == b"entry" {
                            papers.push(EntryFields::default().into_paper());
                        }
                    } else if let Some((fields, entry_depth)) = entry.as_mut() {
                        if depth == *entry_depth {
                            let local = e.local_name();
                            if local.as_ref() == b"link" {
                                read_link(&e, fields)?;
                            } else if let Some(field) = Field::entry_child(local.as_ref()) {
                                fields.store(field, String::new());
                            }
                        }
                    }
                }
            }
            (_, Event::Text(e)) => {
                if capture.is_some() {
                    text.push_str(&e.unescape()?);
                }
            }
            (_, Event::CData(e)) => {
                if capture.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            (_, Event::End(_)) => {
                if let Some((field, field_depth)) = capture {
                    if field_depth == depth {
                        if let Some((fields, _)) = entry.as_mut() {
                            fields.store(field, text.trim().to_string());
                        }
                        capture = None;
                    }
                }
                if author_depth == Some(depth) {
                    author_depth = None;
                }
                if entry.as_ref().is_some_and(|(_, d)| *d == depth) {
                    if let Some((fields, _)) = entry.take() {
                        papers.push(fields.into_paper());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(FeedError::Truncated(depth));
    }

    Ok(papers)
}

fn is_atom(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == ATOM_NS)
}

/// Record the link's `href` when its `title` attribute is exactly `pdf`.
/// The first matching link wins.
fn read_link(e: &BytesStart<'_>, fields: &mut EntryFields) -> Result<(), FeedError> {
    if fields.pdf_url.is_some() {
        return Ok(());
    }

    let is_pdf = match e.try_get_attribute("title")? {
        Some(attr) => attr.unescape_value()? == "pdf",
        None => false,
    };

    if is_pdf {
        if let Some(href) = e.try_get_attribute("href")? {
            fields.pdf_url = Some(href.unescape_value()?.into_owned());
        }
    }

    Ok(())
}
