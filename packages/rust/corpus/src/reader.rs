//! Line-oriented page parser for MediaWiki XML exports.
//!
//! The dump is read line by line rather than through an XML parser: a
//! `<title>` line sets the current title, a `<text ...>` line opens the body,
//! and the body ends at `</text>` (which may sit on the opening line).

use std::borrow::Cow;
use std::io::{BufRead, Lines};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use wordroots_shared::{Result, WordrootsError};

/// Titles containing this separator belong to a non-article namespace.
const NAMESPACE_SEPARATOR: char = ':';

/// Closing tag of a page body.
const TEXT_END: &str = "</text>";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>([^<]+)</title>").expect("valid regex"));

static TEXT_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<text([^>]*)>(.*)").expect("valid regex"));

/// One corpus entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Headword title, entities decoded.
    pub title: String,
    /// Raw markup body, entities decoded.
    pub text: String,
}

/// Lazy iterator over the pages of a dump.
pub struct PageStream<R> {
    lines: Lines<R>,
    path: PathBuf,
    title: Option<String>,
    body: Vec<String>,
    in_text: bool,
    emitted: usize,
}

impl<R: BufRead> PageStream<R> {
    /// Wrap a reader; `path` is only used for error context.
    pub fn new(reader: R, path: PathBuf) -> Self {
        Self {
            lines: reader.lines(),
            path,
            title: None,
            body: Vec::new(),
            in_text: false,
            emitted: 0,
        }
    }

    /// Build a page from the finished body if the current title qualifies.
    fn finish(&mut self, text: String) -> Option<Page> {
        let title = self.title.as_deref()?;
        if title.contains(NAMESPACE_SEPARATOR) {
            return None;
        }
        self.emitted += 1;
        Some(Page {
            title: decode_entities(title).into_owned(),
            text: decode_entities(&text).into_owned(),
        })
    }

    /// Feed one line; returns a page when the line completes one.
    fn accept(&mut self, line: &str) -> Option<Page> {
        if let Some(caps) = TITLE_RE.captures(line) {
            self.title = Some(caps[1].to_string());
            return None;
        }

        if let Some(caps) = TEXT_START_RE.captures(line) {
            // `<text bytes="0" />` carries no body at all.
            if caps[1].trim_end().ends_with('/') {
                self.in_text = false;
                return None;
            }

            let content = caps.get(2).map_or("", |m| m.as_str());
            if let Some((body, _)) = content.split_once(TEXT_END) {
                self.in_text = false;
                return self.finish(body.to_string());
            }

            self.in_text = true;
            self.body.clear();
            self.body.push(content.to_string());
            return None;
        }

        if !self.in_text {
            return None;
        }

        match line.split_once(TEXT_END) {
            Some((head, _)) => {
                self.body.push(head.to_string());
                self.in_text = false;
                let text = std::mem::take(&mut self.body).join("\n");
                self.finish(text)
            }
            None => {
                self.body.push(line.to_string());
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for PageStream<R> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return Some(Err(WordrootsError::io(&self.path, e))),
                None => {
                    debug!(pages = self.emitted, "corpus scan reached end of input");
                    return None;
                }
            };

            if let Some(page) = self.accept(&line) {
                return Some(Ok(page));
            }
        }
    }
}

/// Decode the five predefined XML entities. `&amp;` goes last so that
/// `&amp;lt;` decodes to the literal text `&lt;`.
fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}
