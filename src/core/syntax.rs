//! Line-level recognizers for formula text
//!
//! Formulas are Ruby, but we never parse Ruby. Every edit is anchored on a
//! handful of declaration shapes that Homebrew formulas use consistently:
//!
//! ```ruby
//! class Httpie < Formula
//!   url "https://files.pythonhosted.org/packages/.../httpie-3.2.2.tar.gz"
//!   sha256 "..."
//!
//!   resource "idna" do
//!     url "..."
//!     sha256 "..."
//!   end
//!
//!   def install
//! ```
//!
//! All offsets returned here are byte offsets into the line that was passed
//! in, so callers can splice replacements without touching anything else.

use std::ops::Range;

/// Hosting prefix of canonical PyPI source tarballs
pub const CANONICAL_URL_PREFIX: &str = "https://files.pythonhosted.org/packages/";

/// Suffix of the source archives we track
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// A `keyword "value"` declaration found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quoted<'a> {
    /// The text between the quotes
    pub value: &'a str,
    /// Byte range of `value` within the line
    pub span: Range<usize>,
}

/// Leading whitespace of a line
pub fn indentation(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// True for lines holding nothing but whitespace
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Match `<indent><keyword> <ws>"<value>"` and return the quoted value.
///
/// The keyword must be the first token on the line, so `homepage_url "x"`
/// never matches `url`.
pub fn quoted_value<'a>(line: &'a str, keyword: &str) -> Option<Quoted<'a>> {
    let indent = indentation(line).len();
    let rest = line[indent..].strip_prefix(keyword)?;

    let after_ws = rest.trim_start_matches([' ', '\t']);
    if after_ws.len() == rest.len() {
        // no whitespace between keyword and value
        return None;
    }

    let open = line.len() - after_ws.len();
    let body = after_ws.strip_prefix('"')?;
    let close = body.find('"')?;

    let start = open + 1;
    let end = start + close;
    Some(Quoted {
        value: &line[start..end],
        span: start..end,
    })
}

/// Match `resource "<name>" do` and return the resource name.
pub fn resource_open(line: &str) -> Option<&str> {
    let quoted = quoted_value(line, "resource")?;
    let tail = line[quoted.span.end + 1..].trim();
    (tail == "do").then_some(quoted.value)
}

/// True for a bare `end` line
pub fn is_block_end(line: &str) -> bool {
    line.trim() == "end"
}

/// Match `class <Ident> < Formula` and return the identifier.
pub fn class_declaration(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "class" {
        return None;
    }
    let ident = tokens.next()?;
    if ident.is_empty() || !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    if tokens.next()? != "<" {
        return None;
    }
    tokens.next()?.starts_with("Formula").then_some(ident)
}

/// True for the `def install` line that anchors generated resource blocks
pub fn is_install_anchor(line: &str) -> bool {
    match line.trim().strip_prefix("def install") {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '(']),
        None => false,
    }
}

/// Tracks whether a line scan is inside a `resource "..." do ... end` block.
///
/// The closing `end` is the first bare `end` at the opening line's
/// indentation, so nested `do ... end` bodies don't close the resource.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    open_indent: Option<usize>,
}

impl ResourceTracker {
    /// Feed the next line; returns true if the line belongs to a resource block.
    pub fn observe(&mut self, line: &str) -> bool {
        match self.open_indent {
            Some(indent) => {
                if is_block_end(line) && indentation(line).len() == indent {
                    self.open_indent = None;
                }
                true
            }
            None => {
                if resource_open(line).is_some() {
                    self.open_indent = Some(indentation(line).len());
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Location of the primary `url "..."` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryUrl<'a> {
    pub line_index: usize,
    pub quoted: Quoted<'a>,
}

/// Find the first `url "..."` outside any resource block whose value
/// satisfies `accept`.
pub fn find_primary_url<'a, I>(lines: I, accept: impl Fn(&str) -> bool) -> Option<PrimaryUrl<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tracker = ResourceTracker::default();
    for (line_index, line) in lines.into_iter().enumerate() {
        if tracker.observe(line) {
            continue;
        }
        if let Some(quoted) = quoted_value(line, "url") {
            if accept(quoted.value) {
                return Some(PrimaryUrl { line_index, quoted });
            }
        }
    }
    None
}

/// URL hosted on the canonical PyPI file host
pub fn is_canonical_url(url: &str) -> bool {
    url.starts_with(CANONICAL_URL_PREFIX)
}

/// Any URL pointing at a source archive
pub fn is_archive_url(url: &str) -> bool {
    url.ends_with(ARCHIVE_SUFFIX)
}
