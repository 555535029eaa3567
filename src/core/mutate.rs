//! Formula rewriting
//!
//! Applies a [`PendingUpdate`] to formula text as a series of independent
//! passes. Each pass splices new values into exactly the region it owns;
//! every other byte of the file is carried over unchanged.
//!
//! 1. Primary url: the quoted value of the first `url "..."` outside any
//!    resource block. Canonical `files.pythonhosted.org` urls are preferred,
//!    any `*.tar.gz` url is the fallback.
//! 2. Primary version: an explicit `version "..."` literal, rewritten only if
//!    it still holds the version being replaced.
//! 3. Primary checksum: the first `sha256 "..."` after the url line chosen in
//!    pass 1 and before the next resource block, found by [`ChecksumScanner`].
//! 4. Resources (only when pins are supplied): simple resource blocks are
//!    removed and regenerated, sorted by name, right above `def install`.
//!
//! Nothing is written here. If a required region is missing the whole
//! rewrite fails and the caller keeps the original file.

use super::deps::DependencyPin;
use super::error::MutationError;
use super::formula::normalize_name;
use super::index::ReleaseDescriptor;
use super::syntax::{self, ResourceTracker};
use super::updates::PendingUpdate;
use std::ops::Range;

/// A dependency pin together with the source artifact it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Resource name as written in the formula (hyphenated, lower-case)
    pub name: String,
    pub url: String,
    pub sha256: String,
}

impl ResolvedResource {
    pub fn new(pin: &DependencyPin, release: &ReleaseDescriptor) -> Self {
        Self {
            name: normalize_name(&pin.name),
            url: release.url.clone(),
            sha256: release.sha256.clone(),
        }
    }

    /// Render as a resource block indented by `indent`, each line ended by `eol`.
    fn render(&self, indent: &str, eol: &str) -> String {
        format!(
            "{indent}resource \"{name}\" do{eol}\
             {indent}  url \"{url}\"{eol}\
             {indent}  sha256 \"{sha256}\"{eol}\
             {indent}end{eol}",
            name = self.name,
            url = self.url,
            sha256 = self.sha256,
        )
    }
}

/// Apply `update` to formula text and return the new text.
///
/// `resources` regenerates the dependency block; `None` or an empty slice
/// leaves existing resource blocks alone.
pub fn apply(
    content: &str,
    update: &PendingUpdate,
    resources: Option<&[ResolvedResource]>,
) -> Result<String, MutationError> {
    let anchor = locate_primary_url(content)?;
    let content = splice_primary_url(content, anchor, &update.tarball_url)?;
    let content =
        replace_primary_version(&content, &update.current_version, &update.latest_version);
    let content = replace_primary_checksum(&content, anchor, &update.sha256)?;

    match resources {
        Some(resources) if !resources.is_empty() => replace_resources(&content, resources),
        _ => Ok(content),
    }
}

fn lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Rebuild the text with `value` spliced over `span` of line `index`.
fn splice(lines: &[&str], index: usize, span: Range<usize>, value: &str) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len()).sum::<usize>() + value.len());
    for (i, line) in lines.iter().enumerate() {
        if i == index {
            out.push_str(&line[..span.start]);
            out.push_str(value);
            out.push_str(&line[span.end..]);
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Line index of the primary url: the canonical-host url if there is one,
/// otherwise the first `.tar.gz` url outside resource blocks.
pub fn locate_primary_url(content: &str) -> Result<usize, MutationError> {
    let lines = lines(content);
    syntax::find_primary_url(lines.iter().copied(), syntax::is_canonical_url)
        .or_else(|| syntax::find_primary_url(lines.iter().copied(), syntax::is_archive_url))
        .map(|primary| primary.line_index)
        .ok_or(MutationError::PrimaryUrlNotFound)
}

/// Pass 1: point the primary url at `new_url`.
pub fn replace_primary_url(content: &str, new_url: &str) -> Result<String, MutationError> {
    let anchor = locate_primary_url(content)?;
    splice_primary_url(content, anchor, new_url)
}

fn splice_primary_url(
    content: &str,
    anchor: usize,
    new_url: &str,
) -> Result<String, MutationError> {
    let lines = lines(content);
    let quoted = lines
        .get(anchor)
        .and_then(|line| syntax::quoted_value(line, "url"))
        .ok_or(MutationError::PrimaryUrlNotFound)?;
    Ok(splice(&lines, anchor, quoted.span, new_url))
}

/// Pass 2: bump an explicit `version "..."` literal from `current` to `latest`.
///
/// Formulas whose version is derived from the url have no such literal and
/// are returned unchanged.
pub fn replace_primary_version(content: &str, current: &str, latest: &str) -> String {
    let lines = lines(content);
    let mut tracker = ResourceTracker::default();

    for (index, line) in lines.iter().enumerate() {
        if tracker.observe(line) {
            continue;
        }
        if let Some(quoted) = syntax::quoted_value(line, "version") {
            if quoted.value == current {
                return splice(&lines, index, quoted.span, latest);
            }
            break;
        }
    }
    content.to_string()
}

/// Where the checksum scan currently is relative to the primary url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Primary url line not reached yet
    BeforeAnchor,
    /// After the primary url, before any resource block
    InPrimarySection,
    /// A resource block started after the anchor; no more substitutions
    InResourceSection,
    /// The primary checksum was found
    Done,
}

/// Line-by-line scanner for the primary `sha256` declaration.
///
/// The anchor is the line index of the primary url as chosen by
/// [`locate_primary_url`], so both passes always agree on which url the
/// checksum belongs to.
#[derive(Debug)]
pub struct ChecksumScanner {
    anchor: usize,
    line: usize,
    state: ScanState,
}

impl ChecksumScanner {
    pub fn new(anchor: usize) -> Self {
        Self {
            anchor,
            line: 0,
            state: ScanState::BeforeAnchor,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Feed the next line. Returns the span of the checksum value if this
    /// line holds the primary checksum.
    pub fn step(&mut self, line: &str) -> Option<Range<usize>> {
        let index = self.line;
        self.line += 1;

        match self.state {
            ScanState::BeforeAnchor => {
                if index == self.anchor {
                    self.state = ScanState::InPrimarySection;
                }
                None
            }
            ScanState::InPrimarySection => {
                if syntax::resource_open(line).is_some() {
                    self.state = ScanState::InResourceSection;
                    return None;
                }
                let quoted = syntax::quoted_value(line, "sha256")?;
                self.state = ScanState::Done;
                Some(quoted.span)
            }
            ScanState::InResourceSection | ScanState::Done => None,
        }
    }
}

/// Pass 3: replace the checksum that belongs to the primary url on line
/// `anchor`.
pub fn replace_primary_checksum(
    content: &str,
    anchor: usize,
    sha256: &str,
) -> Result<String, MutationError> {
    let lines = lines(content);
    let mut scanner = ChecksumScanner::new(anchor);

    for (index, line) in lines.iter().enumerate() {
        if let Some(span) = scanner.step(line) {
            return Ok(splice(&lines, index, span, sha256));
        }
        if scanner.state() == ScanState::InResourceSection {
            break;
        }
    }
    Err(MutationError::PrimaryChecksumNotFound)
}

/// Length of the resource block starting at `lines[0]`, if it has exactly
/// the `resource / url / sha256 / end` shape.
fn simple_resource_block(lines: &[&str]) -> Option<usize> {
    let [open, url, sha, end, ..] = lines else {
        return None;
    };
    syntax::resource_open(open)?;
    syntax::quoted_value(url, "url")?;
    syntax::quoted_value(sha, "sha256")?;
    let closes = syntax::is_block_end(end)
        && syntax::indentation(end).len() == syntax::indentation(open).len();
    closes.then_some(4)
}

/// Pass 4: drop simple resource blocks and regenerate them above `def install`.
pub fn replace_resources(
    content: &str,
    resources: &[ResolvedResource],
) -> Result<String, MutationError> {
    let lines = lines(content);
    let mut keep = vec![true; lines.len()];

    let mut i = 0;
    while i < lines.len() {
        match simple_resource_block(&lines[i..]) {
            Some(len) => {
                keep[i..i + len].fill(false);
                // take the blank separator above the block with it
                if i > 0 && keep[i - 1] && syntax::is_blank(lines[i - 1]) {
                    keep[i - 1] = false;
                }
                i += len;
            }
            None => i += 1,
        }
    }

    let kept: Vec<&str> = lines
        .iter()
        .zip(&keep)
        .filter(|(_, keep)| **keep)
        .map(|(line, _)| *line)
        .collect();

    let anchor = kept
        .iter()
        .position(|line| syntax::is_install_anchor(line))
        .ok_or(MutationError::InstallAnchorNotFound)?;
    let indent = syntax::indentation(kept[anchor]);
    let eol = if kept[anchor].ends_with("\r\n") { "\r\n" } else { "\n" };

    let mut sorted: Vec<&ResolvedResource> = resources.iter().collect();
    sorted.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut out = String::with_capacity(content.len());
    for line in &kept[..anchor] {
        out.push_str(line);
    }
    if anchor > 0 && !syntax::is_blank(kept[anchor - 1]) {
        out.push_str(eol);
    }
    for resource in sorted {
        out.push_str(&resource.render(indent, eol));
        out.push_str(eol);
    }
    for line in &kept[anchor..] {
        out.push_str(line);
    }

    Ok(out)
}
