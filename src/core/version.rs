//! Version comparison
//!
//! Decides whether the index's latest release is newer than what a formula
//! declares. Versions are mapped onto semver and compared there; anything
//! that doesn't map falls back to plain string inequality.
//!
//! The fallback is deliberately naive: `"2024-01a"` vs `"2024-01b"` reports
//! an update either way round. Callers can see which path was taken through
//! [`Comparison::method`].

use semver::{BuildMetadata, Prerelease, Version};

/// How a comparison was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMethod {
    /// Both sides parsed and were ordered
    Semantic,
    /// At least one side didn't parse; strings were compared for equality
    StringFallback,
}

/// Outcome of comparing a declared version against a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub newer: bool,
    pub method: ComparisonMethod,
}

/// Returns true if `latest` is strictly newer than `current`.
///
/// # Logic
/// - both parse -> `latest > current`
/// - otherwise -> `latest != current`
pub fn is_newer(current: &str, latest: &str) -> bool {
    compare(current, latest).newer
}

/// Like [`is_newer`], but also reports which path decided it.
pub fn compare(current: &str, latest: &str) -> Comparison {
    match (parse(current), parse(latest)) {
        (Some(current_ver), Some(latest_ver)) => Comparison {
            newer: latest_ver > current_ver,
            method: ComparisonMethod::Semantic,
        },
        _ => Comparison {
            newer: latest != current,
            method: ComparisonMethod::StringFallback,
        },
    }
}

/// Map a dotted release version onto semver.
///
/// Accepts an optional `v` prefix, one to three numeric release components
/// (padded to three) and an optional suffix:
/// - `a1`, `alpha1`, `b2`, `beta2`, `rc1`, `c1` -> pre-release (`1.0rc1` < `1.0`)
/// - `post1`, `.post1`, `-post1` -> post-release (`1.0.post1` > `1.0`)
pub fn parse(version: &str) -> Option<Version> {
    let s = version.trim();
    let s = s.strip_prefix('v').unwrap_or(s);

    let release_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (release, suffix) = s.split_at(release_end);

    // "1.0.post1" leaves a trailing dot on the release part
    let (release, suffix) = match release.strip_suffix('.') {
        Some(r) if !suffix.is_empty() => (r, suffix),
        _ => (release, suffix),
    };

    let parts = release
        .split('.')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut parsed = Version::new(
        parts[0],
        parts.get(1).copied().unwrap_or(0),
        parts.get(2).copied().unwrap_or(0),
    );

    if suffix.is_empty() {
        return Some(parsed);
    }

    let suffix = suffix.trim_start_matches(['-', '.', '_']).to_ascii_lowercase();
    let label_end = suffix
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(suffix.len());
    let (label, number) = suffix.split_at(label_end);
    let number: u64 = if number.is_empty() {
        0
    } else {
        number.parse().ok()?
    };

    let pre = match label {
        "a" | "alpha" => Some("a"),
        "b" | "beta" => Some("b"),
        "rc" | "c" => Some("rc"),
        "post" => None,
        _ => return None,
    };

    match pre {
        Some(tag) => parsed.pre = Prerelease::new(&format!("{tag}.{number}")).ok()?,
        None => parsed.build = BuildMetadata::new(&format!("post.{number}")).ok()?,
    }
    Some(parsed)
}
