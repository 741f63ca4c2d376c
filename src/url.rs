//! URL parsing: an external collaborator to the matching engine (per the
//! system scope, the core never parses URLs itself), kept here as a small,
//! dependency-free implementation so the crate is runnable end to end.
//!
//! Produces the four normalized parts the engine expects: host lowercased,
//! file as the last path segment, query with its leading `?` stripped.
//! Returns `None` for anything that doesn't look like `scheme://host...`,
//! which the caller turns into the `"INVALID_URL"` output line.

use crate::types::ParsedUrl;

pub fn parse_url(raw: &str) -> Option<ParsedUrl> {
    let (_scheme, rest) = raw.split_once("://")?;
    if rest.is_empty() {
        return None;
    }

    let (before_query, query) = match rest.split_once('?') {
        Some((before, query)) => (before, query),
        None => (rest, ""),
    };

    let (host, path) = match before_query.split_once('/') {
        Some((host, tail)) => (host, format!("/{tail}")),
        None => (before_query, String::new()),
    };

    if host.is_empty() {
        return None;
    }

    let file = if path.is_empty() || path.ends_with('/') {
        String::new()
    } else {
        path.rsplit('/').next().unwrap_or("").to_string()
    };

    Some(ParsedUrl { host: host.to_lowercase(), path, file, query: query.to_string() })
}
