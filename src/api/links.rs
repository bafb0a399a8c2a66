//! Pagination `Link` header parser.
//!
//! Parses RFC 5988 headers of the form
//! `</api/entries?page=1&size=20>; rel="next",</api/entries?page=4&size=20>; rel="last"`
//! into a map of relation name to page number, and decides whether an
//! incoming page starts a fresh scroll position or continues the current one.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkHeaderError {
    #[error("link section {0:?} has no '<url>; rel=\"...\"' form")]
    MalformedSection(String),
    #[error("link section {0:?} has no rel parameter")]
    MissingRel(String),
}

/// Page numbers keyed by relation (`first`, `prev`, `next`, `last`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    rels: BTreeMap<String, u32>,
}

impl Links {
    pub fn get(&self, rel: &str) -> Option<u32> {
        self.rels.get(rel).copied()
    }

    /// Next page number, 0 when the server announced none.
    pub fn next(&self) -> u32 {
        self.get("next").unwrap_or(0)
    }

    /// Continuation cursor; `None` once the last page has been fetched.
    pub fn cursor(&self) -> Option<u32> {
        self.get("next")
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// True when the page these links describe is the start of a scroll:
    /// it has no predecessor, or the collection fits on a single page.
    pub fn is_fresh_scroll(&self) -> bool {
        let single_page = match (self.get("first"), self.get("last")) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        };
        single_page || self.get("prev").is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.rels.iter().map(|(rel, page)| (rel.as_str(), *page))
    }
}

impl FromIterator<(String, u32)> for Links {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self {
            rels: iter.into_iter().collect(),
        }
    }
}

/// Parse a `Link` header. Relations whose URL carries no numeric `page`
/// parameter are skipped; an empty header yields empty links.
pub fn parse_link_header(header: &str) -> Result<Links, LinkHeaderError> {
    let mut rels = BTreeMap::new();

    for section in split_sections(header) {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }

        let (target, params) = section
            .split_once(';')
            .ok_or_else(|| LinkHeaderError::MalformedSection(section.to_string()))?;
        let url = target
            .trim()
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .ok_or_else(|| LinkHeaderError::MalformedSection(section.to_string()))?;

        let rel = params
            .split(';')
            .filter_map(|p| p.trim().strip_prefix("rel="))
            .map(|r| r.trim().trim_matches('"'))
            .next()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| LinkHeaderError::MissingRel(section.to_string()))?;

        if let Some(page) = page_param(url) {
            rels.insert(rel.to_string(), page);
        }
    }

    Ok(Links { rels })
}

/// Split on commas that sit outside `<...>`; sort parameters such as
/// `sort=id,asc` contain literal commas.
fn split_sections(header: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in header.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                sections.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    sections.push(&header[start..]);
    sections
}

fn page_param(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
