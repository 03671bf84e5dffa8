//! Detail link discovery for index pages
//!
//! An index page lists many properties. Each listing links to its detail page
//! through an anchor whose path starts with the configured detail prefix
//! (`/Property/` by default). Those anchors are the only links followed.

use crate::HarvestError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Finds detail page addresses on a parsed index page
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    anchors: Selector,
    origin: Url,
    path_prefix: String,
}

impl LinkDiscoverer {
    /// Creates a discoverer that resolves links against `origin`
    pub fn new(origin: Url, path_prefix: impl Into<String>) -> Result<Self, HarvestError> {
        Ok(Self {
            anchors: parse_selector("a[href]")?,
            origin,
            path_prefix: path_prefix.into(),
        })
    }

    /// Returns the absolute detail addresses linked from `document`
    ///
    /// Addresses are unique and keep their first-seen order. Fragments are
    /// dropped so two anchors into the same listing count once. A page with
    /// no matching anchors yields an empty list.
    pub fn discover(&self, document: &Html) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.anchors) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(address) = self.resolve_detail_link(href) {
                if seen.insert(address.clone()) {
                    links.push(address);
                }
            }
        }

        links
    }

    /// Convenience wrapper that parses raw HTML first
    pub fn discover_in_html(&self, html: &str) -> Vec<String> {
        self.discover(&Html::parse_document(html))
    }

    /// Resolves an href to an absolute detail address
    ///
    /// Accepts root-relative paths under the prefix and absolute URLs on the
    /// same origin whose path is under the prefix. Everything else is `None`.
    fn resolve_detail_link(&self, href: &str) -> Option<String> {
        let href = href.trim();

        let mut url = if href.starts_with(&self.path_prefix) {
            self.origin.join(href).ok()?
        } else {
            let absolute = Url::parse(href).ok()?;
            if absolute.origin() != self.origin.origin()
                || !absolute.path().starts_with(&self.path_prefix)
            {
                return None;
            }
            absolute
        };

        url.set_fragment(None);
        Some(url.to_string())
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
