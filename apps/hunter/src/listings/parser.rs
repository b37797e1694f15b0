//! Turns listing-source response bodies into raw records.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::listing::RawListing;

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    elements: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DescriptionPayload {
    description: Option<String>,
}

/// Parses a search results page.
///
/// The page itself must be a JSON object; a malformed element only costs that
/// element.
pub fn parse_search_page(body: &str) -> Result<Vec<RawListing>, serde_json::Error> {
    let page: SearchPage = serde_json::from_str(body)?;

    let mut listings = Vec::with_capacity(page.elements.len());
    for (index, element) in page.elements.into_iter().enumerate() {
        match serde_json::from_value::<RawListing>(element) {
            Ok(raw) => listings.push(raw),
            Err(e) => warn!("Skipping malformed listing #{index}: {e}"),
        }
    }
    Ok(listings)
}

/// Extracts description text from a detail response.
///
/// Accepts `{"description": "..."}` or an HTML/plain-text document. Returns an
/// empty string when nothing usable is found.
pub fn parse_description(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str::<DescriptionPayload>(trimmed)
            .ok()
            .and_then(|p| p.description)
            .map(|d| collapse_whitespace(&d))
            .unwrap_or_default();
    }
    collapse_whitespace(&strip_tags(trimmed))
}

/// Removes markup, dropping `<script>`/`<style>` bodies entirely.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        let Some(close) = after.find('>') else {
            rest = "";
            break;
        };
        let tag = after[1..close].trim().to_ascii_lowercase();
        rest = &after[close + 1..];

        for skipped in ["script", "style"] {
            if tag == skipped || tag.starts_with(&format!("{skipped} ")) {
                let end_tag = format!("</{skipped}>");
                let lower = rest.to_ascii_lowercase();
                rest = match lower.find(&end_tag) {
                    Some(pos) => &rest[pos + end_tag.len()..],
                    None => "",
                };
            }
        }
        out.push(' ');
    }
    out.push_str(rest);

    out.replace("&amp;", "&")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
