//! HTML helpers: visible text, element text, image discovery.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const HIDDEN: [&str; 4] = ["script", "style", "noscript", "template"];

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|e| HIDDEN.contains(&e.name()));
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    collapse(&out)
}

/// Visible text of a page body with whitespace collapsed to single spaces.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next());
    element_text(body.unwrap_or_else(|| document.root_element()))
}

/// Text of the first element matching `selector`, if any.
pub fn select_text(html: &str, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    let text = document.select(&selector).next().map(element_text);
    text
}

/// Image sources on a page, resolved against `base`, first-seen order.
pub fn image_sources(base: &str, html: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let sources: IndexSet<String> = document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| !src.trim().starts_with("data:"))
        .filter_map(|src| base.join(src.trim()).ok())
        .map(String::from)
        .collect();

    sources.into_iter().collect()
}
