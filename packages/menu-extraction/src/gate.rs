//! Document gate: decide which linked documents are worth processing.

use indexmap::IndexSet;
use scraper::{Html, Selector};
use url::Url;

use crate::heuristics::week::{extract_week_number_from_locator, locator_filename};

/// Whether a locator names a relevant menu document.
///
/// The filename (last path segment, lowercased) must contain one of
/// `keywords` or carry a week number.
pub fn is_relevant(url: &str, keywords: &[String]) -> bool {
    let filename = locator_filename(url);
    if filename.is_empty() {
        return false;
    }
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| filename.contains(&k.to_lowercase()))
        || extract_week_number_from_locator(url).is_some()
}

/// Keep the relevant locators, in their original order.
pub fn filter_relevant<'a, I>(urls: I, keywords: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    urls.into_iter()
        .filter(|url| is_relevant(url, keywords))
        .map(str::to_string)
        .collect()
}

/// Candidate PDF links on a listing page, resolved against `base`.
///
/// Every `a[href]` whose target mentions `pdf` counts. Duplicates are
/// dropped; the first occurrence decides the order.
pub fn find_document_links(base: &str, html: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let links: IndexSet<String> = document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.to_lowercase().contains("pdf"))
        .filter_map(|href| base.join(href.trim()).ok())
        .map(String::from)
        .collect();

    links.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keywords() -> Vec<String> {
        vec!["lunch".to_string(), "dagens".to_string()]
    }

    #[test]
    fn test_gate_accepts_keywords_and_weeks() {
        let k = keywords();
        assert!(is_relevant("https://x.se/files/LUNCH_meny.pdf", &k));
        assert!(is_relevant("https://x.se/dagens.pdf?v=2", &k));
        assert!(is_relevant("https://x.se/menu_v46.pdf", &k));
        assert!(is_relevant("https://example.com/menus/lunch-vecka46.pdf", &k));
    }

    #[test]
    fn test_gate_rejects_others() {
        let k = keywords();
        assert!(!is_relevant("https://x.se/lunch/prislista.pdf", &k));
        assert!(!is_relevant("https://x.se/overview.pdf", &k));
        assert!(!is_relevant("", &k));
        assert!(!is_relevant("https://x.se/", &k));
    }

    #[test]
    fn test_filter_keeps_order() {
        let urls = [
            "https://x.se/b-lunch.pdf",
            "https://x.se/about.pdf",
            "https://x.se/a-dagens.pdf",
        ];
        assert_eq!(
            filter_relevant(urls, &keywords()),
            vec!["https://x.se/b-lunch.pdf", "https://x.se/a-dagens.pdf"]
        );
    }

    #[test]
    fn test_find_document_links() {
        let html = r#"
            <html><body>
              <a href="/files/lunch-v46.pdf">Lunch</a>
              <a href="about.html">About</a>
              <a href="https://cdn.x.se/download?type=PDF&id=3">Download</a>
              <a href="/files/lunch-v46.pdf">Again</a>
              <a>no href</a>
            </body></html>
        "#;
        let links = find_document_links("https://x.se/restaurant/", html);

        assert_eq!(
            links,
            vec![
                "https://x.se/files/lunch-v46.pdf",
                "https://cdn.x.se/download?type=PDF&id=3",
            ]
        );
    }

    #[test]
    fn test_find_document_links_bad_base() {
        assert!(find_document_links("not a url", "<a href='a.pdf'>a</a>").is_empty());
    }

    proptest! {
        #[test]
        fn gate_only_passes_keyword_or_week_filenames(name in "[a-z0-9_-]{1,16}") {
            let url = format!("https://x.se/docs/{name}.pdf");
            let expected = name.contains("lunch")
                || name.contains("dagens")
                || extract_week_number_from_locator(&url).is_some();
            prop_assert_eq!(is_relevant(&url, &keywords()), expected);
        }
    }
}
