// src/checker/html.rs
// =============================================================================
// This module extracts link targets from raw HTML/JSX fragments that appear
// inside markdown (MDX pages are full of them: <a href>, <img src>, ...).
//
// pulldown-cmark hands us those fragments verbatim as Html events; we parse
// each one with `scraper` and read the attributes off matching elements.
// Targets are returned exactly as written - resolving them is the checker's
// job, not ours.
// =============================================================================

use scraper::{Html, Selector};

// Elements whose attribute points at another document or asset
const LINK_SELECTOR: &str = "a[href], img[src], source[src], video[src]";

// Extracts href/src targets from an HTML fragment
//
// Example:
//   html = "<a href='/docs/intro'>Intro</a>"
//   result = ["/docs/intro"]
pub fn extract_html_links(html: &str) -> Vec<String> {
    // A constant selector never fails to parse, but an empty result is a
    // better failure mode than a panic mid-run
    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return Vec::new();
    };

    let fragment = Html::parse_fragment(html);

    fragment
        .select(&selector)
        .filter_map(|element| {
            let value = element.value();
            value.attr("href").or_else(|| value.attr("src"))
        })
        .map(str::to_string)
        .collect()
}
