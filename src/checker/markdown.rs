// src/checker/markdown.rs
// =============================================================================
// This module pulls two things out of a markdown/MDX document:
//
// - the link targets it points at (inline, reference, autolinks, images,
//   bare URLs in text, and href/src attributes of embedded HTML/JSX)
// - the anchors its headings define, slugged the way the documentation
//   renderer slugs them
//
// Both are pure text analysis: no I/O, and malformed input simply yields
// fewer (or zero) results.
//
// Link extraction rides on `pulldown-cmark`, which already knows where code
// spans and code blocks are. Anchor extraction is a line scanner on purpose:
// the slug algorithm is pinned, and we don't want it to drift with whatever
// a markdown library decides a heading is.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};
use regex::Regex;

use super::html::extract_html_links;

// Plain-text URLs that were not written as markdown links
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>()\[\]{}"'`]+"#).expect("bare URL pattern is valid")
});

// Anything that is not a word character, whitespace or a hyphen
static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("slug filter pattern is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// The set of anchors a single file defines.
///
/// Order doesn't matter for lookups, so this is just a set of slugs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorSet {
    slugs: HashSet<String>,
}

impl AnchorSet {
    /// Builds the anchor set straight from document content.
    pub fn from_markdown(markdown: &str) -> Self {
        extract_anchors(markdown).into_iter().collect()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }
}

impl FromIterator<String> for AnchorSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            slugs: iter.into_iter().collect(),
        }
    }
}

// Ordered, de-duplicated list of link targets
#[derive(Default)]
struct LinkList {
    seen: HashSet<String>,
    links: Vec<String>,
}

impl LinkList {
    fn push(&mut self, raw: &str) {
        if let Some(target) = normalize_target(raw) {
            if self.seen.insert(target.clone()) {
                self.links.push(target);
            }
        }
    }

    // Takes every plain-text URL out of `prose`, leaving it empty
    fn push_bare_urls(&mut self, prose: &mut String) {
        for found in BARE_URL.find_iter(prose) {
            self.push(trim_trailing_punctuation(found.as_str()));
        }
        prose.clear();
    }
}

// Extracts every link target from a markdown document
//
// Returns targets in the order they first appear, duplicates removed by
// exact match after normalization. Fragments are stripped from anything that
// isn't a pure in-page anchor, so `./guide#setup` becomes `./guide` while
// `#setup` stays as it is.
//
// Example input:
//   "See [intro](#intro) and [guide](./guide.md#setup)."
//
// Example output:
//   vec!["#intro", "./guide.md"]
pub fn extract_markdown_links(markdown: &str) -> Vec<String> {
    let mut links = LinkList::default();

    // Text events inside fenced/indented code are code samples, not prose
    let mut in_code_block = false;

    // Link labels and image alt text are never autolinked
    let mut label_depth = 0usize;

    // The parser may split one run of prose into several Text events
    // (at `_`, `*`, ...), so bare URLs are searched once the run is complete
    let mut prose = String::new();

    let options = Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH;

    for event in Parser::new_ext(markdown, options) {
        if let Event::Text(text) = &event {
            if label_depth > 0 {
                continue;
            }
            if !in_code_block {
                prose.push_str(text);
                continue;
            }
        }
        links.push_bare_urls(&mut prose);

        match event {
            // Inline, reference and autolinks all arrive as Tag::Link;
            // images carry their source the same way
            Event::Start(Tag::Link(link_type, dest_url, _title)) => {
                label_depth += 1;
                if link_type == LinkType::Email {
                    links.push(&format!("mailto:{}", dest_url));
                } else {
                    links.push(&dest_url);
                }
            }
            Event::Start(Tag::Image(_link_type, dest_url, _title)) => {
                label_depth += 1;
                links.push(&dest_url);
            }
            Event::End(Tag::Link(..) | Tag::Image(..)) => {
                label_depth = label_depth.saturating_sub(1);
            }

            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(Tag::CodeBlock(_)) => in_code_block = false,

            // Raw HTML and JSX elements embedded in the document
            Event::Html(html) => {
                for target in extract_html_links(&html) {
                    links.push(&target);
                }
            }

            _ => {}
        }
    }
    links.push_bare_urls(&mut prose);

    links.links
}

// Extracts heading anchors in document order
//
// Repeated slugs are disambiguated the conventional way: the first keeps the
// bare slug, later ones get `-1`, `-2`, ...
//
// Example input:
//   "# A\n## A\n### B"
//
// Example output:
//   vec!["a", "a-1", "b"]
pub fn extract_anchors(markdown: &str) -> Vec<String> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut anchors = Vec::new();

    for line in lines_outside_fences(markdown) {
        let Some(text) = heading_text(line) else {
            continue;
        };

        let slug = slugify(text);
        if slug.is_empty() {
            continue;
        }

        let count = occurrences.entry(slug.clone()).or_insert(0);
        let anchor = if *count == 0 {
            slug
        } else {
            format!("{}-{}", slug, count)
        };
        *count += 1;

        anchors.push(anchor);
    }

    anchors
}

/// Turns heading text into an anchor slug.
///
/// Lower-cases, drops every character that is not a word character,
/// whitespace or `-`, then joins the remaining words with single hyphens.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept = NON_SLUG_CHARS.replace_all(&lowered, "");
    WHITESPACE_RUN.replace_all(kept.trim(), "-").into_owned()
}

fn normalize_target(raw: &str) -> Option<String> {
    let target = raw.trim();

    let target = if target.starts_with('#') {
        target
    } else {
        target
            .split_once('#')
            .map_or(target, |(before, _fragment)| before)
            .trim()
    };

    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}

// "see https://example.com." should not drag the period along
fn trim_trailing_punctuation(url: &str) -> &str {
    url.trim_end_matches(['.', ',', ';', ':', '!', '?'])
}

// Lines that are not part of a fenced code block (fence lines included)
//
// A fence opens on a line starting with three or more backticks (an info
// string such as ```rust may follow) and closes on a line made only of
// backticks, at least as many as the opener. An unclosed fence swallows the
// rest of the document.
fn lines_outside_fences(markdown: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut open_fence: Option<usize> = None;

    for line in markdown.lines() {
        let trimmed = line.trim();
        match open_fence {
            Some(width) => {
                if trimmed.chars().all(|c| c == '`') && backtick_run(trimmed) >= width {
                    open_fence = None;
                }
            }
            None => {
                let width = backtick_run(trimmed);
                if width >= 3 {
                    open_fence = Some(width);
                } else {
                    lines.push(line);
                }
            }
        }
    }

    lines
}

fn backtick_run(line: &str) -> usize {
    line.chars().take_while(|&c| c == '`').count()
}

// Text of an ATX heading line, or None if the line isn't one
//
// "## Intro"     -> Some("Intro")
// "## Intro ##"  -> Some("Intro")  (closing sequence dropped)
// "#hashtag"     -> None           (a space must follow the hashes)
fn heading_text(line: &str) -> Option<&str> {
    let body = line.trim_start_matches(' ');
    if line.len() - body.len() > 3 {
        return None;
    }

    let level = body.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let text = &body[level..];
    if !text.is_empty() && !text.starts_with(char::is_whitespace) {
        return None;
    }

    Some(strip_closing_sequence(text.trim()))
}

fn strip_closing_sequence(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.is_empty() {
        ""
    } else if without.ends_with(char::is_whitespace) {
        without.trim_end()
    } else {
        // "C#" is content, not a closing sequence
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Intro"), "intro");
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Step 1:   Install  "), "step-1-install");
        assert_eq!(slugify("snake_case and-hyphen"), "snake_case-and-hyphen");
        assert_eq!(slugify("`wasmCloud` CLI"), "wasmcloud-cli");
    }

    #[test]
    fn test_slugify_is_stable() {
        let text = "Configure the Host (Advanced)";
        assert_eq!(slugify(text), slugify(text));
        assert_eq!(slugify(text), "configure-the-host-advanced");
    }

    #[test]
    fn test_duplicate_headings_are_numbered() {
        let markdown = "# A\n\ntext\n\n## A\n\n### A\n\n## B\n";
        assert_eq!(extract_anchors(markdown), vec!["a", "a-1", "a-2", "b"]);
    }

    #[test]
    fn test_headings_inside_fences_are_ignored() {
        let markdown = "## Real\n\n```bash\n# not a heading\n```\n\n## After\n";
        assert_eq!(extract_anchors(markdown), vec!["real", "after"]);
    }

    #[test]
    fn test_longer_fence_needs_matching_close() {
        let markdown = "````md\n```\n# inside\n```\n````\n# outside\n";
        assert_eq!(extract_anchors(markdown), vec!["outside"]);
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let markdown = "# Top\n```\n# hidden\n";
        assert_eq!(extract_anchors(markdown), vec!["top"]);
    }

    #[test]
    fn test_heading_shapes() {
        assert_eq!(heading_text("## Intro"), Some("Intro"));
        assert_eq!(heading_text("## Intro ##"), Some("Intro"));
        assert_eq!(heading_text("## C#"), Some("C#"));
        assert_eq!(heading_text("   # Indented"), Some("Indented"));
        assert_eq!(heading_text("    # Code"), None);
        assert_eq!(heading_text("#hashtag"), None);
        assert_eq!(heading_text("####### seven"), None);
        assert_eq!(heading_text("plain text"), None);
    }

    #[test]
    fn test_anchor_set_membership() {
        let anchors = AnchorSet::from_markdown("## Intro\n\n[x](#intro)\n");
        assert!(anchors.contains("intro"));
        assert!(!anchors.contains("missing"));
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn test_extract_inline_and_anchor_links() {
        let markdown = "See [intro](#intro) and [guide](./guide.md#setup).";
        assert_eq!(extract_markdown_links(markdown), vec!["#intro", "./guide.md"]);
    }

    #[test]
    fn test_extract_reference_and_autolinks() {
        let markdown = r#"
Read the [docs][ref] or visit <https://wasmcloud.com>.

[ref]: /docs/intro
        "#;
        assert_eq!(
            extract_markdown_links(markdown),
            vec!["/docs/intro", "https://wasmcloud.com"]
        );
    }

    #[test]
    fn test_extract_images_and_bare_urls() {
        let markdown = "![logo](./logo.png)\n\nPlain https://example.com/page. done";
        assert_eq!(
            extract_markdown_links(markdown),
            vec!["./logo.png", "https://example.com/page"]
        );
    }

    #[test]
    fn test_bare_url_with_underscores() {
        let links = extract_markdown_links("Docs live at https://example.com/some_long_page_name here");
        assert_eq!(links, vec!["https://example.com/some_long_page_name"]);
    }

    #[test]
    fn test_url_in_link_label_is_not_a_bare_url() {
        let markdown =
            "[https://github.com/golemcloud](./local) and ![https://cdn.example.com/a.png](./a.png)";
        let links = extract_markdown_links(markdown);
        assert_eq!(links, vec!["./local", "./a.png"]);
    }

    #[test]
    fn test_prose_after_link_still_scanned() {
        let links = extract_markdown_links("[guide](./guide) then see https://example.com/after");
        assert_eq!(links, vec!["./guide", "https://example.com/after"]);
    }

    #[test]
    fn test_extract_email_autolink() {
        let links = extract_markdown_links("Mail <team@example.com>");
        assert_eq!(links, vec!["mailto:team@example.com"]);
    }

    #[test]
    fn test_duplicates_removed_in_order() {
        let markdown = "[a](./a.md) [b](./b.md) [a again](./a.md#other) [b](./b.md)";
        assert_eq!(extract_markdown_links(markdown), vec!["./a.md", "./b.md"]);
    }

    #[test]
    fn test_code_is_not_scanned_for_links() {
        let markdown = "`[x](./inline.md)`\n\n```\n[y](./block.md) https://example.com\n```\n";
        assert!(extract_markdown_links(markdown).is_empty());
    }

    #[test]
    fn test_embedded_html_links() {
        let markdown = "<a href=\"/docs/reference\">Reference</a>\n\n<img src=\"./diagram.svg\" />\n";
        assert_eq!(
            extract_markdown_links(markdown),
            vec!["/docs/reference", "./diagram.svg"]
        );
    }

    #[test]
    fn test_empty_targets_dropped() {
        assert!(extract_markdown_links("[empty]() [space]( )").is_empty());
    }

    #[test]
    fn test_empty_and_malformed_input() {
        assert!(extract_markdown_links("").is_empty());
        assert!(extract_anchors("").is_empty());
        assert!(extract_markdown_links("[unclosed](").is_empty());
        assert!(extract_anchors("#\n##   \n").is_empty());
    }
}
