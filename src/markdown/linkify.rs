//! Bare URL autolinking
//!
//! pulldown-cmark only links `<https://...>` autolinks. This pass runs over
//! the parser's event stream and turns bare `http(s)://`, `ftp://` and
//! `www.` addresses in ordinary text into links. Text inside links (markdown
//! or raw `<a>` tags), images and code blocks is left untouched.

use pulldown_cmark::{CowStr, Event, LinkType, Tag};
use regex::Regex;
use std::sync::OnceLock;

fn re_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:https?://|ftp://|www\.)[^\s<>"]+"#).expect("valid URL pattern")
    })
}

/// Characters that end a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', '*', '_', '~'];

/// Trim punctuation that belongs to the surrounding prose
fn trim_url(candidate: &str) -> &str {
    let mut url = candidate;
    loop {
        if let Some(stripped) = url.strip_suffix(TRAILING_PUNCTUATION) {
            url = stripped;
        } else if url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
            url = &url[..url.len() - 1];
        } else {
            return url;
        }
    }
}

/// Split plain text into text and link events
fn split_text<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for found in re_url().find_iter(text) {
        let url = trim_url(found.as_str());
        // "www." alone is not a link
        if url.len() <= 4 {
            continue;
        }
        let start = found.start();
        let end = start + url.len();

        if start > last {
            out.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }

        let href = if url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };
        let tag = || Tag::Link(LinkType::Autolink, CowStr::from(href.clone()), CowStr::from(""));
        out.push(Event::Start(tag()));
        out.push(Event::Text(CowStr::from(url.to_string())));
        out.push(Event::End(tag()));

        last = end;
    }

    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Rewrite an event stream, linking bare URLs.
///
/// Adjacent text events are merged first so a URL split by the parser is
/// still recognised. Merging does not change the rendered HTML.
pub fn linkify<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut has_pending = false;
    // links and images nest; code blocks do not
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        if let Event::Text(text) = &event {
            pending.push_str(text);
            has_pending = true;
            continue;
        }

        if has_pending {
            flush(&mut pending, link_depth > 0 || in_code_block, &mut out);
            has_pending = false;
        }

        match &event {
            Event::Start(Tag::Link(..)) | Event::Start(Tag::Image(..)) => link_depth += 1,
            Event::End(Tag::Link(..)) | Event::End(Tag::Image(..)) => {
                link_depth = link_depth.saturating_sub(1)
            }
            Event::Html(raw) => match raw_anchor(raw) {
                Some(true) => link_depth += 1,
                Some(false) => link_depth = link_depth.saturating_sub(1),
                None => {}
            },
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(Tag::CodeBlock(_)) => in_code_block = false,
            _ => {}
        }
        out.push(event);
    }

    if has_pending {
        flush(&mut pending, link_depth > 0 || in_code_block, &mut out);
    }

    out
}

/// Whether a raw HTML event opens (`Some(true)`) or closes (`Some(false)`)
/// an anchor element
fn raw_anchor(raw: &str) -> Option<bool> {
    let tag = raw.trim_start().as_bytes();
    let is_anchor = |rest: &[u8]| {
        matches!(rest, [b'a' | b'A', b'>' | b' ' | b'\t' | b'\n' | b'\r', ..])
    };
    match tag {
        [b'<', b'/', rest @ ..] if is_anchor(rest) => Some(false),
        [b'<', rest @ ..] if is_anchor(rest) => Some(true),
        _ => None,
    }
}

fn flush<'a>(pending: &mut String, verbatim: bool, out: &mut Vec<Event<'a>>) {
    let text = std::mem::take(pending);
    if verbatim {
        out.push(Event::Text(CowStr::from(text)));
    } else {
        split_text(&text, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{html, Options, Parser};

    fn render(markdown: &str) -> String {
        let mut out = String::new();
        html::push_html(&mut out, linkify(Parser::new_ext(markdown, Options::empty())).into_iter());
        out
    }

    #[test]
    fn test_bare_url_is_linked() {
        assert_eq!(
            render("See https://example.com/a_b for details."),
            "<p>See <a href=\"https://example.com/a_b\">https://example.com/a_b</a> for details.</p>\n"
        );
    }

    #[test]
    fn test_www_gets_scheme() {
        assert_eq!(
            render("visit www.example.org"),
            "<p>visit <a href=\"http://www.example.org\">www.example.org</a></p>\n"
        );
    }

    #[test]
    fn test_existing_links_and_code_untouched() {
        let html = render("[docs](https://a.example) `https://b.example`\n\n```\nhttps://c.example\n```");
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("<code>https://b.example</code>"));
        assert!(html.contains("<pre><code>https://c.example\n</code></pre>"));
    }

    #[test]
    fn test_raw_anchor_text_is_not_linked_again() {
        assert_eq!(
            render("See <a href=\"https://x.io\">https://x.io</a> now"),
            "<p>See <a href=\"https://x.io\">https://x.io</a> now</p>\n"
        );
        assert_eq!(
            render("<A HREF=\"/a\">www.a.io</A> and www.b.io"),
            "<p><A HREF=\"/a\">www.a.io</A> and <a href=\"http://www.b.io\">www.b.io</a></p>\n"
        );
    }

    #[test]
    fn test_raw_anchor_detection() {
        assert_eq!(raw_anchor("<a href=\"x\">"), Some(true));
        assert_eq!(raw_anchor("<a>"), Some(true));
        assert_eq!(raw_anchor("</a>"), Some(false));
        assert_eq!(raw_anchor("<abbr title=\"x\">"), None);
        assert_eq!(raw_anchor("<b>"), None);
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("https://x.io/page)."), "https://x.io/page");
        assert_eq!(trim_url("https://x.io/wiki/Rust_(language)"), "https://x.io/wiki/Rust_(language)");
        assert_eq!(trim_url("www.x.io!?"), "www.x.io");
    }

    #[test]
    fn test_text_without_urls_is_unchanged() {
        assert_eq!(render("plain *text* here"), "<p>plain <em>text</em> here</p>\n");
    }
}
