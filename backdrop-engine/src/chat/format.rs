// format.rs - Light markdown for assistant replies
//
// The reply is escaped first, so only the markup produced here reaches the
// page as HTML.

use std::sync::LazyLock;

use regex::Regex;

static FENCED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static EM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.*?)`").unwrap());

pub fn format_reply(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let html = escape(text);
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    // Fenced blocks are copied through untouched; markup applies between them
    for caps in FENCED.captures_iter(&html) {
        let (Some(block), Some(body)) = (caps.get(0), caps.get(1)) else { continue };
        out.push_str(&inline(&html[last..block.start()]));
        out.push_str("<pre><code>");
        out.push_str(body.as_str());
        out.push_str("</code></pre>");
        last = block.end();
    }
    out.push_str(&inline(&html[last..]));
    out.replace('\n', "<br>")
}

fn inline(html: &str) -> String {
    let html = BOLD.replace_all(html, "<strong>$1</strong>");
    let html = EM.replace_all(&html, "<em>$1</em>");
    CODE.replace_all(&html, "<code>$1</code>").into_owned()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
