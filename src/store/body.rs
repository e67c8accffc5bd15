//! Rich-text body handling. Post bodies arrive as an ordered sequence of
//! typed blocks; each block carries styled spans and mark definitions.
//! Rendering maps every known block type to markup and degrades unknown
//! ones to plain text instead of failing.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(rename = "_type", default)]
    pub block_type: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(rename = "listItem", default)]
    pub list_item: Option<String>,
    #[serde(rename = "markDefs", default)]
    pub mark_defs: Vec<MarkDef>,
    #[serde(default)]
    pub children: Vec<Span>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

/// Annotation referenced by key from a span's marks. Only hyperlinks are
/// given markup; other annotation types leave the text undecorated.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub def_type: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockStyle {
    Normal,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Quote,
}

impl BlockStyle {
    fn parse(style: Option<&str>) -> BlockStyle {
        match style.unwrap_or("normal") {
            "h1" => BlockStyle::Heading1,
            "h2" => BlockStyle::Heading2,
            "h3" => BlockStyle::Heading3,
            "h4" => BlockStyle::Heading4,
            "blockquote" => BlockStyle::Quote,
            _ => BlockStyle::Normal,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            BlockStyle::Normal => "p",
            BlockStyle::Heading1 => "h1",
            BlockStyle::Heading2 => "h2",
            BlockStyle::Heading3 => "h3",
            BlockStyle::Heading4 => "h4",
            BlockStyle::Quote => "blockquote",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Number,
}

impl ListKind {
    fn parse(list_item: &str) -> ListKind {
        match list_item {
            "number" => ListKind::Number,
            _ => ListKind::Bullet,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Number => "ol",
        }
    }
}

pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<ListKind> = None;

    for block in blocks {
        if block.block_type != "block" {
            close_list(&mut out, &mut open_list);
            render_fallback(&mut out, block);
            continue;
        }

        match block.list_item.as_deref() {
            Some(list_item) => {
                let kind = ListKind::parse(list_item);
                if open_list != Some(kind) {
                    close_list(&mut out, &mut open_list);
                    out.push('<');
                    out.push_str(kind.tag());
                    out.push_str(">\n");
                    open_list = Some(kind);
                }
                out.push_str("<li>");
                render_spans(&mut out, block);
                out.push_str("</li>\n");
            }
            None => {
                close_list(&mut out, &mut open_list);
                let style = BlockStyle::parse(block.style.as_deref());
                out.push('<');
                out.push_str(style.tag());
                out.push('>');
                render_spans(&mut out, block);
                out.push_str("</");
                out.push_str(style.tag());
                out.push_str(">\n");
            }
        }
    }

    close_list(&mut out, &mut open_list);
    out
}

fn close_list(out: &mut String, open_list: &mut Option<ListKind>) {
    if let Some(kind) = open_list.take() {
        out.push_str("</");
        out.push_str(kind.tag());
        out.push_str(">\n");
    }
}

fn render_spans(out: &mut String, block: &Block) {
    for span in &block.children {
        let mut html = escape_html(&span.text);
        for mark in &span.marks {
            html = decorate(mark, &block.mark_defs, html);
        }
        out.push_str(&html);
    }
}

fn decorate(mark: &str, mark_defs: &[MarkDef], inner: String) -> String {
    if let Some(def) = mark_defs.iter().find(|d| d.key == mark) {
        if def.def_type == "link" {
            if let Some(ref href) = def.href {
                return format!("<a href=\"{}\">{}</a>", escape_html(href), inner);
            }
        }
        return inner;
    }

    match mark {
        "strong" => format!("<strong>{}</strong>", inner),
        "em" => format!("<em>{}</em>", inner),
        "code" => format!("<code>{}</code>", inner),
        "underline" => format!("<u>{}</u>", inner),
        _ => inner,
    }
}

/// Unknown block type: emit its text content as one plain paragraph.
fn render_fallback(out: &mut String, block: &Block) {
    let text: String = block.children.iter().map(|s| s.text.as_str()).collect();
    if text.trim().is_empty() {
        return;
    }
    out.push_str("<p>");
    out.push_str(&escape_html(&text));
    out.push_str("</p>\n");
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
