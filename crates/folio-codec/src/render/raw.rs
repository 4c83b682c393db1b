//! Raw HTML merge stage
//!
//! Lifts `<img>` tags out of raw HTML into [`ImageNode`]s and marks every
//! image with whether a `<figure>` is open around it.

use super::{ImageNode, Node, RenderStage};
use crate::error::RenderError;
use once_cell::sync::Lazy;
use pulldown_cmark::{CowStr, Event};
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<img\b[^>]*>|<figure\b[^>]*>|</figure\s*>").expect("tag pattern is valid")
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

/// Merges raw HTML into the node stream
#[derive(Debug, Clone, Copy, Default)]
pub struct RawHtmlStage;

impl RenderStage for RawHtmlStage {
    fn name(&self) -> &'static str {
        "raw-html"
    }

    fn apply<'a>(&self, nodes: Vec<Node<'a>>) -> Result<Vec<Node<'a>>, RenderError> {
        let mut out = Vec::with_capacity(nodes.len());
        let mut figure_depth = 0usize;

        for node in coalesce_blocks(nodes) {
            match node {
                Node::Image(mut image) => {
                    image.in_figure = figure_depth > 0;
                    out.push(Node::Image(image));
                }
                Node::Event(Event::Html(html)) => {
                    split_html(&html, false, &mut figure_depth, &mut out);
                }
                Node::Event(Event::InlineHtml(html)) => {
                    split_html(&html, true, &mut figure_depth, &mut out);
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

/// Join consecutive block HTML lines so tags spanning lines stay whole
fn coalesce_blocks(nodes: Vec<Node<'_>>) -> Vec<Node<'_>> {
    let mut out: Vec<Node<'_>> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let Node::Event(Event::Html(next)) = &node {
            if let Some(Node::Event(Event::Html(prev))) = out.last_mut() {
                let joined = format!("{prev}{next}");
                *prev = CowStr::from(joined);
                continue;
            }
        }
        out.push(node);
    }
    out
}

fn split_html<'a>(html: &str, inline: bool, figure_depth: &mut usize, out: &mut Vec<Node<'a>>) {
    let push_text = |out: &mut Vec<Node<'a>>, text: &str| {
        if text.is_empty() {
            return;
        }
        let text = CowStr::from(text.to_string());
        out.push(Node::Event(if inline {
            Event::InlineHtml(text)
        } else {
            Event::Html(text)
        }));
    };

    let mut last = 0;
    for found in TAG_RE.find_iter(html) {
        let tag = found.as_str();
        let lower = tag.get(..4).unwrap_or(tag).to_ascii_lowercase();
        if lower.starts_with("<img") {
            push_text(out, &html[last..found.start()]);
            let mut image = parse_img_tag(tag);
            image.in_figure = *figure_depth > 0;
            out.push(Node::Image(image));
            last = found.end();
        } else if lower.starts_with("</") {
            *figure_depth = figure_depth.saturating_sub(1);
        } else {
            *figure_depth += 1;
        }
    }
    push_text(out, &html[last..]);
}

fn parse_img_tag(tag: &str) -> ImageNode {
    let inner = tag
        .get(4..tag.len().saturating_sub(1))
        .unwrap_or_default()
        .trim_end_matches('/');
    let mut image = ImageNode::default();
    for cap in ATTR_RE.captures_iter(inner) {
        let name = cap[1].to_ascii_lowercase();
        let value = cap
            .get(2)
            .or_else(|| cap.get(3))
            .or_else(|| cap.get(4))
            .map_or_else(String::new, |m| unescape(m.as_str()));
        match name.as_str() {
            "src" => image.src = value,
            "alt" => image.alt = value,
            "title" => image.title = value,
            _ => image.set_attr(name, value),
        }
    }
    image
}

fn unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn html(s: &'static str) -> Node<'static> {
        Node::Event(Event::Html(CowStr::Borrowed(s)))
    }

    #[test]
    fn img_tag_lifted_with_attributes() {
        let out = RawHtmlStage
            .apply(vec![html("<p><img src='a.png' alt=\"A &amp; B\" class=x /></p>")])
            .unwrap();
        assert_eq!(out.len(), 3);
        let Node::Image(image) = &out[1] else {
            panic!("expected image node");
        };
        assert_eq!(image.src, "a.png");
        assert_eq!(image.alt, "A & B");
        assert_eq!(image.attr("class"), Some("x"));
        assert!(!image.in_figure);
    }

    #[test]
    fn figure_depth_spans_events() {
        let out = RawHtmlStage
            .apply(vec![
                html("<figure>\n"),
                Node::Event(Event::Start(pulldown_cmark::Tag::Paragraph)),
                Node::Image(ImageNode::new("x.png", "")),
                Node::Event(Event::End(pulldown_cmark::TagEnd::Paragraph)),
                html("</figure>\n"),
                Node::Image(ImageNode::new("y.png", "")),
            ])
            .unwrap();
        let flags: Vec<bool> = out
            .iter()
            .filter_map(|n| match n {
                Node::Image(img) => Some(img.in_figure),
                Node::Event(_) => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn consecutive_block_lines_are_joined() {
        let out = RawHtmlStage
            .apply(vec![html("<img\n"), html("src=\"multi.png\">\n")])
            .unwrap();
        assert!(matches!(&out[0], Node::Image(img) if img.src == "multi.png"));
    }
}
