//! Attribute comment stage
//!
//! `![a](p.png)<!--rehype:class=wide&style=width: 50%-->` attaches
//! `class` and `style` to the image the comment follows.

use super::{Node, RenderStage};
use crate::error::RenderError;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, TagEnd};
use regex::Regex;

const COMMENT_PREFIX: &str = "<!--rehype:";
const COMMENT_SUFFIX: &str = "-->";

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_:][-A-Za-z0-9_:.]*$").expect("name pattern is valid"));

/// Merges attribute comments into the preceding image
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeStage;

impl RenderStage for AttributeStage {
    fn name(&self) -> &'static str {
        "attributes"
    }

    fn apply<'a>(&self, nodes: Vec<Node<'a>>) -> Result<Vec<Node<'a>>, RenderError> {
        let mut out: Vec<Node<'a>> = Vec::with_capacity(nodes.len());
        let mut target: Option<usize> = None;

        for node in nodes {
            if let Node::Event(Event::Html(html) | Event::InlineHtml(html)) = &node {
                if let Some(spec) = comment_body(html) {
                    let attrs = parse_spec(html, spec)?;
                    if let Some(Node::Image(image)) = target.and_then(|i| out.get_mut(i)) {
                        for (name, value) in attrs {
                            image.set_attr(name, value);
                        }
                        continue;
                    }
                    target = None;
                    out.push(node);
                    continue;
                }
            }

            if !is_gap(&node) {
                target = matches!(node, Node::Image(_)).then_some(out.len());
            }
            out.push(node);
        }
        Ok(out)
    }
}

/// Nodes allowed between an image and its attribute comment
fn is_gap(node: &Node<'_>) -> bool {
    match node {
        Node::Event(Event::SoftBreak | Event::HardBreak | Event::End(TagEnd::Paragraph)) => true,
        Node::Event(Event::Text(text)) => text.trim().is_empty(),
        _ => false,
    }
}

fn comment_body(html: &str) -> Option<&str> {
    html.trim()
        .strip_prefix(COMMENT_PREFIX)?
        .strip_suffix(COMMENT_SUFFIX)
}

fn parse_spec(comment: &str, spec: &str) -> Result<Vec<(String, String)>, RenderError> {
    let mut attrs = Vec::new();
    for pair in spec.split('&').filter(|p| !p.trim().is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| RenderError::attribute(comment.trim(), format!("'{pair}' has no '='")))?;
        let name = name.trim();
        if !NAME_RE.is_match(name) {
            return Err(RenderError::attribute(
                comment.trim(),
                format!("invalid attribute name '{name}'"),
            ));
        }
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("on") || lower == "src" {
            tracing::warn!(attribute = name, "ignoring unsafe attribute in comment");
            continue;
        }
        attrs.push((name.to_string(), value.trim().to_string()));
    }
    Ok(attrs)
}
