//! Node stream → HTML string

use super::{ImageNode, Node, FIGURE_STYLE};
use pulldown_cmark::{html, CowStr, Event};
use std::fmt::Write;

pub(super) fn serialize(nodes: Vec<Node<'_>>) -> String {
    let mut out = String::new();
    let events = nodes.into_iter().map(|node| match node {
        Node::Event(event) => event,
        Node::Image(image) => Event::InlineHtml(CowStr::from(image_html(&image))),
    });
    html::push_html(&mut out, events);
    out
}

fn image_html(image: &ImageNode) -> String {
    let mut tag = format!("<img src=\"{}\"", escape_attr(&image.src));
    if !image.alt.is_empty() {
        let _ = write!(tag, " alt=\"{}\"", escape_attr(&image.alt));
    }
    if !image.title.is_empty() {
        let _ = write!(tag, " title=\"{}\"", escape_attr(&image.title));
    }
    for (name, value) in &image.attrs {
        let _ = write!(tag, " {name}=\"{}\"", escape_attr(value));
    }
    tag.push('>');

    if image.wrap {
        format!("<figure class=\"w-100\" style=\"{FIGURE_STYLE}\">{tag}</figure>")
    } else {
        tag
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
