//! Markdown → node stream

use super::{ImageNode, Node};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Parse markdown, collapsing each image's events into one [`ImageNode`]
pub(super) fn parse(markdown: &str, options: Options, allow_raw_html: bool) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut image: Option<ImageNode> = None;
    let mut nested = 0usize;

    for event in Parser::new_ext(markdown, options) {
        if let Some(current) = image.as_mut() {
            match event {
                Event::Start(Tag::Image { .. }) => nested += 1,
                Event::End(TagEnd::Image) if nested > 0 => nested -= 1,
                Event::End(TagEnd::Image) => {
                    if let Some(done) = image.take() {
                        nodes.push(Node::Image(done));
                    }
                }
                Event::Text(text) | Event::Code(text) => current.alt.push_str(&text),
                Event::SoftBreak | Event::HardBreak => current.alt.push(' '),
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::Image {
                dest_url, title, id, ..
            }) => {
                let mut node = ImageNode::new(dest_url.into_string(), title.into_string());
                if !id.is_empty() {
                    node.set_attr("id", id.into_string());
                }
                image = Some(node);
            }
            Event::Html(html) | Event::InlineHtml(html) if !allow_raw_html => {
                nodes.push(Node::Event(Event::Text(html)));
            }
            other => nodes.push(Node::Event(other)),
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_events_collapse() {
        let nodes = parse("![some *alt* text](a.png \"T\")", Options::empty(), true);
        let image = nodes
            .iter()
            .find_map(|n| match n {
                Node::Image(img) => Some(img),
                Node::Event(_) => None,
            })
            .unwrap();
        assert_eq!(image.src, "a.png");
        assert_eq!(image.alt, "some alt text");
        assert_eq!(image.title, "T");
    }

    #[test]
    fn heading_attributes_survive() {
        let nodes = parse("# Title {#top}", Options::ENABLE_HEADING_ATTRIBUTES, true);
        assert!(nodes.iter().any(|n| matches!(
            n,
            Node::Event(Event::Start(Tag::Heading { id: Some(id), .. })) if id.to_string() == "top"
        )));
    }
}
