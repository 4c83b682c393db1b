//! Image rewrite stage

use super::{Node, RenderStage};
use crate::error::RenderError;
use folio_content::{AssetBase, MediaBase};

/// Inline style of the figure wrapped around standalone images
pub const FIGURE_STYLE: &str =
    "display: flex; flex-direction: column; align-items: center; justify-content: center";

const KEPT_ATTRS: [&str; 2] = ["class", "id"];
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "file:"];

/// Qualifies image sources and decides figure wrapping
#[derive(Debug, Clone)]
pub struct ImageStage {
    assets: AssetBase,
}

impl ImageStage {
    /// Stage qualifying against `assets`
    #[must_use]
    pub fn new(assets: AssetBase) -> Self {
        Self { assets }
    }
}

impl RenderStage for ImageStage {
    fn name(&self) -> &'static str {
        "image"
    }

    fn apply<'a>(&self, nodes: Vec<Node<'a>>) -> Result<Vec<Node<'a>>, RenderError> {
        Ok(nodes
            .into_iter()
            .map(|node| match node {
                Node::Image(mut image) => {
                    image.src = self.rewrite_src(&image.src);
                    let kept = std::mem::take(&mut image.attrs)
                        .into_iter()
                        .filter(|(k, _)| KEPT_ATTRS.iter().any(|a| k.eq_ignore_ascii_case(a)));
                    image.set_attr("loading", "lazy");
                    for (k, v) in kept {
                        image.set_attr(k, v);
                    }
                    image.wrap = !image.in_figure;
                    Node::Image(image)
                }
                other => other,
            })
            .collect())
    }
}

impl ImageStage {
    fn rewrite_src(&self, src: &str) -> String {
        let src = src.trim();
        let lower = src.to_ascii_lowercase();
        if BLOCKED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
            tracing::warn!(src, "dropping image source with blocked scheme");
            return String::new();
        }
        let src = src.strip_prefix("./").unwrap_or(src);
        self.assets.qualify(src, MediaBase::Static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ImageNode;

    fn stage() -> ImageStage {
        ImageStage::new(AssetBase::new("h", 1).with_prefix("p"))
    }

    fn rewrite(image: ImageNode) -> ImageNode {
        match stage().apply(vec![Node::Image(image)]).unwrap().remove(0) {
            Node::Image(image) => image,
            Node::Event(_) => unreachable!(),
        }
    }

    #[test]
    fn keeps_class_and_id_only() {
        let mut image = ImageNode::new("./a.png", "");
        image.set_attr("class", "c");
        image.set_attr("width", "10");
        image.set_attr("id", "i");
        let image = rewrite(image);
        assert_eq!(image.src, "http://h:1/p/static/a.png");
        assert_eq!(
            image.attrs,
            vec![
                ("loading".to_string(), "lazy".to_string()),
                ("class".to_string(), "c".to_string()),
                ("id".to_string(), "i".to_string()),
            ]
        );
        assert!(image.wrap);
    }

    #[test]
    fn figure_enclosed_images_are_not_wrapped() {
        let mut image = ImageNode::new("a.png", "");
        image.in_figure = true;
        assert!(!rewrite(image).wrap);
    }

    #[test]
    fn blocked_scheme_cleared() {
        assert_eq!(rewrite(ImageNode::new("JavaScript:x()", "")).src, "");
    }
}
