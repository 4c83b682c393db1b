//! Markdown renderer
//!
//! A fixed pipeline built once and reused for every document:
//!
//! ```text
//! markdown → parse → RawHtmlStage → ImageStage → AttributeStage → serialize → HTML
//! ```
//!
//! Stages work on [`Node`]s: plain pulldown-cmark events plus lifted
//! [`ImageNode`]s, so image rewriting does not depend on where an image
//! came from (markdown syntax or a raw `<img>` tag).

mod attrs;
mod html;
mod image;
mod parse;
mod raw;

pub use attrs::AttributeStage;
pub use image::{ImageStage, FIGURE_STYLE};
pub use raw::RawHtmlStage;

use crate::error::RenderError;
use folio_content::AssetBase;
use pulldown_cmark::{Event, Options};

/// Element flowing through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    /// Any markdown event that needs no rewriting
    Event(Event<'a>),
    /// An image, from markdown or raw HTML
    Image(ImageNode),
}

/// An image element with its attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageNode {
    /// Source reference
    pub src: String,
    /// Alternative text
    pub alt: String,
    /// Title attribute
    pub title: String,
    /// Remaining attributes, in output order
    pub attrs: Vec<(String, String)>,
    /// Whether a `<figure>` already encloses the image
    pub in_figure: bool,
    /// Whether serialization wraps the image in a figure
    pub wrap: bool,
}

impl ImageNode {
    /// Image with source and title
    #[must_use]
    pub fn new(src: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Value of an attribute
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }
}

/// A step of the render pipeline
pub trait RenderStage: Send + Sync {
    /// Stage name for logs and errors
    fn name(&self) -> &'static str;

    /// Transform the node stream
    ///
    /// # Errors
    /// Returns [`RenderError`] when the input cannot be transformed; the
    /// whole render fails with it.
    fn apply<'a>(&self, nodes: Vec<Node<'a>>) -> Result<Vec<Node<'a>>, RenderError>;
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Static server images are qualified against
    pub assets: AssetBase,
    /// Pass raw HTML through; when false it is escaped as text
    pub allow_raw_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            assets: AssetBase::default(),
            allow_raw_html: true,
        }
    }
}

impl RenderOptions {
    /// Options for an asset base
    #[must_use]
    pub fn new(assets: AssetBase) -> Self {
        Self {
            assets,
            ..Self::default()
        }
    }

    /// Set raw HTML handling
    #[must_use]
    pub fn with_raw_html(mut self, allow: bool) -> Self {
        self.allow_raw_html = allow;
        self
    }
}

/// Markdown to HTML renderer
pub struct Renderer {
    options: RenderOptions,
    markdown: Options,
    stages: Vec<Box<dyn RenderStage>>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options)
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::with_options(RenderOptions::default())
    }
}

impl Renderer {
    /// Renderer with the default pipeline for an asset base
    #[must_use]
    pub fn new(assets: AssetBase) -> Self {
        Self::with_options(RenderOptions::new(assets))
    }

    /// Renderer with the default pipeline
    #[must_use]
    pub fn with_options(options: RenderOptions) -> Self {
        let stages: Vec<Box<dyn RenderStage>> = vec![
            Box::new(RawHtmlStage),
            Box::new(ImageStage::new(options.assets.clone())),
            Box::new(AttributeStage),
        ];
        Self {
            options,
            markdown: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_HEADING_ATTRIBUTES,
            stages,
        }
    }

    /// Append a stage after the default ones
    #[must_use]
    pub fn with_stage(mut self, stage: impl RenderStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Renderer options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render markdown to HTML
    ///
    /// # Errors
    /// Returns the first [`RenderError`] raised by a stage. No partial output
    /// is produced.
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let mut nodes = parse::parse(markdown, self.markdown, self.options.allow_raw_html);
        for stage in &self.stages {
            nodes = stage.apply(nodes).map_err(|e| {
                tracing::error!(stage = stage.name(), error = %e, "render stage failed");
                e
            })?;
        }
        Ok(html::serialize(nodes))
    }
}
