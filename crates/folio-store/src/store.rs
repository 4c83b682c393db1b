//! The content store
//!
//! [`ContentStore`] ties the resolver, codec, renderer and schema gate into
//! the read and write paths. All request context is passed explicitly.

use crate::competition::{split_registration, CompetitionRecord, RegistrationSplit};
use crate::config::EngineConfig;
use crate::document::{DocumentPatch, DocumentRecord, NewDocument, Record};
use crate::error::{StoreError, StoreResult};
use crate::listing::{arrange, ListQuery, Listing};
use crate::resolver::PathResolver;
use crate::scanner;
use crate::writer::{write_atomic, PathLocks};
use folio_codec::frontmatter::{self, ID_KEY};
use folio_codec::{merge_metadata, Metadata, RenderOptions, Renderer};
use folio_content::{ContentPath, DocumentId, FileTarget, Lang, PageInfo, INDEX_STEM, MARKDOWN_EXT};
use folio_schema::{ContentSchema, Schema, SchemaCatalog, SchemaError, SchemaGate, Vertical};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Markdown-as-database content store
#[derive(Debug)]
pub struct ContentStore {
    config: EngineConfig,
    resolver: PathResolver,
    renderer: Renderer,
    gate: SchemaGate,
    catalog: SchemaCatalog,
    locks: PathLocks,
}

impl ContentStore {
    /// Build a store from configuration
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] for an invalid configuration and
    /// [`StoreError::Catalog`] if the vertical schemas fail to compile.
    pub fn new(config: EngineConfig) -> StoreResult<Self> {
        config.validate()?;
        let catalog = SchemaCatalog::new().map_err(StoreError::Catalog)?;
        let renderer = Renderer::with_options(
            RenderOptions::new(config.assets.clone()).with_raw_html(config.allow_raw_html),
        );
        tracing::info!(root = %config.content_dir.display(), "content store ready");
        Ok(Self {
            resolver: PathResolver::new(&config.content_dir),
            gate: SchemaGate::new(config.assets.clone()),
            renderer,
            catalog,
            locks: PathLocks::new(),
            config,
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compiled vertical schemas
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Schemas of one vertical
    #[inline]
    #[must_use]
    pub fn schema(&self, vertical: Vertical) -> &ContentSchema {
        self.catalog.get(vertical)
    }

    /// Markdown renderer
    #[inline]
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Path resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Resolve a request URL to a document or directory
    ///
    /// # Errors
    /// See [`PathResolver::resolve`].
    pub async fn resolve_path(
        &self,
        lang: Lang,
        url: &str,
        has_route_params: bool,
    ) -> StoreResult<FileTarget> {
        self.resolver.resolve(lang, url, has_route_params).await
    }

    /// Target of a document that may not exist yet
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidPath`] if `slug` is not a plain name.
    pub fn target_for(&self, lang: Lang, section: &ContentPath, slug: &str) -> StoreResult<FileTarget> {
        self.resolver.target_for(lang, section, slug)
    }

    /// Read, validate, qualify and render a document
    ///
    /// # Errors
    /// Fails if the file is missing or too large, the front matter does not
    /// decode, the record fails the document schema, or rendering fails.
    pub async fn read_document(
        &self,
        target: &FileTarget,
        schema: &ContentSchema,
    ) -> StoreResult<DocumentRecord> {
        let path = document_path(target)?;
        let raw = self.load(path).await?;
        let decoded = frontmatter::decode(&raw);
        let metadata = with_id(path, parse_block(path, &decoded)?);
        let metadata = self
            .gate
            .read(&schema.document, metadata)
            .map_err(|e| StoreError::schema(path, e))?;
        let content = self.render(path, decoded.body)?;
        Ok(DocumentRecord { metadata, content })
    }

    /// Read a document's metadata through a schema, skipping the body
    ///
    /// # Errors
    /// Fails if the file cannot be read, its front matter does not decode,
    /// or the record fails `schema`.
    pub async fn read_metadata(&self, path: &Path, schema: &Schema) -> StoreResult<Record> {
        let raw = self.load(path).await?;
        let metadata = frontmatter::decode_metadata(&raw).map_err(|e| StoreError::codec(path, e))?;
        self.gate
            .read(schema, with_id(path, metadata))
            .map_err(|e| StoreError::schema(path, e))
    }

    /// Every document below `dir`, section indexes excluded
    ///
    /// A missing directory yields an empty list.
    ///
    /// # Errors
    /// Returns [`StoreError::Task`] only if the scan task panics.
    pub async fn scan_collection(&self, dir: &Path) -> StoreResult<Vec<FileTarget>> {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || scanner::scan(&dir))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))
    }

    /// Create a new document
    ///
    /// # Errors
    /// - [`StoreError::Conflict`] if the file exists
    /// - [`StoreError::Schema`] if the metadata fails the document schema or
    ///   a required body is empty
    /// - [`StoreError::Io`] if the write fails
    pub async fn create_document(
        &self,
        target: &FileTarget,
        schema: &ContentSchema,
        document: NewDocument,
    ) -> StoreResult<()> {
        let path = document_path(target)?;
        let guard = self.locks.lock(path).await;
        let result = self.create_locked(path, schema, document).await;
        drop(guard);
        self.locks.release(path);
        result
    }

    async fn create_locked(
        &self,
        path: &Path,
        schema: &ContentSchema,
        document: NewDocument,
    ) -> StoreResult<()> {
        if exists(path).await {
            return Err(StoreError::Conflict(path.to_path_buf()));
        }
        check_body(path, schema, &document.body)?;
        let record = self
            .gate
            .write(&schema.document, document.stamped_metadata())
            .map_err(|e| StoreError::schema(path, e))?;
        let text = frontmatter::encode(&record, &document.body)
            .map_err(|e| StoreError::codec(path, e))?;
        write_atomic(path, &text).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "create failed");
            e
        })?;
        tracing::info!(path = %path.display(), vertical = %schema.vertical, "document created");
        Ok(())
    }

    /// Apply a partial update
    ///
    /// Metadata in the patch is checked against the patch schema, merged over
    /// the stored block and the result checked against the document schema.
    /// Undeclared stored keys survive. Untouched parts keep their bytes.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if the file is missing
    /// - [`StoreError::Codec`] if the stored file has no front matter
    /// - [`StoreError::Schema`] if the patch or merged record is invalid
    /// - [`StoreError::Io`] if the write fails
    pub async fn update_document(
        &self,
        target: &FileTarget,
        schema: &ContentSchema,
        patch: DocumentPatch,
    ) -> StoreResult<()> {
        let path = document_path(target)?;
        let guard = self.locks.lock(path).await;
        let result = self.update_locked(path, schema, patch).await;
        drop(guard);
        self.locks.release(path);
        result
    }

    async fn update_locked(
        &self,
        path: &Path,
        schema: &ContentSchema,
        patch: DocumentPatch,
    ) -> StoreResult<()> {
        let raw = self.load(path).await?;
        if patch.is_empty() {
            tracing::debug!(path = %path.display(), "empty patch, nothing to write");
            return Ok(());
        }

        let mut text = raw.clone();
        if let Some(changes) = patch.metadata {
            let mut changes = self
                .gate
                .write(&schema.patch, changes)
                .map_err(|e| StoreError::schema(path, e))?;
            changes.shift_remove(ID_KEY);
            let current = frontmatter::require_metadata(&raw).map_err(|e| StoreError::codec(path, e))?;
            let merged = self
                .gate
                .write_preserving(&schema.document, merge_metadata(current, changes))
                .map_err(|e| StoreError::schema(path, e))?;
            text = frontmatter::replace_metadata(&text, &merged).map_err(|e| StoreError::codec(path, e))?;
        }
        if let Some(body) = patch.body {
            check_body(path, schema, &body)?;
            text = frontmatter::replace_body(&text, &body).map_err(|e| StoreError::codec(path, e))?;
        }

        write_atomic(path, &text).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "update failed");
            e
        })?;
        tracing::info!(path = %path.display(), vertical = %schema.vertical, "document updated");
        Ok(())
    }

    /// Remove a document, returning its card
    ///
    /// A stored record that no longer fits the card schema is returned as
    /// decoded, so broken files can still be removed.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if the file is missing and
    /// [`StoreError::Io`] if removal fails.
    pub async fn delete_document(
        &self,
        target: &FileTarget,
        schema: &ContentSchema,
    ) -> StoreResult<Record> {
        let path = document_path(target)?;
        let guard = self.locks.lock(path).await;
        let result = self.delete_locked(path, schema).await;
        drop(guard);
        self.locks.release(path);
        result
    }

    async fn delete_locked(&self, path: &Path, schema: &ContentSchema) -> StoreResult<Record> {
        let raw = self.load(path).await?;
        let metadata = with_id(path, frontmatter::decode_metadata(&raw).unwrap_or_default());
        let card = match self.gate.read(&schema.card, metadata.clone()) {
            Ok(card) => card,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "deleting document with invalid card");
                metadata
            }
        };
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| StoreError::io_error(path, e))?;
        tracing::info!(path = %path.display(), vertical = %schema.vertical, "document deleted");
        Ok(card)
    }

    /// Header info from a directory's `_index.md`
    ///
    /// A directory without an index gets an empty header.
    ///
    /// # Errors
    /// Fails if the index exists but does not decode or validate.
    pub async fn read_section_info(&self, dir: &Path) -> StoreResult<PageInfo> {
        let index = index_path(dir);
        if !exists(&index).await {
            return Ok(PageInfo::default());
        }
        let record = self.read_metadata(&index, self.catalog.section()).await?;
        serde_json::from_value(Value::Object(record)).map_err(|e| {
            StoreError::schema(&index, SchemaError::invalid(self.catalog.section().name(), e.to_string()))
        })
    }

    /// A directory's `_index.md` read as a full document
    ///
    /// # Errors
    /// See [`ContentStore::read_document`].
    pub async fn read_section_document(
        &self,
        dir: &Path,
        schema: &ContentSchema,
    ) -> StoreResult<DocumentRecord> {
        self.read_document(&FileTarget::file(index_path(dir)), schema)
            .await
    }

    /// Cards of a collection, filtered, ordered and paged for a vertical
    ///
    /// # Errors
    /// Fails if the target is not a directory or any card fails its schema.
    pub async fn list_collection(
        &self,
        target: &FileTarget,
        vertical: Vertical,
        query: ListQuery,
    ) -> StoreResult<Listing> {
        if !target.is_dir {
            return Err(StoreError::Invalid(format!(
                "{} is not a collection",
                target.path().display()
            )));
        }
        let schema = self.catalog.get(vertical);
        let targets = self.scan_collection(target.path()).await?;
        let mut cards = Vec::with_capacity(targets.len());
        for doc in &targets {
            cards.push(self.read_metadata(doc.path(), &schema.card).await?);
        }

        let page = arrange(cards, vertical.listing(), query, self.config.page_size);
        let mut header = self.read_section_info(target.path()).await?;
        if header.title.is_none() {
            header = header.with_title(vertical.label());
        }
        tracing::debug!(
            dir = %target.path().display(),
            %vertical,
            cards = page.data.len(),
            total_page = page.total_page,
            "listed collection"
        );
        Ok(Listing {
            data: page.data,
            total_page: page.total_page,
            header_page_info: header,
        })
    }

    /// Read a competition, splitting off its registration section
    ///
    /// Launched competitions are not split.
    ///
    /// # Errors
    /// Fails as [`ContentStore::read_document`], or with
    /// [`StoreError::Registration`] for more than two markers.
    pub async fn read_competition(&self, target: &FileTarget) -> StoreResult<CompetitionRecord> {
        let path = document_path(target)?;
        let schema = self.catalog.get(Vertical::Competition);
        let raw = self.load(path).await?;
        let decoded = frontmatter::decode(&raw);
        let metadata = self
            .gate
            .read(&schema.document, with_id(path, parse_block(path, &decoded)?))
            .map_err(|e| StoreError::schema(path, e))?;

        let launched = metadata.get("isLaunch").and_then(Value::as_bool).unwrap_or(false);
        let split = if launched {
            RegistrationSplit {
                content: decoded.body.to_string(),
                registration: String::new(),
            }
        } else {
            split_registration(decoded.body).map_err(|markers| StoreError::Registration {
                path: path.to_path_buf(),
                markers,
            })?
        };

        let content = self.render(path, &split.content)?;
        let registration = if split.registration.is_empty() {
            String::new()
        } else {
            self.render(path, &split.registration)?
        };
        Ok(CompetitionRecord {
            metadata,
            content,
            registration,
        })
    }

    fn render(&self, path: &Path, markdown: &str) -> StoreResult<String> {
        self.renderer
            .render(markdown)
            .map_err(|e| StoreError::render(path, e))
    }

    async fn load(&self, path: &Path) -> StoreResult<String> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| StoreError::io_error(path, e))?;
        if meta.is_dir() {
            return Err(StoreError::NotADocument(path.to_path_buf()));
        }
        if meta.len() > self.config.max_file_size {
            tracing::warn!(path = %path.display(), size = meta.len(), "document too large");
            return Err(StoreError::TooLarge {
                path: path.to_path_buf(),
                size: meta.len(),
                limit: self.config.max_file_size,
            });
        }
        tracing::debug!(path = %path.display(), "reading document");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::io_error(path, e))
    }
}

fn document_path(target: &FileTarget) -> StoreResult<&Path> {
    if target.is_dir {
        Err(StoreError::NotADocument(target.full_path.clone()))
    } else {
        Ok(target.path())
    }
}

fn index_path(dir: &Path) -> PathBuf {
    dir.join(format!("{INDEX_STEM}.{MARKDOWN_EXT}"))
}

fn parse_block(path: &Path, decoded: &frontmatter::Decoded<'_>) -> StoreResult<Metadata> {
    match &decoded.block {
        Some(block) => frontmatter::parse_metadata(block).map_err(|e| StoreError::codec(path, e)),
        None => Ok(Metadata::new()),
    }
}

fn with_id(path: &Path, mut metadata: Metadata) -> Metadata {
    if let Some(id) = DocumentId::from_path(path) {
        metadata.insert(ID_KEY.to_string(), Value::String(id.to_string()));
    }
    metadata
}

fn check_body(path: &Path, schema: &ContentSchema, body: &str) -> StoreResult<()> {
    if schema.body_required && body.trim().is_empty() {
        return Err(StoreError::schema(
            path,
            SchemaError::invalid(schema.document.name(), "content: must not be empty"),
        ));
    }
    Ok(())
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
