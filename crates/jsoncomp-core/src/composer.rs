//! Fixpoint composer
//!
//! Each pass scans the scope for markers and hands every marker to its
//! handler, innermost first. Resolved markers are swapped for their value in
//! place; deferred ones wait for the next pass. Composition succeeds once a
//! scan finds no marker and fails with [`ComposeError::NonConvergence`] as
//! soon as a whole pass resolves nothing.
//!
//! The caller's document is only replaced when composition succeeds.

use crate::cache::FileCache;
use crate::config::{resolve_path, ComposerConfig};
use crate::error::{ComposeError, ComposeResult, Unresolved};
use crate::handlers::{self, HandlerContext, Resolution};
use crate::marker::{node_kind, Marker, MarkerKind};
use jsoncomp_document::{loader, Document, DocumentError, Format, Node, NodeId, Pointer, Value};
use jsoncomp_registry::{GenerationSession, GeneratorRegistry, MatcherRegistry};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Statistics of one composition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeReport {
    /// Resolution passes, nested compositions included
    pub passes: usize,
    /// Markers resolved per kind
    pub resolved: BTreeMap<MarkerKind, usize>,
    /// Handler attempts that deferred
    pub deferrals: usize,
    /// Files answered from the file cache
    pub file_cache_hits: u64,
    /// Generator calls answered from the identity cache
    pub generator_cache_hits: usize,
    /// Includes composed as independent documents
    pub nested: usize,
}

impl ComposeReport {
    /// Markers of `kind` resolved
    #[inline]
    #[must_use]
    pub fn resolved(&self, kind: MarkerKind) -> usize {
        self.resolved.get(&kind).copied().unwrap_or(0)
    }

    /// Markers resolved in total
    #[must_use]
    pub fn total_resolved(&self) -> usize {
        self.resolved.values().sum()
    }
}

/// Document composer
///
/// Holds configuration, the registries handlers delegate to and the shared
/// file cache. Registries are not modified while composing; clones share
/// them along with the cache.
#[derive(Debug, Clone)]
pub struct Composer {
    config: ComposerConfig,
    generators: Arc<GeneratorRegistry>,
    matchers: Arc<MatcherRegistry>,
    files: Option<FileCache>,
}

impl Composer {
    /// Create composer with the built-in generators and matchers
    #[must_use]
    pub fn new(config: ComposerConfig) -> Self {
        let files = config
            .cache_files
            .then(|| FileCache::new(config.file_cache_capacity));
        Self {
            config,
            generators: Arc::new(GeneratorRegistry::with_defaults()),
            matchers: Arc::new(MatcherRegistry::with_defaults()),
            files,
        }
    }

    /// With generator registry
    #[inline]
    #[must_use]
    pub fn with_generators(mut self, generators: impl Into<Arc<GeneratorRegistry>>) -> Self {
        self.generators = generators.into();
        self
    }

    /// With matcher registry
    #[inline]
    #[must_use]
    pub fn with_matchers(mut self, matchers: impl Into<Arc<MatcherRegistry>>) -> Self {
        self.matchers = matchers.into();
        self
    }

    /// With a file cache shared with other composers
    #[inline]
    #[must_use]
    pub fn with_file_cache(mut self, cache: FileCache) -> Self {
        self.files = Some(cache);
        self
    }

    /// Read every file from disk
    #[inline]
    #[must_use]
    pub fn without_file_cache(mut self) -> Self {
        self.files = None;
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Generator registry
    #[inline]
    #[must_use]
    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    /// Matcher registry
    #[inline]
    #[must_use]
    pub fn matchers(&self) -> &MatcherRegistry {
        &self.matchers
    }

    /// File cache, if enabled
    #[inline]
    #[must_use]
    pub fn file_cache(&self) -> Option<&FileCache> {
        self.files.as_ref()
    }

    /// New generation session seeded from the configuration
    #[must_use]
    pub fn session(&self) -> GenerationSession {
        GenerationSession::new(self.config.seed)
    }

    /// Compose a value in a fresh session
    ///
    /// # Errors
    /// Any [`ComposeError`]; nothing is returned half-resolved
    pub fn compose(&self, value: Value) -> ComposeResult<Value> {
        let mut session = self.session();
        self.compose_with_session(value, &mut session)
    }

    /// Compose a value and report statistics
    ///
    /// # Errors
    /// Same as [`Composer::compose`]
    pub fn compose_with_report(&self, value: Value) -> ComposeResult<(Value, ComposeReport)> {
        let mut session = self.session();
        let mut document = Document::new(value);
        let report = self.compose_document(&mut document, &mut session)?;
        Ok((document.into_value(), report))
    }

    /// Compose a value in an existing session
    ///
    /// Tagged generator values are shared with everything else composed in
    /// the same session. A failed composition leaves `session` as it was.
    ///
    /// # Errors
    /// Same as [`Composer::compose`]
    pub fn compose_with_session(
        &self,
        value: Value,
        session: &mut GenerationSession,
    ) -> ComposeResult<Value> {
        let mut document = Document::new(value);
        self.compose_document(&mut document, session)?;
        Ok(document.into_value())
    }

    /// Compose a whole document in place and remove its scratch namespace
    ///
    /// # Errors
    /// Same as [`Composer::compose`]; `document` and `session` are unchanged
    /// on error
    pub fn compose_document(
        &self,
        document: &mut Document,
        session: &mut GenerationSession,
    ) -> ComposeResult<ComposeReport> {
        let base_dir = self.config.resolved_base_dir();
        self.compose_scope(document, &Pointer::root(), &base_dir, session)
    }

    /// Compose only the subtree at `pointer`
    ///
    /// Markers outside the subtree are left alone, so references to them
    /// stall. The scratch namespace is removed only for the root pointer.
    ///
    /// # Errors
    /// - [`ComposeError::Document`] if `pointer` does not resolve
    /// - otherwise same as [`Composer::compose`]; `document` and `session` are
    ///   unchanged on error
    pub fn compose_at(
        &self,
        document: &mut Document,
        pointer: &Pointer,
        session: &mut GenerationSession,
    ) -> ComposeResult<ComposeReport> {
        let base_dir = self.config.resolved_base_dir();
        self.compose_scope(document, pointer, &base_dir, session)
    }

    /// Load and compose a JSON, YAML or text file
    ///
    /// Relative paths inside the file resolve against its directory.
    ///
    /// # Errors
    /// - [`ComposeError::Load`] if the file cannot be read
    /// - otherwise same as [`Composer::compose`]
    pub fn compose_file(&self, path: impl AsRef<Path>) -> ComposeResult<Value> {
        let path = resolve_path(
            &self.config.resolved_base_dir(),
            &path.as_ref().to_string_lossy(),
        );
        let mut document = Document::new(loader::read_file_auto(&path)?);
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut session = self.session();
        self.compose_scope(&mut document, &Pointer::root(), base_dir, &mut session)?;
        Ok(document.into_value())
    }

    /// Parse and compose inline content
    ///
    /// # Errors
    /// - [`ComposeError::Load`] if the content does not parse
    /// - otherwise same as [`Composer::compose`]
    pub fn compose_str(&self, content: &str, format: Format) -> ComposeResult<Value> {
        self.compose(loader::parse_str(content, format)?)
    }

    /// Compose included content as an independent document
    pub(crate) fn compose_nested(
        &self,
        value: Value,
        base_dir: &Path,
        depth: usize,
        session: &mut GenerationSession,
        report: &mut ComposeReport,
    ) -> ComposeResult<Value> {
        let mut document = Document::new(value);
        self.resolve(&mut document, &Pointer::root(), base_dir, depth, session, report)?;
        self.remove_defs(&mut document)?;
        report.nested += 1;
        Ok(document.into_value())
    }

    fn compose_scope(
        &self,
        document: &mut Document,
        scope: &Pointer,
        base_dir: &Path,
        session: &mut GenerationSession,
    ) -> ComposeResult<ComposeReport> {
        self.config.validate()?;
        let mut working = document.clone();
        let mut report = ComposeReport::default();
        let hits_before = session.cache_hits();
        let checkpoint = session.clone();

        let outcome = self
            .resolve(&mut working, scope, base_dir, 0, session, &mut report)
            .and_then(|()| {
                if scope.is_root() {
                    self.remove_defs(&mut working)
                } else {
                    Ok(())
                }
            });
        if let Err(e) = outcome {
            *session = checkpoint;
            return Err(e);
        }

        report.generator_cache_hits = session.cache_hits().saturating_sub(hits_before);
        *document = working;
        tracing::info!(
            scope = %scope,
            passes = report.passes,
            resolved = report.total_resolved(),
            "composition complete"
        );
        Ok(report)
    }

    /// Run passes over `scope` until no marker is left
    fn resolve(
        &self,
        document: &mut Document,
        scope: &Pointer,
        base_dir: &Path,
        depth: usize,
        session: &mut GenerationSession,
        report: &mut ComposeReport,
    ) -> ComposeResult<()> {
        let mut passes = 0;
        loop {
            let pending = scan(document, scope)?;
            if pending.is_empty() {
                return Ok(());
            }
            passes += 1;
            if passes > self.config.max_passes {
                return Err(ComposeError::PassLimit {
                    limit: self.config.max_passes,
                });
            }
            report.passes += 1;
            tracing::debug!(pass = passes, depth, pending = pending.len(), "composition pass");

            let mut resolved = 0;
            let mut unresolved = Vec::new();
            // Reverse pre-order: markers nested in another marker go first.
            for (pointer, id, kind) in pending.into_iter().rev() {
                if node_kind(document, id) != Some(kind) {
                    continue;
                }
                let value = document.value_of(id).ok_or(DocumentError::StaleNode(id))?;
                let marker = Marker::new(kind, pointer.clone(), value)?;
                let outcome = {
                    let mut ctx = HandlerContext {
                        composer: self,
                        document: &*document,
                        base_dir,
                        depth,
                        session: &mut *session,
                        report: &mut *report,
                    };
                    handlers::resolve(&marker, &mut ctx).map_err(|e| e.at(&pointer))?
                };

                match outcome {
                    Resolution::Resolved(value) => {
                        tracing::trace!(pointer = %pointer, %kind, "resolved marker");
                        document.replace(id, value)?;
                        *report.resolved.entry(kind).or_default() += 1;
                        resolved += 1;
                    }
                    Resolution::Deferred(reason) => {
                        tracing::trace!(pointer = %pointer, %kind, %reason, "deferred marker");
                        report.deferrals += 1;
                        unresolved.push(Unresolved {
                            pointer,
                            kind,
                            reason,
                        });
                    }
                }
            }

            if resolved == 0 {
                unresolved.reverse();
                tracing::warn!(
                    depth,
                    unresolved = unresolved.len(),
                    "composition stalled"
                );
                return Err(ComposeError::NonConvergence { unresolved });
            }
        }
    }

    fn remove_defs(&self, document: &mut Document) -> ComposeResult<()> {
        let defs = Pointer::root().child(self.config.defs_key.as_str());
        let is_mapping = matches!(document.node(document.root()), Some(Node::Mapping(_)));
        if is_mapping && document.contains(&defs) {
            document.delete(&defs)?;
        }
        Ok(())
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

/// Markers under `scope` in pre-order
fn scan(
    document: &Document,
    scope: &Pointer,
) -> ComposeResult<Vec<(Pointer, NodeId, MarkerKind)>> {
    let start = document.node_id(scope)?;
    let mut found = Vec::new();
    for (pointer, id) in document.walk_from(start, scope) {
        let Some(Node::Mapping(map)) = document.node(id) else {
            continue;
        };
        match MarkerKind::detect(map.keys().map(String::as_str)) {
            Ok(Some(kind)) => found.push((pointer, id, kind)),
            Ok(None) => {}
            Err(reason) => return Err(ComposeError::malformed(&pointer, reason)),
        }
    }
    Ok(found)
}
