//! Document lifecycle controller.
//!
//! # Responsibility
//! - Drive open/show/save/close over the codec, the registries and the
//!   control host.
//! - Translate control-host events into lifecycle transitions and
//!   active-selection updates.
//!
//! # Invariants
//! - The uri is assigned exactly once, at open time; `save` never
//!   reassigns it regardless of the target path.
//! - Codec failures (`MalformedInput`, `Io`) propagate to the caller
//!   unchanged; nothing is registered on a failed open.
//! - Deactivation alone never changes the active selection; only the
//!   next activation does.

use crate::codec::{CodecError, TreeCodec};
use crate::facet::context::{ContextFacet, ControlMetadata, VisualControl};
use crate::facet::document::{DocumentFacet, LifecycleState};
use crate::facet::map::FacetError;
use crate::facet::query::{initialize_extensions, query, query_all};
use crate::model::schema::{Schema, SchemaError};
use crate::model::uri::DocumentUri;
use crate::registry::context_registry::{ContextRegistry, ContextRegistryError};
use crate::registry::control_host::{ControlHost, ControlHostError, ControlHostEvents};
use crate::registry::document_registry::{DocumentRegistry, DocumentRegistryError};
use log::{info, warn};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::rc::Rc;
use std::time::Instant;

/// Control-host grouping category for document controls.
pub const DOCUMENT_CONTROL_CATEGORY: &str = "documents";

/// Fallback control title for documents without a file name.
const UNTITLED: &str = "untitled";

/// Lifecycle controller errors.
#[derive(Debug)]
pub enum DocumentServiceError {
    /// File-system failure outside the codec.
    Io(std::io::Error),
    /// Structured-file decode/encode failure.
    Codec(CodecError),
    /// Tree construction failure under the document kind's schema.
    Schema(SchemaError),
    /// Facet attachment or lifecycle-transition failure.
    Facet(FacetError),
    /// Document-registry failure.
    Documents(DocumentRegistryError),
    /// Context-registry failure.
    Contexts(ContextRegistryError),
    /// Control-host failure.
    Host(ControlHostError),
}

impl Display for DocumentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::Facet(err) => write!(f, "{err}"),
            Self::Documents(err) => write!(f, "{err}"),
            Self::Contexts(err) => write!(f, "{err}"),
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DocumentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Facet(err) => Some(err),
            Self::Documents(err) => Some(err),
            Self::Contexts(err) => Some(err),
            Self::Host(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DocumentServiceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CodecError> for DocumentServiceError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<SchemaError> for DocumentServiceError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<FacetError> for DocumentServiceError {
    fn from(value: FacetError) -> Self {
        Self::Facet(value)
    }
}

impl From<DocumentRegistryError> for DocumentServiceError {
    fn from(value: DocumentRegistryError) -> Self {
        Self::Documents(value)
    }
}

impl From<ContextRegistryError> for DocumentServiceError {
    fn from(value: ContextRegistryError) -> Self {
        Self::Contexts(value)
    }
}

impl From<ControlHostError> for DocumentServiceError {
    fn from(value: ControlHostError) -> Self {
        Self::Host(value)
    }
}

/// One openable document kind: schema plus claimed file extensions.
#[derive(Clone)]
pub struct DocumentKind {
    schema: Rc<Schema>,
    extensions: Vec<String>,
}

impl DocumentKind {
    /// Creates a kind claiming the given extensions.
    ///
    /// Extensions are normalized to lowercase without a leading dot.
    pub fn new(
        schema: Rc<Schema>,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { schema, extensions }
    }

    /// Returns the schema documents of this kind are built under.
    pub fn schema(&self) -> &Rc<Schema> {
        &self.schema
    }

    /// Returns whether the extension (without dot, any case) is claimed.
    pub fn claims_extension(&self, extension: &str) -> bool {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        self.extensions.iter().any(|ext| *ext == normalized)
    }
}

/// Outcome of a close confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Allow,
    Deny,
}

/// Veto point consulted before a host-driven close tears a document down.
pub trait CloseConfirmation {
    fn confirm_close(&self, document: &Rc<DocumentFacet>) -> CloseDecision;
}

/// Confirmation policy that never vetoes.
pub struct AlwaysAllowClose;

impl CloseConfirmation for AlwaysAllowClose {
    fn confirm_close(&self, _document: &Rc<DocumentFacet>) -> CloseDecision {
        CloseDecision::Allow
    }
}

/// Lifecycle controller over one document kind.
pub struct DocumentService {
    kind: DocumentKind,
    codec: Rc<dyn TreeCodec>,
    documents: Rc<RefCell<DocumentRegistry>>,
    contexts: Rc<RefCell<ContextRegistry>>,
    host: Rc<RefCell<dyn ControlHost>>,
    confirm_close: Rc<dyn CloseConfirmation>,
}

impl DocumentService {
    /// Creates a controller with fresh registries and a never-veto close
    /// policy.
    pub fn new(
        kind: DocumentKind,
        codec: Rc<dyn TreeCodec>,
        host: Rc<RefCell<dyn ControlHost>>,
    ) -> Rc<Self> {
        Self::with_close_confirmation(kind, codec, host, Rc::new(AlwaysAllowClose))
    }

    /// Creates a controller using the given close-confirmation policy.
    pub fn with_close_confirmation(
        kind: DocumentKind,
        codec: Rc<dyn TreeCodec>,
        host: Rc<RefCell<dyn ControlHost>>,
        confirm_close: Rc<dyn CloseConfirmation>,
    ) -> Rc<Self> {
        Rc::new(Self {
            kind,
            codec,
            documents: Rc::new(RefCell::new(DocumentRegistry::new())),
            contexts: Rc::new(RefCell::new(ContextRegistry::new())),
            host,
            confirm_close,
        })
    }

    /// Returns the document registry shared with callers.
    pub fn documents(&self) -> Rc<RefCell<DocumentRegistry>> {
        Rc::clone(&self.documents)
    }

    /// Returns the context registry shared with callers.
    pub fn contexts(&self) -> Rc<RefCell<ContextRegistry>> {
        Rc::clone(&self.contexts)
    }

    /// Returns whether this controller handles files at the uri.
    pub fn can_open(&self, uri: &DocumentUri) -> bool {
        match uri.extension() {
            Some(ext) => self.kind.claims_extension(ext.as_str()),
            None => false,
        }
    }

    /// Opens the document at `uri`.
    ///
    /// Reads the file through the codec when it exists, otherwise builds
    /// the schema's default root. `Ok(None)` means the tree carries no
    /// document facet and nothing was registered.
    ///
    /// # Errors
    /// - `Io` / `Codec` failures from the file or the decode, unchanged.
    /// - `Schema` / `Facet` failures from fresh-tree construction.
    pub fn open(
        self: &Rc<Self>,
        uri: &DocumentUri,
    ) -> Result<Option<Rc<DocumentFacet>>, DocumentServiceError> {
        let started_at = Instant::now();
        info!("event=document_open module=service status=start path={uri}");

        let result = self.open_inner(uri);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(Some(_)) => {
                info!(
                    "event=document_open module=service status=ok path={uri} duration_ms={duration_ms}"
                );
            }
            Ok(None) => {
                warn!(
                    "event=document_open module=service status=ok path={uri} duration_ms={duration_ms} note=no_document_facet"
                );
            }
            Err(err) => {
                warn!(
                    "event=document_open module=service status=error path={uri} duration_ms={duration_ms} error={err}"
                );
            }
        }
        result
    }

    fn open_inner(
        self: &Rc<Self>,
        uri: &DocumentUri,
    ) -> Result<Option<Rc<DocumentFacet>>, DocumentServiceError> {
        let schema = Rc::clone(&self.kind.schema);
        let root = if uri.local_path().exists() {
            let mut file = File::open(uri.local_path())?;
            self.codec.read(&mut file, uri, schema.as_ref())?
        } else {
            schema.instantiate_default_root()?
        };

        initialize_extensions(&root)?;

        let document = match query::<DocumentFacet>(&root) {
            Some(document) => document,
            None => return Ok(None),
        };
        document.set_uri(uri.clone());

        if let Some(context) = query::<ContextFacet>(&root) {
            let metadata = ControlMetadata {
                title: uri.file_name().unwrap_or_else(|| UNTITLED.to_string()),
                category: DOCUMENT_CONTROL_CATEGORY.to_string(),
            };
            context.set_metadata(metadata.clone());
            let control = context.control();
            control.link_document(&document);

            let owner: Rc<dyn ControlHostEvents> = Rc::clone(self) as Rc<dyn ControlHostEvents>;
            self.host
                .borrow_mut()
                .register_control(control, metadata, Rc::downgrade(&owner))?;
        }

        self.documents.borrow_mut().insert(Rc::clone(&document))?;
        {
            let mut contexts = self.contexts.borrow_mut();
            for context in query_all::<ContextFacet>(&root) {
                contexts.add_context(context)?;
            }
        }

        document.transition_to(LifecycleState::Open)?;
        Ok(Some(document))
    }

    /// Brings the document's control to front in the host.
    ///
    /// A document without an editing context has no control; showing it
    /// is a logged no-op.
    pub fn show(&self, document: &Rc<DocumentFacet>) -> Result<(), DocumentServiceError> {
        let node = document
            .node()
            .ok_or(DocumentRegistryError::DetachedDocument(document.id()))?;
        match query::<ContextFacet>(&node) {
            Some(context) => {
                self.host.borrow_mut().show(context.control().id())?;
                Ok(())
            }
            None => {
                warn!(
                    "event=document_show module=service status=ok document={} note=no_context",
                    document.id()
                );
                Ok(())
            }
        }
    }

    /// Saves the document's tree to `target` through the codec.
    ///
    /// The document keeps the uri it was opened under; saving to a
    /// different path does not retarget it.
    ///
    /// # Errors
    /// - `Io` / `Codec` failures from the file or the encode, unchanged.
    pub fn save(
        &self,
        document: &Rc<DocumentFacet>,
        target: &DocumentUri,
    ) -> Result<(), DocumentServiceError> {
        let started_at = Instant::now();
        info!("event=document_save module=service status=start path={target}");

        let root = document
            .node()
            .ok_or(DocumentRegistryError::DetachedDocument(document.id()))?;
        let result = File::create(target.local_path())
            .map_err(DocumentServiceError::from)
            .and_then(|mut file| {
                self.codec
                    .write(&root, &mut file, target, self.kind.schema.as_ref())
                    .map_err(DocumentServiceError::from)
            });

        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(()) => info!(
                "event=document_save module=service status=ok path={target} duration_ms={duration_ms}"
            ),
            Err(err) => warn!(
                "event=document_save module=service status=error path={target} duration_ms={duration_ms} error={err}"
            ),
        }
        result
    }

    /// Closes the document: detaches its control, unregisters every
    /// subtree context, drops the registry entry and moves the document
    /// to `Closed`.
    ///
    /// Closing an already-closed document is a no-op.
    pub fn close(&self, document: &Rc<DocumentFacet>) -> Result<(), DocumentServiceError> {
        if document.state() == LifecycleState::Closed {
            info!(
                "event=document_close module=service status=ok document={} note=already_closed",
                document.id()
            );
            return Ok(());
        }
        info!(
            "event=document_close module=service status=start document={}",
            document.id()
        );

        if let Some(node) = document.node() {
            if let Some(context) = query::<ContextFacet>(&node) {
                // The host may already have detached the control.
                match self
                    .host
                    .borrow_mut()
                    .unregister_control(context.control().id())
                {
                    Ok(()) | Err(ControlHostError::UnknownControl(_)) => {}
                    Err(err) => return Err(DocumentServiceError::Host(err)),
                }
            }
        }

        self.teardown(document)?;
        info!(
            "event=document_close module=service status=ok document={}",
            document.id()
        );
        Ok(())
    }

    /// Non-host part of close: context unregistration, registry removal
    /// and the terminal transition.
    fn teardown(&self, document: &Rc<DocumentFacet>) -> Result<(), DocumentServiceError> {
        if let Some(node) = document.node() {
            let mut contexts = self.contexts.borrow_mut();
            for context in query_all::<ContextFacet>(&node) {
                context.clear_metadata();
                match contexts.remove_context(&context) {
                    Ok(()) | Err(ContextRegistryError::ContextNotFound(_)) => {}
                    Err(err) => return Err(DocumentServiceError::Contexts(err)),
                }
            }
        }

        match self.documents.borrow_mut().remove(document) {
            Ok(()) | Err(DocumentRegistryError::DocumentNotFound(_)) => {}
            Err(err) => return Err(DocumentServiceError::Documents(err)),
        }

        document.transition_to(LifecycleState::Closed)?;
        Ok(())
    }

    fn document_of(control: &Rc<VisualControl>) -> Option<Rc<DocumentFacet>> {
        let document = control.document();
        if document.is_none() {
            warn!(
                "event=control_event module=service status=error control={} error=unlinked_control",
                control.id()
            );
        }
        document
    }
}

impl ControlHostEvents for DocumentService {
    fn control_activated(&self, control: &Rc<VisualControl>) {
        let Some(document) = Self::document_of(control) else {
            return;
        };

        let previous = self.documents.borrow().active_document();
        if let Some(previous) = &previous {
            if previous.id() == document.id() {
                return;
            }
        }

        if let Some(previous) = previous {
            if let Err(err) = previous.transition_to(LifecycleState::Inactive) {
                warn!(
                    "event=document_deactivate module=service status=error document={} error={err}",
                    previous.id()
                );
            }
        }
        if let Err(err) = document.transition_to(LifecycleState::Active) {
            warn!(
                "event=document_activate module=service status=error document={} error={err}",
                document.id()
            );
            return;
        }
        if let Err(err) = self.documents.borrow_mut().set_active(Some(&document)) {
            warn!(
                "event=document_activate module=service status=error document={} error={err}",
                document.id()
            );
            return;
        }

        if let Some(node) = document.node() {
            if let Some(context) = query::<ContextFacet>(&node) {
                if let Err(err) = self.contexts.borrow_mut().set_active(Some(&context)) {
                    warn!(
                        "event=context_activate module=service status=error context={} error={err}",
                        context.id()
                    );
                }
            }
        }
        info!(
            "event=document_activate module=service status=ok document={}",
            document.id()
        );
    }

    fn control_deactivated(&self, control: &Rc<VisualControl>) {
        // Losing focus changes nothing; the document stays active until
        // another activation takes over.
        info!(
            "event=control_deactivated module=service status=ok control={}",
            control.id()
        );
    }

    fn control_close_requested(&self, control: &Rc<VisualControl>) -> bool {
        let Some(document) = Self::document_of(control) else {
            return true;
        };
        if self.confirm_close.confirm_close(&document) == CloseDecision::Deny {
            info!(
                "event=document_close module=service status=ok document={} note=denied",
                document.id()
            );
            return false;
        }
        // The host detaches the control itself on a granted request; the
        // full teardown happens when the shell follows up with `close`.
        if let Some(node) = document.node() {
            if let Some(context) = query::<ContextFacet>(&node) {
                match self.contexts.borrow_mut().remove_context(&context) {
                    Ok(()) | Err(ContextRegistryError::ContextNotFound(_)) => {}
                    Err(err) => warn!(
                        "event=document_close module=service status=error document={} error={err}",
                        document.id()
                    ),
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentKind;
    use crate::facet::map::FacetKind;
    use crate::model::schema::{NodeTypeSpec, Schema};
    use crate::model::uri::DocumentUri;
    use std::rc::Rc;

    fn canvas_schema() -> Rc<Schema> {
        let mut schema = Schema::new("canvas", "canvas");
        schema
            .declare_node_type(
                "canvas",
                NodeTypeSpec::with_facets([
                    FacetKind::Document,
                    FacetKind::EditingContext,
                    FacetKind::History,
                ]),
            )
            .expect("declare canvas type");
        Rc::new(schema)
    }

    #[test]
    fn kind_normalizes_claimed_extensions() {
        let kind = DocumentKind::new(canvas_schema(), [".TDoc", "canvas"]);
        assert!(kind.claims_extension("tdoc"));
        assert!(kind.claims_extension(".TDOC"));
        assert!(kind.claims_extension("canvas"));
        assert!(!kind.claims_extension("txt"));
    }

    #[test]
    fn kind_ignores_uris_without_extension() {
        let kind = DocumentKind::new(canvas_schema(), ["tdoc"]);
        let codecless = DocumentUri::from_path("/tmp/plain-directory");
        assert!(codecless.extension().is_none());
        assert!(!kind.claims_extension(""));
    }
}
