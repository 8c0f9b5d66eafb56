//! Structured-file codec seam.
//!
//! # Responsibility
//! - Define the byte-stream contract between the lifecycle controller
//!   and the concrete structured-file reader/writer.
//!
//! # Invariants
//! - `MalformedInput` and `Io` failures propagate unchanged to the
//!   caller of open/save; the controller never masks them.
//! - Readers build nodes through the schema so facet attachment follows
//!   the schema's declarations.

use crate::model::node::TreeNode;
use crate::model::schema::Schema;
use crate::model::uri::DocumentUri;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};
use std::rc::Rc;

pub mod json;

pub use json::JsonTreeCodec;

/// Result type used by codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from structured-file decode/encode.
#[derive(Debug)]
pub enum CodecError {
    /// Input does not parse to a tree under the schema.
    MalformedInput(String),
    /// Underlying stream failure.
    Io(std::io::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput(message) => write!(f, "malformed document input: {message}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedInput(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Byte-stream codec between structured files and document trees.
pub trait TreeCodec {
    /// Decodes one document tree from a byte stream under the schema.
    fn read(
        &self,
        reader: &mut dyn Read,
        uri: &DocumentUri,
        schema: &Schema,
    ) -> CodecResult<Rc<TreeNode>>;

    /// Encodes one document tree to a byte stream under the schema.
    fn write(
        &self,
        tree: &Rc<TreeNode>,
        writer: &mut dyn Write,
        uri: &DocumentUri,
        schema: &Schema,
    ) -> CodecResult<()>;
}
