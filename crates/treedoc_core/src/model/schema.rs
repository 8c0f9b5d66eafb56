//! Document schema consumed by tree construction.
//!
//! # Responsibility
//! - Declare the valid node types of one document kind and the facets
//!   each type carries.
//! - Instantiate schema-typed nodes with their declared facets attached.
//!
//! # Invariants
//! - The default root type must be declared like any other node type.
//! - Facet declarations are a set: one kind at most once per node type.
//!
//! The schema loader itself is an external collaborator; the core only
//! consumes schema values.

use crate::facet::context::ContextFacet;
use crate::facet::document::DocumentFacet;
use crate::facet::history::HistoryFacet;
use crate::facet::map::{FacetError, FacetKind};
use crate::model::node::{NodeTypeId, TreeNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Errors from schema declaration and node instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Requested node type is not declared by this schema.
    UnknownNodeType(NodeTypeId),
    /// Node type was already declared.
    DuplicateNodeType(NodeTypeId),
    /// Facet attachment failed during instantiation.
    Facet(FacetError),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNodeType(type_id) => {
                write!(f, "node type is not declared by the schema: {type_id}")
            }
            Self::DuplicateNodeType(type_id) => {
                write!(f, "node type already declared: {type_id}")
            }
            Self::Facet(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Facet(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FacetError> for SchemaError {
    fn from(value: FacetError) -> Self {
        Self::Facet(value)
    }
}

/// Declaration for one node type: the facets its nodes carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeSpec {
    /// Capability kinds attached to every node of this type.
    pub facets: BTreeSet<FacetKind>,
}

impl NodeTypeSpec {
    /// Declares a plain node type without facets.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Declares a node type carrying the given facet kinds.
    pub fn with_facets(kinds: impl IntoIterator<Item = FacetKind>) -> Self {
        Self {
            facets: kinds.into_iter().collect(),
        }
    }
}

/// Structural grammar for one document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    default_root_type: NodeTypeId,
    node_types: BTreeMap<NodeTypeId, NodeTypeSpec>,
}

impl Schema {
    /// Creates an empty schema with the declared default root type.
    ///
    /// The default root type still has to be declared via
    /// [`Schema::declare_node_type`] before instantiation.
    pub fn new(name: impl Into<String>, default_root_type: impl Into<NodeTypeId>) -> Self {
        Self {
            name: name.into(),
            default_root_type: default_root_type.into(),
            node_types: BTreeMap::new(),
        }
    }

    /// Returns the schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type used for the root of a fresh document.
    pub fn default_root_type(&self) -> &str {
        &self.default_root_type
    }

    /// Declares one node type.
    ///
    /// # Errors
    /// - Returns `SchemaError::DuplicateNodeType` when the type is
    ///   already declared.
    pub fn declare_node_type(
        &mut self,
        type_id: impl Into<NodeTypeId>,
        spec: NodeTypeSpec,
    ) -> Result<(), SchemaError> {
        let type_id = type_id.into();
        if self.node_types.contains_key(&type_id) {
            return Err(SchemaError::DuplicateNodeType(type_id));
        }
        self.node_types.insert(type_id, spec);
        Ok(())
    }

    /// Returns whether the type is declared.
    pub fn contains_node_type(&self, type_id: &str) -> bool {
        self.node_types.contains_key(type_id)
    }

    /// Returns one node type declaration.
    pub fn node_type(&self, type_id: &str) -> Option<&NodeTypeSpec> {
        self.node_types.get(type_id)
    }

    /// Builds one node of the given type with its declared facets
    /// attached.
    ///
    /// # Errors
    /// - Returns `SchemaError::UnknownNodeType` for undeclared types.
    pub fn instantiate(&self, type_id: &str) -> Result<Rc<TreeNode>, SchemaError> {
        let spec = self
            .node_type(type_id)
            .ok_or_else(|| SchemaError::UnknownNodeType(type_id.to_string()))?;

        let node = TreeNode::new(type_id);
        for kind in &spec.facets {
            match kind {
                FacetKind::Document => {
                    DocumentFacet::attach(&node)?;
                }
                FacetKind::EditingContext => {
                    ContextFacet::attach(&node)?;
                }
                FacetKind::History => {
                    HistoryFacet::attach(&node)?;
                }
            }
        }
        Ok(node)
    }

    /// Builds a fresh-document root node: the schema's default root type.
    pub fn instantiate_default_root(&self) -> Result<Rc<TreeNode>, SchemaError> {
        self.instantiate(self.default_root_type.as_str())
    }
}
