//! JSON tree codec.
//!
//! # Responsibility
//! - Map recursive `{"type": ..., "children": [...]}` records to and
//!   from schema-typed document trees.
//!
//! # Invariants
//! - Unknown node types are `MalformedInput`, not a distinct error.
//! - Encoded output round-trips to a structurally equal tree.

use crate::codec::{CodecError, CodecResult, TreeCodec};
use crate::model::node::TreeNode;
use crate::model::schema::Schema;
use crate::model::uri::DocumentUri;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::rc::Rc;

/// Serialized shape of one tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NodeRecord {
    /// Serialized as `type` to match the on-disk schema naming.
    #[serde(rename = "type")]
    type_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeRecord>,
}

/// Structured-file codec over JSON node records.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTreeCodec;

impl JsonTreeCodec {
    pub fn new() -> Self {
        Self
    }

    fn build_node(&self, record: &NodeRecord, schema: &Schema) -> CodecResult<Rc<TreeNode>> {
        let node = schema
            .instantiate(&record.type_id)
            .map_err(|err| CodecError::MalformedInput(err.to_string()))?;
        for child_record in &record.children {
            let child = self.build_node(child_record, schema)?;
            node.append_child(child)
                .map_err(|err| CodecError::MalformedInput(err.to_string()))?;
        }
        Ok(node)
    }

    fn build_record(&self, node: &Rc<TreeNode>) -> NodeRecord {
        NodeRecord {
            type_id: node.type_id().to_string(),
            children: node
                .children()
                .iter()
                .map(|child| self.build_record(child))
                .collect(),
        }
    }
}

impl TreeCodec for JsonTreeCodec {
    fn read(
        &self,
        reader: &mut dyn Read,
        _uri: &DocumentUri,
        schema: &Schema,
    ) -> CodecResult<Rc<TreeNode>> {
        let record: NodeRecord =
            serde_json::from_reader(reader).map_err(classify_serde_error)?;
        self.build_node(&record, schema)
    }

    fn write(
        &self,
        tree: &Rc<TreeNode>,
        writer: &mut dyn Write,
        _uri: &DocumentUri,
        _schema: &Schema,
    ) -> CodecResult<()> {
        let record = self.build_record(tree);
        serde_json::to_writer_pretty(&mut *writer, &record).map_err(classify_serde_error)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn classify_serde_error(err: serde_json::Error) -> CodecError {
    if err.is_io() {
        return CodecError::Io(std::io::Error::new(std::io::ErrorKind::Other, err));
    }
    CodecError::MalformedInput(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::JsonTreeCodec;
    use crate::codec::{CodecError, TreeCodec};
    use crate::facet::map::FacetKind;
    use crate::model::schema::{NodeTypeSpec, Schema};
    use crate::model::uri::DocumentUri;

    fn schema() -> Schema {
        let mut schema = Schema::new("canvas", "canvas");
        schema
            .declare_node_type(
                "canvas",
                NodeTypeSpec::with_facets([FacetKind::Document, FacetKind::EditingContext]),
            )
            .expect("declare canvas");
        schema
            .declare_node_type("widget", NodeTypeSpec::plain())
            .expect("declare widget");
        schema
    }

    fn uri() -> DocumentUri {
        DocumentUri::from_path("/tmp/example.tdoc")
    }

    #[test]
    fn decodes_nested_records_in_order() {
        let input = br#"{"type":"canvas","children":[{"type":"widget"},{"type":"widget"}]}"#;
        let codec = JsonTreeCodec::new();

        let tree = codec
            .read(&mut input.as_slice(), &uri(), &schema())
            .expect("decode nested records");
        assert_eq!(tree.type_id(), "canvas");
        assert_eq!(tree.child_count(), 2);
        assert_eq!(tree.children()[0].type_id(), "widget");
    }

    #[test]
    fn encode_then_decode_is_structurally_equal() {
        let schema = schema();
        let codec = JsonTreeCodec::new();
        let tree = schema.instantiate("canvas").expect("instantiate canvas");
        let child = schema.instantiate("widget").expect("instantiate widget");
        tree.append_child(child).expect("append widget");

        let mut bytes = Vec::new();
        codec
            .write(&tree, &mut bytes, &uri(), &schema)
            .expect("encode tree");
        let reread = codec
            .read(&mut bytes.as_slice(), &uri(), &schema)
            .expect("decode encoded tree");
        assert!(tree.structural_eq(&reread));
    }

    #[test]
    fn rejects_syntactically_broken_input() {
        let codec = JsonTreeCodec::new();
        let err = codec
            .read(&mut b"{not json".as_slice(), &uri(), &schema())
            .expect_err("broken input must fail");
        assert!(matches!(err, CodecError::MalformedInput(_)));
    }

    #[test]
    fn rejects_types_outside_the_schema() {
        let codec = JsonTreeCodec::new();
        let input = br#"{"type":"rogue"}"#;
        let err = codec
            .read(&mut input.as_slice(), &uri(), &schema())
            .expect_err("undeclared type must fail");
        assert!(matches!(err, CodecError::MalformedInput(_)));
    }
}
