use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use treedoc_core::{
    CodecError, DocumentKind, DocumentService, DocumentServiceError, DocumentUri, FacetKind,
    InProcessControlHost, JsonTreeCodec, NodeTypeSpec, Schema, TreeCodec,
};

fn canvas_schema() -> Rc<Schema> {
    let mut schema = Schema::new("canvas", "canvas");
    schema
        .declare_node_type(
            "canvas",
            NodeTypeSpec::with_facets([FacetKind::Document, FacetKind::EditingContext]),
        )
        .unwrap();
    schema.declare_node_type("widget", NodeTypeSpec::plain()).unwrap();
    Rc::new(schema)
}

fn new_service(schema: Rc<Schema>) -> Rc<DocumentService> {
    DocumentService::new(
        DocumentKind::new(schema, ["tdoc"]),
        Rc::new(JsonTreeCodec::new()),
        Rc::new(RefCell::new(InProcessControlHost::new())),
    )
}

#[test]
fn written_file_reads_back_structurally_equal() {
    let schema = canvas_schema();
    let codec = JsonTreeCodec::new();
    let dir = tempfile::tempdir().unwrap();
    let uri = DocumentUri::from_path(dir.path().join("board.tdoc"));

    let tree = schema.instantiate("canvas").unwrap();
    tree.append_child(schema.instantiate("widget").unwrap()).unwrap();
    tree.append_child(schema.instantiate("widget").unwrap()).unwrap();

    let mut file = fs::File::create(uri.local_path()).unwrap();
    codec.write(&tree, &mut file, &uri, &schema).unwrap();
    drop(file);

    let mut file = fs::File::open(uri.local_path()).unwrap();
    let reread = codec.read(&mut file, &uri, &schema).unwrap();
    assert!(tree.structural_eq(&reread));
}

#[test]
fn malformed_file_propagates_as_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let uri = DocumentUri::from_path(dir.path().join("broken.tdoc"));
    fs::write(uri.local_path(), b"{\"type\": ").unwrap();

    let service = new_service(canvas_schema());
    let err = service.open(&uri).unwrap_err();
    assert!(matches!(
        err,
        DocumentServiceError::Codec(CodecError::MalformedInput(_))
    ));
    assert!(service.documents().borrow().is_empty());
}

#[test]
fn file_with_undeclared_type_propagates_as_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let uri = DocumentUri::from_path(dir.path().join("rogue.tdoc"));
    fs::write(uri.local_path(), br#"{"type":"rogue"}"#).unwrap();

    let service = new_service(canvas_schema());
    let err = service.open(&uri).unwrap_err();
    assert!(matches!(
        err,
        DocumentServiceError::Codec(CodecError::MalformedInput(_))
    ));
}

#[test]
fn unreadable_path_propagates_as_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let uri = DocumentUri::from_path(dir.path().join("folder.tdoc"));
    fs::create_dir(uri.local_path()).unwrap();

    let service = new_service(canvas_schema());
    let err = service.open(&uri).unwrap_err();
    assert!(matches!(
        err,
        DocumentServiceError::Io(_) | DocumentServiceError::Codec(CodecError::Io(_))
    ));
    assert!(service.documents().borrow().is_empty());
}

#[test]
fn save_failure_leaves_document_registered() {
    let dir = tempfile::tempdir().unwrap();
    let uri = DocumentUri::from_path(dir.path().join("kept.tdoc"));
    let service = new_service(canvas_schema());
    let document = service.open(&uri).unwrap().expect("document facet");

    let missing_parent = DocumentUri::from_path(dir.path().join("absent/kept.tdoc"));
    let err = service.save(&document, &missing_parent).unwrap_err();
    assert!(matches!(err, DocumentServiceError::Io(_)));
    assert_eq!(service.documents().borrow().len(), 1);
    assert_eq!(document.uri().unwrap(), uri);
}
