//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `treedoc_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use std::rc::Rc;
use treedoc_core::{FacetKind, NodeTypeSpec, Schema};

fn main() {
    println!("treedoc_core version={}", treedoc_core::core_version());

    let mut schema = Schema::new("canvas", "canvas");
    if let Err(err) = schema.declare_node_type(
        "canvas",
        NodeTypeSpec::with_facets([FacetKind::Document, FacetKind::EditingContext]),
    ) {
        eprintln!("schema setup failed: {err}");
        std::process::exit(1);
    }
    let schema = Rc::new(schema);

    match schema.instantiate_default_root() {
        Ok(root) => {
            println!("default root type={}", root.type_id());
        }
        Err(err) => {
            eprintln!("default root construction failed: {err}");
            std::process::exit(1);
        }
    }
}
