//! CLI rendering of a collection.
//!
//! The display is information-first: every line leads with what the node
//! *is* — a group name with its picture count, a picture description —
//! with the filesystem path as indented `Source:` context below it. Paths
//! are secondary; the collection is about pictures, not files.
//!
//! ```text
//! Summer 2025 (48 pictures)
//!     Alps (12 pictures)
//!         042 Lake Zurich
//!             Source: /photos/alps/042-Lake-Zurich.jpg
//!     dawn
//!         Source: /photos/dawn.jpg
//! ```

use crate::collection::{Collection, NodeId};
use crate::payload::Payload;
use crate::stats::SubtreeStats;
use serde_json::{Value, json};
use std::fmt::Write as _;

const INDENT: &str = "    ";

/// Renders the subtree under `id` as indented text.
pub fn render_tree(collection: &Collection, id: NodeId) -> String {
    let mut out = String::new();
    render_node(collection, id, 0, &mut out);
    out
}

fn render_node(collection: &Collection, id: NodeId, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    match collection.payload(id) {
        Payload::Group(group) => {
            let pictures = collection.subtree_stats(id).pictures;
            let noun = if pictures == 1 { "picture" } else { "pictures" };
            let _ = writeln!(out, "{pad}{} ({pictures} {noun})", group.name());
            for &child in collection.children_of(id) {
                render_node(collection, child, depth + 1, out);
            }
        }
        Payload::Picture(picture) => {
            let _ = writeln!(out, "{pad}{}", picture.description());
            let _ = writeln!(out, "{pad}{INDENT}Source: {}", picture.location());
        }
    }
}

/// One-line summary for the end of a command.
pub fn render_stats(stats: &SubtreeStats) -> String {
    format!(
        "{} pictures in {} groups ({} nodes)",
        stats.pictures,
        stats.groups,
        stats.nodes
    )
}

/// The subtree under `id` as a JSON value, for `--json` output.
pub fn tree_json(collection: &Collection, id: NodeId) -> Value {
    match collection.payload(id) {
        Payload::Group(group) => {
            let children: Vec<Value> = collection
                .children_of(id)
                .iter()
                .map(|&child| tree_json(collection, child))
                .collect();
            json!({ "group": group.name(), "children": children })
        }
        Payload::Picture(picture) => {
            let mut object = json!({
                "picture": picture.description(),
                "location": picture.location(),
            });
            let map = object.as_object_mut().expect("literal object");
            if let Some(checksum) = picture.checksum() {
                map.insert("checksum".into(), json!(checksum));
            }
            if picture.rotation() != 0.0 {
                map.insert("rotation".into(), json!(picture.rotation()));
            }
            if !picture.categories().is_empty() {
                map.insert("categories".into(), json!(picture.categories()));
            }
            object
        }
    }
}
