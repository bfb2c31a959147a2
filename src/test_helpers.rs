//! Shared test utilities for the shoebox test suite.
//!
//! Builders for a small known tree, child-label extraction for order
//! assertions, and an event recorder that captures everything a listener
//! sees.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (mut collection, ids) = sample_collection();
//! let events = record_events(&mut collection);
//! collection.move_to_top(ids.work).unwrap();
//! assert_eq!(labels(&collection, collection.root()), ["Work", "Holidays"]);
//! ```

use crate::collection::{Collection, NodeId};
use crate::event::CollectionEvent;
use crate::payload::PicturePayload;
use std::sync::{Arc, Mutex};

/// A picture payload with a description and a location derived from it.
pub(crate) fn picture(description: &str) -> PicturePayload {
    let mut payload = PicturePayload::new(format!("/photos/{description}.jpg"));
    payload.set_description(description);
    payload
}

/// Handles into the tree built by [`sample_collection`].
pub(crate) struct SampleIds {
    pub holidays: NodeId,
    pub work: NodeId,
    pub beach: NodeId,
    pub mountain: NodeId,
    pub office: NodeId,
}

/// A small collection with a known shape:
///
/// ```text
/// root
/// ├── Holidays
/// │   ├── beach
/// │   └── mountain
/// └── Work
///     └── office
/// ```
///
/// Built clean: the dirty flag is cleared before returning.
pub(crate) fn sample_collection() -> (Collection, SampleIds) {
    let mut collection = Collection::new();
    let root = collection.root();
    let holidays = collection.add_group(root, "Holidays").unwrap();
    let work = collection.add_group(root, "Work").unwrap();
    let beach = collection.add_picture(holidays, picture("beach")).unwrap();
    let mountain = collection.add_picture(holidays, picture("mountain")).unwrap();
    let office = collection.add_picture(work, picture("office")).unwrap();
    collection.clear_dirty();
    (
        collection,
        SampleIds {
            holidays,
            work,
            beach,
            mountain,
            office,
        },
    )
}

/// Display labels of `parent`'s children, in order.
pub(crate) fn labels(collection: &Collection, parent: NodeId) -> Vec<String> {
    collection
        .children_of(parent)
        .iter()
        .map(|&child| collection.payload(child).display_label().to_string())
        .collect()
}

/// Registers a recording listener and returns the shared event log.
pub(crate) fn record_events(
    collection: &mut Collection,
) -> Arc<Mutex<Vec<CollectionEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    collection.add_listener(move |event| sink.lock().unwrap().push(event.clone()));
    events
}
