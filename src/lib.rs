//! # Shoebox
//!
//! The data model of a personal photo organizer: a tree of groups and
//! pictures that can be reordered, sorted, dragged around and bulk-loaded,
//! with fine-grained change notifications for whatever UI sits on top.
//!
//! # Architecture: One Tree, One Writer, One Event Channel
//!
//! Everything lives in a single [`collection::Collection`] — an arena of
//! nodes addressed by stable [`collection::NodeId`] handles. Three rules
//! shape the whole crate:
//!
//! - **One tree.** A node is either a group (named, may have children) or
//!   a picture (metadata, always a leaf). Structural invariants — leaf-only
//!   pictures, no cycles, an immovable root — are checked before any
//!   mutation, so a refused operation leaves the tree untouched.
//! - **One writer.** All mutation happens on the thread that created the
//!   collection; the collection refuses calls from anywhere else.
//!   Background work (directory scans, checksumming) sends results to the
//!   controller thread over a channel instead of reaching into the tree.
//! - **One event channel.** Structural changes and payload field changes
//!   are delivered synchronously to registered listeners in registration
//!   order, and a collection-wide suppression switch silences the lot
//!   during bulk loads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collection`] | The arena: node storage, attach/detach/delete, categories, dirty flag, suppression |
//! | [`payload`] | Group and picture payloads with equality-gated field mutators |
//! | [`event`] | Typed change events and the listener bus |
//! | [`traverse`] | Document-order navigation and picture lookups |
//! | [`arrange`] | Reordering: top/up/down/bottom, indent/outdent, arbitrary moves |
//! | [`sort`] | Sorting a group's children by an explicit criterion |
//! | [`dragdrop`] | Drop reconciliation, including the externally-decided group drop |
//! | [`import`] | Background directory scan feeding controller-thread inserts |
//! | [`stats`] | Subtree counts for status displays |
//! | [`naming`] | Default descriptions from filenames |
//! | [`config`] | `shoebox.toml` loading |
//! | [`output`] | Tree/stats/JSON rendering for the CLI |
//!
//! # Design Decisions
//!
//! ## Arena Instead of Parent Pointers
//!
//! A tree where children own their parents (or vice versa) plus back
//! references is exactly the shape Rust's ownership rules punish. The
//! arena sidesteps it: the collection owns every node flat in a map, nodes
//! refer to each other by handle, and "is this node still alive" or "purge
//! it from the recent-drop list" become handle comparisons. Handles are
//! never reused, so a stale one can't silently alias a new node.
//!
//! ## Explicit Sort Criterion
//!
//! The comparator takes its criterion as a parameter rather than reading
//! shared "current sort field" state. A second sort starting while another
//! is mid-flight can therefore never change the first one's rules — the
//! classic hazard of comparator-by-global.
//!
//! ## The Ambiguous Group Drop Is Decided Outside
//!
//! Dropping a group onto a group has no right answer (before? after?
//! inside?). The core exposes the legal placements and asks a
//! caller-supplied chooser; in the app that's a popup menu, in tests a
//! closure. The model never guesses placement on the user's behalf.
//!
//! ## Events Are Values
//!
//! Listeners receive plain [`event::CollectionEvent`] values — ids, indices
//! and payload copies, never references into the arena. Handlers can stash
//! them, ship them across threads, or diff them at leisure without
//! borrowing the collection.

pub mod arrange;
pub mod collection;
pub mod config;
pub mod dragdrop;
pub mod event;
pub mod import;
pub mod naming;
pub mod output;
pub mod payload;
pub mod sort;
pub mod stats;
pub mod traverse;

#[cfg(test)]
pub(crate) mod test_helpers;
