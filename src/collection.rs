//! The collection: an arena-backed tree of groups and pictures.
//!
//! A [`Collection`] owns every node of one photo collection. Nodes live in
//! an arena keyed by [`NodeId`] — a stable handle that survives any amount
//! of reordering and is only invalidated by [`Collection::delete`]. Each
//! node records its parent's handle and an ordered list of child handles,
//! which sidesteps the reference-cycle trouble a naive doubly-linked tree
//! runs into and makes "purge this node from bookkeeping lists" a handle
//! comparison.
//!
//! ## Structural invariants
//!
//! Upheld by every operation in this crate, checked up front so failures
//! never leave the tree half-mutated:
//!
//! - a picture node has zero children, always
//! - every non-root node has exactly one parent, and appears in that
//!   parent's child list exactly once
//! - the root is never deleted, moved, or reparented
//! - no node is its own ancestor
//!
//! Violating moves are refused with a [`TreeError`]; they are ordinary
//! outcomes a caller checks, not panics.
//!
//! ## Single-writer discipline
//!
//! The collection records the thread that created it and refuses mutation
//! from any other thread. Background work (directory scans, checksum
//! computation) never touches the tree — it sends results to the controller
//! thread, which performs the inserts (see [`crate::import`]).
//!
//! ## Suppression and the dirty flag
//!
//! Bulk loads flip [`set_suppress_notifications`] on, load, and flip it
//! off: no events fire and the collection does not get marked dirty, so
//! opening a collection is not an unsaved change. Every ordinary mutation
//! marks the collection dirty and notifies listeners synchronously.
//!
//! [`set_suppress_notifications`]: Collection::set_suppress_notifications

use crate::event::{CollectionEvent, EventBus, ListenerId, PayloadChange};
use crate::payload::{GroupPayload, Payload, PicturePayload};
use std::collections::HashMap;
use std::thread::{self, ThreadId};
use thiserror::Error;
use tracing::{debug, warn};

/// Name given to the root group of a freshly created collection.
pub const DEFAULT_ROOT_NAME: &str = "New Collection";

/// How many recently-used drop-target groups the collection remembers for
/// the UI's "move to recent group" shortcuts.
const MAX_RECENT_DROP_TARGETS: usize = 6;

/// Why a structural operation was refused. These are policy outcomes, not
/// faults: the tree is untouched when one is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("collection mutated off its controller thread")]
    OffControllerThread,
    #[error("picture nodes cannot have children")]
    ChildrenNotAllowed,
    #[error("the root node cannot be moved, deleted or reparented")]
    RootImmutable,
    #[error("cannot move a node into its own subtree")]
    MoveIntoDescendant,
    #[error("nothing can be placed before the root node")]
    BeforeRoot,
    #[error("child index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("node does not hold a picture payload")]
    NotAPicture,
    #[error("node does not hold a group payload")]
    NotAGroup,
}

/// Stable handle to a node. Handles are never reused; one stays valid until
/// the node is deleted. Distinct from the payload: two pictures with
/// identical metadata are still two different nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        NodeId(raw)
    }
}

pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) payload: Payload,
}

/// One loaded photo collection: the tree, its category dictionary, the
/// dirty flag and the notification machinery.
pub struct Collection {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    categories: HashMap<u32, String>,
    dirty: bool,
    suppress: bool,
    bus: EventBus,
    recent_drop_targets: Vec<NodeId>,
    owner: ThreadId,
}

impl Collection {
    /// An empty collection: a root group named [`DEFAULT_ROOT_NAME`] and
    /// nothing else. The calling thread becomes the controller thread.
    pub fn new() -> Self {
        Self::with_root_name(DEFAULT_ROOT_NAME)
    }

    pub fn with_root_name(name: impl Into<String>) -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                parent: None,
                children: Vec::new(),
                payload: Payload::Group(GroupPayload::new(name)),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
            categories: HashMap::new(),
            dirty: false,
            suppress: false,
            bus: EventBus::new(),
            recent_drop_targets: Vec::new(),
            owner: thread::current().id(),
        }
    }

    // =====================================================================
    // Handle and shape queries
    // =====================================================================

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of live nodes, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The node's payload.
    ///
    /// Panics on a deleted handle — holding one past [`delete`](Self::delete)
    /// is a caller bug, not a recoverable state.
    pub fn payload(&self, id: NodeId) -> &Payload {
        &self.node(id).payload
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    /// The node's position within its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.node(id).parent?;
        self.node(parent).children.iter().position(|c| *c == id)
    }

    /// Whether `ancestor` lies strictly above `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = self.node(node).parent;
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).parent;
        }
        false
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.is_ancestor(ancestor, node)
    }

    // =====================================================================
    // Node creation
    // =====================================================================

    /// Creates a detached group node. Attach it with [`add_child`] or
    /// [`insert_child`].
    ///
    /// [`add_child`]: Self::add_child
    /// [`insert_child`]: Self::insert_child
    pub fn create_group(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(Payload::Group(GroupPayload::new(name)))
    }

    /// Creates a detached picture node.
    pub fn create_picture(&mut self, payload: PicturePayload) -> NodeId {
        self.alloc(Payload::Picture(payload))
    }

    /// Creates a group and appends it under `parent` in one step.
    pub fn add_group(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        let id = self.create_group(name);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Creates a picture node and appends it under `parent` in one step.
    pub fn add_picture(
        &mut self,
        parent: NodeId,
        payload: PicturePayload,
    ) -> Result<NodeId, TreeError> {
        let id = self.create_picture(payload);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Deep copy of the subtree rooted at `id`: cloned payloads, freshly
    /// allocated nodes, returned detached. Mutating the copy never touches
    /// the original.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let payload = self.node(id).payload.clone();
        let children = self.node(id).children.clone();
        let copy = self.alloc(payload);
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    fn alloc(&mut self, payload: Payload) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                parent: None,
                children: Vec::new(),
                payload,
            },
        );
        id
    }

    // =====================================================================
    // Attach / detach / delete
    // =====================================================================

    /// Appends `child` as the last child of `parent`. A child attached
    /// elsewhere is detached first (with its removal event).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let index = self.child_count(parent);
        self.insert_child_at(parent, child, index, true)
    }

    /// Inserts `child` under `parent` at `index` (`0..=child_count`).
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        self.insert_child_at(parent, child, index, false)
    }

    fn insert_child_at(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
        append: bool,
    ) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        if !self.node(parent).payload.is_group() {
            return Err(TreeError::ChildrenNotAllowed);
        }
        if child == self.root {
            return Err(TreeError::RootImmutable);
        }
        // Inserting a node below its own descendant would orphan a cycle.
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::MoveIntoDescendant);
        }
        let mut len = self.child_count(parent);
        if self.node(child).parent == Some(parent) {
            len -= 1; // the child's own slot disappears when it detaches
        }
        let index = if append { len } else { index };
        if index > len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }

        if self.node(child).parent.is_some() {
            self.detach_inner(child);
        }
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.insert(index, child);
        self.mark_dirty();
        self.send_nodes_inserted(parent, vec![index]);
        Ok(())
    }

    /// Detaches `id` from its parent, leaving the subtree alive but
    /// unattached. Returns `Ok(false)` (and logs) when there was no parent.
    pub fn detach(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.ensure_controller_thread()?;
        Ok(self.detach_inner(id).is_some())
    }

    /// Removal without the thread check, for use inside already-validated
    /// operations. Returns the old `(parent, index)`.
    pub(crate) fn detach_inner(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let Some(parent) = self.node(id).parent else {
            debug!(?id, "detach on a node without a parent, ignoring");
            return None;
        };
        let index = self
            .index_in_parent(id)
            .expect("attached node missing from its parent's child list");
        self.node_mut(parent).children.remove(index);
        self.node_mut(id).parent = None;
        let removed = self.node(id).payload.clone();
        self.send_nodes_removed(parent, vec![index], vec![removed]);
        Some((parent, index))
    }

    /// Deletes the node and its whole subtree. Handles into the subtree
    /// become invalid and are purged from the recent-drop-target list. The
    /// root cannot be deleted.
    pub fn delete(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        if id == self.root {
            warn!("delete requested for the root node, refusing");
            return Err(TreeError::RootImmutable);
        }
        self.mark_dirty();
        self.detach_inner(id);
        for gone in self.subtree(id) {
            self.recent_drop_targets.retain(|t| *t != gone);
            self.nodes.remove(&gone);
        }
        Ok(())
    }

    // =====================================================================
    // Payload editing
    // =====================================================================

    /// Edits the picture payload of `id` through `edit`. When the closure
    /// reports a change, listeners get the field event plus a `NodeChanged`
    /// and the collection is marked dirty. Returns whether anything changed.
    ///
    /// ```
    /// # use shoebox::collection::Collection;
    /// # use shoebox::payload::PicturePayload;
    /// # let mut collection = Collection::new();
    /// # let root = collection.root();
    /// # let pic = collection.add_picture(root, PicturePayload::new("a.jpg")).unwrap();
    /// collection.edit_picture(pic, |p| p.set_rotation(90.0)).unwrap();
    /// ```
    pub fn edit_picture(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut PicturePayload) -> Option<PayloadChange>,
    ) -> Result<bool, TreeError> {
        self.ensure_controller_thread()?;
        let picture = self
            .node_mut(id)
            .payload
            .as_picture_mut()
            .ok_or(TreeError::NotAPicture)?;
        let Some(change) = edit(picture) else {
            return Ok(false);
        };
        self.mark_dirty();
        self.send_payload_changed(id, change);
        Ok(true)
    }

    /// Group counterpart of [`edit_picture`](Self::edit_picture).
    pub fn edit_group(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut GroupPayload) -> Option<PayloadChange>,
    ) -> Result<bool, TreeError> {
        self.ensure_controller_thread()?;
        let group = self
            .node_mut(id)
            .payload
            .as_group_mut()
            .ok_or(TreeError::NotAGroup)?;
        let Some(change) = edit(group) else {
            return Ok(false);
        };
        self.mark_dirty();
        self.send_payload_changed(id, change);
        Ok(true)
    }

    /// Announces that `id` became the current selection. Node-level, but
    /// delivered on the payload channel where every metadata panel already
    /// listens. Does not dirty the collection.
    pub fn send_was_selected(&mut self, id: NodeId) {
        self.send_payload_changed(id, PayloadChange::WasSelected);
    }

    pub fn send_was_unselected(&mut self, id: NodeId) {
        self.send_payload_changed(id, PayloadChange::WasUnselected);
    }

    // =====================================================================
    // Categories
    // =====================================================================
    //
    // Deleting a category does not cascade: pictures keep the stale id in
    // their assignment sets. Known gap; callers that care must sweep the
    // pictures themselves.

    /// Adds or replaces a category under a caller-chosen id.
    pub fn add_category(&mut self, id: u32, label: impl Into<String>) {
        self.categories.insert(id, label.into());
        self.mark_dirty();
    }

    /// Adds a category under the next free id and returns it.
    pub fn add_category_auto(&mut self, label: impl Into<String>) -> u32 {
        let id = self.categories.keys().max().map_or(0, |max| max + 1);
        self.add_category(id, label);
        id
    }

    /// Renames an existing category. Unknown ids are ignored with a log.
    pub fn rename_category(&mut self, id: u32, label: impl Into<String>) {
        match self.categories.get_mut(&id) {
            Some(slot) => {
                *slot = label.into();
                self.mark_dirty();
            }
            None => warn!(id, "rename for unknown category id, ignoring"),
        }
    }

    pub fn get_category(&self, id: u32) -> Option<&str> {
        self.categories.get(&id).map(String::as_str)
    }

    /// Removes a category from the dictionary, returning its label.
    /// Picture assignments referencing the id are left in place.
    pub fn remove_category(&mut self, id: u32) -> Option<String> {
        let removed = self.categories.remove(&id);
        if removed.is_some() {
            self.mark_dirty();
        }
        removed
    }

    /// All category ids, in no particular order.
    pub fn category_ids(&self) -> Vec<u32> {
        self.categories.keys().copied().collect()
    }

    // =====================================================================
    // Duplicate detection
    // =====================================================================

    /// Whether any picture reachable from the root carries this checksum.
    pub fn is_duplicate_checksum(&self, checksum: u64) -> bool {
        self.subtree(self.root).into_iter().any(|id| {
            self.node(id)
                .payload
                .as_picture()
                .is_some_and(|p| p.checksum() == Some(checksum))
        })
    }

    /// Whether any picture reachable from the root points at this location.
    pub fn contains_location(&self, location: &str) -> bool {
        self.subtree(self.root).into_iter().any(|id| {
            self.node(id)
                .payload
                .as_picture()
                .is_some_and(|p| p.location() == location)
        })
    }

    // =====================================================================
    // Recent drop targets
    // =====================================================================

    /// Groups recently used as drop targets, most recent first, capped and
    /// purged on delete. The UI reuses these for "move to recent group"
    /// menus.
    pub fn recent_drop_targets(&self) -> &[NodeId] {
        &self.recent_drop_targets
    }

    pub fn last_drop_target(&self) -> Option<NodeId> {
        self.recent_drop_targets.first().copied()
    }

    pub(crate) fn remember_drop_target(&mut self, group: NodeId) {
        self.recent_drop_targets.retain(|t| *t != group);
        self.recent_drop_targets.insert(0, group);
        self.recent_drop_targets.truncate(MAX_RECENT_DROP_TARGETS);
    }

    // =====================================================================
    // Dirty flag and suppression
    // =====================================================================

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks unsaved changes — unless suppressed, so that loading a file
    /// does not count as editing it.
    pub fn mark_dirty(&mut self) {
        if !self.suppress {
            self.dirty = true;
        }
    }

    /// Called after a successful save or load.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Silences events and dirty-marking while `true`. Bulk loaders flip
    /// this on, load, flip it off, and announce one coarse
    /// [`StructureChanged`](CollectionEvent::StructureChanged).
    pub fn set_suppress_notifications(&mut self, suppress: bool) {
        self.suppress = suppress;
    }

    pub fn notifications_suppressed(&self) -> bool {
        self.suppress
    }

    // =====================================================================
    // Listeners and event delivery
    // =====================================================================

    pub fn add_listener(
        &mut self,
        listener: impl FnMut(&CollectionEvent) + Send + 'static,
    ) -> ListenerId {
        self.bus.register(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.bus.unregister(id)
    }

    pub fn send_structure_changed(&mut self, node: NodeId) {
        if self.suppress {
            return;
        }
        self.bus.emit(&CollectionEvent::StructureChanged { node });
    }

    pub fn send_node_changed(&mut self, node: NodeId) {
        if self.suppress {
            return;
        }
        self.bus.emit(&CollectionEvent::NodeChanged { node });
    }

    pub fn send_nodes_inserted(&mut self, parent: NodeId, indices: Vec<usize>) {
        if self.suppress {
            return;
        }
        self.bus.emit(&CollectionEvent::NodesInserted { parent, indices });
    }

    pub fn send_nodes_removed(
        &mut self,
        parent: NodeId,
        indices: Vec<usize>,
        removed: Vec<Payload>,
    ) {
        if self.suppress {
            return;
        }
        self.bus.emit(&CollectionEvent::NodesRemoved {
            parent,
            indices,
            removed,
        });
    }

    fn send_payload_changed(&mut self, node: NodeId, change: PayloadChange) {
        if self.suppress {
            return;
        }
        self.bus.emit(&CollectionEvent::PayloadChanged { node, change });
        self.bus.emit(&CollectionEvent::NodeChanged { node });
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// All mutation funnels through this check: the collection belongs to
    /// the thread that created it, and workers hand results over instead of
    /// reaching in.
    pub(crate) fn ensure_controller_thread(&self) -> Result<(), TreeError> {
        if thread::current().id() == self.owner {
            Ok(())
        } else {
            warn!("collection touched from a non-controller thread");
            Err(TreeError::OffControllerThread)
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[&id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(&id).expect("stale NodeId")
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{picture, record_events};

    #[test]
    fn new_collection_has_a_root_group() {
        let collection = Collection::new();
        let root = collection.root();
        assert!(collection.payload(root).is_group());
        assert_eq!(collection.child_count(root), 0);
        assert!(!collection.is_dirty());
    }

    #[test]
    fn add_child_appends_and_notifies() {
        let mut collection = Collection::new();
        let root = collection.root();
        let events = record_events(&mut collection);

        let group = collection.add_group(root, "Holidays").unwrap();
        assert_eq!(collection.children_of(root), &[group]);
        assert_eq!(collection.parent_of(group), Some(root));
        assert!(collection.is_dirty());
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[CollectionEvent::NodesInserted {
                parent: root,
                indices: vec![0],
            }]
        );
    }

    #[test]
    fn pictures_refuse_children() {
        let mut collection = Collection::new();
        let root = collection.root();
        let pic = collection.add_picture(root, picture("beach")).unwrap();
        let other = collection.create_picture(picture("mountain"));
        assert_eq!(
            collection.add_child(pic, other),
            Err(TreeError::ChildrenNotAllowed)
        );
        assert_eq!(collection.child_count(pic), 0);
    }

    #[test]
    fn root_cannot_become_a_child() {
        let mut collection = Collection::new();
        let root = collection.root();
        let group = collection.add_group(root, "Holidays").unwrap();
        assert_eq!(
            collection.add_child(group, root),
            Err(TreeError::RootImmutable)
        );
    }

    #[test]
    fn inserting_under_own_descendant_is_refused() {
        let mut collection = Collection::new();
        let root = collection.root();
        let outer = collection.add_group(root, "outer").unwrap();
        let inner = collection.add_group(outer, "inner").unwrap();
        assert_eq!(
            collection.add_child(inner, outer),
            Err(TreeError::MoveIntoDescendant)
        );
        // Tree unchanged.
        assert_eq!(collection.parent_of(outer), Some(root));
        assert_eq!(collection.children_of(inner), &[] as &[NodeId]);
    }

    #[test]
    fn insert_child_validates_index() {
        let mut collection = Collection::new();
        let root = collection.root();
        collection.add_group(root, "a").unwrap();
        let b = collection.create_group("b");
        assert_eq!(
            collection.insert_child(root, b, 2),
            Err(TreeError::IndexOutOfBounds { index: 2, len: 1 })
        );
        collection.insert_child(root, b, 0).unwrap();
        assert_eq!(collection.index_in_parent(b), Some(0));
    }

    #[test]
    fn detach_on_orphan_is_a_logged_noop() {
        let mut collection = Collection::new();
        let loose = collection.create_group("loose");
        assert_eq!(collection.detach(loose), Ok(false));
        assert!(collection.contains(loose));
    }

    #[test]
    fn detach_reports_removed_payload() {
        let mut collection = Collection::new();
        let root = collection.root();
        let pic = collection.add_picture(root, picture("beach")).unwrap();
        let events = record_events(&mut collection);

        assert_eq!(collection.detach(pic), Ok(true));
        let log = events.lock().unwrap();
        match &log[0] {
            CollectionEvent::NodesRemoved {
                parent,
                indices,
                removed,
            } => {
                assert_eq!(*parent, root);
                assert_eq!(indices, &[0]);
                assert_eq!(removed[0].display_label(), "beach");
            }
            other => panic!("expected NodesRemoved, got {other:?}"),
        }
    }

    #[test]
    fn delete_removes_the_whole_subtree() {
        let mut collection = Collection::new();
        let root = collection.root();
        let group = collection.add_group(root, "Holidays").unwrap();
        let pic = collection.add_picture(group, picture("beach")).unwrap();

        collection.delete(group).unwrap();
        assert!(!collection.contains(group));
        assert!(!collection.contains(pic));
        assert_eq!(collection.child_count(root), 0);
    }

    #[test]
    fn delete_root_is_refused() {
        let mut collection = Collection::new();
        let root = collection.root();
        assert_eq!(collection.delete(root), Err(TreeError::RootImmutable));
        assert!(collection.contains(root));
    }

    #[test]
    fn delete_purges_recent_drop_targets() {
        let mut collection = Collection::new();
        let root = collection.root();
        let group = collection.add_group(root, "Holidays").unwrap();
        let nested = collection.add_group(group, "Beach trip").unwrap();
        collection.remember_drop_target(nested);
        collection.remember_drop_target(group);
        assert_eq!(collection.recent_drop_targets(), &[group, nested]);

        collection.delete(group).unwrap();
        assert!(collection.recent_drop_targets().is_empty());
    }

    #[test]
    fn clone_subtree_is_deep_and_independent() {
        let mut collection = Collection::new();
        let root = collection.root();
        let group = collection.add_group(root, "Holidays").unwrap();
        let pic = collection.add_picture(group, picture("beach")).unwrap();

        let copy = collection.clone_subtree(group);
        assert!(collection.parent_of(copy).is_none());
        assert_eq!(collection.child_count(copy), 1);

        let copied_pic = collection.children_of(copy)[0];
        collection
            .edit_picture(copied_pic, |p| p.set_description("edited"))
            .unwrap();
        assert_eq!(
            collection.payload(pic).as_picture().unwrap().description(),
            "beach"
        );
    }

    #[test]
    fn edit_picture_emits_field_and_node_events() {
        let mut collection = Collection::new();
        let root = collection.root();
        let pic = collection.add_picture(root, picture("beach")).unwrap();
        let events = record_events(&mut collection);

        let changed = collection
            .edit_picture(pic, |p| p.set_rotation(370.0))
            .unwrap();
        assert!(changed);
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[
                CollectionEvent::PayloadChanged {
                    node: pic,
                    change: PayloadChange::Rotation,
                },
                CollectionEvent::NodeChanged { node: pic },
            ]
        );

        // Same value again: no events, no change.
        events.lock().unwrap().clear();
        let changed = collection
            .edit_picture(pic, |p| p.set_rotation(10.0))
            .unwrap();
        assert!(!changed);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn edit_picture_on_a_group_is_refused() {
        let mut collection = Collection::new();
        let root = collection.root();
        assert_eq!(
            collection.edit_picture(root, |p| p.set_description("x")),
            Err(TreeError::NotAPicture)
        );
    }

    #[test]
    fn suppression_silences_events_and_dirty() {
        let mut collection = Collection::new();
        let root = collection.root();
        let events = record_events(&mut collection);

        collection.set_suppress_notifications(true);
        let group = collection.add_group(root, "loaded").unwrap();
        collection
            .edit_group(group, |g| g.set_name("renamed while loading"))
            .unwrap();
        collection.set_suppress_notifications(false);

        assert!(events.lock().unwrap().is_empty());
        assert!(!collection.is_dirty());
        assert_eq!(collection.child_count(root), 1);
    }

    #[test]
    fn category_dictionary_round_trip() {
        let mut collection = Collection::new();
        collection.add_category(1, "Landscape");
        let auto = collection.add_category_auto("People");
        assert_eq!(auto, 2);
        assert_eq!(collection.get_category(1), Some("Landscape"));
        collection.rename_category(1, "Scenery");
        assert_eq!(collection.get_category(1), Some("Scenery"));
        assert_eq!(collection.remove_category(1), Some("Scenery".to_string()));
        assert_eq!(collection.get_category(1), None);
        let mut ids = collection.category_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn removing_a_category_leaves_assignments_stale() {
        let mut collection = Collection::new();
        let root = collection.root();
        collection.add_category(7, "Birds");
        let pic = collection.add_picture(root, picture("heron")).unwrap();
        collection.edit_picture(pic, |p| p.add_category(7)).unwrap();

        collection.remove_category(7);
        // Documented gap: the assignment survives the dictionary entry.
        assert!(
            collection
                .payload(pic)
                .as_picture()
                .unwrap()
                .contains_category(7)
        );
    }

    #[test]
    fn checksum_duplicates_are_found_anywhere_in_the_tree() {
        let mut collection = Collection::new();
        let root = collection.root();
        let group = collection.add_group(root, "deep").unwrap();
        let mut payload = picture("beach");
        payload.set_checksum(Some(0xDEAD));
        collection.add_picture(group, payload).unwrap();

        assert!(collection.is_duplicate_checksum(0xDEAD));
        assert!(!collection.is_duplicate_checksum(0xBEEF));
    }

    #[test]
    fn recent_drop_targets_dedupe_and_cap() {
        let mut collection = Collection::new();
        let root = collection.root();
        let groups: Vec<_> = (0..8)
            .map(|i| collection.add_group(root, format!("g{i}")).unwrap())
            .collect();
        for g in &groups {
            collection.remember_drop_target(*g);
        }
        // Re-remembering moves to the front instead of duplicating.
        collection.remember_drop_target(groups[5]);
        let recent = collection.recent_drop_targets();
        assert_eq!(recent.len(), 6);
        assert_eq!(recent[0], groups[5]);
        assert_eq!(collection.last_drop_target(), Some(groups[5]));
    }

    #[test]
    fn mutation_from_another_thread_is_refused() {
        let mut collection = Collection::new();
        let root = collection.root();
        std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    assert_eq!(
                        collection.add_group(root, "intruder"),
                        Err(TreeError::OffControllerThread)
                    );
                })
                .join()
                .unwrap();
        });
        assert_eq!(collection.child_count(root), 0);
    }
}
