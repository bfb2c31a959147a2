//! Rearranging nodes: sibling reordering, indent/outdent, arbitrary moves.
//!
//! Every operation here is detach-and-reinsert under the hood, so listeners
//! see a `NodesRemoved` followed by a `NodesInserted` — the delta a tree
//! panel needs to animate a row move.
//!
//! ## The same-parent index offset
//!
//! Moving a node to a later slot among its own siblings has a classic
//! off-by-one: the caller names the destination in pre-removal indices, but
//! by the time the node is reinserted its removal has shifted everything
//! after it down by one. [`move_to_index`] is the single place that
//! corrects for this (destination minus one, only when staying under the
//! same parent and moving toward the back); `move_before`, the drag-and-drop
//! placements and the menu-driven reorders all route through it.
//!
//! [`move_to_index`]: Collection::move_to_index

use crate::collection::{Collection, NodeId, TreeError};
use tracing::{debug, warn};

/// Name for groups synthesized by [`Collection::indent`] when no preceding
/// group sibling exists.
pub const NEW_GROUP_NAME: &str = "New Group";

impl Collection {
    // =====================================================================
    // Reordering within the parent
    // =====================================================================

    /// Moves the node to the first slot of its parent. No-op on the root,
    /// on detached nodes, and on nodes already at the top.
    pub fn move_to_top(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        let Some((parent, index)) = self.attached_position(id) else {
            return Ok(());
        };
        if index == 0 {
            return Ok(());
        }
        self.detach_inner(id);
        self.insert_child(parent, id, 0)
    }

    /// Swaps the node one slot toward the front.
    pub fn move_up(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        let Some((parent, index)) = self.attached_position(id) else {
            return Ok(());
        };
        if index == 0 {
            return Ok(());
        }
        self.detach_inner(id);
        self.insert_child(parent, id, index - 1)
    }

    /// Swaps the node one slot toward the back.
    pub fn move_down(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        let Some((parent, index)) = self.attached_position(id) else {
            return Ok(());
        };
        if index + 1 == self.child_count(parent) {
            return Ok(());
        }
        self.detach_inner(id);
        self.insert_child(parent, id, index + 1)
    }

    /// Moves the node to the last slot of its parent.
    pub fn move_to_bottom(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        let Some((parent, index)) = self.attached_position(id) else {
            return Ok(());
        };
        if index + 1 == self.child_count(parent) {
            return Ok(());
        }
        self.detach_inner(id);
        let last = self.child_count(parent);
        self.insert_child(parent, id, last)
    }

    // =====================================================================
    // Indent / outdent
    // =====================================================================

    /// Makes the node a child of its nearest preceding group sibling. When
    /// no preceding sibling is a group, a fresh one named
    /// [`NEW_GROUP_NAME`] is created at the front of the sibling list and
    /// the node moves into it. No-op on the root.
    pub fn indent(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        let Some((parent, index)) = self.attached_position(id) else {
            return Ok(());
        };
        let preceding_group = self.children_of(parent)[..index]
            .iter()
            .rev()
            .copied()
            .find(|&sibling| self.payload(sibling).is_group());

        match preceding_group {
            Some(group) => {
                self.detach_inner(id);
                self.add_child(group, id)
            }
            None => {
                let group = self.create_group(NEW_GROUP_NAME);
                self.insert_child(parent, group, 0)?;
                self.detach_inner(id);
                self.add_child(group, id)
            }
        }
    }

    /// Moves the node out of its parent, to the slot right after the
    /// parent, under the grandparent. No-op when the parent is the root —
    /// there is nothing above the root's children level to outdent to.
    pub fn outdent(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        let Some((parent, _)) = self.attached_position(id) else {
            return Ok(());
        };
        if self.is_root(parent) {
            return Ok(());
        }
        let grandparent = self
            .parent_of(parent)
            .expect("non-root parent must itself have a parent");
        let parent_index = self
            .index_in_parent(parent)
            .expect("attached node has an index");
        self.detach_inner(id);
        self.insert_child(grandparent, id, parent_index + 1)
    }

    // =====================================================================
    // Arbitrary moves
    // =====================================================================

    /// Moves the node under `new_parent` at `index`, where `index` counts
    /// the children as they are *before* the node detaches. This is the one
    /// shared home of the same-parent `-1` offset (see module docs).
    ///
    /// Fails without mutating when the move would create a cycle, when the
    /// node is the root, when `new_parent` is a picture, or when `index` is
    /// out of range.
    pub fn move_to_index(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        index: usize,
    ) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        if self.is_root(id) {
            return Err(TreeError::RootImmutable);
        }
        if self.is_ancestor_or_self(id, new_parent) {
            return Err(TreeError::MoveIntoDescendant);
        }
        if !self.payload(new_parent).is_group() {
            return Err(TreeError::ChildrenNotAllowed);
        }
        let same_parent = self.parent_of(id) == Some(new_parent);
        let destination = match self.index_in_parent(id) {
            // Removal shifts later siblings down one, so a move toward the
            // back lands one slot early unless corrected.
            Some(current) if same_parent && current < index => index - 1,
            _ => index,
        };
        debug!(?id, ?new_parent, index, destination, "moving node");
        self.insert_child(new_parent, id, destination)
    }

    /// Moves the node into the slot just before `target`, among `target`'s
    /// siblings. Nothing may be placed before the root.
    pub fn move_before(&mut self, id: NodeId, target: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        if self.is_ancestor_or_self(id, target) {
            return Err(TreeError::MoveIntoDescendant);
        }
        if self.is_root(target) {
            return Err(TreeError::BeforeRoot);
        }
        let Some((parent, index)) = self.attached_position(target) else {
            warn!(?target, "move_before with a detached target, ignoring");
            return Ok(());
        };
        self.move_to_index(id, parent, index)
    }

    /// Appends the node as the last child of `target`. Rejected when the
    /// node is the root or when `target` cannot hold children.
    pub fn move_to_last_child(&mut self, id: NodeId, target: NodeId) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        if !self.payload(target).is_group() {
            return Err(TreeError::ChildrenNotAllowed);
        }
        self.add_child(target, id)
    }

    /// `(parent, index)` for attached non-root nodes; `None` (logged) for
    /// the root and for detached nodes, which the reorder operations treat
    /// as a quiet no-op.
    fn attached_position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        if self.is_root(id) {
            return None;
        }
        match (self.parent_of(id), self.index_in_parent(id)) {
            (Some(parent), Some(index)) => Some((parent, index)),
            _ => {
                debug!(?id, "reorder requested for a detached node, ignoring");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{labels, picture};

    /// Root with three picture children labelled a, b, c.
    fn abc() -> (Collection, NodeId, NodeId, NodeId) {
        let mut collection = Collection::new();
        let root = collection.root();
        let a = collection.add_picture(root, picture("a")).unwrap();
        let b = collection.add_picture(root, picture("b")).unwrap();
        let c = collection.add_picture(root, picture("c")).unwrap();
        (collection, a, b, c)
    }

    #[test]
    fn reorder_within_parent() {
        let (mut collection, _a, _b, c) = abc();
        let root = collection.root();

        collection.move_to_top(c).unwrap();
        assert_eq!(labels(&collection, root), ["c", "a", "b"]);
        collection.move_down(c).unwrap();
        assert_eq!(labels(&collection, root), ["a", "c", "b"]);
        collection.move_up(c).unwrap();
        assert_eq!(labels(&collection, root), ["c", "a", "b"]);
        collection.move_to_bottom(c).unwrap();
        assert_eq!(labels(&collection, root), ["a", "b", "c"]);
    }

    #[test]
    fn reorder_at_the_bounds_is_a_noop() {
        let (mut collection, a, _b, c) = abc();
        let root = collection.root();
        collection.move_to_top(a).unwrap();
        collection.move_up(a).unwrap();
        collection.move_down(c).unwrap();
        collection.move_to_bottom(c).unwrap();
        assert_eq!(labels(&collection, root), ["a", "b", "c"]);
        // The root itself is immovable but not an error.
        collection.move_to_top(root).unwrap();
    }

    #[test]
    fn move_toward_the_back_applies_the_offset() {
        // [a, b, c]: moving a to just before c must yield [b, a, c] — the
        // naive pre-removal index would land it after c instead.
        let (mut collection, a, _b, c) = abc();
        let root = collection.root();
        collection.move_before(a, c).unwrap();
        assert_eq!(labels(&collection, root), ["b", "a", "c"]);
    }

    #[test]
    fn move_toward_the_front_needs_no_offset() {
        let (mut collection, a, _b, c) = abc();
        let root = collection.root();
        collection.move_before(c, a).unwrap();
        assert_eq!(labels(&collection, root), ["c", "a", "b"]);
    }

    #[test]
    fn move_to_index_into_another_group() {
        let (mut collection, a, _b, _c) = abc();
        let root = collection.root();
        let group = collection.add_group(root, "album").unwrap();
        collection.move_to_index(a, group, 0).unwrap();
        assert_eq!(collection.parent_of(a), Some(group));
        assert_eq!(labels(&collection, root), ["b", "c", "album"]);
    }

    #[test]
    fn move_into_own_subtree_is_refused_without_mutation() {
        let mut collection = Collection::new();
        let root = collection.root();
        let outer = collection.add_group(root, "outer").unwrap();
        let inner = collection.add_group(outer, "inner").unwrap();

        assert_eq!(
            collection.move_to_index(outer, inner, 0),
            Err(TreeError::MoveIntoDescendant)
        );
        assert_eq!(
            collection.move_to_index(outer, outer, 0),
            Err(TreeError::MoveIntoDescendant)
        );
        assert_eq!(collection.parent_of(outer), Some(root));
        assert_eq!(collection.children_of(outer), &[inner]);
    }

    #[test]
    fn nothing_moves_before_the_root() {
        let (mut collection, a, _b, _c) = abc();
        let root = collection.root();
        assert_eq!(collection.move_before(a, root), Err(TreeError::BeforeRoot));
        assert_eq!(labels(&collection, root), ["a", "b", "c"]);
    }

    #[test]
    fn move_to_last_child_rejects_root_and_pictures() {
        let (mut collection, a, b, _c) = abc();
        let root = collection.root();
        assert_eq!(
            collection.move_to_last_child(root, root),
            Err(TreeError::RootImmutable)
        );
        assert_eq!(
            collection.move_to_last_child(a, b),
            Err(TreeError::ChildrenNotAllowed)
        );
        assert_eq!(labels(&collection, root), ["a", "b", "c"]);
    }

    #[test]
    fn indent_into_preceding_group() {
        let mut collection = Collection::new();
        let root = collection.root();
        let album = collection.add_group(root, "album").unwrap();
        let pic = collection.add_picture(root, picture("stray")).unwrap();

        collection.indent(pic).unwrap();
        assert_eq!(collection.parent_of(pic), Some(album));
        assert_eq!(labels(&collection, root), ["album"]);
    }

    #[test]
    fn indent_skips_non_group_siblings() {
        let mut collection = Collection::new();
        let root = collection.root();
        let album = collection.add_group(root, "album").unwrap();
        collection.add_picture(root, picture("between")).unwrap();
        let pic = collection.add_picture(root, picture("stray")).unwrap();

        collection.indent(pic).unwrap();
        assert_eq!(collection.parent_of(pic), Some(album));
    }

    #[test]
    fn indent_synthesizes_a_group_when_none_precedes() {
        let (mut collection, _a, b, _c) = abc();
        let root = collection.root();

        collection.indent(b).unwrap();
        // The new group appears at the front of the sibling list.
        let group = collection.children_of(root)[0];
        assert_eq!(
            collection.payload(group).as_group().unwrap().name(),
            NEW_GROUP_NAME
        );
        assert_eq!(collection.parent_of(b), Some(group));
        assert_eq!(labels(&collection, root), [NEW_GROUP_NAME, "a", "c"]);
    }

    #[test]
    fn outdent_places_node_after_its_old_parent() {
        let mut collection = Collection::new();
        let root = collection.root();
        let album = collection.add_group(root, "album").unwrap();
        let after = collection.add_group(root, "after").unwrap();
        let pic = collection.add_picture(album, picture("escapee")).unwrap();

        collection.outdent(pic).unwrap();
        assert_eq!(collection.parent_of(pic), Some(root));
        assert_eq!(labels(&collection, root), ["album", "escapee", "after"]);
        let _ = after;
    }

    #[test]
    fn outdent_from_root_level_is_a_noop() {
        let (mut collection, a, _b, _c) = abc();
        let root = collection.root();
        collection.outdent(a).unwrap();
        assert_eq!(labels(&collection, root), ["a", "b", "c"]);
    }
}
