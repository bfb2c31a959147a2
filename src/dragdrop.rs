//! Drag-and-drop reconciliation.
//!
//! A drop is a deterministic decision over three inputs: what kind of
//! payload is being dragged, what kind it lands on, and whether the gesture
//! is a move or a copy:
//!
//! | source  | target        | effect                                        |
//! |---------|---------------|-----------------------------------------------|
//! | picture | group         | append as last child (copy: append a clone)   |
//! | picture | picture       | insert just before the target sibling         |
//! | group   | root          | insert as the root's first child              |
//! | group   | anything else | ambiguous — the caller's chooser decides      |
//!
//! The ambiguous case is the interesting one: dropping a group onto another
//! group could reasonably mean "before it", "after it", or "into it". The
//! core never guesses. It hands the `(source, target)` pair to the
//! caller-supplied chooser — a popup menu in the UI, a closure in tests —
//! which answers with a [`Placement`]. [`legal_placements`] enumerates what
//! the chooser may answer for a given target.
//!
//! ## Multi-node drops
//!
//! Several selected nodes dropped together are validated together first —
//! if any of them is the root or an ancestor of the target, the *whole*
//! drop is refused before anything moves — and then applied one at a time
//! through the single-node operations of [`crate::arrange`].
//!
//! As a side effect the drop target's group lands at the front of the
//! collection's recent-drop-targets list, which the UI reuses for
//! "move to recent group" shortcuts.
//!
//! [`legal_placements`]: Collection::legal_placements

use crate::collection::{Collection, NodeId, TreeError};
use tracing::{debug, info};

/// Whether a drag gesture moves the original nodes or inserts clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    Move,
    Copy,
}

/// Where an ambiguous group drop should land, relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
    FirstChild,
    LastChild,
    Cancel,
}

impl Collection {
    /// The placements a chooser may legally answer for this target:
    /// everything for a group target, only the sibling placements for a
    /// picture target (pictures cannot hold children).
    pub fn legal_placements(&self, target: NodeId) -> Vec<Placement> {
        if self.payload(target).is_group() {
            vec![
                Placement::Before,
                Placement::After,
                Placement::FirstChild,
                Placement::LastChild,
                Placement::Cancel,
            ]
        } else {
            vec![Placement::Before, Placement::After, Placement::Cancel]
        }
    }

    /// Applies a drop of `sources` onto `target`.
    ///
    /// `choose` is consulted once per group source landing on a non-root
    /// target; it must answer with one of [`legal_placements`] for that
    /// target (`Cancel` skips the source). Move/copy only distinguishes
    /// picture sources — a group drop always relocates the original, as a
    /// group gesture in the tree always has.
    ///
    /// [`legal_placements`]: Self::legal_placements
    pub fn execute_drop(
        &mut self,
        sources: &[NodeId],
        target: NodeId,
        action: DropAction,
        choose: &mut dyn FnMut(&Collection, NodeId, NodeId) -> Placement,
    ) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;

        // Validate the whole batch before touching anything: a failed drop
        // must leave the tree exactly as it was.
        for &source in sources {
            if self.is_root(source) {
                info!("drop includes the root node, refusing");
                return Err(TreeError::RootImmutable);
            }
            if self.is_ancestor_or_self(source, target) {
                info!(?source, ?target, "drop target sits inside a dragged subtree, refusing");
                return Err(TreeError::MoveIntoDescendant);
            }
        }

        self.memorize_drop_group(target);

        for &source in sources {
            let source_is_picture = self.payload(source).is_picture();
            let target_is_group = self.payload(target).is_group();
            match (source_is_picture, target_is_group) {
                (true, true) => match action {
                    DropAction::Move => self.move_to_last_child(source, target)?,
                    DropAction::Copy => {
                        let copy = self.clone_subtree(source);
                        self.add_child(target, copy)?;
                    }
                },
                (true, false) => self.drop_picture_on_picture(source, target, action)?,
                (false, _) => {
                    if self.is_root(target) {
                        // The one unambiguous group drop: first child of
                        // the root.
                        self.move_to_index(source, target, 0)?;
                    } else {
                        self.drop_group_with_choice(source, target, choose)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn drop_picture_on_picture(
        &mut self,
        source: NodeId,
        target: NodeId,
        action: DropAction,
    ) -> Result<(), TreeError> {
        match action {
            DropAction::Move => self.move_before(source, target),
            DropAction::Copy => {
                let Some(parent) = self.parent_of(target) else {
                    debug!(?target, "copy-drop on a detached picture, ignoring");
                    return Ok(());
                };
                let index = self
                    .index_in_parent(target)
                    .expect("attached node has an index");
                let copy = self.clone_subtree(source);
                self.insert_child(parent, copy, index)
            }
        }
    }

    fn drop_group_with_choice(
        &mut self,
        source: NodeId,
        target: NodeId,
        choose: &mut dyn FnMut(&Collection, NodeId, NodeId) -> Placement,
    ) -> Result<(), TreeError> {
        match choose(&*self, source, target) {
            Placement::Before => self.move_before(source, target),
            Placement::After => {
                let Some(parent) = self.parent_of(target) else {
                    debug!(?target, "after-drop on a detached target, ignoring");
                    return Ok(());
                };
                let index = self
                    .index_in_parent(target)
                    .expect("attached node has an index");
                self.move_to_index(source, parent, index + 1)
            }
            Placement::FirstChild => self.move_to_index(source, target, 0),
            Placement::LastChild => self.move_to_last_child(source, target),
            Placement::Cancel => {
                debug!(?source, "group drop cancelled by chooser");
                Ok(())
            }
        }
    }

    /// Records the group of the drop location: the target itself when it is
    /// a group, otherwise the target's parent group.
    fn memorize_drop_group(&mut self, target: NodeId) {
        if self.payload(target).is_group() {
            self.remember_drop_target(target);
        } else if let Some(parent) = self.parent_of(target) {
            self.remember_drop_target(parent);
        } else {
            info!(?target, "no group at the drop location, nothing to memorize");
        }
    }
}
