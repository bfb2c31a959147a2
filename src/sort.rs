//! Sorting a group's children.
//!
//! The comparator is a pure function of two payloads and an explicit
//! [`SortCriterion`] — no shared "current sort field" state, so concurrent
//! or re-entrant sorts can never clobber each other's comparison rules.
//!
//! ## Comparison rules
//!
//! Pictures compare by the selected field's text, falling back to the
//! description. Groups only have a name, so they participate meaningfully
//! only in [`Description`](SortCriterion::Description) sorts (name against
//! name, or name against a picture's description); under any other
//! criterion a pair involving a group compares as equal, and the stable
//! sort leaves those nodes where they were.
//!
//! ## One event, not n
//!
//! Reordering n children is announced as a single
//! [`StructureChanged`](crate::event::CollectionEvent::StructureChanged)
//! on the parent. Emitting per-child remove/insert pairs would make every
//! attached view repaint n times for what is one logical change; the
//! batching is part of the contract, not an optimization to drop.

use crate::collection::{Collection, NodeId, TreeError};
use crate::payload::Payload;
use std::cmp::Ordering;

/// Which field to sort a group's children by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriterion {
    /// No meaningful field selected; pictures fall back to description.
    Unsorted,
    Description,
    FilmReference,
    CreationTime,
    Comment,
    Photographer,
    CopyrightHolder,
}

/// Compares two payloads under `criterion`. Total over pictures; pairs
/// involving a group are `Equal` except under `Description`.
pub fn compare_payloads(a: &Payload, b: &Payload, criterion: SortCriterion) -> Ordering {
    use SortCriterion::*;
    match (a, b) {
        (Payload::Group(x), Payload::Group(y)) if criterion == Description => {
            x.name().cmp(y.name())
        }
        (Payload::Group(x), Payload::Picture(y)) if criterion == Description => {
            x.name().cmp(y.description())
        }
        (Payload::Picture(x), Payload::Group(y)) if criterion == Description => {
            x.description().cmp(y.name())
        }
        // Groups have no film reference, creation time, etc. — incomparable,
        // so the stable sort keeps them in place.
        (Payload::Group(_), _) | (_, Payload::Group(_)) => Ordering::Equal,
        (Payload::Picture(x), Payload::Picture(y)) => match criterion {
            FilmReference => x.film_reference().cmp(y.film_reference()),
            CreationTime => x.creation_time().cmp(y.creation_time()),
            Comment => x.comment().cmp(y.comment()),
            Photographer => x.photographer().cmp(y.photographer()),
            CopyrightHolder => x.copyright_holder().cmp(y.copyright_holder()),
            Unsorted | Description => x.description().cmp(y.description()),
        },
    }
}

impl Collection {
    /// Sorts the children of `id` by `criterion`, stably: ties and
    /// incomparable pairs keep their relative order, so sorting twice gives
    /// the same result as sorting once.
    pub fn sort_children(
        &mut self,
        id: NodeId,
        criterion: SortCriterion,
    ) -> Result<(), TreeError> {
        self.ensure_controller_thread()?;
        let mut order: Vec<NodeId> = self.children_of(id).to_vec();
        order.sort_by(|&x, &y| compare_payloads(self.payload(x), self.payload(y), criterion));
        // A permutation of the same child set: parent pointers are
        // untouched, so the teardown-and-reinsert collapses to one
        // assignment and listeners get exactly one coarse event.
        self.node_mut(id).children = order;
        self.mark_dirty();
        self.send_structure_changed(id);
        Ok(())
    }
}
