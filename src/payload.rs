//! Node payloads: what a tree node carries.
//!
//! Every node in a collection holds exactly one [`Payload`] — either a
//! [`GroupPayload`] (a named folder of other nodes) or a [`PicturePayload`]
//! (one image and its metadata). The variant decides structural legality:
//! only group nodes may have children.
//!
//! ## Change tracking
//!
//! Field mutators follow one contract throughout: writing a value equal to
//! the current one is a no-op and returns `None`; an actual change updates
//! the field and returns the matching [`PayloadChange`] so the owning
//! [`Collection`](crate::collection::Collection) can fan it out to listeners
//! and mark itself dirty. The payload types themselves know nothing about
//! listeners — they are plain data, which keeps them trivially testable.
//!
//! ## Hydration setters
//!
//! The `*_from_str` setters exist for loaders that read metadata as raw
//! text. They parse leniently: a malformed rotation resets to `0`, a
//! malformed checksum to unset, a malformed geo-tag to unset — each with a
//! logged diagnostic — and hydration of the rest of the collection carries
//! on. A loader failure never poisons fields it didn't touch.

use crate::event::PayloadChange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// A latitude/longitude pair attached to a picture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTag {
    pub lat: f64,
    pub lng: f64,
}

/// What a node carries: a group of other nodes, or a single picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Group(GroupPayload),
    Picture(PicturePayload),
}

impl Payload {
    pub fn is_group(&self) -> bool {
        matches!(self, Payload::Group(_))
    }

    pub fn is_picture(&self) -> bool {
        matches!(self, Payload::Picture(_))
    }

    pub fn as_group(&self) -> Option<&GroupPayload> {
        match self {
            Payload::Group(g) => Some(g),
            Payload::Picture(_) => None,
        }
    }

    pub fn as_picture(&self) -> Option<&PicturePayload> {
        match self {
            Payload::Group(_) => None,
            Payload::Picture(p) => Some(p),
        }
    }

    pub(crate) fn as_group_mut(&mut self) -> Option<&mut GroupPayload> {
        match self {
            Payload::Group(g) => Some(g),
            Payload::Picture(_) => None,
        }
    }

    pub(crate) fn as_picture_mut(&mut self) -> Option<&mut PicturePayload> {
        match self {
            Payload::Group(_) => None,
            Payload::Picture(p) => Some(p),
        }
    }

    /// The one-line label a tree display shows: the group name or the
    /// picture description.
    pub fn display_label(&self) -> &str {
        match self {
            Payload::Group(g) => g.name(),
            Payload::Picture(p) => p.description(),
        }
    }
}

/// The payload of a group node: a display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupPayload {
    name: String,
}

impl GroupPayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the group. Equal values are a no-op.
    pub fn set_name(&mut self, name: impl Into<String>) -> Option<PayloadChange> {
        set_text(&mut self.name, name.into(), PayloadChange::GroupName)
    }
}

/// The payload of a picture node: where the image lives and everything the
/// collection knows about it.
///
/// All text fields default to empty strings rather than options — the
/// metadata these collections are hydrated from treats "absent" and
/// "empty" as the same thing, and comparisons during sorting want plain
/// string ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PicturePayload {
    location: String,
    description: String,
    checksum: Option<u64>,
    rotation: f64,
    geo_tag: Option<GeoTag>,
    categories: BTreeSet<u32>,
    comment: String,
    photographer: String,
    copyright_holder: String,
    creation_time: String,
    film_reference: String,
}

/// Shared no-op-on-equal text setter.
fn set_text(field: &mut String, new: String, change: PayloadChange) -> Option<PayloadChange> {
    if *field == new {
        return None;
    }
    *field = new;
    Some(change)
}

impl PicturePayload {
    /// A payload pointing at `location` with an empty description.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The stored file checksum, or `None` when it was never computed.
    pub fn checksum(&self) -> Option<u64> {
        self.checksum
    }

    /// Display rotation in degrees, always within `[0, 360)`.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn geo_tag(&self) -> Option<GeoTag> {
        self.geo_tag
    }

    pub fn categories(&self) -> &BTreeSet<u32> {
        &self.categories
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn photographer(&self) -> &str {
        &self.photographer
    }

    pub fn copyright_holder(&self) -> &str {
        &self.copyright_holder
    }

    pub fn creation_time(&self) -> &str {
        &self.creation_time
    }

    pub fn film_reference(&self) -> &str {
        &self.film_reference
    }

    // ---------------------------------------------------------------------
    // Mutators — no-op on equal value, `Some(change)` otherwise
    // ---------------------------------------------------------------------

    pub fn set_location(&mut self, location: impl Into<String>) -> Option<PayloadChange> {
        set_text(&mut self.location, location.into(), PayloadChange::ImageLocation)
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Option<PayloadChange> {
        set_text(&mut self.description, description.into(), PayloadChange::Description)
    }

    pub fn set_checksum(&mut self, checksum: Option<u64>) -> Option<PayloadChange> {
        if self.checksum == checksum {
            return None;
        }
        self.checksum = checksum;
        Some(PayloadChange::Checksum)
    }

    /// Sets the display rotation, wrapping into `[0, 360)`: `370` stores as
    /// `10`, `-90` as `270`. Equal-after-wrapping values are a no-op.
    pub fn set_rotation(&mut self, degrees: f64) -> Option<PayloadChange> {
        let wrapped = degrees.rem_euclid(360.0);
        if self.rotation == wrapped {
            return None;
        }
        self.rotation = wrapped;
        Some(PayloadChange::Rotation)
    }

    /// Rotates by `delta` degrees relative to the current rotation.
    pub fn rotate(&mut self, delta: f64) -> Option<PayloadChange> {
        self.set_rotation(self.rotation + delta)
    }

    pub fn set_geo_tag(&mut self, geo_tag: Option<GeoTag>) -> Option<PayloadChange> {
        if self.geo_tag == geo_tag {
            return None;
        }
        self.geo_tag = geo_tag;
        Some(PayloadChange::GeoTag)
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> Option<PayloadChange> {
        set_text(&mut self.comment, comment.into(), PayloadChange::Comment)
    }

    pub fn set_photographer(&mut self, photographer: impl Into<String>) -> Option<PayloadChange> {
        set_text(&mut self.photographer, photographer.into(), PayloadChange::Photographer)
    }

    pub fn set_copyright_holder(&mut self, holder: impl Into<String>) -> Option<PayloadChange> {
        set_text(&mut self.copyright_holder, holder.into(), PayloadChange::CopyrightHolder)
    }

    pub fn set_creation_time(&mut self, time: impl Into<String>) -> Option<PayloadChange> {
        set_text(&mut self.creation_time, time.into(), PayloadChange::CreationTime)
    }

    pub fn set_film_reference(&mut self, reference: impl Into<String>) -> Option<PayloadChange> {
        set_text(&mut self.film_reference, reference.into(), PayloadChange::FilmReference)
    }

    // ---------------------------------------------------------------------
    // Category assignments
    // ---------------------------------------------------------------------

    /// Adds a category id. Already-assigned ids are a no-op.
    pub fn add_category(&mut self, id: u32) -> Option<PayloadChange> {
        if self.categories.insert(id) {
            Some(PayloadChange::CategoryAssignments)
        } else {
            None
        }
    }

    /// Removes a category id if assigned.
    pub fn remove_category(&mut self, id: u32) -> Option<PayloadChange> {
        if self.categories.remove(&id) {
            Some(PayloadChange::CategoryAssignments)
        } else {
            None
        }
    }

    /// Replaces all category assignments.
    pub fn set_categories(
        &mut self,
        ids: impl IntoIterator<Item = u32>,
    ) -> Option<PayloadChange> {
        let new: BTreeSet<u32> = ids.into_iter().collect();
        if self.categories == new {
            return None;
        }
        self.categories = new;
        Some(PayloadChange::CategoryAssignments)
    }

    pub fn clear_categories(&mut self) -> Option<PayloadChange> {
        if self.categories.is_empty() {
            return None;
        }
        self.categories.clear();
        Some(PayloadChange::CategoryAssignments)
    }

    pub fn contains_category(&self, id: u32) -> bool {
        self.categories.contains(&id)
    }

    // ---------------------------------------------------------------------
    // Hydration setters — lenient parsing with documented fallbacks
    // ---------------------------------------------------------------------

    /// Parses a rotation from text. Malformed input resets the rotation to
    /// `0` and logs a diagnostic; hydration continues.
    pub fn set_rotation_from_str(&mut self, text: &str) -> Option<PayloadChange> {
        match text.trim().parse::<f64>() {
            Ok(degrees) => self.set_rotation(degrees),
            Err(_) => {
                warn!(location = %self.location, rotation = text, "unparseable rotation, resetting to 0");
                self.set_rotation(0.0)
            }
        }
    }

    /// Parses a checksum from text. Malformed input resets the checksum to
    /// unset and logs a diagnostic.
    pub fn set_checksum_from_str(&mut self, text: &str) -> Option<PayloadChange> {
        match text.trim().parse::<u64>() {
            Ok(value) => self.set_checksum(Some(value)),
            Err(_) => {
                warn!(location = %self.location, checksum = text, "unparseable checksum, resetting to unset");
                self.set_checksum(None)
            }
        }
    }

    /// Parses a `"latxlng"` pair (e.g. `"47.37x8.54"`). Malformed input
    /// resets the geo-tag to unset and logs a diagnostic.
    pub fn set_geo_tag_from_str(&mut self, text: &str) -> Option<PayloadChange> {
        let parsed = text.trim().split_once('x').and_then(|(lat, lng)| {
            let lat = lat.trim().parse::<f64>().ok()?;
            let lng = lng.trim().parse::<f64>().ok()?;
            Some(GeoTag { lat, lng })
        });
        match parsed {
            Some(tag) => self.set_geo_tag(Some(tag)),
            None => {
                warn!(location = %self.location, geo_tag = text, "unparseable geo-tag, resetting to unset");
                self.set_geo_tag(None)
            }
        }
    }

    /// Parses a category id from text and assigns it. Malformed ids are
    /// skipped with a diagnostic.
    pub fn add_category_from_str(&mut self, text: &str) -> Option<PayloadChange> {
        match text.trim().parse::<u32>() {
            Ok(id) => self.add_category(id),
            Err(_) => {
                warn!(location = %self.location, category = text, "unparseable category id, skipping");
                None
            }
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Case-insensitive containment search over the text fields. Checksum
    /// and rotation are not searched.
    pub fn any_match(&self, needle: &str) -> bool {
        let needle = needle.to_uppercase();
        [
            &self.description,
            &self.location,
            &self.photographer,
            &self.film_reference,
            &self.creation_time,
            &self.comment,
            &self.copyright_holder,
        ]
        .iter()
        .any(|field| field.to_uppercase().contains(&needle))
    }
}
