//! Batch Transforms
//!
//! Stateless geometric operations over parts and regions:
//! - rotate about a pivot (Euler triple, matrix or yaw)
//! - translate, with collision reflect planes following vertical moves
//! - move a whole map from one reference frame onto another
//!
//! Every batch operation takes a selector list; an empty list selects every
//! part and region.

mod rotation;

pub use rotation::{euler_to_matrix, matrix_to_euler, Rotation};

use bevy::math::Vec3;
use tracing::debug;

use crate::collection::{EntryCollection, EntryError, EntrySelector};
use crate::constants::TRANSFORMABLE_SUPERTYPES;
use crate::entries::{MsbEntry, Placed};
use crate::logging::TimingSpan;

/// Rotate a placement about `pivot` in world coordinates.
///
/// The new orientation is `R * M(rotate)`; the new position is
/// `R * (translate - pivot) + pivot`.
pub fn rotate_entry<P: Placed + ?Sized>(
    entry: &mut P,
    rotation: impl Into<Rotation>,
    pivot: Vec3,
    radians: bool,
) {
    let matrix = rotation.into().to_matrix(radians);
    let placement = entry.placement_mut();
    placement.rotate = matrix_to_euler(matrix * euler_to_matrix(placement.rotate, false));
    placement.translate = matrix * (placement.translate - pivot) + pivot;
}

/// Like [`rotate_entry`], for entries that may not have a placement.
/// Only parts and regions can be rotated. Pivot defaults to the origin.
pub fn rotate_part_or_region(
    entry: &mut MsbEntry,
    rotation: impl Into<Rotation>,
    pivot: Option<Vec3>,
    radians: bool,
) -> Result<(), EntryError> {
    if let Some(placement) = entry.placement_mut() {
        rotate_entry(placement, rotation, pivot.unwrap_or(Vec3::ZERO), radians);
        return Ok(());
    }
    Err(EntryError::TypeMismatch {
        name: entry.name.clone(),
        expected: "part or region".to_string(),
        found: entry.kind_name().to_string(),
    })
}

/// Rotate every selected part and region about `pivot` (default origin).
/// Returns the number of entries rotated.
pub fn rotate_all_in_world(
    collection: &mut EntryCollection,
    rotation: impl Into<Rotation>,
    pivot: Option<Vec3>,
    radians: bool,
    selected: &[EntrySelector],
) -> Result<usize, EntryError> {
    let selection = collection.resolve_selection(selected, &TRANSFORMABLE_SUPERTYPES)?;
    let _span = TimingSpan::new("rotate_all_in_world");

    let matrix = rotation.into().to_matrix(radians);
    let pivot = pivot.unwrap_or(Vec3::ZERO);
    let mut rotated = 0;
    for supertype in TRANSFORMABLE_SUPERTYPES {
        for entry in collection.iter_supertype_mut(supertype) {
            if !selection.includes(entry.key()) {
                continue;
            }
            rotate_part_or_region(entry, matrix, Some(pivot), false)?;
            rotated += 1;
        }
    }
    debug!(rotated, "Rotated entries in world");
    Ok(rotated)
}

/// Add `delta` to every selected part and region translate.
///
/// Collision parts also have `delta.y` added to their reflect plane height.
pub fn translate_all(
    collection: &mut EntryCollection,
    delta: Vec3,
    selected: &[EntrySelector],
) -> Result<usize, EntryError> {
    let selection = collection.resolve_selection(selected, &TRANSFORMABLE_SUPERTYPES)?;
    let _span = TimingSpan::new("translate_all");

    let mut translated = 0;
    for supertype in TRANSFORMABLE_SUPERTYPES {
        for entry in collection.iter_supertype_mut(supertype) {
            if !selection.includes(entry.key()) {
                continue;
            }
            if let Some(placement) = entry.placement_mut() {
                placement.translate += delta;
                translated += 1;
            }
            if let Some(height) = entry
                .as_part_mut()
                .and_then(|part| part.kind.reflect_plane_height_mut())
            {
                *height += delta.y;
            }
        }
    }
    debug!(translated, ?delta, "Translated entries");
    Ok(translated)
}

/// Reference frames for [`move_map`]. Missing values are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MapMove {
    pub start_translate: Option<Vec3>,
    pub end_translate: Option<Vec3>,
    pub start_rotate: Option<Rotation>,
    pub end_rotate: Option<Rotation>,
}

impl MapMove {
    /// World rotation and translation carrying the start frame onto the end
    /// frame: `Rw = M(end) * M(start)^T`, `T = end - Rw * start`.
    pub fn world_transform(&self) -> (bevy::math::Mat3, Vec3) {
        let start_translate = self.start_translate.unwrap_or(Vec3::ZERO);
        let end_translate = self.end_translate.unwrap_or(Vec3::ZERO);
        let start_rotate = self
            .start_rotate
            .unwrap_or(Rotation::Euler(Vec3::ZERO))
            .to_matrix(false);
        let end_rotate = self
            .end_rotate
            .unwrap_or(Rotation::Euler(Vec3::ZERO))
            .to_matrix(false);

        let world_rotation = end_rotate * start_rotate.transpose();
        let translation = end_translate - world_rotation * start_translate;
        (world_rotation, translation)
    }
}

/// Move every selected part and region so that the start reference frame
/// lands on the end reference frame. Rotation about the origin is applied
/// first, then translation.
pub fn move_map(
    collection: &mut EntryCollection,
    frames: &MapMove,
    selected: &[EntrySelector],
) -> Result<usize, EntryError> {
    let (world_rotation, translation) = frames.world_transform();
    debug!(?translation, "Moving map");
    let moved = rotate_all_in_world(collection, world_rotation, None, false, selected)?;
    translate_all(collection, translation, selected)?;
    Ok(moved)
}
