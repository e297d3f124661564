//! Map Entries
//!
//! Every layout entry shares a small core record (name, entity ID,
//! description) and carries a per-supertype payload:
//! - Models: asset kind and SIB path
//! - Events: event kind plus part/region references
//! - Regions: placement and shape
//! - Parts: placement, groups, model reference and a kind payload
//!
//! Cross-entry references are stored as [`EntryRef`]s and resolved lazily by
//! the owning collection.

mod refs;

pub use refs::{BrokenEntryReference, EntryRef};

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::groups::AnyGroupBitSet;

static NEXT_ENTRY_KEY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an entry instance.
///
/// `Clone` keeps the key; [`MsbEntry::deep_copy`] assigns a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey(u64);

impl EntryKey {
    pub fn next() -> Self {
        Self(NEXT_ENTRY_KEY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Default for EntryKey {
    fn default() -> Self {
        Self::next()
    }
}

/// Entry category; each sublist holds entries of exactly one supertype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySupertype {
    Models,
    Events,
    Regions,
    Parts,
}

impl EntrySupertype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::Events => "events",
            Self::Regions => "regions",
            Self::Parts => "parts",
        }
    }

    pub fn all() -> [EntrySupertype; 4] {
        [Self::Models, Self::Events, Self::Regions, Self::Parts]
    }
}

impl fmt::Display for EntrySupertype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntrySupertype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "models" | "model" => Ok(Self::Models),
            "events" | "event" => Ok(Self::Events),
            "regions" | "region" => Ok(Self::Regions),
            "parts" | "part" => Ok(Self::Parts),
            other => Err(format!("Unknown entry supertype: {other}")),
        }
    }
}

/// World position and Euler orientation (degrees, `(x, y, z)`)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub translate: Vec3,
    pub rotate: Vec3,
}

impl Placement {
    pub fn new(translate: Vec3, rotate: Vec3) -> Self {
        Self { translate, rotate }
    }

    pub fn at(translate: Vec3) -> Self {
        Self {
            translate,
            rotate: Vec3::ZERO,
        }
    }
}

/// Anything exposing a position + orientation pair.
pub trait Placed {
    fn placement(&self) -> &Placement;
    fn placement_mut(&mut self) -> &mut Placement;
}

impl Placed for Placement {
    fn placement(&self) -> &Placement {
        self
    }

    fn placement_mut(&mut self) -> &mut Placement {
        self
    }
}

// ============================================================
// Models
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    MapPiece,
    Object,
    Character,
    Collision,
    Navmesh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    pub kind: ModelKind,
    pub sib_path: String,
}

// ============================================================
// Events
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    Treasure { item_lot: i32 },
    ObjectAction { object_act_param_id: i32, event_flag: u32 },
    Message { text_id: i32 },
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub kind: EventKind,
    #[serde(default)]
    pub part: EntryRef,
    #[serde(default)]
    pub region: EntryRef,
}

// ============================================================
// Regions
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RegionShape {
    Point,
    Circle { radius: f32 },
    Sphere { radius: f32 },
    Cylinder { radius: f32, height: f32 },
    Box { width: f32, depth: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionData {
    pub placement: Placement,
    pub shape: RegionShape,
}

impl Placed for RegionData {
    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn placement_mut(&mut self) -> &mut Placement {
        &mut self.placement
    }
}

// ============================================================
// Parts
// ============================================================

/// Collision-only fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionPart {
    /// Height of the water/reflection plane; follows vertical translation
    pub reflect_plane_height: f32,
    pub hit_filter_id: u8,
    pub navmesh_groups: AnyGroupBitSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartKind {
    MapPiece,
    Object {
        #[serde(default)]
        draw_parent: EntryRef,
    },
    Character {
        think_param_id: i32,
        npc_param_id: i32,
        talk_id: i32,
        #[serde(default)]
        draw_parent: EntryRef,
    },
    PlayerStart,
    Collision(CollisionPart),
    ConnectCollision {
        #[serde(default)]
        collision: EntryRef,
        connected_map_id: [i8; 4],
    },
}

impl PartKind {
    /// Present only for collision parts.
    pub fn reflect_plane_height(&self) -> Option<f32> {
        match self {
            Self::Collision(collision) => Some(collision.reflect_plane_height),
            _ => None,
        }
    }

    pub fn reflect_plane_height_mut(&mut self) -> Option<&mut f32> {
        match self {
            Self::Collision(collision) => Some(&mut collision.reflect_plane_height),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MapPiece => "map piece",
            Self::Object { .. } => "object",
            Self::Character { .. } => "character",
            Self::PlayerStart => "player start",
            Self::Collision(_) => "collision",
            Self::ConnectCollision { .. } => "connect collision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartData {
    pub placement: Placement,
    pub scale: Vec3,
    #[serde(default)]
    pub model: EntryRef,
    pub draw_groups: AnyGroupBitSet,
    pub display_groups: AnyGroupBitSet,
    pub kind: PartKind,
}

impl PartData {
    pub fn new(kind: PartKind, placement: Placement) -> Self {
        Self {
            placement,
            scale: Vec3::ONE,
            model: EntryRef::None,
            draw_groups: AnyGroupBitSet::default(),
            display_groups: AnyGroupBitSet::default(),
            kind,
        }
    }
}

impl Placed for PartData {
    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn placement_mut(&mut self) -> &mut Placement {
        &mut self.placement
    }
}

// ============================================================
// Entry
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryData {
    Model(ModelData),
    Event(EventData),
    Region(RegionData),
    Part(PartData),
}

impl EntryData {
    pub fn supertype(&self) -> EntrySupertype {
        match self {
            Self::Model(_) => EntrySupertype::Models,
            Self::Event(_) => EntrySupertype::Events,
            Self::Region(_) => EntrySupertype::Regions,
            Self::Part(_) => EntrySupertype::Parts,
        }
    }
}

/// A reference field on an entry, with the supertype it points into.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceField<'a> {
    pub field: &'static str,
    pub target: EntrySupertype,
    pub reference: &'a EntryRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsbEntry {
    #[serde(skip)]
    key: EntryKey,
    pub name: String,
    #[serde(default)]
    pub entity_id: Option<u32>,
    #[serde(default)]
    pub description: String,
    pub data: EntryData,
}

impl MsbEntry {
    pub fn new(name: impl Into<String>, data: EntryData) -> Self {
        Self {
            key: EntryKey::next(),
            name: name.into(),
            entity_id: None,
            description: String::new(),
            data,
        }
    }

    pub fn model(name: impl Into<String>, kind: ModelKind, sib_path: impl Into<String>) -> Self {
        Self::new(
            name,
            EntryData::Model(ModelData {
                kind,
                sib_path: sib_path.into(),
            }),
        )
    }

    pub fn event(name: impl Into<String>, kind: EventKind) -> Self {
        Self::new(
            name,
            EntryData::Event(EventData {
                kind,
                part: EntryRef::None,
                region: EntryRef::None,
            }),
        )
    }

    pub fn region(name: impl Into<String>, shape: RegionShape, placement: Placement) -> Self {
        Self::new(name, EntryData::Region(RegionData { placement, shape }))
    }

    pub fn part(name: impl Into<String>, kind: PartKind, placement: Placement) -> Self {
        Self::new(name, EntryData::Part(PartData::new(kind, placement)))
    }

    pub fn with_entity_id(mut self, entity_id: u32) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn key(&self) -> EntryKey {
        self.key
    }

    /// Copy with a fresh identity; the copy shares no state with `self`.
    pub fn deep_copy(&self) -> Self {
        Self {
            key: EntryKey::next(),
            ..self.clone()
        }
    }

    pub fn supertype(&self) -> EntrySupertype {
        self.data.supertype()
    }

    /// Short kind label for messages, e.g. `collision` or `region`
    pub fn kind_name(&self) -> &'static str {
        match &self.data {
            EntryData::Model(_) => "model",
            EntryData::Event(_) => "event",
            EntryData::Region(_) => "region",
            EntryData::Part(part) => part.kind.name(),
        }
    }

    /// Position + orientation, for parts and regions only.
    pub fn placement(&self) -> Option<&Placement> {
        match &self.data {
            EntryData::Part(part) => Some(part.placement()),
            EntryData::Region(region) => Some(region.placement()),
            _ => None,
        }
    }

    pub fn placement_mut(&mut self) -> Option<&mut Placement> {
        match &mut self.data {
            EntryData::Part(part) => Some(part.placement_mut()),
            EntryData::Region(region) => Some(region.placement_mut()),
            _ => None,
        }
    }

    pub fn as_part(&self) -> Option<&PartData> {
        match &self.data {
            EntryData::Part(part) => Some(part),
            _ => None,
        }
    }

    pub fn as_part_mut(&mut self) -> Option<&mut PartData> {
        match &mut self.data {
            EntryData::Part(part) => Some(part),
            _ => None,
        }
    }

    pub fn as_region(&self) -> Option<&RegionData> {
        match &self.data {
            EntryData::Region(region) => Some(region),
            _ => None,
        }
    }

    pub fn as_event_mut(&mut self) -> Option<&mut EventData> {
        match &mut self.data {
            EntryData::Event(event) => Some(event),
            _ => None,
        }
    }

    /// All outgoing reference fields.
    pub fn references(&self) -> Vec<ReferenceField<'_>> {
        let mut fields = Vec::new();
        match &self.data {
            EntryData::Model(_) | EntryData::Region(_) => {}
            EntryData::Event(event) => {
                fields.push(ReferenceField {
                    field: "part",
                    target: EntrySupertype::Parts,
                    reference: &event.part,
                });
                fields.push(ReferenceField {
                    field: "region",
                    target: EntrySupertype::Regions,
                    reference: &event.region,
                });
            }
            EntryData::Part(part) => {
                fields.push(ReferenceField {
                    field: "model",
                    target: EntrySupertype::Models,
                    reference: &part.model,
                });
                match &part.kind {
                    PartKind::Object { draw_parent } | PartKind::Character { draw_parent, .. } => {
                        fields.push(ReferenceField {
                            field: "draw_parent",
                            target: EntrySupertype::Parts,
                            reference: draw_parent,
                        });
                    }
                    PartKind::ConnectCollision { collision, .. } => {
                        fields.push(ReferenceField {
                            field: "collision",
                            target: EntrySupertype::Parts,
                            reference: collision,
                        });
                    }
                    PartKind::MapPiece | PartKind::PlayerStart | PartKind::Collision(_) => {}
                }
            }
        }
        fields
    }

    pub fn references_mut(&mut self) -> Vec<(EntrySupertype, &mut EntryRef)> {
        let mut fields = Vec::new();
        match &mut self.data {
            EntryData::Model(_) | EntryData::Region(_) => {}
            EntryData::Event(event) => {
                fields.push((EntrySupertype::Parts, &mut event.part));
                fields.push((EntrySupertype::Regions, &mut event.region));
            }
            EntryData::Part(part) => {
                fields.push((EntrySupertype::Models, &mut part.model));
                match &mut part.kind {
                    PartKind::Object { draw_parent } | PartKind::Character { draw_parent, .. } => {
                        fields.push((EntrySupertype::Parts, draw_parent));
                    }
                    PartKind::ConnectCollision { collision, .. } => {
                        fields.push((EntrySupertype::Parts, collision));
                    }
                    PartKind::MapPiece | PartKind::PlayerStart | PartKind::Collision(_) => {}
                }
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::GroupWidth;

    fn collision(height: f32) -> MsbEntry {
        MsbEntry::part(
            "h0000B0",
            PartKind::Collision(CollisionPart {
                reflect_plane_height: height,
                hit_filter_id: 8,
                navmesh_groups: AnyGroupBitSet::empty(GroupWidth::Bits128),
            }),
            Placement::default(),
        )
    }

    #[test]
    fn test_keys_unique() {
        let a = MsbEntry::event("a", EventKind::Navigation);
        let b = MsbEntry::event("a", EventKind::Navigation);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_clone_keeps_key_deep_copy_does_not() {
        let a = MsbEntry::model("m0000B0", ModelKind::MapPiece, "m0000B0.sib");
        assert_eq!(a.clone().key(), a.key());
        let copy = a.deep_copy();
        assert_ne!(copy.key(), a.key());
        assert_eq!(copy.name, a.name);
        assert_eq!(copy.data, a.data);
    }

    #[test]
    fn test_placement_capability() {
        let region = MsbEntry::region("r", RegionShape::Point, Placement::at(Vec3::X));
        assert_eq!(region.placement().unwrap().translate, Vec3::X);
        let event = MsbEntry::event("e", EventKind::Navigation);
        assert!(event.placement().is_none());
    }

    #[test]
    fn test_reflect_plane_height_only_on_collisions() {
        let mut part = collision(5.0);
        assert_eq!(part.as_part().unwrap().kind.reflect_plane_height(), Some(5.0));
        *part
            .as_part_mut()
            .unwrap()
            .kind
            .reflect_plane_height_mut()
            .unwrap() += 1.0;
        assert_eq!(part.as_part().unwrap().kind.reflect_plane_height(), Some(6.0));
        assert_eq!(PartKind::MapPiece.reflect_plane_height(), None);
    }

    #[test]
    fn test_references_listed() {
        let mut event = MsbEntry::event("chest", EventKind::Treasure { item_lot: 1000 });
        {
            let data = event.as_event_mut().unwrap();
            data.part = EntryRef::to("o0000_0000");
        }
        let refs = event.references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].field, "part");
        assert_eq!(refs[0].reference.name(), Some("o0000_0000"));
        assert_eq!(refs[1].target, EntrySupertype::Regions);
    }

    #[test]
    fn test_supertype_parse() {
        assert_eq!("Parts".parse::<EntrySupertype>(), Ok(EntrySupertype::Parts));
        assert_eq!("region".parse::<EntrySupertype>(), Ok(EntrySupertype::Regions));
        assert!("routes".parse::<EntrySupertype>().is_err());
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(collision(0.0).kind_name(), "collision");
        assert_eq!(MsbEntry::event("e", EventKind::Navigation).kind_name(), "event");
    }
}
