use crate::entries::EntrySupertype;

/// Bits packed into each group word
pub const BITS_PER_WORD: u32 = 32;

/// Version written into layout JSON files
pub const LAYOUT_FORMAT_VERSION: u32 = 1;

/// Packed reference index meaning "no reference"
pub const NO_REFERENCE_INDEX: i32 = -1;

/// Entry supertypes that carry a translate/rotate placement
pub const TRANSFORMABLE_SUPERTYPES: [EntrySupertype; 2] =
    [EntrySupertype::Parts, EntrySupertype::Regions];

/// Sublists of a freshly assembled layout, in file order.
pub const DEFAULT_LIST_SCHEMA: &[(&str, EntrySupertype)] = &[
    ("map_piece_models", EntrySupertype::Models),
    ("object_models", EntrySupertype::Models),
    ("character_models", EntrySupertype::Models),
    ("collision_models", EntrySupertype::Models),
    ("navmesh_models", EntrySupertype::Models),
    ("treasures", EntrySupertype::Events),
    ("object_actions", EntrySupertype::Events),
    ("messages", EntrySupertype::Events),
    ("navigation", EntrySupertype::Events),
    ("points", EntrySupertype::Regions),
    ("spheres", EntrySupertype::Regions),
    ("cylinders", EntrySupertype::Regions),
    ("boxes", EntrySupertype::Regions),
    ("map_pieces", EntrySupertype::Parts),
    ("objects", EntrySupertype::Parts),
    ("characters", EntrySupertype::Parts),
    ("player_starts", EntrySupertype::Parts),
    ("collisions", EntrySupertype::Parts),
    ("connect_collisions", EntrySupertype::Parts),
];
