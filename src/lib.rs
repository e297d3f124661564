//! MSB Layout Core Library
//!
//! Editing toolkit for map layout data (MSB):
//! - Fixed-width group bitsets with canonical text form
//! - Typed, ordered entry sublists (models, events, regions, parts)
//! - Name references between entries, broken-reference tracking
//! - Batch translate/rotate and map moves in world space
//! - Merging two layouts into a new one
//! - Versioned JSON persistence and content fingerprints

pub mod collection;
pub mod config;
pub mod constants;
pub mod entries;
pub mod groups;
pub mod io;
pub mod logging;
pub mod merge;
pub mod transform;
