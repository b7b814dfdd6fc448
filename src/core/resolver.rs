//! Coordinate resolution for entities that arrive with different field spellings.
//!
//! Each axis is looked up independently along [`LOOKUP_ORDER`]; the first
//! present value wins:
//!
//! 1. `location.lat` / `location.lng`
//! 2. `location.latitude` / `location.longitude`
//! 3. `latitude` / `longitude`
//! 4. `lat` / `lng`
//!
//! An entity whose resolved pair is missing or out of range has no coordinate
//! and is left out of radius matching.

use crate::models::{Coordinate, Entity};

/// One place a coordinate may live on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatePath {
    /// `location.lat` / `location.lng`
    NestedShort,
    /// `location.latitude` / `location.longitude`
    NestedLong,
    /// `latitude` / `longitude`
    FlatLong,
    /// `lat` / `lng`
    FlatShort,
}

pub const LOOKUP_ORDER: [CoordinatePath; 4] = [
    CoordinatePath::NestedShort,
    CoordinatePath::NestedLong,
    CoordinatePath::FlatLong,
    CoordinatePath::FlatShort,
];

impl CoordinatePath {
    fn latitude(self, entity: &Entity) -> Option<f64> {
        match self {
            Self::NestedShort => entity.location.as_ref().and_then(|l| l.lat),
            Self::NestedLong => entity.location.as_ref().and_then(|l| l.latitude),
            Self::FlatLong => entity.latitude,
            Self::FlatShort => entity.lat,
        }
    }

    fn longitude(self, entity: &Entity) -> Option<f64> {
        match self {
            Self::NestedShort => entity.location.as_ref().and_then(|l| l.lng),
            Self::NestedLong => entity.location.as_ref().and_then(|l| l.longitude),
            Self::FlatLong => entity.longitude,
            Self::FlatShort => entity.lng,
        }
    }
}

pub fn resolve_latitude(entity: &Entity) -> Option<f64> {
    LOOKUP_ORDER.iter().find_map(|path| path.latitude(entity))
}

pub fn resolve_longitude(entity: &Entity) -> Option<f64> {
    LOOKUP_ORDER.iter().find_map(|path| path.longitude(entity))
}

/// Resolve an entity's coordinate, or `None` when it cannot be located
pub fn resolve_coordinate(entity: &Entity) -> Option<Coordinate> {
    let latitude = resolve_latitude(entity)?;
    let longitude = resolve_longitude(entity)?;
    Coordinate::new(latitude, longitude).ok()
}
