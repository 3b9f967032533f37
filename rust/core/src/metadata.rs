// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Map metadata record
//!
//! Mirrors the fields of a map_server style YAML file. Parsing the file
//! itself is left to the caller; this type only describes the decoded record
//! and knows how to validate it.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Default occupancy threshold used when the metadata omits one
pub const DEFAULT_OCCUPIED_THRESH: f64 = 0.45;

/// Default free threshold used when the metadata omits one
pub const DEFAULT_FREE_THRESH: f64 = 0.196;

/// World-space pose of grid cell (0, 0), the lower-left corner of the map
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    /// Rotation in radians. Carried for completeness; mesh generation is
    /// axis-aligned and does not rotate the grid.
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }
}

impl From<[f64; 3]> for Pose2D {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Pose2D> for [f64; 3] {
    fn from(p: Pose2D) -> Self {
        [p.x, p.y, p.yaw]
    }
}

/// Metadata describing how raster intensities map to occupancy and how
/// cells map to world coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    /// Meters per cell
    pub resolution: f64,
    /// Pose of cell (0, 0)
    #[serde(default)]
    pub origin: Pose2D,
    /// Reverse the meaning of black and white
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub negate: bool,
    /// Occupancy probability at or above which a cell is occupied
    #[serde(default = "default_occupied_thresh")]
    pub occupied_thresh: f64,
    /// Occupancy probability at or below which a cell is free
    #[serde(default = "default_free_thresh")]
    pub free_thresh: f64,
    /// Raster width declared independently of the image, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Raster height declared independently of the image, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

fn default_occupied_thresh() -> f64 {
    DEFAULT_OCCUPIED_THRESH
}

fn default_free_thresh() -> f64 {
    DEFAULT_FREE_THRESH
}

/// map_server writes `negate` as 0/1; accept booleans too.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "negate must be 0 or 1, got {}",
            other
        ))),
    }
}

impl MapMetadata {
    /// Metadata with default thresholds and no declared dimensions
    pub fn new(resolution: f64, origin: Pose2D) -> Self {
        Self {
            resolution,
            origin,
            negate: false,
            occupied_thresh: DEFAULT_OCCUPIED_THRESH,
            free_thresh: DEFAULT_FREE_THRESH,
            width: None,
            height: None,
        }
    }

    pub fn with_thresholds(mut self, occupied_thresh: f64, free_thresh: f64) -> Self {
        self.occupied_thresh = occupied_thresh;
        self.free_thresh = free_thresh;
        self
    }

    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Check resolution, origin and threshold constraints
    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Error::invalid(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }

        if !(self.origin.x.is_finite() && self.origin.y.is_finite() && self.origin.yaw.is_finite())
        {
            return Err(Error::invalid("origin must be finite"));
        }

        for (name, value) in [
            ("occupied_thresh", self.occupied_thresh),
            ("free_thresh", self.free_thresh),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.free_thresh > self.occupied_thresh {
            return Err(Error::invalid(format!(
                "free_thresh ({}) exceeds occupied_thresh ({})",
                self.free_thresh, self.occupied_thresh
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_absent() {
        let meta: MapMetadata =
            serde_json::from_str(r#"{"resolution": 0.05, "origin": [-1.0, 2.0, 0.0]}"#).unwrap();

        assert_eq!(meta.occupied_thresh, DEFAULT_OCCUPIED_THRESH);
        assert_eq!(meta.free_thresh, DEFAULT_FREE_THRESH);
        assert!(!meta.negate);
        assert_eq!(meta.origin, Pose2D::new(-1.0, 2.0, 0.0));
        assert!(meta.validate().is_ok());
    }

    #[test]
    fn test_negate_accepts_int_and_bool() {
        let a: MapMetadata = serde_json::from_str(r#"{"resolution": 1.0, "negate": 1}"#).unwrap();
        let b: MapMetadata =
            serde_json::from_str(r#"{"resolution": 1.0, "negate": false}"#).unwrap();
        assert!(a.negate);
        assert!(!b.negate);

        let bad = serde_json::from_str::<MapMetadata>(r#"{"resolution": 1.0, "negate": 2}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let origin = Pose2D::default();

        assert!(matches!(
            MapMetadata::new(0.0, origin).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            MapMetadata::new(-0.5, origin).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            MapMetadata::new(1.0, origin).with_thresholds(1.2, 0.1).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            MapMetadata::new(1.0, origin).with_thresholds(0.3, 0.6).validate(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(MapMetadata::new(1.0, origin)
            .with_thresholds(0.5, 0.5)
            .validate()
            .is_ok());
    }
}
