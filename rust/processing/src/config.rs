// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion configuration

use crate::error::{Error, Result};
use gridmesh_core::{AmbiguousPolicy, Connectivity, ExtractionMethod, ExtractorConfig};
use gridmesh_geometry::{FloorStyle, MeshBuilderConfig};
use serde::{Deserialize, Serialize};

/// Wall height used when none is given, in meters
pub const DEFAULT_WALL_HEIGHT: f64 = 1.0;

/// Every tunable of a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Wall height in meters
    pub wall_height: f64,
    /// Neighbourhood for the wall boundary test
    pub connectivity: Connectivity,
    /// Classification of cells between the two thresholds
    pub band_policy: AmbiguousPolicy,
    pub extraction: ExtractionMethod,
    pub floor: FloorStyle,
    /// Also write the other format (`.obj` <-> `.stl`) next to the output
    pub companion: bool,
    /// Use rayon for row scans and cuboid generation
    pub parallel: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            wall_height: DEFAULT_WALL_HEIGHT,
            connectivity: Connectivity::Eight,
            band_policy: AmbiguousPolicy::Occupied,
            extraction: ExtractionMethod::Neighborhood,
            floor: FloorStyle::Quad,
            companion: true,
            parallel: true,
        }
    }
}

impl ConversionConfig {
    pub fn with_wall_height(mut self, wall_height: f64) -> Self {
        self.wall_height = wall_height;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.wall_height.is_finite() || self.wall_height <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "wall height must be positive, got {}",
                self.wall_height
            )));
        }
        Ok(())
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            connectivity: self.connectivity,
            band_policy: self.band_policy,
            method: self.extraction,
            parallel: self.parallel,
        }
    }

    pub fn builder_config(&self) -> MeshBuilderConfig {
        MeshBuilderConfig {
            wall_height: self.wall_height,
            floor: self.floor,
            parallel: self.parallel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ConversionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wall_height, DEFAULT_WALL_HEIGHT);
        assert_eq!(config.builder_config().wall_height, DEFAULT_WALL_HEIGHT);
    }

    #[test]
    fn test_rejects_bad_height() {
        for h in [0.0, -2.0, f64::INFINITY] {
            let err = ConversionConfig::default().with_wall_height(h).validate().unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidParameter);
        }
    }
}
