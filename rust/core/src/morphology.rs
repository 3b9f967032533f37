// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary morphology on occupied cells

use crate::binary::{BinaryGrid, CellState};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use serde::{Deserialize, Serialize};

/// Neighbourhood used to decide whether a cell touches free space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Edge neighbours only (3x3 cross)
    Four,
    /// Edge and corner neighbours (3x3 square)
    #[default]
    Eight,
}

const FOUR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

const EIGHT_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Connectivity {
    /// (row, col) offsets of the structuring element, excluding the centre
    #[inline]
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &FOUR_OFFSETS,
            Connectivity::Eight => &EIGHT_OFFSETS,
        }
    }

    /// Distance norm whose unit ball matches this neighbourhood
    #[inline]
    fn norm(self) -> Norm {
        match self {
            Connectivity::Four => Norm::L1,
            Connectivity::Eight => Norm::LInf,
        }
    }
}

/// Single-iteration erosion of the occupied cells
///
/// The raster is padded with one ring of free cells before eroding so that
/// space outside the grid counts as free.
pub fn erode(grid: &BinaryGrid, connectivity: Connectivity) -> BinaryGrid {
    let width = grid.width();
    let height = grid.height();

    let mut padded = GrayImage::new(width as u32 + 2, height as u32 + 2);
    for (i, state) in grid.cells().iter().enumerate() {
        if *state == CellState::Occupied {
            let row = (i / width) as u32;
            let col = (i % width) as u32;
            padded.put_pixel(col + 1, row + 1, Luma([255]));
        }
    }

    let eroded = imageproc::morphology::erode(&padded, connectivity.norm(), 1);

    let mut cells = Vec::with_capacity(width * height);
    for row in 0..height as u32 {
        for col in 0..width as u32 {
            let value = eroded.get_pixel(col + 1, row + 1).0[0];
            cells.push(if value > 0 {
                CellState::Occupied
            } else {
                CellState::Free
            });
        }
    }

    BinaryGrid::from_parts(width, height, cells)
}
