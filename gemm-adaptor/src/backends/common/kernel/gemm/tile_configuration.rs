use serde::Serialize;

use super::problem_shape::{ProblemShape, TileCoord};
use crate::backends::common::BlockDim;

/// Order in which thread blocks walk the output tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TileTraversal {
    /// Column-major walk over groups of `2^log_tile` adjacent tile columns,
    /// which keeps neighbouring blocks on the same rows of B.
    Identity {
        log_tile: u32,
    },
    /// Grid x runs along N and grid y along M.
    Horizontal,
}

impl TileTraversal {
    pub fn log_tile(&self) -> u32 {
        match self {
            TileTraversal::Identity {
                log_tile,
            } => *log_tile,
            TileTraversal::Horizontal => 0,
        }
    }

    pub fn grid_shape(
        &self,
        tiled_shape: TileCoord,
    ) -> BlockDim {
        match self {
            TileTraversal::Identity {
                log_tile,
            } => {
                let tile = 1u32 << log_tile;
                BlockDim::new(tiled_shape.m.saturating_mul(tile), tiled_shape.n.div_ceil(tile), tiled_shape.k)
            },
            TileTraversal::Horizontal => BlockDim::new(tiled_shape.n, tiled_shape.m, tiled_shape.k),
        }
    }

    /// Tile computed by the block at grid position `(x, y, z)`. The result may
    /// fall outside the tiled shape when the grid over-covers it.
    pub fn tile_offset(
        &self,
        x: u32,
        y: u32,
        z: u32,
    ) -> TileCoord {
        match self {
            TileTraversal::Identity {
                log_tile,
            } => {
                let mask = (1u32 << log_tile) - 1;
                TileCoord::new(x >> log_tile, (y << log_tile) + (x & mask), z)
            },
            TileTraversal::Horizontal => TileCoord::new(y, x, z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileConfiguration {
    pub tile_m: u32,
    pub tile_n: u32,
    pub tile_k: u32,
    pub thread_count: u32,
    pub stages: u32,
    pub traversal: TileTraversal,
}

impl TileConfiguration {
    pub const fn new(
        tile_m: u32,
        tile_n: u32,
        tile_k: u32,
        thread_count: u32,
        stages: u32,
        traversal: TileTraversal,
    ) -> Self {
        Self {
            tile_m,
            tile_n,
            tile_k,
            thread_count,
            stages,
            traversal,
        }
    }

    /// Number of tiles along each axis, without splitting K.
    pub fn tiled_shape(
        &self,
        shape: ProblemShape,
    ) -> TileCoord {
        TileCoord::new(shape.m.div_ceil(self.tile_m), shape.n.div_ceil(self.tile_n), 1)
    }

    pub fn gemm_k_iterations(
        &self,
        shape: ProblemShape,
    ) -> u32 {
        shape.k.div_ceil(self.tile_k)
    }
}
