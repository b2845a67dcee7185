use super::{problem_shape::ProblemShape, tile_configuration::TileConfiguration};
use crate::backends::common::{LaunchDimensions, ThreadDim};

/// Launch geometry of a single-pass (split-K = 1) GEMM.
///
/// Thread blocks are one-dimensional and sized by the variant alone; the grid
/// covers the tiled problem in the variant's traversal order. A zero dimension
/// gives a grid with no blocks along that axis.
pub fn launch_dimensions(
    shape: ProblemShape,
    tile: &TileConfiguration,
) -> LaunchDimensions {
    let tiled_shape = tile.tiled_shape(shape);
    LaunchDimensions {
        threads: ThreadDim::new(tile.thread_count, 1, 1),
        blocks: tile.traversal.grid_shape(tiled_shape),
    }
}
