use std::fmt;

use serde::{Deserialize, Serialize};

/// GEMM problem size: `D[M, N] = A[M, K] x B[K, N]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemShape {
    /// Rows of the output (rows of A).
    pub m: u32,
    /// Columns of the output (columns of B).
    pub n: u32,
    /// Reduction dimension (columns of A, rows of B).
    pub k: u32,
}

impl ProblemShape {
    pub const fn new(
        m: u32,
        n: u32,
        k: u32,
    ) -> Self {
        Self {
            m,
            n,
            k,
        }
    }

    pub fn output_elements(&self) -> u64 {
        (self.m as u64) * (self.n as u64)
    }
}

impl fmt::Display for ProblemShape {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "m={}, n={}, k={}", self.m, self.n, self.k)
    }
}

/// Position or extent in units of tiles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoord {
    pub m: u32,
    pub n: u32,
    pub k: u32,
}

impl TileCoord {
    pub const fn new(
        m: u32,
        n: u32,
        k: u32,
    ) -> Self {
        Self {
            m,
            n,
            k,
        }
    }

    pub fn contains(
        &self,
        tile: &TileCoord,
    ) -> bool {
        tile.m < self.m && tile.n < self.n && tile.k < self.k
    }
}
