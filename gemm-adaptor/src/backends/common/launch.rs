use serde::Serialize;

use super::DeviceError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ThreadDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl ThreadDim {
    pub const fn new(
        x: u32,
        y: u32,
        z: u32,
    ) -> Self {
        Self {
            x,
            y,
            z,
        }
    }

    pub fn total(&self) -> u32 {
        self.x.saturating_mul(self.y).saturating_mul(self.z)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl BlockDim {
    pub const fn new(
        x: u32,
        y: u32,
        z: u32,
    ) -> Self {
        Self {
            x,
            y,
            z,
        }
    }

    pub fn total(&self) -> u64 {
        (self.x as u64) * (self.y as u64) * (self.z as u64)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LaunchDimensions {
    pub threads: ThreadDim,
    pub blocks: BlockDim,
}

/// What the device runtime exposes to argument packing at launch time.
pub trait LaunchContext {
    fn threads(&self) -> ThreadDim;

    fn blocks(&self) -> BlockDim;

    /// Maximum number of blocks of the launched kernel that can be resident on
    /// one device core for the given block footprint.
    fn max_occupied_blocks_per_core(
        &self,
        threads: ThreadDim,
        dynamic_shared_memory_bytes: usize,
    ) -> Result<u32, DeviceError>;
}
