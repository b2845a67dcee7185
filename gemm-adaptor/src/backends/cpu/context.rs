use crate::{
    backends::common::{BlockDim, DeviceError, LaunchContext, LaunchDimensions, ThreadDim},
    config::DeviceDescription,
};

/// Launch context of one kernel on a [`HostDevice`](super::HostDevice).
///
/// Occupancy is derived from the limits in the device description, the way
/// an occupancy calculator bounds resident blocks by threads, shared memory
/// and the hardware block slots of a core.
#[derive(Debug, Clone, Copy)]
pub struct HostLaunchContext<'a> {
    description: &'a DeviceDescription,
    dimensions: LaunchDimensions,
}

impl<'a> HostLaunchContext<'a> {
    pub fn new(
        description: &'a DeviceDescription,
        dimensions: LaunchDimensions,
    ) -> Self {
        Self {
            description,
            dimensions,
        }
    }
}

impl LaunchContext for HostLaunchContext<'_> {
    fn threads(&self) -> ThreadDim {
        self.dimensions.threads
    }

    fn blocks(&self) -> BlockDim {
        self.dimensions.blocks
    }

    fn max_occupied_blocks_per_core(
        &self,
        threads: ThreadDim,
        dynamic_shared_memory_bytes: usize,
    ) -> Result<u32, DeviceError> {
        let description = self.description;
        let threads = threads.total();
        if threads > description.max_threads_per_block {
            return Err(DeviceError::TooManyThreads {
                threads,
                limit: description.max_threads_per_block,
            });
        }
        if dynamic_shared_memory_bytes > description.shared_memory_per_block {
            return Err(DeviceError::SharedMemoryExceeded {
                requested: dynamic_shared_memory_bytes,
                limit: description.shared_memory_per_block,
            });
        }

        let by_threads = description.max_threads_per_core / threads.max(1);
        let by_shared_memory = match dynamic_shared_memory_bytes {
            0 => u32::MAX,
            bytes => u32::try_from(description.shared_memory_per_core / bytes).unwrap_or(u32::MAX),
        };
        let occupancy = by_threads.min(by_shared_memory).min(description.max_blocks_per_core);
        if occupancy == 0 {
            return Err(DeviceError::ZeroOccupancy);
        }
        Ok(occupancy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch_context(description: &DeviceDescription) -> HostLaunchContext<'_> {
        HostLaunchContext::new(
            description,
            LaunchDimensions {
                threads: ThreadDim::new(256, 1, 1),
                blocks: BlockDim::new(4, 4, 1),
            },
        )
    }

    #[test]
    fn test_occupancy_limits() {
        let description = DeviceDescription::reference();
        let context = launch_context(&description);
        assert_eq!(context.max_occupied_blocks_per_core(context.threads(), 0).unwrap(), 8);
        assert_eq!(context.max_occupied_blocks_per_core(context.threads(), 16384).unwrap(), 6);
        assert_eq!(context.max_occupied_blocks_per_core(ThreadDim::new(32, 1, 1), 0).unwrap(), 32);
    }

    #[test]
    fn test_block_limits_are_errors() {
        let description = DeviceDescription::reference();
        let context = launch_context(&description);
        assert_eq!(
            context.max_occupied_blocks_per_core(ThreadDim::new(2048, 1, 1), 0),
            Err(DeviceError::TooManyThreads {
                threads: 2048,
                limit: 1024,
            })
        );
        assert!(matches!(
            context.max_occupied_blocks_per_core(context.threads(), 65536),
            Err(DeviceError::SharedMemoryExceeded { .. })
        ));
    }

    #[test]
    fn test_zero_occupancy() {
        let description = DeviceDescription {
            shared_memory_per_block: 49152,
            shared_memory_per_core: 49152,
            ..DeviceDescription::reference()
        };
        let context = launch_context(&description);
        assert_eq!(context.max_occupied_blocks_per_core(context.threads(), 49152).unwrap(), 1);

        let description = DeviceDescription {
            max_threads_per_block: 1024,
            max_threads_per_core: 1024,
            max_blocks_per_core: 0,
            ..DeviceDescription::reference()
        };
        let context = launch_context(&description);
        assert_eq!(context.max_occupied_blocks_per_core(context.threads(), 0), Err(DeviceError::ZeroOccupancy));
    }
}
