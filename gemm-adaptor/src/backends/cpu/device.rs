use std::sync::{Arc, Mutex};

use super::{
    buffer::{AllocationTable, HostBuffer, SharedAllocationTable, lock},
    context::HostLaunchContext,
    kernel,
};
use crate::{
    ArrayElement,
    backends::common::{
        KernelArguments, KernelError,
        gpu_types::{DynamicSliceParams, GemmParams},
        kernel::gemm::{KernelDescriptor, PackedKernelArgs},
    },
    config::DeviceDescription,
};

/// Host memory and execution standing in for an accelerator.
pub struct HostDevice {
    description: DeviceDescription,
    allocations: SharedAllocationTable,
}

impl HostDevice {
    pub fn new(description: DeviceDescription) -> Self {
        Self {
            description,
            allocations: Arc::new(Mutex::new(AllocationTable::default())),
        }
    }

    pub fn description(&self) -> &DeviceDescription {
        &self.description
    }

    pub fn allocate(
        &self,
        bytes: usize,
    ) -> HostBuffer {
        HostBuffer::new(bytes, &self.allocations)
    }

    pub fn upload<T: ArrayElement>(
        &self,
        data: &[T],
    ) -> Result<HostBuffer, KernelError> {
        let buffer = self.allocate(size_of_val(data));
        buffer.write(data)?;
        Ok(buffer)
    }

    pub fn fill<T: ArrayElement>(
        &self,
        value: T,
        len: usize,
    ) -> Result<HostBuffer, KernelError> {
        self.upload(&vec![value; len])
    }

    pub fn live_allocations(&self) -> usize {
        lock(&self.allocations).len()
    }

    pub fn launch_context(
        &self,
        descriptor: &KernelDescriptor,
    ) -> HostLaunchContext<'_> {
        HostLaunchContext::new(&self.description, descriptor.dimensions())
    }

    /// Packs `args` for `descriptor` and runs the kernel to completion.
    pub fn launch(
        &self,
        descriptor: &KernelDescriptor,
        args: &KernelArguments,
    ) -> Result<(), KernelError> {
        let packed = descriptor.pack(&self.launch_context(descriptor), args)?;
        self.execute(descriptor, &packed)
    }

    /// Runs already packed arguments, decoding them the way the device kernel
    /// reads its parameter bank.
    pub fn execute(
        &self,
        descriptor: &KernelDescriptor,
        packed: &PackedKernelArgs,
    ) -> Result<(), KernelError> {
        if packed.number_of_arguments() != 2 {
            return Err(KernelError::MalformedArguments(format!(
                "expected 2 packed arguments, got {}",
                packed.number_of_arguments()
            )));
        }
        let params = packed.decode::<GemmParams>(0)?;
        let slice = packed.decode::<DynamicSliceParams>(1)?;

        tracing::trace!(
            kernel = descriptor.name(),
            variant = descriptor.variant(),
            grid = ?descriptor.dimensions().blocks,
            shared_memory_bytes = packed.number_of_shared_bytes(),
            "executing gemm on host"
        );

        let table = lock(&self.allocations);
        kernel::gemm(&table, descriptor.data_type(), descriptor.tile(), &params, &slice)
    }
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new(DeviceDescription::reference())
    }
}
