/// Opaque handle to a device allocation.
///
/// The adaptor only forwards `address`; it never dereferences it on the host.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceMemory {
    address: u64,
    size: usize,
}

impl DeviceMemory {
    pub const fn new(
        address: u64,
        size: usize,
    ) -> Self {
        Self {
            address,
            size,
        }
    }

    pub const fn null() -> Self {
        Self::new(0, 0)
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_null(&self) -> bool {
        self.address == 0
    }
}

/// Ordered list of device buffers passed to a kernel launch, together with the
/// dynamic shared memory the launch requests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KernelArguments {
    buffers: Vec<DeviceMemory>,
    shared_memory_bytes: usize,
}

impl KernelArguments {
    pub fn new(
        buffers: Vec<DeviceMemory>,
        shared_memory_bytes: usize,
    ) -> Self {
        Self {
            buffers,
            shared_memory_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn buffers(&self) -> &[DeviceMemory] {
        &self.buffers
    }

    pub fn device_memory(
        &self,
        index: usize,
    ) -> Option<DeviceMemory> {
        self.buffers.get(index).copied()
    }

    pub fn number_of_shared_bytes(&self) -> usize {
        self.shared_memory_bytes
    }
}
