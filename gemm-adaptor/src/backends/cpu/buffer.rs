use std::{
    collections::BTreeMap,
    ptr::NonNull,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    ArrayElement,
    backends::common::{DeviceMemory, KernelError},
};

struct Allocation {
    base: NonNull<u8>,
    bytes: usize,
}

// SAFETY: the pointer is owned by exactly one `HostBuffer` and only
// dereferenced while the table lock is held.
unsafe impl Send for Allocation {}

/// Live host allocations keyed by base address.
#[derive(Default)]
pub(crate) struct AllocationTable {
    allocations: BTreeMap<u64, Allocation>,
}

impl AllocationTable {
    /// Pointer to `bytes` bytes at `address`, if the whole range lies inside
    /// one live allocation.
    pub(crate) fn resolve(
        &self,
        address: u64,
        bytes: usize,
    ) -> Result<NonNull<u8>, KernelError> {
        let invalid = || KernelError::InvalidDeviceAddress {
            address,
            bytes,
        };
        let (&base_address, allocation) = self.allocations.range(..=address).next_back().ok_or_else(invalid)?;
        let offset = usize::try_from(address - base_address).map_err(|_| invalid())?;
        let end = offset.checked_add(bytes).ok_or_else(invalid)?;
        if end > allocation.bytes {
            return Err(invalid());
        }
        // SAFETY: `offset + bytes` lies within the allocation.
        Ok(unsafe { allocation.base.add(offset) })
    }

    pub(crate) fn len(&self) -> usize {
        self.allocations.len()
    }
}

pub(crate) type SharedAllocationTable = Arc<Mutex<AllocationTable>>;

pub(crate) fn lock(table: &Mutex<AllocationTable>) -> MutexGuard<'_, AllocationTable> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Host allocation standing in for device memory.
///
/// Storage is 8-byte aligned and zero-initialized. Dropping the buffer
/// releases the memory and removes it from its allocation table, which the
/// buffer keeps alive past its device.
pub struct HostBuffer {
    storage: NonNull<[u64]>,
    bytes: usize,
    table: SharedAllocationTable,
}

// SAFETY: every access to the storage holds the allocation table lock, and
// the buffer owns a strong reference to that table.
unsafe impl Send for HostBuffer {}
unsafe impl Sync for HostBuffer {}

impl HostBuffer {
    pub(crate) fn new(
        bytes: usize,
        table: &SharedAllocationTable,
    ) -> Self {
        let words = bytes.div_ceil(size_of::<u64>()).max(1);
        let storage = Box::into_raw(vec![0u64; words].into_boxed_slice());
        // SAFETY: `Box::into_raw` never returns null.
        let storage = unsafe { NonNull::new_unchecked(storage) };

        let base = storage.cast::<u8>();
        lock(table).allocations.insert(
            base.as_ptr() as u64,
            Allocation {
                base,
                bytes,
            },
        );

        Self {
            storage,
            bytes,
            table: Arc::clone(table),
        }
    }

    pub fn address(&self) -> u64 {
        self.storage.cast::<u8>().as_ptr() as u64
    }

    pub fn size(&self) -> usize {
        self.bytes
    }

    pub fn memory(&self) -> DeviceMemory {
        DeviceMemory::new(self.address(), self.bytes)
    }

    /// Copies the buffer out as whole elements of `T`.
    pub fn read<T: ArrayElement>(&self) -> Vec<T> {
        let count = self.bytes / size_of::<T>();
        let _lock = lock(&self.table);
        // SAFETY: the storage holds `bytes` initialized bytes, is 8-byte
        // aligned, and every writer holds the table lock.
        let bytes = unsafe { std::slice::from_raw_parts(self.storage.cast::<u8>().as_ptr(), count * size_of::<T>()) };
        bytemuck::cast_slice::<u8, T>(bytes).to_vec()
    }

    pub fn write<T: ArrayElement>(
        &self,
        data: &[T],
    ) -> Result<(), KernelError> {
        let source: &[u8] = bytemuck::cast_slice(data);
        if source.len() > self.bytes {
            return Err(KernelError::InvalidDeviceAddress {
                address: self.address(),
                bytes: source.len(),
            });
        }
        let _lock = lock(&self.table);
        // SAFETY: the range was checked above and the table lock serializes
        // all accesses.
        unsafe {
            std::ptr::copy_nonoverlapping(source.as_ptr(), self.storage.cast::<u8>().as_ptr(), source.len());
        }
        Ok(())
    }
}

impl Drop for HostBuffer {
    fn drop(&mut self) {
        lock(&self.table).allocations.remove(&self.address());
        // SAFETY: `storage` came from `Box::into_raw` and is freed only here.
        drop(unsafe { Box::from_raw(self.storage.as_ptr()) });
    }
}

impl std::fmt::Debug for HostBuffer {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HostBuffer")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("bytes", &self.bytes)
            .finish()
    }
}
