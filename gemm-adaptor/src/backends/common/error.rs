use super::kernel::gemm::{Layout, Operand};
use crate::DataType;

/// Failures reported by the device runtime while preparing a launch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Thread block of {threads} threads exceeds the device limit of {limit} threads per block")]
    TooManyThreads {
        threads: u32,
        limit: u32,
    },
    #[error("Kernel requires {requested} bytes of shared memory, device allows {limit} bytes per block")]
    SharedMemoryExceeded {
        requested: usize,
        limit: usize,
    },
    #[error("Kernel footprint leaves no room for a resident block on a device core")]
    ZeroOccupancy,
    #[error("{0}")]
    Generic(String),
}

#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("GEMM kernel {kernel} can not implement gemm for a given problem size: m={m}, n={n}, k={k} ({reason})")]
    InfeasibleProblem {
        kernel: &'static str,
        m: u32,
        n: u32,
        k: u32,
        reason: String,
    },
    #[error("Failed to query device occupancy: {0}")]
    OccupancyQuery(#[from] DeviceError),
    #[error("GEMM kernel {kernel} uses unsupported {layout} layout for the {operand} operand")]
    UnsupportedLayout {
        kernel: &'static str,
        operand: Operand,
        layout: Layout,
    },
    #[error("Index {index} of the {operand} argument is out of bounds for {len} kernel arguments")]
    ArgumentIndexOutOfBounds {
        operand: &'static str,
        index: usize,
        len: usize,
    },
    #[error("No GEMM kernel {name} registered for {data_type}")]
    KernelNotFound {
        name: String,
        data_type: DataType,
    },
    #[error("Device range {address:#x}+{bytes} is not backed by a live allocation")]
    InvalidDeviceAddress {
        address: u64,
        bytes: usize,
    },
    #[error("Unsupported dtype for host GEMM: {0}")]
    UnsupportedDataType(DataType),
    #[error("Malformed packed kernel arguments: {0}")]
    MalformedArguments(String),
}
