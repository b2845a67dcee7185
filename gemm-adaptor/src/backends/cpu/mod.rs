//! Host reference backend.
//!
//! Executes packed GEMM launches on host memory so argument packing can be
//! checked end to end without an accelerator.

mod buffer;
mod context;
mod device;
mod kernel;

pub use buffer::HostBuffer;
pub use context::HostLaunchContext;
pub use device::HostDevice;
