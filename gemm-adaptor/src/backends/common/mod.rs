mod device_memory;
mod error;
pub mod gpu_types;
pub mod kernel;
mod launch;

pub use device_memory::{DeviceMemory, KernelArguments};
pub use error::{DeviceError, KernelError};
pub use launch::{BlockDim, LaunchContext, LaunchDimensions, ThreadDim};
