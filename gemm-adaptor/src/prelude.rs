//! Commonly used types, importable with `use gemm_adaptor::prelude::*;`.

pub use crate::{
    ArrayElement, DataType,
    backends::{
        common::{
            DeviceError, DeviceMemory, KernelArguments, KernelError, LaunchContext, LaunchDimensions,
            gpu_types::{DynamicSliceParams, GemmParams},
            kernel::gemm::{
                ArgumentIndices, DEFAULT_KERNEL_NAME, DynamicSliceIndices, GemmKernelVariant, KernelDescriptor,
                KernelRegistry, PackedKernelArgs, ProblemShape, ShapeFamily,
            },
        },
        cpu::{HostBuffer, HostDevice, HostLaunchContext},
    },
    config::{ConfigError, DeviceDescription},
};
