use std::{ops::Range, sync::Arc};

use bytemuck::Pod;

use super::{
    arguments::{ArgumentIndices, DynamicSliceIndices, GemmOperands},
    layout::OperandStrides,
    params::{EpilogueScale, build_params},
    problem_shape::ProblemShape,
    variant::GemmKernelVariant,
};
use crate::{
    backends::common::{KernelArguments, KernelError, LaunchContext, gpu_types::DynamicSliceParams},
    config::DeviceDescription,
};

const ARGUMENT_ALIGNMENT: usize = 8;

/// By-value kernel arguments ready to be handed to a launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedKernelArgs {
    storage: Vec<u8>,
    arguments: Vec<Range<usize>>,
    shared_memory_bytes: usize,
}

impl PackedKernelArgs {
    /// Lays `arguments` out back to back, each starting at an 8-byte boundary.
    pub fn pack(
        shared_memory_bytes: usize,
        arguments: &[&[u8]],
    ) -> Self {
        let mut storage = Vec::new();
        let mut ranges = Vec::with_capacity(arguments.len());
        for bytes in arguments {
            let start = storage.len().next_multiple_of(ARGUMENT_ALIGNMENT);
            storage.resize(start, 0);
            storage.extend_from_slice(bytes);
            ranges.push(start..storage.len());
        }
        Self {
            storage,
            arguments: ranges,
            shared_memory_bytes,
        }
    }

    pub fn number_of_arguments(&self) -> usize {
        self.arguments.len()
    }

    pub fn number_of_shared_bytes(&self) -> usize {
        self.shared_memory_bytes
    }

    pub fn argument(
        &self,
        index: usize,
    ) -> Option<&[u8]> {
        self.arguments.get(index).map(|range| &self.storage[range.clone()])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.storage
    }

    pub fn decode<T: Pod>(
        &self,
        index: usize,
    ) -> Result<T, KernelError> {
        let bytes = self
            .argument(index)
            .ok_or_else(|| KernelError::MalformedArguments(format!("missing argument {index}")))?;
        if bytes.len() != size_of::<T>() {
            return Err(KernelError::MalformedArguments(format!(
                "argument {index} has {} bytes, expected {}",
                bytes.len(),
                size_of::<T>()
            )));
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }
}

pub type PackingFn =
    Arc<dyn Fn(&dyn LaunchContext, &KernelArguments) -> Result<PackedKernelArgs, KernelError> + Send + Sync>;

/// Creates the packing closure of variant `V` for a fixed problem.
///
/// Layouts are resolved here so an unsupported variant fails at registration.
/// Each call of the returned closure extracts the operands, builds the
/// parameter block and appends the dynamic slice parameters.
pub fn args_packing<V: GemmKernelVariant>(
    shape: ProblemShape,
    indices: ArgumentIndices,
    slices: DynamicSliceIndices,
    device: &DeviceDescription,
) -> Result<PackingFn, KernelError> {
    let strides = OperandStrides::for_variant::<V>(shape)?;
    let device_cores = device.core_count;

    let packing: PackingFn = Arc::new(
        move |context: &dyn LaunchContext, args: &KernelArguments| -> Result<PackedKernelArgs, KernelError> {
            let operands = GemmOperands::<V>::extract(args, &indices)?;
            let shared_memory_bytes = args.number_of_shared_bytes();
            let params = build_params::<V>(
                shape,
                &operands,
                strides,
                EpilogueScale::PRODUCT,
                context,
                shared_memory_bytes,
                device_cores,
            )?;
            let slice_params = DynamicSliceParams::from_arguments(args, &slices)?;

            tracing::trace!(
                kernel = V::NAME,
                m = shape.m,
                n = shape.n,
                k = shape.k,
                core_occupancy = params.core_occupancy,
                sliced = !slice_params.is_none(),
                "packed gemm arguments"
            );

            Ok(PackedKernelArgs::pack(
                shared_memory_bytes,
                &[bytemuck::bytes_of(&params), bytemuck::bytes_of(&slice_params)],
            ))
        },
    );
    Ok(packing)
}
