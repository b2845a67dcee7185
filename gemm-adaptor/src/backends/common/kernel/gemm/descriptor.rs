use std::fmt;

use super::{
    arguments::{ArgumentIndices, DynamicSliceIndices},
    layout::OperandStrides,
    packing::{PackedKernelArgs, PackingFn},
    problem_shape::ProblemShape,
    tile_configuration::TileConfiguration,
    variant::GemmKernelVariant,
};
use crate::{
    DataType,
    backends::common::{DeviceMemory, KernelArguments, KernelError, LaunchContext, LaunchDimensions},
    config::DeviceDescription,
};

/// Everything a launcher needs to run one GEMM problem with a chosen variant.
#[derive(Clone)]
pub struct KernelDescriptor {
    name: String,
    variant: &'static str,
    data_type: DataType,
    shape: ProblemShape,
    dimensions: LaunchDimensions,
    shared_memory_bytes: usize,
    strides: OperandStrides,
    tile: TileConfiguration,
    packing: PackingFn,
}

impl KernelDescriptor {
    pub fn new<V: GemmKernelVariant>(
        name: &str,
        shape: ProblemShape,
        indices: ArgumentIndices,
        slices: DynamicSliceIndices,
        device: &DeviceDescription,
    ) -> Result<Self, KernelError> {
        let strides = OperandStrides::for_variant::<V>(shape)?;
        let packing = V::args_packing(shape, indices, slices, device)?;
        let dimensions = V::launch_dimensions(shape);

        tracing::debug!(
            kernel = name,
            variant = V::NAME,
            dtype = %V::data_type(),
            m = shape.m,
            n = shape.n,
            k = shape.k,
            grid = ?dimensions.blocks,
            "built gemm kernel descriptor"
        );

        Ok(Self {
            name: name.to_string(),
            variant: V::NAME,
            data_type: V::data_type(),
            shape,
            dimensions,
            shared_memory_bytes: V::shared_memory_bytes(),
            strides,
            tile: V::TILE,
            packing,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> &'static str {
        self.variant
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn shape(&self) -> ProblemShape {
        self.shape
    }

    pub fn dimensions(&self) -> LaunchDimensions {
        self.dimensions
    }

    pub fn shared_memory_bytes(&self) -> usize {
        self.shared_memory_bytes
    }

    pub fn strides(&self) -> OperandStrides {
        self.strides
    }

    pub fn tile(&self) -> &TileConfiguration {
        &self.tile
    }

    pub fn packing(&self) -> &PackingFn {
        &self.packing
    }

    /// Argument list for this kernel, requesting its shared memory footprint.
    pub fn kernel_arguments(
        &self,
        buffers: Vec<DeviceMemory>,
    ) -> KernelArguments {
        KernelArguments::new(buffers, self.shared_memory_bytes)
    }

    pub fn pack(
        &self,
        context: &dyn LaunchContext,
        args: &KernelArguments,
    ) -> Result<PackedKernelArgs, KernelError> {
        (self.packing)(context, args)
    }
}

impl fmt::Debug for KernelDescriptor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("KernelDescriptor")
            .field("name", &self.name)
            .field("variant", &self.variant)
            .field("data_type", &self.data_type)
            .field("shape", &self.shape)
            .field("dimensions", &self.dimensions)
            .field("shared_memory_bytes", &self.shared_memory_bytes)
            .field("strides", &self.strides)
            .finish_non_exhaustive()
    }
}
