use half::{bf16, f16};

use super::{
    arguments::{ArgumentIndices, DynamicSliceIndices},
    geometry::launch_dimensions,
    layout::{Layout, Operand, OperandStrides},
    packing::{PackingFn, args_packing},
    problem_shape::ProblemShape,
    tile_configuration::{TileConfiguration, TileTraversal},
};
use crate::{
    ArrayElement, DataType,
    backends::common::{KernelError, LaunchDimensions},
    config::DeviceDescription,
};

/// A GEMM kernel specialized at compile time for element types, operand
/// layouts and tiling.
///
/// One type implements this trait per specialization; the registry erases
/// them behind [`KernelDescriptor`](super::KernelDescriptor).
pub trait GemmKernelVariant: Sized + Send + Sync + 'static {
    type ElementA: ArrayElement;
    type ElementB: ArrayElement;
    type ElementC: ArrayElement;

    const NAME: &'static str;
    const TILE: TileConfiguration;

    const LAYOUT_A: Layout = Layout::RowMajor;
    const LAYOUT_B: Layout = Layout::RowMajor;
    const LAYOUT_C: Layout = Layout::RowMajor;

    /// Elements per vectorized global memory access.
    const ALIGNMENT_A: u32 = 1;
    const ALIGNMENT_B: u32 = 1;
    const ALIGNMENT_C: u32 = 1;

    fn data_type() -> DataType {
        Self::ElementA::data_type()
    }

    /// Shared memory used by the software pipeline staging A and B tiles.
    fn shared_memory_bytes() -> usize {
        let tile = Self::TILE;
        let a_tile = (tile.tile_m as usize) * (tile.tile_k as usize) * size_of::<Self::ElementA>();
        let b_tile = (tile.tile_k as usize) * (tile.tile_n as usize) * size_of::<Self::ElementB>();
        (tile.stages as usize) * (a_tile + b_tile)
    }

    fn launch_dimensions(shape: ProblemShape) -> LaunchDimensions {
        launch_dimensions(shape, &Self::TILE)
    }

    /// Fails for operand layouts the adaptor cannot derive strides for.
    fn check_layouts() -> Result<(), KernelError> {
        OperandStrides::for_variant::<Self>(ProblemShape::default()).map(|_| ())
    }

    /// Whether the kernel can compute `shape`; the error explains why not.
    fn can_implement(shape: ProblemShape) -> Result<(), String> {
        if shape.m == 0 || shape.n == 0 || shape.k == 0 {
            return Err("all problem dimensions must be non-zero".to_string());
        }
        if [shape.m, shape.n, shape.k].iter().any(|&dimension| dimension > i32::MAX as u32) {
            return Err("problem dimensions must fit in i32".to_string());
        }

        let operands = [
            (Operand::Lhs, Self::LAYOUT_A, Self::ALIGNMENT_A),
            (Operand::Rhs, Self::LAYOUT_B, Self::ALIGNMENT_B),
            (Operand::Output, Self::LAYOUT_C, Self::ALIGNMENT_C),
        ];
        for (operand, layout, alignment) in operands {
            let extent = layout.contiguous_extent(operand, shape);
            if extent % alignment != 0 {
                return Err(format!(
                    "{operand} operand extent {extent} is not a multiple of its {alignment}-element alignment"
                ));
            }
        }
        Ok(())
    }

    fn args_packing(
        shape: ProblemShape,
        indices: ArgumentIndices,
        slices: DynamicSliceIndices,
        device: &DeviceDescription,
    ) -> Result<PackingFn, KernelError> {
        args_packing::<Self>(shape, indices, slices, device)
    }
}

macro_rules! gemm_variant {
    (
        $(#[$meta:meta])*
        $variant:ident,
        name: $name:literal,
        element: $element:ty,
        tile: ($tile_m:literal, $tile_n:literal, $tile_k:literal),
        threads: $threads:literal,
        stages: $stages:literal,
        alignment: $alignment:literal,
        traversal: $traversal:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $variant;

        impl GemmKernelVariant for $variant {
            type ElementA = $element;
            type ElementB = $element;
            type ElementC = $element;

            const NAME: &'static str = $name;
            const TILE: TileConfiguration =
                TileConfiguration::new($tile_m, $tile_n, $tile_k, $threads, $stages, $traversal);

            const ALIGNMENT_A: u32 = $alignment;
            const ALIGNMENT_B: u32 = $alignment;
            const ALIGNMENT_C: u32 = $alignment;
        }
    };
}

gemm_variant!(
    /// Small-tile SIMT kernel for problems that would leave most of a large
    /// tile idle.
    GemmF32Simt32x32x8,
    name: "gemm_f32_simt_32x32x8",
    element: f32,
    tile: (32, 32, 8),
    threads: 64,
    stages: 2,
    alignment: 1,
    traversal: TileTraversal::Identity { log_tile: 0 }
);

gemm_variant!(
    GemmF32Simt128x128x8,
    name: "gemm_f32_simt_128x128x8",
    element: f32,
    tile: (128, 128, 8),
    threads: 256,
    stages: 2,
    alignment: 1,
    traversal: TileTraversal::Identity { log_tile: 1 }
);

gemm_variant!(
    GemmF16TensorOp64x64x32,
    name: "gemm_f16_tensorop_64x64x32",
    element: f16,
    tile: (64, 64, 32),
    threads: 128,
    stages: 2,
    alignment: 8,
    traversal: TileTraversal::Identity { log_tile: 0 }
);

gemm_variant!(
    GemmF16TensorOp128x128x32,
    name: "gemm_f16_tensorop_128x128x32",
    element: f16,
    tile: (128, 128, 32),
    threads: 128,
    stages: 3,
    alignment: 8,
    traversal: TileTraversal::Identity { log_tile: 1 }
);

gemm_variant!(
    GemmBF16TensorOp128x128x32,
    name: "gemm_bf16_tensorop_128x128x32",
    element: bf16,
    tile: (128, 128, 32),
    threads: 128,
    stages: 3,
    alignment: 8,
    traversal: TileTraversal::Horizontal
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_memory_bytes() {
        assert_eq!(GemmF32Simt32x32x8::shared_memory_bytes(), 4096);
        assert_eq!(GemmF32Simt128x128x8::shared_memory_bytes(), 16384);
        assert_eq!(GemmF16TensorOp128x128x32::shared_memory_bytes(), 49152);
    }

    #[test]
    fn test_can_implement_rejects_zero_reduction() {
        let reason = GemmF32Simt32x32x8::can_implement(ProblemShape::new(4, 4, 0)).unwrap_err();
        assert!(reason.contains("non-zero"));
    }

    #[test]
    fn test_can_implement_checks_alignment() {
        assert!(GemmF16TensorOp64x64x32::can_implement(ProblemShape::new(3, 64, 64)).is_ok());
        assert!(GemmF16TensorOp64x64x32::can_implement(ProblemShape::new(64, 60, 64)).is_err());
        assert!(GemmF16TensorOp64x64x32::can_implement(ProblemShape::new(64, 64, 20)).is_err());
        assert!(GemmF32Simt32x32x8::can_implement(ProblemShape::new(3, 5, 7)).is_ok());
    }

    #[test]
    fn test_data_type_follows_element() {
        assert_eq!(GemmF32Simt128x128x8::data_type(), DataType::F32);
        assert_eq!(GemmF16TensorOp128x128x32::data_type(), DataType::F16);
        assert_eq!(GemmBF16TensorOp128x128x32::data_type(), DataType::BF16);
    }
}
