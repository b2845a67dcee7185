use serde::Serialize;

use super::{
    arguments::GemmOperands, layout::OperandStrides, problem_shape::ProblemShape,
    tile_configuration::TileConfiguration, variant::GemmKernelVariant,
};
use crate::backends::common::{
    KernelError, LaunchContext,
    gpu_types::{GemmParams, GemmUniversalMode},
};

/// Scalars of the `D = alpha * (A x B) + beta * C` epilogue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpilogueScale {
    pub alpha: f32,
    pub beta: f32,
}

impl EpilogueScale {
    /// Plain product, the source operand is ignored.
    pub const PRODUCT: Self = Self {
        alpha: 1.0,
        beta: 0.0,
    };
}

impl Default for EpilogueScale {
    fn default() -> Self {
        Self::PRODUCT
    }
}

/// Problem description handed to parameter construction, before the
/// variant's tiling and the device's occupancy are folded in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GemmArguments {
    pub mode: GemmUniversalMode,
    pub problem_size: ProblemShape,
    pub batch_count: i32,
    pub epilogue: EpilogueScale,
    pub ptr_a: u64,
    pub ptr_b: u64,
    pub ptr_c: u64,
    pub ptr_d: u64,
    pub batch_stride_a: i64,
    pub batch_stride_b: i64,
    pub batch_stride_c: i64,
    pub batch_stride_d: i64,
    pub lda: i64,
    pub ldb: i64,
    pub ldc: i64,
    pub ldd: i64,
}

impl GemmArguments {
    /// Single unbatched GEMM whose output is both the epilogue source and the
    /// destination.
    pub fn single_pass<V: GemmKernelVariant>(
        shape: ProblemShape,
        operands: &GemmOperands<V>,
        strides: OperandStrides,
        epilogue: EpilogueScale,
    ) -> Self {
        Self {
            mode: GemmUniversalMode::Gemm,
            problem_size: shape,
            batch_count: 1,
            epilogue,
            ptr_a: operands.a.address(),
            ptr_b: operands.b.address(),
            ptr_c: operands.c.address(),
            ptr_d: operands.c.address(),
            batch_stride_a: 0,
            batch_stride_b: 0,
            batch_stride_c: 0,
            batch_stride_d: 0,
            lda: strides.lda,
            ldb: strides.ldb,
            ldc: strides.ldc,
            ldd: strides.ldc,
        }
    }
}

impl GemmParams {
    pub fn from_arguments(
        arguments: &GemmArguments,
        tile: &TileConfiguration,
        device_cores: u32,
        core_occupancy: u32,
    ) -> Self {
        let shape = arguments.problem_size;
        let tiled_shape = tile.tiled_shape(shape);
        Self {
            ptr_a: arguments.ptr_a,
            ptr_b: arguments.ptr_b,
            ptr_c: arguments.ptr_c,
            ptr_d: arguments.ptr_d,
            batch_stride_a: arguments.batch_stride_a,
            batch_stride_b: arguments.batch_stride_b,
            batch_stride_c: arguments.batch_stride_c,
            batch_stride_d: arguments.batch_stride_d,
            lda: arguments.lda,
            ldb: arguments.ldb,
            ldc: arguments.ldc,
            ldd: arguments.ldd,
            M: shape.m as i32,
            N: shape.n as i32,
            K: shape.k as i32,
            mode: arguments.mode as i32,
            batch_count: arguments.batch_count,
            alpha: arguments.epilogue.alpha,
            beta: arguments.epilogue.beta,
            tiles_m: tiled_shape.m as i32,
            tiles_n: tiled_shape.n as i32,
            tiles_k: tiled_shape.k as i32,
            swizzle_log_tile: tile.traversal.log_tile() as i32,
            gemm_k_size: shape.k as i32,
            gemm_k_iterations: tile.gemm_k_iterations(shape) as i32,
            device_cores: i32::try_from(device_cores).unwrap_or(i32::MAX),
            core_occupancy: i32::try_from(core_occupancy).unwrap_or(i32::MAX),
            persistent_blocks: i32::try_from(device_cores.saturating_mul(core_occupancy)).unwrap_or(i32::MAX),
        }
    }
}

/// Builds the parameter block of variant `V` for one launch.
///
/// Rejects problems the variant cannot compute before touching the device,
/// then sizes the persistent schedule from the occupancy the launch context
/// reports for the kernel's block footprint.
pub fn build_params<V: GemmKernelVariant>(
    shape: ProblemShape,
    operands: &GemmOperands<V>,
    strides: OperandStrides,
    epilogue: EpilogueScale,
    context: &dyn LaunchContext,
    shared_memory_bytes: usize,
    device_cores: u32,
) -> Result<GemmParams, KernelError> {
    if let Err(reason) = V::can_implement(shape) {
        tracing::warn!(kernel = V::NAME, m = shape.m, n = shape.n, k = shape.k, %reason, "rejecting gemm problem");
        return Err(KernelError::InfeasibleProblem {
            kernel: V::NAME,
            m: shape.m,
            n: shape.n,
            k: shape.k,
            reason,
        });
    }

    let core_occupancy = context.max_occupied_blocks_per_core(context.threads(), shared_memory_bytes)?;
    let arguments = GemmArguments::single_pass(shape, operands, strides, epilogue);
    Ok(GemmParams::from_arguments(&arguments, &V::TILE, device_cores, core_occupancy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::common::{
        BlockDim, DeviceError, ThreadDim,
        kernel::gemm::{DevicePtr, GemmF32Simt32x32x8, GemmF32Simt128x128x8},
    };

    struct FixedOccupancy(Result<u32, DeviceError>);

    impl LaunchContext for FixedOccupancy {
        fn threads(&self) -> ThreadDim {
            ThreadDim::new(256, 1, 1)
        }

        fn blocks(&self) -> BlockDim {
            BlockDim::new(1, 1, 1)
        }

        fn max_occupied_blocks_per_core(
            &self,
            _threads: ThreadDim,
            _dynamic_shared_memory_bytes: usize,
        ) -> Result<u32, DeviceError> {
            self.0.clone()
        }
    }

    fn operands<V: GemmKernelVariant>() -> GemmOperands<V> {
        GemmOperands {
            a: DevicePtr::new(0x100),
            b: DevicePtr::new(0x200),
            c: DevicePtr::new(0x300),
        }
    }

    #[test]
    fn test_params_fields() {
        let shape = ProblemShape::new(300, 200, 20);
        let strides = OperandStrides {
            lda: 20,
            ldb: 200,
            ldc: 200,
        };
        let params = build_params(
            shape,
            &operands::<GemmF32Simt128x128x8>(),
            strides,
            EpilogueScale::PRODUCT,
            &FixedOccupancy(Ok(2)),
            0,
            128,
        )
        .unwrap();

        assert_eq!((params.M, params.N, params.K), (300, 200, 20));
        assert_eq!(params.mode, GemmUniversalMode::Gemm as i32);
        assert_eq!(params.batch_count, 1);
        assert_eq!((params.alpha, params.beta), (1.0, 0.0));
        assert_eq!((params.ptr_c, params.ptr_d), (0x300, 0x300));
        assert_eq!((params.lda, params.ldb, params.ldc, params.ldd), (20, 200, 200, 200));
        assert_eq!(params.batch_stride_a, 0);
        assert_eq!((params.tiles_m, params.tiles_n, params.tiles_k), (3, 2, 1));
        assert_eq!(params.swizzle_log_tile, 1);
        assert_eq!(params.gemm_k_size, 20);
        assert_eq!(params.gemm_k_iterations, 3);
        assert_eq!((params.device_cores, params.core_occupancy, params.persistent_blocks), (128, 2, 256));
    }

    #[test]
    fn test_infeasible_problem_skips_occupancy_query() {
        let error = build_params(
            ProblemShape::new(4, 4, 0),
            &operands::<GemmF32Simt32x32x8>(),
            OperandStrides::default(),
            EpilogueScale::PRODUCT,
            &FixedOccupancy(Err(DeviceError::ZeroOccupancy)),
            0,
            128,
        )
        .unwrap_err();
        assert!(matches!(error, KernelError::InfeasibleProblem { .. }));
    }

    #[test]
    fn test_occupancy_failure_propagates() {
        let error = build_params(
            ProblemShape::new(4, 4, 4),
            &operands::<GemmF32Simt32x32x8>(),
            OperandStrides::default(),
            EpilogueScale::PRODUCT,
            &FixedOccupancy(Err(DeviceError::Generic("device lost".to_string()))),
            0,
            128,
        )
        .unwrap_err();
        assert!(matches!(error, KernelError::OccupancyQuery(DeviceError::Generic(_))));
    }
}
