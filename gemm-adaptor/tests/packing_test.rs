mod common;

use gemm_adaptor::{
    DataType,
    backends::{
        common::{
            BlockDim, DeviceError, DeviceMemory, KernelArguments, KernelError, LaunchContext, ThreadDim,
            gpu_types::{DynamicSliceParams, GemmParams},
            kernel::gemm::{
                ArgumentIndices, DEFAULT_KERNEL_NAME, DynamicSliceIndices, GemmKernelVariant, KernelDescriptor,
                KernelRegistry, Layout, Operand, ProblemShape, ShapeFamily, TileConfiguration, TileTraversal,
            },
        },
        cpu::HostLaunchContext,
    },
    config::DeviceDescription,
};

fn fake_arguments(
    count: usize,
    shared_memory_bytes: usize,
) -> KernelArguments {
    let buffers = (0..count).map(|index| DeviceMemory::new(0x10_0000 * (index as u64 + 1), 4096)).collect();
    KernelArguments::new(buffers, shared_memory_bytes)
}

fn pack_params(
    descriptor: &KernelDescriptor,
    args: &KernelArguments,
) -> Result<(GemmParams, DynamicSliceParams), KernelError> {
    let description = DeviceDescription::reference();
    let context = HostLaunchContext::new(&description, descriptor.dimensions());
    let packed = descriptor.pack(&context, args)?;
    assert_eq!(packed.number_of_arguments(), 2);
    Ok((packed.decode::<GemmParams>(0)?, packed.decode::<DynamicSliceParams>(1)?))
}

struct ColumnMajorRhs;

impl GemmKernelVariant for ColumnMajorRhs {
    type ElementA = f32;
    type ElementB = f32;
    type ElementC = f32;

    const NAME: &'static str = "gemm_f32_simt_column_major_rhs";
    const TILE: TileConfiguration = TileConfiguration::new(
        32,
        32,
        8,
        64,
        2,
        TileTraversal::Identity {
            log_tile: 0,
        },
    );
    const LAYOUT_B: Layout = Layout::ColumnMajor;
}

struct FailingOccupancy;

impl LaunchContext for FailingOccupancy {
    fn threads(&self) -> ThreadDim {
        ThreadDim::new(64, 1, 1)
    }

    fn blocks(&self) -> BlockDim {
        BlockDim::new(1, 1, 1)
    }

    fn max_occupied_blocks_per_core(
        &self,
        _threads: ThreadDim,
        _dynamic_shared_memory_bytes: usize,
    ) -> Result<u32, DeviceError> {
        Err(DeviceError::Generic("occupancy calculator unavailable".to_string()))
    }
}

#[test]
fn row_major_strides_for_every_element_type() {
    let shape = ProblemShape::new(64, 48, 32);
    for data_type in [DataType::F32, DataType::F16, DataType::BF16] {
        let descriptor = common::get_kernel(data_type, shape, DynamicSliceIndices::default());
        let strides = descriptor.strides();
        assert_eq!((strides.lda, strides.ldb, strides.ldc), (32, 48, 48), "{data_type}");

        let args = descriptor.kernel_arguments(fake_arguments(3, 0).buffers().to_vec());
        let (params, _) = pack_params(&descriptor, &args).unwrap();
        assert_eq!((params.lda, params.ldb, params.ldc, params.ldd), (32, 48, 48, 48), "{data_type}");
    }
}

#[test]
fn threads_are_fixed_and_grid_covers_problem() {
    for (m, n, k) in [(32, 32, 8), (128, 256, 64), (512, 128, 16), (1024, 1024, 8)] {
        let shape = ProblemShape::new(m, n, k);
        let descriptor = common::get_kernel(DataType::F32, shape, DynamicSliceIndices::default());
        let tile = descriptor.tile();
        let dimensions = descriptor.dimensions();
        assert_eq!(dimensions.threads, ThreadDim::new(tile.thread_count, 1, 1));

        let blocks = dimensions.blocks;
        let (grid_m, grid_n) = match tile.traversal {
            TileTraversal::Horizontal => (blocks.y, blocks.x),
            TileTraversal::Identity {
                log_tile,
            } => (blocks.x >> log_tile, blocks.y << log_tile),
        };
        assert!(grid_m * tile.tile_m >= m, "{shape}");
        assert!(grid_n * tile.tile_n >= n, "{shape}");
    }
}

#[test]
fn packing_is_pure() {
    let descriptor = common::get_kernel(DataType::F32, ProblemShape::new(256, 256, 64), DynamicSliceIndices::default());
    let description = DeviceDescription::reference();
    let context = HostLaunchContext::new(&description, descriptor.dimensions());
    let args = descriptor.kernel_arguments(fake_arguments(3, 0).buffers().to_vec());

    let first = descriptor.pack(&context, &args).unwrap();
    let second = descriptor.pack(&context, &args).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(first.number_of_shared_bytes(), descriptor.shared_memory_bytes());
}

#[test]
fn packing_from_several_threads() {
    let descriptor = common::get_kernel(DataType::F32, ProblemShape::new(300, 200, 40), DynamicSliceIndices::default());
    let args = fake_arguments(3, 0);
    let expected = pack_params(&descriptor, &args).unwrap();

    let (descriptor, args) = (&descriptor, &args);
    std::thread::scope(|scope| {
        let handles: Vec<_> =
            (0..4).map(move |_| scope.spawn(move || pack_params(descriptor, args).unwrap())).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn params_carry_problem_and_schedule() {
    let shape = ProblemShape::new(300, 200, 40);
    let descriptor = common::get_kernel(DataType::F32, shape, DynamicSliceIndices::default());
    let args = descriptor.kernel_arguments(fake_arguments(3, 0).buffers().to_vec());
    let (params, slice) = pack_params(&descriptor, &args).unwrap();

    assert_eq!((params.M, params.N, params.K), (300, 200, 40));
    assert_eq!(params.batch_count, 1);
    assert_eq!((params.alpha, params.beta), (1.0, 0.0));
    assert_eq!(params.ptr_a, args.buffers()[0].address());
    assert_eq!(params.ptr_b, args.buffers()[1].address());
    assert_eq!(params.ptr_c, args.buffers()[2].address());
    assert_eq!(params.ptr_d, params.ptr_c);
    assert_eq!(params.device_cores, 128);
    assert!(params.core_occupancy > 0);
    assert_eq!(params.persistent_blocks, params.device_cores * params.core_occupancy);
    assert!(slice.is_none());
}

#[test]
fn device_cores_follow_device_description() {
    let description = DeviceDescription {
        core_count: 80,
        ..DeviceDescription::reference()
    };
    let descriptor = common::registry()
        .get_kernel(
            DEFAULT_KERNEL_NAME,
            DataType::F32,
            ProblemShape::new(64, 64, 64),
            ArgumentIndices::default(),
            DynamicSliceIndices::default(),
            &description,
        )
        .unwrap();
    let context = HostLaunchContext::new(&description, descriptor.dimensions());
    let packed = descriptor.pack(&context, &fake_arguments(3, 0)).unwrap();
    assert_eq!(packed.decode::<GemmParams>(0).unwrap().device_cores, 80);
}

#[test]
fn infeasible_problem_names_its_size() {
    let shape = ProblemShape::new(64, 60, 64);
    let descriptor = common::get_kernel(DataType::F16, shape, DynamicSliceIndices::default());
    let error = pack_params(&descriptor, &fake_arguments(3, 0)).unwrap_err();
    assert!(matches!(error, KernelError::InfeasibleProblem { .. }));
    assert!(error.to_string().contains("m=64, n=60, k=64"), "{error}");
    assert!(error.to_string().contains("can not implement gemm"), "{error}");
}

#[test]
fn zero_reduction_dimension_is_rejected() {
    let descriptor = common::get_kernel(DataType::F32, ProblemShape::new(4, 4, 0), DynamicSliceIndices::default());
    let error = pack_params(&descriptor, &fake_arguments(3, 0)).unwrap_err();
    assert!(error.to_string().contains("m=4, n=4, k=0"), "{error}");
}

#[test]
fn dynamic_slice_forwards_buffer_address() {
    let shape = ProblemShape::new(16, 16, 16);
    let args = fake_arguments(4, 0);

    let unsliced = common::get_kernel(DataType::F32, shape, DynamicSliceIndices::default());
    let (_, slice) = pack_params(&unsliced, &args).unwrap();
    assert_eq!(slice.out, 0);

    let sliced = common::get_kernel(
        DataType::F32,
        shape,
        DynamicSliceIndices {
            out: Some(3),
        },
    );
    let (_, slice) = pack_params(&sliced, &args).unwrap();
    assert_eq!(slice.out, args.buffers()[3].address());
}

#[test]
fn out_of_range_indices_are_errors() {
    let registry = common::registry();
    let descriptor = registry
        .get_kernel(
            DEFAULT_KERNEL_NAME,
            DataType::F32,
            ProblemShape::new(8, 8, 8),
            ArgumentIndices::new(0, 1, 5),
            DynamicSliceIndices::default(),
            &DeviceDescription::reference(),
        )
        .unwrap();
    let error = pack_params(&descriptor, &fake_arguments(3, 0)).unwrap_err();
    assert!(matches!(
        error,
        KernelError::ArgumentIndexOutOfBounds {
            operand: "out",
            index: 5,
            len: 3,
        }
    ));
}

#[test]
fn occupancy_failure_propagates() {
    let descriptor = common::get_kernel(DataType::F32, ProblemShape::new(8, 8, 8), DynamicSliceIndices::default());
    let error = descriptor.pack(&FailingOccupancy, &fake_arguments(3, 0)).unwrap_err();
    assert!(matches!(error, KernelError::OccupancyQuery(DeviceError::Generic(_))));
}

#[test]
fn shared_memory_over_block_limit_is_an_occupancy_error() {
    let descriptor = common::get_kernel(DataType::F32, ProblemShape::new(8, 8, 8), DynamicSliceIndices::default());
    let error = pack_params(&descriptor, &fake_arguments(3, 1 << 20)).unwrap_err();
    assert!(matches!(error, KernelError::OccupancyQuery(DeviceError::SharedMemoryExceeded { .. })));
}

#[test]
fn column_major_variant_is_rejected_when_registered() {
    let mut registry = KernelRegistry::new();
    let error = registry.register::<ColumnMajorRhs>("column_major", ShapeFamily::Small).unwrap_err();
    assert!(matches!(
        error,
        KernelError::UnsupportedLayout {
            operand: Operand::Rhs,
            layout: Layout::ColumnMajor,
            ..
        }
    ));
    assert!(registry.is_empty());

    let error = KernelDescriptor::new::<ColumnMajorRhs>(
        "column_major",
        ProblemShape::new(8, 8, 8),
        ArgumentIndices::default(),
        DynamicSliceIndices::default(),
        &DeviceDescription::reference(),
    )
    .unwrap_err();
    assert!(matches!(error, KernelError::UnsupportedLayout { .. }));
}

#[test]
fn unknown_kernels_are_not_found() {
    let registry = common::registry();
    let device = DeviceDescription::reference();
    for (name, data_type) in [(DEFAULT_KERNEL_NAME, DataType::I32), ("gemm_missing", DataType::F32)] {
        let error = registry
            .get_kernel(
                name,
                data_type,
                ProblemShape::new(8, 8, 8),
                ArgumentIndices::default(),
                DynamicSliceIndices::default(),
                &device,
            )
            .unwrap_err();
        assert!(matches!(error, KernelError::KernelNotFound { .. }), "{name} {data_type}");
    }
}

#[test]
fn parameter_block_fits_constant_bank() {
    assert!(size_of::<GemmParams>() < 512);
    let descriptor = common::get_kernel(DataType::F32, ProblemShape::new(8, 8, 8), DynamicSliceIndices::default());
    let description = DeviceDescription::reference();
    let context = HostLaunchContext::new(&description, descriptor.dimensions());
    let packed = descriptor.pack(&context, &fake_arguments(3, 0)).unwrap();
    assert_eq!(packed.argument(0).map(<[u8]>::len), Some(size_of::<GemmParams>()));
    assert_eq!(packed.argument(1).map(<[u8]>::len), Some(size_of::<DynamicSliceParams>()));
}
