use gemm_adaptor::{
    DataType,
    backends::{
        common::{
            DeviceMemory, LaunchDimensions,
            gpu_types::{DynamicSliceParams, GemmParams},
            kernel::gemm::{OperandStrides, ProblemShape, ShapeFamily, TileConfiguration},
        },
        cpu::HostLaunchContext,
    },
};
use serde::Serialize;

use super::{ProblemArgs, load_descriptor};

const SYMBOLIC_ADDRESS_STRIDE: u64 = 0x1000_0000;

#[derive(Serialize)]
struct DescribeReport<'a> {
    kernel: &'a str,
    variant: &'static str,
    data_type: DataType,
    shape: ProblemShape,
    family: ShapeFamily,
    dimensions: LaunchDimensions,
    strides: OperandStrides,
    tile: &'a TileConfiguration,
    shared_memory_bytes: usize,
    params: GemmParams,
    slice: DynamicSliceParams,
}

/// Packs the problem against symbolic buffer addresses; nothing is allocated.
pub fn handle_describe(problem: ProblemArgs) -> Result<(), Box<dyn std::error::Error>> {
    let device = problem.device()?;
    let descriptor = load_descriptor(&problem, &device)?;

    let shape = problem.shape();
    let element_bytes = problem.data_type.size_in_bytes();
    let mut sizes = vec![
        (shape.m as usize) * (shape.k as usize) * element_bytes,
        (shape.k as usize) * (shape.n as usize) * element_bytes,
        (shape.output_elements() as usize) * element_bytes,
    ];
    if let Some(index) = problem.slice {
        sizes.resize(sizes.len().max(index + 1), size_of::<i32>());
    }
    let buffers = sizes
        .into_iter()
        .enumerate()
        .map(|(index, bytes)| DeviceMemory::new(SYMBOLIC_ADDRESS_STRIDE * (index as u64 + 1), bytes))
        .collect();
    let args = descriptor.kernel_arguments(buffers);

    let context = HostLaunchContext::new(&device, descriptor.dimensions());
    let packed = descriptor.pack(&context, &args)?;

    let report = DescribeReport {
        kernel: descriptor.name(),
        variant: descriptor.variant(),
        data_type: descriptor.data_type(),
        shape,
        family: ShapeFamily::of(shape),
        dimensions: descriptor.dimensions(),
        strides: descriptor.strides(),
        tile: descriptor.tile(),
        shared_memory_bytes: packed.number_of_shared_bytes(),
        params: packed.decode::<GemmParams>(0)?,
        slice: packed.decode::<DynamicSliceParams>(1)?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
