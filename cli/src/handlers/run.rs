use std::time::Instant;

use console::Style;
use gemm_adaptor::{
    ArrayElement, DataType,
    backends::{common::KernelError, cpu::HostDevice},
};
use half::{bf16, f16};
use num_traits::NumCast;

use super::{ProblemArgs, load_descriptor};

pub fn handle_run(
    problem: ProblemArgs,
    lhs: f32,
    rhs: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    match problem.data_type {
        DataType::F32 => run_typed::<f32>(problem, lhs, rhs),
        DataType::F16 => run_typed::<f16>(problem, lhs, rhs),
        DataType::BF16 => run_typed::<bf16>(problem, lhs, rhs),
        other => Err(KernelError::UnsupportedDataType(other).into()),
    }
}

fn element<T: ArrayElement>(value: f32) -> Result<T, Box<dyn std::error::Error>> {
    <T as NumCast>::from(value)
        .ok_or_else(|| format!("{value} is not representable as {}", T::data_type()).into())
}

fn run_typed<T: ArrayElement>(
    problem: ProblemArgs,
    lhs: f32,
    rhs: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let device = HostDevice::new(problem.device()?);
    let descriptor = load_descriptor(&problem, device.description())?;
    let shape = problem.shape();

    let lhs_buffer = device.fill(element::<T>(lhs)?, (shape.m as usize) * (shape.k as usize))?;
    let rhs_buffer = device.fill(element::<T>(rhs)?, (shape.k as usize) * (shape.n as usize))?;

    // With a slice index the output holds `offset + 1` matrices and the
    // kernel writes the last one.
    let (out_matrices, offset_buffer) = match problem.slice {
        Some(_) => (2, Some(device.upload(&[1i32])?)),
        None => (1, None),
    };
    let out_buffer = device.fill(element::<T>(0.0)?, out_matrices * shape.output_elements() as usize)?;

    let mut buffers = vec![lhs_buffer.memory(), rhs_buffer.memory(), out_buffer.memory()];
    if let (Some(index), Some(offset)) = (problem.slice, &offset_buffer) {
        buffers.resize(buffers.len().max(index + 1), offset.memory());
        buffers[index] = offset.memory();
    }
    let args = descriptor.kernel_arguments(buffers);

    let started = Instant::now();
    device.launch(&descriptor, &args)?;
    let elapsed = started.elapsed();
    tracing::info!(variant = descriptor.variant(), elapsed_ms = elapsed.as_secs_f64() * 1000.0, "host launch finished");

    let output = out_buffer.read::<T>();
    let written = &output[(out_matrices - 1) * shape.output_elements() as usize..];
    let checksum: f64 = written.iter().map(|value| value.to_f64().unwrap_or(f64::NAN)).sum();

    let style_title = Style::new().bold();
    let style_stats = Style::new().dim();
    println!("{}", style_title.apply_to(format!("{} ({}, {})", descriptor.variant(), descriptor.data_type(), shape)));
    println!("grid: {:?}, threads: {:?}", descriptor.dimensions().blocks, descriptor.dimensions().threads);
    println!("checksum: {checksum}");
    println!("{}", style_stats.apply_to(format!("{:.3}ms on host", elapsed.as_secs_f64() * 1000.0)));

    Ok(())
}
