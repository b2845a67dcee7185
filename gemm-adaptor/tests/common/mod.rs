#![allow(dead_code)]

use gemm_adaptor::{
    DataType,
    backends::common::kernel::gemm::{
        ArgumentIndices, DEFAULT_KERNEL_NAME, DynamicSliceIndices, KernelDescriptor, KernelRegistry, ProblemShape,
    },
    config::DeviceDescription,
};
use ndarray::Array2;

pub fn registry() -> KernelRegistry {
    KernelRegistry::with_default_variants().expect("default variants register")
}

pub fn get_kernel(
    data_type: DataType,
    shape: ProblemShape,
    slices: DynamicSliceIndices,
) -> KernelDescriptor {
    registry()
        .get_kernel(
            DEFAULT_KERNEL_NAME,
            data_type,
            shape,
            ArgumentIndices::default(),
            slices,
            &DeviceDescription::reference(),
        )
        .expect("kernel for shape")
}

/// Row-major `lhs[m, k] x rhs[k, n]` in f32.
pub fn reference_gemm(
    lhs: &[f32],
    rhs: &[f32],
    shape: ProblemShape,
) -> Vec<f32> {
    let (m, n, k) = (shape.m as usize, shape.n as usize, shape.k as usize);
    let lhs = Array2::from_shape_vec((m, k), lhs.to_vec()).expect("lhs shape");
    let rhs = Array2::from_shape_vec((k, n), rhs.to_vec()).expect("rhs shape");
    lhs.dot(&rhs).iter().copied().collect()
}

pub fn assert_close(
    actual: &[f32],
    expected: &[f32],
    tolerance: f32,
) {
    assert_eq!(actual.len(), expected.len());
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        let scale = e.abs().max(1.0);
        assert!((a - e).abs() <= tolerance * scale, "mismatch at {index}: got {a}, expected {e}");
    }
}
