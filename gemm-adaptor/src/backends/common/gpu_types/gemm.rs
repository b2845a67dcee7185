//! GEMM kernel parameter structs.
//!
//! Field names use uppercase for matrix dimensions (M, N, K) to match
//! standard BLAS/GEMM convention.

#![allow(non_snake_case)]

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GemmUniversalMode {
    Gemm = 0,
    GemmSplitKParallel = 1,
    Batched = 2,
    Array = 3,
}

/// Parameters of a GEMM launch, passed to the kernel by value.
///
/// Pointers are device addresses; `ptr_c` is the epilogue source and `ptr_d`
/// the destination, they may alias.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Pod, Zeroable, Serialize)]
pub struct GemmParams {
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
    pub M: i32,
    pub N: i32,
    pub K: i32,
    pub mode: i32,
    pub batch_count: i32,
    pub alpha: f32,
    pub beta: f32,
    pub tiles_m: i32,
    pub tiles_n: i32,
    pub tiles_k: i32,
    pub swizzle_log_tile: i32,
    pub gemm_k_size: i32,
    pub gemm_k_iterations: i32,
    /// Number of device cores the persistent loop is spread over.
    pub device_cores: i32,
    /// Resident blocks per core for this kernel's footprint.
    pub core_occupancy: i32,
    pub persistent_blocks: i32,
}

// Kernel parameters live in the device's constant bank, which is small.
const _: () = assert!(std::mem::size_of::<GemmParams>() < 512, "GemmParams struct size is unexpectedly large");

/// Device address of an `i32` offset the kernel applies to its output
/// pointers, or 0 when the output is not sliced.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable, Serialize)]
pub struct DynamicSliceParams {
    pub out: u64,
}
