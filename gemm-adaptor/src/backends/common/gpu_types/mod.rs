//! Parameter structs shared between the host and device GEMM kernels.
//!
//! These `#[repr(C)]` structs are copied byte for byte into the kernel
//! argument buffer, so their layout is the contract with device code.

mod gemm;

pub use gemm::*;
