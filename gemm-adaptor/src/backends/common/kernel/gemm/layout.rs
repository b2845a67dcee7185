use std::fmt;

use serde::Serialize;

use super::{problem_shape::ProblemShape, variant::GemmKernelVariant};
use crate::backends::common::KernelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Layout {
    RowMajor,
    ColumnMajor,
}

impl Layout {
    /// Extent of the operand along its contiguous axis.
    pub fn contiguous_extent(
        &self,
        operand: Operand,
        shape: ProblemShape,
    ) -> u32 {
        match (self, operand) {
            (Layout::RowMajor, Operand::Lhs) => shape.k,
            (Layout::RowMajor, Operand::Rhs | Operand::Output) => shape.n,
            (Layout::ColumnMajor, Operand::Lhs | Operand::Output) => shape.m,
            (Layout::ColumnMajor, Operand::Rhs) => shape.k,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Layout::RowMajor => f.write_str("row-major"),
            Layout::ColumnMajor => f.write_str("column-major"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operand {
    Lhs,
    Rhs,
    Output,
}

impl fmt::Display for Operand {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Operand::Lhs => f.write_str("lhs"),
            Operand::Rhs => f.write_str("rhs"),
            Operand::Output => f.write_str("output"),
        }
    }
}

/// Leading dimension of `operand` stored with `layout`. Only row-major
/// operands are supported.
pub fn leading_dimension(
    kernel: &'static str,
    operand: Operand,
    layout: Layout,
    shape: ProblemShape,
) -> Result<i64, KernelError> {
    match layout {
        Layout::RowMajor => Ok(match operand {
            Operand::Lhs => shape.k as i64,
            Operand::Rhs | Operand::Output => shape.n as i64,
        }),
        Layout::ColumnMajor => Err(KernelError::UnsupportedLayout {
            kernel,
            operand,
            layout,
        }),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OperandStrides {
    pub lda: i64,
    pub ldb: i64,
    pub ldc: i64,
}

impl OperandStrides {
    pub fn for_variant<V: GemmKernelVariant>(shape: ProblemShape) -> Result<Self, KernelError> {
        Ok(Self {
            lda: leading_dimension(V::NAME, Operand::Lhs, V::LAYOUT_A, shape)?,
            ldb: leading_dimension(V::NAME, Operand::Rhs, V::LAYOUT_B, shape)?,
            ldc: leading_dimension(V::NAME, Operand::Output, V::LAYOUT_C, shape)?,
        })
    }
}
