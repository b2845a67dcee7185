use std::{fmt, marker::PhantomData};

use serde::{Deserialize, Serialize};

use super::variant::GemmKernelVariant;
use crate::backends::common::{DeviceMemory, KernelArguments, KernelError};

/// Positions of the GEMM operands in the runtime argument list.
///
/// `out` doubles as the epilogue source, so it may coincide with any other
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgumentIndices {
    pub lhs: usize,
    pub rhs: usize,
    pub out: usize,
}

impl ArgumentIndices {
    pub const fn new(
        lhs: usize,
        rhs: usize,
        out: usize,
    ) -> Self {
        Self {
            lhs,
            rhs,
            out,
        }
    }
}

impl Default for ArgumentIndices {
    fn default() -> Self {
        Self::new(0, 1, 2)
    }
}

/// Position of the buffer holding the output slice offset, if the output is
/// dynamically sliced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicSliceIndices {
    pub out: Option<usize>,
}

/// Device address reinterpreted as a pointer to `T` elements.
pub struct DevicePtr<T> {
    address: u64,
    _element: PhantomData<fn() -> T>,
}

impl<T> DevicePtr<T> {
    pub const fn new(address: u64) -> Self {
        Self {
            address,
            _element: PhantomData,
        }
    }

    pub fn address(&self) -> u64 {
        self.address
    }
}

impl<T> Clone for DevicePtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DevicePtr<T> {}

impl<T> PartialEq for DevicePtr<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.address == other.address
    }
}

impl<T> Eq for DevicePtr<T> {}

impl<T> fmt::Debug for DevicePtr<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "DevicePtr<{}>({:#x})", std::any::type_name::<T>(), self.address)
    }
}

/// Looks up `index` in `args`, naming `operand` in the error.
pub(crate) fn argument_memory(
    args: &KernelArguments,
    operand: &'static str,
    index: usize,
) -> Result<DeviceMemory, KernelError> {
    args.device_memory(index).ok_or(KernelError::ArgumentIndexOutOfBounds {
        operand,
        index,
        len: args.len(),
    })
}

/// Typed operand pointers of one launch of variant `V`.
pub struct GemmOperands<V: GemmKernelVariant> {
    pub a: DevicePtr<V::ElementA>,
    pub b: DevicePtr<V::ElementB>,
    pub c: DevicePtr<V::ElementC>,
}

impl<V: GemmKernelVariant> GemmOperands<V> {
    pub fn extract(
        args: &KernelArguments,
        indices: &ArgumentIndices,
    ) -> Result<Self, KernelError> {
        Ok(Self {
            a: DevicePtr::new(argument_memory(args, "lhs", indices.lhs)?.address()),
            b: DevicePtr::new(argument_memory(args, "rhs", indices.rhs)?.address()),
            c: DevicePtr::new(argument_memory(args, "out", indices.out)?.address()),
        })
    }
}

impl<V: GemmKernelVariant> fmt::Debug for GemmOperands<V> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("GemmOperands").field("a", &self.a).field("b", &self.b).field("c", &self.c).finish()
    }
}
