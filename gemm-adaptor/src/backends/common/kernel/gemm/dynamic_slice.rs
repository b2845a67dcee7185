use super::arguments::{DynamicSliceIndices, argument_memory};
use crate::backends::common::{KernelArguments, KernelError, gpu_types::DynamicSliceParams};

impl DynamicSliceParams {
    pub const NONE: Self = Self {
        out: 0,
    };

    /// Forwards the address of the offset buffer; the kernel reads the offset
    /// itself, so its value may still be pending on the device.
    pub fn from_arguments(
        args: &KernelArguments,
        slices: &DynamicSliceIndices,
    ) -> Result<Self, KernelError> {
        match slices.out {
            Some(index) => Ok(Self {
                out: argument_memory(args, "out slice", index)?.address(),
            }),
            None => Ok(Self::NONE),
        }
    }

    pub fn is_none(&self) -> bool {
        self.out == 0
    }
}
