mod describe;
mod list;
mod run;

pub use describe::handle_describe;
pub use list::handle_list;
pub use run::handle_run;

use gemm_adaptor::{
    DataType,
    backends::common::kernel::gemm::{
        ArgumentIndices, DynamicSliceIndices, KernelDescriptor, KernelRegistry, ProblemShape,
    },
    config::DeviceDescription,
};

/// Problem selection shared by `describe` and `run`.
pub struct ProblemArgs {
    pub kernel: String,
    pub data_type: DataType,
    pub m: u32,
    pub n: u32,
    pub k: u32,
    pub slice: Option<usize>,
    pub device_path: Option<String>,
}

impl ProblemArgs {
    pub fn shape(&self) -> ProblemShape {
        ProblemShape::new(self.m, self.n, self.k)
    }

    /// Slice offset position; it must come after the operands so it can not
    /// replace one of them.
    pub fn slices(&self) -> Result<DynamicSliceIndices, Box<dyn std::error::Error>> {
        let operands = ArgumentIndices::default();
        let first_free = operands.lhs.max(operands.rhs).max(operands.out) + 1;
        if let Some(index) = self.slice.filter(|&index| index < first_free) {
            return Err(format!("slice index {index} overlaps an operand argument, use {first_free} or above").into());
        }
        Ok(DynamicSliceIndices {
            out: self.slice,
        })
    }

    pub fn device(&self) -> Result<DeviceDescription, Box<dyn std::error::Error>> {
        match &self.device_path {
            Some(path) => Ok(DeviceDescription::from_path(path)?),
            None => Ok(DeviceDescription::reference()),
        }
    }
}

fn load_descriptor(
    problem: &ProblemArgs,
    device: &DeviceDescription,
) -> Result<KernelDescriptor, Box<dyn std::error::Error>> {
    let registry = KernelRegistry::with_default_variants()?;
    let descriptor = registry.get_kernel(
        &problem.kernel,
        problem.data_type,
        problem.shape(),
        ArgumentIndices::default(),
        problem.slices()?,
        device,
    )?;
    Ok(descriptor)
}
