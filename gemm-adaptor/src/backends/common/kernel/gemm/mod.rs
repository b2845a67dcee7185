mod arguments;
mod descriptor;
mod dynamic_slice;
mod geometry;
mod layout;
mod packing;
mod params;
mod problem_shape;
mod registry;
mod tile_configuration;
mod variant;

pub use arguments::{ArgumentIndices, DevicePtr, DynamicSliceIndices, GemmOperands};
pub use descriptor::KernelDescriptor;
pub use geometry::launch_dimensions;
pub use layout::{Layout, Operand, OperandStrides, leading_dimension};
pub use packing::{PackedKernelArgs, PackingFn, args_packing};
pub use params::{EpilogueScale, GemmArguments, build_params};
pub use problem_shape::{ProblemShape, TileCoord};
pub use registry::{DEFAULT_KERNEL_NAME, KernelRegistry, ShapeFamily, VariantInfo};
pub use tile_configuration::{TileConfiguration, TileTraversal};
pub use variant::{
    GemmBF16TensorOp128x128x32, GemmF16TensorOp64x64x32, GemmF16TensorOp128x128x32, GemmF32Simt32x32x8,
    GemmF32Simt128x128x8, GemmKernelVariant,
};
