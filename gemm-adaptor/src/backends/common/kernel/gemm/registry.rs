use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use super::{
    arguments::{ArgumentIndices, DynamicSliceIndices},
    descriptor::KernelDescriptor,
    problem_shape::ProblemShape,
    tile_configuration::TileConfiguration,
    variant::{
        GemmBF16TensorOp128x128x32, GemmF16TensorOp64x64x32, GemmF16TensorOp128x128x32, GemmF32Simt32x32x8,
        GemmF32Simt128x128x8, GemmKernelVariant,
    },
};
use crate::{DataType, backends::common::KernelError, config::DeviceDescription};

pub const DEFAULT_KERNEL_NAME: &str = "gemm_universal";

/// Coarse problem-size class used to pick a tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ShapeFamily {
    Small,
    Large,
}

impl ShapeFamily {
    const SMALL_EXTENT: u32 = 128;

    pub fn of(shape: ProblemShape) -> Self {
        if shape.m.max(shape.n) < Self::SMALL_EXTENT {
            ShapeFamily::Small
        } else {
            ShapeFamily::Large
        }
    }

    pub fn fallback(&self) -> Self {
        match self {
            ShapeFamily::Small => ShapeFamily::Large,
            ShapeFamily::Large => ShapeFamily::Small,
        }
    }
}

impl fmt::Display for ShapeFamily {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ShapeFamily::Small => f.write_str("small"),
            ShapeFamily::Large => f.write_str("large"),
        }
    }
}

type DescriptorFactory = fn(
    &str,
    ProblemShape,
    ArgumentIndices,
    DynamicSliceIndices,
    &DeviceDescription,
) -> Result<KernelDescriptor, KernelError>;

#[derive(Clone, Copy)]
struct VariantEntry {
    variant: &'static str,
    tile: TileConfiguration,
    shared_memory_bytes: usize,
    factory: DescriptorFactory,
}

/// Summary of a registered variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantInfo {
    pub name: String,
    pub data_type: DataType,
    pub family: ShapeFamily,
    pub variant: &'static str,
    pub tile: TileConfiguration,
    pub shared_memory_bytes: usize,
}

/// Kernel variants addressable by name, element type and shape family.
#[derive(Default)]
pub struct KernelRegistry {
    entries: BTreeMap<(String, DataType, ShapeFamily), VariantEntry>,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_variants() -> Result<Self, KernelError> {
        let mut registry = Self::new();
        registry.register::<GemmF32Simt32x32x8>(DEFAULT_KERNEL_NAME, ShapeFamily::Small)?;
        registry.register::<GemmF32Simt128x128x8>(DEFAULT_KERNEL_NAME, ShapeFamily::Large)?;
        registry.register::<GemmF16TensorOp64x64x32>(DEFAULT_KERNEL_NAME, ShapeFamily::Small)?;
        registry.register::<GemmF16TensorOp128x128x32>(DEFAULT_KERNEL_NAME, ShapeFamily::Large)?;
        registry.register::<GemmBF16TensorOp128x128x32>(DEFAULT_KERNEL_NAME, ShapeFamily::Large)?;
        Ok(registry)
    }

    /// Registers `V` under `name` for its element type, replacing any variant
    /// previously registered for the same key.
    pub fn register<V: GemmKernelVariant>(
        &mut self,
        name: &str,
        family: ShapeFamily,
    ) -> Result<(), KernelError> {
        V::check_layouts()?;

        tracing::debug!(kernel = name, variant = V::NAME, dtype = %V::data_type(), %family, "registered gemm variant");

        self.entries.insert(
            (name.to_string(), V::data_type(), family),
            VariantEntry {
                variant: V::NAME,
                tile: V::TILE,
                shared_memory_bytes: V::shared_memory_bytes(),
                factory: KernelDescriptor::new::<V>,
            },
        );
        Ok(())
    }

    /// Returns the descriptor of the variant registered for the problem's
    /// shape family, or for the other family when there is none.
    pub fn get_kernel(
        &self,
        name: &str,
        data_type: DataType,
        shape: ProblemShape,
        indices: ArgumentIndices,
        slices: DynamicSliceIndices,
        device: &DeviceDescription,
    ) -> Result<KernelDescriptor, KernelError> {
        let family = ShapeFamily::of(shape);
        let entry = [family, family.fallback()]
            .into_iter()
            .find_map(|family| self.entries.get(&(name.to_string(), data_type, family)))
            .ok_or_else(|| KernelError::KernelNotFound {
                name: name.to_string(),
                data_type,
            })?;
        (entry.factory)(name, shape, indices, slices, device)
    }

    pub fn variants(&self) -> Vec<VariantInfo> {
        self.entries
            .iter()
            .map(|((name, data_type, family), entry)| VariantInfo {
                name: name.clone(),
                data_type: *data_type,
                family: *family,
                variant: entry.variant,
                tile: entry.tile,
                shared_memory_bytes: entry.shared_memory_bytes,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
