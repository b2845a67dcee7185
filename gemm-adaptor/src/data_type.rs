use std::{fmt, str::FromStr};

use bytemuck::Pod;
use half::{bf16, f16};
use num_traits::NumCast;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    // Floating point
    BF16,
    F16,
    F32,
    // Integers
    I32,
}

impl DataType {
    pub const fn size_in_bits(&self) -> usize {
        match self {
            DataType::BF16 | DataType::F16 => 16,
            DataType::F32 | DataType::I32 => 32,
        }
    }

    pub const fn size_in_bytes(&self) -> usize {
        self.size_in_bits().div_ceil(8)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            DataType::BF16 => "bf16",
            DataType::F16 => "f16",
            DataType::F32 => "f32",
            DataType::I32 => "i32",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bf16" | "bfloat16" => Ok(DataType::BF16),
            "f16" | "float16" => Ok(DataType::F16),
            "f32" | "float32" => Ok(DataType::F32),
            "i32" | "int32" => Ok(DataType::I32),
            other => Err(format!("unknown data type: {other}")),
        }
    }
}

pub trait ArrayElement: NumCast + Pod + Send + Sync + 'static {
    fn data_type() -> DataType;
}

macro_rules! impl_array_element {
    ($($type:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ArrayElement for $type {
                fn data_type() -> DataType {
                    DataType::$variant
                }
            }
        )+
    };
}

impl_array_element! {
    f16 => F16,
    bf16 => BF16,
    f32 => F32,
    i32 => I32,
}
