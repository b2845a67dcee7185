pub mod backends;
pub mod config;
mod data_type;
pub mod prelude;

pub use data_type::{ArrayElement, DataType};
