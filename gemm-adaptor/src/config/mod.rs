mod device;
mod error;

pub use device::DeviceDescription;
pub use error::ConfigError;
