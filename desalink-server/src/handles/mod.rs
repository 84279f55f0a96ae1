mod esp32_handle;
mod logger_handle;
mod sensor_handle;

pub use esp32_handle::*;
pub use logger_handle::*;
pub use sensor_handle::*;
