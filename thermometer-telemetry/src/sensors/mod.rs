/// SHT31-D humidity and temperature sensor
pub mod sht31;
