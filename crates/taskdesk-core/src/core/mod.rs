pub mod records;
pub mod services;
