// File I/O operations

pub mod csv;
pub mod native;
pub mod xlsx;
