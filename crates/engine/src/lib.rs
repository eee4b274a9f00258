pub mod address;
pub mod cell;
pub mod clipboard;
pub mod error;
pub mod grid;
pub mod history;
pub mod session;
pub mod snapshot;
pub mod tabular;
