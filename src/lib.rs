pub mod cli_interface;
mod fs;
pub mod format;
pub mod utils;
pub use fs::*;
