mod cli_struct;
mod shell;
pub use cli_struct::*;
pub use shell::*;
