//! Library side of the `lic` command-line tool.

pub mod logging;
pub mod settings;
pub mod summary;
