// src/utils/mod.rs
pub mod clipboard;
mod format;
mod io;

pub use format::*;
pub use io::*;
