pub mod config;
pub mod diagnostics;
pub mod image;
pub mod loader;
pub mod mtl_loader;
pub mod obj_loader;
