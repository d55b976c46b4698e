pub mod backend;
pub mod render_loop;
pub mod shaders;
pub mod software;
