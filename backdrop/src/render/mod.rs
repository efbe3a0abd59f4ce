pub mod renderer;
pub mod screenshot;
