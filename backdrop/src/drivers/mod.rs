pub mod fullscreen;
pub mod input;
pub mod selector;
pub mod video;
