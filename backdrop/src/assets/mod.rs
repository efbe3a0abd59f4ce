pub mod container;
pub mod package;
pub mod resolver;
pub mod virtual_source;
