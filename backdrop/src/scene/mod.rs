pub mod project;
pub mod property;
