pub mod app;
pub mod context;
pub mod loop_state;
pub mod registry;
pub mod signals;
pub mod state;
