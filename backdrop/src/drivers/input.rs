#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Position in desktop pixels.
    pub position: [f64; 2],
    pub left_down: bool,
    pub right_down: bool,
}

pub trait InputDriver {
    /// Refreshes pointer state from the backend. Called once per tick.
    fn update(&mut self);

    fn pointer(&self) -> PointerState;
}
