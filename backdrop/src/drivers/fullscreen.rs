pub trait FullscreenDetector {
    /// True while any competing window covers an output exclusively.
    fn any_fullscreen(&mut self) -> bool;

    /// Drops cached window state, e.g. after outputs change.
    fn reset(&mut self) {}
}

/// Used when no window server could be identified.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopFullscreenDetector;

impl FullscreenDetector for NoopFullscreenDetector {
    fn any_fullscreen(&mut self) -> bool {
        false
    }
}
