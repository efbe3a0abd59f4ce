#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoopState {
    #[default]
    Running,
    /// Another application holds an output fullscreen.
    Paused,
    Stopped,
}

/// Edge produced by a state change, so callers only notify the renderer
/// once per pause or resume.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    Unchanged,
    Paused,
    Resumed,
    Stopped,
}

impl LoopState {
    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    pub fn is_paused(self) -> bool {
        self == Self::Paused
    }

    pub fn is_stopped(self) -> bool {
        self == Self::Stopped
    }

    /// Feeds the latest fullscreen probe. A stopped loop never restarts.
    pub fn observe_fullscreen(&mut self, fullscreen: bool) -> Transition {
        match (*self, fullscreen) {
            (Self::Running, true) => {
                *self = Self::Paused;
                Transition::Paused
            }
            (Self::Paused, false) => {
                *self = Self::Running;
                Transition::Resumed
            }
            _ => Transition::Unchanged,
        }
    }

    pub fn stop(&mut self) -> Transition {
        if self.is_stopped() {
            return Transition::Unchanged;
        }
        *self = Self::Stopped;
        Transition::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_and_resume_fire_once() {
        let mut state = LoopState::default();
        assert_eq!(state.observe_fullscreen(false), Transition::Unchanged);
        assert_eq!(state.observe_fullscreen(true), Transition::Paused);
        assert_eq!(state.observe_fullscreen(true), Transition::Unchanged);
        assert!(state.is_paused());
        assert_eq!(state.observe_fullscreen(false), Transition::Resumed);
        assert!(state.is_running());
    }

    #[test]
    fn stopped_is_terminal() {
        let mut state = LoopState::Paused;
        assert_eq!(state.stop(), Transition::Stopped);
        assert_eq!(state.stop(), Transition::Unchanged);
        assert_eq!(state.observe_fullscreen(false), Transition::Unchanged);
        assert_eq!(state.observe_fullscreen(true), Transition::Unchanged);
        assert!(state.is_stopped());
    }
}
