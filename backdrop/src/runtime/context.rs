use chrono::{Local, Timelike};

use crate::drivers::input::PointerState;

const MINUTES_PER_DAY: f32 = 1440.0;

/// Clock values carried from one tick to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    time: f32,
    time_last: f32,
    daytime: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shifts the previous render time into `time_last` and samples the
    /// wall clock.
    pub fn advance(&mut self, render_time: f32) {
        self.advance_at(render_time, &Local::now());
    }

    pub fn advance_at(&mut self, render_time: f32, now: &impl Timelike) {
        self.daytime = daytime_of(now);
        self.time_last = self.time;
        self.time = render_time;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn time_last(&self) -> f32 {
        self.time_last
    }

    pub fn daytime(&self) -> f32 {
        self.daytime
    }

    pub fn frame<'a>(
        &self,
        pointer: PointerState,
        audio: &'a [f32],
    ) -> FrameContext<'a> {
        FrameContext {
            time: self.time,
            time_last: self.time_last,
            daytime: self.daytime,
            pointer,
            audio,
        }
    }
}

/// Everything a renderer may read for the frame being drawn.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    /// Render clock in seconds.
    pub time: f32,
    pub time_last: f32,
    /// Fraction of the local day elapsed, `0.0..1.0`, minute resolution.
    pub daytime: f32,
    pub pointer: PointerState,
    pub audio: &'a [f32],
}

impl FrameContext<'_> {
    pub fn delta(&self) -> f32 {
        self.time - self.time_last
    }
}

pub fn daytime_of(now: &impl Timelike) -> f32 {
    (now.hour() * 60 + now.minute()) as f32 / MINUTES_PER_DAY
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 59).unwrap()
    }

    #[test]
    fn daytime_has_minute_resolution() {
        assert_eq!(daytime_of(&at(0, 0)), 0.0);
        assert_eq!(daytime_of(&at(12, 0)), 0.5);
        assert_eq!(daytime_of(&at(18, 0)), 0.75);
        assert!(daytime_of(&at(23, 59)) < 1.0);
    }

    #[test]
    fn clock_shifts_previous_time() {
        let mut clock = FrameClock::new();
        clock.advance_at(1.5, &at(6, 0));
        clock.advance_at(1.75, &at(6, 0));

        assert_eq!(clock.time_last(), 1.5);
        assert_eq!(clock.time(), 1.75);
        assert_eq!(clock.daytime(), 0.25);

        let samples = [0.1, 0.2];
        let frame = clock.frame(PointerState::default(), &samples);
        assert_eq!(frame.delta(), 0.25);
        assert_eq!(frame.audio.len(), 2);
    }
}
