//! Audio capture feeding audio-reactive backgrounds.
//!
//! Only raw sample capture lives here; spectrum analysis belongs to the
//! renderer.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;

use crate::core::settings::AudioSettings;

pub trait AudioRecorder {
    /// Pulls whatever the capture thread produced since the last call.
    fn update(&mut self);

    /// Latest window of mono samples, always `buffer_size` long.
    fn current_buffer(&self) -> &[f32];

    /// Releases the capture device. Further updates keep returning the
    /// last buffer.
    fn stop(&mut self) {}
}

/// Yields silence. Used when audio processing is disabled.
pub struct NullRecorder {
    buffer: Vec<f32>,
}

impl NullRecorder {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer: vec![0.0; buffer_size],
        }
    }
}

impl AudioRecorder for NullRecorder {
    fn update(&mut self) {}

    fn current_buffer(&self) -> &[f32] {
        &self.buffer
    }
}

/// Sample ring shared between the capture callback and the main loop.
#[derive(Clone)]
pub struct SampleRing {
    inner: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Appends interleaved frames, keeping only the first channel.
    pub fn push_interleaved(&self, data: &[f32], channels: usize) {
        let mut ring = self.inner.lock();
        for sample in data.iter().step_by(channels.max(1)) {
            if ring.len() == self.capacity {
                ring.pop_front();
            }
            ring.push_back(*sample);
        }
    }

    /// Copies the newest `out.len()` samples into `out`, zero-padding the
    /// front when fewer are available.
    pub fn copy_latest(&self, out: &mut [f32]) {
        let ring = self.inner.lock();
        let available = ring.len().min(out.len());
        let pad = out.len() - available;

        out[..pad].fill(0.0);
        let newest = ring.range(ring.len() - available..);
        for (dst, src) in out[pad..].iter_mut().zip(newest) {
            *dst = *src;
        }
    }
}

/// Captures system playback through a loopback/monitor input device.
pub struct LoopbackRecorder {
    ring: SampleRing,
    buffer: Vec<f32>,
    #[cfg(feature = "loopback-audio")]
    stream: Option<cpal::Stream>,
}

impl LoopbackRecorder {
    /// Opens the capture stream. Device failures are logged and leave the
    /// recorder producing silence.
    pub fn start(settings: &AudioSettings) -> Self {
        let buffer_size = settings.buffer_size.max(1);
        let mut recorder = Self {
            ring: SampleRing::new(buffer_size * 4),
            buffer: vec![0.0; buffer_size],
            #[cfg(feature = "loopback-audio")]
            stream: None,
        };
        recorder.open(&settings.device);
        recorder
    }

    pub fn ring(&self) -> &SampleRing {
        &self.ring
    }

    #[cfg(feature = "loopback-audio")]
    fn open(&mut self, device_name: &str) {
        match capture::open_stream(device_name, self.ring.clone()) {
            Ok(stream) => self.stream = Some(stream),
            Err(err) => {
                warn!("Audio capture unavailable, continuing silent: {}", err);
            }
        }
    }

    #[cfg(not(feature = "loopback-audio"))]
    fn open(&mut self, _device_name: &str) {
        warn!(
            "Audio capture was not compiled in (feature `loopback-audio`); \
             continuing silent"
        );
    }
}

impl AudioRecorder for LoopbackRecorder {
    fn update(&mut self) {
        self.ring.copy_latest(&mut self.buffer);
    }

    fn current_buffer(&self) -> &[f32] {
        &self.buffer
    }

    fn stop(&mut self) {
        #[cfg(feature = "loopback-audio")]
        if self.stream.take().is_some() {
            log::debug!("Audio stream stopped");
        }
    }
}

#[cfg(feature = "loopback-audio")]
mod capture {
    use std::error::Error;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{Device, Stream, StreamConfig};
    use log::{error, info};

    use super::SampleRing;

    pub fn open_stream(
        device_name: &str,
        ring: SampleRing,
    ) -> Result<Stream, Box<dyn Error>> {
        let device = select_device(device_name)?;
        let config: StreamConfig = device.default_input_config()?.into();
        let channels = config.channels as usize;

        if channels < 1 {
            return Err("Device must have at least one channel".into());
        }

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _| ring.push_interleaved(data, channels),
            move |err| error!("Error in audio stream: {}", err),
            None,
        )?;

        stream.play()?;
        info!(
            "Audio connected to device: {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        Ok(stream)
    }

    // Explicit name, else the first monitor source, else the default input.
    fn select_device(device_name: &str) -> Result<Device, Box<dyn Error>> {
        let host = cpal::default_host();
        let find = |wanted: &dyn Fn(&str) -> bool| {
            host.input_devices().map(|mut devices| {
                devices.find(|d| d.name().is_ok_and(|n| wanted(n.as_str())))
            })
        };

        if !device_name.is_empty() {
            return find(&|name| name == device_name)?.ok_or_else(|| {
                format!("Audio device '{}' not found", device_name).into()
            });
        }

        let monitor = |name: &str| name.to_lowercase().contains("monitor");
        if let Some(device) = find(&monitor)? {
            return Ok(device);
        }

        host.default_input_device()
            .ok_or_else(|| "No input device available".into())
    }
}

/// Owns the selected recorder for the lifetime of the run.
pub struct AudioContext {
    recorder: Box<dyn AudioRecorder>,
    stopped: bool,
}

impl AudioContext {
    pub fn new(recorder: Box<dyn AudioRecorder>) -> Self {
        Self {
            recorder,
            stopped: false,
        }
    }

    pub fn update(&mut self) {
        if !self.stopped {
            self.recorder.update();
        }
    }

    pub fn samples(&self) -> &[f32] {
        self.recorder.current_buffer()
    }

    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.recorder.stop();
        info!("Audio subsystem stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Drop for AudioContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
