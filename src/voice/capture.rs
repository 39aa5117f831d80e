//! Microphone capture for recognition turns
//!
//! The stream runs at whatever rate the default input device offers; frames
//! are downmixed to mono in the callback and collected until the turn ends.
//! Builds without the `audio-io` feature keep the types but report capture
//! as unsupported, which the pipeline turns into a degradation notice.

/// One finished recording, mono at the device's native rate
#[derive(Debug, Clone, Default)]
pub struct CapturedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl CapturedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Whether this build can open an input stream at all
pub fn capture_supported() -> bool {
    cfg!(feature = "audio-io")
}

#[cfg(feature = "audio-io")]
pub use real::MicCapture;

#[cfg(not(feature = "audio-io"))]
pub use stub::MicCapture;

#[cfg(feature = "audio-io")]
mod real {
    use super::CapturedAudio;
    use crate::{CureBotError, Result};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::Stream;
    use crossbeam_channel::Receiver;
    use std::time::Duration;
    use tracing::{debug, error, info};

    /// Live input stream collecting mono samples until finished
    pub struct MicCapture {
        stream: Option<Stream>,
        frames: Receiver<Vec<f32>>,
        sample_rate: u32,
        collected: Vec<f32>,
    }

    impl MicCapture {
        /// Open the default input device and start recording
        pub fn start() -> Result<Self> {
            let host = cpal::default_host();

            let device = host.default_input_device().ok_or_else(|| {
                CureBotError::AudioDeviceError("No input device available".into())
            })?;

            info!(
                "Using input device: {}",
                device.name().unwrap_or_else(|_| "Unknown".to_string())
            );

            let config: cpal::StreamConfig = device
                .default_input_config()
                .map_err(|e| {
                    CureBotError::AudioDeviceError(format!("Failed to get input config: {}", e))
                })?
                .into();

            let sample_rate = config.sample_rate.0;
            let channels = config.channels as usize;
            let (frame_tx, frames) = crossbeam_channel::unbounded();

            let err_fn = |err| {
                error!("Audio input stream error: {}", err);
            };

            let stream = device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let samples = if channels <= 1 {
                            data.to_vec()
                        } else {
                            data.chunks(channels)
                                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                                .collect()
                        };

                        if let Err(e) = frame_tx.try_send(samples) {
                            debug!("Failed to send audio frame: {}", e);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| {
                    CureBotError::AudioDeviceError(format!("Failed to build input stream: {}", e))
                })?;

            stream.play().map_err(|e| {
                CureBotError::AudioDeviceError(format!("Failed to start input stream: {}", e))
            })?;

            debug!(sample_rate, "Recording started");

            Ok(Self {
                stream: Some(stream),
                frames,
                sample_rate,
                collected: Vec::new(),
            })
        }

        /// Pull in whatever frames arrived since the last call
        pub fn drain(&mut self) {
            while let Ok(frame) = self.frames.try_recv() {
                self.collected.extend(frame);
            }
        }

        pub fn duration_secs(&self) -> f32 {
            if self.sample_rate == 0 {
                return 0.0;
            }
            self.collected.len() as f32 / self.sample_rate as f32
        }

        /// Stop the stream and hand back everything recorded
        pub fn finish(mut self) -> CapturedAudio {
            if let Some(stream) = self.stream.take() {
                drop(stream);
            }
            self.drain();

            debug!(samples = self.collected.len(), "Recording finished");

            CapturedAudio {
                samples: std::mem::take(&mut self.collected),
                sample_rate: self.sample_rate,
            }
        }

        /// Record for a fixed window, blocking the calling thread
        pub fn record_for(window: Duration) -> Result<CapturedAudio> {
            let capture = Self::start()?;
            std::thread::sleep(window);
            Ok(capture.finish())
        }
    }
}

#[cfg(not(feature = "audio-io"))]
mod stub {
    use super::CapturedAudio;
    use crate::{CureBotError, Result};
    use std::time::Duration;

    /// Placeholder for builds without audio input support
    pub struct MicCapture;

    impl MicCapture {
        pub fn start() -> Result<Self> {
            Err(CureBotError::AudioDeviceError(
                "Built without audio input support".into(),
            ))
        }

        pub fn drain(&mut self) {}

        pub fn duration_secs(&self) -> f32 {
            0.0
        }

        pub fn finish(self) -> CapturedAudio {
            CapturedAudio::default()
        }

        pub fn record_for(_window: Duration) -> Result<CapturedAudio> {
            Err(CureBotError::AudioDeviceError(
                "Built without audio input support".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_uses_sample_rate() {
        let audio = CapturedAudio {
            samples: vec![0.0; 32_000],
            sample_rate: 16_000,
        };
        assert!((audio.duration_secs() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_capture_has_zero_duration() {
        let audio = CapturedAudio::default();
        assert!(audio.is_empty());
        assert_eq!(audio.duration_secs(), 0.0);
    }
}
