//! Audio Capture System for Spiral Studio RS
//! Live microphone input with FFT-based frequency magnitude frames

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// dB window mapped onto the 0..255 byte range, matching the Web Audio
/// `getByteFrequencyData` convention the original renderer consumed.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// Per-tick supplier of a fixed-length frame of frequency magnitudes.
///
/// The frame length is chosen at mode start and stays constant for the
/// session. Implemented by [`MicSource`] for live input and by stub
/// sources in tests.
pub trait FrequencySource {
    /// Number of magnitude bins per frame (fixed for the session)
    fn bin_count(&self) -> usize;

    /// Fill `out` (`bin_count()` long) with the current magnitude frame
    fn fill_bins(&mut self, out: &mut [u8]);
}

/// Reduce a magnitude frame to a single loudness scalar in [0, 1].
///
/// Empty input degrades to 0.0 rather than NaN.
pub fn intensity(bins: &[u8], sensitivity: f32) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    let mean = sum as f32 / bins.len() as f32;
    (mean / 255.0 * sensitivity).clamp(0.0, 1.0)
}

/// Hann window coefficient for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * std::f32::consts::PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Mono ring buffer shared between the capture callback and the tick
struct RingBuffer {
    samples: Vec<f32>,
    write_pos: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Push interleaved frames, mixed down to mono
    fn push_frames(&mut self, interleaved: &[f32], channels: usize) {
        for frame in interleaved.chunks(channels) {
            if frame.is_empty() {
                continue;
            }
            let mono: f32 = frame.iter().sum::<f32>() / frame.len() as f32;
            self.samples[self.write_pos] = mono;
            self.write_pos = (self.write_pos + 1) % self.samples.len();
        }
    }

    /// Copy the buffer into `out`, oldest sample first
    fn copy_latest(&self, out: &mut [f32]) {
        let len = self.samples.len();
        for (i, slot) in out.iter_mut().enumerate().take(len) {
            *slot = self.samples[(self.write_pos + i) % len];
        }
    }
}

/// Default-input-device frequency source.
///
/// The cpal stream keeps filling the ring buffer from its own thread;
/// each tick takes a windowed FFT of the most recent `fft_size` samples.
/// Dropping the source releases the input device.
pub struct MicSource {
    _stream: cpal::Stream,
    ring: Arc<Mutex<RingBuffer>>,
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    gain: f32,
    // Scratch buffers, reused every tick
    samples: Vec<f32>,
    fft_buf: Vec<Complex<f32>>,
}

impl MicSource {
    /// Acquire the default input device and start capturing.
    ///
    /// Any failure here is terminal for the start attempt; no stream is
    /// left running and the caller sees the error.
    pub fn open(fft_size: usize, gain: f32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no audio input device available"))?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device
            .default_input_config()
            .context("querying default input config")?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            bail!(
                "unsupported input sample format: {}",
                supported.sample_format()
            );
        }
        let channels = supported.channels() as usize;
        if channels == 0 {
            bail!("audio device reported 0 channels");
        }
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        let ring = Arc::new(Mutex::new(RingBuffer::new(fft_size)));
        let writer = Arc::clone(&ring);
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = writer.lock() {
                        buf.push_frames(data, channels);
                    }
                },
                |err| log::warn!("audio input stream error: {err}"),
                None,
            )
            .context("building audio input stream")?;
        stream.play().context("starting audio input stream")?;

        log::info!(
            "capturing from '{}' at {} Hz ({} channels, fft {})",
            device_name,
            sample_rate,
            channels,
            fft_size
        );

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Ok(Self {
            _stream: stream,
            ring,
            fft,
            fft_size,
            gain,
            samples: vec![0.0; fft_size],
            fft_buf: vec![Complex::new(0.0, 0.0); fft_size],
        })
    }
}

impl FrequencySource for MicSource {
    fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    fn fill_bins(&mut self, out: &mut [u8]) {
        if let Ok(ring) = self.ring.lock() {
            ring.copy_latest(&mut self.samples);
        }

        for i in 0..self.fft_size {
            let window = hann_window(i, self.fft_size);
            self.fft_buf[i] = Complex::new(self.samples[i] * self.gain * window, 0.0);
        }
        self.fft.process(&mut self.fft_buf);

        for (i, slot) in out.iter_mut().enumerate().take(self.fft_size / 2) {
            let magnitude = self.fft_buf[i].norm() * 2.0 / self.fft_size as f32;
            let db = 20.0 * magnitude.max(1e-10).log10();
            let t = ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0);
            *slot = (t * 255.0) as u8;
        }
    }
}
