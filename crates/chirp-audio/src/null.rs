//! Output that plays into nothing, optionally at real-time pace.
//!
//! Used for headless runs and tests where no audio device exists.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::traits::{AudioError, AudioOutput};

pub struct NullOutput {
    sample_rate: u32,
    paced: bool,
    started_at: Option<Instant>,
    since_start: u64,
    written: Arc<AtomicU64>,
}

impl NullOutput {
    /// Accepts samples as fast as they are written.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            paced: false,
            started_at: None,
            since_start: 0,
            written: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Blocks in `write` so samples drain at `sample_rate` per second.
    pub fn realtime(sample_rate: u32) -> Self {
        Self {
            paced: true,
            ..Self::new(sample_rate)
        }
    }

    /// Shared count of samples written so far.
    pub fn counter(&self) -> Arc<AtomicU64> {
        self.written.clone()
    }
}

impl AudioOutput for NullOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        self.written.fetch_add(samples.len() as u64, Ordering::Relaxed);
        self.since_start += samples.len() as u64;
        if self.paced {
            let started = *self.started_at.get_or_insert_with(Instant::now);
            let due =
                Duration::from_secs_f64(self.since_start as f64 / self.sample_rate.max(1) as f64);
            let elapsed = started.elapsed();
            if due > elapsed {
                std::thread::sleep(due - elapsed);
            }
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.started_at = Some(Instant::now());
        self.since_start = 0;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.started_at = None;
        Ok(())
    }
}
