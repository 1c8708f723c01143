//! Real-time playback of a buffer on a worker thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use atomic_float::AtomicF64;
use chirp_audio::{AudioError, AudioOutput, CpalOutput, NullOutput};
use chirp_engine::{resample_into, sample_indices};
use chirp_ir::{SampleBuffer, TrimRange};
use tracing::{debug, warn};

use crate::config::OutputKind;

/// Longest block handed to the output in one write.
const MAX_BLOCK: usize = 256;

/// Rate used by the null output.
const NULL_OUTPUT_RATE: u32 = 44_100;

/// Receives playback events from the worker thread.
///
/// Callbacks run on the playback thread. They must not call back into the
/// session that started playback: the session may be blocked joining that
/// very thread.
pub trait PlaybackListener: Send + Sync {
    /// Playback reached `fraction` of the whole buffer (not of the trimmed
    /// range).
    fn on_progress(&self, fraction: f64);

    /// Playback ended, either at the end of its range or because it was
    /// stopped. Fires exactly once per started playback.
    fn on_stopped(&self);

    /// The session's current buffer was replaced.
    fn on_buffer_changed(&self, _buffer: &Arc<SampleBuffer>) {}
}

/// Listener that ignores everything.
pub struct SilentListener;

impl PlaybackListener for SilentListener {
    fn on_progress(&self, _fraction: f64) {}
    fn on_stopped(&self) {}
}

/// Opens an audio output. Called on the playback thread, since device
/// streams are not always `Send`.
pub type OutputFactory =
    Arc<dyn Fn() -> Result<Box<dyn AudioOutput>, AudioError> + Send + Sync>;

pub fn output_factory(kind: OutputKind) -> OutputFactory {
    match kind {
        OutputKind::Cpal => Arc::new(|| Ok(Box::new(CpalOutput::open()?) as Box<dyn AudioOutput>)),
        OutputKind::Null => {
            Arc::new(|| Ok(Box::new(NullOutput::realtime(NULL_OUTPUT_RATE)) as Box<dyn AudioOutput>))
        }
    }
}

/// Handle to one running playback.
pub struct Playback {
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    position: Arc<AtomicF64>,
    thread: Option<JoinHandle<()>>,
}

impl Playback {
    /// Play `buffer` from `range.start` to `range.end`.
    ///
    /// Returns once the output is open and started, so device failures are
    /// reported here rather than through the listener.
    pub fn start(
        buffer: Arc<SampleBuffer>,
        range: TrimRange,
        progress_hz: u32,
        outputs: &OutputFactory,
        listener: Arc<dyn PlaybackListener>,
    ) -> Result<Self, AudioError> {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let position = Arc::new(AtomicF64::new(range.start_or_zero()));

        let worker = PlaybackWorker {
            buffer,
            range,
            progress_hz: progress_hz.max(1),
            listener,
            stop_signal: stop_signal.clone(),
            finished: finished.clone(),
            position: position.clone(),
        };
        let outputs = outputs.clone();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let thread = std::thread::Builder::new()
            .name("chirp-playback".into())
            .spawn(move || worker.run(outputs, ready_tx))
            .map_err(|e| AudioError::Playback(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                stop_signal,
                finished,
                position,
                thread: Some(thread),
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(AudioError::Playback("playback thread exited early".into()))
            }
        }
    }

    /// Stop and wait for the worker to exit. No listener callback fires
    /// after this returns.
    pub fn stop(mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    /// Last reported position as a fraction of the whole buffer.
    pub fn position(&self) -> f64 {
        self.position.load(Ordering::Relaxed)
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn open_output(outputs: &OutputFactory) -> Result<Box<dyn AudioOutput>, AudioError> {
    let mut output = outputs()?;
    output.start()?;
    Ok(output)
}

struct PlaybackWorker {
    buffer: Arc<SampleBuffer>,
    range: TrimRange,
    progress_hz: u32,
    listener: Arc<dyn PlaybackListener>,
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    position: Arc<AtomicF64>,
}

impl PlaybackWorker {
    fn run(self, outputs: OutputFactory, ready: mpsc::SyncSender<Result<(), AudioError>>) {
        let mut output = match open_output(&outputs) {
            Ok(output) => output,
            Err(e) => {
                self.finished.store(true, Ordering::Relaxed);
                let _ = ready.send(Err(e));
                return;
            }
        };
        let _ = ready.send(Ok(()));

        if let Err(e) = self.play(output.as_mut()) {
            warn!(error = %e, "playback aborted");
        }
        if let Err(e) = output.stop() {
            warn!(error = %e, "failed to stop audio output");
        }
        self.finished.store(true, Ordering::Relaxed);
        self.listener.on_stopped();
    }

    fn play(&self, output: &mut dyn AudioOutput) -> Result<(), AudioError> {
        let len = self.buffer.len();
        let (start, end) = sample_indices(&self.range, len);
        if start >= end {
            return Ok(());
        }
        let samples = &self.buffer.samples()[..end];
        let device_rate = output.sample_rate().max(1);
        // Source samples consumed per device sample.
        let step = self.buffer.sample_rate() as f64 / device_rate as f64;
        if step <= 0.0 {
            warn!("buffer has no sample rate, nothing to play");
            return Ok(());
        }
        let report_every = (device_rate / self.progress_hz).max(1) as usize;
        let block_len = report_every.min(MAX_BLOCK);
        debug!(start, end, device_rate, "playback started");

        let mut block = vec![0.0f32; block_len];
        let mut pos = start as f64;
        let mut since_report = 0usize;
        while pos < end as f64 && !self.stopped() {
            let remaining = ((end as f64 - pos) / step).ceil() as usize;
            let n = remaining.clamp(1, block_len);
            pos = resample_into(samples, step, pos, &mut block[..n]);
            output.write(&block[..n])?;

            since_report += n;
            if since_report >= report_every {
                since_report = 0;
                self.report(self.heard(output, pos, step, start), len);
            }
        }

        while output.queued() > 0 && !self.stopped() {
            std::thread::sleep(Duration::from_millis(5));
            self.report(self.heard(output, pos, step, start), len);
        }
        if !self.stopped() {
            self.report(end as f64, len);
        }
        Ok(())
    }

    fn stopped(&self) -> bool {
        self.stop_signal.load(Ordering::Relaxed)
    }

    /// Source position currently audible, lagging `pos` by what the device
    /// still has queued.
    fn heard(&self, output: &dyn AudioOutput, pos: f64, step: f64, start: usize) -> f64 {
        (pos - output.queued() as f64 * step).max(start as f64)
    }

    fn report(&self, source_pos: f64, len: usize) {
        let fraction = (source_pos / len as f64).clamp(0.0, 1.0);
        self.position.store(fraction, Ordering::Relaxed);
        self.listener.on_progress(fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    #[derive(Default)]
    struct Recorder {
        progress: Mutex<Vec<f64>>,
        stopped: AtomicUsize,
    }

    impl PlaybackListener for Recorder {
        fn on_progress(&self, fraction: f64) {
            self.progress.lock().push(fraction);
        }
        fn on_stopped(&self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn null_outputs(rate: u32) -> OutputFactory {
        Arc::new(move || Ok(Box::new(NullOutput::realtime(rate)) as Box<dyn AudioOutput>))
    }

    fn wait_finished(playback: &Playback) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !playback.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn plays_to_the_end_and_stops_once() {
        let recorder = Arc::new(Recorder::default());
        let buffer = Arc::new(SampleBuffer::new(vec![0.25; 200], 1000));
        let playback = Playback::start(
            buffer,
            TrimRange::FULL,
            100,
            &null_outputs(1000),
            recorder.clone(),
        )
        .unwrap();
        wait_finished(&playback);
        playback.stop();

        let progress = recorder.progress.lock().clone();
        assert!(!progress.is_empty());
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*progress.last().unwrap(), 1.0);
        assert_eq!(recorder.stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn progress_stays_inside_trim_range() {
        let recorder = Arc::new(Recorder::default());
        let buffer = Arc::new(SampleBuffer::new(vec![0.0; 400], 1000));
        let playback = Playback::start(
            buffer,
            TrimRange::new(0.25, 0.5),
            100,
            &null_outputs(1000),
            recorder.clone(),
        )
        .unwrap();
        wait_finished(&playback);
        playback.stop();

        let progress = recorder.progress.lock().clone();
        assert!(progress.iter().all(|&f| (0.25..=0.5).contains(&f)));
        assert_eq!(*progress.last().unwrap(), 0.5);
    }

    #[test]
    fn stop_is_synchronous() {
        let recorder = Arc::new(Recorder::default());
        let buffer = Arc::new(SampleBuffer::new(vec![0.0; 10_000], 1000));
        let playback = Playback::start(
            buffer,
            TrimRange::FULL,
            100,
            &null_outputs(1000),
            recorder.clone(),
        )
        .unwrap();
        std::thread::sleep(Duration::from_millis(50));
        playback.stop();

        let reported = recorder.progress.lock().len();
        assert_eq!(recorder.stopped.load(Ordering::SeqCst), 1);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(recorder.progress.lock().len(), reported);
        assert!(recorder.progress.lock().iter().all(|&f| f < 1.0));
    }

    #[test]
    fn empty_range_stops_without_progress() {
        let recorder = Arc::new(Recorder::default());
        let buffer = Arc::new(SampleBuffer::new(vec![0.0; 100], 1000));
        let playback = Playback::start(
            buffer,
            TrimRange::new(0.6, 0.4),
            100,
            &null_outputs(1000),
            recorder.clone(),
        )
        .unwrap();
        wait_finished(&playback);
        playback.stop();
        assert!(recorder.progress.lock().is_empty());
        assert_eq!(recorder.stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn device_failure_is_returned() {
        let recorder = Arc::new(Recorder::default());
        let failing: OutputFactory = Arc::new(|| Err(AudioError::NoDevice));
        let result = Playback::start(
            Arc::new(SampleBuffer::silent(10, 1000)),
            TrimRange::FULL,
            60,
            &failing,
            recorder.clone(),
        );
        assert!(matches!(result, Err(AudioError::NoDevice)));
        assert_eq!(recorder.stopped.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn resamples_to_device_rate() {
        let buffer = Arc::new(SampleBuffer::new(vec![0.0; 100], 1000));
        let out = NullOutput::new(2000);
        let counter = out.counter();
        let slot = Mutex::new(Some(out));
        let outputs: OutputFactory = Arc::new(move || {
            slot.lock()
                .take()
                .map(|o| Box::new(o) as Box<dyn AudioOutput>)
                .ok_or(AudioError::NoDevice)
        });
        let playback = Playback::start(
            buffer,
            TrimRange::FULL,
            60,
            &outputs,
            Arc::new(SilentListener),
        )
        .unwrap();
        wait_finished(&playback);
        playback.stop();
        assert_eq!(counter.load(Ordering::Relaxed), 200);
    }

    #[test]
    fn zero_rate_buffer_stops_without_progress() {
        let recorder = Arc::new(Recorder::default());
        let buffer = Arc::new(SampleBuffer::new(vec![0.3; 100], 0));
        let playback = Playback::start(
            buffer,
            TrimRange::FULL,
            100,
            &null_outputs(1000),
            recorder.clone(),
        )
        .unwrap();
        wait_finished(&playback);
        assert!(playback.is_finished());
        playback.stop();
        assert!(recorder.progress.lock().is_empty());
        assert_eq!(recorder.stopped.load(Ordering::SeqCst), 1);
    }
}
