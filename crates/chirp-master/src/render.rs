//! Effect renders run off the caller's thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use chirp_engine::{EffectError, EffectGraph};
use chirp_ir::SampleBuffer;
use tracing::debug;

/// One in-flight render, tagged with the edit generation that requested it.
///
/// Dropping the task detaches the thread: the render runs to completion and
/// its completion callback decides whether the result still matters.
pub struct RenderTask {
    generation: u64,
    finished: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl RenderTask {
    pub fn spawn<F>(graph: EffectGraph, input: Arc<SampleBuffer>, generation: u64, on_done: F) -> Self
    where
        F: FnOnce(u64, Result<SampleBuffer, EffectError>) + Send + 'static,
    {
        let finished = Arc::new(AtomicBool::new(false));
        let done = finished.clone();
        let work = move || {
            debug!(generation, stages = ?graph.stage_names(), "render started");
            let result = graph.render(&input);
            done.store(true, Ordering::Release);
            on_done(generation, result);
        };
        let thread = std::thread::spawn(work);
        Self {
            generation,
            finished,
            thread,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Block until the render and its callback have run.
    pub fn join(self) {
        let _ = self.thread.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_ir::{Effect, EffectParams};
    use std::sync::mpsc;

    #[test]
    fn delivers_result_with_generation() {
        let graph = EffectGraph::new(1000, Effect::Louder.params()).unwrap();
        let input = Arc::new(SampleBuffer::new(vec![0.1; 10], 1000));
        let (tx, rx) = mpsc::channel();
        let task = RenderTask::spawn(graph, input, 7, move |generation, result| {
            let _ = tx.send((generation, result));
        });
        assert_eq!(task.generation(), 7);
        task.join();

        let (generation, result) = rx.recv().unwrap();
        assert_eq!(generation, 7);
        let out = result.unwrap();
        assert!((out.samples()[0] - 0.125).abs() < 1e-6);
    }

    #[test]
    fn render_errors_reach_the_callback() {
        let graph = EffectGraph::new(1000, EffectParams::default()).unwrap();
        let input = Arc::new(SampleBuffer::new(vec![0.0; 4], 2000));
        let (tx, rx) = mpsc::channel();
        RenderTask::spawn(graph, input, 1, move |_, result| {
            let _ = tx.send(result);
        })
        .join();
        assert!(matches!(rx.recv().unwrap(), Err(EffectError::InvalidEffectParameters(_))));
    }

    #[test]
    fn dropped_task_still_completes() {
        let graph = EffectGraph::new(1000, Effect::Echo.params()).unwrap();
        let input = Arc::new(SampleBuffer::silent(100, 1000));
        let (tx, rx) = mpsc::channel();
        drop(RenderTask::spawn(graph, input, 3, move |generation, _| {
            let _ = tx.send(generation);
        }));
        assert_eq!(rx.recv().unwrap(), 3);
    }
}
