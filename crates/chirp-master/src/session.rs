//! The edit session: one sound, its history, and the edits in flight.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use chirp_audio::AudioError;
use chirp_engine::{extract, output_len, EffectError, EffectGraph};
use chirp_ir::{chunk_levels, Edit, Effect, SampleBuffer, SoundId, TrimRange};
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::history::History;
use crate::host::{HostError, SoundHost};
use crate::playback::{output_factory, OutputFactory, Playback, PlaybackListener};
use crate::render::RenderTask;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Effect(#[from] EffectError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// The edit waiting to be committed, if any.
enum PendingEdit {
    None,
    /// An effect render is running for `generation`.
    Effect { generation: u64, effect: Effect },
    /// Trim mode: markers are placed but nothing is cut yet.
    Trim(TrimRange),
}

/// Public view of the pending edit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PendingKind {
    None,
    Effect(Effect),
    Trim(TrimRange),
}

/// Snapshot of playback for display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    /// Last reported position as a fraction of the buffer, `None` when idle.
    pub position: Option<f64>,
    /// Current trim markers; `TrimRange::FULL` outside trim mode.
    pub trim: TrimRange,
}

struct SessionState {
    sound: SoundId,
    current: Arc<SampleBuffer>,
    levels: Vec<f32>,
    history: History,
    pending: PendingEdit,
    generation: u64,
    playback: Option<Playback>,
    render: Option<RenderTask>,
    last_error: Option<SessionError>,
}

impl SessionState {
    fn stop_playback(&mut self) {
        if let Some(playback) = self.playback.take() {
            playback.stop();
        }
    }

    fn trim_range(&self) -> TrimRange {
        match self.pending {
            PendingEdit::Trim(range) => range,
            _ => TrimRange::FULL,
        }
    }
}

struct Shared {
    host: Arc<dyn SoundHost>,
    listener: Arc<dyn PlaybackListener>,
    outputs: OutputFactory,
    config: SessionConfig,
    state: Mutex<SessionState>,
    render_done: Condvar,
}

impl Shared {
    /// Drop any running effect render; its completion will find the
    /// generation moved on.
    fn abandon_render(&self, state: &mut SessionState) {
        state.generation += 1;
        state.render = None;
        if let PendingEdit::Effect { generation, effect } = state.pending {
            debug!(generation, %effect, "abandoning render");
            state.pending = PendingEdit::None;
            self.render_done.notify_all();
        }
    }

    /// Replace the current buffer with `buffer`, recording the old one.
    ///
    /// The host is updated first; if it refuses, nothing changes.
    fn commit(
        &self,
        state: &mut SessionState,
        buffer: Arc<SampleBuffer>,
        edit: Edit,
    ) -> Result<(), SessionError> {
        self.host.commit_samples(state.sound, buffer.clone())?;
        let previous = std::mem::replace(&mut state.current, buffer);
        state.history.record_before_edit(previous);
        self.after_change(state, edit);
        Ok(())
    }

    fn after_change(&self, state: &mut SessionState, edit: Edit) {
        state.pending = PendingEdit::None;
        state.levels = chunk_levels(state.current.samples(), self.config.rms_chunk_size);
        info!(
            %edit,
            samples = state.current.len(),
            undo = state.history.undo_len(),
            redo = state.history.redo_len(),
            "committed edit"
        );
        self.listener.on_buffer_changed(&state.current);
        if self.config.autoplay {
            if let Err(e) = self.start_playback(state, TrimRange::FULL) {
                warn!(error = %e, "autoplay failed");
            }
        }
    }

    fn start_playback(&self, state: &mut SessionState, range: TrimRange) -> Result<(), AudioError> {
        state.stop_playback();
        let playback = Playback::start(
            state.current.clone(),
            range,
            self.config.progress_hz,
            &self.outputs,
            self.listener.clone(),
        )?;
        state.playback = Some(playback);
        Ok(())
    }

    fn finish_render(
        weak: &Weak<Shared>,
        generation: u64,
        result: Result<SampleBuffer, EffectError>,
    ) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut state = shared.state.lock();
        let effect = match state.pending {
            PendingEdit::Effect {
                generation: pending,
                effect,
            } if pending == generation => effect,
            _ => {
                debug!(generation, current = state.generation, "dropping stale render");
                return;
            }
        };
        state.render = None;

        let outcome = result
            .map_err(SessionError::from)
            .and_then(|buffer| shared.commit(&mut state, Arc::new(buffer), Edit::Effect(effect)));
        if let Err(e) = outcome {
            warn!(%effect, error = %e, "effect render not committed");
            state.pending = PendingEdit::None;
            state.last_error = Some(e);
        }
        shared.render_done.notify_all();
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.state.get_mut().stop_playback();
    }
}

/// Headless editor for one sound at a time.
///
/// All operations are serialized on one lock. Effect renders and playback
/// run on worker threads; an effect toggle returns as soon as its render is
/// started and commits when the render finishes, unless a later edit has
/// superseded it.
pub struct EditSession {
    shared: Arc<Shared>,
}

impl EditSession {
    /// Open `sound` with the audio output named in `config`.
    pub fn open(
        host: Arc<dyn SoundHost>,
        sound: SoundId,
        config: SessionConfig,
        listener: Arc<dyn PlaybackListener>,
    ) -> Result<Self, SessionError> {
        let outputs = output_factory(config.output);
        Self::open_with_output(host, sound, config, listener, outputs)
    }

    pub fn open_with_output(
        host: Arc<dyn SoundHost>,
        sound: SoundId,
        config: SessionConfig,
        listener: Arc<dyn PlaybackListener>,
        outputs: OutputFactory,
    ) -> Result<Self, SessionError> {
        let current = host.load_samples(sound)?;
        let levels = chunk_levels(current.samples(), config.rms_chunk_size);
        let state = SessionState {
            sound,
            current,
            levels,
            history: History::new(),
            pending: PendingEdit::None,
            generation: 0,
            playback: None,
            render: None,
            last_error: None,
        };
        Ok(Self {
            shared: Arc::new(Shared {
                host,
                listener,
                outputs,
                config,
                state: Mutex::new(state),
                render_done: Condvar::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.shared.state.lock()
    }

    // --- Edits ---

    /// Start rendering `effect` over the current buffer.
    ///
    /// Parameters are checked before anything changes; a rejected toggle
    /// leaves the buffer, history and any pending edit untouched.
    pub fn toggle_effect(&self, effect: Effect) -> Result<(), SessionError> {
        let mut state = self.lock();
        let params = effect.params();
        let graph = EffectGraph::new(state.current.sample_rate(), params)?;
        output_len(state.current.len(), state.current.sample_rate(), &params)?;

        state.stop_playback();
        self.shared.abandon_render(&mut state);
        let generation = state.generation;
        state.pending = PendingEdit::Effect { generation, effect };

        let weak = Arc::downgrade(&self.shared);
        let task = RenderTask::spawn(graph, state.current.clone(), generation, move |g, result| {
            Shared::finish_render(&weak, g, result)
        });
        state.render = Some(task);
        debug!(generation, %effect, "render requested");
        Ok(())
    }

    /// First call places the default trim markers; the second cuts the
    /// buffer down to them.
    pub fn enter_or_commit_trim(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        match state.pending {
            PendingEdit::Trim(range) => {
                state.stop_playback();
                let trimmed = extract(&state.current, &range);
                self.shared.commit(&mut state, Arc::new(trimmed), Edit::Trim(range))
            }
            _ => {
                self.shared.abandon_render(&mut state);
                let config = &self.shared.config;
                state.pending =
                    PendingEdit::Trim(TrimRange::new(config.default_trim_start, config.default_trim_end));
                Ok(())
            }
        }
    }

    pub fn set_trim_start(&self, fraction: f64) {
        self.set_trim_marker(|range| range.start = Some(fraction.clamp(0.0, 1.0)));
    }

    pub fn set_trim_end(&self, fraction: f64) {
        self.set_trim_marker(|range| range.end = Some(fraction.clamp(0.0, 1.0)));
    }

    /// Moving a marker outside trim mode enters it with only that marker set.
    fn set_trim_marker(&self, update: impl FnOnce(&mut TrimRange)) {
        let mut state = self.lock();
        let mut range = match state.pending {
            PendingEdit::Trim(range) => range,
            _ => {
                self.shared.abandon_render(&mut state);
                TrimRange::FULL
            }
        };
        update(&mut range);
        state.pending = PendingEdit::Trim(range);
    }

    pub fn reverse(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        self.shared.abandon_render(&mut state);
        state.pending = PendingEdit::None;
        state.stop_playback();
        let reversed = Arc::new(state.current.reversed());
        self.shared.commit(&mut state, reversed, Edit::Reverse)
    }

    /// Step back one edit. Returns `false` when nothing was undone.
    ///
    /// While an effect render is pending, undo cancels that render instead.
    /// With nothing to undo, playback and any open trim are left alone.
    pub fn undo(&self) -> Result<bool, SessionError> {
        let mut state = self.lock();
        if matches!(state.pending, PendingEdit::Effect { .. }) {
            self.shared.abandon_render(&mut state);
            return Ok(false);
        }
        if !state.history.can_undo() {
            return Ok(false);
        }
        state.pending = PendingEdit::None;
        state.stop_playback();

        let current = state.current.clone();
        let Some(previous) = state.history.undo(current) else {
            return Ok(false);
        };
        if let Err(e) = self.shared.host.commit_samples(state.sound, previous.clone()) {
            state.history.redo(previous);
            return Err(e.into());
        }
        state.current = previous;
        self.shared.after_change(&mut state, Edit::Undo);
        Ok(true)
    }

    /// Step forward one undone edit. Returns `false` when nothing was redone.
    pub fn redo(&self) -> Result<bool, SessionError> {
        let mut state = self.lock();
        if !state.history.can_redo() {
            return Ok(false);
        }
        self.shared.abandon_render(&mut state);
        state.pending = PendingEdit::None;
        state.stop_playback();

        let current = state.current.clone();
        let Some(next) = state.history.redo(current) else {
            return Ok(false);
        };
        if let Err(e) = self.shared.host.commit_samples(state.sound, next.clone()) {
            state.history.undo(next);
            return Err(e.into());
        }
        state.current = next;
        self.shared.after_change(&mut state, Edit::Redo);
        Ok(true)
    }

    // --- Playback ---

    /// Play the current buffer between the trim markers, or all of it.
    pub fn play(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        let range = state.trim_range();
        self.shared.start_playback(&mut state, range)?;
        Ok(())
    }

    /// Stop playback. Returns after the last progress callback.
    pub fn stop(&self) {
        self.lock().stop_playback();
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playback.as_ref().is_some_and(|p| !p.is_finished())
    }

    pub fn playback_state(&self) -> PlaybackState {
        let state = self.lock();
        PlaybackState {
            position: state
                .playback
                .as_ref()
                .filter(|p| !p.is_finished())
                .map(Playback::position),
            trim: state.trim_range(),
        }
    }

    // --- Sounds ---

    /// Edit a different sound. History does not carry over.
    pub fn switch_sound(&self, sound: SoundId) -> Result<(), SessionError> {
        let buffer = self.shared.host.load_samples(sound)?;
        let mut state = self.lock();
        state.stop_playback();
        self.shared.abandon_render(&mut state);
        state.pending = PendingEdit::None;
        state.history.clear();
        state.sound = sound;
        state.current = buffer;
        state.levels = chunk_levels(state.current.samples(), self.shared.config.rms_chunk_size);
        info!(?sound, samples = state.current.len(), "switched sound");
        self.shared.listener.on_buffer_changed(&state.current);
        Ok(())
    }

    pub fn rename(&self, name: &str) -> Result<(), SessionError> {
        let sound = self.lock().sound;
        self.shared.host.rename_sound(sound, name)?;
        Ok(())
    }

    // --- Queries ---

    pub fn sound(&self) -> SoundId {
        self.lock().sound
    }

    pub fn current_buffer(&self) -> Arc<SampleBuffer> {
        self.lock().current.clone()
    }

    /// Waveform levels of the current buffer.
    pub fn chunk_levels(&self) -> Vec<f32> {
        self.lock().levels.clone()
    }

    pub fn can_undo(&self) -> bool {
        self.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock().history.can_redo()
    }

    pub fn is_rendering(&self) -> bool {
        matches!(self.lock().pending, PendingEdit::Effect { .. })
    }

    pub fn pending(&self) -> PendingKind {
        match self.lock().pending {
            PendingEdit::None => PendingKind::None,
            PendingEdit::Effect { effect, .. } => PendingKind::Effect(effect),
            PendingEdit::Trim(range) => PendingKind::Trim(range),
        }
    }

    /// Block until no effect render is pending. Returns `false` on timeout.
    pub fn wait_for_render(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while matches!(state.pending, PendingEdit::Effect { .. }) {
            if self
                .shared
                .render_done
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return !matches!(state.pending, PendingEdit::Effect { .. });
            }
        }
        true
    }

    /// Error from the last effect render that failed to commit.
    pub fn take_render_error(&self) -> Option<SessionError> {
        self.lock().last_error.take()
    }
}
