//! The host side of editing: where sounds live between sessions.

use std::sync::Arc;

use chirp_ir::{SampleBuffer, SoundId};
use parking_lot::Mutex;
use slotmap::SlotMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("sound not found: {0:?}")]
    NotFound(SoundId),
    #[error("host storage error: {0}")]
    Storage(String),
}

/// Asset store the session reads sounds from and writes edits back to.
///
/// The session only ever hands the host finished buffers, never
/// intermediate effect state.
pub trait SoundHost: Send + Sync {
    fn load_samples(&self, sound: SoundId) -> Result<Arc<SampleBuffer>, HostError>;
    fn commit_samples(&self, sound: SoundId, buffer: Arc<SampleBuffer>) -> Result<(), HostError>;
    fn rename_sound(&self, sound: SoundId, name: &str) -> Result<(), HostError>;
}

const MODIFIED_SUFFIX: &str = "-modified";

struct StoredSound {
    name: String,
    asset_id: String,
    buffer: Arc<SampleBuffer>,
}

/// In-memory `SoundHost`.
///
/// Committing new samples marks the sound's asset id as modified so it no
/// longer names the original content.
#[derive(Default)]
pub struct MemoryHost {
    sounds: Mutex<SlotMap<SoundId, StoredSound>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, name: &str, asset_id: &str, buffer: SampleBuffer) -> SoundId {
        self.sounds.lock().insert(StoredSound {
            name: name.to_string(),
            asset_id: asset_id.to_string(),
            buffer: Arc::new(buffer),
        })
    }

    pub fn buffer(&self, sound: SoundId) -> Option<Arc<SampleBuffer>> {
        self.sounds.lock().get(sound).map(|s| s.buffer.clone())
    }

    pub fn name(&self, sound: SoundId) -> Option<String> {
        self.sounds.lock().get(sound).map(|s| s.name.clone())
    }

    pub fn asset_id(&self, sound: SoundId) -> Option<String> {
        self.sounds.lock().get(sound).map(|s| s.asset_id.clone())
    }

    /// Forget a sound. Returns whether it existed.
    pub fn remove(&self, sound: SoundId) -> bool {
        self.sounds.lock().remove(sound).is_some()
    }

    pub fn ids(&self) -> Vec<SoundId> {
        self.sounds.lock().keys().collect()
    }
}

impl SoundHost for MemoryHost {
    fn load_samples(&self, sound: SoundId) -> Result<Arc<SampleBuffer>, HostError> {
        self.buffer(sound).ok_or(HostError::NotFound(sound))
    }

    fn commit_samples(&self, sound: SoundId, buffer: Arc<SampleBuffer>) -> Result<(), HostError> {
        let mut sounds = self.sounds.lock();
        let stored = sounds.get_mut(sound).ok_or(HostError::NotFound(sound))?;
        if !stored.asset_id.contains(MODIFIED_SUFFIX) {
            stored.asset_id.push_str(MODIFIED_SUFFIX);
        }
        stored.buffer = buffer;
        Ok(())
    }

    fn rename_sound(&self, sound: SoundId, name: &str) -> Result<(), HostError> {
        let mut sounds = self.sounds.lock();
        let stored = sounds.get_mut(sound).ok_or(HostError::NotFound(sound))?;
        stored.name = name.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_replaces_buffer_and_marks_modified_once() {
        let host = MemoryHost::new();
        let id = host.add("meow", "83c36d80", SampleBuffer::silent(4, 8000));

        let edited = Arc::new(SampleBuffer::new(vec![0.5; 2], 8000));
        host.commit_samples(id, edited.clone()).unwrap();
        host.commit_samples(id, edited.clone()).unwrap();

        assert!(Arc::ptr_eq(&host.load_samples(id).unwrap(), &edited));
        assert_eq!(host.asset_id(id).unwrap(), "83c36d80-modified");
    }

    #[test]
    fn rename_passes_through() {
        let host = MemoryHost::new();
        let id = host.add("meow", "a", SampleBuffer::silent(1, 8000));
        host.rename_sound(id, "purr").unwrap();
        assert_eq!(host.name(id).unwrap(), "purr");
    }

    #[test]
    fn missing_sound_is_an_error() {
        let host = MemoryHost::new();
        let id = host.add("gone", "a", SampleBuffer::silent(1, 8000));
        assert!(host.remove(id));
        assert_eq!(host.load_samples(id).err(), Some(HostError::NotFound(id)));
        assert!(host.commit_samples(id, Arc::new(SampleBuffer::silent(1, 8000))).is_err());
    }
}
