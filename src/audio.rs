//! Audio collaborator contract
//!
//! Sound is best effort: the simulation hands sounds off and never waits on
//! them. Failures are logged and dropped.

use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSound {
    /// Coin collected
    CoinPickup,
    /// Power-up collected
    PowerUpPickup,
    /// Ship destroyed
    Explosion,
    /// Spoken "game over"
    GameOverVoice,
    /// Game over stingers
    GameOver1,
    GameOver2,
}

/// Sounds played one after the other, each starting when the previous ends
pub type SoundSequence = Vec<GameSound>;

/// The end-of-run sequence
pub fn game_over_sequence() -> SoundSequence {
    vec![
        GameSound::Explosion,
        GameSound::GameOverVoice,
        GameSound::GameOver1,
        GameSound::GameOver2,
    ]
}

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("audio output unavailable")]
    Unavailable,
    #[error("failed to play {sound:?}: {reason}")]
    Playback { sound: GameSound, reason: String },
}

/// Non-blocking sound playback as seen by the simulation
pub trait Audio: Send + Sync {
    /// Start a sound and return immediately
    fn play(&self, sound: GameSound) -> Result<(), AudioError>;

    /// Queue a sequence and return immediately
    fn play_sequence(&self, sequence: SoundSequence) -> Result<(), AudioError>;
}

/// Something that can play one sound to completion (may block)
pub trait AudioBackend: Send + Sync + 'static {
    fn play_to_end(&self, sound: GameSound) -> Result<(), AudioError>;
}

/// Plays sounds off the caller's thread
///
/// Single sounds start at once on their own short-lived worker, so pickups
/// overlap. Sequences go through one queue and play back to back.
pub struct ThreadedAudio {
    backend: Arc<dyn AudioBackend>,
    sequences: Sender<SoundSequence>,
}

impl ThreadedAudio {
    pub fn new<B: AudioBackend>(backend: B) -> std::io::Result<Self> {
        let backend: Arc<dyn AudioBackend> = Arc::new(backend);
        let (tx, rx) = mpsc::channel::<SoundSequence>();
        let sequence_backend = Arc::clone(&backend);
        thread::Builder::new()
            .name("audio-sequence".to_string())
            .spawn(move || {
                while let Ok(sequence) = rx.recv() {
                    for sound in sequence {
                        if let Err(e) = sequence_backend.play_to_end(sound) {
                            log::warn!("{e}");
                            // The rest of a sequence depends on this clip
                            break;
                        }
                    }
                }
            })?;
        Ok(Self {
            backend,
            sequences: tx,
        })
    }
}

impl Audio for ThreadedAudio {
    fn play(&self, sound: GameSound) -> Result<(), AudioError> {
        let backend = Arc::clone(&self.backend);
        thread::Builder::new()
            .name("audio-clip".to_string())
            .spawn(move || {
                if let Err(e) = backend.play_to_end(sound) {
                    log::warn!("{e}");
                }
            })
            .map(drop)
            .map_err(|e| {
                log::debug!("Sound worker not started: {e}");
                AudioError::Unavailable
            })
    }

    fn play_sequence(&self, sequence: SoundSequence) -> Result<(), AudioError> {
        self.sequences
            .send(sequence)
            .map_err(|_| AudioError::Unavailable)
    }
}

/// Audio that plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl Audio for NullAudio {
    fn play(&self, sound: GameSound) -> Result<(), AudioError> {
        log::trace!("(muted) {sound:?}");
        Ok(())
    }

    fn play_sequence(&self, sequence: SoundSequence) -> Result<(), AudioError> {
        log::trace!("(muted) {sequence:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Records when each clip started; clips last `clip` each
    struct Recorder {
        started: Arc<Mutex<Vec<(GameSound, Instant)>>>,
        clip: Duration,
        fail_on: Option<GameSound>,
    }

    impl Recorder {
        fn new(clip: Duration, fail_on: Option<GameSound>) -> (Self, Arc<Mutex<Vec<(GameSound, Instant)>>>) {
            let started = Arc::new(Mutex::new(Vec::new()));
            let recorder = Self {
                started: Arc::clone(&started),
                clip,
                fail_on,
            };
            (recorder, started)
        }
    }

    impl AudioBackend for Recorder {
        fn play_to_end(&self, sound: GameSound) -> Result<(), AudioError> {
            if self.fail_on == Some(sound) {
                return Err(AudioError::Playback {
                    sound,
                    reason: "missing clip".into(),
                });
            }
            self.started.lock().unwrap().push((sound, Instant::now()));
            thread::sleep(self.clip);
            Ok(())
        }
    }

    fn wait_for(
        started: &Arc<Mutex<Vec<(GameSound, Instant)>>>,
        n: usize,
    ) -> Vec<(GameSound, Instant)> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while started.lock().unwrap().len() < n && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        started.lock().unwrap().clone()
    }

    fn sounds(started: &[(GameSound, Instant)]) -> Vec<GameSound> {
        started.iter().map(|&(sound, _)| sound).collect()
    }

    #[test]
    fn test_sequence_plays_in_order() {
        let (backend, started) = Recorder::new(Duration::from_millis(5), None);
        let audio = ThreadedAudio::new(backend).unwrap();
        audio.play_sequence(game_over_sequence()).unwrap();

        let played = wait_for(&started, 4);
        assert_eq!(sounds(&played), game_over_sequence());
        // Each clip starts after the previous one ended
        for pair in played.windows(2) {
            assert!(pair[1].1.duration_since(pair[0].1) >= Duration::from_millis(5));
        }
    }

    #[test]
    fn test_single_sounds_overlap() {
        let clip = Duration::from_millis(200);
        let (backend, started) = Recorder::new(clip, None);
        let audio = ThreadedAudio::new(backend).unwrap();
        let sent = Instant::now();
        for _ in 0..5 {
            audio.play(GameSound::CoinPickup).unwrap();
        }

        let played = wait_for(&started, 5);
        assert_eq!(played.len(), 5);
        let last_start = played.iter().map(|&(_, at)| at).max().unwrap();
        assert!(last_start.duration_since(sent) < clip);
    }

    #[test]
    fn test_single_sound_does_not_wait_for_sequence() {
        let (backend, started) = Recorder::new(Duration::from_millis(200), None);
        let audio = ThreadedAudio::new(backend).unwrap();
        audio.play_sequence(game_over_sequence()).unwrap();
        audio.play(GameSound::CoinPickup).unwrap();

        let played = wait_for(&started, 2);
        assert!(sounds(&played).contains(&GameSound::CoinPickup));
    }

    #[test]
    fn test_failed_clip_stops_its_sequence_only() {
        let (backend, started) = Recorder::new(Duration::ZERO, Some(GameSound::GameOverVoice));
        let audio = ThreadedAudio::new(backend).unwrap();
        audio.play_sequence(game_over_sequence()).unwrap();
        audio.play_sequence(vec![GameSound::GameOver2]).unwrap();

        assert_eq!(
            sounds(&wait_for(&started, 2)),
            vec![GameSound::Explosion, GameSound::GameOver2]
        );
    }

    #[test]
    fn test_null_audio_accepts_everything() {
        assert!(NullAudio.play(GameSound::Explosion).is_ok());
        assert!(NullAudio.play_sequence(game_over_sequence()).is_ok());
    }
}
