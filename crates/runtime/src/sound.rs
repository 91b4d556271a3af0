//! The collision hit sound.
//!
//! [`RodioHitSound`] decodes the clip once and keeps it buffered. Every
//! `play` drops the previous sink and starts the clip again from the
//! beginning on a fresh one, so rapid hits restart the sound rather than
//! stacking copies of it.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("no audio output device: {0}")]
    Device(#[from] rodio::StreamError),
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("failed to create sink: {0}")]
    Play(#[from] rodio::PlayError),
}

/// A fire-and-forget sound effect.
pub trait HitSound {
    /// Restart the effect from the beginning at `volume` in `[0, 1]`.
    fn play(&mut self, volume: f32);
}

impl<S: HitSound + ?Sized> HitSound for Box<S> {
    fn play(&mut self, volume: f32) {
        (**self).play(volume);
    }
}

type Clip = Buffered<Decoder<BufReader<File>>>;

pub struct RodioHitSound {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    clip: Clip,
    sink: Option<Sink>,
}

impl RodioHitSound {
    /// Open the default output device and decode `path`.
    ///
    /// # Errors
    ///
    /// Fails without an output device or when the file cannot be read or
    /// decoded.
    pub fn load(path: &Path) -> Result<Self, SoundError> {
        let (stream, handle) = OutputStream::try_default()?;
        let file = File::open(path).map_err(|source| SoundError::Io {
            path: path.to_owned(),
            source,
        })?;
        let clip = Decoder::new(BufReader::new(file))
            .map_err(|source| SoundError::Decode {
                path: path.to_owned(),
                source,
            })?
            .buffered();
        tracing::info!(path = %path.display(), "loaded hit sound");
        Ok(Self {
            _stream: stream,
            handle,
            clip,
            sink: None,
        })
    }

    fn restart(&mut self, volume: f32) -> Result<(), SoundError> {
        if let Some(previous) = self.sink.take() {
            previous.stop();
        }
        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(volume);
        sink.append(self.clip.clone());
        self.sink = Some(sink);
        Ok(())
    }
}

impl HitSound for RodioHitSound {
    fn play(&mut self, volume: f32) {
        if let Err(err) = self.restart(volume) {
            tracing::warn!("hit sound failed: {err}");
        }
    }
}

/// Plays nothing. Used for `--mute`, headless runs and missing audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentHitSound;

impl HitSound for SilentHitSound {
    fn play(&mut self, volume: f32) {
        tracing::trace!(volume, "hit (muted)");
    }
}

/// Load the clip at `path`, falling back to [`SilentHitSound`] with a
/// warning when that is not possible.
pub fn open_or_silent(path: &Path) -> Box<dyn HitSound> {
    match RodioHitSound::load(path) {
        Ok(sound) => Box::new(sound),
        Err(err) => {
            tracing::warn!("{err}; hit sounds are disabled");
            Box::new(SilentHitSound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(usize);

    impl HitSound for Counter {
        fn play(&mut self, _volume: f32) {
            self.0 += 1;
        }
    }

    #[test]
    fn boxed_sounds_forward_to_the_inner_sound() {
        let mut boxed: Box<Counter> = Box::new(Counter(0));
        boxed.play(0.5);
        boxed.play(0.5);
        assert_eq!(boxed.0, 2);
    }

    #[test]
    fn missing_clip_falls_back_to_silence() {
        let mut sound = open_or_silent(Path::new("does/not/exist.mp3"));
        sound.play(1.0);
    }
}
