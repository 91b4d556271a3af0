//! # Shader Hot-Reloading
//!
//! A [`notify`] watcher on the `shaders/` directory. Created or modified
//! `.wgsl` files are sent over a channel; the event loop drains it once per
//! frame and hands the new source to the renderer.
//!
//! Keep the returned [`RecommendedWatcher`] alive. Dropping it stops the
//! watch.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as _};
use tracing::{error, info};

pub const SHADER_DIRECTORY: &str = "shaders";
const SHADER_EXTENSION: &str = "wgsl";

pub fn is_shader_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SHADER_EXTENSION)
}

/// Watch `dir` recursively for shader changes.
///
/// # Errors
///
/// Fails when the directory does not exist or the platform watcher cannot
/// be created.
pub fn start(dir: &Path) -> Result<(RecommendedWatcher, Receiver<PathBuf>)> {
    if !dir.is_dir() {
        anyhow::bail!("shader directory '{}' not found", dir.display());
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |result| forward(&tx, result))
        .context("failed to create file watcher")?;
    watcher
        .watch(dir, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch '{}'", dir.display()))?;

    info!("shader watcher active on '{}'", dir.display());
    Ok((watcher, rx))
}

fn forward(tx: &Sender<PathBuf>, result: notify::Result<Event>) {
    let event = match result {
        Ok(event) => event,
        Err(err) => {
            error!("file watcher error: {err:?}");
            return;
        }
    };
    if !event.kind.is_modify() && !event.kind.is_create() {
        return;
    }
    for path in event.paths.into_iter().filter(|p| is_shader_file(p)) {
        // The receiver is gone once the event loop exits.
        let _ = tx.send(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_wgsl_files_count_as_shaders() {
        assert!(is_shader_file(Path::new("shaders/scene.wgsl")));
        assert!(!is_shader_file(Path::new("shaders/scene.wgsl.swp")));
        assert!(!is_shader_file(Path::new("shaders/notes.txt")));
        assert!(!is_shader_file(Path::new("shaders")));
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(start(Path::new("definitely/not/here")).is_err());
    }

    #[test]
    fn modified_shaders_reach_the_channel() {
        let (tx, rx) = mpsc::channel();
        let event = Event::new(notify::EventKind::Modify(notify::event::ModifyKind::Any))
            .add_path(PathBuf::from("shaders/scene.wgsl"))
            .add_path(PathBuf::from("shaders/readme.md"));
        forward(&tx, Ok(event));

        assert_eq!(rx.try_recv().unwrap(), PathBuf::from("shaders/scene.wgsl"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn removals_are_ignored() {
        let (tx, rx) = mpsc::channel();
        let event = Event::new(notify::EventKind::Remove(notify::event::RemoveKind::File))
            .add_path(PathBuf::from("shaders/scene.wgsl"));
        forward(&tx, Ok(event));
        assert!(rx.try_recv().is_err());
    }
}
