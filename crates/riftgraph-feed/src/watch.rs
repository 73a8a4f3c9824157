use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

pub const COALESCE_WINDOW: Duration = Duration::from_millis(250);

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

fn is_permission_denied(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::PermissionDenied
}

fn touches(event: &notify::Event, target: &Path) -> bool {
    event.paths.iter().any(|p| p == target)
}

/// Watches the result file and emits one signal per 250 ms window in which it
/// changed. The parent directory is watched so editors that replace the file
/// by rename are still seen.
pub fn spawn(path: &Path, tx: mpsc::Sender<()>) -> Result<RecommendedWatcher> {
    let Some(name) = path.file_name() else {
        anyhow::bail!("not a file path: {}", path.display());
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = std::fs::canonicalize(parent)
        .with_context(|| format!("resolve {}", parent.display()))?;
    let target = dir.join(name);

    // notify callback thread -> tokio channel
    let (raw_tx, mut raw_rx) = mpsc::channel::<()>(1024);
    let watched = target.clone();
    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: std::result::Result<notify::Event, notify::Error>| match res {
            Ok(event) if is_change(&event.kind) && touches(&event, &watched) => {
                let _ = raw_tx.try_send(());
            }
            Ok(_) => {}
            Err(err) => tracing::debug!(%err, "watch error"),
        },
        notify::Config::default(),
    )?;

    match watcher.watch(&dir, RecursiveMode::NonRecursive) {
        Ok(()) => {}
        Err(notify::Error {
            kind: notify::ErrorKind::Io(ref io_err),
            ..
        }) if is_permission_denied(io_err) => {
            anyhow::bail!("permission denied watching {}", dir.display());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("watch {}", dir.display()));
        }
    }
    tracing::info!(path = %target.display(), "watching analysis result");

    // Coalescer: 250ms window
    tokio::spawn(async move {
        let mut pending = false;
        let mut tick = tokio::time::interval(COALESCE_WINDOW);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                signal = raw_rx.recv() => {
                    if signal.is_none() {
                        break;
                    }
                    pending = true;
                }
                _ = tick.tick() => {
                    if !pending {
                        continue;
                    }
                    pending = false;
                    if tx.send(()).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};
    use std::path::PathBuf;

    #[test]
    fn permission_denied_is_detected() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(is_permission_denied(&err));
        assert!(!is_permission_denied(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[test]
    fn only_events_on_the_target_count() {
        let target = PathBuf::from("/data/analysis.json");
        let hit = notify::Event::new(EventKind::Modify(ModifyKind::Any)).add_path(target.clone());
        let miss = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/data/other.json"));
        let access = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(target.clone());

        assert!(is_change(&hit.kind) && touches(&hit, &target));
        assert!(!touches(&miss, &target));
        assert!(!is_change(&access.kind));
    }
}
