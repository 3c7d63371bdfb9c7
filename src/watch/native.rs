// src/watch/native.rs

//! Adapter from `notify` events to per-directory [`DirNotification`]s.

use std::path::{Path, PathBuf};

use notify::Event;
use notify::event::{EventKind, ModifyKind, RemoveKind, RenameMode};

use crate::watch::event::{DirNotification, RawEvent, RawEventKind};

/// Translate one `notify` event into per-directory notifications.
///
/// `root` is the subscription root; it receives the overflow notification
/// when `notify` asks for a rescan without naming a path. Consecutive paths
/// in the same directory are grouped into one notification.
pub fn translate(root: &Path, event: &Event) -> Vec<DirNotification> {
    if event.need_rescan() {
        let dir = event.paths.first().map_or_else(|| root.to_path_buf(), |p| parent_or_self(p));
        return vec![DirNotification::single(dir, RawEventKind::Overflow, "")];
    }

    let mut raw: Vec<(PathBuf, RawEventKind)> = Vec::with_capacity(event.paths.len());
    let mut invalidated: Vec<PathBuf> = Vec::new();

    match &event.kind {
        EventKind::Create(_) => tag_all(&mut raw, &event.paths, RawEventKind::Create),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            tag_all(&mut raw, &event.paths, RawEventKind::Delete)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            tag_all(&mut raw, &event.paths, RawEventKind::Create)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut paths = event.paths.iter();
            if let Some(from) = paths.next() {
                raw.push((from.clone(), RawEventKind::Delete));
            }
            for to in paths {
                raw.push((to.clone(), RawEventKind::Create));
            }
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            // Platforms that cannot pair renames: decide by what is there now.
            for path in &event.paths {
                let kind = if path.exists() {
                    RawEventKind::Create
                } else {
                    RawEventKind::Delete
                };
                raw.push((path.clone(), kind));
            }
        }
        EventKind::Modify(_) => tag_all(&mut raw, &event.paths, RawEventKind::Modify),
        EventKind::Remove(kind) => {
            tag_all(&mut raw, &event.paths, RawEventKind::Delete);
            if matches!(kind, RemoveKind::Folder) {
                invalidated.extend(event.paths.iter().cloned());
            }
        }
        EventKind::Access(_) | EventKind::Any | EventKind::Other => {
            tag_all(&mut raw, &event.paths, RawEventKind::Unsupported)
        }
    }

    let mut notes: Vec<DirNotification> = Vec::new();
    for (path, kind) in raw {
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            continue;
        };
        match notes.last_mut() {
            Some(last) if last.dir == dir && !last.invalid => {
                last.events.push(RawEvent::new(kind, name));
            }
            _ => notes.push(DirNotification::single(dir, kind, name)),
        }
    }
    notes.extend(invalidated.into_iter().map(DirNotification::invalidated));
    notes
}

fn tag_all(out: &mut Vec<(PathBuf, RawEventKind)>, paths: &[PathBuf], kind: RawEventKind) {
    out.extend(paths.iter().map(|p| (p.clone(), kind)));
}

fn parent_or_self(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().unwrap_or(path).to_path_buf()
    }
}
