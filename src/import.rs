//! Bulk import: turning a directory of image files into picture nodes.
//!
//! Import is split across threads along the single-writer rule: a worker
//! walks the directory, checks which files a decoder could open, and
//! computes checksums — all read-only, CPU- and IO-bound work — then hands
//! finished [`PicturePayload`]s to the controller thread over a channel.
//! Only the controller inserts into the collection, with notifications
//! suppressed and one coarse `StructureChanged` announced at the end.
//!
//! ```text
//! worker thread                    controller thread
//! walk → decode-check → checksum ──mpsc──▶ dup-skip → insert → one event
//! ```
//!
//! ## Skipping, not failing
//!
//! A bulk import over a real photo directory always meets junk: sidecars,
//! half-downloaded files, formats nothing decodes. Every such candidate is
//! skipped with a logged diagnostic and the import continues; only an
//! unusable import root is an error.
//!
//! ## Interruption
//!
//! The worker polls [`ProgressSink::should_interrupt`] between items and
//! stops cleanly; whatever already reached the controller stays imported.

use crate::collection::{Collection, NodeId, TreeError};
use crate::config::ImportConfig;
use crate::naming::description_from_filename;
use crate::payload::PicturePayload;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Progress and cancellation seam for long-running imports. `increment`
/// fires when a candidate enters the pipeline, `decrement` when one is
/// discarded again, so an external progress total stays honest.
pub trait ProgressSink: Send + Sync {
    fn increment(&self);
    fn decrement(&self);
    fn should_interrupt(&self) -> bool;
}

/// Sink for callers that don't track progress and never interrupt.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn increment(&self) {}
    fn decrement(&self) {}
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Moves a picture's backing file. The collection decides *that* a file
/// reference changes; how the bytes travel is the caller's business —
/// tests substitute a recorder, the CLI uses [`FsRelocator`].
pub trait FileRelocator {
    fn relocate(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Relocation on the local filesystem: rename when possible, copy-and-
/// remove across devices.
pub struct FsRelocator;

impl FileRelocator for FsRelocator {
    fn relocate(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(_) => {
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
        }
    }
}

/// What an import run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
}

/// Whether a decoder could open this file, judged from its magic bytes
/// without decoding any pixels.
pub fn can_decode(path: &Path) -> bool {
    match image::ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
        Ok(reader) => reader.format().is_some(),
        Err(err) => {
            debug!(path = %path.display(), %err, "cannot probe file");
            false
        }
    }
}

/// Content checksum of a file: the leading 64 bits of its SHA-256. Stored
/// on the payload and used to recognize already-imported files.
pub fn compute_checksum(path: &Path) -> io::Result<u64> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    let digest = hasher.finalize();
    let mut leading = [0u8; 8];
    leading.copy_from_slice(&digest[..8]);
    Ok(u64::from_be_bytes(leading))
}

/// Walks `dir` and produces ready-to-insert payloads, in filename order.
///
/// Undecodable and unreadable files are skipped with a diagnostic. Returns
/// an error only when the import root itself is unusable.
pub fn scan_candidates(
    dir: &Path,
    config: &ImportConfig,
    sink: &dyn ProgressSink,
) -> Result<Vec<PicturePayload>, ImportError> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("import root is not a directory: {}", dir.display()),
        )
        .into());
    }

    let max_depth = if config.recurse { usize::MAX } else { 1 };
    let mut paths: Vec<PathBuf> = Vec::new();
    let walker = WalkDir::new(dir)
        .max_depth(max_depth)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        if sink.should_interrupt() {
            info!("import interrupted during directory walk");
            break;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "unreadable directory entry, skipping");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !can_decode(entry.path()) {
            debug!(path = %entry.path().display(), "no decoder for file, skipping");
            continue;
        }
        sink.increment();
        paths.push(entry.into_path());
    }

    // Checksumming dominates import time on large collections; fan it out.
    // The collect preserves filename order.
    let candidates: Vec<Option<PicturePayload>> = paths
        .par_iter()
        .map(|path| {
            if sink.should_interrupt() {
                sink.decrement();
                return None;
            }
            let mut payload = PicturePayload::new(path.display().to_string());
            payload.set_description(description_from_filename(path));
            if config.compute_checksums {
                match compute_checksum(path) {
                    Ok(checksum) => {
                        payload.set_checksum(Some(checksum));
                    }
                    Err(err) => {
                        warn!(path = %path.display(), %err, "cannot checksum file, skipping");
                        sink.decrement();
                        return None;
                    }
                }
            }
            Some(payload)
        })
        .collect();

    Ok(candidates.into_iter().flatten().collect())
}

/// Runs [`scan_candidates`] on a background thread and returns the channel
/// the payloads arrive on. The sender side closes when the scan finishes
/// or is interrupted, so draining the receiver terminates.
pub fn spawn_scan(
    dir: PathBuf,
    config: ImportConfig,
    sink: Arc<dyn ProgressSink>,
) -> Receiver<PicturePayload> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || match scan_candidates(&dir, &config, sink.as_ref()) {
        Ok(candidates) => {
            for candidate in candidates {
                if tx.send(candidate).is_err() {
                    debug!("import receiver dropped, stopping scan handoff");
                    break;
                }
            }
        }
        Err(err) => warn!(%err, "background scan failed"),
    });
    rx
}

impl Collection {
    /// Controller-thread half of an import: drains `rx` into `group`,
    /// skipping already-known files, with notifications suppressed. When
    /// anything was added, listeners get a single `StructureChanged` on
    /// the group and the collection is dirty.
    pub fn receive_imports(
        &mut self,
        group: NodeId,
        rx: Receiver<PicturePayload>,
        config: &ImportConfig,
    ) -> Result<ImportReport, TreeError> {
        self.ensure_controller_thread()?;
        if !self.payload(group).is_group() {
            return Err(TreeError::ChildrenNotAllowed);
        }

        let prior = self.notifications_suppressed();
        self.set_suppress_notifications(true);
        let mut report = ImportReport::default();
        for payload in rx {
            if config.skip_duplicates && self.already_known(&payload) {
                debug!(location = payload.location(), "already in the collection, skipping");
                report.skipped += 1;
                continue;
            }
            // Cannot fail: `group` was validated above and the node is
            // freshly created.
            self.add_picture(group, payload)?;
            report.added += 1;
        }
        self.set_suppress_notifications(prior);

        if report.added > 0 {
            self.mark_dirty();
            self.send_structure_changed(group);
        }
        info!(added = report.added, skipped = report.skipped, "import finished");
        Ok(report)
    }

    fn already_known(&self, payload: &PicturePayload) -> bool {
        if self.contains_location(payload.location()) {
            return true;
        }
        payload
            .checksum()
            .is_some_and(|checksum| self.is_duplicate_checksum(checksum))
    }
}

/// One-call import: background scan plus controller-side insert. The
/// caller blocks until the scan completes; UIs wanting responsiveness use
/// [`spawn_scan`] and [`Collection::receive_imports`] separately.
pub fn import_directory(
    collection: &mut Collection,
    group: NodeId,
    dir: &Path,
    config: &ImportConfig,
    sink: Arc<dyn ProgressSink>,
) -> Result<ImportReport, ImportError> {
    let rx = spawn_scan(dir.to_path_buf(), config.clone(), sink);
    Ok(collection.receive_imports(group, rx, config)?)
}

/// Changes a picture's backing file reference: `relocator` moves the
/// bytes, and only on success does the payload's location change (with its
/// usual change event).
pub fn relocate_picture(
    collection: &mut Collection,
    id: NodeId,
    relocator: &dyn FileRelocator,
    new_location: &Path,
) -> Result<(), ImportError> {
    let picture = collection
        .payload(id)
        .as_picture()
        .ok_or(TreeError::NotAPicture)?;
    let from = PathBuf::from(picture.location());
    relocator.relocate(&from, new_location)?;
    collection.edit_picture(id, |p| p.set_location(new_location.display().to_string()))?;
    Ok(())
}
