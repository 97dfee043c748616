//! Single-mutation-session guard (§5, §10.7).
//!
//! Two concurrent mutation sessions on the same project root are undefined
//! behaviour per the resource model; this is the concrete mechanism that
//! refuses the second one. One `fd-lock` exclusive lock over a file under
//! the trash root, held for the lifetime of one `clean` run.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fd_lock::{RwLock as FdRwLock, RwLockWriteGuard};

use crate::constants::TRASH_DIR_NAME;
use crate::errors::MutationError;

/// Holds the session's exclusive lock for as long as this guard lives;
/// dropping it releases the lock, letting a subsequent session proceed.
///
/// `lock` is heap-allocated so its address is stable; `guard` borrows from
/// it with a `'static` lifetime reconstructed via the raw pointer kept
/// alongside it. The two are dropped together in `Drop`, guard first.
pub struct SessionGuard {
    lock_ptr: *mut FdRwLock<File>,
    guard: Option<RwLockWriteGuard<'static, File>>,
    session_id: String,
    trash_root: PathBuf,
}

unsafe impl Send for SessionGuard {}

impl SessionGuard {
    /// Attempt to acquire the session lock for `project_root`. Non-blocking:
    /// if another session already holds it, returns
    /// `MutationError::SessionAlreadyActive` rather than waiting.
    pub fn acquire(
        project_root: &Path,
        session_id: impl Into<String>,
    ) -> Result<Self, MutationError> {
        let trash_root = project_root.join(TRASH_DIR_NAME);
        fs::create_dir_all(&trash_root).map_err(|source| MutationError::BackupFailure {
            path: trash_root.display().to_string(),
            source,
        })?;

        let lock_path = trash_root.join(".session.lock");
        let file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|source| MutationError::BackupFailure {
                path: lock_path.display().to_string(),
                source,
            })?;

        let session_id = session_id.into();
        let lock_box = Box::new(FdRwLock::new(file));
        let lock_ptr = Box::into_raw(lock_box);

        // SAFETY: `lock_ptr` was just created by `Box::into_raw` above and is
        // not aliased elsewhere; it stays valid (heap-allocated, stable
        // address) until `Drop` reconstructs and frees the box, at which
        // point `guard` has already been dropped.
        let lock_ref: &'static mut FdRwLock<File> = unsafe { &mut *lock_ptr };
        let guard = match lock_ref.try_write() {
            Ok(g) => g,
            Err(_) => {
                // SAFETY: no guard was produced, so reclaiming the box here
                // is the only outstanding reference to `lock_ptr`.
                drop(unsafe { Box::from_raw(lock_ptr) });
                return Err(MutationError::SessionAlreadyActive { session_id });
            }
        };

        Ok(Self {
            lock_ptr,
            guard: Some(guard),
            session_id,
            trash_root,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session_dir(&self) -> PathBuf {
        self.trash_root.join(&self.session_id)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.guard.take();
        // SAFETY: the guard borrowing from `lock_ptr` has just been dropped,
        // so no live reference into the box remains; `lock_ptr` was produced
        // by a single `Box::into_raw` in `acquire` and this is the only
        // place it is reclaimed.
        drop(unsafe { Box::from_raw(self.lock_ptr) });
    }
}
