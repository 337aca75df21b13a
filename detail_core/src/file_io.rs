//! # Project File I/O
//!
//! Reads and writes `.dsp` project files (JSON) with two safety features:
//!
//! - **Atomic saves**: write to `.tmp`, fsync, rename — an interrupted save
//!   never corrupts the existing file.
//! - **Advisory locking**: an OS-level exclusive lock (via `fs2`) plus a
//!   `.dsp.lock` metadata file so users on shared drives can see who holds
//!   a project open.
//!
//! ## Example
//!
//! ```rust,no_run
//! use detail_core::file_io::{save_project, load_project, ProjectLock};
//! use detail_core::project::BeamProject;
//! use std::path::Path;
//!
//! let project = BeamProject::new("Engineer", "25-001", "Client");
//! let path = Path::new("tower.dsp");
//!
//! let lock = ProjectLock::acquire(path, "engineer@office.co")?;
//! save_project(&project, path)?;
//! drop(lock); // lock file removed, OS lock released
//! # Ok::<(), detail_core::errors::DetailError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;

use crate::errors::{DetailError, DetailResult};
use crate::project::{BeamProject, SCHEMA_VERSION};

/// A lock older than this is considered abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// Metadata stored in `.dsp.lock` files.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user: String,

    /// Machine name where the lock was acquired
    pub machine: String,

    /// Process id holding the lock
    pub pid: u32,

    /// When the lock was acquired
    pub acquired_at: DateTime<Utc>,
}

impl LockInfo {
    fn for_current_process(user: impl Into<String>) -> Self {
        LockInfo {
            user: user.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    /// A lock is stale when its process is gone (same machine) or it has
    /// outlived [`STALE_LOCK_HOURS`].
    fn is_stale(&self) -> bool {
        if hostname().as_deref() == Some(self.machine.as_str()) && !process_alive(self.pid) {
            return true;
        }
        (Utc::now() - self.acquired_at).num_hours() >= STALE_LOCK_HOURS
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    fs::metadata(format!("/proc/{pid}")).is_ok()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // Without a portable liveness check, rely on the age cutoff alone
    true
}

/// Exclusive lock on a project file, released on drop.
pub struct ProjectLock {
    lock_path: PathBuf,
    /// Keeps the OS-level lock alive
    _lock_file: File,
    /// Metadata written to the lock file
    pub info: LockInfo,
}

impl ProjectLock {
    /// Acquire an exclusive lock for a `.dsp` file.
    ///
    /// # Errors
    ///
    /// `DetailError::FileLocked` when another live process holds the lock;
    /// stale locks (dead pid or older than 24 h) are taken over.
    pub fn acquire(path: &Path, user: impl Into<String>) -> DetailResult<Self> {
        let lock_path = lock_path_for(path);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(DetailError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", existing.user, existing.machine),
                    existing.acquired_at.to_rfc3339(),
                ));
            }
        }

        let mut lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| io_error("create lock", &lock_path, e))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            DetailError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let info = LockInfo::for_current_process(user);
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| DetailError::SerializationError { reason: e.to_string() })?;
        lock_file
            .write_all(json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| io_error("write lock", &lock_path, e))?;

        Ok(ProjectLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Report who holds the lock on a project file, if anyone.
    pub fn holder(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(project_path: &Path) -> PathBuf {
    let mut name = project_path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn io_error(operation: &str, path: &Path, error: std::io::Error) -> DetailError {
    DetailError::file_error(operation, path.display().to_string(), error.to_string())
}

/// Save a project with atomic-write semantics.
///
/// Serializes to pretty JSON, writes a sibling `.tmp` file, fsyncs it, then
/// renames over the target.
pub fn save_project(project: &BeamProject, path: &Path) -> DetailResult<()> {
    let json = serde_json::to_string_pretty(project)
        .map_err(|e| DetailError::SerializationError { reason: e.to_string() })?;

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| io_error("create temp", &tmp_path, e))?;
    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| io_error("write temp", &tmp_path, e))?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_error("rename", path, e)
    })
}

/// Load a project, validating the schema version.
///
/// # Errors
///
/// * `DetailError::FileError` - the file cannot be read
/// * `DetailError::SerializationError` - the JSON is invalid
/// * `DetailError::VersionMismatch` - the file was written by an
///   incompatible schema version
pub fn load_project(path: &Path) -> DetailResult<BeamProject> {
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|e| io_error("read", path, e))?;

    let project: BeamProject =
        serde_json::from_str(&contents).map_err(|e| DetailError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&project.meta.version)?;
    Ok(project)
}

/// Load a project together with any live lock holder.
pub fn load_project_with_lock_check(path: &Path) -> DetailResult<(BeamProject, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, ProjectLock::holder(path)))
}

/// A file version is compatible when its major matches and, while we are on
/// 0.x, its minor is not newer than ours.
fn validate_version(file_version: &str) -> DetailResult<()> {
    let parse = |version: &str| -> Option<Vec<u32>> {
        let parts: Vec<u32> = version.split('.').filter_map(|p| p.parse().ok()).collect();
        (!parts.is_empty()).then_some(parts)
    };

    let mismatch = || DetailError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file = parse(file_version).ok_or_else(mismatch)?;
    let current = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file[0] != current[0] {
        return Err(mismatch());
    }
    if current[0] == 0
        && file.len() > 1
        && current.len() > 1
        && file[1] > current[1]
    {
        return Err(mismatch());
    }

    Ok(())
}
