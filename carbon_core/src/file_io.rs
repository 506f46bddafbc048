//! # File I/O Module
//!
//! Handles catalog bundles, calculation reports and settings on disk with
//! safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Readers share a lock, a writer holds it exclusively
//! - **Version validation**: Ensure bundle schema compatibility
//!
//! ## File Format
//!
//! Catalog bundles are saved as `.carbon.json` files containing JSON.
//! Locks are held on a sidecar `<file>.lock` so that the rename at the end of
//! a save never swaps the locked inode out from under a reader. The last
//! holder removes the sidecar.
//!
//! ## Example
//!
//! ```rust,no_run
//! use carbon_core::catalog::builtin_catalog;
//! use carbon_core::file_io::{load_catalog_bundle, save_catalog_bundle};
//! use std::path::Path;
//!
//! let path = Path::new("reference.carbon.json");
//! save_catalog_bundle(builtin_catalog()?, path)?;
//!
//! let bundle = load_catalog_bundle(path)?;
//! println!("{} records", bundle.record_count());
//! # Ok::<(), carbon_core::errors::CarbonError>(())
//! ```

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::calculations::portfolio::{CarbonReport, CarbonRequest};
use crate::catalog::{CatalogBundle, SCHEMA_VERSION};
use crate::errors::{CarbonError, CarbonResult};
use crate::settings::EngineSettings;

/// File extension for catalog bundles
pub const BUNDLE_EXTENSION: &str = "carbon.json";

/// Advisory lock guard held on a sidecar `.lock` file.
///
/// Released when dropped.
pub struct FileLock {
    path: PathBuf,
    lock_path: PathBuf,
    lock_file: File,
    exclusive: bool,
}

impl FileLock {
    /// Take a shared (read) lock. Fails fast if a writer holds the file.
    pub fn shared(path: &Path) -> CarbonResult<Self> {
        Self::acquire(path, false)
    }

    /// Take an exclusive (write) lock. Fails fast if anyone else holds the file.
    pub fn exclusive(path: &Path) -> CarbonResult<Self> {
        Self::acquire(path, true)
    }

    fn acquire(path: &Path, exclusive: bool) -> CarbonResult<Self> {
        let lock_path = sidecar_path(path, "lock");
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CarbonError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        let locked = if exclusive {
            FileExt::try_lock_exclusive(&lock_file)
        } else {
            FileExt::try_lock_shared(&lock_file)
        };
        locked.map_err(|_| CarbonError::FileLocked {
            path: path.display().to_string(),
        })?;

        Ok(FileLock {
            path: path.to_path_buf(),
            lock_path,
            lock_file,
            exclusive,
        })
    }

    /// Path of the file this lock guards
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Last holder removes the sidecar
        if self.exclusive || FileExt::try_lock_exclusive(&self.lock_file).is_ok() {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

/// `<path>.<suffix>`, keeping every existing extension
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Read and parse a JSON file under a shared lock.
fn read_json<T: DeserializeOwned>(path: &Path) -> CarbonResult<T> {
    let _lock = FileLock::shared(path)?;

    let mut file = File::open(path)
        .map_err(|e| CarbonError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CarbonError::file_error("read", path.display().to_string(), e.to_string()))?;

    serde_json::from_str(&contents).map_err(|e| CarbonError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Serialize `value` and write it with atomic write semantics.
///
/// The save process:
/// 1. Serialize to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename .tmp over the target (atomic on most filesystems)
///
/// The whole sequence runs under an exclusive lock.
fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> CarbonResult<()> {
    let json = serde_json::to_string_pretty(value)?;

    let _lock = FileLock::exclusive(path)?;
    let tmp_path = sidecar_path(path, "tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CarbonError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CarbonError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CarbonError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CarbonError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = json.len(), "file saved");
    Ok(())
}

/// Save a catalog bundle.
pub fn save_catalog_bundle(bundle: &CatalogBundle, path: &Path) -> CarbonResult<()> {
    write_json_atomic(bundle, path)
}

/// Load a catalog bundle from a file.
///
/// # Returns
///
/// * `Ok(CatalogBundle)` - Successfully loaded bundle
/// * `Err(CarbonError::VersionMismatch)` - Schema version is incompatible
/// * `Err(CarbonError::SerializationError)` - Invalid JSON
/// * `Err(CarbonError::FileLocked)` - A save is in progress
/// * `Err(CarbonError::FileError)` - I/O error
pub fn load_catalog_bundle(path: &Path) -> CarbonResult<CatalogBundle> {
    let bundle: CatalogBundle = read_json(path)?;
    validate_version(&bundle.meta.schema_version)?;
    debug!(
        path = %path.display(),
        records = bundle.record_count(),
        data_version = %bundle.meta.data_version,
        "catalog bundle loaded"
    );
    Ok(bundle)
}

/// Save a calculation report.
pub fn save_report(report: &CarbonReport, path: &Path) -> CarbonResult<()> {
    write_json_atomic(report, path)
}

/// Load a calculation request (bill of materials).
pub fn load_request(path: &Path) -> CarbonResult<CarbonRequest> {
    read_json(path)
}

/// Load and validate engine settings.
pub fn load_settings(path: &Path) -> CarbonResult<EngineSettings> {
    let settings: EngineSettings = read_json(path)?;
    settings.validate()?;
    Ok(settings)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CarbonResult<()> {
    let mismatch = || CarbonError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // In 0.x, a newer minor may carry breaking changes
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }

    Ok(())
}
