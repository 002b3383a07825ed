//! Filesystem storage adapter.
//!
//! Implements [`StoragePort`] on top of `std::fs`.  On ESP-IDF the model
//! lives on a read-only SPIFFS partition that [`FsStorage::mount_spiffs`]
//! registers under `/models` in the VFS, after which the same `std::fs`
//! path works on device and host.

use log::{info, warn};

use crate::app::ports::{StorageError, StoragePort};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Default cap on a single read; comfortably above the ~300 KB model.
pub const DEFAULT_MAX_FILE_BYTES: usize = 1024 * 1024;

/// `std::fs`-backed read-only storage.
pub struct FsStorage {
    max_file_bytes: usize,
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_BYTES)
    }
}

impl FsStorage {
    pub fn new(max_file_bytes: usize) -> Self {
        Self { max_file_bytes }
    }

    /// Register the `models` SPIFFS partition at `/models`.
    ///
    /// Must run once, from the main task, before the first read.
    #[cfg(target_os = "espidf")]
    pub fn mount_spiffs(max_file_bytes: usize) -> Result<Self, StorageError> {
        let conf = esp_vfs_spiffs_conf_t {
            base_path: c"/models".as_ptr(),
            partition_label: c"models".as_ptr(),
            max_files: 2,
            format_if_mount_failed: false,
        };
        // SAFETY: `conf` and its string literals outlive the call; the
        // registration copies what it keeps.
        let ret = unsafe { esp_vfs_spiffs_register(&conf) };
        if ret != ESP_OK {
            warn!("SPIFFS mount failed (rc={})", ret);
            return Err(StorageError::IoError);
        }
        info!("FsStorage: SPIFFS mounted at /models");
        Ok(Self::new(max_file_bytes))
    }
}

impl StoragePort for FsStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound,
            _ => StorageError::IoError,
        })?;
        if !meta.is_file() {
            return Err(StorageError::NotFound);
        }
        if meta.len() > self.max_file_bytes as u64 {
            warn!(
                "FsStorage: {} is {} bytes, cap is {}",
                path,
                meta.len(),
                self.max_file_bytes
            );
            return Err(StorageError::TooLarge);
        }

        let data = std::fs::read(path).map_err(|_| StorageError::IoError)?;
        info!("FsStorage: read {} bytes from {}", data.len(), path);
        Ok(data)
    }
}
