//! Outward-facing control surface.
//!
//! The interval attribute speaks decimal text both ways: `show` renders the
//! current unit with a trailing newline, `store` accepts a decimal number
//! (surrounding whitespace allowed) and refuses anything under the floor.
//!
//! The attribute can also be published as a file. The file holds the
//! `show` text and is rewritten after every successful `store`.
//!
//! Access policy for the nodes this process exposes:
//! - the LED sink is write-only for everyone,
//! - the attribute file is rwx for owner and group, read for others.

use std::fs::{self, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::config::{find_param, MorseConfig, ParamSetError};
use crate::error::{LedError, Result};

/// Mode of the text sink.
pub const SINK_MODE: u32 = 0o222;

/// Mode of the interval attribute.
pub const ATTRIBUTE_MODE: u32 = 0o774;

/// Attribute name.
pub const INTERVAL_ATTRIBUTE: &str = "interval";

/// Text view of the time unit.
pub struct IntervalAttribute<'c> {
    config: &'c MorseConfig,
    file: Option<PathBuf>,
}

impl<'c> IntervalAttribute<'c> {
    pub fn new(config: &'c MorseConfig) -> Self {
        Self { config, file: None }
    }

    /// Attribute mirrored to `path`, created with [`ATTRIBUTE_MODE`].
    pub fn published(config: &'c MorseConfig, path: impl Into<PathBuf>) -> Result<Self> {
        let attr = Self {
            config,
            file: Some(path.into()),
        };
        attr.publish()?;
        if let Some(path) = &attr.file {
            tracing::debug!(path = %path.display(), mode = ATTRIBUTE_MODE, "interval attribute published");
        }
        Ok(attr)
    }

    pub fn config(&self) -> &'c MorseConfig {
        self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Current unit, e.g. `"300\n"`.
    pub fn show(&self) -> String {
        format!("{}\n", self.config.unit_ms())
    }

    /// Parse and apply `text`. On success returns `text.len()`, the whole
    /// input being consumed; on failure nothing changes.
    pub fn store(&self, text: &str) -> core::result::Result<usize, ParamSetError> {
        let param = find_param(INTERVAL_ATTRIBUTE).ok_or(ParamSetError::InvalidValue)?;
        param.set_from_str(self.config, text)?;
        tracing::info!(unit_ms = self.config.unit_ms(), "interval updated");
        if let Err(e) = self.publish() {
            tracing::warn!("cannot rewrite interval attribute: {}", e);
        }
        Ok(text.len())
    }

    fn publish(&self) -> io::Result<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        fs::write(path, self.show())?;
        fs::set_permissions(path, Permissions::from_mode(ATTRIBUTE_MODE))
    }
}

/// Restrict the sink node to write-only.
pub fn apply_sink_mode(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(LedError::SinkMissing(path.to_path_buf()));
    }
    fs::set_permissions(path, Permissions::from_mode(SINK_MODE))?;
    tracing::debug!(path = %path.display(), mode = SINK_MODE, "sink mode applied");
    Ok(())
}
