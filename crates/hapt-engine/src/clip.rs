use crate::error::{HapticsError, Result};
use std::path::Path;
use std::sync::Arc;

/// A haptic clip asset. The content is opaque to the arbiter and handed to
/// the renderer as-is.
pub trait HapticClip: Send + Sync {
    fn name(&self) -> &str;
    fn data(&self) -> &[u8];
}

/// Clip held in memory. Cloning shares the bytes.
#[derive(Debug, Clone)]
pub struct ClipBuffer {
    name: String,
    data: Arc<[u8]>,
}

impl ClipBuffer {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self { name: name.into(), data: data.into() }
    }

    /// Reads a clip from disk; the file stem becomes the clip name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| HapticsError::ClipRead {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, data))
    }
}

impl HapticClip for ClipBuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}
