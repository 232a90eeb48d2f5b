use std::{fs, io::ErrorKind, path::PathBuf};

use crate::prelude::*;

/// Single opaque slot with the "read current" and "write current" semantics.
pub trait BlobStore {
    fn load(&self) -> Result<Option<Vec<u8>>>;

    fn save(&self, blob: &[u8]) -> Result;
}

/// Slot backed by a single file, which is absent until the first write.
pub struct FileBlob(PathBuf);

impl FileBlob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl BlobStore for FileBlob {
    #[instrument(skip_all, fields(path = %self.0.display()))]
    fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.0) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => {
                Err(error).with_context(|| format!("failed to read `{}`", self.0.display()))
            }
        }
    }

    #[instrument(skip_all, fields(path = %self.0.display(), n_bytes = blob.len()))]
    fn save(&self, blob: &[u8]) -> Result {
        if let Some(parent) = self.0.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create `{}`", parent.display()))?;
        }
        fs::write(&self.0, blob).with_context(|| format!("failed to write `{}`", self.0.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_absent() -> Result {
        let directory = tempfile::tempdir()?;
        let blob = FileBlob::new(directory.path().join("forecast-cache.json"));
        assert!(blob.load()?.is_none());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result {
        let directory = tempfile::tempdir()?;
        let blob = FileBlob::new(directory.path().join("nested").join("forecast-cache.json"));
        blob.save(b"{}")?;
        assert_eq!(blob.load()?.as_deref(), Some(b"{}".as_slice()));
        blob.save(b"[]")?;
        assert_eq!(blob.load()?.as_deref(), Some(b"[]".as_slice()));
        Ok(())
    }
}
