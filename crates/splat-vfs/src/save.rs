use std::{
    future::Future,
    path::{Path, PathBuf},
};

use crate::{SendNotWasm, VfsError, display_name};

/// Somewhere converted files can be handed to the user.
pub trait FileSink {
    /// Saves data under the given name and returns where it ended up.
    fn save_file(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl Future<Output = Result<PathBuf, VfsError>> + SendNotWasm;
}

/// Saves files into a fixed output directory.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    async fn save_file(&self, name: &str, data: &[u8]) -> Result<PathBuf, VfsError> {
        #[cfg(not(target_family = "wasm"))]
        {
            // Never let a name escape the output directory.
            let path = self.dir.join(display_name(name));
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, data).await?;
            log::info!("Saved {} bytes to {}", data.len(), path.display());
            Ok(path)
        }

        #[cfg(target_family = "wasm")]
        {
            let _ = (name, data);
            Err(VfsError::PathOnWasm)
        }
    }
}
