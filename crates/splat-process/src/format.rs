use std::fmt;

/// Point cloud formats the loader library understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneFormat {
    Ply,
    Splat,
    KSplat,
}

impl SceneFormat {
    /// Detects the format from a file name, the same way the loader library does.
    pub fn from_path(path: &str) -> Option<Self> {
        if path.ends_with(".ply") {
            Some(Self::Ply)
        } else if path.ends_with(".splat") {
            Some(Self::Splat)
        } else if path.ends_with(".ksplat") {
            Some(Self::KSplat)
        } else {
            None
        }
    }
}

impl fmt::Display for SceneFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ply => "PLY",
            Self::Splat => "Splat",
            Self::KSplat => "KSplat",
        })
    }
}

/// The raw bytes of a scene file together with the format they are in.
///
/// Consumed by [`crate::dispatch::load_splat_buffer`].
pub struct RawFileBuffer {
    pub data: Vec<u8>,
    pub format: SceneFormat,
}

impl RawFileBuffer {
    /// Tags the bytes with the format implied by `file_name`.
    ///
    /// Unknown extensions are handed to the KSplat loader, which takes data as-is.
    pub fn from_file(file_name: &str, data: Vec<u8>) -> Self {
        let file_name = file_name.trim();
        let format = SceneFormat::from_path(file_name).unwrap_or_else(|| {
            log::warn!("Unknown extension for {file_name:?}, loading it as KSplat.");
            SceneFormat::KSplat
        });
        Self { data, format }
    }
}
