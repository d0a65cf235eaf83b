use std::{convert::Infallible, fmt, str::FromStr};

use crate::VfsError;

/// Where the bytes of a scene come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    Path(String),
    Url(String),
}

impl FromStr for DataSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Self::Url(s.to_owned()))
        } else {
            Ok(Self::Path(s.to_owned()))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{path}"),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// The part of a path after the last forward or backward slash.
///
/// File pickers hand out things like `C:\fakepath\scene.ply`, so both separators count.
pub fn display_name(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

impl DataSource {
    /// File name used for display and for format detection.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Path(path) => display_name(path),
            Self::Url(url) => {
                let end = url.find(['?', '#']).unwrap_or(url.len());
                display_name(&url[..end])
            }
        }
    }

    /// Read the whole source into memory.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, VfsError> {
        let data = match self {
            Self::Path(path) => read_path(path).await?,
            Self::Url(url) => fetch_url(&reqwest::Client::new(), url).await?,
        };
        log::info!("Read {} bytes from {self}", data.len());
        Ok(data)
    }
}

#[cfg(not(target_family = "wasm"))]
async fn read_path(path: &str) -> Result<Vec<u8>, VfsError> {
    Ok(tokio::fs::read(path).await?)
}

#[cfg(target_family = "wasm")]
async fn read_path(_path: &str) -> Result<Vec<u8>, VfsError> {
    Err(VfsError::PathOnWasm)
}

async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, VfsError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(VfsError::Status {
            url: url.to_owned(),
            status: status.as_u16(),
        });
    }

    let data = response.bytes().await?;
    // Dev servers like to answer unknown paths with their index page.
    if data.starts_with(b"<!DOCTYPE html>") {
        return Err(VfsError::HtmlResponse);
    }
    Ok(data.to_vec())
}
