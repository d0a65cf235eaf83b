mod data_source;
mod save;

use thiserror::Error;

// On wasm, lots of things aren't Send that are send on non-wasm.
// Non-wasm tokio requires :Send for futures, the wasm executor doesn't.
// So, it can help to annotate futures/objects as send only on not-wasm.
#[cfg(target_family = "wasm")]
mod wasm_send {
    pub trait SendNotWasm {}
    impl<T> SendNotWasm for T {}
}
#[cfg(not(target_family = "wasm"))]
mod wasm_send {
    pub trait SendNotWasm: Send {}
    impl<T: Send> SendNotWasm for T {}
}

pub use data_source::{DataSource, display_name};
pub use save::{DirectorySink, FileSink};
pub use wasm_send::*;

#[derive(Debug, Error)]
pub enum VfsError {
    #[error("IO error while accessing file.")]
    Io(#[from] std::io::Error),

    #[error("Request failed.")]
    Request(#[from] reqwest::Error),

    #[error("Server returned status {status} for {url}.")]
    Status { url: String, status: u16 },

    #[error("Failed to download data, got an html page instead.")]
    HtmlResponse,

    #[error("Cannot read local paths on wasm.")]
    PathOnWasm,
}
