use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use splat_vfs::{DataSource, VfsError};
use thiserror::Error;

use crate::{
    config::ViewForm,
    dispatch::{LoadError, SplatLoader, load_splat_buffer},
    format::RawFileBuffer,
    history::{HistoryEntry, VIEW_HISTORY_STATE, page_url},
    params::{ParamError, ViewParameters},
    status::StatusReporter,
    viewer::{DEFAULT_ROOT_ELEMENT, SplatBufferOptions, SplatViewer, ViewerFactory, ViewerOptions},
};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Invalid(#[from] ParamError),

    #[error("Failed to fetch scene.")]
    Fetch(#[source] VfsError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Viewer failed: {0:#}")]
    Viewer(anyhow::Error),
}

#[derive(Default)]
struct ViewState {
    current: Option<ViewParameters>,
    history: Vec<HistoryEntry>,
}

/// Loads a scene and hands it to a freshly created viewer.
pub struct ViewSession<L, F, R> {
    loader: L,
    viewers: F,
    reporter: R,
    root_element: String,
    state: RwLock<ViewState>,
}

impl<L, F, R> ViewSession<L, F, R>
where
    L: SplatLoader,
    F: ViewerFactory<L::Buffer>,
    R: StatusReporter,
{
    pub fn new(loader: L, viewers: F, reporter: R) -> Self {
        Self {
            loader,
            viewers,
            reporter,
            root_element: DEFAULT_ROOT_ELEMENT.to_owned(),
            state: RwLock::new(ViewState::default()),
        }
    }

    #[must_use]
    pub fn with_root_element(mut self, root_element: impl Into<String>) -> Self {
        self.root_element = root_element.into();
        self
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewState> {
        self.state.read().expect("RwLock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewState> {
        self.state.write().expect("RwLock poisoned")
    }

    /// Parameters of the last scene that loaded.
    pub fn current(&self) -> Option<ViewParameters> {
        self.read().current
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.read().history.clone()
    }

    /// Called when the user navigates back. Returns the page to reload.
    pub fn on_pop_state(&self) -> String {
        let url = page_url(self.read().current.as_ref());
        log::info!("Navigating back to {url}");
        url
    }

    pub async fn view(&self, form: &ViewForm, source: &DataSource) -> Result<F::Viewer, ViewError> {
        let params = ViewParameters::validate(form).inspect_err(|err| {
            self.reporter.set_error(&err.to_string());
        })?;

        self.reporter.set_status("Loading scene...");
        self.reporter.set_loading_visible(true);

        let data = match source.read_bytes().await {
            Ok(data) => data,
            Err(err) => {
                log::error!("Failed to fetch {source}: {err:?}");
                self.reporter
                    .set_error("Network error while fetching the file.");
                return Err(ViewError::Fetch(err));
            }
        };

        let file = RawFileBuffer::from_file(source.file_name(), data);
        let result = self.show(params, file).await;

        match &result {
            Ok(_) => {
                self.reporter.set_status("");
                self.reporter.set_loading_visible(false);
            }
            Err(err) => {
                log::error!("Could not view {source}: {err:?}");
                self.reporter.set_error("Could not view scene.");
            }
        }
        result
    }

    async fn show(&self, params: ViewParameters, file: RawFileBuffer) -> Result<F::Viewer, ViewError> {
        let buffer = load_splat_buffer(&self.loader, file, params.dispatch_params()).await?;

        self.write().history.push(HistoryEntry {
            state: VIEW_HISTORY_STATE.to_owned(),
        });

        let options = ViewerOptions::new(&params, &self.root_element);
        let mut viewer = self
            .viewers
            .create_viewer(options)
            .map_err(ViewError::Viewer)?;
        viewer
            .add_splat_buffers(
                vec![buffer],
                vec![SplatBufferOptions {
                    splat_alpha_removal_threshold: params.alpha_removal_threshold,
                }],
            )
            .await
            .map_err(ViewError::Viewer)?;
        viewer.start();

        // Only a view that actually renders is one to come back to.
        self.write().current = Some(params);
        Ok(viewer)
    }
}
