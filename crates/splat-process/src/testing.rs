//! Stand-ins for the loader, sink and viewer libraries.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use splat_vfs::{FileSink, VfsError};

use crate::{
    dispatch::{LoadError, LoadOptions, SplatLoader},
    format::SceneFormat,
    viewer::{SplatBufferOptions, SplatViewer, ViewerFactory, ViewerOptions},
};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadCall {
    Ply {
        data: Vec<u8>,
        options: LoadOptions,
        out_sh_degree: u8,
    },
    Splat {
        data: Vec<u8>,
        options: LoadOptions,
    },
    KSplat {
        data: Vec<u8>,
    },
}

#[derive(Default)]
pub struct FakeLoader {
    calls: Mutex<Vec<LoadCall>>,
    fail: bool,
}

impl FakeLoader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<LoadCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn buffer_for(format: SceneFormat, data: &[u8]) -> Vec<u8> {
        let mut buffer = format!("{format}:").into_bytes();
        buffer.extend_from_slice(data);
        buffer
    }

    fn record(&self, format: SceneFormat, call: LoadCall) -> Result<Vec<u8>, LoadError> {
        let data = match &call {
            LoadCall::Ply { data, .. } | LoadCall::Splat { data, .. } | LoadCall::KSplat { data } => {
                data.clone()
            }
        };
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(LoadError::Parse {
                format,
                reason: "bad header".to_owned(),
            });
        }
        Ok(Self::buffer_for(format, &data))
    }
}

impl SplatLoader for FakeLoader {
    type Buffer = Vec<u8>;

    async fn load_ply(
        &self,
        data: Vec<u8>,
        options: LoadOptions,
        out_sh_degree: u8,
    ) -> Result<Vec<u8>, LoadError> {
        self.record(
            SceneFormat::Ply,
            LoadCall::Ply {
                data,
                options,
                out_sh_degree,
            },
        )
    }

    async fn load_splat(&self, data: Vec<u8>, options: LoadOptions) -> Result<Vec<u8>, LoadError> {
        self.record(SceneFormat::Splat, LoadCall::Splat { data, options })
    }

    async fn load_ksplat(&self, data: Vec<u8>) -> Result<Vec<u8>, LoadError> {
        self.record(SceneFormat::KSplat, LoadCall::KSplat { data })
    }
}

#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

impl FileSink for MemorySink {
    async fn save_file(&self, name: &str, data: &[u8]) -> Result<PathBuf, VfsError> {
        self.saved
            .lock()
            .unwrap()
            .push((name.to_owned(), data.to_vec()));
        Ok(PathBuf::from("memory").join(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Created(ViewerOptions),
    Added {
        buffers: Vec<Vec<u8>>,
        options: Vec<SplatBufferOptions>,
    },
    Started,
}

#[derive(Default, Clone)]
pub struct FakeViewerFactory {
    events: Arc<Mutex<Vec<ViewerEvent>>>,
    fail_add: bool,
}

impl FakeViewerFactory {
    pub fn failing_add() -> Self {
        Self {
            fail_add: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<ViewerEvent> {
        self.events.lock().unwrap().clone()
    }
}

pub struct FakeViewer {
    events: Arc<Mutex<Vec<ViewerEvent>>>,
    fail_add: bool,
    pub started: bool,
}

impl SplatViewer<Vec<u8>> for FakeViewer {
    async fn add_splat_buffers(
        &mut self,
        buffers: Vec<Vec<u8>>,
        options: Vec<SplatBufferOptions>,
    ) -> anyhow::Result<()> {
        if self.fail_add {
            anyhow::bail!("Out of GPU memory");
        }
        self.events
            .lock()
            .unwrap()
            .push(ViewerEvent::Added { buffers, options });
        Ok(())
    }

    fn start(&mut self) {
        self.started = true;
        self.events.lock().unwrap().push(ViewerEvent::Started);
    }
}

impl ViewerFactory<Vec<u8>> for FakeViewerFactory {
    type Viewer = FakeViewer;

    fn create_viewer(&self, options: ViewerOptions) -> anyhow::Result<FakeViewer> {
        self.events
            .lock()
            .unwrap()
            .push(ViewerEvent::Created(options));
        Ok(FakeViewer {
            events: self.events.clone(),
            fail_add: self.fail_add,
            started: false,
        })
    }
}
