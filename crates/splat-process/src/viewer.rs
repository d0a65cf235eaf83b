use std::future::Future;

use glam::Vec3;
use splat_vfs::SendNotWasm;

use crate::params::ViewParameters;

/// Element the viewer attaches its canvas to.
pub const DEFAULT_ROOT_ELEMENT: &str = "canvas-container";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplatRenderMode {
    ThreeD,
    TwoD,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub camera_up: Vec3,
    pub initial_camera_position: Vec3,
    pub initial_camera_look_at: Vec3,
    pub half_precision_covariances_on_gpu: bool,
    pub antialiased: bool,
    pub splat_render_mode: SplatRenderMode,
    pub sh_degree: u8,
    pub root_element: String,
    pub shared_memory_for_workers: bool,
}

impl ViewerOptions {
    pub fn new(params: &ViewParameters, root_element: &str) -> Self {
        Self {
            camera_up: params.camera_up,
            initial_camera_position: params.camera_position,
            initial_camera_look_at: params.camera_look_at,
            half_precision_covariances_on_gpu: false,
            antialiased: params.antialiased,
            splat_render_mode: if params.two_d {
                SplatRenderMode::TwoD
            } else {
                SplatRenderMode::ThreeD
            },
            sh_degree: params.sh_degree,
            root_element: root_element.to_owned(),
            shared_memory_for_workers: false,
        }
    }
}

/// Per buffer options when adding splat buffers to a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplatBufferOptions {
    pub splat_alpha_removal_threshold: u8,
}

/// A viewer instance from the rendering library.
pub trait SplatViewer<B> {
    /// Adds buffers to the scene. `options` holds one entry per buffer.
    fn add_splat_buffers(
        &mut self,
        buffers: Vec<B>,
        options: Vec<SplatBufferOptions>,
    ) -> impl Future<Output = anyhow::Result<()>> + SendNotWasm;

    /// Starts the render loop.
    fn start(&mut self);
}

pub trait ViewerFactory<B> {
    type Viewer: SplatViewer<B>;

    fn create_viewer(&self, options: ViewerOptions) -> anyhow::Result<Self::Viewer>;
}
