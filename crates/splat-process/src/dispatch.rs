use std::future::Future;

use glam::Vec3;
use splat_vfs::SendNotWasm;
use thiserror::Error;
use tracing::Instrument;

use crate::format::{RawFileBuffer, SceneFormat};

/// How splats get grouped spatially when compressing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionParams {
    pub section_size: u32,
    pub scene_center: Vec3,
    pub block_size: f32,
    pub bucket_size: u32,
}

/// Options passed to the PLY and Splat loaders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub alpha_removal_threshold: u8,
    pub compression_level: u8,
    /// Ask the loader to build its render buffers up front.
    pub optimize_splat_data: bool,
    pub partition: Option<PartitionParams>,
}

/// Already validated parameters for a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchParams {
    pub alpha_removal_threshold: u8,
    pub compression_level: u8,
    pub sh_degree: u8,
    pub partition: Option<PartitionParams>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse {format} data: {reason}")]
    Parse { format: SceneFormat, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The splat loading library. Turns raw file bytes into a splat buffer.
///
/// The buffer bytes are the `.ksplat` representation, which is what gets saved
/// when converting.
pub trait SplatLoader {
    type Buffer: AsRef<[u8]> + SendNotWasm;

    fn load_ply(
        &self,
        data: Vec<u8>,
        options: LoadOptions,
        out_sh_degree: u8,
    ) -> impl Future<Output = Result<Self::Buffer, LoadError>> + SendNotWasm;

    fn load_splat(
        &self,
        data: Vec<u8>,
        options: LoadOptions,
    ) -> impl Future<Output = Result<Self::Buffer, LoadError>> + SendNotWasm;

    /// KSplat data is already in its final form.
    fn load_ksplat(
        &self,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<Self::Buffer, LoadError>> + SendNotWasm;
}

/// Picks the loader matching the file's format. Parameters are trusted as-is.
pub async fn load_splat_buffer<L: SplatLoader>(
    loader: &L,
    file: RawFileBuffer,
    params: DispatchParams,
) -> Result<L::Buffer, LoadError> {
    let options = LoadOptions {
        alpha_removal_threshold: params.alpha_removal_threshold,
        compression_level: params.compression_level,
        optimize_splat_data: true,
        partition: params.partition,
    };

    log::info!(
        "Loading {} bytes of {} data (compression level {})",
        file.data.len(),
        file.format,
        params.compression_level
    );

    let span = tracing::trace_span!("Load splat buffer", format = %file.format);
    async move {
        match file.format {
            SceneFormat::Ply => {
                loader
                    .load_ply(file.data, options, params.sh_degree)
                    .await
            }
            SceneFormat::Splat => loader.load_splat(file.data, options).await,
            SceneFormat::KSplat => loader.load_ksplat(file.data).await,
        }
    }
    .instrument(span)
    .await
}
