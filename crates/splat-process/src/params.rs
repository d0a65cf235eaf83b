use std::fmt;

use glam::Vec3;
use thiserror::Error;

use crate::{
    config::{ConvertForm, ViewForm},
    dispatch::{DispatchParams, PartitionParams},
};

pub const MAX_COMPRESSION_LEVEL: u8 = 2;
pub const MAX_SH_DEGREE: u8 = 2;
pub const MIN_BLOCK_SIZE: f32 = 0.1;
pub const MIN_BUCKET_SIZE: u32 = 2;
pub const MAX_BUCKET_SIZE: u32 = 65536;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorField {
    SceneCenter,
    CameraUp,
    CameraPosition,
    CameraLookAt,
}

impl VectorField {
    fn title(self) -> &'static str {
        match self {
            Self::SceneCenter => "Scene center",
            Self::CameraUp => "Camera up",
            Self::CameraPosition => "Camera position",
            Self::CameraLookAt => "Camera look-at",
        }
    }
}

impl fmt::Display for VectorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SceneCenter => "scene center",
            Self::CameraUp => "camera up",
            Self::CameraPosition => "camera position",
            Self::CameraLookAt => "camera look-at",
        })
    }
}

/// A rejected form field. The message is what gets shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("Invalid compression level.")]
    CompressionLevel,
    #[error("Invalid alpha removal threshold.")]
    AlphaRemovalThreshold,
    #[error("Invalid SH degree.")]
    ShDegree,
    #[error("Invalid block size.")]
    BlockSize,
    #[error("Invalid bucket size.")]
    BucketSize,
    #[error("{} must contain 3 elements.", .0.title())]
    VectorLength(VectorField),
    #[error("Invalid {0}.")]
    VectorComponent(VectorField),
    #[error("Please choose a file to convert.")]
    MissingFile,
}

fn parse_int_in<T: TryFrom<i64>>(text: &str, min: i64, max: i64, err: ParamError) -> Result<T, ParamError> {
    text.trim()
        .parse::<i64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
        .and_then(|v| T::try_from(v).ok())
        .ok_or(err)
}

fn parse_float(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

pub fn parse_compression_level(text: &str) -> Result<u8, ParamError> {
    parse_int_in(text, 0, MAX_COMPRESSION_LEVEL.into(), ParamError::CompressionLevel)
}

pub fn parse_alpha_removal_threshold(text: &str) -> Result<u8, ParamError> {
    parse_int_in(text, 0, 255, ParamError::AlphaRemovalThreshold)
}

pub fn parse_sh_degree(text: &str) -> Result<u8, ParamError> {
    parse_int_in(text, 0, MAX_SH_DEGREE.into(), ParamError::ShDegree)
}

pub fn parse_block_size(text: &str) -> Result<f32, ParamError> {
    parse_float(text)
        .filter(|v| *v >= MIN_BLOCK_SIZE)
        .ok_or(ParamError::BlockSize)
}

pub fn parse_bucket_size(text: &str) -> Result<u32, ParamError> {
    parse_int_in(
        text,
        MIN_BUCKET_SIZE.into(),
        MAX_BUCKET_SIZE.into(),
        ParamError::BucketSize,
    )
}

fn split_vec3(text: &str, field: VectorField) -> Result<[&str; 3], ParamError> {
    let parts: Vec<&str> = text.split(',').collect();
    <[&str; 3]>::try_from(parts).map_err(|_| ParamError::VectorLength(field))
}

fn parse_components(parts: [&str; 3], field: VectorField) -> Result<Vec3, ParamError> {
    let [x, y, z] = parts.map(parse_float);
    match (x, y, z) {
        (Some(x), Some(y), Some(z)) => Ok(Vec3::new(x, y, z)),
        _ => Err(ParamError::VectorComponent(field)),
    }
}

/// Parses "x,y,z". Exactly three comma separated numbers are accepted.
pub fn parse_vec3(text: &str, field: VectorField) -> Result<Vec3, ParamError> {
    parse_components(split_vec3(text, field)?, field)
}

/// Whether the advanced compression rows (block size, bucket size, scene center)
/// should be shown for this compression level text.
///
/// Returns `None` for an invalid level, in which case the rows keep their state.
pub fn advanced_compression_visible(compression_level: &str) -> Option<bool> {
    parse_compression_level(compression_level)
        .ok()
        .map(|level| level != 0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionParameters {
    pub compression_level: u8,
    pub alpha_removal_threshold: u8,
    pub sh_degree: u8,
    pub block_size: f32,
    pub bucket_size: u32,
    pub scene_center: Vec3,
    pub section_size: u32,
}

impl ConversionParameters {
    /// Validates all conversion fields, stopping at the first bad one.
    pub fn validate(form: &ConvertForm) -> Result<Self, ParamError> {
        let compression_level = parse_compression_level(&form.compression_level)?;
        let alpha_removal_threshold = parse_alpha_removal_threshold(&form.alpha_removal_threshold)?;
        let sh_degree = parse_sh_degree(&form.sh_degree)?;
        let block_size = parse_block_size(&form.block_size)?;
        let bucket_size = parse_bucket_size(&form.bucket_size)?;
        let scene_center = parse_vec3(&form.scene_center, VectorField::SceneCenter)?;

        Ok(Self {
            compression_level,
            alpha_removal_threshold,
            sh_degree,
            block_size,
            bucket_size,
            scene_center,
            section_size: 0,
        })
    }

    pub fn dispatch_params(&self) -> DispatchParams {
        DispatchParams {
            alpha_removal_threshold: self.alpha_removal_threshold,
            compression_level: self.compression_level,
            sh_degree: self.sh_degree,
            partition: Some(PartitionParams {
                section_size: self.section_size,
                scene_center: self.scene_center,
                block_size: self.block_size,
                bucket_size: self.bucket_size,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParameters {
    pub alpha_removal_threshold: u8,
    pub sh_degree: u8,
    pub camera_up: Vec3,
    pub camera_position: Vec3,
    pub camera_look_at: Vec3,
    pub antialiased: bool,
    pub two_d: bool,
}

impl ViewParameters {
    /// Validates all view fields, stopping at the first bad one.
    ///
    /// All vectors are checked for their element count before any of them is parsed.
    pub fn validate(form: &ViewForm) -> Result<Self, ParamError> {
        let alpha_removal_threshold = parse_alpha_removal_threshold(&form.alpha_removal_threshold)?;
        let sh_degree = parse_sh_degree(&form.sh_degree)?;

        let up = split_vec3(&form.camera_up, VectorField::CameraUp)?;
        let position = split_vec3(&form.camera_position, VectorField::CameraPosition)?;
        let look_at = split_vec3(&form.camera_look_at, VectorField::CameraLookAt)?;

        Ok(Self {
            alpha_removal_threshold,
            sh_degree,
            camera_up: parse_components(up, VectorField::CameraUp)?,
            camera_position: parse_components(position, VectorField::CameraPosition)?,
            camera_look_at: parse_components(look_at, VectorField::CameraLookAt)?,
            antialiased: form.antialiased,
            two_d: form.two_d,
        })
    }

    /// Splats are never compressed or partitioned for viewing.
    pub fn dispatch_params(&self) -> DispatchParams {
        DispatchParams {
            alpha_removal_threshold: self.alpha_removal_threshold,
            compression_level: 0,
            sh_degree: self.sh_degree,
            partition: None,
        }
    }
}
