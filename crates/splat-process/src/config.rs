use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPRESSION_LEVEL: &str = "1";
pub const DEFAULT_CONVERT_ALPHA_THRESHOLD: &str = "1";
pub const DEFAULT_CONVERT_SH_DEGREE: &str = "0";
pub const DEFAULT_SCENE_CENTER: &str = "0, 0, 0";
pub const DEFAULT_BLOCK_SIZE: &str = "5.0";
pub const DEFAULT_BUCKET_SIZE: &str = "256";

pub const DEFAULT_VIEW_ALPHA_THRESHOLD: &str = "0";
pub const DEFAULT_VIEW_SH_DEGREE: &str = "2";
pub const DEFAULT_CAMERA_UP: &str = "0,0,1";
pub const DEFAULT_CAMERA_POSITION: &str = "1,0,-0.4";
pub const DEFAULT_CAMERA_LOOK_AT: &str = "0,0,-0.4";

/// Conversion settings as typed by the user. Nothing here is validated yet,
/// see [`crate::params::ConversionParameters::validate`].
#[derive(Clone, Debug, Args, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ConvertForm {
    /// Compression level of the output, 0 to 2.
    #[arg(long, help_heading = "Conversion options", default_value = DEFAULT_COMPRESSION_LEVEL)]
    pub compression_level: String,
    /// Splats with an alpha below this (0 to 255) are dropped.
    #[arg(long, help_heading = "Conversion options", default_value = DEFAULT_CONVERT_ALPHA_THRESHOLD)]
    pub alpha_removal_threshold: String,
    /// Spherical harmonics degree to keep, 0 to 2.
    #[arg(long, help_heading = "Conversion options", default_value = DEFAULT_CONVERT_SH_DEGREE)]
    pub sh_degree: String,
    /// Scene center as "x, y, z". Only used when compressing.
    #[arg(long, help_heading = "Advanced compression", default_value = DEFAULT_SCENE_CENTER)]
    pub scene_center: String,
    /// Size of a compression block, at least 0.1.
    #[arg(long, help_heading = "Advanced compression", default_value = DEFAULT_BLOCK_SIZE)]
    pub block_size: String,
    /// Number of splats per bucket, 2 to 65536.
    #[arg(long, help_heading = "Advanced compression", default_value = DEFAULT_BUCKET_SIZE)]
    pub bucket_size: String,
}

impl Default for ConvertForm {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL.to_owned(),
            alpha_removal_threshold: DEFAULT_CONVERT_ALPHA_THRESHOLD.to_owned(),
            sh_degree: DEFAULT_CONVERT_SH_DEGREE.to_owned(),
            scene_center: DEFAULT_SCENE_CENTER.to_owned(),
            block_size: DEFAULT_BLOCK_SIZE.to_owned(),
            bucket_size: DEFAULT_BUCKET_SIZE.to_owned(),
        }
    }
}

/// Viewer settings as typed by the user, or as recovered from a page URL.
#[derive(Clone, Debug, Args, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ViewForm {
    /// Splats with an alpha below this (0 to 255) are not rendered.
    #[arg(long, help_heading = "View options", default_value = DEFAULT_VIEW_ALPHA_THRESHOLD)]
    pub alpha_removal_threshold: String,
    /// Spherical harmonics degree to render, 0 to 2.
    #[arg(long, help_heading = "View options", default_value = DEFAULT_VIEW_SH_DEGREE)]
    pub sh_degree: String,
    /// Camera up vector as "x,y,z".
    #[arg(long, help_heading = "Camera options", default_value = DEFAULT_CAMERA_UP)]
    pub camera_up: String,
    /// Initial camera position as "x,y,z".
    #[arg(long, help_heading = "Camera options", default_value = DEFAULT_CAMERA_POSITION)]
    pub camera_position: String,
    /// Initial camera look-at point as "x,y,z".
    #[arg(long, help_heading = "Camera options", default_value = DEFAULT_CAMERA_LOOK_AT)]
    pub camera_look_at: String,
    /// Render with antialiasing.
    #[arg(long, help_heading = "View options", default_value_t = true, action = ArgAction::Set)]
    pub antialiased: bool,
    /// Render splats as flat 2D gaussians.
    #[arg(long = "2d", help_heading = "View options")]
    #[serde(rename = "2d")]
    pub two_d: bool,
}

impl Default for ViewForm {
    fn default() -> Self {
        Self {
            alpha_removal_threshold: DEFAULT_VIEW_ALPHA_THRESHOLD.to_owned(),
            sh_degree: DEFAULT_VIEW_SH_DEGREE.to_owned(),
            camera_up: DEFAULT_CAMERA_UP.to_owned(),
            camera_position: DEFAULT_CAMERA_POSITION.to_owned(),
            camera_look_at: DEFAULT_CAMERA_LOOK_AT.to_owned(),
            antialiased: true,
            two_d: false,
        }
    }
}
