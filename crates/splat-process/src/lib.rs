pub mod config;
pub mod convert;
pub mod dispatch;
pub mod format;
pub mod history;
pub mod params;
pub mod status;
pub mod view;
pub mod viewer;

#[cfg(test)]
mod testing;

pub use config::{ConvertForm, ViewForm};
pub use convert::{ConversionSession, ConvertOutcome, ConvertStage};
pub use dispatch::{LoadError, SplatLoader};
pub use params::{ConversionParameters, ParamError, ViewParameters};
pub use status::{StatusPanel, StatusReporter};
pub use view::{ViewError, ViewSession};
pub use viewer::{SplatViewer, ViewerFactory, ViewerOptions};
