mod ui;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use splat_process::{
    ConversionSession, ConvertForm, ConvertOutcome, SplatLoader, ViewForm, ViewSession,
    ViewerFactory, params::advanced_compression_visible, viewer::DEFAULT_ROOT_ELEMENT,
};
use splat_vfs::{DataSource, DirectorySink};
use web_time::Instant;

pub use ui::TerminalStatus;

/// Scene loaded when none is given.
pub const DEFAULT_VIEW_SOURCE: &str = "../cern_mug.ply";

#[derive(Parser)]
#[command(
    author,
    version,
    arg_required_else_help = true,
    about = "Convert and view gaussian splat scenes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a .ply or .splat file to .ksplat.
    Convert(ConvertArgs),
    /// Load a scene into the viewer.
    View(ViewArgs),
}

#[derive(Args)]
pub struct ConvertArgs {
    /// File to convert (path or URL).
    #[arg(value_name = "PATH_OR_URL")]
    pub file: Option<DataSource>,
    /// Directory the converted file is written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
    #[clap(flatten)]
    pub form: ConvertForm,
}

#[derive(Args)]
pub struct ViewArgs {
    /// Scene to view (path or URL).
    #[arg(value_name = "PATH_OR_URL", default_value = DEFAULT_VIEW_SOURCE)]
    pub source: DataSource,
    /// Element the viewer attaches to.
    #[arg(long, default_value = DEFAULT_ROOT_ELEMENT)]
    pub root_element: String,
    #[clap(flatten)]
    pub form: ViewForm,
}

/// What a finished run left behind.
pub enum Finished<V> {
    Converted(PathBuf),
    /// The viewer is running. Keep it alive for as long as it should render.
    Viewing(V),
}

/// Routes log output through `multi`, so log lines don't tear the spinners.
pub fn init_logging(multi: &MultiProgress) -> Result<(), log::SetLoggerError> {
    let logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
    let level = logger.filter();

    LogWrapper::new(multi.clone(), logger).try_init()?;
    log::set_max_level(level);
    Ok(())
}

/// True when advanced compression options were changed but the level hides them.
fn ignores_advanced_options(form: &ConvertForm) -> bool {
    if advanced_compression_visible(&form.compression_level) != Some(false) {
        return false;
    }
    let defaults = ConvertForm::default();
    form.scene_center != defaults.scene_center
        || form.block_size != defaults.block_size
        || form.bucket_size != defaults.bucket_size
}

pub async fn convert<L: SplatLoader>(
    args: ConvertArgs,
    multi: MultiProgress,
    loader: L,
) -> anyhow::Result<PathBuf> {
    if ignores_advanced_options(&args.form) {
        log::warn!("Advanced compression options only apply at compression level 1 and up.");
    }

    let session = ConversionSession::new(
        loader,
        DirectorySink::new(args.out_dir),
        TerminalStatus::new(multi),
    );

    let start = Instant::now();
    match session.convert(&args.form, args.file.as_ref()).await {
        ConvertOutcome::Converted(path) => {
            let elapsed = humantime::format_duration(start.elapsed());
            log::info!("Wrote {} in {elapsed}", path.display());
            Ok(path)
        }
        ConvertOutcome::Rejected(err) => Err(err).context("Invalid conversion settings"),
        ConvertOutcome::Failed => anyhow::bail!("Could not convert file."),
        ConvertOutcome::Busy => anyhow::bail!("A conversion is already running."),
    }
}

pub async fn view<L, F>(
    args: ViewArgs,
    multi: MultiProgress,
    loader: L,
    viewers: F,
) -> anyhow::Result<F::Viewer>
where
    L: SplatLoader,
    F: ViewerFactory<L::Buffer>,
{
    let session = ViewSession::new(loader, viewers, TerminalStatus::new(multi))
        .with_root_element(args.root_element);
    let viewer = session.view(&args.form, &args.source).await?;
    log::info!("Viewing {}", args.source);
    Ok(viewer)
}

/// Runs the selected command with the given splat library.
pub async fn run<L, F>(
    cli: Cli,
    multi: MultiProgress,
    loader: L,
    viewers: F,
) -> anyhow::Result<Finished<F::Viewer>>
where
    L: SplatLoader,
    F: ViewerFactory<L::Buffer>,
{
    match cli.command {
        Command::Convert(args) => convert(args, multi, loader).await.map(Finished::Converted),
        Command::View(args) => view(args, multi, loader, viewers)
            .await
            .map(Finished::Viewing),
    }
}
