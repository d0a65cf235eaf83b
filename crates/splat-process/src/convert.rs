use std::{
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use anyhow::Context;
use splat_vfs::{DataSource, FileSink};
use tokio_with_wasm::alias as tokio_wasm;
use tracing::Instrument;
use web_time::Instant;

use crate::{
    config::ConvertForm,
    dispatch::{SplatLoader, load_splat_buffer},
    format::RawFileBuffer,
    params::{ConversionParameters, ParamError},
    status::StatusReporter,
};

/// Name the converted file is saved under.
pub const CONVERTED_FILE_NAME: &str = "converted_file.ksplat";

/// Pause between announcing the parse and starting it, so the status can be drawn.
const PARSE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStage {
    Idle,
    Reading,
    Parsing,
    Dispatching,
    Downloading,
    Done,
    Error,
}

#[derive(Debug)]
pub enum ConvertOutcome {
    /// Another conversion is running. Nothing was touched.
    Busy,
    /// The form was rejected before any IO happened.
    Rejected(ParamError),
    /// The converted file was saved here.
    Converted(PathBuf),
    /// Reading, loading or saving failed. Details went to the log.
    Failed,
}

/// Releases the in-flight flag however the conversion ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Converts user supplied splat files, one at a time.
pub struct ConversionSession<L, S, R> {
    loader: L,
    sink: S,
    reporter: R,
    in_progress: AtomicBool,
    stage: Mutex<ConvertStage>,
}

impl<L, S, R> ConversionSession<L, S, R>
where
    L: SplatLoader,
    S: FileSink,
    R: StatusReporter,
{
    pub fn new(loader: L, sink: S, reporter: R) -> Self {
        Self {
            loader,
            sink,
            reporter,
            in_progress: AtomicBool::new(false),
            stage: Mutex::new(ConvertStage::Idle),
        }
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub fn stage(&self) -> ConvertStage {
        *self.stage.lock().expect("Mutex poisoned")
    }

    fn set_stage(&self, stage: ConvertStage) {
        log::debug!("Conversion stage: {stage:?}");
        *self.stage.lock().expect("Mutex poisoned") = stage;
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_progress))
    }

    /// Validates the form and converts `file`, saving the result as [`CONVERTED_FILE_NAME`].
    ///
    /// Does nothing at all while another conversion is in flight.
    pub async fn convert(&self, form: &ConvertForm, file: Option<&DataSource>) -> ConvertOutcome {
        if self.is_in_progress() {
            return ConvertOutcome::Busy;
        }

        let validated = ConversionParameters::validate(form)
            .and_then(|params| file.map(|file| (params, file)).ok_or(ParamError::MissingFile));
        let (params, file) = match validated {
            Ok(valid) => valid,
            Err(err) => {
                self.set_stage(ConvertStage::Idle);
                self.reporter.set_error(&err.to_string());
                return ConvertOutcome::Rejected(err);
            }
        };

        let Some(_in_flight) = self.try_begin() else {
            return ConvertOutcome::Busy;
        };

        self.reporter.set_error("");
        self.reporter.set_trigger_enabled(false);

        let start = Instant::now();
        let span = tracing::trace_span!("Convert", file = %file);
        let result = self.run(params, file).instrument(span).await;

        let outcome = match result {
            Ok(path) => {
                log::info!(
                    "Converted {} to {} in {:?}",
                    file.file_name(),
                    path.display(),
                    start.elapsed()
                );
                self.set_stage(ConvertStage::Done);
                self.reporter.set_status("Conversion complete!");
                self.reporter.set_loading_visible(false);
                self.reporter.set_success_visible(true);
                ConvertOutcome::Converted(path)
            }
            Err(err) => {
                log::error!("Conversion of {file} failed: {err:?}");
                self.set_stage(ConvertStage::Error);
                self.reporter.set_error("Could not convert file.");
                ConvertOutcome::Failed
            }
        };

        self.reporter.set_trigger_enabled(true);
        outcome
    }

    async fn run(&self, params: ConversionParameters, file: &DataSource) -> anyhow::Result<PathBuf> {
        self.set_stage(ConvertStage::Reading);
        self.reporter.set_status("Loading file...");
        self.reporter.set_loading_visible(true);

        let data = file
            .read_bytes()
            .await
            .with_context(|| format!("Failed to read {file}"))?;

        self.set_stage(ConvertStage::Parsing);
        self.reporter.set_status("Parsing file...");
        self.reporter.set_loading_visible(true);
        self.reporter.set_success_visible(false);
        let raw = RawFileBuffer::from_file(file.file_name(), data);

        tokio_wasm::time::sleep(PARSE_DELAY).await;

        self.set_stage(ConvertStage::Dispatching);
        let buffer = load_splat_buffer(&self.loader, raw, params.dispatch_params())
            .await
            .context("Failed to load splat data")?;

        self.set_stage(ConvertStage::Downloading);
        let path = self
            .sink
            .save_file(CONVERTED_FILE_NAME, buffer.as_ref())
            .await
            .context("Failed to save converted file")?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::SceneFormat,
        status::StatusPanel,
        testing::{FakeLoader, LoadCall, MemorySink},
    };

    struct Fixture {
        _dir: tempfile::TempDir,
        file: DataSource,
    }

    fn scene_file(name: &str, data: &[u8]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        Fixture {
            file: DataSource::Path(path.to_string_lossy().into_owned()),
            _dir: dir,
        }
    }

    fn session(loader: FakeLoader) -> ConversionSession<FakeLoader, MemorySink, StatusPanel> {
        ConversionSession::new(loader, MemorySink::default(), StatusPanel::new())
    }

    #[tokio::test]
    async fn convert_ply_with_defaults() {
        let fixture = scene_file("bonsai.ply", b"ply data");
        let session = session(FakeLoader::default());
        assert!(!session.is_in_progress());

        let outcome = session
            .convert(&ConvertForm::default(), Some(&fixture.file))
            .await;
        assert!(
            matches!(&outcome, ConvertOutcome::Converted(path) if path.ends_with(CONVERTED_FILE_NAME)),
            "unexpected outcome {outcome:?}"
        );

        let state = session.reporter().snapshot();
        assert_eq!(state.status, "Conversion complete!");
        assert_eq!(state.error, "");
        assert!(state.success_visible);
        assert!(!state.loading_visible);
        assert!(state.trigger_enabled);
        assert_eq!(
            state.status_history,
            vec!["Loading file...", "Parsing file...", "Conversion complete!"]
        );

        assert_eq!(session.stage(), ConvertStage::Done);
        assert!(!session.is_in_progress());

        let saved = session.sink.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, CONVERTED_FILE_NAME);
        assert_eq!(saved[0].1, FakeLoader::buffer_for(SceneFormat::Ply, b"ply data"));

        let calls = session.loader.calls();
        assert!(
            matches!(&calls[..], [LoadCall::Ply { out_sh_degree: 0, options, .. }]
                if options.compression_level == 1 && options.alpha_removal_threshold == 1),
            "unexpected calls {calls:?}"
        );
    }

    #[tokio::test]
    async fn invalid_form_rejected_without_io() {
        let fixture = scene_file("bonsai.ply", b"ply data");
        let session = session(FakeLoader::default());
        let form = ConvertForm {
            compression_level: "3".to_owned(),
            ..Default::default()
        };

        let outcome = session.convert(&form, Some(&fixture.file)).await;
        assert!(matches!(
            outcome,
            ConvertOutcome::Rejected(ParamError::CompressionLevel)
        ));

        let state = session.reporter().snapshot();
        assert_eq!(state.error, "Invalid compression level.");
        assert!(state.status_history.is_empty());
        assert!(session.loader.calls().is_empty());
        assert_eq!(session.stage(), ConvertStage::Idle);
        assert!(!session.is_in_progress());
    }

    #[tokio::test]
    async fn missing_file_is_checked_last() {
        let session = session(FakeLoader::default());

        let outcome = session.convert(&ConvertForm::default(), None).await;
        assert!(matches!(outcome, ConvertOutcome::Rejected(ParamError::MissingFile)));
        assert_eq!(
            session.reporter().snapshot().error,
            "Please choose a file to convert."
        );

        let form = ConvertForm {
            scene_center: "1,2,x".to_owned(),
            ..Default::default()
        };
        let outcome = session.convert(&form, None).await;
        assert!(matches!(outcome, ConvertOutcome::Rejected(ParamError::VectorComponent(_))));
        assert_eq!(session.reporter().snapshot().error, "Invalid scene center.");
    }

    #[tokio::test]
    async fn rejected_form_returns_to_idle() {
        let fixture = scene_file("bonsai.ply", b"ply data");
        let session = session(FakeLoader::default());

        let outcome = session
            .convert(&ConvertForm::default(), Some(&fixture.file))
            .await;
        assert!(matches!(outcome, ConvertOutcome::Converted(_)));
        assert_eq!(session.stage(), ConvertStage::Done);

        let form = ConvertForm {
            bucket_size: "1".to_owned(),
            ..Default::default()
        };
        let outcome = session.convert(&form, Some(&fixture.file)).await;
        assert!(matches!(outcome, ConvertOutcome::Rejected(ParamError::BucketSize)));
        assert_eq!(session.stage(), ConvertStage::Idle);
        assert_eq!(session.loader.calls().len(), 1);
    }

    #[tokio::test]
    async fn loader_failure_resets_state() {
        let fixture = scene_file("broken.splat", b"garbage");
        let session = session(FakeLoader::failing());

        let outcome = session
            .convert(&ConvertForm::default(), Some(&fixture.file))
            .await;
        assert!(matches!(outcome, ConvertOutcome::Failed));

        let state = session.reporter().snapshot();
        assert_eq!(state.error, "Could not convert file.");
        assert_eq!(state.status, "");
        assert!(!state.loading_visible);
        assert!(!state.success_visible);
        assert!(state.trigger_enabled);
        assert_eq!(session.stage(), ConvertStage::Error);
        assert!(!session.is_in_progress());
        assert!(session.sink.saved().is_empty());
    }

    #[tokio::test]
    async fn read_failure_resets_state() {
        let dir = tempfile::tempdir().unwrap();
        let missing = DataSource::Path(dir.path().join("gone.ply").to_string_lossy().into_owned());
        let session = session(FakeLoader::default());

        let outcome = session.convert(&ConvertForm::default(), Some(&missing)).await;
        assert!(matches!(outcome, ConvertOutcome::Failed));
        assert_eq!(session.reporter().snapshot().error, "Could not convert file.");
        assert!(session.loader.calls().is_empty());
        assert!(!session.is_in_progress());

        // The session is usable again afterwards.
        let fixture = scene_file("ok.ksplat", b"k");
        let outcome = session.convert(&ConvertForm::default(), Some(&fixture.file)).await;
        assert!(matches!(outcome, ConvertOutcome::Converted(_)));
    }

    #[tokio::test]
    async fn second_trigger_while_in_flight_is_ignored() {
        let fixture = scene_file("bonsai.ply", b"ply data");
        let session = session(FakeLoader::default());

        let form = ConvertForm::default();
        let (first, second) = tokio::join!(
            session.convert(&form, Some(&fixture.file)),
            async {
                // Let the first conversion get going.
                while !session.is_in_progress() {
                    tokio::task::yield_now().await;
                }
                assert!(!session.reporter().snapshot().trigger_enabled);
                session.convert(&ConvertForm::default(), Some(&fixture.file)).await
            }
        );

        assert!(matches!(first, ConvertOutcome::Converted(_)));
        assert!(matches!(second, ConvertOutcome::Busy));
        assert_eq!(session.loader.calls().len(), 1);
        assert_eq!(session.sink.saved().len(), 1);
        assert_eq!(
            session.reporter().snapshot().status_history,
            vec!["Loading file...", "Parsing file...", "Conversion complete!"]
        );
        assert!(!session.is_in_progress());
    }
}
