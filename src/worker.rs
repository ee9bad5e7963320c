//! Background jobs for the GUI.
//!
//! Loading, batch export and GIF assembly run on their own threads and report
//! back over an mpsc channel that the app drains every frame.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use eframe::egui;

use lcxlc_plots::animation::{DEFAULT_FRAME_DELAY_MS, create_animation};
use lcxlc_plots::data::loader::load_file;
use lcxlc_plots::data::model::Series;
use lcxlc_plots::engine::{
    AcquisitionParameters, BatchEvent, BatchListener, BatchSummary, CancelToken, run_batch,
};
use lcxlc_plots::render::PngRenderer;

/// Messages sent from worker threads to the UI.
pub enum WorkerMessage {
    Loaded { path: PathBuf, series: Series },
    BatchProgress { done: usize, total: usize },
    BatchFinished { dir: PathBuf, summary: BatchSummary },
    AnimationFinished(PathBuf),
    Failed(String),
}

/// Forwards batch progress to the UI thread.
struct ProgressListener {
    tx: Sender<WorkerMessage>,
    ctx: egui::Context,
}

impl BatchListener for ProgressListener {
    fn on_event(&mut self, event: BatchEvent<'_>) {
        let msg = match event {
            BatchEvent::Started { total } => WorkerMessage::BatchProgress { done: 0, total },
            BatchEvent::WavelengthDone { index, total, .. } => WorkerMessage::BatchProgress {
                done: index + 1,
                total,
            },
            BatchEvent::Cancelled { .. } => return,
        };
        let _ = self.tx.send(msg);
        self.ctx.request_repaint();
    }
}

fn send(tx: &Sender<WorkerMessage>, ctx: &egui::Context, msg: WorkerMessage) {
    let _ = tx.send(msg);
    ctx.request_repaint();
}

pub fn spawn_load(path: PathBuf, tx: Sender<WorkerMessage>, ctx: egui::Context) {
    thread::spawn(move || {
        let msg = match load_file(&path) {
            Ok(series) => {
                log::info!("Loaded {series} from {}", path.display());
                WorkerMessage::Loaded { path, series }
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                WorkerMessage::Failed(format!("Error: {e:#}"))
            }
        };
        send(&tx, &ctx, msg);
    });
}

pub fn spawn_batch(
    series: Arc<Series>,
    params: AcquisitionParameters,
    mut renderer: PngRenderer,
    cancel: CancelToken,
    tx: Sender<WorkerMessage>,
    ctx: egui::Context,
) {
    thread::spawn(move || {
        if let Err(e) = renderer.write_settings(params) {
            log::warn!("Could not write parameter sidecar: {e}");
        }

        let mut listener = ProgressListener {
            tx: tx.clone(),
            ctx: ctx.clone(),
        };
        let mode = renderer.mode.axis_mode();
        let msg = match run_batch(&series, &params, mode, &mut renderer, &mut listener, &cancel) {
            Ok(summary) => WorkerMessage::BatchFinished {
                dir: renderer.dir().to_path_buf(),
                summary,
            },
            Err(e) => {
                log::error!("Batch failed: {e}");
                WorkerMessage::Failed(format!("Error: {e}"))
            }
        };
        send(&tx, &ctx, msg);
    });
}

pub fn spawn_animation(dir: PathBuf, tx: Sender<WorkerMessage>, ctx: egui::Context) {
    thread::spawn(move || {
        let msg = match create_animation(&dir, DEFAULT_FRAME_DELAY_MS) {
            Ok(path) => WorkerMessage::AnimationFinished(path),
            Err(e) => {
                log::error!("Failed to create animation: {e:#}");
                WorkerMessage::Failed(format!("Error: {e:#}"))
            }
        };
        send(&tx, &ctx, msg);
    });
}
