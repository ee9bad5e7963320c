use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};

use anyhow::{Context, Result};
use eframe::egui;

use lcxlc_plots::EngineError;
use lcxlc_plots::data::export::{export_all, export_wavelength};
use lcxlc_plots::engine::CancelToken;
use lcxlc_plots::render::{PlotMode, colorize};

use crate::state::{AppState, Busy, Tab};
use crate::ui::{Action, panels, plot, table};
use crate::worker::{self, WorkerMessage};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LcxlcApp {
    pub state: AppState,
    texture: Option<egui::TextureHandle>,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
}

impl Default for LcxlcApp {
    fn default() -> Self {
        let (tx, rx) = channel();
        Self {
            state: AppState::default(),
            texture: None,
            tx,
            rx,
        }
    }
}

impl LcxlcApp {
    /// Drain messages from worker threads.
    fn handle_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            let state = &mut self.state;
            match msg {
                WorkerMessage::Loaded { path, series } => {
                    state.set_series(path, series);
                }
                WorkerMessage::BatchProgress { done, total } => {
                    state.busy = Some(Busy::Batch { done, total });
                }
                WorkerMessage::BatchFinished { dir, summary } => {
                    state.info_message = Some(if summary.cancelled {
                        format!("{}: {summary}", EngineError::Cancelled)
                    } else {
                        format!("{}: {summary}", dir.display())
                    });
                    if let Some((label, e)) = summary.failed.first() {
                        state.status_message = Some(format!("{label} nm: {e}"));
                    }
                    state.plot_dir = Some(dir);
                    state.busy = None;
                    state.cancel = None;
                }
                WorkerMessage::AnimationFinished(path) => {
                    state.info_message = Some(format!("Wrote {}", path.display()));
                    state.busy = None;
                }
                WorkerMessage::Failed(msg) => {
                    state.status_message = Some(msg);
                    state.busy = None;
                    state.cancel = None;
                }
            }
        }
    }

    fn dispatch(&mut self, action: Action, ctx: &egui::Context) {
        let state = &mut self.state;
        match action {
            Action::Open(path) => {
                state.busy = Some(Busy::Loading);
                state.status_message = None;
                worker::spawn_load(path, self.tx.clone(), ctx.clone());
            }
            Action::ExportWavelength(path) => {
                let result = export_selected(state, &path);
                state.report(result);
            }
            Action::ExportAll(path) => {
                let result = match &state.series {
                    Some(series) => export_all(series, &path),
                    None => Err(anyhow::anyhow!("no data loaded")),
                };
                if state.report(result).is_some() {
                    state.info_message = Some(format!("Exported {}", path.display()));
                }
            }
            Action::SaveCurrent(path) => {
                let result = save_current(state, &path);
                if state.report(result).is_some() {
                    state.info_message = Some(format!("Saved {}", path.display()));
                }
            }
            Action::SaveAll(dir) => {
                let Some(series) = state.series.clone() else {
                    return;
                };
                let Some(params) = state.report(state.parameters()) else {
                    return;
                };
                let cancel = CancelToken::new();
                state.cancel = Some(cancel.clone());
                state.busy = Some(Busy::Batch { done: 0, total: series.channels.len() });
                let renderer = state.renderer(dir);
                worker::spawn_batch(series, params, renderer, cancel, self.tx.clone(), ctx.clone());
            }
            Action::CreateGif(dir) => {
                state.busy = Some(Busy::Animation);
                worker::spawn_animation(dir, self.tx.clone(), ctx.clone());
            }
            Action::Cancel => {
                if let Some(cancel) = &state.cancel {
                    cancel.cancel();
                }
            }
        }
    }

    /// Rebuild the plot texture after a redraw or colour-map change.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if !self.state.texture_dirty {
            return;
        }
        self.state.texture_dirty = false;
        self.texture = self.state.current.as_ref().map(|rec| {
            let img = colorize(&rec.matrix, rec.bounds, self.state.options.colormap);
            let size = [img.width() as usize, img.height() as usize];
            let image = egui::ColorImage::from_rgb(size, img.as_raw());
            let options = match self.state.options.plot_mode {
                PlotMode::Contour => egui::TextureOptions::LINEAR,
                PlotMode::Pixmap => egui::TextureOptions::NEAREST,
            };
            ctx.load_texture("matrix", image, options)
        });
    }
}

fn export_selected(state: &AppState, path: &std::path::Path) -> Result<()> {
    let series = state.series.as_ref().context("no data loaded")?;
    let label = state.selected.as_deref().context("no wavelength selected")?;
    export_wavelength(series, label, path)
}

fn save_current(state: &AppState, path: &std::path::Path) -> Result<()> {
    let rec = state.current.as_ref().context("nothing drawn yet")?;
    let dir = path.parent().map(PathBuf::from).unwrap_or_default();
    state.renderer(dir).write_png(rec, path)?;
    Ok(())
}

impl eframe::App for LcxlcApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_messages();

        // ---- Top panel: menu bar and tabs ----
        let mut action = None;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            action = panels::top_bar(ui, &mut self.state);
        });

        match self.state.tab {
            Tab::Data => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    table::data_table(ui, &self.state);
                });
            }
            Tab::Plots => {
                // ---- Left side panel: parameters ----
                egui::SidePanel::left("plot_controls")
                    .default_width(260.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        if let Some(a) = panels::plot_controls(ui, &mut self.state) {
                            action = Some(a);
                        }
                    });

                self.refresh_texture(ctx);

                // ---- Central panel: 2D plot ----
                egui::CentralPanel::default().show(ctx, |ui| {
                    plot::matrix_plot(ui, &self.state, self.texture.as_ref());
                });
            }
        }

        if let Some(action) = action {
            self.dispatch(action, ctx);
        }
    }
}
