use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use lcxlc_plots::color::ColorMap;
use lcxlc_plots::data::model::Series;
use lcxlc_plots::engine::{
    AcquisitionParameters, CancelToken, ColorbarLimits, IntensityScale, Reconstruction,
    reconstruct_one,
};
use lcxlc_plots::render::{FigureSize, PlotMode, PngRenderer};

/// Rows shown in the data preview.
pub const PREVIEW_ROWS: usize = 500;

// ---------------------------------------------------------------------------
// User-editable inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Data,
    Plots,
}

/// Raw text of the numeric fields, parsed when a plot is drawn.
#[derive(Debug, Clone)]
pub struct ParameterInputs {
    pub modulation_time: String,
    pub sample_rate: String,
    pub shift_time: String,
    pub bar_min: String,
    pub bar_max: String,
}

impl Default for ParameterInputs {
    fn default() -> Self {
        let defaults = AcquisitionParameters::default();
        Self {
            modulation_time: defaults.modulation_time.to_string(),
            sample_rate: defaults.sample_rate.to_string(),
            shift_time: format!("{:.1}", defaults.shift_time),
            bar_min: String::new(),
            bar_max: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotOptions {
    pub colormap: ColorMap,
    pub plot_mode: PlotMode,
    pub intensity_scale: IntensityScale,
    pub figure: FigureSize,
    pub show_title: bool,
    pub show_colorbar: bool,
    /// Keep the colour-bar fields as typed instead of filling them from data.
    pub fixed_colorbar: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            colormap: ColorMap::default(),
            plot_mode: PlotMode::default(),
            intensity_scale: IntensityScale::default(),
            figure: FigureSize::default(),
            show_title: true,
            show_colorbar: true,
            fixed_colorbar: false,
        }
    }
}

/// Long-running job currently owned by a worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Busy {
    Loading,
    Batch { done: usize, total: usize },
    Animation,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub tab: Tab,

    /// Loaded series (None until user loads a file).
    pub series: Option<Arc<Series>>,
    pub source: Option<PathBuf>,

    /// Wavelength label shown in the Plots tab.
    pub selected: Option<String>,

    pub inputs: ParameterInputs,
    pub options: PlotOptions,

    /// Last drawn wavelength.
    pub current: Option<Reconstruction>,
    /// `current` changed and the texture must be rebuilt.
    pub texture_dirty: bool,

    /// Directory of the last batch export; default target for the GIF.
    pub plot_dir: Option<PathBuf>,

    pub busy: Option<Busy>,
    pub cancel: Option<CancelToken>,

    /// Error shown in red.
    pub status_message: Option<String>,
    /// Neutral feedback (export done, batch summary…).
    pub info_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded series and select its first wavelength.
    pub fn set_series(&mut self, path: PathBuf, series: Series) {
        self.selected = series.channels.first().map(|c| c.label.clone());
        self.info_message = Some(format!("{}: {series}", path.display()));
        self.series = Some(Arc::new(series));
        self.source = Some(path);
        self.current = None;
        self.texture_dirty = true;
        self.status_message = None;
        self.busy = None;
    }

    /// Parse the text fields into engine parameters.
    pub fn parameters(&self) -> Result<AcquisitionParameters> {
        let colorbar = if self.options.fixed_colorbar {
            ColorbarLimits {
                min: parse_optional("colorbar min", &self.inputs.bar_min)?,
                max: parse_optional("colorbar max", &self.inputs.bar_max)?,
            }
        } else {
            ColorbarLimits::default()
        };

        Ok(AcquisitionParameters {
            modulation_time: parse_field("modulation time", &self.inputs.modulation_time)?,
            sample_rate: parse_field("sample rate", &self.inputs.sample_rate)?,
            shift_time: parse_field("shift", &self.inputs.shift_time)?,
            intensity_scale: self.options.intensity_scale,
            colorbar,
        })
    }

    /// Reconstruct the selected wavelength with the current inputs.
    pub fn draw(&mut self) -> Result<()> {
        let series = self.series.as_ref().context("no data loaded")?;
        let label = self.selected.as_deref().context("no wavelength selected")?;
        let params = self.parameters()?;

        let rec = reconstruct_one(series, label, &params, self.options.plot_mode.axis_mode())?;
        if !self.options.fixed_colorbar {
            self.inputs.bar_min = format!("{:.2}", rec.bounds.min);
            self.inputs.bar_max = format!("{:.2}", rec.bounds.max);
        }
        self.info_message = Some(rec.accounting.to_string());
        self.current = Some(rec);
        self.texture_dirty = true;
        Ok(())
    }

    /// Redraw after a parameter edit, but only once a plot is on screen.
    pub fn redraw(&mut self) {
        if self.current.is_some() && self.busy.is_none() {
            let result = self.draw();
            self.report(result);
        }
    }

    /// Switch wavelength. Auto colour-bar limits belong to the old one.
    pub fn select_wavelength(&mut self, label: String) {
        if !self.options.fixed_colorbar {
            self.inputs.bar_min.clear();
            self.inputs.bar_max.clear();
        }
        self.selected = Some(label);
    }

    /// PNG renderer configured from the current plot options.
    pub fn renderer(&self, dir: PathBuf) -> PngRenderer {
        PngRenderer::new(dir, self.options.colormap)
            .with_mode(self.options.plot_mode)
            .with_size(self.options.figure)
            .with_colorbar(self.options.show_colorbar)
    }

    pub fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => {
                self.status_message = None;
                Some(v)
            }
            Err(e) => {
                log::error!("{e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                None
            }
        }
    }
}

fn parse_field(name: &str, text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .with_context(|| format!("{name}: '{text}' is not a number"))
}

fn parse_optional(name: &str, text: &str) -> Result<Option<f64>> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_field(name, text).map(Some)
    }
}
