use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::color::{ColorMap, MISSING};
use crate::engine::{
    AcquisitionParameters, AxisMode, ColorbarBounds, Matrix, Reconstruction, RenderSink,
};
use crate::error::{EngineError, Result};

/// Sidecar written next to batch output.
pub const SETTINGS_FILE: &str = "params.json";
/// Pixels per figure inch.
pub const DPI: u32 = 100;
const COLORBAR_GAP: u32 = 16;
const COLORBAR_WIDTH: u32 = 24;
const COLORBAR_MARGIN: u32 = 16;
const TICK_LENGTH: u32 = 6;
const LUT_SIZE: usize = 256;

// ---------------------------------------------------------------------------
// Plot options shared by the GUI and the PNG renderer
// ---------------------------------------------------------------------------

/// How cells are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlotMode {
    /// Smoothly interpolated filled image, axes on cell centres.
    #[default]
    Contour,
    /// One flat block per cell, axes on cell boundaries.
    Pixmap,
}

impl PlotMode {
    pub const ALL: [PlotMode; 2] = [PlotMode::Contour, PlotMode::Pixmap];

    pub fn axis_mode(self) -> AxisMode {
        match self {
            PlotMode::Contour => AxisMode::Centers,
            PlotMode::Pixmap => AxisMode::Edges,
        }
    }

    fn filter(self) -> FilterType {
        match self {
            PlotMode::Contour => FilterType::Triangle,
            PlotMode::Pixmap => FilterType::Nearest,
        }
    }
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotMode::Contour => write!(f, "Contour plot"),
            PlotMode::Pixmap => write!(f, "Pixmap"),
        }
    }
}

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self { width: 10, height: 5 }
    }
}

impl FigureSize {
    pub fn pixels(&self) -> (u32, u32) {
        (self.width * DPI, self.height * DPI)
    }
}

// ---------------------------------------------------------------------------
// Rasterization
// ---------------------------------------------------------------------------

/// One pixel per matrix cell: first dimension left → right, second
/// dimension bottom → top.
pub fn colorize(matrix: &Matrix, bounds: ColorbarBounds, colormap: ColorMap) -> RgbImage {
    let (dim_x, dim_y) = matrix.dim();
    let lut = colormap.lut(LUT_SIZE);
    RgbImage::from_fn(dim_x as u32, dim_y as u32, |x, y| {
        let v = matrix[[x as usize, dim_y - 1 - y as usize]];
        let c = if v.is_nan() {
            MISSING
        } else {
            lut[(bounds.fraction(v) * (LUT_SIZE - 1) as f64).round() as usize]
        };
        Rgb([c.red, c.green, c.blue])
    })
}

/// Vertical colour bar, maximum at the top, with optional tick marks.
fn draw_colorbar(
    canvas: &mut RgbImage,
    x0: u32,
    bounds: ColorbarBounds,
    colormap: ColorMap,
    ticks: Option<&[f64]>,
) {
    let height = canvas.height();
    if height < 2 {
        return;
    }
    for y in 0..height {
        let t = 1.0 - y as f64 / (height - 1) as f64;
        let c = colormap.sample(t);
        for x in x0..x0 + COLORBAR_WIDTH {
            canvas.put_pixel(x, y, Rgb([c.red, c.green, c.blue]));
        }
    }

    let range = bounds.max - bounds.min;
    if range <= 0.0 {
        return;
    }
    for &tick in ticks.unwrap_or_default() {
        if tick < bounds.min || tick > bounds.max {
            continue;
        }
        let y = ((1.0 - bounds.fraction(tick)) * (height - 1) as f64).round() as u32;
        for x in x0..x0 + TICK_LENGTH {
            canvas.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
}

/// Render a full figure: the scaled matrix plus an optional colour bar.
pub fn rasterize(
    reconstruction: &Reconstruction,
    colormap: ColorMap,
    mode: PlotMode,
    size: FigureSize,
    colorbar: bool,
) -> Result<RgbImage> {
    let (dim_x, dim_y) = reconstruction.matrix.dim();
    if dim_x == 0 || dim_y == 0 {
        return Err(EngineError::Render(format!(
            "{}: empty matrix",
            reconstruction.title()
        )));
    }

    let (width, height) = size.pixels();
    let bar_space = if colorbar {
        COLORBAR_GAP + COLORBAR_WIDTH + COLORBAR_MARGIN
    } else {
        0
    };
    let plot_width = width.checked_sub(bar_space).filter(|w| *w > 0).ok_or_else(|| {
        EngineError::Render(format!("figure {}×{} in is too small", size.width, size.height))
    })?;

    let cells = colorize(&reconstruction.matrix, reconstruction.bounds, colormap);
    let plot = imageops::resize(&cells, plot_width, height, mode.filter());

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for (x, y, px) in plot.enumerate_pixels() {
        canvas.put_pixel(x, y, *px);
    }
    if colorbar {
        draw_colorbar(
            &mut canvas,
            plot_width + COLORBAR_GAP,
            reconstruction.bounds,
            colormap,
            reconstruction.ticks(),
        );
    }
    Ok(canvas)
}

/// Write `image` next to `path` and move it into place, so `path` is either
/// the complete file or absent.
pub fn save_png_atomic(image: &RgbImage, path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| EngineError::Render(format!("invalid output path {}", path.display())))?;
    let tmp = path.with_file_name(format!(".{file_name}.part"));

    if let Err(e) = image.save_with_format(&tmp, ImageFormat::Png) {
        let _ = fs::remove_file(&tmp);
        return Err(EngineError::Render(format!("writing {}: {e}", path.display())));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PNG sink
// ---------------------------------------------------------------------------

/// Writes one `<label>.png` per reconstruction into a directory.
#[derive(Debug, Clone)]
pub struct PngRenderer {
    dir: PathBuf,
    pub colormap: ColorMap,
    pub mode: PlotMode,
    pub size: FigureSize,
    pub colorbar: bool,
}

impl PngRenderer {
    pub fn new(dir: impl Into<PathBuf>, colormap: ColorMap) -> Self {
        Self {
            dir: dir.into(),
            colormap,
            mode: PlotMode::default(),
            size: FigureSize::default(),
            colorbar: true,
        }
    }

    pub fn with_mode(mut self, mode: PlotMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_size(mut self, size: FigureSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_colorbar(mut self, colorbar: bool) -> Self {
        self.colorbar = colorbar;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn output_path(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.png"))
    }

    /// Render `reconstruction` to an explicit file path.
    pub fn write_png(&self, reconstruction: &Reconstruction, path: &Path) -> Result<()> {
        let image = rasterize(reconstruction, self.colormap, self.mode, self.size, self.colorbar)?;
        save_png_atomic(&image, path)
    }
}

/// Everything needed to reproduce a directory of plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub parameters: AcquisitionParameters,
    pub colormap: ColorMap,
    pub mode: PlotMode,
    pub size: FigureSize,
    pub colorbar: bool,
}

impl PngRenderer {
    pub fn settings(&self, parameters: AcquisitionParameters) -> RenderSettings {
        RenderSettings {
            parameters,
            colormap: self.colormap,
            mode: self.mode,
            size: self.size,
            colorbar: self.colorbar,
        }
    }

    /// Write `params.json` into the output directory.
    pub fn write_settings(&self, parameters: AcquisitionParameters) -> Result<PathBuf> {
        let path = self.dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(&self.settings(parameters))
            .map_err(|e| EngineError::Internal(e.to_string()))?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

impl RenderSink for PngRenderer {
    fn render(&mut self, reconstruction: &Reconstruction) -> Result<()> {
        let path = self.output_path(&reconstruction.label);
        self.write_png(reconstruction, &path)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}
