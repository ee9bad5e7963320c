use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::data::model::Series;
use crate::error::{EngineError, Result};

use super::axis::{AxisGrid, AxisMode, axes};
use super::normalize::{normalize, resolve_bounds};
use super::params::{AcquisitionParameters, ColorbarBounds, IntensityScale};
use super::reconstruct::{Dimensions, reconstruct};
use super::shift::shift;
use super::Matrix;

// ---------------------------------------------------------------------------
// Per-wavelength result
// ---------------------------------------------------------------------------

/// How many samples the reconstruction used compared to what was recorded,
/// so a user can tell whether sample rate and modulation time fit together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointAccounting {
    pub dim_x: usize,
    pub dim_y: usize,
    /// Cells in the matrix.
    pub plotted: usize,
    /// Samples in the series.
    pub all: usize,
    /// `|plotted - all|`
    pub difference: usize,
}

impl PointAccounting {
    pub fn new(dims: Dimensions, all: usize) -> Self {
        let plotted = dims.required_samples();
        Self {
            dim_x: dims.dim_x,
            dim_y: dims.dim_y,
            plotted,
            all,
            difference: plotted.abs_diff(all),
        }
    }
}

impl fmt::Display for PointAccounting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data points:  1st dim: {}   2nd dim: {}   plotted: {}   all: {}   difference: {}",
            self.dim_x, self.dim_y, self.plotted, self.all, self.difference
        )
    }
}

/// Everything a renderer needs for one wavelength.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub label: String,
    pub wavelength_nm: Option<f64>,
    /// Shifted and normalized matrix.
    pub matrix: Matrix,
    pub axes: AxisGrid,
    pub bounds: ColorbarBounds,
    pub scale: IntensityScale,
    /// Relative scaling hit a flat signal; `matrix` is all zeros.
    pub degenerate: bool,
    pub accounting: PointAccounting,
}

impl Reconstruction {
    /// Plot title, e.g. `"254 nm"`.
    pub fn title(&self) -> String {
        format!("{} nm", self.label)
    }

    /// Colour-bar ticks implied by the intensity scale.
    pub fn ticks(&self) -> Option<&'static [f64]> {
        self.scale.ticks()
    }
}

/// Run reconstruct → shift → normalize and the axis calculation for one
/// wavelength.
pub fn reconstruct_one(
    series: &Series,
    label: &str,
    params: &AcquisitionParameters,
    mode: AxisMode,
) -> Result<Reconstruction> {
    params.validate()?;

    let (raw, dims) = reconstruct(series, label, params.modulation_time, params.samples_per_minute())?;
    let shifted = shift(&raw, params.shift_time, params.sample_rate)?;
    let normalized = normalize(&shifted, params.intensity_scale);
    if normalized.degenerate {
        let reason = EngineError::DegenerateSignal {
            label: label.to_string(),
        };
        log::warn!("{reason}, showing zeros");
    }

    let axes = axes(&series.time, dims.dim_x, dims.dim_y, mode)?;
    let bounds = resolve_bounds(params.colorbar, &normalized.matrix);
    let accounting = PointAccounting::new(dims, series.len());
    log::debug!("{label} nm: {accounting}");

    Ok(Reconstruction {
        label: label.to_string(),
        wavelength_nm: series.channel(label).and_then(|c| c.wavelength_nm),
        degenerate: normalized.degenerate,
        matrix: normalized.matrix.into_owned(),
        axes,
        bounds,
        scale: params.intensity_scale,
        accounting,
    })
}

// ---------------------------------------------------------------------------
// Lazy stream over all wavelengths
// ---------------------------------------------------------------------------

/// Lazily reconstructs every wavelength of a series in column order. Each
/// item is produced on demand; an error for one wavelength does not end the
/// stream.
pub struct ReconstructionStream<'a> {
    series: &'a Series,
    params: AcquisitionParameters,
    mode: AxisMode,
    next: usize,
}

impl Iterator for ReconstructionStream<'_> {
    type Item = (String, Result<Reconstruction>);

    fn next(&mut self) -> Option<Self::Item> {
        let channel = self.series.channels.get(self.next)?;
        self.next += 1;
        let result = reconstruct_one(self.series, &channel.label, &self.params, self.mode);
        Some((channel.label.clone(), result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.series.channels.len() - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ReconstructionStream<'_> {}

pub fn reconstruct_all(
    series: &Series,
    params: AcquisitionParameters,
    mode: AxisMode,
) -> ReconstructionStream<'_> {
    ReconstructionStream {
        series,
        params,
        mode,
        next: 0,
    }
}

// ---------------------------------------------------------------------------
// Batch driver
// ---------------------------------------------------------------------------

/// Shared flag a caller sets to stop a running batch between wavelengths.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receives each finished reconstruction (e.g. writes an image file).
/// A render must be atomic: either the artifact is complete or absent.
pub trait RenderSink {
    fn render(&mut self, reconstruction: &Reconstruction) -> Result<()>;
}

/// Events emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started { total: usize },
    /// One wavelength is done, successfully or not.
    WavelengthDone {
        index: usize,
        total: usize,
        label: &'a str,
        ok: bool,
    },
    Cancelled { completed: usize },
}

/// Trait for observing a batch. Implement this for progress UI.
pub trait BatchListener {
    fn on_event(&mut self, event: BatchEvent<'_>);
}

/// No-op listener.
pub struct NoOpListener;

impl BatchListener for NoOpListener {
    #[inline(always)]
    fn on_event(&mut self, _event: BatchEvent<'_>) {}
}

/// Per-wavelength outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Wavelengths handed to the sink successfully.
    pub rendered: Vec<String>,
    /// Rendered, but with an all-zero matrix (flat signal under relative scale).
    pub degenerate: Vec<String>,
    pub failed: Vec<(String, EngineError)>,
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rendered", self.rendered.len())?;
        if !self.degenerate.is_empty() {
            write!(f, ", {} flat ({})", self.degenerate.len(), self.degenerate.join(", "))?;
        }
        if !self.failed.is_empty() {
            let labels: Vec<&str> = self.failed.iter().map(|(l, _)| l.as_str()).collect();
            write!(f, ", {} failed ({})", self.failed.len(), labels.join(", "))?;
        }
        if self.cancelled {
            write!(f, ", cancelled")?;
        }
        Ok(())
    }
}

/// Reconstruct every wavelength and hand each result to `sink`.
///
/// Parameter errors abort before any work is done. Afterwards failures are
/// recorded per wavelength and the batch moves on; the matrix of a wavelength
/// is dropped before the next one is computed. `cancel` is checked before
/// each wavelength.
pub fn run_batch<S, L>(
    series: &Series,
    params: &AcquisitionParameters,
    mode: AxisMode,
    sink: &mut S,
    listener: &mut L,
    cancel: &CancelToken,
) -> Result<BatchSummary>
where
    S: RenderSink + ?Sized,
    L: BatchListener + ?Sized,
{
    params.validate()?;

    let mut stream = reconstruct_all(series, *params, mode).enumerate();
    let total = stream.len();
    let mut summary = BatchSummary::default();
    listener.on_event(BatchEvent::Started { total });

    loop {
        // Checked before the next wavelength is reconstructed.
        if cancel.is_cancelled() && stream.len() > 0 {
            let completed = total - stream.len();
            summary.cancelled = true;
            listener.on_event(BatchEvent::Cancelled { completed });
            log::info!("Batch cancelled after {completed} of {total} wavelengths");
            break;
        }
        let Some((index, (label, result))) = stream.next() else {
            break;
        };

        let outcome = result.and_then(|rec| {
            sink.render(&rec)?;
            Ok(rec.degenerate)
        });

        let ok = outcome.is_ok();
        match outcome {
            Ok(degenerate) => {
                if degenerate {
                    summary.degenerate.push(label.clone());
                }
                summary.rendered.push(label.clone());
            }
            Err(e) => {
                log::warn!("{label} nm skipped: {e}");
                summary.failed.push((label.clone(), e));
            }
        }
        listener.on_event(BatchEvent::WavelengthDone {
            index,
            total,
            label: &label,
            ok,
        });
    }

    log::info!("Batch finished: {summary}");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Channel;

    fn series() -> Series {
        let time: Vec<f64> = (0..=20).map(|i| i as f64 * 0.1).collect();
        let ramp: Vec<f64> = (0..21).map(f64::from).collect();
        Series::new(
            "RT.min",
            time,
            vec![
                Channel::new("210", ramp),
                Channel::new("254", vec![3.0; 21]),
                Channel::new("280", vec![f64::NAN; 21]),
            ],
        )
        .unwrap()
    }

    fn params() -> AcquisitionParameters {
        // 2.0 min run, 0.5 min cycles, 0.1 Hz → 4 × 3
        AcquisitionParameters {
            modulation_time: 0.5,
            sample_rate: 0.1,
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct Collect(Vec<String>);

    impl RenderSink for Collect {
        fn render(&mut self, rec: &Reconstruction) -> Result<()> {
            self.0.push(rec.label.clone());
            Ok(())
        }
    }

    #[test]
    fn single_wavelength_pipeline() {
        let rec = reconstruct_one(&series(), "210", &params(), AxisMode::Centers).unwrap();
        assert_eq!(rec.matrix.dim(), (4, 3));
        assert_eq!(rec.axes.x.dim(), (4, 3));
        assert_eq!(rec.accounting.plotted, 12);
        assert_eq!(rec.accounting.difference, 9);
        assert_eq!(rec.bounds, ColorbarBounds { min: 0.0, max: 11.0 });
        assert_eq!(rec.title(), "210 nm");
        assert_eq!(rec.wavelength_nm, Some(210.0));
    }

    #[test]
    fn stream_is_lazy_and_ordered() {
        let s = series();
        let mut stream = reconstruct_all(&s, params(), AxisMode::Edges);
        assert_eq!(stream.len(), 3);
        let (first, result) = stream.next().unwrap();
        assert_eq!(first, "210");
        assert_eq!(result.unwrap().axes.x.dim(), (5, 4));
        assert_eq!(stream.len(), 2);
        let labels: Vec<String> = stream.map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["254", "280"]);
    }

    #[test]
    fn batch_isolates_failures() {
        let mut p = params();
        p.intensity_scale = IntensityScale::Relative;
        let mut sink = Collect::default();
        let summary = run_batch(
            &series(),
            &p,
            AxisMode::Centers,
            &mut sink,
            &mut NoOpListener,
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(sink.0, vec!["210", "254"]);
        assert_eq!(summary.rendered, vec!["210", "254"]);
        assert_eq!(summary.degenerate, vec!["254"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "280");
        assert!(matches!(summary.failed[0].1, EngineError::InsufficientData { .. }));
        assert!(!summary.is_complete_success());
    }

    #[test]
    fn invalid_parameters_abort_the_batch() {
        let p = AcquisitionParameters {
            sample_rate: 0.0,
            ..Default::default()
        };
        let mut sink = Collect::default();
        let result = run_batch(
            &series(),
            &p,
            AxisMode::Centers,
            &mut sink,
            &mut NoOpListener,
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(EngineError::InvalidParameter { .. })));
        assert!(sink.0.is_empty());
    }

    struct CancelAfterFirst(CancelToken);

    impl BatchListener for CancelAfterFirst {
        fn on_event(&mut self, event: BatchEvent<'_>) {
            if let BatchEvent::WavelengthDone { index: 0, .. } = event {
                self.0.cancel();
            }
        }
    }

    #[derive(Default)]
    struct Record(Vec<String>);

    impl BatchListener for Record {
        fn on_event(&mut self, event: BatchEvent<'_>) {
            self.0.push(format!("{event:?}"));
        }
    }

    #[test]
    fn token_cancelled_up_front_renders_nothing() {
        let token = CancelToken::new();
        token.cancel();
        let mut listener = Record::default();
        let mut sink = Collect::default();
        let summary = run_batch(
            &series(),
            &params(),
            AxisMode::Centers,
            &mut sink,
            &mut listener,
            &token,
        )
        .unwrap();

        assert!(summary.cancelled);
        assert!(summary.rendered.is_empty());
        assert!(sink.0.is_empty());
        assert_eq!(
            listener.0,
            vec!["Started { total: 3 }", "Cancelled { completed: 0 }"]
        );
    }

    #[test]
    fn cancellation_stops_between_wavelengths() {
        let token = CancelToken::new();
        let mut listener = CancelAfterFirst(token.clone());
        let mut sink = Collect::default();
        let summary = run_batch(
            &series(),
            &params(),
            AxisMode::Centers,
            &mut sink,
            &mut listener,
            &token,
        )
        .unwrap();
        assert!(summary.cancelled);
        assert_eq!(sink.0, vec!["210"]);
    }
}
