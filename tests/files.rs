use std::fs;

use lcxlc_plots::animation::{ANIMATION_FILE, DEFAULT_FRAME_DELAY_MS, create_animation};
use lcxlc_plots::color::ColorMap;
use lcxlc_plots::data::export::{export_all, export_wavelength};
use lcxlc_plots::data::loader::load_file;
use lcxlc_plots::data::model::{Channel, Series};
use lcxlc_plots::engine::{
    AcquisitionParameters, BatchEvent, BatchListener, CancelToken, IntensityScale, NoOpListener,
    run_batch,
};
use lcxlc_plots::render::{FigureSize, PlotMode, PngRenderer, SETTINGS_FILE};

fn series() -> Series {
    let time: Vec<f64> = (0..=30).map(|i| i as f64 * 0.1).collect();
    let channels = [(210, 1.0), (254, 2.5), (280, 0.5)]
        .into_iter()
        .map(|(nm, gain)| {
            let values = time.iter().map(|t| gain * (t * 4.0).sin()).collect();
            Channel::new(nm.to_string(), values)
        })
        .collect();
    Series::new("RT.min", time, channels).unwrap()
}

fn params() -> AcquisitionParameters {
    // 3.0 min run, 0.5 min cycles, 0.2 Hz → 6 × 6
    AcquisitionParameters {
        sample_rate: 0.2,
        intensity_scale: IntensityScale::Relative,
        ..Default::default()
    }
}

fn renderer(dir: &std::path::Path) -> PngRenderer {
    PngRenderer::new(dir, ColorMap::Viridis)
        .with_mode(PlotMode::Pixmap)
        .with_size(FigureSize { width: 2, height: 1 })
}

fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn exported_series_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.tsv");
    let original = series();
    export_all(&original, &path).unwrap();

    let loaded = load_file(&path).unwrap();
    assert_eq!(loaded.time_label, "RT.min");
    assert_eq!(loaded.time, original.time);
    assert_eq!(loaded.column_labels(), original.column_labels());
    assert_eq!(loaded.channels[1].absorbance, original.channels[1].absorbance);
    assert_eq!(loaded.channels[2].wavelength_nm, Some(280.0));
}

#[test]
fn single_wavelength_export_has_one_row_per_sample() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("254.tsv");
    export_wavelength(&series(), "254", &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "RT\tDAD");
    assert_eq!(lines.len(), 1 + 31);
}

#[test]
fn batch_output_animates() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = renderer(dir.path());
    sink.write_settings(params()).unwrap();

    let summary = run_batch(
        &series(),
        &params(),
        PlotMode::Pixmap.axis_mode(),
        &mut sink,
        &mut NoOpListener,
        &CancelToken::new(),
    )
    .unwrap();
    assert!(summary.is_complete_success());
    assert_eq!(summary.rendered, vec!["210", "254", "280"]);

    let gif = create_animation(dir.path(), DEFAULT_FRAME_DELAY_MS).unwrap();
    assert!(gif.ends_with(ANIMATION_FILE));
    assert_eq!(
        file_names(dir.path()),
        vec!["210.png", "254.png", "280.png", ANIMATION_FILE, SETTINGS_FILE]
    );
}

struct StopAfter {
    token: CancelToken,
    after: usize,
}

impl BatchListener for StopAfter {
    fn on_event(&mut self, event: BatchEvent<'_>) {
        if let BatchEvent::WavelengthDone { index, .. } = event {
            if index + 1 == self.after {
                self.token.cancel();
            }
        }
    }
}

#[test]
fn cancelled_batch_leaves_only_finished_plots() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = renderer(dir.path());
    let token = CancelToken::new();
    let mut listener = StopAfter {
        token: token.clone(),
        after: 2,
    };

    let summary = run_batch(
        &series(),
        &params(),
        PlotMode::Pixmap.axis_mode(),
        &mut sink,
        &mut listener,
        &token,
    )
    .unwrap();

    assert!(summary.cancelled);
    assert_eq!(file_names(dir.path()), vec!["210.png", "254.png"]);
}
