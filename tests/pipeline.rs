use approx::assert_abs_diff_eq;

use lcxlc_plots::data::model::{Channel, Series};
use lcxlc_plots::engine::{
    AcquisitionParameters, AxisMode, Dimensions, IntensityScale, axes, normalize,
    reconstruct_all, reconstruct_one, reconstruct_samples, roll_rows, shift,
};

#[test]
fn short_trace_is_padded_with_zeros() {
    let samples: Vec<f64> = (1..=3000).map(f64::from).collect();
    let (matrix, dims) = reconstruct_samples(&samples, 6.0, 0.5, 40.0 * 60.0).unwrap();

    assert_eq!(dims, Dimensions { dim_x: 12, dim_y: 1200 });
    assert_eq!(matrix.dim(), (12, 1200));
    assert_eq!(matrix.iter().filter(|&&v| v == 0.0).count(), 11_400);
    // Row-major fill: sample 1201 opens the second cycle.
    assert_eq!(matrix[[1, 0]], 1201.0);
    assert_eq!(matrix[[2, 599]], 3000.0);
    assert_eq!(matrix[[2, 600]], 0.0);
}

#[test]
fn long_trace_keeps_leading_samples_in_order() {
    let samples: Vec<f64> = (0..100).map(f64::from).collect();
    // 2.0 min / 0.5 min cycles at 10 samples/min → 4 × 5
    let (matrix, dims) = reconstruct_samples(&samples, 2.0, 0.5, 10.0).unwrap();
    assert_eq!(dims.required_samples(), 20);
    let flat: Vec<f64> = matrix.iter().copied().collect();
    assert_eq!(flat, samples[..20].to_vec());
}

#[test]
fn shift_then_unshift_is_identity() {
    let samples: Vec<f64> = (0..240).map(|i| (i as f64 * 0.37).sin()).collect();
    let (matrix, _) = reconstruct_samples(&samples, 1.0, 0.5, 240.0).unwrap();

    let forward = shift(&matrix, 0.75, 4.0).unwrap().into_owned();
    assert_ne!(forward, matrix);
    let back = roll_rows(&forward, -3);
    assert_eq!(*back, matrix);

    let unchanged = shift(&matrix, 0.0, 4.0).unwrap();
    assert_eq!(*unchanged, matrix);
}

#[test]
fn relative_scale_spans_zero_to_hundred() {
    let samples: Vec<f64> = (0..240).map(|i| 5.0 + (i as f64 * 0.11).cos()).collect();
    let (matrix, _) = reconstruct_samples(&samples, 1.0, 0.5, 240.0).unwrap();
    let scaled = normalize(&matrix, IntensityScale::Relative);

    let min = scaled.matrix.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scaled.matrix.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert_abs_diff_eq!(min, 0.0);
    assert_abs_diff_eq!(max, 100.0);
    assert!(!scaled.degenerate);
}

#[test]
fn axis_grid_for_an_hour_long_run() {
    let time: Vec<f64> = (0..=60).map(f64::from).collect();
    let grid = axes(&time, 5, 10, AxisMode::Centers).unwrap();

    assert_eq!(grid.first_dimension, vec![0.0, 15.0, 30.0, 45.0, 60.0]);
    let expected_y: Vec<f64> = (0..10).map(|t| t as f64 * 60.0).collect();
    assert_eq!(grid.second_dimension, expected_y);
    assert_eq!(grid.x.dim(), (5, 10));
    assert_eq!(grid.y[[3, 9]], 540.0);

    let edges = axes(&time, 5, 10, AxisMode::Edges).unwrap();
    assert_eq!(edges.x.dim(), (6, 11));
}

#[test]
fn every_wavelength_is_reconstructed_in_column_order() {
    let time: Vec<f64> = (0..=40).map(|i| i as f64 * 0.05).collect();
    let channels = ["210", "254", "280"]
        .iter()
        .enumerate()
        .map(|(k, label)| {
            Channel::new(*label, time.iter().map(|t| (k + 1) as f64 * t).collect())
        })
        .collect();
    let series = Series::new("RT.min", time, channels).unwrap();
    let params = AcquisitionParameters {
        sample_rate: 0.5,
        shift_time: 2.0,
        ..Default::default()
    };

    let labels: Vec<String> = reconstruct_all(&series, params, AxisMode::Centers)
        .map(|(label, result)| {
            let rec = result.unwrap();
            assert_eq!(rec.matrix.dim(), (4, 15));
            label
        })
        .collect();
    assert_eq!(labels, vec!["210", "254", "280"]);

    let single = reconstruct_one(&series, "254", &params, AxisMode::Centers).unwrap();
    assert_eq!(single.accounting.all, 41);
    assert_eq!(single.accounting.plotted, 60);
}

#[test]
fn absurd_sample_rate_is_a_parameter_error() {
    let time: Vec<f64> = (0..=60).map(|i| i as f64 * 0.1).collect();
    let series = Series::new("RT.min", time, vec![Channel::new("254", vec![1.0; 61])]).unwrap();
    let params = AcquisitionParameters {
        sample_rate: 1e17,
        ..Default::default()
    };
    assert!(matches!(
        reconstruct_one(&series, "254", &params, AxisMode::Centers),
        Err(lcxlc_plots::EngineError::InvalidParameter { .. })
    ));
}
