use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use lcxlc_plots::data::export::export_all;
use lcxlc_plots::data::model::{Channel, DEFAULT_TIME_LABEL, Series};

/// Run length, minutes.
const RUN_TIME: f64 = 20.0;
/// Second-dimension cycle, minutes.
const MODULATION_TIME: f64 = 0.5;
/// Detector rate, Hz.
const SAMPLE_RATE: f64 = 40.0;

/// A compound eluting at `t1` (min) in the first dimension and `t2` (s) in
/// the second, absorbing around `lambda` (nm).
struct Compound {
    t1: f64,
    sigma1: f64,
    t2: f64,
    sigma2: f64,
    lambda: f64,
    band: f64,
    amplitude: f64,
}

const COMPOUNDS: &[Compound] = &[
    Compound { t1: 3.0, sigma1: 0.6, t2: 6.0, sigma2: 0.8, lambda: 220.0, band: 25.0, amplitude: 120.0 },
    Compound { t1: 6.5, sigma1: 0.9, t2: 14.0, sigma2: 1.2, lambda: 254.0, band: 20.0, amplitude: 80.0 },
    Compound { t1: 9.0, sigma1: 0.5, t2: 21.0, sigma2: 0.7, lambda: 280.0, band: 15.0, amplitude: 60.0 },
    Compound { t1: 12.5, sigma1: 1.1, t2: 10.0, sigma2: 1.5, lambda: 320.0, band: 30.0, amplitude: 45.0 },
    Compound { t1: 16.0, sigma1: 0.7, t2: 25.0, sigma2: 0.9, lambda: 360.0, band: 25.0, amplitude: 70.0 },
];

fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Absorbance at run time `t` (min) and wavelength `lambda` (nm).
fn absorbance(t: f64, lambda: f64) -> f64 {
    let t2 = (t % MODULATION_TIME) * 60.0;
    // Second-dimension retention drifts slightly over the run.
    let drift = 0.1 * t;
    let baseline = 2.0 + 0.05 * t;
    COMPOUNDS
        .iter()
        .map(|c| {
            c.amplitude
                * gaussian(t, c.t1, c.sigma1)
                * gaussian(t2, c.t2 + drift, c.sigma2)
                * gaussian(lambda, c.lambda, c.band)
        })
        .sum::<f64>()
        + baseline
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn synthetic_run(rng: &mut SimpleRng) -> Result<Series> {
    let samples = (RUN_TIME * SAMPLE_RATE * 60.0) as usize;
    let time: Vec<f64> = (0..samples)
        .map(|i| i as f64 / (SAMPLE_RATE * 60.0))
        .collect();

    let channels = (200..=400)
        .step_by(20)
        .map(|nm| {
            let lambda = nm as f64;
            let absorbance = time
                .iter()
                .map(|&t| absorbance(t, lambda) + rng.gauss(0.0, 0.3))
                .collect();
            Channel::new(nm.to_string(), absorbance)
        })
        .collect();

    Ok(Series::new(DEFAULT_TIME_LABEL, time, channels)?)
}

fn to_record_batch(series: &Series) -> Result<RecordBatch> {
    let mut fields = vec![Field::new(&series.time_label, DataType::Float64, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(Float64Array::from(series.time.clone()))];
    for channel in &series.channels {
        fields.push(Field::new(&channel.label, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(channel.absorbance.clone())));
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let series = synthetic_run(&mut rng)?;
    let batch = to_record_batch(&series)?;

    export_all(&series, Path::new("sample_lcxlc.tsv"))?;
    write_parquet(&batch, Path::new("sample_lcxlc.parquet"))?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {series} to sample_lcxlc.tsv and sample_lcxlc.parquet \
         (modulation {MODULATION_TIME} min, {SAMPLE_RATE} Hz)"
    );
    Ok(())
}
