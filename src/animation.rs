use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame};

use crate::data::model::parse_wavelength;

/// Name of the animation written into the plot directory.
pub const ANIMATION_FILE: &str = "all_plots.gif";
/// Time each wavelength stays on screen.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 500;

/// PNG files of `dir`, ordered by wavelength (numeric file stem), then name.
pub fn plot_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"))
        })
        .collect();

    let key = |p: &PathBuf| {
        let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        (parse_wavelength(stem).unwrap_or(f64::INFINITY), stem.to_string())
    };
    files.sort_by(|a, b| {
        let (wa, na) = key(a);
        let (wb, nb) = key(b);
        wa.total_cmp(&wb).then(na.cmp(&nb))
    });
    Ok(files)
}

/// Assemble every PNG in `dir` into `dir/all_plots.gif`, one frame per file.
/// Frames whose size differs from the first are resized to match.
pub fn create_animation(dir: &Path, frame_delay_ms: u32) -> Result<PathBuf> {
    let files = plot_files(dir)?;
    if files.is_empty() {
        bail!("no .png plots found in {}", dir.display());
    }

    let out = dir.join(ANIMATION_FILE);
    let tmp = dir.join(format!(".{ANIMATION_FILE}.part"));

    let result = write_gif(&files, &tmp, frame_delay_ms);
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, &out) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("moving animation to {}", out.display()));
    }

    log::info!("Wrote {} frames to {}", files.len(), out.display());
    Ok(out)
}

fn write_gif(files: &[PathBuf], path: &Path, frame_delay_ms: u32) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;

    let mut frame_size = None;
    for p in files {
        let mut img = image::open(p)
            .with_context(|| format!("reading {}", p.display()))?
            .to_rgba8();

        let (w, h) = *frame_size.get_or_insert(img.dimensions());
        if img.dimensions() != (w, h) {
            img = imageops::resize(&img, w, h, FilterType::Triangle);
        }

        let delay = Delay::from_numer_denom_ms(frame_delay_ms, 1);
        encoder
            .encode_frame(Frame::from_parts(img, 0, 0, delay))
            .with_context(|| format!("encoding frame {}", p.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, size: (u32, u32)) {
        RgbImage::from_pixel(size.0, size.1, Rgb([10, 20, 30]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn files_sort_by_wavelength() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["254.png", "1000.png", "90.png", "notes.txt", "overview.png"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let names: Vec<String> = plot_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["90.png", "254.png", "1000.png", "overview.png"]);
    }

    #[test]
    fn gif_contains_one_frame_per_plot() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "210.png", (8, 4));
        write_png(dir.path(), "254.png", (8, 4));
        write_png(dir.path(), "280.png", (6, 3));

        let out = create_animation(dir.path(), DEFAULT_FRAME_DELAY_MS).unwrap();
        assert_eq!(out, dir.path().join(ANIMATION_FILE));

        let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(
            File::open(&out).unwrap(),
        ))
        .unwrap();
        use image::AnimationDecoder;
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].buffer().dimensions(), (8, 4));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create_animation(dir.path(), DEFAULT_FRAME_DELAY_MS).is_err());
        assert!(!dir.path().join(ANIMATION_FILE).exists());
    }
}
