use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center, translate};
use imageproc::noise::gaussian_noise;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The closed transform catalog. One of these is picked uniformly at random
/// for each augmented replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Rotation by up to 25 degrees either way
    Rotate,
    /// Additive gaussian pixel noise
    Noise,
    /// Shift by up to 5 pixels per axis
    Translate,
    /// Horizontal sine-wave row shear
    Warp,
}

pub const CATALOG: [Transform; 4] = [
    Transform::Rotate,
    Transform::Noise,
    Transform::Translate,
    Transform::Warp,
];

impl Transform {
    pub fn random(rng: &mut StdRng) -> Self {
        *CATALOG.choose(rng).expect("catalog is non-empty")
    }

    /// Apply the transform. `fill` colors pixels rotated in from outside the
    /// frame so they match the cell background.
    pub fn apply(self, image: &RgbImage, fill: Rgb<u8>, rng: &mut StdRng) -> RgbImage {
        match self {
            Transform::Rotate => {
                let degrees = rng.gen_range(-25.0f32..=25.0);
                rotate_about_center(image, degrees.to_radians(), Interpolation::Bilinear, fill)
            }
            Transform::Noise => gaussian_noise(image, 0.0, 25.0, rng.r#gen()),
            Transform::Translate => {
                translate(image, (rng.gen_range(-5..=5), rng.gen_range(-5..=5)))
            }
            Transform::Warp => sine_warp(image, rng),
        }
    }
}

/// Shift each pixel row horizontally along a sine wave, wrapping at the
/// edges. Amplitude is a fraction of the width, frequency a fraction of the
/// height, both randomized per call.
fn sine_warp(image: &RgbImage, rng: &mut StdRng) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let amplitude = image.width() as f32 / rng.gen_range(4..=8) as f32;
    let frequency = rng.gen_range(-1.0f32..=1.0) / height as f32;

    let mut warped = image.clone();
    for y in 0..height {
        let shift = (amplitude * (2.0 * PI * y as f32 * frequency).sin()).ceil() as i64;
        for x in 0..width {
            let src_x = (x as i64 - shift).rem_euclid(width as i64) as u32;
            warped.put_pixel(x, y, *image.get_pixel(src_x, y));
        }
    }

    warped
}

/// Standalone augmentation pass over an existing image directory.
///
/// Picks `limit` random source images (defaulting to one pass over the
/// inputs), applies one random transform to each, and writes the results as
/// `augmented_image_<i>.png`. Unless `ignore_label` is set, each output keeps
/// its source's parent directory name as a class-label subdirectory.
pub fn augment_directory(
    input: &Path,
    output: &Path,
    recurse: bool,
    limit: Option<u64>,
    ignore_label: bool,
    ext: &str,
    rng: &mut StdRng,
) -> Result<u64> {
    let sources = collect_images(input, recurse, ext)?;
    if sources.is_empty() {
        anyhow::bail!("no .{ext} images found in {}", input.display());
    }

    let limit = limit.unwrap_or(sources.len() as u64);

    for i in 0..limit {
        let source = sources.choose(rng).expect("sources is non-empty");
        let image = image::open(source)
            .with_context(|| format!("failed to decode {}", source.display()))?
            .to_rgb8();

        let transform = Transform::random(rng);
        let transformed = transform.apply(&image, Rgb([246, 246, 246]), rng);

        let mut out_dir = output.to_path_buf();
        if !ignore_label {
            if let Some(label) = source.parent().and_then(|p| p.file_name()) {
                out_dir = out_dir.join(label);
            }
        }
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;

        let out_path = out_dir.join(format!("augmented_image_{i}.png"));
        transformed
            .save(&out_path)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
    }

    Ok(limit)
}

fn collect_images(input: &Path, recurse: bool, ext: &str) -> Result<Vec<PathBuf>> {
    if recurse {
        Ok(WalkDir::new(input)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(ext))
            .collect())
    } else {
        Ok(std::fs::read_dir(input)
            .with_context(|| format!("failed to read directory {}", input.display()))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(ext))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn checkerboard(side: u32) -> RgbImage {
        RgbImage::from_fn(side, side, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn random_covers_the_whole_catalog() {
        let mut rng = StdRng::seed_from_u64(3);
        let seen: HashSet<_> = (0..200).map(|_| Transform::random(&mut rng)).collect();
        assert_eq!(seen.len(), CATALOG.len());
    }

    #[test]
    fn transforms_preserve_dimensions() {
        let image = checkerboard(32);
        let mut rng = StdRng::seed_from_u64(9);
        for transform in CATALOG {
            let out = transform.apply(&image, Rgb([246, 246, 246]), &mut rng);
            assert_eq!(out.dimensions(), image.dimensions(), "{transform:?}");
        }
    }

    #[test]
    fn equal_seeds_reproduce_output() {
        let image = checkerboard(16);
        for transform in CATALOG {
            let mut a = StdRng::seed_from_u64(11);
            let mut b = StdRng::seed_from_u64(11);
            assert_eq!(
                transform.apply(&image, Rgb([246, 246, 246]), &mut a),
                transform.apply(&image, Rgb([246, 246, 246]), &mut b),
                "{transform:?}"
            );
        }
    }

    #[test]
    fn warp_permutes_rows_without_inventing_pixels() {
        let image = checkerboard(16);
        let mut rng = StdRng::seed_from_u64(5);
        let warped = sine_warp(&image, &mut rng);

        // Wrapping row shifts keep each row's multiset of pixels intact.
        for y in 0..16 {
            let mut before: Vec<_> = (0..16).map(|x| image.get_pixel(x, y).0).collect();
            let mut after: Vec<_> = (0..16).map(|x| warped.get_pixel(x, y).0).collect();
            before.sort();
            after.sort();
            assert_eq!(before, after, "row {y}");
        }
    }

    #[test]
    fn directory_pass_writes_limit_files_under_labels() {
        let input = assert_fs::TempDir::new().unwrap();
        let output = assert_fs::TempDir::new().unwrap();

        let class_dir = input.child("65");
        class_dir.create_dir_all().unwrap();
        checkerboard(8)
            .save(class_dir.child("sample.png").path())
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let written = augment_directory(
            input.path(),
            output.path(),
            true,
            Some(3),
            false,
            "png",
            &mut rng,
        )
        .unwrap();

        assert_eq!(written, 3);
        for i in 0..3 {
            output
                .child("65")
                .child(format!("augmented_image_{i}.png"))
                .assert(predicates::path::is_file());
        }
    }

    #[test]
    fn empty_input_directory_is_an_error() {
        let input = assert_fs::TempDir::new().unwrap();
        let output = assert_fs::TempDir::new().unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(
            augment_directory(
                input.path(),
                output.path(),
                false,
                None,
                false,
                "png",
                &mut rng,
            )
            .is_err()
        );
    }
}
