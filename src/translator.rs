//! Adapts raw images to model input and raw model output to ranked labels.
//!
//! The input side is the one bespoke algorithm of the crate: grayscale,
//! resize to 28×28, scale to [0, 1], then invert the polarity when the
//! border of the image is mostly light. The dataset draws digits light on
//! dark; user-supplied images are usually the opposite.

use std::fmt;

use image::{imageops::FilterType, DynamicImage};
use log::debug;

use crate::model::{IMAGE_HEIGHT, IMAGE_WIDTH, NUM_CLASSES};

/// Border intensity above which an image is treated as dark-on-light and
/// inverted.
///
/// A heuristic, not a learned value: it assumes borders are background.
/// Images whose border mean sits near the threshold (mid-gray backgrounds)
/// get no guarantee either way.
pub const INVERSION_THRESHOLD: f32 = 0.5;

/// Converts an arbitrary image into the flat 784-element vector the model
/// expects: grayscale, resized, scaled to [0, 1], polarity-corrected,
/// flattened in row-major order.
pub fn image_to_input(image: &DynamicImage) -> Vec<f32> {
    let resized = image
        .resize_exact(IMAGE_WIDTH as u32, IMAGE_HEIGHT as u32, FilterType::Triangle)
        .into_luma8();

    let mut pixels: Vec<f32> = resized
        .pixels()
        .map(|pixel| pixel.0[0] as f32 / 255.0)
        .collect();

    let border = border_mean(&pixels);
    debug!("average border intensity: {border:.4}");

    if border > INVERSION_THRESHOLD {
        debug!("light background detected, inverting intensities");
        for value in pixels.iter_mut() {
            *value = 1.0 - *value;
        }
    }

    pixels
}

/// Mean intensity over the one-pixel border: the top and bottom rows in
/// full, plus the left and right columns without the corner rows already
/// counted.
fn border_mean(pixels: &[f32]) -> f32 {
    let mut sum = 0.0;
    let mut count = 0usize;

    for x in 0..IMAGE_WIDTH {
        sum += pixels[x];
        sum += pixels[(IMAGE_HEIGHT - 1) * IMAGE_WIDTH + x];
        count += 2;
    }

    for y in 1..IMAGE_HEIGHT - 1 {
        sum += pixels[y * IMAGE_WIDTH];
        sum += pixels[y * IMAGE_WIDTH + IMAGE_WIDTH - 1];
        count += 2;
    }

    sum / count as f32
}

/// One ranked entry of a classification result.
#[derive(Debug, Clone)]
pub struct Classification {
    pub class_name: String,
    pub probability: f32,
}

/// Class probabilities sorted descending, summing to 1.
#[derive(Debug, Clone)]
pub struct Classifications {
    items: Vec<Classification>,
}

impl Classifications {
    /// Builds a ranked result from raw scores: softmax, pair with class
    /// names, sort descending by probability.
    pub fn from_scores(class_names: Vec<String>, scores: &[f32]) -> Self {
        let probabilities = softmax(scores);
        let mut items: Vec<Classification> = class_names
            .into_iter()
            .zip(probabilities)
            .map(|(class_name, probability)| Classification {
                class_name,
                probability,
            })
            .collect();
        items.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        Self { items }
    }

    /// The most probable class, if any.
    pub fn best(&self) -> Option<&Classification> {
        self.items.first()
    }

    /// The `k` most probable classes.
    pub fn top_k(&self, k: usize) -> &[Classification] {
        &self.items[..k.min(self.items.len())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Classification> {
        self.items.iter()
    }
}

impl fmt::Display for Classifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.top_k(5) {
            writeln!(
                f,
                "\t{}: {:.2}%",
                item.class_name,
                item.probability * 100.0
            )?;
        }
        Ok(())
    }
}

/// The digit labels "0" through "9".
pub fn digit_labels() -> Vec<String> {
    (0..NUM_CLASSES).map(|digit| digit.to_string()).collect()
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|score| (score - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|exp| exp / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn uniform_image(intensity: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(
            IMAGE_WIDTH as u32,
            IMAGE_HEIGHT as u32,
            Luma([intensity]),
        ))
    }

    #[test]
    fn all_black_image_is_not_inverted() {
        let input = image_to_input(&uniform_image(0));
        assert!(input.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn all_white_image_is_inverted_to_black() {
        let input = image_to_input(&uniform_image(255));
        assert!(input.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn dark_digit_on_light_background_comes_out_light_on_dark() {
        let mut img = GrayImage::from_pixel(28, 28, Luma([255]));
        for y in 10..18 {
            for x in 10..18 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let input = image_to_input(&DynamicImage::ImageLuma8(img));

        // Border became dark, the digit strokes became bright.
        assert!(input[0].abs() < 1e-6);
        assert!((input[14 * IMAGE_WIDTH + 14] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mid_gray_image_keeps_its_polarity() {
        // 100/255 ≈ 0.39, below the threshold.
        let input = image_to_input(&uniform_image(100));
        assert!(input.iter().all(|&v| (v - 100.0 / 255.0).abs() < 1e-3));
    }

    #[test]
    fn output_is_flat_normalized_and_sized_to_the_model() {
        let img = GrayImage::from_fn(56, 40, |x, y| Luma([((x + y) % 256) as u8]));
        let input = image_to_input(&DynamicImage::ImageLuma8(img));

        assert_eq!(input.len(), IMAGE_HEIGHT * IMAGE_WIDTH);
        assert!(input.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn border_mean_ignores_the_interior() {
        let mut pixels = vec![0.0f32; IMAGE_HEIGHT * IMAGE_WIDTH];
        for y in 1..IMAGE_HEIGHT - 1 {
            for x in 1..IMAGE_WIDTH - 1 {
                pixels[y * IMAGE_WIDTH + x] = 1.0;
            }
        }
        assert!(border_mean(&pixels).abs() < 1e-6);

        for value in pixels.iter_mut() {
            *value = 1.0 - *value;
        }
        assert!((border_mean(&pixels) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn classifications_sum_to_one_and_rank_descending() {
        let result = Classifications::from_scores(digit_labels(), &[0.1, 2.5, -1.0, 0.7, 0.0, 1.9, -0.3, 0.2, 0.4, -2.0]);

        let total: f32 = result.iter().map(|c| c.probability).sum();
        assert!((total - 1.0).abs() < 1e-5);

        let probabilities: Vec<f32> = result.iter().map(|c| c.probability).collect();
        assert!(probabilities.windows(2).all(|w| w[0] >= w[1]));

        assert_eq!(result.best().unwrap().class_name, "1");
    }

    #[test]
    fn top_k_truncates_without_reordering() {
        let result = Classifications::from_scores(digit_labels(), &[0.0, 3.0, 1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let top = result.top_k(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].class_name, "1");
        assert_eq!(top[1].class_name, "3");
        assert_eq!(top[2].class_name, "2");

        assert_eq!(result.top_k(100).len(), NUM_CLASSES);
    }

    #[test]
    fn uniform_scores_spread_probability_evenly() {
        let result = Classifications::from_scores(digit_labels(), &[0.5; 10]);
        assert!(result.iter().all(|c| (c.probability - 0.1).abs() < 1e-6));
    }
}
