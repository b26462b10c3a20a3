use crate::config::DetectorConfig;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Luma};
use std::path::Path;
use thiserror::Error;

/// ITU-R 601 luminance weights, applied as a weighted average.
const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

/// Why an image was dropped from the run. Exclusion is expected data,
/// not a pipeline failure: the caller reports it and moves on.
#[derive(Debug, Error)]
pub enum ExcludeReason {
    #[error("failed to load image: {0}")]
    Load(#[from] image::ImageError),

    #[error("expected {required} channels, found {found}")]
    ChannelMismatch { required: u8, found: u8 },
}

/// Grayscale intensity grid resized to the configured fixed dimensions.
///
/// Intensities stay on the 0–255 scale; the MSE threshold is calibrated
/// against that scale. Stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGrid {
    height: u32,
    width: u32,
    data: Vec<f32>,
}

impl NormalizedGrid {
    /// Build a grid from raw row-major intensities.
    ///
    /// # Panics
    /// Panics if `data.len() != height * width`.
    pub fn from_raw(height: u32, width: u32, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), (height * width) as usize);
        Self {
            height,
            width,
            data,
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn get(&self, row: u32, col: u32) -> f32 {
        self.data[(row * self.width + col) as usize]
    }

    /// Intensities in row-major order.
    pub fn row_major(&self) -> &[f32] {
        &self.data
    }

    /// Intensities in column-major order.
    pub fn column_major(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.width).flat_map(move |col| (0..self.height).map(move |row| self.get(row, col)))
    }
}

/// Decode `path` and check the channel-count requirement without running
/// the rest of the pipeline.
pub fn validate(path: &Path, required_channels: u8) -> bool {
    image::open(path)
        .map(|img| img.color().channel_count() == required_channels)
        .unwrap_or(false)
}

/// Decode, validate, convert to grayscale and resize to the configured grid.
pub fn normalize(path: &Path, config: &DetectorConfig) -> Result<NormalizedGrid, ExcludeReason> {
    let img = image::open(path)?;
    let found = img.color().channel_count();
    if found != config.required_channels {
        return Err(ExcludeReason::ChannelMismatch {
            required: config.required_channels,
            found,
        });
    }
    let gray = to_grayscale(&img);
    Ok(resize(&gray, config.grid_height, config.grid_width))
}

/// Weighted average of the channels, kept in unit scale because the f32
/// samplers in `image` clamp resize output to [0, 1].
fn to_grayscale(img: &DynamicImage) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let rgb = img.to_rgb8();
    let weight_sum: f32 = LUMA_WEIGHTS.iter().sum();
    ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
        let pixel = rgb.get_pixel(x, y);
        let weighted: f32 = pixel
            .0
            .iter()
            .zip(LUMA_WEIGHTS)
            .map(|(&channel, weight)| channel as f32 * weight)
            .sum();
        Luma([weighted / weight_sum / 255.0])
    })
}

/// Cubic-interpolated resize, mapped back to the 0–255 scale. Resized
/// exactly once per image; the one result feeds both fingerprint
/// traversal orders and the MSE stage.
fn resize(gray: &ImageBuffer<Luma<f32>, Vec<f32>>, height: u32, width: u32) -> NormalizedGrid {
    let resized = imageops::resize(gray, width, height, FilterType::CatmullRom);
    NormalizedGrid {
        height,
        width,
        data: resized.into_raw().into_iter().map(|v| v * 255.0).collect(),
    }
}
