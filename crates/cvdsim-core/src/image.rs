//! Image representation for the simulation pipeline.
//!
//! A [`SimImage`] is a `(height, width, 3)` buffer of interleaved samples,
//! stored row-major. Samples are either `u8` in `[0, 255]` or normalized
//! `f32` in `[0, 1]`; see [`Sample`].

use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Number of interleaved channels in every simulated image.
pub const CHANNELS: usize = 3;

/// BT.601 luma weights in RGB order (what OpenCV-style grayscale uses).
pub const LUMA_BT601: [f64; 3] = [0.299, 0.587, 0.114];

/// Supported sample representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    /// 8-bit unsigned integer, `[0, 255]`.
    U8,
    /// 32-bit float, normalized to `[0, 1]`.
    F32,
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "8-bit"),
            Self::F32 => write!(f, "32-bit float"),
        }
    }
}

/// Storage order of the three channels.
///
/// Decoders that follow the OpenCV convention hand out BGR; the `image`
/// crate hands out RGB. The order travels with the buffer so that grayscale
/// weighting and export can honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Luma weights laid out in this storage order.
    pub const fn luma_weights(self) -> [f64; 3] {
        match self {
            Self::Rgb => LUMA_BT601,
            Self::Bgr => [LUMA_BT601[2], LUMA_BT601[1], LUMA_BT601[0]],
        }
    }
}

/// A numeric sample type that can hold image data.
pub trait Sample: bytemuck::Pod + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Largest representable intensity.
    const MAX: f64;
    /// Tag for logging and reporting.
    const FORMAT: SampleFormat;

    fn to_f64(self) -> f64;

    /// Cast a value already clipped to `[0, MAX]`. Integer types truncate.
    fn from_f64(value: f64) -> Self;

    /// Round to the nearest representable level. No-op for float types.
    fn round(value: f64) -> f64;
}

impl Sample for u8 {
    const MAX: f64 = 255.0;
    const FORMAT: SampleFormat = SampleFormat::U8;

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_f64(value: f64) -> Self {
        value as u8
    }

    #[inline]
    fn round(value: f64) -> f64 {
        value.round()
    }
}

impl Sample for f32 {
    const MAX: f64 = 1.0;
    const FORMAT: SampleFormat = SampleFormat::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn round(value: f64) -> f64 {
        value
    }
}

/// Interleaved 3-channel image buffer.
///
/// Invariant: `samples.len() == width * height * 3`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimImage<T: Sample = u8> {
    width: u32,
    height: u32,
    order: ChannelOrder,
    samples: Vec<T>,
}

impl<T: Sample> SimImage<T> {
    /// Wrap an interleaved sample buffer.
    pub fn new(width: u32, height: u32, order: ChannelOrder, samples: Vec<T>) -> Result<Self> {
        let expected = sample_len(width, height).ok_or_else(|| {
            SimError::format(format!("{width}x{height} image does not fit in memory"))
        })?;
        if samples.len() != expected {
            return Err(SimError::format(format!(
                "{width}x{height} image needs {expected} samples, got {}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            order,
            samples,
        })
    }

    /// Wrap a buffer described by an array shape `(height, width, channels)`.
    ///
    /// Anything other than three dimensions with a trailing 3 is rejected.
    pub fn from_shape(shape: &[usize], order: ChannelOrder, samples: Vec<T>) -> Result<Self> {
        let &[height, width, channels] = shape else {
            return Err(SimError::format(format!(
                "expected shape (height, width, 3), got {shape:?}"
            )));
        };
        if channels != CHANNELS {
            return Err(SimError::format(format!(
                "expected 3 channels, got {channels}"
            )));
        }
        let width = u32::try_from(width)
            .map_err(|_| SimError::format(format!("width {width} out of range")))?;
        let height = u32::try_from(height)
            .map_err(|_| SimError::format(format!("height {height} out of range")))?;
        Self::new(width, height, order, samples)
    }

    /// Build an image from whole pixels in row-major order.
    pub fn from_pixels(
        width: u32,
        height: u32,
        order: ChannelOrder,
        pixels: &[[T; 3]],
    ) -> Result<Self> {
        Self::new(width, height, order, bytemuck::cast_slice(pixels).to_vec())
    }

    /// An image where every pixel is `value`.
    ///
    /// # Panics
    ///
    /// Panics if the pixel buffer cannot be allocated, like [`vec!`].
    pub fn filled(width: u32, height: u32, order: ChannelOrder, value: [T; 3]) -> Self {
        let count = (width as usize)
            .checked_mul(height as usize)
            .unwrap_or(usize::MAX);
        let pixels = vec![value; count];
        Self {
            width,
            height,
            order,
            samples: bytemuck::cast_slice(&pixels).to_vec(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Array shape `(height, width, 3)`.
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, CHANNELS]
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Flat interleaved samples.
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<T> {
        self.samples
    }

    /// The buffer viewed as a flat list of pixels.
    pub fn pixels(&self) -> &[[T; 3]] {
        bytemuck::cast_slice(&self.samples)
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[T; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels().get(idx).copied()
    }

    /// New image of the same dimensions and order with `f` applied per pixel.
    pub fn map_pixels<U: Sample>(&self, mut f: impl FnMut([T; 3]) -> [U; 3]) -> SimImage<U> {
        let mut samples = Vec::with_capacity(self.samples.len());
        for &px in self.pixels() {
            samples.extend_from_slice(&f(px));
        }
        SimImage {
            width: self.width,
            height: self.height,
            order: self.order,
            samples,
        }
    }

    /// Reinterpret the storage order, swapping the outer channels if needed.
    pub fn with_order(&self, order: ChannelOrder) -> Self {
        if order == self.order {
            return self.clone();
        }
        let mut out = self.map_pixels(|[a, b, c]| [c, b, a]);
        out.order = order;
        out
    }
}

/// Interleaved sample count of a `width × height` image, if it fits in `usize`.
fn sample_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

impl SimImage<u8> {
    /// Take ownership of a decoded RGB image.
    pub fn from_rgb_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            order: ChannelOrder::Rgb,
            samples: image.into_raw(),
        }
    }

    /// Convert to an RGB image for encoding or resampling.
    pub fn to_rgb_image(&self) -> RgbImage {
        let rgb = self.with_order(ChannelOrder::Rgb);
        RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(rgb.pixel(x, y).unwrap_or_default())
        })
    }

    /// Scale to normalized floats in `[0, 1]`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_normalized(&self) -> SimImage<f32> {
        self.map_pixels(|px| px.map(|v| (f64::from(v) / <u8 as Sample>::MAX) as f32))
    }
}

impl SimImage<f32> {
    /// Quantize normalized floats back to 8-bit, rounding to nearest.
    pub fn to_u8(&self) -> SimImage<u8> {
        self.map_pixels(|px| {
            px.map(|v| u8::from_f64((v.to_f64().clamp(0.0, 1.0) * <u8 as Sample>::MAX).round()))
        })
    }
}
