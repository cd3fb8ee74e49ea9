//! Aspect-preserving resampling for previews and figure cells.

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::image::SimImage;

/// A width × height box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Largest size with the aspect ratio of `width × height` that fits `bounds`.
///
/// With `upscale == false` the source size is returned unchanged when it
/// already fits. Degenerate inputs pass through.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_within(width: u32, height: u32, bounds: Size, upscale: bool) -> Size {
    if width == 0 || height == 0 || bounds.width == 0 || bounds.height == 0 {
        return Size::new(width, height);
    }
    if !upscale && width <= bounds.width && height <= bounds.height {
        return Size::new(width, height);
    }
    let scale = (f64::from(bounds.width) / f64::from(width))
        .min(f64::from(bounds.height) / f64::from(height));
    Size::new(
        ((f64::from(width) * scale).round() as u32).clamp(1, bounds.width),
        ((f64::from(height) * scale).round() as u32).clamp(1, bounds.height),
    )
}

/// Shrink `image` to fit `bounds`, never enlarging it.
pub fn thumbnail(image: &SimImage<u8>, bounds: Size) -> SimImage<u8> {
    resize_to(image, fit_within(image.width(), image.height(), bounds, false))
}

/// Scale `image` up or down to fill `bounds` along its limiting axis.
pub fn fit_to(image: &SimImage<u8>, bounds: Size) -> SimImage<u8> {
    resize_to(image, fit_within(image.width(), image.height(), bounds, true))
}

fn resize_to(image: &SimImage<u8>, size: Size) -> SimImage<u8> {
    if size.width == image.width() && size.height == image.height() {
        return image.clone();
    }
    let resized = imageops::resize(
        &image.to_rgb_image(),
        size.width,
        size.height,
        FilterType::Lanczos3,
    );
    SimImage::from_rgb_image(resized).with_order(image.order())
}
