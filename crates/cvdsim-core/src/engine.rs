//! Pixel transform engine.
//!
//! The one real operation of the simulator: view the image as a list of
//! RGB triples, multiply each by the condition's matrix, clip to the valid
//! range, and cast back to the source representation.

use crate::error::Result;
use crate::image::{ChannelOrder, Sample, SimImage};
use crate::registry::Condition;
use crate::transform::ColorTransform;

/// Apply `transform` to every pixel of `image`.
///
/// The input is left untouched. The output has the same dimensions, channel
/// order, and sample type. For the matrix path each output channel is
///
/// ```text
/// out[c] = clip(Σ_k m[c][k] · in[k], 0, MAX)
/// ```
///
/// computed in `f64` and cast back with truncation for integer samples.
/// The grayscale path weights the channels with BT.601 luma according to
/// the image's channel order and rounds to the nearest level.
pub fn apply_transform<T: Sample>(image: &SimImage<T>, transform: &ColorTransform) -> SimImage<T> {
    let format = T::FORMAT;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        %format,
        grayscale = transform.is_grayscale(),
        "applying color transform"
    );
    match transform {
        ColorTransform::Grayscale => {
            let weights = image.order().luma_weights();
            image.map_pixels(|px| [grayscale_pixel(px, weights); 3])
        }
        ColorTransform::LinearMatrix(matrix) => {
            let m = matrix.to_mat3();
            image.map_pixels(|px| {
                let out = m * glam::DVec3::from_array(px.map(T::to_f64));
                out.to_array().map(clip::<T>)
            })
        }
    }
}

/// Apply `transform` to a raw interleaved buffer with array shape `shape`.
///
/// `shape` is `(height, width, 3)`. Any other layout is rejected with
/// [`SimError::Format`](crate::SimError::Format) rather than reinterpreted.
pub fn transform_buffer<T: Sample>(
    shape: &[usize],
    order: ChannelOrder,
    samples: &[T],
    transform: &ColorTransform,
) -> Result<Vec<T>> {
    let image = SimImage::from_shape(shape, order, samples.to_vec())?;
    Ok(apply_transform(&image, transform).into_samples())
}

/// Simulate `condition` on `image` using the built-in registry.
pub fn simulate<T: Sample>(image: &SimImage<T>, condition: Condition) -> SimImage<T> {
    apply_transform(image, condition.transform())
}

fn grayscale_pixel<T: Sample>(px: [T; 3], weights: [f64; 3]) -> T {
    let luma = px
        .iter()
        .zip(weights)
        .map(|(v, w)| v.to_f64() * w)
        .sum::<f64>();
    clip(T::round(luma))
}

/// Clamp to `[0, MAX]` and cast. NaN maps to 0.
#[inline]
fn clip<T: Sample>(value: f64) -> T {
    if value.is_nan() {
        return T::from_f64(0.0);
    }
    T::from_f64(value.clamp(0.0, T::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ColorMatrix;

    const EPSILON: f32 = 1e-6;

    fn single<T: Sample>(px: [T; 3]) -> SimImage<T> {
        SimImage::filled(1, 1, ChannelOrder::Rgb, px)
    }

    #[test]
    fn test_protanopia_red_pixel() {
        let out = simulate(&single([255u8, 0, 0]), Condition::Protanopia);
        assert_eq!(out.pixel(0, 0), Some([144, 142, 0]));
    }

    #[test]
    fn test_grayscale_mid_gray_unchanged() {
        let out = apply_transform(&single([128u8, 128, 128]), &ColorTransform::Grayscale);
        assert_eq!(out.pixel(0, 0), Some([128, 128, 128]));
    }

    #[test]
    fn test_grayscale_uses_bt601_weights() {
        let out = apply_transform(&single([255u8, 0, 0]), &ColorTransform::Grayscale);
        // 0.299 * 255 = 76.245
        assert_eq!(out.pixel(0, 0), Some([76, 76, 76]));
    }

    #[test]
    fn test_grayscale_respects_bgr_order() {
        let bgr = SimImage::filled(1, 1, ChannelOrder::Bgr, [255u8, 0, 0]);
        let out = apply_transform(&bgr, &ColorTransform::Grayscale);
        // Blue channel first in storage: 0.114 * 255 = 29.07
        assert_eq!(out.pixel(0, 0), Some([29, 29, 29]));
        assert_eq!(out.order(), ChannelOrder::Bgr);
    }

    #[test]
    fn test_negative_coefficients_clip_to_zero() {
        let m = ColorMatrix::from_rows([[-1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]]);
        let out = apply_transform(&single([200u8, 200, 200]), &m.into());
        assert_eq!(out.pixel(0, 0), Some([0, 255, 200]));
    }

    #[test]
    fn test_float_clip_to_unit_range() {
        let m = ColorMatrix::from_rows([[1.5, 0.0, 0.0], [0.0, -0.5, 0.0], [0.0, 0.0, 0.5]]);
        let out = apply_transform(&single([0.8f32, 0.4, 0.4]), &m.into());
        let [r, g, b] = out.pixel(0, 0).unwrap();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 0.2).abs() < EPSILON);
    }

    #[test]
    fn test_input_not_mutated() {
        let image = single([10u8, 200, 30]);
        let before = image.clone();
        let _ = simulate(&image, Condition::Deuteranopia);
        assert_eq!(image, before);
    }

    #[test]
    fn test_nan_samples_clip_to_zero() {
        let image = single([f32::NAN, 0.5, 1.0]);
        for transform in [ColorTransform::IDENTITY, ColorTransform::Grayscale] {
            let out = apply_transform(&image, &transform);
            for v in out.samples() {
                assert!((0.0..=1.0).contains(v), "{v} out of range");
            }
        }
    }

    #[test]
    fn test_transform_buffer_rejects_two_channels() {
        let samples = [0u8; 6];
        let gray = ColorTransform::Grayscale;
        let err = transform_buffer(&[1, 3, 2], ChannelOrder::Rgb, &samples, &gray).unwrap_err();
        assert!(matches!(err, crate::SimError::Format { .. }));
    }

    #[test]
    fn test_transform_buffer_rejects_oversized_shape() {
        let side = u32::MAX as usize;
        let err = transform_buffer::<u8>(
            &[side, side, 3],
            ChannelOrder::Rgb,
            &[],
            &ColorTransform::IDENTITY,
        )
        .unwrap_err();
        assert!(matches!(err, crate::SimError::Format { .. }));
    }

    #[test]
    fn test_transform_buffer_identity() {
        let samples = [0u8, 64, 128, 255, 1, 2];
        let identity = ColorTransform::IDENTITY;
        let out = transform_buffer(&[1, 2, 3], ChannelOrder::Rgb, &samples, &identity).unwrap();
        assert_eq!(out, samples);
    }
}
