use crate::{Error, Result};
use image::{imageops, Rgb, RgbImage};

/// Stacks `bar` beneath `original`.
///
/// The result is as wide as both inputs and as tall as their combined heights.
/// The top region is an exact copy of `original`, and the bottom region is an exact copy of `bar`.
///
/// # Errors
/// Returns [`Error::WidthMismatch`] if the two images differ in width, or
/// [`Error::ImageTooLarge`] if the combined height overflows a `u32`.
pub fn compose(original: &RgbImage, bar: &RgbImage) -> Result<RgbImage> {
    let (width, height) = original.dimensions();
    if bar.width() != width {
        return Err(Error::WidthMismatch {
            image: width,
            bar: bar.width(),
        });
    }

    let total_height = height
        .checked_add(bar.height())
        .ok_or(Error::ImageTooLarge { width, height })?;

    let mut composite = RgbImage::from_pixel(width, total_height, Rgb([0, 0, 0]));
    imageops::replace(&mut composite, original, 0, 0);
    imageops::replace(&mut composite, bar, 0, i64::from(height));
    Ok(composite)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stacks_vertically() {
        let original = RgbImage::from_fn(4, 3, |x, y| Rgb([x as u8, y as u8, 1]));
        let bar = RgbImage::from_pixel(4, 2, Rgb([9, 9, 9]));
        let composite = compose(&original, &bar).unwrap();

        assert_eq!(composite.dimensions(), (4, 5));
        for (x, y, pixel) in original.enumerate_pixels() {
            assert_eq!(composite.get_pixel(x, y), pixel);
        }
        for y in 3..5 {
            for x in 0..4 {
                assert_eq!(composite.get_pixel(x, y), &Rgb([9, 9, 9]));
            }
        }
    }

    #[test]
    fn width_mismatch() {
        let original = RgbImage::new(4, 3);
        let bar = RgbImage::new(5, 2);
        assert_eq!(
            compose(&original, &bar),
            Err(Error::WidthMismatch { image: 4, bar: 5 })
        );
    }
}
