//! Region cropping on rendered page images.

use image::DynamicImage;

use margin_core::BoundingBox;

/// Crop a bounding box out of a rendered page image.
///
/// Total function: zero or negative width/height and boxes partly or fully
/// outside the image are normalized rather than rejected. The far corner is
/// pushed at least one pixel past the near corner, then both corners are
/// clamped into the image, so the result always satisfies
/// `0 <= x < x2 <= width` and `0 <= y < y2 <= height`.
pub fn crop_bbox(img: &DynamicImage, bbox: &BoundingBox) -> DynamicImage {
    let iw = img.width() as i64;
    let ih = img.height() as i64;

    let x = bbox.x as i64;
    let y = bbox.y as i64;
    let x2 = (x + bbox.w as i64).max(x + 1);
    let y2 = (y + bbox.h as i64).max(y + 1);

    // Near corner lands on a pixel inside the image, far corner at most one
    // past the opposite edge and strictly beyond the near corner.
    let x = x.max(0).min(iw - 1);
    let y = y.max(0).min(ih - 1);
    let x2 = x2.max(x + 1).min(iw);
    let y2 = y2.max(y + 1).min(ih);

    img.crop_imm(x as u32, y as u32, (x2 - x) as u32, (y2 - y) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn test_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255])))
    }

    fn bbox(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
        BoundingBox { x, y, w, h }
    }

    #[test]
    fn crops_interior_box_exactly() {
        let out = crop_bbox(&test_image(200, 100), &bbox(10.0, 20.0, 50.0, 30.0));
        assert_eq!((out.width(), out.height()), (50, 30));
    }

    #[test]
    fn zero_size_box_yields_one_pixel() {
        let out = crop_bbox(&test_image(200, 100), &bbox(40.0, 40.0, 0.0, 0.0));
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn negative_size_box_yields_one_pixel() {
        let out = crop_bbox(&test_image(200, 100), &bbox(40.0, 40.0, -30.0, -5.0));
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn box_spilling_over_edges_is_clamped() {
        let out = crop_bbox(&test_image(200, 100), &bbox(150.0, 80.0, 100.0, 100.0));
        assert_eq!((out.width(), out.height()), (50, 20));
    }

    #[test]
    fn negative_origin_is_clamped_to_zero() {
        let out = crop_bbox(&test_image(200, 100), &bbox(-30.0, -10.0, 60.0, 40.0));
        assert_eq!((out.width(), out.height()), (30, 30));
    }

    #[test]
    fn box_fully_outside_still_yields_valid_crop() {
        let out = crop_bbox(&test_image(200, 100), &bbox(500.0, 500.0, 50.0, 50.0));
        assert_eq!((out.width(), out.height()), (1, 1));

        let out = crop_bbox(&test_image(200, 100), &bbox(-500.0, -500.0, 50.0, 50.0));
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn full_image_box_is_identity_sized() {
        let out = crop_bbox(&test_image(200, 100), &bbox(0.0, 0.0, 200.0, 100.0));
        assert_eq!((out.width(), out.height()), (200, 100));
    }
}
