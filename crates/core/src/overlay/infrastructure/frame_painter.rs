use ab_glyph::{FontArc, PxScale};
use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_text_mut, text_size};
use ndarray::{s, ArrayViewMut3};

use crate::overlay::domain::overlay::{Overlay, OverlayBox, LABEL_HEIGHT};
use crate::shared::frame::Frame;

const DEFAULT_STROKE: i32 = 3;

/// Approximate advance of one label glyph, used to size the plate when no
/// font is loaded.
const GLYPH_WIDTH: i32 = 8;

/// Horizontal padding on each side of the label text.
const PLATE_PADDING: i32 = 6;

/// Plate pixels keep this share of their original brightness.
const PLATE_SHADE: f32 = 0.4;

const LABEL_SCALE: f32 = 16.0;
const LABEL_TEXT_COLOR: [u8; 3] = [255, 255, 255];

/// Rasterizes overlay boxes directly into an RGB frame.
///
/// Boxes are stroked in their style color; each label gets a dark plate
/// above the box with the label text drawn on it. Without a font the
/// plate is painted bare.
pub struct FramePainter {
    stroke: i32,
    font: Option<FontArc>,
}

impl FramePainter {
    pub fn new(stroke: i32, font: Option<FontArc>) -> Self {
        Self {
            stroke: stroke.max(1),
            font,
        }
    }

    pub fn with_font(font: Option<FontArc>) -> Self {
        Self::new(DEFAULT_STROKE, font)
    }

    pub fn paint(&self, frame: &mut Frame, overlay: &Overlay) {
        if frame.channels() != 3 {
            log::warn!(
                "Skipping overlay on {}-channel frame",
                frame.channels()
            );
            return;
        }
        for b in overlay.boxes() {
            let mut pixels = frame.as_ndarray_mut();
            self.stroke_box(&mut pixels, b);
            shade_plate(&mut pixels, b, self.label_width(&b.label));
            self.draw_label(frame, b);
        }
    }

    fn stroke_box(&self, pixels: &mut ArrayViewMut3<'_, u8>, b: &OverlayBox) {
        let color = b.style.color();
        let t = self.stroke;
        let (x0, y0) = (b.x, b.y);
        let (x1, y1) = (b.x.saturating_add(b.w), b.y.saturating_add(b.h));
        fill(pixels, (x0, y0, x1, y0.saturating_add(t)), color);
        fill(pixels, (x0, y1.saturating_sub(t), x1, y1), color);
        fill(pixels, (x0, y0, x0.saturating_add(t), y1), color);
        fill(pixels, (x1.saturating_sub(t), y0, x1, y1), color);
    }

    fn label_width(&self, label: &str) -> i32 {
        let text = match &self.font {
            Some(font) => text_size(PxScale::from(LABEL_SCALE), font, label).0 as i32,
            None => (label.chars().count() as i32).saturating_mul(GLYPH_WIDTH),
        };
        text.saturating_add(2 * PLATE_PADDING)
    }

    fn draw_label(&self, frame: &mut Frame, b: &OverlayBox) {
        let Some(font) = &self.font else {
            return;
        };
        let (width, height) = (frame.width(), frame.height());
        let Some(mut canvas) =
            ImageBuffer::<Rgb<u8>, &mut [u8]>::from_raw(width, height, frame.data_mut())
        else {
            return;
        };
        let (x, y) = b.label_origin();
        let top = y.saturating_add((LABEL_HEIGHT - LABEL_SCALE as i32) / 2);
        draw_text_mut(
            &mut canvas,
            Rgb(LABEL_TEXT_COLOR),
            x.saturating_add(PLATE_PADDING),
            top,
            PxScale::from(LABEL_SCALE),
            font,
            &b.label,
        );
    }
}

impl Default for FramePainter {
    fn default() -> Self {
        Self::new(DEFAULT_STROKE, None)
    }
}

/// Clamps a half-open rectangle to the image, or `None` if nothing is left.
fn clip(
    pixels: &ArrayViewMut3<'_, u8>,
    (x0, y0, x1, y1): (i32, i32, i32, i32),
) -> Option<(usize, usize, usize, usize)> {
    let (h, w, _) = pixels.dim();
    let cx0 = x0.clamp(0, w as i32) as usize;
    let cx1 = x1.clamp(0, w as i32) as usize;
    let cy0 = y0.clamp(0, h as i32) as usize;
    let cy1 = y1.clamp(0, h as i32) as usize;
    (cx0 < cx1 && cy0 < cy1).then_some((cx0, cy0, cx1, cy1))
}

fn fill(pixels: &mut ArrayViewMut3<'_, u8>, rect: (i32, i32, i32, i32), color: [u8; 3]) {
    let Some((x0, y0, x1, y1)) = clip(pixels, rect) else {
        return;
    };
    for (c, value) in color.iter().enumerate() {
        pixels.slice_mut(s![y0..y1, x0..x1, c]).fill(*value);
    }
}

fn shade_plate(pixels: &mut ArrayViewMut3<'_, u8>, b: &OverlayBox, width: i32) {
    let (x, y) = b.label_origin();
    let rect = (x, y, x.saturating_add(width), y.saturating_add(LABEL_HEIGHT));
    let Some((x0, y0, x1, y1)) = clip(pixels, rect) else {
        return;
    };
    pixels
        .slice_mut(s![y0..y1, x0..x1, ..])
        .mapv_inplace(|v| (v as f32 * PLATE_SHADE) as u8);
}
