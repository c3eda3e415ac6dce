use crate::recognition::domain::face_match::Recognition;

/// Height of the label plate drawn above each box, in pixels.
pub const LABEL_HEIGHT: i32 = 22;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxStyle {
    Matched,
    Unmatched,
}

impl BoxStyle {
    /// Stroke color as RGB.
    pub fn color(self) -> [u8; 3] {
        match self {
            BoxStyle::Matched => [0, 255, 0],
            BoxStyle::Unmatched => [255, 255, 0],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub style: BoxStyle,
    pub label: String,
}

impl OverlayBox {
    /// Top-left corner of the label plate: above the box, kept inside the image.
    pub fn label_origin(&self) -> (i32, i32) {
        let x = self.x.max(0);
        let baseline = self.y.saturating_sub(6).max(LABEL_HEIGHT - 4);
        (x, baseline - (LABEL_HEIGHT - 4))
    }
}

/// Annotations for one recognition result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
    boxes: Vec<OverlayBox>,
}

impl Overlay {
    /// One box per detected face, in detection order.
    pub fn render(recognition: &Recognition) -> Self {
        let boxes = recognition
            .matches
            .iter()
            .map(|m| OverlayBox {
                x: m.face.x,
                y: m.face.y,
                w: m.face.w,
                h: m.face.h,
                style: if m.is_matched() {
                    BoxStyle::Matched
                } else {
                    BoxStyle::Unmatched
                },
                label: m.label(),
            })
            .collect();
        Self { boxes }
    }

    pub fn boxes(&self) -> &[OverlayBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
