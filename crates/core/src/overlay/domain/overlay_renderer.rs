use crate::overlay::domain::overlay::Overlay;
use crate::recognition::domain::face_match::Recognition;
use crate::shared::frame::Frame;

/// Display target for face annotations.
pub trait OverlaySurface: Send {
    /// Removes every annotation currently shown.
    fn clear(&mut self);

    /// Draws `overlay` for the frame it was computed from.
    fn draw(&mut self, frame: &Frame, overlay: &Overlay);
}

/// Surface that shows nothing. Used headless and in tests.
pub struct NullOverlaySurface;

impl OverlaySurface for NullOverlaySurface {
    fn clear(&mut self) {}
    fn draw(&mut self, _frame: &Frame, _overlay: &Overlay) {}
}

/// Keeps the surface in sync with the latest recognition result.
///
/// Every render clears the surface first, so annotations never accumulate
/// across cycles.
pub struct OverlayRenderer {
    surface: Box<dyn OverlaySurface>,
    current: Option<Overlay>,
}

impl OverlayRenderer {
    pub fn new(surface: Box<dyn OverlaySurface>) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    pub fn render(&mut self, frame: &Frame, recognition: &Recognition) -> &Overlay {
        self.surface.clear();
        let overlay = Overlay::render(recognition);
        self.surface.draw(frame, &overlay);
        self.current.insert(overlay)
    }

    pub fn clear(&mut self) {
        self.surface.clear();
        self.current = None;
    }

    /// The overlay on screen, or `None` when cleared.
    pub fn current(&self) -> Option<&Overlay> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::face_match::{FaceBox, FaceMatch};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Shown {
        boxes: usize,
        clears: usize,
    }

    struct RecordingSurface {
        shown: Arc<Mutex<Shown>>,
    }

    impl OverlaySurface for RecordingSurface {
        fn clear(&mut self) {
            let mut shown = self.shown.lock().unwrap();
            shown.boxes = 0;
            shown.clears += 1;
        }

        fn draw(&mut self, _frame: &Frame, overlay: &Overlay) {
            self.shown.lock().unwrap().boxes += overlay.len();
        }
    }

    fn recognition(faces: usize) -> Recognition {
        Recognition {
            matches: (0..faces)
                .map(|i| FaceMatch {
                    face: FaceBox {
                        id: i as u32,
                        x: 0,
                        y: 0,
                        w: 10,
                        h: 10,
                        confidence: None,
                    },
                    identity: None,
                })
                .collect(),
            recognized_count: 0,
            message: String::new(),
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0; 48], 4, 4, 3, 0)
    }

    fn renderer() -> (OverlayRenderer, Arc<Mutex<Shown>>) {
        let shown = Arc::new(Mutex::new(Shown::default()));
        let surface = RecordingSurface {
            shown: shown.clone(),
        };
        (OverlayRenderer::new(Box::new(surface)), shown)
    }

    #[test]
    fn test_render_draws_one_box_per_face() {
        let (mut renderer, shown) = renderer();
        renderer.render(&frame(), &recognition(3));
        assert_eq!(shown.lock().unwrap().boxes, 3);
        assert_eq!(renderer.current().unwrap().len(), 3);
    }

    #[test]
    fn test_consecutive_renders_do_not_accumulate() {
        let (mut renderer, shown) = renderer();
        renderer.render(&frame(), &recognition(3));
        renderer.render(&frame(), &recognition(1));
        let shown = shown.lock().unwrap();
        assert_eq!(shown.boxes, 1);
        assert_eq!(shown.clears, 2);
    }

    #[test]
    fn test_clear_empties_surface() {
        let (mut renderer, shown) = renderer();
        renderer.render(&frame(), &recognition(2));
        renderer.clear();
        assert_eq!(shown.lock().unwrap().boxes, 0);
        assert!(renderer.current().is_none());
    }
}
