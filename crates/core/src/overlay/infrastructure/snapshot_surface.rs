use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::capture::domain::frame_encoder::FrameEncoder;
use crate::capture::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
use crate::overlay::domain::overlay::Overlay;
use crate::overlay::domain::overlay_renderer::OverlaySurface;
use crate::shared::frame::Frame;

use super::frame_painter::FramePainter;

const SNAPSHOT_FILE: &str = "latest.jpg";

/// Writes the annotated frame to `<dir>/latest.jpg`.
///
/// Clearing removes the file, so the directory only ever shows the
/// current recognition result. Write failures are logged, never fatal.
pub struct SnapshotOverlaySurface {
    path: PathBuf,
    painter: FramePainter,
    encoder: JpegFrameEncoder,
}

impl SnapshotOverlaySurface {
    pub fn new(dir: &Path, painter: FramePainter) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(SNAPSHOT_FILE),
            painter,
            encoder: JpegFrameEncoder::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let tmp = self.path.with_extension("jpg.part");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)
    }
}

impl OverlaySurface for SnapshotOverlaySurface {
    fn clear(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to clear {}: {}", self.path.display(), e),
        }
    }

    fn draw(&mut self, frame: &Frame, overlay: &Overlay) {
        let mut annotated = frame.clone();
        self.painter.paint(&mut annotated, overlay);
        let encoded = match self.encoder.encode(&annotated) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("Failed to encode overlay snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = self.write(encoded.bytes()) {
            log::warn!("Failed to write {}: {}", self.path.display(), e);
            return;
        }
        for b in overlay.boxes() {
            log::debug!("Overlay box at ({}, {}) {}x{}: {}", b.x, b.y, b.w, b.h, b.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::face_match::Recognition;
    use tempfile::TempDir;

    fn make_frame() -> Frame {
        Frame::new(vec![90; 32 * 24 * 3], 32, 24, 3, 0)
    }

    #[test]
    fn test_draw_writes_decodable_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut surface = SnapshotOverlaySurface::new(dir.path(), FramePainter::default()).unwrap();
        surface.draw(&make_frame(), &Overlay::render(&Recognition::default()));

        let img = image::open(surface.path()).unwrap();
        assert_eq!((img.width(), img.height()), (32, 24));
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut surface = SnapshotOverlaySurface::new(dir.path(), FramePainter::default()).unwrap();
        surface.draw(&make_frame(), &Overlay::default());
        surface.clear();
        assert!(!surface.path().exists());
    }

    #[test]
    fn test_clear_without_snapshot_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut surface = SnapshotOverlaySurface::new(dir.path(), FramePainter::default()).unwrap();
        surface.clear();
        assert!(!surface.path().exists());
    }

    #[test]
    fn test_new_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("overlay").join("kiosk");
        let surface = SnapshotOverlaySurface::new(&nested, FramePainter::default()).unwrap();
        assert!(nested.is_dir());
        assert_eq!(surface.path(), nested.join("latest.jpg"));
    }
}
