pub mod frame_painter;
pub mod label_font;
pub mod snapshot_surface;
