pub mod ffmpeg_camera;
pub mod interval_scheduler;
pub mod jpeg_frame_encoder;
