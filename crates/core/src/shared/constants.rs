use std::time::Duration;

pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:8000";

pub const RECOGNIZE_PATH: &str = "/api/face/recognize";
pub const CHECKIN_PATH: &str = "/api/attendance/checkin-by-face";
pub const SESSIONS_PATH: &str = "/api/sessions/";
pub const CLASSES_PATH: &str = "/api/classes/";

/// Period of the capture timer.
pub const TICK_INTERVAL: Duration = Duration::from_millis(900);

/// Minimum time between two executed ticks, independent of the timer period.
pub const MIN_TICK_SPACING: Duration = Duration::from_millis(700);

pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;

/// JPEG quality on the image crate's 1-100 scale.
pub const JPEG_QUALITY: u8 = 80;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
