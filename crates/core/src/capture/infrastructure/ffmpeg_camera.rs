use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;
use ffmpeg_next::Packet;

use crate::capture::domain::camera::{AcquisitionError, Camera};
use crate::shared::frame::Frame;

const OPEN_TIMEOUT: Duration = Duration::from_secs(10);
const DEVICE_FRAMERATE: &str = "30";
/// Consecutive failed reads before the stream is given up as lost.
const MAX_READ_FAILURES: u32 = 20;
const READ_RETRY: Duration = Duration::from_millis(50);

/// Where the camera reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CameraSource {
    /// Platform capture device: `/dev/videoN` (v4l2), an avfoundation index,
    /// or a dshow `video=<name>` string.
    Device(String),
    /// Any ffmpeg-readable file or URL. Files restart at end of stream.
    Media(String),
}

impl CameraSource {
    /// Interprets a user-supplied device string; `None` picks the platform default.
    pub fn parse(device: Option<&str>) -> Self {
        match device.map(str::trim) {
            None | Some("") => CameraSource::Device(default_device().to_string()),
            Some(s) if s.contains("://") || Path::new(s).is_file() => {
                CameraSource::Media(s.to_string())
            }
            Some(s) => CameraSource::Device(s.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CameraSource::Device(name) | CameraSource::Media(name) => name,
        }
    }
}

fn default_device() -> &'static str {
    if cfg!(target_os = "macos") {
        "0"
    } else if cfg!(target_os = "windows") {
        "video=Integrated Camera"
    } else {
        "/dev/video0"
    }
}

fn device_format() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "video4linux2"
    }
}

/// Live camera backed by libavdevice / libavformat.
///
/// A background thread decodes continuously into a single-slot buffer, so
/// `capture_frame` always sees the newest frame and never blocks on I/O.
/// Once that thread ends (device unplugged, stream closed) the slot is
/// emptied and `is_streaming` reports false.
pub struct FfmpegCamera {
    source: CameraSource,
    latest: Arc<Mutex<Option<Frame>>>,
    stopping: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FfmpegCamera {
    pub fn new(source: CameraSource) -> Self {
        Self {
            source,
            latest: Arc::new(Mutex::new(None)),
            stopping: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Camera for FfmpegCamera {
    fn start(&mut self, width: u32, height: u32) -> Result<(), AcquisitionError> {
        self.stop();
        ffmpeg_next::init().map_err(|e| unavailable(&self.source, e.to_string()))?;

        let stopping = Arc::new(AtomicBool::new(false));
        let latest = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), AcquisitionError>>(1);

        let source = self.source.clone();
        let thread_stopping = stopping.clone();
        let thread_latest = latest.clone();
        let handle = thread::Builder::new()
            .name("rollcall-camera".into())
            .spawn(move || match DecodeLoop::open(&source, width, height) {
                Ok(decode) => {
                    let _ = ready_tx.send(Ok(()));
                    decode.run(&thread_stopping, &thread_latest);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| unavailable(&self.source, e.to_string()))?;

        match ready_rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(Ok(())) => {
                log::info!("Camera {} streaming", self.source.name());
                self.stopping = stopping;
                self.latest = latest;
                self.worker = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                // The open call is still blocked inside ffmpeg; let it finish on its own.
                stopping.store(true, Ordering::Relaxed);
                Err(unavailable(&self.source, "timed out opening device".into()))
            }
        }
    }

    fn capture_frame(&mut self) -> Option<Frame> {
        if !self.is_streaming() {
            return None;
        }
        self.latest.lock().ok()?.clone()
    }

    fn stop(&mut self) {
        self.stopping.store(true, Ordering::Relaxed);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Camera thread panicked");
            }
            log::info!("Camera {} released", self.source.name());
        }
        if let Ok(mut slot) = self.latest.lock() {
            *slot = None;
        }
    }

    fn is_streaming(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }
}

struct DecodeLoop {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    stream_index: usize,
    /// Set for media files: loop at EOF and pace output at the stream rate.
    pacing: Option<Duration>,
}

struct Scaler {
    context: scaling::Context,
    width: u32,
    height: u32,
    format: Pixel,
}

impl DecodeLoop {
    fn open(source: &CameraSource, width: u32, height: u32) -> Result<Self, AcquisitionError> {
        let ictx = match source {
            CameraSource::Device(name) => {
                ffmpeg_next::device::register_all();
                let format = ffmpeg_next::device::input::video()
                    .find(|f| f.name() == device_format())
                    .ok_or_else(|| {
                        unavailable(source, format!("ffmpeg lacks {} support", device_format()))
                    })?;
                let mut options = ffmpeg_next::Dictionary::new();
                options.set("video_size", &format!("{width}x{height}"));
                options.set("framerate", DEVICE_FRAMERATE);
                ffmpeg_next::format::open_with(
                    name,
                    &ffmpeg_next::format::Format::Input(format),
                    options,
                )
                .map(|ctx| ctx.input())
                .map_err(|e| open_error(source, e))?
            }
            CameraSource::Media(path) => {
                ffmpeg_next::format::input(path).map_err(|e| open_error(source, e))?
            }
        };

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| AcquisitionError::NoVideoStream {
                device: source.name().to_string(),
            })?;
        let stream_index = stream.index();
        let rate = stream.rate();
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|ctx| ctx.decoder().video())
            .map_err(|e| unavailable(source, e.to_string()))?;

        let pacing = match source {
            CameraSource::Media(_) if rate.numerator() > 0 && rate.denominator() > 0 => Some(
                Duration::from_secs_f64(rate.denominator() as f64 / rate.numerator() as f64),
            ),
            CameraSource::Media(_) => Some(Duration::from_millis(33)),
            CameraSource::Device(_) => None,
        };

        Ok(Self {
            ictx,
            decoder,
            stream_index,
            pacing,
        })
    }

    fn run(mut self, stopping: &AtomicBool, latest: &Mutex<Option<Frame>>) {
        let _slot = ClearOnExit(latest);
        let mut scaler: Option<Scaler> = None;
        let mut sequence: u64 = 0;
        let mut failures: u32 = 0;

        while !stopping.load(Ordering::Relaxed) {
            let mut packet = Packet::empty();
            match packet.read(&mut self.ictx) {
                Ok(()) => failures = 0,
                Err(ffmpeg_next::Error::Eof) => {
                    if self.pacing.is_some() && self.rewind() {
                        continue;
                    }
                    log::warn!("Camera stream ended");
                    break;
                }
                Err(e) => {
                    failures += 1;
                    if failures >= MAX_READ_FAILURES {
                        log::error!("Camera read failed {failures} times, giving up: {e}");
                        break;
                    }
                    log::debug!("Camera read failed: {e}");
                    thread::sleep(READ_RETRY);
                    continue;
                }
            }

            if packet.stream() != self.stream_index || self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            let mut decoded = Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                match to_rgb_frame(&decoded, &mut scaler, sequence) {
                    Ok(frame) => {
                        sequence += 1;
                        if let Ok(mut slot) = latest.lock() {
                            *slot = Some(frame);
                        }
                    }
                    Err(e) => log::warn!("Failed to convert camera frame: {e}"),
                }
                if let Some(interval) = self.pacing {
                    thread::sleep(interval);
                }
            }
        }
    }

    fn rewind(&mut self) -> bool {
        if self.ictx.seek(0, ..).is_err() {
            return false;
        }
        self.decoder.flush();
        true
    }
}

/// Empties the shared frame slot when the decode thread returns, so a dead
/// stream never keeps serving its last frame.
struct ClearOnExit<'a>(&'a Mutex<Option<Frame>>);

impl Drop for ClearOnExit<'_> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = None;
        }
    }
}

fn to_rgb_frame(
    decoded: &Video,
    scaler: &mut Option<Scaler>,
    sequence: u64,
) -> Result<Frame, ffmpeg_next::Error> {
    let (width, height, format) = (decoded.width(), decoded.height(), decoded.format());

    let stale = !matches!(
        scaler,
        Some(s) if s.width == width && s.height == height && s.format == format
    );
    if stale {
        let context = scaling::Context::get(
            format,
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )?;
        *scaler = Some(Scaler {
            context,
            width,
            height,
            format,
        });
    }

    let mut rgb = Video::empty();
    if let Some(s) = scaler.as_mut() {
        s.context.run(decoded, &mut rgb)?;
    }
    let pixels = extract_rgb_pixels(&rgb, width, height);
    Ok(Frame::new(pixels, width, height, 3, sequence))
}

/// Strips per-row stride padding into a tightly packed RGB buffer.
fn extract_rgb_pixels(rgb: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

fn unavailable(source: &CameraSource, reason: String) -> AcquisitionError {
    AcquisitionError::Unavailable {
        device: source.name().to_string(),
        reason,
    }
}

fn open_error(source: &CameraSource, error: ffmpeg_next::Error) -> AcquisitionError {
    let reason = error.to_string();
    if reason.contains("Permission denied") {
        AcquisitionError::Denied {
            device: source.name().to_string(),
        }
    } else {
        unavailable(source, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn write_test_clip(path: &Path, frames: usize, width: u32, height: u32) {
        ffmpeg_next::init().unwrap();
        let mut octx = ffmpeg_next::format::output(path).unwrap();
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();
        let mut enc = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        enc.set_width(width);
        enc.set_height(height);
        enc.set_format(Pixel::YUV420P);
        enc.set_time_base(ffmpeg_next::Rational(1, 30));
        enc.set_frame_rate(Some(ffmpeg_next::Rational(30, 1)));
        if global_header {
            enc.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let mut encoder = enc.open_with(ffmpeg_next::Dictionary::new()).unwrap();
        ost.set_parameters(&encoder);
        octx.write_header().unwrap();
        let time_base = octx.stream(0).unwrap().time_base();

        let mut to_yuv = scaling::Context::get(
            Pixel::RGB24,
            width,
            height,
            Pixel::YUV420P,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .unwrap();

        let drain = |encoder: &mut ffmpeg_next::encoder::Video,
                         octx: &mut ffmpeg_next::format::context::Output| {
            let mut packet = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut packet).is_ok() {
                packet.set_stream(0);
                packet.rescale_ts(ffmpeg_next::Rational(1, 30), time_base);
                packet.write_interleaved(octx).unwrap();
            }
        };

        for i in 0..frames {
            let mut rgb = Video::new(Pixel::RGB24, width, height);
            let shade = (i * 50 % 256) as u8;
            rgb.data_mut(0).fill(shade);
            let mut yuv = Video::empty();
            to_yuv.run(&rgb, &mut yuv).unwrap();
            yuv.set_pts(Some(i as i64));
            encoder.send_frame(&yuv).unwrap();
            drain(&mut encoder, &mut octx);
        }
        encoder.send_eof().unwrap();
        drain(&mut encoder, &mut octx);
        octx.write_trailer().unwrap();
    }

    fn wait_for_frame(camera: &mut FfmpegCamera) -> Option<Frame> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(frame) = camera.capture_frame() {
                return Some(frame);
            }
            thread::sleep(Duration::from_millis(10));
        }
        None
    }

    #[test]
    fn test_parse_default_is_device() {
        assert_eq!(
            CameraSource::parse(None),
            CameraSource::Device(default_device().to_string())
        );
        assert_eq!(
            CameraSource::parse(Some("  ")),
            CameraSource::Device(default_device().to_string())
        );
    }

    #[test]
    fn test_parse_url_is_media() {
        assert_eq!(
            CameraSource::parse(Some("rtsp://cam.local/stream")),
            CameraSource::Media("rtsp://cam.local/stream".to_string())
        );
    }

    #[test]
    fn test_parse_existing_file_is_media() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        assert_eq!(CameraSource::parse(Some(&path)), CameraSource::Media(path));
    }

    #[test]
    fn test_parse_unknown_path_is_device() {
        assert_eq!(
            CameraSource::parse(Some("/dev/video7")),
            CameraSource::Device("/dev/video7".to_string())
        );
    }

    #[test]
    fn test_slot_is_emptied_when_decode_thread_exits() {
        let latest = Arc::new(Mutex::new(None));
        let thread_latest = latest.clone();
        thread::spawn(move || {
            let _slot = ClearOnExit(&thread_latest);
            *thread_latest.lock().unwrap() = Some(Frame::new(vec![0; 3], 1, 1, 3, 0));
        })
        .join()
        .unwrap();
        assert!(latest.lock().unwrap().is_none());
    }

    #[test]
    fn test_finished_worker_serves_no_frame() {
        let mut camera = FfmpegCamera::new(CameraSource::Media("clip.mp4".into()));
        *camera.latest.lock().unwrap() = Some(Frame::new(vec![0; 3], 1, 1, 3, 0));
        let worker = thread::spawn(|| {});
        while !worker.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        camera.worker = Some(worker);

        assert!(!camera.is_streaming());
        assert!(camera.capture_frame().is_none());
        camera.stop();
    }

    #[test]
    fn test_missing_media_fails_to_start() {
        let mut camera = FfmpegCamera::new(CameraSource::Media("/nonexistent/clip.mp4".into()));
        let result = camera.start(640, 480);
        assert!(matches!(result, Err(AcquisitionError::Unavailable { .. })));
        assert!(!camera.is_streaming());
        assert!(camera.capture_frame().is_none());
    }

    #[test]
    fn test_media_source_streams_native_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        write_test_clip(&path, 4, 160, 120);

        let mut camera = FfmpegCamera::new(CameraSource::Media(path.to_str().unwrap().into()));
        camera.start(640, 480).unwrap();
        assert!(camera.is_streaming());

        let frame = wait_for_frame(&mut camera).expect("no frame decoded");
        assert_eq!((frame.width(), frame.height(), frame.channels()), (160, 120, 3));
        assert_eq!(frame.data().len(), 160 * 120 * 3);

        camera.stop();
        assert!(!camera.is_streaming());
        assert!(camera.capture_frame().is_none());
        camera.stop();
    }
}
