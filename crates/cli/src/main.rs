use std::io::BufRead;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use crossbeam_channel::Sender;

use rollcall_core::attendance::domain::catalog::Catalog;
use rollcall_core::attendance::domain::class_resolver::{active_class_ids, active_sessions};
use rollcall_core::attendance::infrastructure::http_catalog::HttpCatalog;
use rollcall_core::attendance::infrastructure::http_checkin_client::HttpCheckinClient;
use rollcall_core::capture::domain::frame_extractor::FrameExtractor;
use rollcall_core::capture::infrastructure::ffmpeg_camera::{CameraSource, FfmpegCamera};
use rollcall_core::capture::infrastructure::interval_scheduler::IntervalScheduler;
use rollcall_core::capture::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
use rollcall_core::kiosk::capture_controller::{CaptureController, ControllerConfig};
use rollcall_core::kiosk::infrastructure::threaded_kiosk_runner::ThreadedKioskRunner;
use rollcall_core::kiosk::kiosk_notifier::LogNotifier;
use rollcall_core::kiosk::kiosk_runner::KioskCommand;
use rollcall_core::kiosk::run_kiosk_use_case::RunKioskUseCase;
use rollcall_core::overlay::domain::overlay_renderer::{
    NullOverlaySurface, OverlayRenderer, OverlaySurface,
};
use rollcall_core::overlay::infrastructure::frame_painter::FramePainter;
use rollcall_core::overlay::infrastructure::label_font::load_label_font;
use rollcall_core::overlay::infrastructure::snapshot_surface::SnapshotOverlaySurface;
use rollcall_core::recognition::infrastructure::http_face_recognizer::HttpFaceRecognizer;
use rollcall_core::shared::api_client::ApiClient;
use rollcall_core::shared::clock::{Clock, SystemClock};
use rollcall_core::shared::settings::Settings;

const COMMAND_HELP: &str =
    "Commands: start | stop | session <id|none> | class <id,id,...> | quit";

/// Face-recognition attendance kiosk.
///
/// Captures frames from a camera, recognizes faces through the attendance
/// backend and checks recognized students in automatically. Control the
/// running kiosk with commands on stdin.
#[derive(Parser)]
#[command(name = "rollcall")]
struct Cli {
    /// Backend base URL (e.g. http://localhost:8000).
    #[arg(long)]
    backend: Option<String>,

    /// Capture device or media URL/file. Defaults to the platform camera.
    #[arg(long)]
    device: Option<String>,

    /// Pin check-ins to this session id.
    #[arg(long)]
    session: Option<i64>,

    /// Check in to these class ids (comma-separated).
    #[arg(long = "class", value_delimiter = ',')]
    classes: Option<Vec<String>>,

    /// Write annotated snapshots (latest.jpg) to this directory.
    #[arg(long)]
    overlay_dir: Option<PathBuf>,

    /// TrueType font for snapshot labels. Defaults to a system font.
    #[arg(long)]
    label_font: Option<PathBuf>,

    /// Timer interval between capture ticks, in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Minimum spacing between executed ticks, in milliseconds.
    #[arg(long)]
    min_spacing_ms: Option<u64>,

    /// JPEG quality for uploaded frames (1-100).
    #[arg(long)]
    quality: Option<u8>,

    /// Print today's active sessions and classes, then exit.
    #[arg(long)]
    list_active: bool,

    /// Persist --backend, --device and timing options as the new defaults.
    #[arg(long)]
    save: bool,

    /// Wait for a `start` command instead of opening the camera right away.
    #[arg(long)]
    paused: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut settings = Settings::load();
    apply_overrides(&mut settings, &cli);
    if cli.save {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }

    let client = ApiClient::new(&settings.backend_base_url, settings.request_timeout())?;
    log::info!("Using backend {}", client.base_url());
    let catalog = Catalog::load(&HttpCatalog::new(client.clone()));

    if cli.list_active {
        print_active(&catalog, &SystemClock);
        return Ok(());
    }

    let controller = build_controller(&settings, &cli, catalog)?;
    let runner = ThreadedKioskRunner::new(
        Arc::new(HttpFaceRecognizer::new(client.clone())),
        Arc::new(HttpCheckinClient::new(client)),
        Box::new(IntervalScheduler::new(settings.tick_interval())),
    );

    let (commands_tx, commands_rx) = crossbeam_channel::unbounded();
    if cli.session.is_some() {
        commands_tx.send(KioskCommand::SelectSession(cli.session))?;
    }
    if let Some(classes) = cli.classes {
        commands_tx.send(KioskCommand::SelectClasses(classes))?;
    }
    if !cli.paused {
        commands_tx.send(KioskCommand::Start)?;
    }
    spawn_stdin_reader(commands_tx);
    eprintln!("{COMMAND_HELP}");

    let mut use_case = RunKioskUseCase::new(controller, Box::new(runner));
    use_case.execute(commands_rx);
    Ok(())
}

fn build_controller(
    settings: &Settings,
    cli: &Cli,
    catalog: Catalog,
) -> Result<CaptureController, Box<dyn std::error::Error>> {
    let source = CameraSource::parse(settings.camera_device.as_deref());
    log::info!("Camera source: {}", source.name());
    let extractor = FrameExtractor::new(
        Box::new(FfmpegCamera::new(source)),
        Box::new(JpegFrameEncoder::new(settings.jpeg_quality)),
    );

    let surface: Box<dyn OverlaySurface> = match &cli.overlay_dir {
        Some(dir) => {
            let font = load_label_font(settings.label_font.as_deref());
            let surface = SnapshotOverlaySurface::new(dir, FramePainter::with_font(font))?;
            log::info!("Writing annotated snapshots to {}", surface.path().display());
            Box::new(surface)
        }
        None => Box::new(NullOverlaySurface),
    };

    let (width, height) = settings.capture_resolution();
    let config = ControllerConfig {
        width,
        height,
        min_tick_spacing: settings.min_tick_spacing(),
    };

    Ok(CaptureController::new(
        extractor,
        OverlayRenderer::new(surface),
        Box::new(LogNotifier::new()),
        Arc::new(SystemClock),
        catalog,
        config,
    ))
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(url) = &cli.backend {
        settings.set_backend_base_url(url);
    }
    if let Some(device) = &cli.device {
        settings.camera_device = Some(device.clone());
    }
    if let Some(ms) = cli.interval_ms {
        settings.tick_interval_ms = ms;
    }
    if let Some(ms) = cli.min_spacing_ms {
        settings.min_tick_spacing_ms = ms;
    }
    if let Some(quality) = cli.quality {
        settings.jpeg_quality = quality;
    }
    if let Some(font) = &cli.label_font {
        settings.label_font = Some(font.clone());
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(q) = cli.quality {
        if !(1..=100).contains(&q) {
            return Err(format!("Quality must be between 1 and 100, got {q}").into());
        }
    }
    if cli.interval_ms == Some(0) {
        return Err("Tick interval must be greater than 0".into());
    }
    if let Some(classes) = &cli.classes {
        if classes.len() > 1 && cli.session.is_some() {
            log::warn!("Several classes selected; --session {:?} is ignored", cli.session);
        }
    }
    Ok(())
}

fn print_active(catalog: &Catalog, clock: &dyn Clock) {
    let now = clock.local_now();
    let sessions = active_sessions(&catalog.sessions, now);
    if sessions.is_empty() {
        println!("No active sessions on {}", now.date());
        return;
    }

    println!("Active sessions on {}:", now.date());
    for session in sessions {
        let class = session
            .class_id
            .as_deref()
            .map(|id| catalog.class_name(id))
            .unwrap_or("-");
        println!(
            "  {:>5}  {}  {}-{}",
            session.session_id,
            class,
            session.start_time.format("%H:%M"),
            session.end_time.format("%H:%M")
        );
    }

    println!("Active classes:");
    for class_id in active_class_ids(&catalog.sessions, now) {
        println!("  {class_id}  {}", catalog.class_name(&class_id));
    }
}

/// Forwards operator commands from stdin. End of input shuts the kiosk down.
fn spawn_stdin_reader(commands: Sender<KioskCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_command(&line) {
                Ok(Some(command)) => {
                    let shutdown = command == KioskCommand::Shutdown;
                    if commands.send(command).is_err() || shutdown {
                        return;
                    }
                }
                Ok(None) => {}
                Err(message) => eprintln!("{message}\n{COMMAND_HELP}"),
            }
        }
        let _ = commands.send(KioskCommand::Shutdown);
    });
}

fn parse_command(line: &str) -> Result<Option<KioskCommand>, String> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));
    if verb.is_empty() {
        return Ok(None);
    }

    match verb.to_lowercase().as_str() {
        "start" => Ok(Some(KioskCommand::Start)),
        "stop" => Ok(Some(KioskCommand::Stop)),
        "quit" | "exit" => Ok(Some(KioskCommand::Shutdown)),
        "session" => parse_session(rest).map(|id| Some(KioskCommand::SelectSession(id))),
        "class" | "classes" => {
            let ids = rest
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            Ok(Some(KioskCommand::SelectClasses(ids)))
        }
        "help" => {
            eprintln!("{COMMAND_HELP}");
            Ok(None)
        }
        other => Err(format!("Unknown command '{other}'")),
    }
}

/// `session` takes exactly one id, or `none` (or nothing) to unpin.
fn parse_session(arg: &str) -> Result<Option<i64>, String> {
    let mut tokens = arg.split_whitespace();
    let (id, extra) = (tokens.next(), tokens.next());
    if extra.is_some() {
        return Err(format!("Expected one session id, got '{arg}'"));
    }
    match id {
        None | Some("none") => Ok(None),
        Some(id) => id
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("Invalid session id '{id}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_command("start"), Ok(Some(KioskCommand::Start)));
        assert_eq!(parse_command(" STOP "), Ok(Some(KioskCommand::Stop)));
        assert_eq!(parse_command("quit"), Ok(Some(KioskCommand::Shutdown)));
        assert_eq!(parse_command(""), Ok(None));
    }

    #[test]
    fn test_parse_session() {
        assert_eq!(
            parse_command("session 12"),
            Ok(Some(KioskCommand::SelectSession(Some(12))))
        );
        assert_eq!(
            parse_command("session none"),
            Ok(Some(KioskCommand::SelectSession(None)))
        );
        assert!(parse_command("session abc").is_err());
    }

    #[test]
    fn test_session_rejects_extra_tokens() {
        assert!(parse_command("session 1 2").is_err());
        assert!(parse_command("session none 3").is_err());
    }

    #[test]
    fn test_parse_classes() {
        assert_eq!(
            parse_command("class C1"),
            Ok(Some(KioskCommand::SelectClasses(vec!["C1".into()])))
        );
        assert_eq!(
            parse_command("class C1, C2"),
            Ok(Some(KioskCommand::SelectClasses(vec![
                "C1".into(),
                "C2".into()
            ])))
        );
    }

    #[test]
    fn test_parse_classes_separated_by_spaces() {
        let expected = Ok(Some(KioskCommand::SelectClasses(vec![
            "C1".into(),
            "C2".into(),
            "C3".into(),
        ])));
        assert_eq!(parse_command("class C1 C2 C3"), expected);
        assert_eq!(parse_command("classes C1,C2  ,C3"), expected);
        assert_eq!(
            parse_command("class"),
            Ok(Some(KioskCommand::SelectClasses(vec![])))
        );
    }

    #[test]
    fn test_unknown_command_is_error() {
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_overrides_apply_to_settings() {
        let cli = Cli::parse_from([
            "rollcall",
            "--backend",
            "http://api.local:9000/",
            "--device",
            "/dev/video2",
            "--interval-ms",
            "1200",
            "--quality",
            "60",
            "--label-font",
            "/fonts/Label.ttf",
        ]);
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings.backend_base_url, "http://api.local:9000");
        assert_eq!(settings.camera_device.as_deref(), Some("/dev/video2"));
        assert_eq!(settings.tick_interval_ms, 1200);
        assert_eq!(settings.jpeg_quality, 60);
        assert_eq!(settings.label_font, Some(PathBuf::from("/fonts/Label.ttf")));
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let cli = Cli::parse_from(["rollcall", "--quality", "0"]);
        assert!(validate(&cli).is_err());
    }
}
