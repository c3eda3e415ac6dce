use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::attendance::domain::attendance_record::CheckinOutcome;
use crate::attendance::domain::catalog::Catalog;
use crate::attendance::domain::checkin_service::{CheckinError, CheckinTarget};
use crate::attendance::domain::class_resolver::ClassSelection;
use crate::attendance::domain::dedup_ledger::DedupLedger;
use crate::capture::domain::camera::AcquisitionError;
use crate::capture::domain::frame_extractor::FrameExtractor;
use crate::capture::domain::tick_gate::TickGate;
use crate::kiosk::kiosk_error::KioskError;
use crate::kiosk::kiosk_notifier::KioskNotifier;
use crate::overlay::domain::overlay::Overlay;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::recognition::domain::face_match::{Recognition, RecognizedIdentity};
use crate::recognition::domain::face_recognizer::RecognitionError;
use crate::shared::clock::Clock;
use crate::shared::constants::{CAPTURE_HEIGHT, CAPTURE_WIDTH, MIN_TICK_SPACING};
use crate::shared::encoded_frame::EncodedFrame;
use crate::shared::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Off,
    Starting,
    On,
}

/// What the loop is waiting on. Only one network call is ever in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Recognizing,
    CheckingIn,
}

/// Identifies the capture session a job was issued under.
///
/// Every stop starts a new generation, so results carrying an older ticket
/// are dropped on arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Network work requested by the controller. The runner executes it and
/// reports back through `on_recognition` / `on_checkin`.
#[derive(Clone, Debug)]
pub enum Job {
    Recognize {
        ticket: Ticket,
        image: Arc<EncodedFrame>,
    },
    Checkin {
        ticket: Ticket,
        image: Arc<EncodedFrame>,
        target: CheckinTarget,
    },
}

/// Matched students of the latest recognition and when it arrived.
#[derive(Clone, Debug, PartialEq)]
pub struct LastRecognition {
    pub identities: Vec<RecognizedIdentity>,
    pub at: NaiveDateTime,
}

#[derive(Clone, Copy, Debug)]
pub struct ControllerConfig {
    pub width: u32,
    pub height: u32,
    pub min_tick_spacing: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
            min_tick_spacing: MIN_TICK_SPACING,
        }
    }
}

/// Frame and image of the recognition call currently in flight.
struct PendingCycle {
    frame: Frame,
    image: Arc<EncodedFrame>,
}

/// Single-writer state machine behind the capture loop.
///
/// Owns the camera, the overlay, the check-in ledger and the operator's
/// class selection. It performs no I/O of its own: ticks and network
/// results are fed in, and network work comes out as [`Job`]s. Because
/// every mutation goes through `&mut self`, the runner's event thread is
/// the only writer.
pub struct CaptureController {
    extractor: FrameExtractor,
    overlay: OverlayRenderer,
    notifier: Box<dyn KioskNotifier>,
    clock: Arc<dyn Clock>,
    catalog: Catalog,
    config: ControllerConfig,
    gate: TickGate,
    selection: ClassSelection,
    ledger: DedupLedger,
    capture: CaptureState,
    cycle: CycleState,
    generation: u64,
    pending: Option<PendingCycle>,
    faces_count: usize,
    recognized_count: usize,
    message: String,
    last_recognition: Option<LastRecognition>,
    last_status: Option<&'static str>,
}

impl CaptureController {
    pub fn new(
        extractor: FrameExtractor,
        overlay: OverlayRenderer,
        notifier: Box<dyn KioskNotifier>,
        clock: Arc<dyn Clock>,
        catalog: Catalog,
        config: ControllerConfig,
    ) -> Self {
        Self {
            extractor,
            overlay,
            notifier,
            clock,
            catalog,
            gate: TickGate::new(config.min_tick_spacing),
            config,
            selection: ClassSelection::default(),
            ledger: DedupLedger::new(),
            capture: CaptureState::Off,
            cycle: CycleState::Idle,
            generation: 0,
            pending: None,
            faces_count: 0,
            recognized_count: 0,
            message: String::new(),
            last_recognition: None,
            last_status: None,
        }
    }

    /// Acquires the camera. A no-op while capture is already running.
    ///
    /// On failure nothing stays acquired and capture is back to `Off`.
    pub fn start(&mut self) -> Result<(), AcquisitionError> {
        if self.capture != CaptureState::Off {
            return Ok(());
        }
        self.capture = CaptureState::Starting;
        self.reset_session();
        self.refresh_status();

        if let Err(e) = self.extractor.start(self.config.width, self.config.height) {
            self.extractor.stop();
            self.capture = CaptureState::Off;
            self.message = e.to_string();
            self.notifier.error(&KioskError::from(e.clone()));
            self.refresh_status();
            return Err(e);
        }

        self.gate.reset();
        self.capture = CaptureState::On;
        log::info!(
            "Capture started at {}x{}",
            self.config.width,
            self.config.height
        );
        self.refresh_status();
        Ok(())
    }

    /// Releases the camera and clears everything shown for this session.
    ///
    /// Idempotent. An in-flight call is not cancelled; its result will
    /// carry a stale ticket and be dropped.
    pub fn stop(&mut self) {
        let was_running = self.capture != CaptureState::Off;
        self.extractor.stop();
        self.capture = CaptureState::Off;
        self.generation += 1;
        self.reset_session();
        if was_running {
            log::info!("Capture stopped");
        }
        self.refresh_status();
    }

    /// Handles one timer tick, returning a recognition job if it executes.
    ///
    /// A tick executes only while capture is on, no call is in flight, and
    /// the minimum spacing since the last executed tick has passed. A tick
    /// that finds no frame is spent without issuing work.
    pub fn on_tick(&mut self) -> Option<Job> {
        if self.capture != CaptureState::On {
            return None;
        }
        if !self.extractor.is_streaming() {
            self.lose_camera();
            return None;
        }
        if self.cycle != CycleState::Idle {
            log::debug!("Tick skipped: {:?} in flight", self.cycle);
            return None;
        }
        if !self.gate.try_pass(self.clock.now()) {
            log::debug!("Tick skipped: spacing");
            return None;
        }

        let captured = self.extractor.extract()?;
        let image = captured.encoded.clone();
        self.pending = Some(PendingCycle {
            frame: captured.raw,
            image: captured.encoded,
        });
        self.cycle = CycleState::Recognizing;
        self.refresh_status();
        Some(Job::Recognize {
            ticket: self.ticket(),
            image,
        })
    }

    /// Applies a recognition result, returning a check-in job when someone
    /// was recognized.
    pub fn on_recognition(
        &mut self,
        ticket: Ticket,
        result: Result<Recognition, RecognitionError>,
    ) -> Option<Job> {
        if self.cycle != CycleState::Recognizing {
            log::debug!("Ignoring recognition result while {:?}", self.cycle);
            return None;
        }
        self.cycle = CycleState::Idle;
        let pending = self.pending.take();

        if !self.is_current(ticket) {
            log::debug!("Discarding recognition result from a stopped session");
            self.refresh_status();
            return None;
        }

        let job = match result {
            Ok(recognition) => self.apply_recognition(recognition, pending),
            Err(e) => {
                self.recognized_count = 0;
                self.faces_count = 0;
                self.last_recognition = None;
                self.message = e.to_string();
                self.overlay.clear();
                self.notifier.error(&KioskError::from(e));
                None
            }
        };
        self.refresh_status();
        job
    }

    /// Merges a check-in result into the ledger. Failures are reported and
    /// never retried.
    pub fn on_checkin(&mut self, ticket: Ticket, result: Result<CheckinOutcome, CheckinError>) {
        if self.cycle != CycleState::CheckingIn {
            log::debug!("Ignoring check-in result while {:?}", self.cycle);
            return;
        }
        self.cycle = CycleState::Idle;

        if !self.is_current(ticket) {
            log::debug!("Discarding check-in result from a stopped session");
            self.refresh_status();
            return;
        }

        match result {
            Ok(outcome) => {
                log::debug!(
                    "Check-in created {} attendances: {}",
                    outcome.attendances_created,
                    outcome.message
                );
                for record in outcome.attendances {
                    if self.ledger.contains(&record.student_id) {
                        continue;
                    }
                    let shown = record.clone();
                    if self.ledger.admit(record) {
                        self.notifier.checked_in(&shown);
                    }
                }
            }
            Err(e) => self.notifier.error(&KioskError::from(e)),
        }
        self.refresh_status();
    }

    pub fn select_session(&mut self, session_id: Option<i64>) {
        self.selection.select_session(session_id, &self.catalog);
        log::info!(
            "Selected session {:?}, classes {:?}",
            self.selection.session_id(),
            self.selection.class_ids()
        );
    }

    pub fn select_classes(&mut self, class_ids: Vec<String>) {
        self.selection.select_classes(class_ids);
        log::info!(
            "Selected classes {:?}, session {:?}",
            self.selection.class_ids(),
            self.selection.session_id()
        );
    }

    /// One-line status for the operator.
    pub fn status_text(&self) -> &'static str {
        match (self.capture, self.cycle) {
            (CaptureState::On, CycleState::CheckingIn) => "Checking in...",
            (CaptureState::On, CycleState::Recognizing) => "Recognizing...",
            (CaptureState::On, CycleState::Idle) => "Ready",
            (CaptureState::Starting, _) => "Starting camera...",
            (CaptureState::Off, _) => "Camera off",
        }
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    pub fn cycle_state(&self) -> CycleState {
        self.cycle
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &ClassSelection {
        &self.selection
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.current()
    }

    pub fn faces_count(&self) -> usize {
        self.faces_count
    }

    pub fn recognized_count(&self) -> usize {
        self.recognized_count
    }

    /// Latest message from the recognition service, or the latest error.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn last_recognition(&self) -> Option<&LastRecognition> {
        self.last_recognition.as_ref()
    }

    pub fn notifier(&self) -> &dyn KioskNotifier {
        self.notifier.as_ref()
    }

    fn apply_recognition(
        &mut self,
        recognition: Recognition,
        pending: Option<PendingCycle>,
    ) -> Option<Job> {
        self.faces_count = recognition.faces_count();
        self.recognized_count = recognition.recognized_count;
        self.message = recognition.message.clone();
        self.last_recognition = Some(LastRecognition {
            identities: recognition.identities().cloned().collect(),
            at: self.clock.local_now(),
        });
        match &pending {
            Some(p) => {
                self.overlay.render(&p.frame, &recognition);
            }
            None => self.overlay.clear(),
        }
        self.notifier.recognized(&recognition);

        if !recognition.has_recognized() {
            return None;
        }
        let image = pending?.image;
        self.cycle = CycleState::CheckingIn;
        Some(Job::Checkin {
            ticket: self.ticket(),
            image,
            target: self.selection.checkin_target(&self.catalog),
        })
    }

    /// The stream ended without a stop: capture goes off as if stopped,
    /// and the operator sees why.
    fn lose_camera(&mut self) {
        let error = AcquisitionError::Lost;
        self.stop();
        self.message = error.to_string();
        self.notifier.error(&KioskError::from(error));
    }

    fn reset_session(&mut self) {
        self.ledger.clear();
        self.overlay.clear();
        self.faces_count = 0;
        self.recognized_count = 0;
        self.message.clear();
        self.last_recognition = None;
    }

    fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.capture == CaptureState::On && ticket == self.ticket()
    }

    fn refresh_status(&mut self) {
        let status = self.status_text();
        if self.last_status != Some(status) {
            self.last_status = Some(status);
            self.notifier.status(status);
        }
    }
}
