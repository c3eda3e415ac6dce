use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{never, select, Receiver, Sender};

use crate::attendance::domain::attendance_record::CheckinOutcome;
use crate::attendance::domain::checkin_service::{CheckinError, CheckinService};
use crate::capture::domain::scheduler::Scheduler;
use crate::kiosk::capture_controller::{CaptureController, CaptureState, Job, Ticket};
use crate::kiosk::kiosk_runner::{KioskCommand, KioskRunner};
use crate::recognition::domain::face_match::Recognition;
use crate::recognition::domain::face_recognizer::{FaceRecognizer, RecognitionError};

/// Result of a job, posted back to the event thread.
enum Completion {
    Recognized(Ticket, Result<Recognition, RecognitionError>),
    CheckedIn(Ticket, Result<CheckinOutcome, CheckinError>),
}

/// Runs the controller on the calling thread and network jobs on worker
/// threads.
///
/// Layout: `commands + ticks + completions → event loop [controller] → workers`
///
/// The event loop is the controller's only caller, so the controller needs
/// no locking. Ticks come from the scheduler while capture is on and from
/// `never()` otherwise.
pub struct ThreadedKioskRunner {
    recognizer: Arc<dyn FaceRecognizer>,
    checkin: Arc<dyn CheckinService>,
    scheduler: Box<dyn Scheduler>,
}

impl ThreadedKioskRunner {
    pub fn new(
        recognizer: Arc<dyn FaceRecognizer>,
        checkin: Arc<dyn CheckinService>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            recognizer,
            checkin,
            scheduler,
        }
    }

    fn dispatch(&self, job: Job, done_tx: &Sender<Completion>) {
        let done_tx = done_tx.clone();
        match job {
            Job::Recognize { ticket, image } => {
                let recognizer = self.recognizer.clone();
                std::thread::spawn(move || {
                    let result = recognizer.recognize(&image);
                    let _ = done_tx.send(Completion::Recognized(ticket, result));
                });
            }
            Job::Checkin {
                ticket,
                image,
                target,
            } => {
                let checkin = self.checkin.clone();
                std::thread::spawn(move || {
                    let result = checkin.check_in(&image, &target);
                    let _ = done_tx.send(Completion::CheckedIn(ticket, result));
                });
            }
        }
    }
}

impl KioskRunner for ThreadedKioskRunner {
    fn run(&self, controller: &mut CaptureController, commands: Receiver<KioskCommand>) {
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<Completion>();
        let mut ticks: Receiver<Instant> = never();
        let mut outstanding: usize = 0;

        loop {
            select! {
                recv(commands) -> command => match command {
                    Ok(KioskCommand::Start) => {
                        if controller.start().is_ok() {
                            ticks = self.scheduler.ticks();
                        }
                    }
                    Ok(KioskCommand::Stop) => {
                        controller.stop();
                        ticks = never();
                    }
                    Ok(KioskCommand::SelectSession(session_id)) => controller.select_session(session_id),
                    Ok(KioskCommand::SelectClasses(class_ids)) => controller.select_classes(class_ids),
                    Ok(KioskCommand::Shutdown) | Err(_) => break,
                },
                recv(ticks) -> tick => {
                    if tick.is_ok() {
                        if let Some(job) = controller.on_tick() {
                            self.dispatch(job, &done_tx);
                            outstanding += 1;
                        }
                        if controller.capture_state() != CaptureState::On {
                            ticks = never();
                        }
                    }
                },
                recv(done_rx) -> completion => {
                    if let Ok(completion) = completion {
                        outstanding -= 1;
                        if let Some(job) = apply(controller, completion) {
                            self.dispatch(job, &done_tx);
                            outstanding += 1;
                        }
                    }
                },
            }
        }

        controller.stop();

        // Late results belong to the stopped session and are discarded.
        while outstanding > 0 {
            match done_rx.recv() {
                Ok(completion) => {
                    outstanding -= 1;
                    let _ = apply(controller, completion);
                }
                Err(_) => break,
            }
        }
    }
}

fn apply(controller: &mut CaptureController, completion: Completion) -> Option<Job> {
    match completion {
        Completion::Recognized(ticket, result) => controller.on_recognition(ticket, result),
        Completion::CheckedIn(ticket, result) => {
            controller.on_checkin(ticket, result);
            None
        }
    }
}
