//! Camera QR scanning for the send flow.
//!
//! `scan` grabs a frame on every tick and hands it to a decoder until
//! something decodes or the scan dialog is closed. The camera stream is
//! stopped on every way out of the loop.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};

use super::invoice::normalize_invoice;

/// Roughly one animation frame.
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Grayscale frame as handed over by the camera backend.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
}

pub trait CameraStream: Send {
    /// Latest frame, or `None` if the camera has nothing yet.
    fn grab(&mut self) -> Option<Frame>;
    /// Stops every track of the stream. Called exactly once.
    fn stop(&mut self);
}

#[async_trait]
pub trait CameraProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn CameraStream>, ScanError>;
}

pub trait FrameDecoder: Send + Sync {
    fn decode(&self, frame: &Frame) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("Camera access was denied. Allow camera access or paste the invoice instead.")]
    PermissionDenied,
    #[error("No camera was found. Paste the invoice instead.")]
    NoCamera,
    #[error("The camera could not be started: {0}")]
    Device(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Decoded(String),
    Closed,
    /// Scanner disabled; the message explains why.
    Unavailable(String),
}

impl ScanOutcome {
    /// Outcome reported by a camera loop running elsewhere (the browser):
    /// `decoded`, `closed`, `denied`, `no_camera`, anything else is a device
    /// failure described by `detail`.
    pub fn from_report(kind: &str, payload: &str, detail: &str) -> ScanOutcome {
        let unavailable = |e: ScanError| ScanOutcome::Unavailable(e.to_string());

        match kind.trim() {
            "decoded" => ScanOutcome::Decoded(payload.to_string()),
            "closed" => ScanOutcome::Closed,
            "denied" => unavailable(ScanError::PermissionDenied),
            "no_camera" => unavailable(ScanError::NoCamera),
            _ => {
                let detail = detail.trim();
                let detail = if detail.is_empty() { "unknown error" } else { detail };
                unavailable(ScanError::Device(detail.to_string()))
            }
        }
    }

    /// The decoded payload as a Lightning invoice, for autofilling the pay form.
    pub fn invoice(&self) -> Option<String> {
        match self {
            ScanOutcome::Decoded(text) => normalize_invoice(text),
            _ => None,
        }
    }
}

/// Owner side of an open scan dialog. Closing it, or dropping it, ends the
/// scan loop.
pub struct ScanDialog {
    close_tx: watch::Sender<bool>,
}

impl ScanDialog {
    pub fn open() -> (ScanDialog, watch::Receiver<bool>) {
        let (close_tx, close_rx) = watch::channel(false);
        (ScanDialog { close_tx }, close_rx)
    }

    pub fn close(&self) {
        let _ = self.close_tx.send(true);
    }
}

struct StreamGuard(Box<dyn CameraStream>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.stop();
        tracing::debug!("camera stream released");
    }
}

async fn closed(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        // sender gone means the dialog went away
        if rx.changed().await.is_err() {
            return;
        }
    }
}

pub async fn scan(
    camera: &dyn CameraProvider,
    decoder: &dyn FrameDecoder,
    tick: Duration,
    mut close: watch::Receiver<bool>,
) -> ScanOutcome {
    let opened = tokio::select! {
        biased;
        _ = closed(&mut close) => return ScanOutcome::Closed,
        res = camera.open() => res,
    };

    let mut stream = match opened {
        Ok(s) => StreamGuard(s),
        Err(e) => {
            tracing::warn!(error = %e, "qr scanner unavailable");
            return ScanOutcome::Unavailable(e.to_string());
        }
    };

    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = closed(&mut close) => return ScanOutcome::Closed,
            _ = ticker.tick() => {
                let Some(frame) = stream.0.grab() else {
                    continue;
                };
                if let Some(text) = decoder.decode(&frame) {
                    return ScanOutcome::Decoded(text);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[derive(Clone, Default)]
    struct CameraLog {
        active: Arc<AtomicBool>,
        grabs: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    struct FakeStream(CameraLog);

    impl CameraStream for FakeStream {
        fn grab(&mut self) -> Option<Frame> {
            let n = self.0.grabs.fetch_add(1, Ordering::SeqCst);
            Some(Frame {
                width: 1,
                height: 1,
                luma: vec![n as u8],
            })
        }

        fn stop(&mut self) {
            self.0.active.store(false, Ordering::SeqCst);
            self.0.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeCamera {
        log: CameraLog,
        deny: bool,
    }

    #[async_trait]
    impl CameraProvider for FakeCamera {
        async fn open(&self) -> Result<Box<dyn CameraStream>, ScanError> {
            if self.deny {
                return Err(ScanError::PermissionDenied);
            }
            self.log.active.store(true, Ordering::SeqCst);
            Ok(Box::new(FakeStream(self.log.clone())))
        }
    }

    /// Decodes `payload` once the frame counter reaches `at`.
    struct DecodeAt {
        at: Option<u8>,
        payload: String,
    }

    impl FrameDecoder for DecodeAt {
        fn decode(&self, frame: &Frame) -> Option<String> {
            match self.at {
                Some(at) if frame.luma.first() == Some(&at) => Some(self.payload.clone()),
                _ => None,
            }
        }
    }

    const INV: &str = "lnbc2500u1pvjluezpp5qqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqypq";

    #[tokio::test(start_paused = true)]
    async fn decodes_and_releases_the_camera() {
        let log = CameraLog::default();
        let camera = FakeCamera { log: log.clone(), deny: false };
        let decoder = DecodeAt {
            at: Some(3),
            payload: format!("lightning:{INV}"),
        };
        let (_dialog, rx) = ScanDialog::open();

        let outcome = scan(&camera, &decoder, DEFAULT_TICK, rx).await;

        assert_eq!(outcome.invoice().as_deref(), Some(INV));
        assert_eq!(log.grabs.load(Ordering::SeqCst), 4);
        assert!(!log.active.load(Ordering::SeqCst));
        assert_eq!(log.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_the_dialog_stops_within_one_tick() {
        let log = CameraLog::default();
        let camera = Arc::new(FakeCamera { log: log.clone(), deny: false });
        let decoder = Arc::new(DecodeAt { at: None, payload: String::new() });
        let (dialog, rx) = ScanDialog::open();

        let handle = {
            let camera = camera.clone();
            let decoder = decoder.clone();
            tokio::spawn(async move { scan(camera.as_ref(), decoder.as_ref(), DEFAULT_TICK, rx).await })
        };

        tokio::time::sleep(DEFAULT_TICK * 5).await;
        assert!(log.active.load(Ordering::SeqCst));
        let grabs_at_close = log.grabs.load(Ordering::SeqCst);

        dialog.close();
        let outcome = tokio::time::timeout(DEFAULT_TICK, handle)
            .await
            .expect("scan loop should end within one tick")
            .unwrap();

        assert_eq!(outcome, ScanOutcome::Closed);
        assert!(!log.active.load(Ordering::SeqCst));
        assert_eq!(log.stops.load(Ordering::SeqCst), 1);
        assert!(log.grabs.load(Ordering::SeqCst) <= grabs_at_close + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_dialog_counts_as_close() {
        let log = CameraLog::default();
        let camera = FakeCamera { log: log.clone(), deny: false };
        let decoder = DecodeAt { at: None, payload: String::new() };
        let (dialog, rx) = ScanDialog::open();

        let scan_fut = scan(&camera, &decoder, DEFAULT_TICK, rx);
        let drop_later = async move {
            tokio::time::sleep(DEFAULT_TICK * 2).await;
            drop(dialog);
        };

        let (outcome, _) = tokio::join!(scan_fut, drop_later);
        assert_eq!(outcome, ScanOutcome::Closed);
        assert!(!log.active.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_before_start_never_opens_the_camera() {
        let log = CameraLog::default();
        let camera = FakeCamera { log: log.clone(), deny: false };
        let decoder = DecodeAt { at: Some(0), payload: INV.to_string() };
        let (dialog, rx) = ScanDialog::open();
        dialog.close();

        assert_eq!(scan(&camera, &decoder, DEFAULT_TICK, rx).await, ScanOutcome::Closed);
        assert_eq!(log.grabs.load(Ordering::SeqCst), 0);
        assert_eq!(log.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn permission_denied_degrades_to_unavailable() {
        let camera = FakeCamera { log: CameraLog::default(), deny: true };
        let decoder = DecodeAt { at: Some(0), payload: INV.to_string() };
        let (_dialog, rx) = ScanDialog::open();

        let outcome = scan(&camera, &decoder, DEFAULT_TICK, rx).await;
        let ScanOutcome::Unavailable(msg) = outcome else {
            panic!("expected unavailable, got {outcome:?}");
        };
        assert!(msg.contains("denied"));
    }

    #[test]
    fn reported_outcomes_map_to_scan_errors() {
        assert_eq!(
            ScanOutcome::from_report("denied", "", ""),
            ScanOutcome::Unavailable(ScanError::PermissionDenied.to_string())
        );
        assert_eq!(
            ScanOutcome::from_report("no_camera", "", ""),
            ScanOutcome::Unavailable(ScanError::NoCamera.to_string())
        );
        assert_eq!(ScanOutcome::from_report("closed", "x", ""), ScanOutcome::Closed);

        let ScanOutcome::Unavailable(msg) = ScanOutcome::from_report("error", "", "track ended") else {
            panic!("expected unavailable");
        };
        assert!(msg.contains("track ended"));

        let decoded = ScanOutcome::from_report("decoded", &format!("lightning:{INV}"), "");
        assert_eq!(decoded.invoice().as_deref(), Some(INV));
    }

    #[test]
    fn non_invoice_payloads_do_not_autofill() {
        assert_eq!(ScanOutcome::Decoded("hello".to_string()).invoice(), None);
        assert_eq!(ScanOutcome::Closed.invoice(), None);
    }
}
