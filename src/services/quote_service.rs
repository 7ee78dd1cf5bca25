//! Debounced fee-quote recalculation with last-request-wins reconciliation.
//!
//! Each request for a draft gets a sequence number from a counter that only
//! grows. A request that is no longer the latest for its draft when its
//! debounce window ends never reaches the API, and a response that comes back
//! after a newer request was issued is dropped.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{
    error::ApiError,
    models::{Direction, FeeQuote, QuoteInput},
};

use super::wallet_api::WalletApiClient;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, token: &str, input: &QuoteInput) -> Result<FeeQuote, ApiError>;
}

#[async_trait]
impl QuoteSource for WalletApiClient {
    async fn fetch_quote(&self, token: &str, input: &QuoteInput) -> Result<FeeQuote, ApiError> {
        self.calculate_fee(token, input).await
    }
}

/// One quote stream: a session's buy form or its sell flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub session: String,
    pub direction: Direction,
}

impl DraftKey {
    pub fn new(session: &str, direction: Direction) -> Self {
        Self {
            session: session.to_string(),
            direction,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuoteTicket {
    key: DraftKey,
    seq: u64,
}

impl QuoteTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// This request is the latest one and its quote is now displayed.
    Fresh(FeeQuote),
    /// A newer request was issued; whatever this one produced is ignored.
    Superseded,
}

#[derive(Debug, Clone)]
struct Displayed {
    input: QuoteInput,
    quote: FeeQuote,
}

/// Drafts untouched for this long are dropped; their session most likely
/// expired without a logout.
pub const IDLE_TTL: Duration = Duration::from_secs(30 * 60);
const SWEEP_EVERY: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Slot {
    latest: u64,
    displayed: Option<Displayed>,
    touched: Instant,
}

impl Slot {
    fn new(now: Instant) -> Self {
        Self {
            latest: 0,
            displayed: None,
            touched: now,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    slots: HashMap<DraftKey, Slot>,
    last_sweep: Option<Instant>,
}

impl Inner {
    fn sweep(&mut self, now: Instant) {
        let due = self
            .last_sweep
            .map_or(true, |at| now.duration_since(at) >= SWEEP_EVERY);
        if !due {
            return;
        }
        self.last_sweep = Some(now);

        let before = self.slots.len();
        self.slots
            .retain(|_, slot| now.duration_since(slot.touched) < IDLE_TTL);
        let evicted = before - self.slots.len();
        if evicted > 0 {
            tracing::debug!(evicted, "dropped idle quote drafts");
        }
    }
}

#[derive(Clone)]
pub struct QuoteDebouncer {
    source: Arc<dyn QuoteSource>,
    window: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl QuoteDebouncer {
    pub fn new(source: Arc<dyn QuoteSource>, window: Duration) -> Self {
        Self {
            source,
            window,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new request for `key`, superseding every earlier one.
    pub fn issue(&self, key: DraftKey) -> QuoteTicket {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.sweep(now);
        inner.next_seq += 1;
        let seq = inner.next_seq;

        let slot = inner
            .slots
            .entry(key.clone())
            .or_insert_with(|| Slot::new(now));
        slot.latest = seq;
        slot.touched = now;
        QuoteTicket { key, seq }
    }

    pub fn is_latest(&self, ticket: &QuoteTicket) -> bool {
        self.lock()
            .slots
            .get(&ticket.key)
            .map(|s| s.latest == ticket.seq)
            .unwrap_or(false)
    }

    /// Waits out the debounce window, then fetches unless superseded.
    pub async fn run(&self, ticket: QuoteTicket, token: &str, input: QuoteInput) -> Result<QuoteOutcome, ApiError> {
        if !self.window.is_zero() {
            tokio::time::sleep(self.window).await;
        }

        if !self.is_latest(&ticket) {
            tracing::debug!(seq = ticket.seq, "quote request superseded before send");
            return Ok(QuoteOutcome::Superseded);
        }

        let res = self.source.fetch_quote(token, &input).await;
        self.settle(&ticket, input, res)
    }

    pub async fn request(&self, key: DraftKey, token: &str, input: QuoteInput) -> Result<QuoteOutcome, ApiError> {
        let ticket = self.issue(key);
        self.run(ticket, token, input).await
    }

    fn settle(
        &self,
        ticket: &QuoteTicket,
        input: QuoteInput,
        res: Result<FeeQuote, ApiError>,
    ) -> Result<QuoteOutcome, ApiError> {
        let mut inner = self.lock();
        // a missing slot was forgotten (logout) or swept while in flight
        let Some(slot) = inner.slots.get_mut(&ticket.key) else {
            return Ok(QuoteOutcome::Superseded);
        };

        if slot.latest != ticket.seq {
            tracing::debug!(seq = ticket.seq, latest = slot.latest, "discarding stale quote response");
            return Ok(QuoteOutcome::Superseded);
        }

        let quote = res?;
        slot.displayed = Some(Displayed {
            input,
            quote: quote.clone(),
        });
        Ok(QuoteOutcome::Fresh(quote))
    }

    /// The quote currently shown for `key`, if any.
    pub fn displayed(&self, key: &DraftKey) -> Option<FeeQuote> {
        self.lock()
            .slots
            .get(key)
            .and_then(|s| s.displayed.as_ref())
            .map(|d| d.quote.clone())
    }

    /// Displayed quote only if it was computed for exactly `input`.
    pub fn displayed_for(&self, key: &DraftKey, input: &QuoteInput) -> Option<FeeQuote> {
        self.lock()
            .slots
            .get(key)
            .and_then(|s| s.displayed.as_ref())
            .filter(|d| &d.input == input)
            .map(|d| d.quote.clone())
    }

    /// Drops every stream owned by `session` (logout).
    pub fn forget_session(&self, session: &str) {
        self.lock().slots.retain(|k, _| k.session != session);
    }
}
