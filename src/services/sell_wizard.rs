//! Sell flow: amount → provider + payout details → confirmation.
//!
//! The wizard lives on the server for the duration of the flow, keyed by
//! session. It is dropped when the user leaves the flow or logs out.

use std::{collections::HashMap, sync::Arc};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use super::auth_service::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SellStep {
    AmountEntry,
    ProviderSelection,
    Confirmation,
}

impl SellStep {
    /// 1-based, as shown in the step indicator.
    pub fn index(&self) -> u8 {
        match self {
            SellStep::AmountEntry => 1,
            SellStep::ProviderSelection => 2,
            SellStep::Confirmation => 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SellDraft {
    pub amount: Option<f64>,
    pub currency: String,
    pub provider_id: Option<String>,
    pub payout_details: Option<String>,
}

#[derive(Debug, Clone)]
pub enum WizardEvent {
    SubmitAmount { amount: f64, currency: String },
    SubmitProvider { provider_id: String, payout_details: String },
    Back,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("Enter an amount greater than zero.")]
    NonPositiveAmount,
    #[error("Your balance has not loaded yet. Try again in a moment.")]
    BalanceUnknown,
    #[error("Amount exceeds your available balance ({available}).")]
    ExceedsBalance { available: f64 },
    #[error("Choose a payout currency.")]
    MissingCurrency,
    #[error("Choose a provider.")]
    MissingProvider,
    #[error("Enter your payout details.")]
    MissingPayoutDetails,
    #[error("You are already on the first step.")]
    AtFirstStep,
    #[error("That action is not available on this step.")]
    InvalidTransition { step: SellStep },
}

impl WizardError {
    /// Form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            WizardError::NonPositiveAmount
            | WizardError::BalanceUnknown
            | WizardError::ExceedsBalance { .. } => "amount",
            WizardError::MissingCurrency => "currency",
            WizardError::MissingProvider => "provider",
            WizardError::MissingPayoutDetails => "payout_details",
            WizardError::AtFirstStep | WizardError::InvalidTransition { .. } => "_form",
        }
    }

    pub fn into_field_errors(self) -> FieldErrors {
        let mut errs = FieldErrors::new();
        errs.insert(self.field().to_string(), self.to_string());
        errs
    }
}

#[derive(Debug, Clone)]
pub struct SellWizard {
    step: SellStep,
    draft: SellDraft,
    available_balance: Option<f64>,
}

impl Default for SellWizard {
    fn default() -> Self {
        Self::new()
    }
}

fn check_amount(amount: f64, available: Option<f64>) -> Result<(), WizardError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(WizardError::NonPositiveAmount);
    }
    let Some(available) = available else {
        return Err(WizardError::BalanceUnknown);
    };
    if amount > available {
        return Err(WizardError::ExceedsBalance { available });
    }
    Ok(())
}

impl SellWizard {
    pub fn new() -> Self {
        Self {
            step: SellStep::AmountEntry,
            draft: SellDraft::default(),
            available_balance: None,
        }
    }

    pub fn step(&self) -> SellStep {
        self.step
    }

    pub fn draft(&self) -> &SellDraft {
        &self.draft
    }

    pub fn available_balance(&self) -> Option<f64> {
        self.available_balance
    }

    /// Replaces the validation bound. `None` means the balance is unknown
    /// (still loading or the wallet is provisioning) and blocks forward moves.
    pub fn update_balance(&mut self, available: Option<f64>) {
        self.available_balance = available.filter(|b| b.is_finite());
    }

    /// Applies one event. On error the wizard is left untouched.
    pub fn apply(&mut self, event: WizardEvent) -> Result<SellStep, WizardError> {
        use SellStep::*;
        use WizardEvent::*;

        let next = match (self.step, event) {
            (AmountEntry, SubmitAmount { amount, currency }) => {
                check_amount(amount, self.available_balance)?;
                let currency = currency.trim().to_uppercase();
                if currency.is_empty() {
                    return Err(WizardError::MissingCurrency);
                }
                self.draft.amount = Some(amount);
                self.draft.currency = currency;
                ProviderSelection
            }
            (AmountEntry, SubmitProvider { .. }) => {
                return Err(WizardError::InvalidTransition { step: AmountEntry });
            }
            (AmountEntry, Back) => return Err(WizardError::AtFirstStep),

            (ProviderSelection, SubmitAmount { .. }) => {
                return Err(WizardError::InvalidTransition { step: ProviderSelection });
            }
            (ProviderSelection, SubmitProvider { provider_id, payout_details }) => {
                let provider_id = provider_id.trim().to_string();
                let payout_details = payout_details.trim().to_string();
                if provider_id.is_empty() {
                    return Err(WizardError::MissingProvider);
                }
                if payout_details.is_empty() {
                    return Err(WizardError::MissingPayoutDetails);
                }
                // the balance may have moved since the amount step
                let amount = self.draft.amount.ok_or(WizardError::NonPositiveAmount)?;
                check_amount(amount, self.available_balance)?;

                self.draft.provider_id = Some(provider_id);
                self.draft.payout_details = Some(payout_details);
                Confirmation
            }
            (ProviderSelection, Back) => AmountEntry,

            (Confirmation, SubmitAmount { .. }) | (Confirmation, SubmitProvider { .. }) => {
                return Err(WizardError::InvalidTransition { step: Confirmation });
            }
            (Confirmation, Back) => ProviderSelection,
        };

        tracing::debug!(from = ?self.step, to = ?next, "sell wizard transition");
        self.step = next;
        Ok(next)
    }
}

/// Per-session wizard state shared across requests.
#[derive(Clone, Default)]
pub struct WizardStore {
    inner: Arc<RwLock<HashMap<String, SellWizard>>>,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh flow, dropping whatever the session had.
    pub async fn start(&self, key: &str) -> SellWizard {
        let wizard = SellWizard::new();
        self.inner
            .write()
            .await
            .insert(key.to_string(), wizard.clone());
        wizard
    }

    pub async fn get(&self, key: &str) -> Option<SellWizard> {
        self.inner.read().await.get(key).cloned()
    }

    /// Runs `f` against the session's wizard, creating one if needed.
    pub async fn update<R>(&self, key: &str, f: impl FnOnce(&mut SellWizard) -> R) -> R {
        let mut map = self.inner.write().await;
        let wizard = map.entry(key.to_string()).or_default();
        f(wizard)
    }

    pub async fn discard(&self, key: &str) -> bool {
        self.inner.write().await.remove(key).is_some()
    }
}
