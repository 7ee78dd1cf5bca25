//! Presentation of server-reported order and transaction statuses.
//!
//! Everything here is pure and total: any string maps to some view, and
//! unknown statuses fall back to a neutral badge with no action panel.

use serde::Serialize;

use crate::models::OrderStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Neutral,
}

impl Tone {
    /// Bootstrap contextual class suffix.
    pub fn css(&self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Danger => "danger",
            Tone::Neutral => "secondary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Check,
    Clock,
    Cross,
    Dot,
}

impl Icon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Check => "bi-check-circle",
            Icon::Clock => "bi-clock-history",
            Icon::Cross => "bi-x-circle",
            Icon::Dot => "bi-dot",
        }
    }
}

/// Which block the order detail page shows under the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPanel {
    PaymentProof,
    AwaitingConfirmation,
    CompletedPayout,
    Closed,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    SubmitPaymentProof,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub tone: Tone,
    pub icon: Icon,
    pub panel: ActionPanel,
    pub actions: Vec<OrderAction>,
}

pub fn status_to_tone(status: &str) -> Tone {
    tone_for(&OrderStatus::parse(status))
}

pub fn tone_for(status: &OrderStatus) -> Tone {
    match status {
        OrderStatus::Completed | OrderStatus::Paid | OrderStatus::Succeeded => Tone::Success,
        OrderStatus::Pending | OrderStatus::AwaitingConfirmation => Tone::Warning,
        OrderStatus::Failed | OrderStatus::Expired | OrderStatus::Cancelled => Tone::Danger,
        OrderStatus::Unrecognized(_) => Tone::Neutral,
    }
}

pub fn status_view(status: &str) -> StatusView {
    view_for(&OrderStatus::parse(status))
}

pub fn view_for(status: &OrderStatus) -> StatusView {
    let tone = tone_for(status);

    let icon = match tone {
        Tone::Success => Icon::Check,
        Tone::Warning => Icon::Clock,
        Tone::Danger => Icon::Cross,
        Tone::Neutral => Icon::Dot,
    };

    let panel = match status {
        OrderStatus::Pending => ActionPanel::PaymentProof,
        OrderStatus::AwaitingConfirmation => ActionPanel::AwaitingConfirmation,
        OrderStatus::Completed | OrderStatus::Paid | OrderStatus::Succeeded => ActionPanel::CompletedPayout,
        OrderStatus::Failed | OrderStatus::Expired | OrderStatus::Cancelled => ActionPanel::Closed,
        OrderStatus::Unrecognized(_) => ActionPanel::None,
    };

    let actions = match status {
        OrderStatus::Pending => vec![OrderAction::SubmitPaymentProof],
        _ => vec![],
    };

    StatusView { tone, icon, panel, actions }
}
