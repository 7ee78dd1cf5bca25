use serde_json::json;

use crate::{models::CurrentSession, AppState};

pub fn render_full(
    state: &AppState,
    title: &str,
    body_html: String,
    session: Option<&CurrentSession>,
) -> Result<String, String> {
    let ctx = json!({
        "title": title,
        "body": body_html,
        "is_logged_in": session.is_some(),
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}

/// Renders one template, turning a template failure into an inline message
/// instead of a 500.
pub fn render_partial(state: &AppState, name: &str, ctx: &serde_json::Value) -> String {
    state
        .hbs
        .render(name, ctx)
        .unwrap_or_else(|e| {
            tracing::error!(template = name, error = %e, "template render failed");
            format!("template error: {e}")
        })
}
