use handlebars::{Handlebars, TemplateError};
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

// (name, source) pairs, compiled into the binary so tests and deployments
// don't depend on the working directory.
const TEMPLATES: &[(&str, &str)] = &[
    // Layout + pages
    ("layouts/base", include_str!("../../templates/layouts/base.hbs")),
    ("pages/home", include_str!("../../templates/pages/home.hbs")),
    ("pages/not_found", include_str!("../../templates/pages/not_found.hbs")),
    ("pages/login", include_str!("../../templates/pages/login.hbs")),
    ("pages/dashboard", include_str!("../../templates/pages/dashboard.hbs")),
    ("pages/profile", include_str!("../../templates/pages/profile.hbs")),
    ("pages/orders", include_str!("../../templates/pages/orders.hbs")),
    ("pages/order_detail", include_str!("../../templates/pages/order_detail.hbs")),
    ("pages/buy", include_str!("../../templates/pages/buy.hbs")),
    ("pages/sell", include_str!("../../templates/pages/sell.hbs")),
    ("pages/lightning", include_str!("../../templates/pages/lightning.hbs")),
    // Partial endpoints
    ("partials/retry", include_str!("../../templates/partials/retry.hbs")),
    ("partials/balance_panel", include_str!("../../templates/partials/balance_panel.hbs")),
    ("partials/wallets", include_str!("../../templates/partials/wallets.hbs")),
    ("partials/order_rows", include_str!("../../templates/partials/order_rows.hbs")),
    ("partials/order_panel", include_str!("../../templates/partials/order_panel.hbs")),
    ("partials/quote", include_str!("../../templates/partials/quote.hbs")),
    ("partials/sell_amount", include_str!("../../templates/partials/sell_amount.hbs")),
    ("partials/sell_provider", include_str!("../../templates/partials/sell_provider.hbs")),
    ("partials/sell_confirm", include_str!("../../templates/partials/sell_confirm.hbs")),
    ("partials/invoice", include_str!("../../templates/partials/invoice.hbs")),
    ("partials/payment_result", include_str!("../../templates/partials/payment_result.hbs")),
    ("partials/ln_transactions", include_str!("../../templates/partials/ln_transactions.hbs")),
    ("partials/scan_result", include_str!("../../templates/partials/scan_result.hbs")),
];

const PARTIALS: &[(&str, &str)] = &[
    ("navbar", include_str!("../../templates/partials/navbar.hbs")),
    ("footer", include_str!("../../templates/partials/footer.hbs")),
    ("status_badge", include_str!("../../templates/partials/status_badge.hbs")),
];

pub fn build_handlebars() -> Result<Hbs, TemplateError> {
    let mut hb = Handlebars::new();

    for (name, src) in TEMPLATES {
        hb.register_template_string(name, src)?;
    }
    for (name, src) in PARTIALS {
        hb.register_partial(name, src)?;
    }

    Ok(Arc::new(hb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_compile() {
        let hb = build_handlebars().unwrap();
        for (name, _) in TEMPLATES {
            assert!(hb.has_template(name), "{name}");
        }
    }
}
