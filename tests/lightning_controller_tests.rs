mod common;

use axum::http::StatusCode;

use common::*;

#[tokio::test]
async fn lightning_page_shows_history() {
    let state = test_state().await;

    let res = send(&state, get_as("/lightning", Some("good"))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_string(res).await;
    assert!(body.contains("1000 sats"));
    assert!(body.contains("coffee"));
    assert!(body.contains("Paid"));
}

#[tokio::test]
async fn invoice_needs_positive_whole_sats() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/lightning/invoice", Some("good"), "amount=0.5&memo=")).await;
    assert!(body_string(res).await.contains("Enter a whole number of sats greater than zero."));
}

#[tokio::test]
async fn invoice_is_generated() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/lightning/invoice", Some("good"), "amount=2500&memo=tip")).await;
    assert!(header_str(&res, "HX-Trigger").unwrap().contains("lightningUpdated"));

    let body = body_string(res).await;
    assert!(body.contains(INVOICE));
    assert!(body.contains("2500 sats"));
}

#[tokio::test]
async fn paying_garbage_is_rejected_before_the_api() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/lightning/pay", Some("good"), "payment_request=hello")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("HX-Trigger").is_none());
    assert!(body_string(res).await.contains("does not look like a Lightning invoice"));
}

#[tokio::test]
async fn paying_a_scanned_uri_strips_the_scheme() {
    let state = test_state().await;

    let form = format!("payment_request=LIGHTNING%3A{}", INVOICE.to_uppercase());
    let res = send(&state, post_form_as("/lightning/pay", Some("good"), &form)).await;

    let trigger = header_str(&res, "HX-Trigger").unwrap().to_string();
    assert!(trigger.contains("balanceUpdated"));
    assert!(trigger.contains("lightningUpdated"));

    let body = body_string(res).await;
    assert!(body.contains("Succeeded"));
    assert!(body.contains("250000 sats sent, fee 3 sats."));
}

#[tokio::test]
async fn denied_camera_disables_the_scanner() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/lightning/scan", Some("good"), "outcome=denied")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_string(res).await;
    assert!(body.contains("Camera access was denied"));
    assert!(body.contains("id=\"scan-button\""));
    assert!(body.contains("disabled"));
}

#[tokio::test]
async fn scanned_invoice_fills_the_pay_form() {
    let state = test_state().await;

    let form = format!("outcome=decoded&payload=lightning%3A{INVOICE}");
    let res = send(&state, post_form_as("/lightning/scan", Some("good"), &form)).await;

    let body = body_string(res).await;
    assert!(body.contains("id=\"payment_request\""));
    assert!(body.contains("hx-swap-oob"));
    assert!(body.contains(INVOICE));
    assert!(!body.contains("lightning:"));
}

#[tokio::test]
async fn scanned_non_invoice_is_reported() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/lightning/scan", Some("good"), "outcome=decoded&payload=https%3A%2F%2Fexample.com")).await;
    let body = body_string(res).await;
    assert!(body.contains("not a Lightning invoice"));
    assert!(!body.contains("hx-swap-oob"));
}

#[tokio::test]
async fn closing_the_scanner_renders_nothing() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/lightning/scan", Some("good"), "outcome=closed")).await;
    assert!(body_string(res).await.trim().is_empty());
}
