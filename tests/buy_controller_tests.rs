mod common;

use axum::http::StatusCode;

use common::*;

#[tokio::test]
async fn quote_shows_fee_and_total() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/buy/quote", Some("good"), "amount=100&currency=usd&provider=p1")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_string(res).await;
    assert!(body.contains("2.00 USD"));
    assert!(body.contains("102.00 USD"));
}

#[tokio::test]
async fn quote_for_empty_amount_asks_for_one() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/buy/quote", Some("good"), "amount=&currency=USD")).await;
    assert!(body_string(res).await.contains("Enter an amount to see the fee."));
}

#[tokio::test]
async fn overtaken_quote_is_not_swapped_in() {
    let state = test_state_with_debounce(300).await;

    let first = {
        let state = state.clone();
        tokio::spawn(async move {
            send(&state, post_form_as("/buy/quote", Some("good"), "amount=100&currency=USD&provider=p1")).await
        })
    };
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let second = send(&state, post_form_as("/buy/quote", Some("good"), "amount=200&currency=USD&provider=p1")).await;
    let first = first.await.unwrap();

    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert_eq!(header_str(&first, "HX-Reswap"), Some("none"));
    assert!(body_string(first).await.is_empty());

    assert_eq!(second.status(), StatusCode::OK);
    assert!(body_string(second).await.contains("204.00 USD"));
}

#[tokio::test]
async fn clearing_a_field_drops_the_pending_quote() {
    let state = test_state_with_debounce(300).await;

    let first = {
        let state = state.clone();
        tokio::spawn(async move {
            send(&state, post_form_as("/buy/quote", Some("good"), "amount=100&currency=USD&provider=p1")).await
        })
    };
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let cleared = send(&state, post_form_as("/buy/quote", Some("good"), "amount=100&currency=")).await;
    assert_eq!(cleared.status(), StatusCode::OK);
    assert!(body_string(cleared).await.contains("Enter an amount to see the fee."));

    let first = first.await.unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert_eq!(header_str(&first, "HX-Reswap"), Some("none"));
}

#[tokio::test]
async fn buy_page_lists_providers() {
    let state = test_state().await;

    let res = send(&state, get_as("/buy", Some("good"))).await;
    let body = body_string(res).await;
    assert!(body.contains("Acme Pay"));
    assert!(body.contains("Shilling Express"));
}

#[tokio::test]
async fn invalid_buy_form_renders_errors() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/buy", Some("good"), "amount=-1&currency=&provider=")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_string(res).await;
    assert!(body.contains("Enter an amount greater than zero."));
    assert!(body.contains("Choose a provider."));
}

#[tokio::test]
async fn placing_an_order_redirects_to_it() {
    let state = test_state().await;

    let res = send(&state, post_form_as("/buy", Some("good"), "amount=100&currency=USD&provider=p1")).await;
    assert_eq!(header_str(&res, "HX-Redirect"), Some("/orders/42"));
    assert!(header_str(&res, "HX-Trigger").unwrap().contains("ordersUpdated"));
}
