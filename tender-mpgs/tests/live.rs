//! Round trips against a real MPGS test merchant.
//!
//! Run with `MPGS_MID`, `MPGS_HOST` and `MPGS_PASSWORD` set:
//!
//! ```text
//! cargo test -p tender-mpgs --test live -- --ignored
//! ```
#![allow(missing_docs)]

use std::sync::Arc;

use tender::{
    Amount, AuthorizationRequest, AuthorizationResponse, CaptureRequest, CreditCard,
    PaymentGateway, RefundRequest, VoidRequest,
};
use tender_http::{ReqwestTransport, TransportConfig};
use tender_mpgs::{Mpgs, MpgsClient, MpgsConfig};

fn env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set for live MPGS tests"))
}

fn client() -> MpgsClient {
    let config = MpgsConfig::new(env("MPGS_MID"), env("MPGS_PASSWORD"), env("MPGS_HOST"));
    let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
    Mpgs::client(config, Arc::new(transport))
}

fn card(number: &str) -> CreditCard {
    CreditCard {
        first_name: "John".into(),
        last_name: "Doe".into(),
        number: number.into(),
        expiration_month: 1,
        expiration_year: 2039,
        cvv: "100".into(),
        save: false,
    }
}

fn base_authorization() -> AuthorizationRequest {
    AuthorizationRequest::new(Amount::new(100, "USD")).with_credit_card(card("5111111111111118"))
}

async fn authorize(client: &MpgsClient) -> AuthorizationResponse {
    let auth = client.authorize(&base_authorization()).await.unwrap();
    assert!(auth.success, "authorization declined: {:?}", auth.error_code);
    auth
}

#[tokio::test]
#[ignore = "requires MPGS test merchant credentials"]
async fn authorize_with_rejected_card_number_declines() {
    let request = AuthorizationRequest::new(Amount::new(100, "USD"))
        .with_credit_card(card("5111111214111118"));
    let response = client().authorize(&request).await.unwrap();

    assert!(!response.success);
    let error_code = response.error_code.unwrap_or_default().to_lowercase();
    assert!(error_code.contains("invalid card number"), "{error_code}");
}

#[tokio::test]
#[ignore = "requires MPGS test merchant credentials"]
async fn authorize_succeeds() {
    let auth = authorize(&client()).await;
    assert!(!auth.transaction_reference.is_empty());
}

#[tokio::test]
#[ignore = "requires MPGS test merchant credentials"]
async fn authorize_then_full_capture() {
    let client = client();
    let auth = authorize(&client).await;

    let capture = CaptureRequest::new(Amount::new(100, "USD"), &auth.transaction_reference)
        .with_merchant_order_reference(&auth.merchant_order_reference);
    let captured = client.capture(&capture).await.unwrap();
    assert!(captured.success, "capture declined: {:?}", captured.error_code);
}

#[tokio::test]
#[ignore = "requires MPGS test merchant credentials"]
async fn authorize_then_partial_capture() {
    let client = client();
    let auth = authorize(&client).await;

    let capture = CaptureRequest::new(Amount::new(50, "USD"), &auth.transaction_reference)
        .with_merchant_order_reference(&auth.merchant_order_reference);
    let captured = client.capture(&capture).await.unwrap();
    assert!(captured.success, "capture declined: {:?}", captured.error_code);
}

#[tokio::test]
#[ignore = "requires MPGS test merchant credentials"]
async fn authorize_then_void_then_void_again() {
    let client = client();
    let auth = authorize(&client).await;

    let void = VoidRequest::new(&auth.transaction_reference)
        .with_merchant_order_reference(&auth.merchant_order_reference);
    let voided = client.void(&void).await.unwrap();
    assert!(voided.success, "void declined: {:?}", voided.error_code);

    let again = client.void(&void).await.unwrap();
    assert!(!again.success);
    assert_eq!(again.transaction_reference, auth.transaction_reference);
}

#[tokio::test]
#[ignore = "requires MPGS test merchant credentials"]
async fn authorize_capture_then_refund() {
    let client = client();
    let auth = authorize(&client).await;

    let capture = CaptureRequest::new(Amount::new(100, "USD"), &auth.transaction_reference)
        .with_merchant_order_reference(&auth.merchant_order_reference);
    let captured = client.capture(&capture).await.unwrap();
    assert!(captured.success, "capture declined: {:?}", captured.error_code);

    let refund = RefundRequest::new(Amount::new(100, "USD"), &captured.transaction_reference)
        .with_merchant_order_reference(&auth.merchant_order_reference);
    let refunded = client.refund(&refund).await.unwrap();
    assert!(refunded.success, "refund declined: {:?}", refunded.error_code);
}
