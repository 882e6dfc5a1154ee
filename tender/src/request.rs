//! Canonical requests for the four gateway operations.
//!
//! Each operation has its own request type. [`CanonicalRequest`] tags them so
//! gateway protocols can dispatch over the closed set with an exhaustive
//! `match`.
//!
//! Missing merchant order and client transaction references are filled in by
//! [`References::ensure_references`], which consumes the request and returns
//! a completed copy instead of mutating the caller's value.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amount::Amount;
use crate::initiator::ProcessingInitiatorType;

/// Generates a fresh random reference (UUID v4, hyphenated).
#[must_use]
pub fn new_reference() -> String {
    Uuid::new_v4().to_string()
}

/// Raw card credential.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CreditCard {
    /// Cardholder first name.
    pub first_name: String,
    /// Cardholder last name.
    pub last_name: String,
    /// Primary account number, digits only.
    pub number: String,
    /// Expiry month, 1-12.
    pub expiration_month: u8,
    /// Four-digit expiry year.
    pub expiration_year: u16,
    /// Card security code.
    pub cvv: String,
    /// Ask the gateway to store the card for later use.
    pub save: bool,
}

impl CreditCard {
    /// Returns `"{first} {last}"`, trimmed.
    #[must_use]
    pub fn holder_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Returns the two-digit expiry year (`2039` becomes `39`).
    #[must_use]
    pub const fn expiration_year_2_digit(&self) -> u16 {
        self.expiration_year % 100
    }

    /// Returns the last four digits of the card number.
    #[must_use]
    pub fn last_four(&self) -> &str {
        let len = self.number.len();
        self.number.get(len.saturating_sub(4)..).unwrap_or_default()
    }
}

impl fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditCard")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("number", &format_args!("************{}", self.last_four()))
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .field("cvv", &"***")
            .field("save", &self.save)
            .finish()
    }
}

/// Results of a 3-D Secure authentication performed before authorization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDs {
    /// Cardholder authentication verification value.
    pub cavv: String,
    /// 3-D Secure protocol version (e.g. `"2.2.0"`).
    pub version: String,
    /// Transaction status from the authentication response (`Y`, `A`, ...).
    pub pares_status: String,
    /// Directory server transaction id.
    pub ds_transaction_id: String,
}

/// Cardholder billing address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingAddress {
    /// First street line.
    pub street1: Option<String>,
    /// Second street line.
    pub street2: Option<String>,
    /// City or locality.
    pub city: Option<String>,
    /// State, province or region.
    pub region: Option<String>,
    /// Postal or ZIP code.
    pub postal_code: Option<String>,
    /// ISO-3166 country code.
    pub country: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Company name.
    pub company: Option<String>,
}

/// Reserve funds on a payment credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Amount to authorize.
    pub amount: Amount,
    /// Raw card credential.
    pub credit_card: Option<CreditCard>,
    /// Device-payment cryptogram (e.g. an Apple Pay token).
    pub cryptogram: Option<String>,
    /// Electronic commerce indicator for authenticated or wallet payments.
    pub eci: Option<String>,
    /// 3-D Secure authentication results.
    pub three_ds: Option<ThreeDs>,
    /// Billing address, for gateways that run address verification.
    pub billing_address: Option<BillingAddress>,
    /// Stable identifier of the merchant's order.
    pub merchant_order_reference: Option<String>,
    /// Idempotency key for this attempt.
    pub client_transaction_reference: Option<String>,
    /// Stored-credential / recurring classification.
    pub processing_initiator: Option<ProcessingInitiatorType>,
}

impl AuthorizationRequest {
    /// Creates a request for `amount` with every optional field unset.
    #[must_use]
    pub const fn new(amount: Amount) -> Self {
        Self {
            amount,
            credit_card: None,
            cryptogram: None,
            eci: None,
            three_ds: None,
            billing_address: None,
            merchant_order_reference: None,
            client_transaction_reference: None,
            processing_initiator: None,
        }
    }

    /// Sets the card credential.
    #[must_use]
    pub fn with_credit_card(mut self, card: CreditCard) -> Self {
        self.credit_card = Some(card);
        self
    }

    /// Sets the device-payment cryptogram.
    #[must_use]
    pub fn with_cryptogram(mut self, cryptogram: impl Into<String>) -> Self {
        self.cryptogram = Some(cryptogram.into());
        self
    }

    /// Sets the ECI value.
    #[must_use]
    pub fn with_eci(mut self, eci: impl Into<String>) -> Self {
        self.eci = Some(eci.into());
        self
    }

    /// Sets the 3-D Secure results.
    #[must_use]
    pub fn with_three_ds(mut self, three_ds: ThreeDs) -> Self {
        self.three_ds = Some(three_ds);
        self
    }

    /// Sets the billing address.
    #[must_use]
    pub fn with_billing_address(mut self, address: BillingAddress) -> Self {
        self.billing_address = Some(address);
        self
    }

    /// Sets the merchant order reference.
    #[must_use]
    pub fn with_merchant_order_reference(mut self, reference: impl Into<String>) -> Self {
        self.merchant_order_reference = Some(reference.into());
        self
    }

    /// Sets the client transaction reference.
    #[must_use]
    pub fn with_client_transaction_reference(mut self, reference: impl Into<String>) -> Self {
        self.client_transaction_reference = Some(reference.into());
        self
    }

    /// Sets the processing initiator type.
    #[must_use]
    pub fn with_processing_initiator(mut self, initiator: ProcessingInitiatorType) -> Self {
        self.processing_initiator = Some(initiator);
        self
    }
}

/// Settle some or all of a prior authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Amount to capture; may be less than the authorized amount.
    pub amount: Amount,
    /// Gateway id of the authorization being captured.
    pub transaction_reference: String,
    /// Order the authorization belongs to.
    pub merchant_order_reference: Option<String>,
    /// Idempotency key for this attempt.
    pub client_transaction_reference: Option<String>,
}

impl CaptureRequest {
    /// Creates a capture of `amount` against `transaction_reference`.
    #[must_use]
    pub fn new(amount: Amount, transaction_reference: impl Into<String>) -> Self {
        Self {
            amount,
            transaction_reference: transaction_reference.into(),
            merchant_order_reference: None,
            client_transaction_reference: None,
        }
    }

    /// Sets the merchant order reference.
    #[must_use]
    pub fn with_merchant_order_reference(mut self, reference: impl Into<String>) -> Self {
        self.merchant_order_reference = Some(reference.into());
        self
    }

    /// Sets the client transaction reference.
    #[must_use]
    pub fn with_client_transaction_reference(mut self, reference: impl Into<String>) -> Self {
        self.client_transaction_reference = Some(reference.into());
        self
    }
}

/// Cancel a prior transaction before it settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoidRequest {
    /// Gateway id of the transaction being voided.
    pub transaction_reference: String,
    /// Order the transaction belongs to.
    pub merchant_order_reference: Option<String>,
    /// Idempotency key for this attempt.
    pub client_transaction_reference: Option<String>,
}

impl VoidRequest {
    /// Creates a void of `transaction_reference`.
    #[must_use]
    pub fn new(transaction_reference: impl Into<String>) -> Self {
        Self {
            transaction_reference: transaction_reference.into(),
            merchant_order_reference: None,
            client_transaction_reference: None,
        }
    }

    /// Sets the merchant order reference.
    #[must_use]
    pub fn with_merchant_order_reference(mut self, reference: impl Into<String>) -> Self {
        self.merchant_order_reference = Some(reference.into());
        self
    }

    /// Sets the client transaction reference.
    #[must_use]
    pub fn with_client_transaction_reference(mut self, reference: impl Into<String>) -> Self {
        self.client_transaction_reference = Some(reference.into());
        self
    }
}

/// Return captured funds to the cardholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    /// Amount to refund.
    pub amount: Amount,
    /// Gateway id of the captured transaction.
    pub transaction_reference: String,
    /// Order the transaction belongs to.
    pub merchant_order_reference: Option<String>,
    /// Idempotency key for this attempt.
    pub client_transaction_reference: Option<String>,
}

impl RefundRequest {
    /// Creates a refund of `amount` against `transaction_reference`.
    #[must_use]
    pub fn new(amount: Amount, transaction_reference: impl Into<String>) -> Self {
        Self {
            amount,
            transaction_reference: transaction_reference.into(),
            merchant_order_reference: None,
            client_transaction_reference: None,
        }
    }

    /// Sets the merchant order reference.
    #[must_use]
    pub fn with_merchant_order_reference(mut self, reference: impl Into<String>) -> Self {
        self.merchant_order_reference = Some(reference.into());
        self
    }

    /// Sets the client transaction reference.
    #[must_use]
    pub fn with_client_transaction_reference(mut self, reference: impl Into<String>) -> Self {
        self.client_transaction_reference = Some(reference.into());
        self
    }
}

/// Access to the two correlation references every request carries.
pub trait References: Sized {
    /// The merchant order reference, if set and non-empty.
    fn merchant_order_reference(&self) -> Option<&str>;

    /// The client transaction reference, if set and non-empty.
    fn client_transaction_reference(&self) -> Option<&str>;

    /// Returns the request with both references present, generating random
    /// ones where they were missing or empty. Existing values are kept.
    #[must_use]
    fn ensure_references(self) -> Self;
}

#[cfg_attr(not(feature = "telemetry"), allow(unused_variables))]
fn fill(slot: Option<String>, name: &'static str) -> Option<String> {
    match slot {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            let generated = new_reference();
            #[cfg(feature = "telemetry")]
            tracing::debug!(reference = name, value = %generated, "generated missing reference");
            Some(generated)
        }
    }
}

macro_rules! impl_references {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl References for $ty {
                fn merchant_order_reference(&self) -> Option<&str> {
                    self.merchant_order_reference.as_deref().filter(|s| !s.is_empty())
                }

                fn client_transaction_reference(&self) -> Option<&str> {
                    self.client_transaction_reference.as_deref().filter(|s| !s.is_empty())
                }

                fn ensure_references(self) -> Self {
                    Self {
                        merchant_order_reference: fill(
                            self.merchant_order_reference,
                            "merchant_order_reference",
                        ),
                        client_transaction_reference: fill(
                            self.client_transaction_reference,
                            "client_transaction_reference",
                        ),
                        ..self
                    }
                }
            }
        )+
    };
}

impl_references!(AuthorizationRequest, CaptureRequest, VoidRequest, RefundRequest);

/// The four canonical operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Reserve funds.
    Authorize,
    /// Settle reserved funds.
    Capture,
    /// Cancel before settlement.
    Void,
    /// Return settled funds.
    Refund,
}

impl Operation {
    /// Lower-case operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::Capture => "capture",
            Self::Void => "void",
            Self::Refund => "refund",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical request tagged with its operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalRequest {
    /// See [`AuthorizationRequest`].
    Authorize(AuthorizationRequest),
    /// See [`CaptureRequest`].
    Capture(CaptureRequest),
    /// See [`VoidRequest`].
    Void(VoidRequest),
    /// See [`RefundRequest`].
    Refund(RefundRequest),
}

impl CanonicalRequest {
    /// Returns which operation this request performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Authorize(_) => Operation::Authorize,
            Self::Capture(_) => Operation::Capture,
            Self::Void(_) => Operation::Void,
            Self::Refund(_) => Operation::Refund,
        }
    }

    /// Gateway id of the prior transaction acted on (Capture, Void, Refund).
    #[must_use]
    pub fn transaction_reference(&self) -> Option<&str> {
        match self {
            Self::Authorize(_) => None,
            Self::Capture(r) => Some(&r.transaction_reference),
            Self::Void(r) => Some(&r.transaction_reference),
            Self::Refund(r) => Some(&r.transaction_reference),
        }
    }

    /// Amount moved by this operation, if any.
    #[must_use]
    pub const fn amount(&self) -> Option<&Amount> {
        match self {
            Self::Authorize(r) => Some(&r.amount),
            Self::Capture(r) => Some(&r.amount),
            Self::Refund(r) => Some(&r.amount),
            Self::Void(_) => None,
        }
    }
}

impl References for CanonicalRequest {
    fn merchant_order_reference(&self) -> Option<&str> {
        match self {
            Self::Authorize(r) => r.merchant_order_reference(),
            Self::Capture(r) => r.merchant_order_reference(),
            Self::Void(r) => r.merchant_order_reference(),
            Self::Refund(r) => r.merchant_order_reference(),
        }
    }

    fn client_transaction_reference(&self) -> Option<&str> {
        match self {
            Self::Authorize(r) => r.client_transaction_reference(),
            Self::Capture(r) => r.client_transaction_reference(),
            Self::Void(r) => r.client_transaction_reference(),
            Self::Refund(r) => r.client_transaction_reference(),
        }
    }

    fn ensure_references(self) -> Self {
        match self {
            Self::Authorize(r) => Self::Authorize(r.ensure_references()),
            Self::Capture(r) => Self::Capture(r.ensure_references()),
            Self::Void(r) => Self::Void(r.ensure_references()),
            Self::Refund(r) => Self::Refund(r.ensure_references()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CreditCard {
        CreditCard {
            first_name: "John".into(),
            last_name: "Doe".into(),
            number: "5111111111111118".into(),
            expiration_month: 1,
            expiration_year: 2039,
            cvv: "100".into(),
            save: false,
        }
    }

    #[test]
    fn test_ensure_references_fills_missing_values() {
        let request = AuthorizationRequest::new(Amount::new(100, "USD")).ensure_references();
        assert!(!request.merchant_order_reference().unwrap().is_empty());
        assert!(!request.client_transaction_reference().unwrap().is_empty());
    }

    #[test]
    fn test_ensure_references_distinct_across_calls() {
        let base = AuthorizationRequest::new(Amount::new(100, "USD"));
        let first = base.clone().ensure_references();
        let second = base.ensure_references();
        assert_ne!(
            first.merchant_order_reference(),
            second.merchant_order_reference()
        );
        assert_ne!(
            first.client_transaction_reference(),
            second.client_transaction_reference()
        );
        assert_ne!(
            first.merchant_order_reference(),
            first.client_transaction_reference()
        );
    }

    #[test]
    fn test_ensure_references_keeps_existing_and_replaces_empty() {
        let request = CaptureRequest::new(Amount::new(50, "USD"), "txn-1")
            .with_merchant_order_reference("order-1")
            .with_client_transaction_reference("")
            .ensure_references();
        assert_eq!(request.merchant_order_reference(), Some("order-1"));
        let generated = request.client_transaction_reference().unwrap();
        assert!(Uuid::parse_str(generated).is_ok());
    }

    #[test]
    fn test_ensure_references_is_idempotent() {
        let once = VoidRequest::new("txn-1").ensure_references();
        let twice = once.clone().ensure_references();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonical_request_dispatch_helpers() {
        let refund = CanonicalRequest::Refund(RefundRequest::new(Amount::new(10, "USD"), "t-9"));
        assert_eq!(refund.operation(), Operation::Refund);
        assert_eq!(refund.transaction_reference(), Some("t-9"));
        assert_eq!(refund.amount().map(|a| a.amount), Some(10));

        let void = CanonicalRequest::Void(VoidRequest::new("t-1")).ensure_references();
        assert!(void.amount().is_none());
        assert!(void.client_transaction_reference().is_some());
    }

    #[test]
    fn test_credit_card_helpers() {
        let card = card();
        assert_eq!(card.holder_name(), "John Doe");
        assert_eq!(card.expiration_year_2_digit(), 39);
        assert_eq!(card.last_four(), "1118");
    }

    #[test]
    fn test_credit_card_debug_redacts_pan_and_cvv() {
        let rendered = format!("{:?}", card());
        assert!(!rendered.contains("5111111111111118"));
        assert!(rendered.contains("1118"));
        assert!(!rendered.contains("\"100\""));
    }
}
