//! MPGS reply bodies.
//!
//! Enumerated fields are kept as raw strings here and decoded against their
//! closed tables by the protocol, so an unknown token surfaces as
//! [`tender::GatewayError::UnrecognizedToken`] rather than a generic JSON
//! error.

use std::fmt;

use serde::Deserialize;

/// Body of a `201 Created` transaction reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionReply {
    /// Merchant id.
    pub merchant: Option<String>,
    /// Overall result token.
    pub result: String,
    /// Order summary.
    pub order: Option<OrderSummary>,
    /// Acquirer response.
    pub response: AcquirerResponse,
    /// The transaction that was created.
    pub transaction: TransactionDetail,
}

/// `order` block of a reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderSummary {
    /// Merchant order reference.
    pub id: String,
    /// Order amount.
    pub amount: f64,
    /// Order currency.
    pub currency: String,
    /// Amount authorized so far.
    pub total_authorized_amount: f64,
    /// Amount captured so far.
    pub total_captured_amount: f64,
    /// Amount refunded so far.
    pub total_refunded_amount: f64,
}

/// `response` block of a reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcquirerResponse {
    /// Gateway code token.
    pub gateway_code: String,
    /// Raw acquirer response code.
    pub acquirer_code: Option<String>,
    /// Security code verification.
    pub card_security_code: Option<VerificationResult>,
    /// Address verification.
    pub cardholder_verification: Option<CardholderVerification>,
}

/// A verification outcome reported as a gateway code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationResult {
    /// Gateway code, e.g. `MATCH`.
    pub gateway_code: Option<String>,
}

/// `response.cardholderVerification` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardholderVerification {
    /// Address verification.
    pub avs: Option<VerificationResult>,
}

/// `transaction` block of a reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionDetail {
    /// Transaction id, equal to the id in the request URL.
    pub id: String,
    /// Transaction type, e.g. `AUTHORIZATION`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Transaction amount.
    pub amount: f64,
    /// Transaction currency.
    pub currency: String,
    /// Acquirer receipt number.
    pub receipt: Option<String>,
    /// Issuer authorization code.
    pub authorization_code: Option<String>,
}

impl TransactionReply {
    /// Raw security code result.
    #[must_use]
    pub fn cvv_result(&self) -> Option<&str> {
        self.response
            .card_security_code
            .as_ref()
            .and_then(|r| r.gateway_code.as_deref())
    }

    /// Raw address verification result.
    #[must_use]
    pub fn avs_result(&self) -> Option<&str> {
        self.response
            .cardholder_verification
            .as_ref()
            .and_then(|v| v.avs.as_ref())
            .and_then(|r| r.gateway_code.as_deref())
    }
}

/// Body of any non-`201` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorReply {
    /// Error details.
    pub error: ErrorBody,
    /// Result token, normally `ERROR`.
    #[serde(default)]
    pub result: Option<String>,
}

/// `error` block of an error reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorBody {
    /// Cause token.
    pub cause: String,
    /// Human-readable explanation.
    pub explanation: Option<String>,
    /// Offending request field.
    pub field: Option<String>,
    /// Code to quote to gateway support.
    pub support_code: Option<String>,
    /// Kind of validation failure.
    pub validation_type: Option<String>,
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.explanation {
            Some(explanation) => write!(f, "{}: {explanation}", self.cause),
            None => f.write_str(&self.cause),
        }
    }
}
