//! The Direct Post reply, a url-encoded query string such as
//! `response=1&responsetext=SUCCESS&authcode=123456&transactionid=...`.

use serde::Deserialize;

/// One Direct Post reply.
///
/// `response` is required; a body without it is not a Direct Post reply.
/// The rest default to empty, which NMI also sends for fields that do not
/// apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionReply {
    /// Outcome token, see [`ResponseStatus`](crate::codes::ResponseStatus).
    pub response: String,
    /// Human-readable outcome.
    #[serde(default)]
    pub responsetext: String,
    /// Issuer authorization code.
    #[serde(default)]
    pub authcode: String,
    /// Gateway transaction id.
    #[serde(default)]
    pub transactionid: String,
    /// Address verification code.
    #[serde(default)]
    pub avsresponse: String,
    /// Card security code result.
    #[serde(default)]
    pub cvvresponse: String,
    /// Order id echoed back.
    #[serde(default)]
    pub orderid: String,
    /// Transaction type echoed back.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Numeric result code, e.g. `100` approved or `300` rejected.
    #[serde(default)]
    pub response_code: String,
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

impl TransactionReply {
    /// Parses a reply body.
    ///
    /// # Errors
    ///
    /// Returns the parser error if the body is not a url-encoded reply.
    pub fn parse(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_bytes(body)
    }

    /// Address verification code, if one was returned.
    #[must_use]
    pub fn avs_result(&self) -> Option<&str> {
        non_empty(&self.avsresponse)
    }

    /// Card security code result, if one was returned.
    #[must_use]
    pub fn cvv_result(&self) -> Option<&str> {
        non_empty(&self.cvvresponse)
    }

    /// Gateway transaction id, if one was assigned.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        non_empty(&self.transactionid)
    }
}
