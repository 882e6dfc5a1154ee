//! The Direct Post request form.
//!
//! NMI takes every operation as one flat `application/x-www-form-urlencoded`
//! body; which fields apply depends on `type`.

use std::fmt;

use serde::Serialize;
use serde_with::skip_serializing_none;
use tender::amount::Amount;
use tender::request::{
    AuthorizationRequest, BillingAddress, CaptureRequest, CreditCard, References, RefundRequest,
    VoidRequest,
};

use crate::codes::{
    BillingMethod, CardholderAuth, InitiatedBy, StoredCredentialIndicator, TransactionType,
    billing_method, cardholder_auth, initiated_by, stored_credential_indicator,
};

/// `test_mode` value that routes a live key to the test processor.
pub const TEST_MODE_ENABLED: &str = "enabled";

/// `decrypted_applepay_data` flag for a pre-decrypted Apple Pay token.
pub const DECRYPTED_APPLEPAY_DATA: &str = "1";

/// One Direct Post transaction.
#[skip_serializing_none]
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionForm {
    /// Transaction type.
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// API security key.
    pub security_key: String,
    /// Set in sandbox.
    pub test_mode: Option<&'static str>,
    /// Major-unit amount, e.g. `1.00`.
    pub amount: Option<String>,
    /// ISO-4217 currency code.
    pub currency: Option<String>,
    /// Card number.
    pub ccnumber: Option<String>,
    /// Card expiry as `MMYY`.
    pub ccexp: Option<String>,
    /// Card security code.
    pub cvv: Option<String>,
    /// Cardholder first name.
    pub first_name: Option<String>,
    /// Cardholder last name.
    pub last_name: Option<String>,
    /// Billing street, first line.
    pub address1: Option<String>,
    /// Billing street, second line.
    pub address2: Option<String>,
    /// Billing city.
    pub city: Option<String>,
    /// Billing state.
    pub state: Option<String>,
    /// Billing postal code.
    pub zip: Option<String>,
    /// Billing country.
    pub country: Option<String>,
    /// Billing email.
    pub email: Option<String>,
    /// Billing company.
    pub company: Option<String>,
    /// Merchant order reference.
    pub orderid: Option<String>,
    /// Original transaction for capture, void and refund.
    pub transactionid: Option<String>,
    /// Stored-credential initiator.
    pub initiated_by: Option<InitiatedBy>,
    /// Stored-credential first use or reuse.
    pub stored_credential_indicator: Option<StoredCredentialIndicator>,
    /// Recurring flag.
    pub billing_method: Option<BillingMethod>,
    /// Authentication value from 3-D Secure or the wallet cryptogram.
    pub cavv: Option<String>,
    /// Electronic commerce indicator.
    pub eci: Option<String>,
    /// 3-D Secure protocol version.
    pub three_ds_version: Option<String>,
    /// Directory server transaction id.
    pub directory_server_id: Option<String>,
    /// 3-D Secure authentication outcome.
    pub cardholder_auth: Option<CardholderAuth>,
    /// Marks `ccnumber`/`cavv` as a decrypted Apple Pay payload.
    pub decrypted_applepay_data: Option<&'static str>,
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "<redacted>")
}

impl fmt::Debug for TransactionForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionForm")
            .field("type", &self.kind)
            .field("security_key", &"<redacted>")
            .field("test_mode", &self.test_mode)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("ccnumber", &redact(self.ccnumber.as_ref()))
            .field("cvv", &redact(self.cvv.as_ref()))
            .field("cavv", &redact(self.cavv.as_ref()))
            .field("orderid", &self.orderid)
            .field("transactionid", &self.transactionid)
            .field("initiated_by", &self.initiated_by)
            .field("stored_credential_indicator", &self.stored_credential_indicator)
            .field("billing_method", &self.billing_method)
            .field("cardholder_auth", &self.cardholder_auth)
            .finish_non_exhaustive()
    }
}

/// Fields every request carries.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    /// API security key.
    pub security_key: &'a str,
    /// Whether to send `test_mode=enabled`.
    pub test_mode: bool,
}

impl TransactionForm {
    fn base(kind: TransactionType, credentials: Credentials<'_>) -> Self {
        Self {
            kind: Some(kind),
            security_key: credentials.security_key.to_owned(),
            test_mode: credentials.test_mode.then_some(TEST_MODE_ENABLED),
            ..Self::default()
        }
    }

    fn set_amount(&mut self, amount: &Amount) {
        self.amount = Some(amount.to_decimal().to_string());
        self.currency = Some(amount.currency.clone());
    }

    fn set_card(&mut self, card: &CreditCard) {
        self.ccnumber = Some(card.number.clone());
        self.ccexp = Some(format!(
            "{:02}{:02}",
            card.expiration_month,
            card.expiration_year_2_digit()
        ));
        self.cvv = Some(card.cvv.clone()).filter(|cvv| !cvv.is_empty());
        self.first_name = Some(card.first_name.clone()).filter(|n| !n.is_empty());
        self.last_name = Some(card.last_name.clone()).filter(|n| !n.is_empty());
    }

    fn set_billing_address(&mut self, address: &BillingAddress) {
        self.address1.clone_from(&address.street1);
        self.address2.clone_from(&address.street2);
        self.city.clone_from(&address.city);
        self.state.clone_from(&address.region);
        self.zip.clone_from(&address.postal_code);
        self.country.clone_from(&address.country);
        self.email.clone_from(&address.email);
        self.company.clone_from(&address.company);
    }

    /// Builds an `auth` form.
    #[must_use]
    pub fn authorization(request: &AuthorizationRequest, credentials: Credentials<'_>) -> Self {
        let mut form = Self::base(TransactionType::Auth, credentials);
        form.set_amount(&request.amount);
        form.orderid = request.merchant_order_reference().map(str::to_owned);

        if let Some(card) = &request.credit_card {
            form.set_card(card);
        }
        if let Some(address) = &request.billing_address {
            form.set_billing_address(address);
        }
        form.eci.clone_from(&request.eci);

        if let Some(three_ds) = &request.three_ds {
            form.cavv = Some(three_ds.cavv.clone());
            form.three_ds_version = Some(three_ds.version.clone());
            form.directory_server_id = Some(three_ds.ds_transaction_id.clone());
            form.cardholder_auth = cardholder_auth(&three_ds.pares_status);
        }
        // A wallet cryptogram takes the `cavv` slot over the 3-D Secure value.
        if let Some(cryptogram) = request.cryptogram.as_deref().filter(|c| !c.is_empty()) {
            form.cavv = Some(cryptogram.to_owned());
            form.decrypted_applepay_data = Some(DECRYPTED_APPLEPAY_DATA);
        }

        if let Some(initiator) = request.processing_initiator {
            form.initiated_by = Some(initiated_by(initiator));
            form.stored_credential_indicator = Some(stored_credential_indicator(initiator));
            form.billing_method = billing_method(initiator);
        } else if request.credit_card.as_ref().is_some_and(|card| card.save) {
            form.initiated_by = Some(InitiatedBy::Customer);
            form.stored_credential_indicator = Some(StoredCredentialIndicator::Stored);
        }
        form
    }

    /// Builds a `capture` form.
    #[must_use]
    pub fn capture(request: &CaptureRequest, credentials: Credentials<'_>) -> Self {
        let mut form = Self::base(TransactionType::Capture, credentials);
        form.set_amount(&request.amount);
        form.transactionid = Some(request.transaction_reference.clone());
        form
    }

    /// Builds a `void` form.
    #[must_use]
    pub fn void(request: &VoidRequest, credentials: Credentials<'_>) -> Self {
        let mut form = Self::base(TransactionType::Void, credentials);
        form.transactionid = Some(request.transaction_reference.clone());
        form
    }

    /// Builds a `refund` form.
    #[must_use]
    pub fn refund(request: &RefundRequest, credentials: Credentials<'_>) -> Self {
        let mut form = Self::base(TransactionType::Refund, credentials);
        form.set_amount(&request.amount);
        form.transactionid = Some(request.transaction_reference.clone());
        form
    }
}
