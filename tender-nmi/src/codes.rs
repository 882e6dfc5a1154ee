//! NMI enumerations and the stored-credential tables.

use tender::initiator::ProcessingInitiatorType;
use tender::request::Operation;
use tender::wire_codes;

wire_codes! {
    /// In-band outcome of a Direct Post call (`response`).
    ///
    /// NMI answers HTTP 200 for declines too; this field is the only signal.
    pub enum ResponseStatus {
        /// Transaction approved.
        Approved => "1",
        /// Transaction declined.
        Declined => "2",
        /// Error in transaction data or system error.
        Error => "3",
    }
}

wire_codes! {
    /// Transaction `type`.
    pub enum TransactionType {
        /// Authorize only.
        Auth => "auth",
        /// Settle a prior auth.
        Capture => "capture",
        /// Cancel before settlement.
        Void => "void",
        /// Return settled funds.
        Refund => "refund",
    }
}

impl From<Operation> for TransactionType {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Authorize => Self::Auth,
            Operation::Capture => Self::Capture,
            Operation::Void => Self::Void,
            Operation::Refund => Self::Refund,
        }
    }
}

wire_codes! {
    /// Who started a stored-credential transaction (`initiated_by`).
    pub enum InitiatedBy {
        /// Cardholder present.
        Customer => "customer",
        /// Merchant initiated.
        Merchant => "merchant",
    }
}

wire_codes! {
    /// Whether the credential is being stored or reused
    /// (`stored_credential_indicator`).
    pub enum StoredCredentialIndicator {
        /// First use; the credential is being stored.
        Stored => "stored",
        /// Reuse of a stored credential.
        Used => "used",
    }
}

wire_codes! {
    /// Billing pattern of a stored-credential transaction (`billing_method`).
    pub enum BillingMethod {
        /// Part of a recurring series.
        Recurring => "recurring",
    }
}

wire_codes! {
    /// Outcome of an external 3-D Secure authentication (`cardholder_auth`).
    pub enum CardholderAuth {
        /// Cardholder authenticated.
        Verified => "verified",
        /// Authentication attempted; the issuer did not take part.
        Attempted => "attempted",
    }
}

/// `cardholder_auth` for a 3-D Secure transaction status.
///
/// Only `Y` and `A` have a Direct Post value; other statuses send nothing.
#[must_use]
pub fn cardholder_auth(transaction_status: &str) -> Option<CardholderAuth> {
    match transaction_status {
        "Y" => Some(CardholderAuth::Verified),
        "A" => Some(CardholderAuth::Attempted),
        _ => None,
    }
}

/// `initiated_by` for a processing initiator.
#[must_use]
pub const fn initiated_by(initiator: ProcessingInitiatorType) -> InitiatedBy {
    if initiator.is_merchant_initiated() {
        InitiatedBy::Merchant
    } else {
        InitiatedBy::Customer
    }
}

/// `stored_credential_indicator` for a processing initiator.
#[must_use]
pub const fn stored_credential_indicator(
    initiator: ProcessingInitiatorType,
) -> StoredCredentialIndicator {
    if initiator.is_initial() {
        StoredCredentialIndicator::Stored
    } else {
        StoredCredentialIndicator::Used
    }
}

/// `billing_method` for a processing initiator, if any applies.
#[must_use]
pub const fn billing_method(initiator: ProcessingInitiatorType) -> Option<BillingMethod> {
    if initiator.is_recurring() {
        Some(BillingMethod::Recurring)
    } else {
        None
    }
}
