//! MPGS enumerations and the processing-initiator tables.

use tender::initiator::ProcessingInitiatorType;
use tender::request::Operation;
use tender::wire_codes;

wire_codes! {
    /// The `apiOperation` of a transaction request.
    pub enum ApiOperation {
        /// Reserve funds.
        Authorize => "AUTHORIZE",
        /// Settle an authorization.
        Capture => "CAPTURE",
        /// Cancel before settlement.
        Void => "VOID",
        /// Return captured funds.
        Refund => "REFUND",
    }
}

impl From<Operation> for ApiOperation {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Authorize => Self::Authorize,
            Operation::Capture => Self::Capture,
            Operation::Void => Self::Void,
            Operation::Refund => Self::Refund,
        }
    }
}

wire_codes! {
    /// Card-on-file state of `sourceOfFunds.provided.card.storedOnFile`.
    pub enum StoredOnFile {
        /// Card is used once. The field is omitted when this applies.
        NotStored => "NOT_STORED",
        /// Card will be stored after this transaction.
        ToBeStored => "TO_BE_STORED",
        /// Card was stored by an earlier transaction.
        Stored => "STORED",
    }
}

wire_codes! {
    /// Channel the transaction came through (`transaction.source`).
    pub enum TransactionSource {
        /// Cardholder present online.
        Internet => "INTERNET",
        /// Merchant initiated with the cardholder absent.
        Merchant => "MERCHANT",
    }
}

wire_codes! {
    /// Device-payment wallet (`order.walletProvider`).
    pub enum WalletProvider {
        /// Apple Pay.
        ApplePay => "APPLE_PAY",
    }
}

wire_codes! {
    /// Overall outcome of an API call (`result`).
    pub enum ApiResult {
        /// The request was rejected before processing.
        Error => "ERROR",
        /// The transaction was declined or failed.
        Failure => "FAILURE",
        /// The outcome is not final yet.
        Pending => "PENDING",
        /// The transaction succeeded.
        Success => "SUCCESS",
        /// The outcome could not be determined.
        Unknown => "UNKNOWN",
    }
}

impl ApiResult {
    /// Whether a `201 Created` with this result counts as accepted.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Success | Self::Pending)
    }
}

wire_codes! {
    /// Acquirer-level outcome (`response.gatewayCode`).
    pub enum GatewayCode {
        /// Transaction aborted by the payer.
        Aborted => "ABORTED",
        /// Acquirer system error.
        AcquirerSystemError => "ACQUIRER_SYSTEM_ERROR",
        /// Approved.
        Approved => "APPROVED",
        /// Approved automatically by the gateway.
        ApprovedAuto => "APPROVED_AUTO",
        /// Approved, pending settlement.
        ApprovedPendingSettlement => "APPROVED_PENDING_SETTLEMENT",
        /// 3-D Secure authentication failed.
        AuthenticationFailed => "AUTHENTICATION_FAILED",
        /// 3-D Secure authentication still running.
        AuthenticationInProgress => "AUTHENTICATION_IN_PROGRESS",
        /// Balance enquiry succeeded.
        BalanceAvailable => "BALANCE_AVAILABLE",
        /// Balance enquiry inconclusive.
        BalanceUnknown => "BALANCE_UNKNOWN",
        /// Blocked by risk rules.
        Blocked => "BLOCKED",
        /// Cancelled by the payer.
        Cancelled => "CANCELLED",
        /// Declined by the issuer.
        Declined => "DECLINED",
        /// Declined on address verification.
        DeclinedAvs => "DECLINED_AVS",
        /// Declined on address and security code verification.
        DeclinedAvsCsc => "DECLINED_AVS_CSC",
        /// Declined on security code verification.
        DeclinedCsc => "DECLINED_CSC",
        /// Declined; the issuer asks not to retry.
        DeclinedDoNotContact => "DECLINED_DO_NOT_CONTACT",
        /// Payment plan declined.
        DeclinedPaymentPlan => "DECLINED_PAYMENT_PLAN",
        /// Deferred transaction received.
        DeferredTransactionReceived => "DEFERRED_TRANSACTION_RECEIVED",
        /// Too many attempts.
        ExceededRetryLimit => "EXCEEDED_RETRY_LIMIT",
        /// Card expired.
        ExpiredCard => "EXPIRED_CARD",
        /// Insufficient funds.
        InsufficientFunds => "INSUFFICIENT_FUNDS",
        /// Security code invalid.
        InvalidCsc => "INVALID_CSC",
        /// Operation not supported for this card.
        NotSupported => "NOT_SUPPORTED",
        /// Approved for part of the amount.
        PartiallyApproved => "PARTIALLY_APPROVED",
        /// Outcome pending.
        Pending => "PENDING",
        /// Issuer asks for a voice referral.
        Referred => "REFERRED",
        /// Gateway system error.
        SystemError => "SYSTEM_ERROR",
        /// Acquirer did not answer in time.
        TimedOut => "TIMED_OUT",
        /// Outcome unknown.
        Unknown => "UNKNOWN",
        /// Unspecified failure.
        UnspecifiedFailure => "UNSPECIFIED_FAILURE",
    }
}

wire_codes! {
    /// Broad reason an API call was rejected (`error.cause`).
    pub enum ErrorCause {
        /// The request failed validation.
        InvalidRequest => "INVALID_REQUEST",
        /// The request conflicts with the transaction's state.
        RequestRejected => "REQUEST_REJECTED",
        /// The gateway is overloaded.
        ServerBusy => "SERVER_BUSY",
        /// The gateway failed internally.
        ServerFailed => "SERVER_FAILED",
    }
}

/// Card-on-file state for a processing initiator.
#[must_use]
pub const fn stored_on_file(initiator: ProcessingInitiatorType) -> StoredOnFile {
    match initiator {
        ProcessingInitiatorType::InitialCardOnFile | ProcessingInitiatorType::InitialRecurring => {
            StoredOnFile::ToBeStored
        }
        ProcessingInitiatorType::StoredCardholderInitiated
        | ProcessingInitiatorType::StoredMerchantInitiated
        | ProcessingInitiatorType::FollowingRecurring => StoredOnFile::Stored,
    }
}

/// Transaction source for a processing initiator.
#[must_use]
pub const fn transaction_source(initiator: ProcessingInitiatorType) -> TransactionSource {
    match initiator {
        ProcessingInitiatorType::InitialCardOnFile
        | ProcessingInitiatorType::InitialRecurring
        | ProcessingInitiatorType::StoredCardholderInitiated => TransactionSource::Internet,
        ProcessingInitiatorType::StoredMerchantInitiated
        | ProcessingInitiatorType::FollowingRecurring => TransactionSource::Merchant,
    }
}
