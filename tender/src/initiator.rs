//! Who or what triggered a charge.
//!
//! Card networks require merchants to flag stored-credential and recurring
//! transactions. The canonical [`ProcessingInitiatorType`] names the situation
//! once; each gateway crate owns the table that turns it into its own
//! compliance fields.

use serde::{Deserialize, Serialize};

/// Classification of the party and credential behind an authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingInitiatorType {
    /// First customer-present use of a card that will be stored on file.
    InitialCardOnFile,
    /// First payment of a recurring series; the card will be stored.
    InitialRecurring,
    /// Customer-initiated payment with a previously stored card.
    StoredCardholderInitiated,
    /// Merchant-initiated payment with a previously stored card.
    StoredMerchantInitiated,
    /// Subsequent payment of a recurring series.
    FollowingRecurring,
}

impl ProcessingInitiatorType {
    /// Every initiator type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::InitialCardOnFile,
        Self::InitialRecurring,
        Self::StoredCardholderInitiated,
        Self::StoredMerchantInitiated,
        Self::FollowingRecurring,
    ];

    /// Whether the cardholder is absent and the merchant started the charge.
    #[must_use]
    pub const fn is_merchant_initiated(self) -> bool {
        matches!(
            self,
            Self::StoredMerchantInitiated | Self::FollowingRecurring
        )
    }

    /// Whether this is the first use of a credential that will be stored.
    #[must_use]
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::InitialCardOnFile | Self::InitialRecurring)
    }

    /// Whether the charge belongs to a recurring series.
    #[must_use]
    pub const fn is_recurring(self) -> bool {
        matches!(self, Self::InitialRecurring | Self::FollowingRecurring)
    }
}
