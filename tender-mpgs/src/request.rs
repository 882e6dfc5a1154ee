//! MPGS request payloads and their construction from canonical requests.
//!
//! All four operations are a `PUT` to the same transaction resource; only the
//! JSON body differs.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_with::skip_serializing_none;
use tender::amount::Amount;
use tender::request::{
    AuthorizationRequest, CaptureRequest, CreditCard, RefundRequest, References, VoidRequest,
};

use crate::codes::{
    ApiOperation, StoredOnFile, TransactionSource, WalletProvider, stored_on_file,
    transaction_source,
};

/// `sourceOfFunds.type` for card payments.
pub const SOURCE_OF_FUNDS_CARD: &str = "CARD";

/// Body of an `AUTHORIZE` request.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationPayload {
    /// Always [`ApiOperation::Authorize`].
    pub api_operation: ApiOperation,
    /// 3-D Secure results.
    pub authentication: Option<Authentication>,
    /// Order details.
    pub order: Order,
    /// Payment credential.
    pub source_of_funds: SourceOfFunds,
    /// Stored-credential channel.
    pub transaction: Option<AuthorizationTransaction>,
}

/// `order` block of an authorization.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Major-unit amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Merchant order reference.
    pub reference: String,
    /// Set for device payments.
    pub wallet_provider: Option<WalletProvider>,
}

/// `sourceOfFunds` block.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceOfFunds {
    /// Always [`SOURCE_OF_FUNDS_CARD`].
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Credential supplied in the request.
    pub provided: Option<Provided>,
}

/// `sourceOfFunds.provided` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provided {
    /// Card details.
    pub card: Card,
}

/// `sourceOfFunds.provided.card` block.
#[skip_serializing_none]
#[derive(Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Expiry date.
    pub expiry: Option<Expiry>,
    /// Primary account number.
    pub number: Option<String>,
    /// Cardholder name.
    pub name_on_card: Option<String>,
    /// Card security code.
    pub security_code: Option<String>,
    /// Card-on-file state; omitted when the card is not stored.
    pub stored_on_file: Option<StoredOnFile>,
    /// Device-payment token.
    pub device_payment: Option<DevicePayment>,
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("expiry", &self.expiry)
            .field("number", &self.number.as_ref().map(|_| "<redacted>"))
            .field("name_on_card", &self.name_on_card)
            .field("security_code", &self.security_code.as_ref().map(|_| "<redacted>"))
            .field("stored_on_file", &self.stored_on_file)
            .field("device_payment", &self.device_payment.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Card expiry, month unpadded and two-digit year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expiry {
    /// Month, `1` to `12`.
    pub month: String,
    /// Two-digit year.
    pub year: String,
}

/// `devicePayment` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePayment {
    /// Wallet cryptogram.
    pub payment_token: String,
}

/// `authentication` block carrying externally performed 3-D Secure results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authentication {
    /// Protocol-independent 3-D Secure fields.
    #[serde(rename = "3ds")]
    pub three_ds: ThreeDs,
    /// EMV 3-D Secure fields.
    #[serde(rename = "3ds2")]
    pub three_ds2: ThreeDs2,
}

/// `authentication.3ds` block.
///
/// Every key is sent, empty when the request has no value for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDs {
    /// ECI returned by the access control server.
    pub acs_eci: String,
    /// CAVV / authentication value.
    pub authentication_token: String,
    /// Directory server transaction id.
    pub transaction_id: String,
}

/// `authentication.3ds2` block.
///
/// `statusReasonCode` has no canonical source and is always sent empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDs2 {
    /// Protocol version, e.g. `2.2.0`.
    pub protocol_version: String,
    /// Reason for a non-`Y` transaction status.
    pub status_reason_code: String,
    /// `transStatus` from the authentication.
    pub transaction_status: String,
}

/// `transaction` block of an authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthorizationTransaction {
    /// Channel of the transaction.
    pub source: TransactionSource,
}

/// Body of a `CAPTURE` or `REFUND` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountPayload {
    /// [`ApiOperation::Capture`] or [`ApiOperation::Refund`].
    pub api_operation: ApiOperation,
    /// Amount to move.
    pub transaction: AmountTransaction,
}

/// `transaction` block of a capture or refund.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountTransaction {
    /// Major-unit amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// ISO-4217 currency code.
    pub currency: String,
}

impl From<&Amount> for AmountTransaction {
    fn from(amount: &Amount) -> Self {
        Self {
            amount: amount.to_decimal(),
            currency: amount.currency.clone(),
        }
    }
}

/// Body of a `VOID` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidPayload {
    /// Always [`ApiOperation::Void`].
    pub api_operation: ApiOperation,
    /// Transaction being voided.
    pub transaction: VoidTransaction,
}

/// `transaction` block of a void.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidTransaction {
    /// Gateway id of the transaction to void.
    pub target_transaction_id: String,
}

fn card_from(card: &CreditCard) -> Card {
    Card {
        expiry: Some(Expiry {
            month: card.expiration_month.to_string(),
            year: format!("{:02}", card.expiration_year_2_digit()),
        }),
        number: Some(card.number.clone()),
        name_on_card: Some(card.holder_name()),
        security_code: Some(card.cvv.clone()),
        stored_on_file: card.save.then_some(StoredOnFile::ToBeStored),
        device_payment: None,
    }
}

impl AuthorizationPayload {
    /// Builds the authorization body.
    ///
    /// A cryptogram and a processing initiator both need a card block, so one
    /// is created when the request carries no raw card.
    #[must_use]
    pub fn new(request: &AuthorizationRequest) -> Self {
        let mut card = request.credit_card.as_ref().map(card_from);
        let mut wallet_provider = None;

        if let Some(cryptogram) = request.cryptogram.as_deref().filter(|c| !c.is_empty()) {
            wallet_provider = Some(WalletProvider::ApplePay);
            card.get_or_insert_with(Card::default).device_payment = Some(DevicePayment {
                payment_token: cryptogram.to_owned(),
            });
        }

        let transaction = request.processing_initiator.map(|initiator| {
            card.get_or_insert_with(Card::default).stored_on_file =
                Some(stored_on_file(initiator));
            AuthorizationTransaction {
                source: transaction_source(initiator),
            }
        });

        let authentication = request.three_ds.as_ref().map(|three_ds| Authentication {
            three_ds: ThreeDs {
                acs_eci: request.eci.clone().unwrap_or_default(),
                authentication_token: three_ds.cavv.clone(),
                transaction_id: three_ds.ds_transaction_id.clone(),
            },
            three_ds2: ThreeDs2 {
                protocol_version: three_ds.version.clone(),
                status_reason_code: String::new(),
                transaction_status: three_ds.pares_status.clone(),
            },
        });

        Self {
            api_operation: ApiOperation::Authorize,
            authentication,
            order: Order {
                amount: request.amount.to_decimal(),
                currency: request.amount.currency.clone(),
                reference: request
                    .merchant_order_reference()
                    .unwrap_or_default()
                    .to_owned(),
                wallet_provider,
            },
            source_of_funds: SourceOfFunds {
                kind: SOURCE_OF_FUNDS_CARD,
                provided: card.map(|card| Provided { card }),
            },
            transaction,
        }
    }
}

impl AmountPayload {
    /// Builds a capture body.
    #[must_use]
    pub fn capture(request: &CaptureRequest) -> Self {
        Self {
            api_operation: ApiOperation::Capture,
            transaction: AmountTransaction::from(&request.amount),
        }
    }

    /// Builds a refund body.
    #[must_use]
    pub fn refund(request: &RefundRequest) -> Self {
        Self {
            api_operation: ApiOperation::Refund,
            transaction: AmountTransaction::from(&request.amount),
        }
    }
}

impl VoidPayload {
    /// Builds a void body.
    #[must_use]
    pub fn new(request: &VoidRequest) -> Self {
        Self {
            api_operation: ApiOperation::Void,
            transaction: VoidTransaction {
                target_transaction_id: request.transaction_reference.clone(),
            },
        }
    }
}
