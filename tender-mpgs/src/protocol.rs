//! The MPGS wire protocol.
//!
//! Every operation is an authenticated `PUT` of a JSON body to
//! `/api/rest/version/{version}/merchant/{mid}/order/{order}/transaction/{txn}`,
//! where `order` is the merchant order reference and `txn` the client
//! transaction reference. `201 Created` means the transaction was recorded;
//! any other status carries an error body.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::Deserialize;
use tender::codes::WireCode;
use tender::gateway::{GatewayClient, WireProtocol};
use tender::request::{CanonicalRequest, Operation, References};
use tender::response::{CanonicalResponse, Outcome, TransportMetadata};
use tender::transport::{OutboundRequest, RawResponse, Transport};
use tender::{EncodeError, GatewayError};
use url::Url;

use crate::codes::{ApiResult, ErrorCause, GatewayCode};
use crate::request::{AmountPayload, AuthorizationPayload, VoidPayload};
use crate::response::{ErrorReply, TransactionReply};

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "70";

fn default_version() -> String {
    DEFAULT_API_VERSION.to_owned()
}

/// Credentials and endpoint of one MPGS merchant account.
#[derive(Clone, Deserialize)]
pub struct MpgsConfig {
    /// Merchant id.
    pub merchant_id: String,
    /// API password for the merchant.
    pub password: String,
    /// Gateway host, e.g. `ap-gateway.mastercard.com`.
    pub host: String,
    /// REST API version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Replaces `https://{host}`; used to point at a mock server.
    #[serde(default)]
    pub base_url: Option<Url>,
}

impl fmt::Debug for MpgsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpgsConfig")
            .field("merchant_id", &self.merchant_id)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("version", &self.version)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .finish()
    }
}

impl MpgsConfig {
    /// Creates a config for the current API version.
    #[must_use]
    pub fn new(
        merchant_id: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            password: password.into(),
            host: host.into(),
            version: default_version(),
            base_url: None,
        }
    }

    /// Sets the REST API version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Overrides the `https://{host}` base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Basic-auth user name, `merchant.{mid}`.
    #[must_use]
    pub fn api_username(&self) -> String {
        format!("merchant.{}", self.merchant_id)
    }

    /// Builds the transaction resource URL, percent-encoding both references.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Url`] if the host or base URL is unusable.
    pub fn transaction_url(&self, order: &str, transaction: &str) -> Result<Url, EncodeError> {
        let mut url = match &self.base_url {
            Some(base) => base.clone(),
            None => Url::parse(&format!("https://{}", self.host))
                .map_err(|e| EncodeError::Url(format!("{}: {e}", self.host)))?,
        };
        let base = url.to_string();
        url.path_segments_mut()
            .map_err(|()| EncodeError::Url(format!("{base} cannot be a base")))?
            .pop_if_empty()
            .extend([
                "api",
                "rest",
                "version",
                self.version.as_str(),
                "merchant",
                self.merchant_id.as_str(),
                "order",
                order,
                "transaction",
                transaction,
            ]);
        Ok(url)
    }

    fn headers(&self) -> Result<HeaderMap, EncodeError> {
        let credentials = BASE64.encode(format!("{}:{}", self.api_username(), self.password));
        let mut authorization = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|_| EncodeError::InvalidHeader("authorization"))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);
        Ok(headers)
    }
}

/// The MPGS [`WireProtocol`].
#[derive(Debug, Clone)]
pub struct Mpgs {
    config: MpgsConfig,
}

/// A [`GatewayClient`] speaking MPGS.
pub type MpgsClient = GatewayClient<Mpgs>;

impl Mpgs {
    /// Creates the protocol for one merchant account.
    #[must_use]
    pub const fn new(config: MpgsConfig) -> Self {
        Self { config }
    }

    /// Creates a ready-to-use client sending through `transport`.
    pub fn client(config: MpgsConfig, transport: Arc<dyn Transport>) -> MpgsClient {
        GatewayClient::new(Self::new(config), transport)
    }

    /// Returns the account configuration.
    #[must_use]
    pub const fn config(&self) -> &MpgsConfig {
        &self.config
    }
}

fn transaction_outcome(status: u16, body: &[u8]) -> Result<Outcome, GatewayError> {
    let reply: TransactionReply = serde_json::from_slice(body)
        .map_err(|e| GatewayError::decode("mpgs transaction reply", status, e))?;
    let result = ApiResult::decode(&reply.result)?;
    let gateway_code = GatewayCode::decode(&reply.response.gateway_code)?;
    let success = result.is_accepted();

    let mut outcome = Outcome {
        success,
        transaction_id: success.then(|| reply.transaction.id.clone()),
        response: result.encode().to_owned(),
        error_code: (!success).then(|| gateway_code.encode().to_owned()),
        avs_result_raw: reply.avs_result().map(str::to_owned),
        cvv_result_raw: reply.cvv_result().map(str::to_owned),
        metadata: BTreeMap::new(),
    };
    outcome.insert_metadata("gateway_code", Some(gateway_code.encode()));
    outcome.insert_metadata("receipt", reply.transaction.receipt.as_deref());
    outcome.insert_metadata(
        "authorization_code",
        reply.transaction.authorization_code.as_deref(),
    );
    outcome.insert_metadata("acquirer_code", reply.response.acquirer_code.as_deref());
    Ok(outcome)
}

fn error_outcome(status: u16, body: &[u8]) -> Result<Outcome, GatewayError> {
    let reply: ErrorReply = serde_json::from_slice(body)
        .map_err(|e| GatewayError::decode("mpgs error reply", status, e))?;
    let cause = ErrorCause::decode(&reply.error.cause)?;
    let result = reply
        .result
        .as_deref()
        .map(ApiResult::decode)
        .transpose()?
        .unwrap_or(ApiResult::Error);

    let mut outcome = Outcome {
        success: false,
        response: result.encode().to_owned(),
        error_code: Some(reply.error.to_string()),
        ..Outcome::default()
    };
    outcome.insert_metadata("cause", Some(cause.encode()));
    outcome.insert_metadata("explanation", reply.error.explanation.as_deref());
    outcome.insert_metadata("field", reply.error.field.as_deref());
    outcome.insert_metadata("support_code", reply.error.support_code.as_deref());
    outcome.insert_metadata("validation_type", reply.error.validation_type.as_deref());
    Ok(outcome)
}

fn missing(operation: Operation, field: &'static str) -> EncodeError {
    EncodeError::MissingField { operation, field }
}

impl WireProtocol for Mpgs {
    fn name(&self) -> &'static str {
        "mpgs"
    }

    fn encode(&self, request: &CanonicalRequest) -> Result<OutboundRequest, GatewayError> {
        let operation = request.operation();
        let order = request
            .merchant_order_reference()
            .ok_or_else(|| missing(operation, "merchant_order_reference"))?;
        let transaction = request
            .client_transaction_reference()
            .ok_or_else(|| missing(operation, "client_transaction_reference"))?;

        let body = match request {
            CanonicalRequest::Authorize(r) => serde_json::to_vec(&AuthorizationPayload::new(r)),
            CanonicalRequest::Capture(r) => serde_json::to_vec(&AmountPayload::capture(r)),
            CanonicalRequest::Void(r) => serde_json::to_vec(&VoidPayload::new(r)),
            CanonicalRequest::Refund(r) => serde_json::to_vec(&AmountPayload::refund(r)),
        }
        .map_err(|e| EncodeError::Serialize {
            operation,
            message: e.to_string(),
        })?;

        let url = self.config.transaction_url(order, transaction)?;
        Ok(OutboundRequest::new(Method::PUT, url)
            .with_headers(self.config.headers()?)
            .with_body(body))
    }

    fn decode(
        &self,
        request: &CanonicalRequest,
        response: RawResponse,
    ) -> Result<CanonicalResponse, GatewayError> {
        let RawResponse {
            status,
            headers,
            body,
        } = response;

        let outcome = if status == StatusCode::CREATED.as_u16() {
            transaction_outcome(status, &body)
        } else {
            error_outcome(status, &body)
        };

        #[cfg(feature = "telemetry")]
        match &outcome {
            Ok(outcome) if !outcome.success => tracing::debug!(
                status,
                error_code = outcome.error_code.as_deref().unwrap_or_default(),
                "mpgs declined"
            ),
            Err(err) => tracing::warn!(status, error = %err, "mpgs reply could not be decoded"),
            Ok(_) => {}
        }

        Ok(outcome?.into_response(request, TransportMetadata::new(status, headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tender::amount::Amount;
    use tender::gateway::PaymentGateway;
    use tender::request::{
        AuthorizationRequest, CaptureRequest, CreditCard, RefundRequest, VoidRequest,
    };
    use tender::{CancellationToken, TransportError};
    use tender_http::{ReqwestTransport, TransportConfig};
    use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MID: &str = "TEST1";
    const ORDER_PATH: &str = "/api/rest/version/70/merchant/TEST1/order/order-1/transaction";

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

    fn config(server: &MockServer) -> MpgsConfig {
        MpgsConfig::new(MID, "secret", "mpgs.invalid")
            .with_base_url(server.uri().parse::<Url>().unwrap())
    }

    fn client(server: &MockServer) -> MpgsClient {
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
        Mpgs::client(config(server), Arc::new(transport))
    }

    fn authorization(reference: &str) -> AuthorizationRequest {
        AuthorizationRequest::new(Amount::new(100, "USD"))
            .with_credit_card(card("5111111111111118"))
            .with_merchant_order_reference("order-1")
            .with_client_transaction_reference(reference)
    }

    fn transaction_reply(id: &str, kind: &str, result: &str, gateway_code: &str) -> serde_json::Value {
        json!({
            "merchant": MID,
            "result": result,
            "order": { "id": "order-1", "amount": 1.0, "currency": "USD" },
            "response": {
                "gatewayCode": gateway_code,
                "acquirerCode": "00",
                "cardSecurityCode": { "gatewayCode": "MATCH" },
                "cardholderVerification": { "avs": { "gatewayCode": "NOT_VERIFIED" } }
            },
            "transaction": {
                "id": id,
                "type": kind,
                "amount": 1.0,
                "currency": "USD",
                "receipt": "412345678901",
                "authorizationCode": "123456"
            }
        })
    }

    fn error_reply(cause: &str, explanation: &str) -> serde_json::Value {
        json!({
            "error": {
                "cause": cause,
                "explanation": explanation,
                "field": "sourceOfFunds.provided.card.number",
                "supportCode": "6f1ac4c8",
                "validationType": "INVALID"
            },
            "result": "ERROR"
        })
    }

    #[test]
    fn test_transaction_url_and_headers() {
        let config = MpgsConfig::new(MID, "secret", "ap-gateway.mastercard.com");
        let url = config.transaction_url("order 1", "txn/1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://ap-gateway.mastercard.com/api/rest/version/70/merchant/TEST1/order/order%201/transaction/txn%2F1"
        );

        let headers = config.headers().unwrap();
        let expected = format!("Basic {}", BASE64.encode("merchant.TEST1:secret"));
        assert_eq!(headers[AUTHORIZATION], expected.as_str());
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let rendered = format!("{:?}", MpgsConfig::new(MID, "hunter2", "gw.test"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("TEST1"));
    }

    #[test]
    fn test_encode_is_put_with_json_body() {
        let protocol = Mpgs::new(MpgsConfig::new(MID, "secret", "gw.test"));
        let request = CanonicalRequest::Void(
            VoidRequest::new("txn-1")
                .with_merchant_order_reference("order-1")
                .with_client_transaction_reference("void-1"),
        );
        let outbound = protocol.encode(&request).unwrap();
        assert_eq!(outbound.method, Method::PUT);
        assert!(outbound.url.ends_with("/order/order-1/transaction/void-1"));
        let body: serde_json::Value = serde_json::from_slice(&outbound.body).unwrap();
        assert_eq!(body["transaction"]["targetTransactionId"], "txn-1");
    }

    #[test]
    fn test_encode_without_references_fails() {
        let protocol = Mpgs::new(MpgsConfig::new(MID, "secret", "gw.test"));
        let request = CanonicalRequest::Void(VoidRequest::new("txn-1"));
        let err = protocol.encode(&request).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Encode(EncodeError::MissingField {
                field: "merchant_order_reference",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_authorize_success_then_capture() {
        let server = MockServer::start().await;
        let expected_auth = format!("Basic {}", BASE64.encode("merchant.TEST1:secret"));
        Mock::given(method("PUT"))
            .and(path(format!("{ORDER_PATH}/auth-1")))
            .and(header("authorization", expected_auth.as_str()))
            .and(body_partial_json(json!({
                "apiOperation": "AUTHORIZE",
                "order": { "amount": 1.0, "currency": "USD", "reference": "order-1" },
                "sourceOfFunds": { "type": "CARD" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(transaction_reply(
                "auth-1",
                "AUTHORIZATION",
                "SUCCESS",
                "APPROVED",
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("{ORDER_PATH}/capture-1")))
            .and(body_partial_json(json!({
                "apiOperation": "CAPTURE",
                "transaction": { "amount": 1.0, "currency": "USD" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(transaction_reply(
                "capture-1",
                "CAPTURE",
                "SUCCESS",
                "APPROVED",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let auth = client.authorize(&authorization("auth-1")).await.unwrap();
        assert!(auth.success);
        assert_eq!(auth.transaction_reference, "auth-1");
        assert_eq!(auth.external_transaction_id, "auth-1");
        assert_eq!(auth.response, "SUCCESS");
        assert!(auth.error_code.is_none());
        assert_eq!(auth.cvv_result_raw.as_deref(), Some("MATCH"));
        assert_eq!(auth.avs_result_raw.as_deref(), Some("NOT_VERIFIED"));
        assert_eq!(auth.metadata["receipt"], "412345678901");
        assert_eq!(auth.metadata["authorization_code"], "123456");
        assert_eq!(auth.transport.status_code, 201);

        let capture = CaptureRequest::new(Amount::new(100, "USD"), &auth.transaction_reference)
            .with_merchant_order_reference(&auth.merchant_order_reference)
            .with_client_transaction_reference("capture-1");
        let captured = client.capture(&capture).await.unwrap();
        assert!(captured.success);
        assert_eq!(captured.transaction_reference, "capture-1");
    }

    #[tokio::test]
    async fn test_invalid_card_number_is_a_decline() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_reply(
                "INVALID_REQUEST",
                "Value '5111111214111118' is invalid. Invalid card number",
            )))
            .mount(&server)
            .await;

        let request = AuthorizationRequest::new(Amount::new(100, "USD"))
            .with_credit_card(card("5111111214111118"));
        let response = client(&server).authorize(&request).await.unwrap();

        assert!(!response.success);
        assert!(response.transaction_reference.is_empty());
        assert_eq!(response.response, "ERROR");
        let error_code = response.error_code.unwrap();
        assert!(error_code.starts_with("INVALID_REQUEST"));
        assert!(error_code.to_lowercase().contains("invalid card number"));
        assert_eq!(
            response.metadata["field"],
            "sourceOfFunds.provided.card.number"
        );
        assert_eq!(response.metadata["support_code"], "6f1ac4c8");
        assert_eq!(response.transport.status_code, 400);
    }

    #[tokio::test]
    async fn test_void_of_voided_transaction_is_a_decline() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_partial_json(json!({ "apiOperation": "VOID" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "cause": "REQUEST_REJECTED",
                    "explanation": "Transaction has already been voided"
                },
                "result": "ERROR"
            })))
            .mount(&server)
            .await;

        let request = VoidRequest::new("auth-1").with_merchant_order_reference("order-1");
        let response = client(&server).void(&request).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.transaction_reference, "auth-1");
        assert_eq!(
            response.error_code.as_deref(),
            Some("REQUEST_REJECTED: Transaction has already been voided")
        );
    }

    #[tokio::test]
    async fn test_created_with_failure_result_is_a_decline() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_json(transaction_reply(
                "auth-2",
                "AUTHORIZATION",
                "FAILURE",
                "INSUFFICIENT_FUNDS",
            )))
            .mount(&server)
            .await;

        let response = client(&server)
            .authorize(&authorization("auth-2"))
            .await
            .unwrap();
        assert!(!response.success);
        assert!(response.transaction_reference.is_empty());
        assert_eq!(response.response, "FAILURE");
        assert_eq!(response.error_code.as_deref(), Some("INSUFFICIENT_FUNDS"));
        assert_eq!(response.cvv_result_raw.as_deref(), Some("MATCH"));
    }

    #[tokio::test]
    async fn test_refund_success() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{ORDER_PATH}/refund-1")))
            .and(body_partial_json(json!({
                "apiOperation": "REFUND",
                "transaction": { "amount": 0.5, "currency": "USD" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(transaction_reply(
                "refund-1", "REFUND", "SUCCESS", "APPROVED",
            )))
            .mount(&server)
            .await;

        let request = RefundRequest::new(Amount::new(50, "USD"), "capture-1")
            .with_merchant_order_reference("order-1")
            .with_client_transaction_reference("refund-1");
        let response = client(&server).refund(&request).await.unwrap();
        assert!(response.success);
        assert_eq!(response.transaction_reference, "refund-1");
    }

    #[tokio::test]
    async fn test_missing_references_are_generated() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path_regex(
                r"^/api/rest/version/70/merchant/TEST1/order/[0-9a-f-]{36}/transaction/[0-9a-f-]{36}$",
            ))
            .respond_with(ResponseTemplate::new(201).set_body_json(transaction_reply(
                "generated",
                "AUTHORIZATION",
                "SUCCESS",
                "APPROVED",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let request = AuthorizationRequest::new(Amount::new(100, "USD"))
            .with_credit_card(card("5111111111111118"));
        let response = client(&server).authorize(&request).await.unwrap();
        assert!(response.success);
        assert_eq!(response.merchant_order_reference.len(), 36);
        assert_eq!(response.client_transaction_reference.len(), 36);
        assert_ne!(
            response.merchant_order_reference,
            response.client_transaction_reference
        );
        assert!(request.merchant_order_reference.is_none());
    }

    #[tokio::test]
    async fn test_malformed_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .authorize(&authorization("auth-3"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Decode {
                context: "mpgs error reply",
                status: 502,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_gateway_code_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_json(transaction_reply(
                "auth-4",
                "AUTHORIZATION",
                "SUCCESS",
                "APPROVED_BY_NEW_RULE",
            )))
            .mount(&server)
            .await;

        let err = client(&server)
            .authorize(&authorization("auth-4"))
            .await
            .unwrap_err();
        match err {
            GatewayError::UnrecognizedToken(token) => {
                assert_eq!(token.table, "GatewayCode");
                assert_eq!(token.token, "APPROVED_BY_NEW_RULE");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_cancellation_yields_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_delay(std::time::Duration::from_secs(5))
                    .set_body_json(transaction_reply("auth-5", "AUTHORIZATION", "SUCCESS", "APPROVED")),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client(&server)
            .authorize_with_cancellation(&authorization("auth-5"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Transport(TransportError::Cancelled)
        ));
    }
}
