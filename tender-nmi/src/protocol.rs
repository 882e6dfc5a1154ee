//! The NMI Direct Post protocol.
//!
//! Every operation is a form `POST` to one endpoint. The HTTP status says
//! nothing about the outcome: approvals, declines and data errors all come
//! back as `200` with the result in the `response` field.

use std::fmt;
use std::sync::Arc;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::Deserialize;
use tender::codes::WireCode;
use tender::gateway::{Environment, GatewayClient, WireProtocol};
use tender::request::CanonicalRequest;
use tender::response::{CanonicalResponse, Outcome, TransportMetadata};
use tender::transport::{OutboundRequest, RawResponse, Transport};
use tender::{EncodeError, GatewayError};
use url::Url;

use crate::codes::ResponseStatus;
use crate::request::{Credentials, TransactionForm};
use crate::response::TransactionReply;

/// Direct Post endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://secure.networkmerchants.com/api/transact.php";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

/// Credentials and endpoint of one NMI account.
#[derive(Clone, Deserialize)]
pub struct NmiConfig {
    /// API security key.
    pub security_key: String,
    /// Sandbox sends `test_mode=enabled` with every call.
    #[serde(default)]
    pub environment: Environment,
    /// Direct Post endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl fmt::Debug for NmiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NmiConfig")
            .field("security_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl NmiConfig {
    /// Creates a production config for the default endpoint.
    #[must_use]
    pub fn new(security_key: impl Into<String>) -> Self {
        Self {
            security_key: security_key.into(),
            environment: Environment::Production,
            endpoint: default_endpoint(),
        }
    }

    /// Sets the environment.
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Overrides the Direct Post endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn credentials(&self) -> Credentials<'_> {
        Credentials {
            security_key: &self.security_key,
            test_mode: self.environment.is_sandbox(),
        }
    }

    fn endpoint_url(&self) -> Result<Url, EncodeError> {
        Url::parse(&self.endpoint).map_err(|e| EncodeError::Url(format!("{}: {e}", self.endpoint)))
    }
}

fn headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers
}

/// The NMI [`WireProtocol`].
#[derive(Debug, Clone)]
pub struct Nmi {
    config: NmiConfig,
}

/// A [`GatewayClient`] speaking NMI.
pub type NmiClient = GatewayClient<Nmi>;

impl Nmi {
    /// Creates the protocol for one account.
    #[must_use]
    pub const fn new(config: NmiConfig) -> Self {
        Self { config }
    }

    /// Creates a ready-to-use client sending through `transport`.
    pub fn client(config: NmiConfig, transport: Arc<dyn Transport>) -> NmiClient {
        GatewayClient::new(Self::new(config), transport)
    }

    /// Returns the account configuration.
    #[must_use]
    pub const fn config(&self) -> &NmiConfig {
        &self.config
    }
}

fn classify(status: u16, body: &[u8]) -> Result<Outcome, GatewayError> {
    let reply =
        TransactionReply::parse(body).map_err(|e| GatewayError::decode("nmi reply", status, e))?;
    let success = ResponseStatus::decode(&reply.response)? == ResponseStatus::Approved;

    let mut outcome = Outcome {
        success,
        transaction_id: reply.transaction_id().filter(|_| success).map(str::to_owned),
        response: reply.response_code.clone(),
        error_code: (!success).then(|| reply.response_code.clone()),
        avs_result_raw: reply.avs_result().map(str::to_owned),
        cvv_result_raw: reply.cvv_result().map(str::to_owned),
        ..Outcome::default()
    };
    outcome.insert_metadata("response", Some(reply.response.as_str()));
    outcome.insert_metadata("responsetext", Some(reply.responsetext.as_str()));
    outcome.insert_metadata("authcode", Some(reply.authcode.as_str()));
    outcome.insert_metadata("orderid", Some(reply.orderid.as_str()));
    Ok(outcome)
}

impl WireProtocol for Nmi {
    fn name(&self) -> &'static str {
        "nmi"
    }

    fn encode(&self, request: &CanonicalRequest) -> Result<OutboundRequest, GatewayError> {
        let credentials = self.config.credentials();
        let form = match request {
            CanonicalRequest::Authorize(r) => TransactionForm::authorization(r, credentials),
            CanonicalRequest::Capture(r) => TransactionForm::capture(r, credentials),
            CanonicalRequest::Void(r) => TransactionForm::void(r, credentials),
            CanonicalRequest::Refund(r) => TransactionForm::refund(r, credentials),
        };
        let body = serde_urlencoded::to_string(&form).map_err(|e| EncodeError::Serialize {
            operation: request.operation(),
            message: e.to_string(),
        })?;

        Ok(OutboundRequest::new(Method::POST, self.config.endpoint_url()?)
            .with_headers(headers())
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

        let outcome = classify(status, &body);

        #[cfg(feature = "telemetry")]
        match &outcome {
            Ok(outcome) if !outcome.success => tracing::debug!(
                status,
                response_code = outcome.response.as_str(),
                responsetext = outcome.metadata.get("responsetext").map_or("", String::as_str),
                "nmi declined"
            ),
            Err(err) => tracing::warn!(status, error = %err, "nmi reply could not be decoded"),
            Ok(_) => {}
        }

        Ok(outcome?.into_response(request, TransportMetadata::new(status, headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tender::amount::Amount;
    use tender::gateway::PaymentGateway;
    use tender::request::{
        AuthorizationRequest, CaptureRequest, CreditCard, RefundRequest, VoidRequest,
    };
    use tender::{CancellationToken, TransportError};
    use tender_http::{ReqwestTransport, TransportConfig};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const APPROVED_AUTH: &str = "response=1&responsetext=SUCCESS&authcode=123456&transactionid=7510231420&avsresponse=N&cvvresponse=M&orderid=order-1&type=auth&response_code=100";

    fn card() -> CreditCard {
        CreditCard {
            first_name: "John".into(),
            last_name: "Doe".into(),
            number: "4111111111111111".into(),
            expiration_month: 10,
            expiration_year: 2025,
            cvv: "999".into(),
            save: false,
        }
    }

    fn client_with(server: &MockServer, environment: Environment) -> NmiClient {
        let config = NmiConfig::new("key-123")
            .with_environment(environment)
            .with_endpoint(format!("{}/api/transact.php", server.uri()));
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
        Nmi::client(config, Arc::new(transport))
    }

    fn client(server: &MockServer) -> NmiClient {
        client_with(server, Environment::Production)
    }

    fn authorization() -> AuthorizationRequest {
        AuthorizationRequest::new(Amount::new(100, "USD"))
            .with_credit_card(card())
            .with_merchant_order_reference("order-1")
    }

    fn reply(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(body)
    }

    #[test]
    fn test_config_defaults_and_debug() {
        let config: NmiConfig = serde_json::from_str(r#"{"security_key":"hunter2"}"#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.environment, Environment::Production);
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_encode_is_form_post() {
        let protocol = Nmi::new(NmiConfig::new("key-123"));
        let request = CanonicalRequest::Capture(CaptureRequest::new(Amount::new(100, "USD"), "7510231420"));
        let outbound = protocol.encode(&request).unwrap();
        assert_eq!(outbound.method, Method::POST);
        assert_eq!(outbound.url, DEFAULT_ENDPOINT);
        assert_eq!(
            outbound.headers[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        let body = String::from_utf8(outbound.body).unwrap();
        assert_eq!(
            body,
            "type=capture&security_key=key-123&amount=1.00&currency=USD&transactionid=7510231420"
        );
    }

    #[test]
    fn test_encode_rejects_bad_endpoint() {
        let protocol = Nmi::new(NmiConfig::new("key-123").with_endpoint("not a url"));
        let request = CanonicalRequest::Void(VoidRequest::new("1"));
        assert!(matches!(
            protocol.encode(&request),
            Err(GatewayError::Encode(EncodeError::Url(_)))
        ));
    }

    #[tokio::test]
    async fn test_authorize_approved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transact.php"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("type=auth"))
            .and(body_string_contains("security_key=key-123"))
            .and(body_string_contains("ccexp=1025"))
            .and(body_string_contains("orderid=order-1"))
            .respond_with(reply(APPROVED_AUTH))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server).authorize(&authorization()).await.unwrap();
        assert!(response.success);
        assert_eq!(response.transaction_reference, "7510231420");
        assert_eq!(response.external_transaction_id, "7510231420");
        assert_eq!(response.response, "100");
        assert!(response.error_code.is_none());
        assert_eq!(response.avs_result_raw.as_deref(), Some("N"));
        assert_eq!(response.cvv_result_raw.as_deref(), Some("M"));
        assert_eq!(response.metadata["authcode"], "123456");
        assert_eq!(response.metadata["responsetext"], "SUCCESS");
        assert_eq!(response.merchant_order_reference, "order-1");
        assert_eq!(response.client_transaction_reference.len(), 36);
    }

    #[tokio::test]
    async fn test_sandbox_sends_test_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("test_mode=enabled"))
            .respond_with(reply(APPROVED_AUTH))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_with(&server, Environment::Sandbox)
            .authorize(&authorization())
            .await
            .unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_authorize_declined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply(
                "response=2&responsetext=DECLINE&authcode=&transactionid=7510231421&avsresponse=N&cvvresponse=N&orderid=order-1&type=auth&response_code=200",
            ))
            .mount(&server)
            .await;

        let response = client(&server).authorize(&authorization()).await.unwrap();
        assert!(!response.success);
        assert!(response.transaction_reference.is_empty());
        assert_eq!(response.response, "200");
        assert_eq!(response.error_code.as_deref(), Some("200"));
        assert_eq!(response.cvv_result_raw.as_deref(), Some("N"));
        assert_eq!(response.metadata["responsetext"], "DECLINE");
        assert_eq!(response.transport.status_code, 200);
    }

    #[tokio::test]
    async fn test_error_response_is_a_decline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply(
                "response=3&responsetext=Invalid Credit Card Number REFID:3150891394&authcode=&transactionid=&avsresponse=&cvvresponse=&orderid=order-1&type=auth&response_code=300",
            ))
            .mount(&server)
            .await;

        let response = client(&server).authorize(&authorization()).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.error_code.as_deref(), Some("300"));
        assert!(response.metadata["responsetext"].starts_with("Invalid Credit Card Number"));
        assert!(response.avs_result_raw.is_none());
    }

    #[tokio::test]
    async fn test_declined_follow_ups_keep_the_original_reference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("transactionid=7510231420"))
            .respond_with(reply(
                "response=3&responsetext=Transaction already voided REFID:3150891395&authcode=&transactionid=7510231420&avsresponse=&cvvresponse=&orderid=&type=void&response_code=300",
            ))
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server);
        let voided = client.void(&VoidRequest::new("7510231420")).await.unwrap();
        assert!(!voided.success);
        assert_eq!(voided.transaction_reference, "7510231420");
        assert_eq!(voided.error_code.as_deref(), Some("300"));

        let capture = CaptureRequest::new(Amount::new(100, "USD"), "7510231420");
        let captured = client.capture(&capture).await.unwrap();
        assert!(!captured.success);
        assert_eq!(captured.transaction_reference, "7510231420");
    }

    #[tokio::test]
    async fn test_refund_approved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("type=refund"))
            .and(body_string_contains("amount=0.50"))
            .respond_with(reply(
                "response=1&responsetext=SUCCESS&authcode=&transactionid=7510231499&avsresponse=&cvvresponse=&orderid=&type=refund&response_code=100",
            ))
            .mount(&server)
            .await;

        let request = RefundRequest::new(Amount::new(50, "USD"), "7510231420");
        let response = client(&server).refund(&request).await.unwrap();
        assert!(response.success);
        assert_eq!(response.transaction_reference, "7510231499");
        assert_eq!(response.response, "100");
    }

    #[tokio::test]
    async fn test_status_code_does_not_classify() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(APPROVED_AUTH))
            .mount(&server)
            .await;

        let response = client(&server).authorize(&authorization()).await.unwrap();
        assert!(response.success);
        assert_eq!(response.transport.status_code, 500);
    }

    #[tokio::test]
    async fn test_unknown_response_token_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("response=4&responsetext=HELD&response_code=100"))
            .mount(&server)
            .await;

        let err = client(&server)
            .authorize(&authorization())
            .await
            .unwrap_err();
        match err {
            GatewayError::UnrecognizedToken(token) => {
                assert_eq!(token.table, "ResponseStatus");
                assert_eq!(token.token, "4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>Service Unavailable</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .authorize(&authorization())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Decode {
                context: "nmi reply",
                status: 503,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cancellation_yields_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply(APPROVED_AUTH).set_delay(std::time::Duration::from_secs(5)))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client(&server)
            .authorize_with_cancellation(&authorization(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Transport(TransportError::Cancelled)
        ));
    }
}
