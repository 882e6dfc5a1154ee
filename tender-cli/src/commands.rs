//! Command-line surface and dispatch.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tender::gateway::{GatewayClient, WireProtocol};
use tender::transport::Transport;
use tender::{
    Amount, AuthorizationRequest, CancellationToken, CanonicalRequest, CanonicalResponse,
    CaptureRequest, CreditCard, ProcessingInitiatorType, RefundRequest, VoidRequest,
};
use tender_http::ReqwestTransport;
use tender_mpgs::Mpgs;
use tender_nmi::Nmi;

use crate::config::{CliConfig, DEFAULT_CONFIG_PATH, GatewayKind};
use crate::error::CliError;

/// Run one card payment operation against a configured gateway and print the
/// canonical response as JSON.
#[derive(Debug, Parser)]
#[command(name = "tender", version)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Gateway to use; overrides `gateway` in the configuration file.
    #[arg(long, env = "TENDER_GATEWAY", value_enum, global = true)]
    pub gateway: Option<GatewayKind>,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The four operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reserve funds on a card or wallet token.
    Authorize(AuthorizeArgs),
    /// Settle a prior authorization.
    Capture(AmountFollowUpArgs),
    /// Cancel a prior transaction.
    Void(VoidArgs),
    /// Return captured funds.
    Refund(AmountFollowUpArgs),
}

/// Correlation references; generated when omitted.
#[derive(Debug, Args)]
pub struct ReferenceArgs {
    /// Merchant order reference.
    #[arg(long)]
    pub order_reference: Option<String>,
    /// Client transaction reference.
    #[arg(long)]
    pub client_reference: Option<String>,
}

/// Amount in minor units.
#[derive(Debug, Args)]
pub struct AmountArgs {
    /// Amount in minor units, e.g. `150` for 1.50 USD.
    #[arg(long)]
    pub amount: i64,
    /// ISO-4217 currency code.
    #[arg(long, default_value = "USD")]
    pub currency: String,
}

/// Stored-credential classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InitiatorArg {
    /// First use of a card that will be stored.
    InitialCardOnFile,
    /// First payment of a recurring series.
    InitialRecurring,
    /// Customer-initiated payment with a stored card.
    StoredCardholderInitiated,
    /// Merchant-initiated payment with a stored card.
    StoredMerchantInitiated,
    /// Subsequent payment of a recurring series.
    FollowingRecurring,
}

impl From<InitiatorArg> for ProcessingInitiatorType {
    fn from(arg: InitiatorArg) -> Self {
        match arg {
            InitiatorArg::InitialCardOnFile => Self::InitialCardOnFile,
            InitiatorArg::InitialRecurring => Self::InitialRecurring,
            InitiatorArg::StoredCardholderInitiated => Self::StoredCardholderInitiated,
            InitiatorArg::StoredMerchantInitiated => Self::StoredMerchantInitiated,
            InitiatorArg::FollowingRecurring => Self::FollowingRecurring,
        }
    }
}

/// Arguments of `authorize`.
#[derive(Debug, Args)]
pub struct AuthorizeArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub amount: AmountArgs,
    /// Card number.
    #[arg(long, requires_all = ["exp_month", "exp_year"])]
    pub card_number: Option<String>,
    /// Card expiry month, 1-12.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub exp_month: Option<u8>,
    /// Card expiry year, four digits.
    #[arg(long)]
    pub exp_year: Option<u16>,
    /// Card security code.
    #[arg(long, default_value = "")]
    pub cvv: String,
    /// Cardholder first name.
    #[arg(long, default_value = "")]
    pub first_name: String,
    /// Cardholder last name.
    #[arg(long, default_value = "")]
    pub last_name: String,
    /// Ask the gateway to store the card.
    #[arg(long)]
    pub save: bool,
    /// Wallet payment cryptogram.
    #[arg(long)]
    pub cryptogram: Option<String>,
    /// Electronic commerce indicator.
    #[arg(long)]
    pub eci: Option<String>,
    /// Stored-credential classification.
    #[arg(long, value_enum)]
    pub initiator: Option<InitiatorArg>,
    #[command(flatten)]
    #[allow(missing_docs)]
    pub references: ReferenceArgs,
}

/// Arguments of `capture` and `refund`.
#[derive(Debug, Args)]
pub struct AmountFollowUpArgs {
    /// Gateway id of the transaction acted on.
    #[arg(long)]
    pub transaction_reference: String,
    #[command(flatten)]
    #[allow(missing_docs)]
    pub amount: AmountArgs,
    #[command(flatten)]
    #[allow(missing_docs)]
    pub references: ReferenceArgs,
}

/// Arguments of `void`.
#[derive(Debug, Args)]
pub struct VoidArgs {
    /// Gateway id of the transaction to cancel.
    #[arg(long)]
    pub transaction_reference: String,
    #[command(flatten)]
    #[allow(missing_docs)]
    pub references: ReferenceArgs,
}

impl AmountArgs {
    fn into_amount(self) -> Amount {
        Amount::new(self.amount, self.currency)
    }
}

impl AuthorizeArgs {
    fn into_request(self) -> AuthorizationRequest {
        let mut request = AuthorizationRequest::new(self.amount.into_amount());
        if let (Some(number), Some(expiration_month), Some(expiration_year)) =
            (self.card_number, self.exp_month, self.exp_year)
        {
            request = request.with_credit_card(CreditCard {
                first_name: self.first_name,
                last_name: self.last_name,
                number,
                expiration_month,
                expiration_year,
                cvv: self.cvv,
                save: self.save,
            });
        }
        request.cryptogram = self.cryptogram;
        request.eci = self.eci;
        request.processing_initiator = self.initiator.map(Into::into);
        request.merchant_order_reference = self.references.order_reference;
        request.client_transaction_reference = self.references.client_reference;
        request
    }
}

impl Command {
    /// Builds the canonical request for this command.
    #[must_use]
    pub fn into_request(self) -> CanonicalRequest {
        match self {
            Self::Authorize(args) => CanonicalRequest::Authorize(args.into_request()),
            Self::Capture(args) => {
                let mut request =
                    CaptureRequest::new(args.amount.into_amount(), args.transaction_reference);
                request.merchant_order_reference = args.references.order_reference;
                request.client_transaction_reference = args.references.client_reference;
                CanonicalRequest::Capture(request)
            }
            Self::Void(args) => {
                let mut request = VoidRequest::new(args.transaction_reference);
                request.merchant_order_reference = args.references.order_reference;
                request.client_transaction_reference = args.references.client_reference;
                CanonicalRequest::Void(request)
            }
            Self::Refund(args) => {
                let mut request =
                    RefundRequest::new(args.amount.into_amount(), args.transaction_reference);
                request.merchant_order_reference = args.references.order_reference;
                request.client_transaction_reference = args.references.client_reference;
                CanonicalRequest::Refund(request)
            }
        }
    }
}

/// Loads the configuration named by `cli` and runs its command.
///
/// # Errors
///
/// Returns [`CliError`] if configuration, client setup or the gateway call
/// fails. A decline is not an error.
pub async fn run(cli: Cli, cancel: &CancellationToken) -> Result<CanonicalResponse, CliError> {
    let config = CliConfig::load(&cli.config)?;
    run_with_config(config, cli.gateway, cli.command, cancel).await
}

/// Runs `command` against the gateway picked by `gateway` or, failing that,
/// by `config`.
///
/// # Errors
///
/// Returns [`CliError`] if no usable gateway is configured, the HTTP client
/// cannot be built or the gateway call fails.
pub async fn run_with_config(
    config: CliConfig,
    gateway: Option<GatewayKind>,
    command: Command,
    cancel: &CancellationToken,
) -> Result<CanonicalResponse, CliError> {
    let kind = gateway.or(config.gateway).ok_or(CliError::NoGateway)?;
    let transport: Arc<dyn Transport> =
        Arc::new(ReqwestTransport::new(&config.transport.to_config())?);
    let request = command.into_request();

    match kind {
        GatewayKind::Mpgs => {
            let account = config.mpgs.ok_or(CliError::NotConfigured(kind))?;
            execute(&Mpgs::client(account, transport), request, cancel).await
        }
        GatewayKind::Nmi => {
            let account = config.nmi.ok_or(CliError::NotConfigured(kind))?;
            execute(&Nmi::client(account, transport), request, cancel).await
        }
    }
}

async fn execute<P: WireProtocol>(
    client: &GatewayClient<P>,
    request: CanonicalRequest,
    cancel: &CancellationToken,
) -> Result<CanonicalResponse, CliError> {
    let gateway = client.protocol().name();
    let operation = request.operation();
    tracing::info!(gateway, %operation, "sending");

    let response = client.execute(request, cancel).await?;
    if response.success() {
        tracing::info!(gateway, %operation, "approved");
    } else {
        tracing::warn!(
            gateway,
            %operation,
            error_code = response.error_code().unwrap_or_default(),
            "declined"
        );
    }
    Ok(response)
}

/// Writes `response` as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns [`CliError::Output`] if serialization or the write fails.
pub fn write_response(mut out: impl Write, response: &CanonicalResponse) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut out, response)?;
    writeln!(out).map_err(serde_json::Error::io)?;
    Ok(())
}
