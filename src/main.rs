use clap::Parser;
use studypilot::db::Db;
use studypilot::email::ResendEmailSender;
use studypilot::{router, AppState};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// libSQL database address, e.g. `file:studypilot.db` or a remote Turso URL.
    #[clap(env)]
    url: String,

    /// libSQL authentication token (remote databases only).
    #[arg(long, env, default_value = "")]
    auth_token: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:5001")]
    address: String,

    /// Secret used to sign and verify bearer tokens.
    #[arg(long, env)]
    jwt_secret: String,

    /// Bearer token lifetime in hours.
    #[arg(long, env, default_value_t = 24)]
    token_ttl_hours: u64,

    /// Resend API key. When unset, OTP codes are logged instead of emailed.
    #[arg(long, env)]
    resend_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,axum=debug,studypilot=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(args.url, args.auth_token).await?;
    let email = ResendEmailSender::new(args.resend_api_key);
    let state = AppState::new(db, email, args.jwt_secret, args.token_ttl_hours);

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&args.address).await?;
    tracing::info!("listening on {}", args.address);
    axum::serve(listener, app).await?;

    Ok(())
}
