use std::{env, net::SocketAddr, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use traker_web::{ApiClient, AppState, build_router, graceful_shutdown, logging_middleware};

/// The web client for the Traker finance and time tracking server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the Traker REST backend.
    #[arg(long, default_value = "http://localhost:8080")]
    backend_url: String,

    /// The port to serve the web client from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical timezone used for "today" and the current month.
    #[arg(long, default_value = "Europe/Moscow")]
    timezone: String,

    /// How long to wait for the backend before giving up, in seconds.
    #[arg(long, default_value_t = 10)]
    request_timeout: u64,

    /// Log request and response bodies. Passwords are redacted.
    #[arg(long)]
    log_bodies: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        panic!("Unknown timezone \"{}\"", args.timezone);
    }

    let api = ApiClient::new(
        &args.backend_url,
        Duration::from_secs(args.request_timeout),
    )
    .expect("Could not create the backend client");
    let state = AppState::new(&secret, &args.timezone, api);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let mut router = add_tracing_layer(build_router(state));

    if args.log_bodies {
        router = router.layer(middleware::from_fn(logging_middleware));
    }

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!(
        "HTTP server listening on {addr}, using the backend at {}",
        args.backend_url
    );
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly");
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
