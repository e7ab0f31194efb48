use chess_rules::cli;
use chess_rules::config::AppConfig;

#[tokio::main]
async fn main() {
    // Logs go to stderr so they never interleave with the board on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_rules=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        "chess-rules v{} starting ({}s per side)",
        env!("CARGO_PKG_VERSION"),
        config.time_control_secs
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    if let Err(e) = cli::run(&config, stdin, tokio::io::stdout()).await {
        eprintln!("chess-rules: {e}");
        std::process::exit(1);
    }
}
