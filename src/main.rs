use anyhow::Context;
use sipamit::{
    auth::CredentialVerifier,
    build_app,
    cli::{output::Output, Cli, Commands},
    db::DatabaseProvider,
    seed,
    utils::{
        config::Config,
        logging::{init_tracing, LogFormat},
    },
    AppState,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::from_env()
    };
    init_tracing(format, if cli.verbose { "debug" } else { "info" });

    if let Err(e) = run(&cli, &output).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, output: &Output) -> anyhow::Result<()> {
    let config = match &cli.env_file {
        Some(path) => Config::from_env_file(path),
        None => Config::from_env(),
    };

    match cli.action() {
        // Needs no configuration.
        Commands::HashPassword { password } => {
            let hash = CredentialVerifier::new().hash(&password)?;
            println!("{}", hash);
            Ok(())
        }
        Commands::Config { json } => {
            let config = config.context("failed to load configuration")?;
            show_config(output, &config, json)
        }
        Commands::Seed => {
            let state = build_state(config.context("failed to load configuration")?).await?;
            let report = seed::run(&state).await?;
            if report.is_noop() {
                output.info("Seed data already present");
            } else {
                if report.superadmin_created {
                    output.success("Superadmin account created");
                }
                for kind in &report.checklists_created {
                    output.success(&format!("Checklist created for {}", kind.label()));
                }
            }
            Ok(())
        }
        Commands::Serve { no_seed } => {
            let config = config.context("failed to load configuration")?;
            output.banner();
            serve(config, !no_seed).await
        }
    }
}

async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let provider = DatabaseProvider::from_url(
        &config.database.url,
        config.database.auth_token.as_deref(),
    );
    let store = provider
        .create_store()
        .await
        .with_context(|| format!("failed to open database {:?}", config.database.url))?;

    Ok(AppState::new(config, store))
}

async fn serve(config: Config, run_seed: bool) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let debug = config.server.debug;
    let state = build_state(config).await?;

    if run_seed {
        seed::run(&state).await?;
    }

    if debug {
        tracing::warn!("APP_DEBUG is on, /api/version is exposed");
    }

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

fn show_config(output: &Output, config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    output.header("Server");
    output.kv("address", &config.bind_address());
    output.kv("debug", &config.server.debug.to_string());
    if config.server.cors_allow_origins.is_empty() {
        output.kv("cors", "any origin");
    } else {
        output.kv("cors", "");
        for origin in &config.server.cors_allow_origins {
            output.list_item(origin);
        }
    }

    output.header("Auth");
    output.kv("jwt_key", "[REDACTED]");
    output.kv("token lifetime", &format!("{} day(s)", config.auth.jwt_expire_days));

    output.header("Database");
    output.kv("url", &config.database.url);
    output.kv(
        "auth token",
        if config.database.auth_token.is_some() {
            "[REDACTED]"
        } else {
            "none"
        },
    );

    if config.seed.superadmin_password == sipamit::utils::config::DEFAULT_SUPERADMIN_PASSWORD {
        output.warning("SEED_SUPERADMIN_PASSWORD is the default; change it before deploying");
    }
    output.hint("Values come from the environment and .env; RUST_LOG controls logging.");
    Ok(())
}
