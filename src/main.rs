use std::net::SocketAddr;

use dotenvy::dotenv;
use tower_governor::GovernorLayer;
use userdeck::logging::init_logging;
use userdeck::router::init_router;
use userdeck::state::init_app_state;
use userdeck::{cli, config::database};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "create-admin" {
        handle_create_admin(args).await;
        return;
    }

    init_logging();

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, "Failed to initialize application state");
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::error!(error = %err, "Failed to run database migrations");
        std::process::exit(1);
    }

    let governor_config = state.rate_limit_config.governor_config();

    // The rate limiter keys on peer IP, so the service must carry connect
    // info; it is layered here rather than in `init_router` to keep the
    // router buildable without a socket.
    let app = init_router(state)
        .layer(GovernorLayer::new(governor_config))
        .into_make_service_with_connect_info::<SocketAddr>();

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{host}:{port}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr = %addr, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!("Server running on http://{addr}");
    tracing::info!("Swagger UI available at http://{addr}/swagger-ui");
    tracing::info!("Scalar UI available at http://{addr}/scalar");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn handle_create_admin(args: Vec<String>) {
    if args.len() != 5 {
        eprintln!("Usage: {} create-admin <username> <email> <password>", args[0]);
        std::process::exit(1);
    }

    let username = &args[2];
    let email = &args[3];
    let password = &args[4];

    let pool = match database::init_db_pool(&database::DatabaseConfig::from_env()).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Failed to connect to database: {err}");
            std::process::exit(1);
        }
    };

    match cli::create_admin(&pool, username, email, password).await {
        Ok(()) => {
            println!("Admin created successfully");
            println!("  Username: {username}");
            println!("  Email: {email}");
        }
        Err(err) => {
            eprintln!("Error creating admin: {err}");
            std::process::exit(1);
        }
    }
}
