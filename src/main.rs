use anyhow::Context;
use products_api::{bootstrap, infrastructure::logger::Logger, Config};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("加载配置失败")?;

    // 初始化日志，guard 持有到进程退出
    let _log_guard = Logger::init(&config.logging)?;

    info!("Starting products server...");

    // 数据库不可达视为启动失败
    let (app, db) = bootstrap(&config).await.map_err(|e| {
        error!("Failed to initialize database: {:#}", e);
        e
    })?;

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法绑定到 {}", addr))?;

    info!("🚀 Products server running on http://{}", listener.local_addr()?);
    info!("📖 Available endpoints:");
    info!("   GET    /health               - Health check");
    info!("   GET    /api/products/        - List products");
    info!("   GET    /api/products/:name   - Find products by name");
    info!("   POST   /api/products/        - Create product");
    if let Some(origin) = &config.cors.allowed_origin {
        info!("   CORS allowed origin: {}", origin);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
