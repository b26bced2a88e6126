//! # Ideaboard Binary
//!
//! Loads settings, picks the storage and mail adapters they name and serves
//! the HTTP API until Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState};
use configs::{LogFormat, LogSettings, MailBackend, MailSettings, Settings, StorageBackend};
use domains::{IdeaRepository, Notifier, UserRepository};
use mail_adapters::{LogNotifier, MailgunNotifier};
use services::{IdeaService, UserService};
use storage_adapters::{MemoryIdeaStore, MemoryUserStore};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let (ideas_repo, users_repo) = storage(&settings).await?;
    let notifier = notifier(&settings.mail)?;

    let users = Arc::new(UserService::new(users_repo, notifier));
    let ideas = Arc::new(IdeaService::new(ideas_repo, users.clone()));
    let app = router(AppState::new(ideas, users));

    let address = settings.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "ideaboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("ideaboard stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn storage(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn IdeaRepository>, Arc<dyn UserRepository>)> {
    match settings.database.backend {
        StorageBackend::Memory => {
            warn!("using in-memory storage, data is lost on exit");
            Ok((Arc::new(MemoryIdeaStore::new()), Arc::new(MemoryUserStore::new())))
        }
        #[cfg(feature = "db-postgres")]
        StorageBackend::Postgres => {
            use secrecy::ExposeSecret;
            use storage_adapters::postgres::{connect, PgIdeaRepository, PgUserRepository};

            let pool = connect(
                settings.database.url.expose_secret(),
                settings.database.max_connections,
            )
            .await
            .context("connecting to postgres")?;
            Ok((
                Arc::new(PgIdeaRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool)),
            ))
        }
        #[cfg(not(feature = "db-postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("postgres storage requested but the `db-postgres` feature is disabled")
        }
    }
}

fn notifier(mail: &MailSettings) -> anyhow::Result<Arc<dyn Notifier>> {
    Ok(match mail.backend {
        MailBackend::Mailgun => Arc::new(MailgunNotifier::new(mail).context("configuring mailgun")?),
        MailBackend::Log => {
            warn!("mail backend is `log`, confirmation mails are not delivered");
            Arc::new(LogNotifier::new(mail.confirm_base_url.clone()))
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(%err, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(err) => {
                warn!(%err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
