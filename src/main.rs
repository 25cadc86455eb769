use std::{process, sync::Arc};

use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{error::AppError, page::PageService, revalidate::RevalidateService},
    cache::{CacheState, ResponseCache},
    config,
    content::{ContentClient, ContentStore},
    domain::documents::DocumentKind,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Check(_) => run_check(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let store: Arc<dyn ContentStore> = Arc::new(ContentClient::new(&settings.content)?);

    if settings.revalidate.secret.is_none() {
        warn!(
            target = "vetrina::serve",
            "revalidate.secret is not set; the revalidation endpoint will reject every notification"
        );
    }

    // The cache always exists as the invalidation target; `cache.enabled`
    // only controls whether responses are served from it.
    let cache = Arc::new(ResponseCache::new(&settings.cache));

    let pages = Arc::new(PageService::new(store.clone()));
    let revalidate = Arc::new(RevalidateService::new(
        settings.revalidate.secret.clone(),
        store,
        cache.clone(),
    ));

    let http_state = HttpState {
        pages,
        revalidate,
        cache: settings
            .cache
            .enabled
            .then(|| CacheState { cache }),
    };

    let router = http::build_router(http_state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "vetrina::serve",
        addr = %settings.server.public_addr,
        cache_enabled = settings.cache.enabled,
        revalidate_secs = settings.cache.revalidate.as_secs(),
        "listening"
    );

    let drain = settings.server.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = signal::ctrl_c().await;
            info!(
                target = "vetrina::serve",
                drain_secs = drain.as_secs(),
                "shutdown signal received; draining connections"
            );
        })
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

/// Deploy-time probe: validates configuration and confirms the content store
/// answers the queries the site will run.
async fn run_check(settings: config::Settings) -> Result<(), AppError> {
    let store: Arc<dyn ContentStore> = Arc::new(ContentClient::new(&settings.content)?);

    let site = store.site_settings().await?;
    info!(
        target = "vetrina::check",
        site_title = site.title.as_deref().unwrap_or("(unset)"),
        "content store reachable"
    );

    for kind in DocumentKind::ALL {
        let slugs = store.slugs(kind).await?;
        info!(
            target = "vetrina::check",
            kind = kind.as_str(),
            documents = slugs.len(),
            "listed published slugs"
        );
    }

    if settings.revalidate.secret.is_none() {
        warn!(
            target = "vetrina::check",
            "revalidate.secret is not set; the revalidation endpoint will reject every notification"
        );
    }

    Ok(())
}
