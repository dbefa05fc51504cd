use crate::config::{Environment, LogFormat, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "hatchery_backend=debug,tower_http=debug,info",
        Environment::Staging => "hatchery_backend=debug,tower_http=info,info",
        Environment::Prod => "hatchery_backend=info,tower_http=info,warn",
    }
}

pub fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&settings.env)));

    // Source locations only help when reading logs locally
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(settings.env.is_dev())
        .with_line_number(settings.env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);
    match settings.log_format {
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
        LogFormat::Pretty => registry.with(fmt_layer.pretty()).init(),
    }

    tracing::info!(
        env = ?settings.env,
        format = ?settings.log_format,
        "Logging initialized"
    );
}
