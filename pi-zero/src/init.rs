use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Initializes the global `tracing` subscriber and routes the library's `log`
/// records into it. Set `LOG_FORMAT=json` for structured JSON lines.
pub fn init_tracing() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    let registry = Registry::default().with(filter);

    tracing_log::LogTracer::init()?;
    if json_requested(std::env::var("LOG_FORMAT").ok().as_deref()) {
        tracing::subscriber::set_global_default(registry.with(fmt_layer.json()))?;
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt_layer))?;
    }
    Ok(())
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}
