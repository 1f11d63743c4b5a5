use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use std::env;
use std::fs;
use std::io;
use std::sync::Arc;

/// Initialize logging with console and optional file output
pub fn init_logging() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let enable_file_log = env::var("GCV_LOG_FILE").unwrap_or_else(|_| "0".to_string()) == "1";

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&log_level);
        filter = filter.add_directive("gcv_rust=debug".parse().unwrap());
        filter
    });

    let console_layer = fmt::layer()
        .with_target(true)
        .with_ansi(true);

    let file_layer = if enable_file_log {
        // Session-based log file, cleaned on startup
        if let Err(e) = fs::remove_file("log.txt") {
            if e.kind() != io::ErrorKind::NotFound {
                eprintln!("Warning: Failed to remove existing log.txt: {}", e);
            }
        }
        match fs::File::create("log.txt") {
            Ok(file) => Some(
                fmt::layer().with_writer(Arc::new(file)).with_target(true).with_ansi(false),
            ),
            Err(e) => {
                eprintln!("Warning: Failed to create log.txt: {}", e);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!("Panic occurred: {}", panic_info);

        if let Some(location) = panic_info.location() {
            tracing::error!(
                "Panic location: {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
    }));

    tracing::info!("Logging initialized with level: {}", log_level);
}
