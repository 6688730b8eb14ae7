use tracing::Level;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_KEY: &str = "WACHAT_LOG";

fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Compact stderr logs; `WACHAT_LOG` takes precedence over `-v`.
pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV_KEY)
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity).as_str().to_ascii_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
