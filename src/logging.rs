use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// `RUST_LOG` takes precedence over `level` when it is set.
pub fn init_logging(level: &str) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    tracing::debug!(level, "logging initialized");
    Ok(())
}

fn default_directives(level: &str) -> String {
    format!("career_compare={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_only_name_this_crate() {
        assert_eq!(default_directives("debug"), "career_compare=debug");
        let filter = EnvFilter::try_new(default_directives("warn")).expect("valid filter");
        assert_eq!(filter.to_string(), "career_compare=warn");
    }
}
