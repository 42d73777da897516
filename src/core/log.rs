use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Storage and HTTP crates that flood `--verbose` output with compaction
/// and connection-pool events. They stay at `warn` unless RUST_LOG says
/// otherwise.
const QUIET_DEPENDENCIES: [&str; 4] = ["fjall", "lsm_tree", "hyper_util", "reqwest"];

/// Filter directives used when RUST_LOG is unset.
fn default_directives(verbose: bool) -> String {
    if !verbose {
        return "warn".to_string();
    }
    std::iter::once("debug".to_string())
        .chain(QUIET_DEPENDENCIES.iter().map(|krate| format!("{krate}=warn")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber on stderr, leaving stdout to tables and
/// exported data. Only warnings are shown unless `verbose` is set.
pub fn init_logging(verbose: bool) {
    let level_filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let app_filter = Targets::new()
        .with_target("bullion", level_filter)
        .with_default(LevelFilter::WARN);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_by_default() {
        assert_eq!(default_directives(false), "warn");
    }

    #[test]
    fn test_verbose_keeps_storage_and_http_crates_at_warn() {
        let directives = default_directives(true);
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("fjall=warn"));
        assert!(directives.contains("lsm_tree=warn"));
        assert!(directives.contains("reqwest=warn"));
        assert!(directives.parse::<EnvFilter>().is_ok());
    }
}
