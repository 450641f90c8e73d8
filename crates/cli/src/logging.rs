use log::LevelFilter;

/// Crates whose log output the CLI enables by default.
const CRATES: &[&str] = &["usda_core", "usda2json"];

/// Map the number of `-v` flags to a level. Quiet runs only report warnings.
pub(crate) fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Build the filter string that would have been set in RUST_LOG.
pub(crate) fn filter_for(level: LevelFilter) -> String {
    let level = level.as_str().to_ascii_lowercase();
    CRATES
        .iter()
        .map(|name| format!("{}={}", name, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialise stderr logging. `RUST_LOG` wins over the verbosity flags.
pub(crate) fn init(verbosity: u8) {
    if std::env::var("RUST_LOG").is_err() {
        let filter = filter_for(level_for(verbosity));
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    } else {
        env_logger::init();
    }
}
