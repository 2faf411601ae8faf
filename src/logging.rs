//! Logging initialization utilities.

use env_logger::Env;

/// Initialize logging with a default filter level.
pub fn init() {
    builder().init();
}

/// Like [`init`], but tolerates a logger that is already installed.
pub fn try_init() -> bool {
    builder().try_init().is_ok()
}

fn builder() -> env_logger::Builder {
    let env = Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env)
}
