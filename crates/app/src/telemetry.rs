//! Tracing initialization.
//!
//! - `QUIZ_LOG` sets the filter (e.g. `debug` or `info,services=debug`).
//! - `QUIZ_LOG_FORMAT=json` switches to structured JSON lines; anything else is
//!   the default human-readable format.
//!
//! Logs go to stderr so they do not interleave with the quiz on stdout.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("QUIZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var("QUIZ_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
