//! Diagnostic logging to stderr.
//!
//! stdout carries the result list, so every log line goes to stderr.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Any value enables debug logging, like `--debug`
pub const DEBUG_ENV: &str = "EVOLUTION_LOOKUP_DEBUG";
/// Explicit filter directives used when debug logging is off
pub const FILTER_ENV: &str = "EVOLUTION_LOOKUP_LOG";

pub fn debug_from_env() -> bool {
  std::env::var_os(DEBUG_ENV).is_some()
}

fn filter(debug: bool) -> EnvFilter {
  if debug {
    return EnvFilter::new("evolution_lookup=debug");
  }
  EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("off"))
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(debug: bool) -> WorkerGuard {
  let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

  tracing_subscriber::fmt()
    .with_env_filter(filter(debug))
    .with_writer(writer)
    .with_ansi(false)
    .with_target(false)
    .init();

  guard
}
