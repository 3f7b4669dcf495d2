//! Tracing setup and debug helpers.
//!
//! Webbot only emits `tracing` events; installing a subscriber is up to the
//! host. [`init_tracing`] is a convenience for test binaries.

use crate::observe::{Observe, Property};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a stderr subscriber; `RUST_LOG` wins over `default_filter`.
///
/// Returns `false` when a global subscriber was already installed, so it is
/// safe to call from every test.
pub fn init_tracing(default_filter: &str) -> bool {
    init_tracing_with(default_filter, LogFormat::Pretty)
}

/// Like [`init_tracing`] with an explicit output format
pub fn init_tracing_with(default_filter: &str, format: LogFormat) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(default_filter));
    let installed = match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.is_ok()
}

/// Log an element's description and text at debug level
pub fn debug_element<S: Observe + ?Sized>(source: &S) {
    let element = source.describe();
    match source.value_of(&Property::Text) {
        Ok(text) => tracing::debug!("{element} has text = {text}"),
        Err(err) => tracing::debug!(error = %err, "{element} could not be read"),
    }
}

/// Log every element of a collection
pub fn debug_elements<S: Observe>(sources: &[S]) {
    tracing::debug!("List contains the following {} tags", sources.len());
    for source in sources {
        debug_element(source);
    }
}
