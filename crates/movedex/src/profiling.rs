//! `--profile <PATH>`: Chrome trace of lookup sessions and their PokeAPI fetches
//!
//! Open the file in `chrome://tracing` or https://ui.perfetto.dev/. Each lookup
//! shows up as a `session` span with one child span per request, laid out on
//! the row of the fetch worker that ran it.

use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Keeps the trace open; the file is complete once this is dropped
pub struct ProfileGuard {
    path: PathBuf,
    _flush: tracing_chrome::FlushGuard,
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        log::debug!("Writing profile to {}", self.path.display());
    }
}

/// Only our own spans; reqwest and hyper internals would bury the fetches
fn profile_targets() -> Targets {
    Targets::new().with_target("movedex_api", LevelFilter::TRACE)
}

/// Returns `None` if `output_path` is `None`.
pub fn init(output_path: Option<PathBuf>) -> Option<ProfileGuard> {
    let path = output_path?;

    let (chrome_layer, flush) = tracing_chrome::ChromeLayerBuilder::new()
        .file(path.clone())
        // Move names and URLs end up in the span args
        .include_args(true)
        .build();

    if tracing_subscriber::registry()
        .with(chrome_layer.with_filter(profile_targets()))
        .try_init()
        .is_err()
    {
        log::warn!("A tracing subscriber is already installed; profile may be empty");
    }

    Some(ProfileGuard {
        path,
        _flush: flush,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_profile_targets_keep_only_lookup_spans() {
        let targets = profile_targets();
        assert!(targets.would_enable("movedex_api::session", &Level::TRACE));
        assert!(targets.would_enable("movedex_api::client", &Level::INFO));
        assert!(!targets.would_enable("reqwest::connect", &Level::ERROR));
        assert!(!targets.would_enable("hyper_util::client", &Level::TRACE));
    }
}
