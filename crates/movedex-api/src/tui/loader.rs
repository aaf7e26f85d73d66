//! Background name index loading

use crate::client::MoveApi;
use crate::index::{LoadError, NameIndex};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Result of one load attempt
pub struct IndexLoaded {
    pub attempt: u64,
    pub result: Result<NameIndex, LoadError>,
    pub duration: Duration,
}

/// Spawn a thread that loads the index once and reports back.
///
/// A closed receiver just means the app is gone.
pub fn spawn_index_loader(
    api: Arc<dyn MoveApi>,
    attempt: u64,
    tx: Sender<IndexLoaded>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let start = Instant::now();
        let result = NameIndex::load(api.as_ref());
        if let Err(ref e) = result {
            log::warn!("Index load attempt {} failed: {}", attempt, e);
        }
        let _ = tx.send(IndexLoaded {
            attempt,
            result,
            duration: start.elapsed(),
        });
    })
}
