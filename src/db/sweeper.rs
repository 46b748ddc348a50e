//! Active expiration: a background task that periodically sweeps stale keys.
//!
//! Lazy expiration (checked on every access) keeps reads and writes
//! correct even if this task never runs. The sweeper exists so that keys
//! nobody ever touches again still get reclaimed.

use crate::db::core::Keyspace;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tracing::debug;

/// Remove every expired entry from `keyspace` in one pass. Returns the
/// number of keys reclaimed.
fn sweep_once(keyspace: &mut Keyspace) -> usize {
    let now = Instant::now();
    let due: Vec<String> = keyspace
        .expirations
        .iter()
        .filter(|&(_, &at)| now >= at)
        .map(|(k, _)| k.clone())
        .collect();

    for key in &due {
        keyspace.data.remove(key);
        keyspace.expirations.remove(key);
    }

    due.len()
}

/// Run the sweeper loop until `shutdown` is signaled. Wakes every
/// `interval`, takes the keyspace lock briefly, and clears whatever has
/// elapsed. Never holds the lock across an `await`.
pub async fn run(keyspace: Arc<Mutex<Keyspace>>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so we don't sweep at t=0.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut guard = keyspace.lock().await;
                let reclaimed = sweep_once(&mut guard);
                drop(guard);
                if reclaimed > 0 {
                    debug!(reclaimed, "active expiration sweep reclaimed keys");
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("expiration sweeper shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::DataType;

    #[test]
    fn sweep_once_reclaims_only_elapsed_keys() {
        let mut ks = Keyspace::new();
        ks.data.insert("stale".into(), DataType::String("v".into()));
        ks.expirations
            .insert("stale".into(), Instant::now() - Duration::from_secs(1));
        ks.data.insert("fresh".into(), DataType::String("v".into()));
        ks.expirations
            .insert("fresh".into(), Instant::now() + Duration::from_secs(60));
        ks.data.insert("permanent".into(), DataType::String("v".into()));

        let reclaimed = sweep_once(&mut ks);

        assert_eq!(reclaimed, 1);
        assert!(!ks.data.contains_key("stale"));
        assert!(ks.data.contains_key("fresh"));
        assert!(ks.data.contains_key("permanent"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_sweeps_on_each_tick_until_shutdown() {
        let keyspace = Arc::new(Mutex::new(Keyspace::new()));
        {
            let mut guard = keyspace.lock().await;
            guard.data.insert("k".into(), DataType::String("v".into()));
            guard
                .expirations
                .insert("k".into(), Instant::now() + Duration::from_millis(50));
        }

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run(keyspace.clone(), Duration::from_millis(10), rx));

        tokio::time::advance(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        assert!(!keyspace.lock().await.data.contains_key("k"));

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
