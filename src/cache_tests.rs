// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `cache.rs`

#[cfg(test)]
mod tests {
    use crate::aggregator::FqdnFilters;
    use crate::cache::SnapshotCache;
    use crate::crd::{DNSRecordSet, DNSRecordSetSpec, DNSRecordSetStatus, FQDNGroupStatus, FQDNStatus};
    use crate::errors::SourceError;
    use crate::source::{RecordSetSelector, RecordSetSource};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Source replaying scripted responses; once exhausted it keeps answering
    /// with the last successful list.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<DNSRecordSet>, String>>>,
        last: Mutex<Vec<DNSRecordSet>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn with(responses: Vec<Result<Vec<DNSRecordSet>, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl RecordSetSource for ScriptedSource {
        async fn list_all(&self) -> Result<Vec<DNSRecordSet>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(list)) => {
                    *self.last.lock().unwrap() = list.clone();
                    Ok(list)
                }
                Some(Err(message)) => Err(SourceError::Unavailable(message)),
                None => Ok(self.last.lock().unwrap().clone()),
            }
        }

        async fn list_matching(
            &self,
            selector: &RecordSetSelector,
        ) -> Result<Vec<DNSRecordSet>, SourceError> {
            let mut all = self.list_all().await?;
            all.retain(|rs| selector.matches(rs));
            Ok(all)
        }
    }

    fn record_set(namespace: &str, name: &str, fqdns: &[&str]) -> DNSRecordSet {
        let mut rs = DNSRecordSet::new(name, DNSRecordSetSpec::default());
        rs.metadata.namespace = Some(namespace.to_string());
        rs.status = Some(DNSRecordSetStatus {
            groups: vec![FQDNGroupStatus {
                name: "Web".to_string(),
                fqdns: fqdns
                    .iter()
                    .map(|fqdn| FQDNStatus {
                        fqdn: (*fqdn).to_string(),
                        record_type: "A".to_string(),
                        ..Default::default()
                    })
                    .collect(),
            }],
            ..Default::default()
        });
        rs
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = SnapshotCache::new();
        let snapshot = cache.snapshot();

        assert!(!cache.is_ready());
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.refreshed_at.is_none());
        assert!(snapshot.fqdns.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_commits_snapshot() {
        let cache = SnapshotCache::new();
        let source = ScriptedSource::with(vec![Ok(vec![record_set("default", "public", &["b.com", "a.com"])])]);

        let generation = cache.refresh(&source).await.unwrap();

        assert_eq!(generation, 1);
        assert!(cache.is_ready());
        let snapshot = cache.snapshot();
        assert!(snapshot.refreshed_at.is_some());
        let names: Vec<&str> = snapshot.fqdns.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a.com", "b.com"]);
        assert_eq!(snapshot.resources.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let cache = SnapshotCache::new();
        let source = ScriptedSource::with(vec![
            Ok(vec![record_set("default", "public", &["a.com"])]),
            Err("connection refused".to_string()),
        ]);

        cache.refresh(&source).await.unwrap();
        let before = cache.snapshot();

        let result = cache.refresh(&source).await;

        assert!(matches!(result, Err(SourceError::Unavailable(_))));
        let after = cache.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.generation, 1);
        assert_eq!(after.fqdns.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_first_refresh_stays_empty() {
        let cache = SnapshotCache::new();
        let source = ScriptedSource::with(vec![Err("forbidden".to_string())]);

        assert!(cache.refresh(&source).await.is_err());
        assert!(!cache.is_ready());
    }

    #[tokio::test]
    async fn test_empty_source_still_becomes_ready() {
        let cache = SnapshotCache::new();
        let source = ScriptedSource::with(vec![Ok(Vec::new())]);

        assert_eq!(cache.refresh(&source).await.unwrap(), 1);
        assert!(cache.is_ready());
        assert!(cache.snapshot().fqdns.is_empty());
    }

    #[tokio::test]
    async fn test_wakeup_then_read_is_never_stale() {
        let cache = SnapshotCache::new();
        cache.commit(vec![record_set("default", "public", &["a.com"])]);

        // Subscribe first, commit in the gap before waiting
        let mut subscription = cache.subscribe();
        cache.commit(vec![record_set("default", "public", &["a.com", "b.com"])]);

        let woken = subscription.next().await.unwrap();
        assert_eq!(woken.generation, 2);
        assert_eq!(woken.fqdns.len(), 2);
        assert_eq!(cache.snapshot().generation, 2);
    }

    #[tokio::test]
    async fn test_missed_refreshes_are_coalesced() {
        let cache = SnapshotCache::new();
        let mut subscription = cache.subscribe();

        cache.commit(Vec::new());
        cache.commit(Vec::new());
        cache.commit(vec![record_set("default", "public", &["c.com"])]);

        let latest = subscription.next().await.unwrap();
        assert_eq!(latest.generation, 3);

        let pending = tokio::time::timeout(Duration::from_millis(20), subscription.next()).await;
        assert!(pending.is_err(), "no refresh happened since the last wakeup");
    }

    #[tokio::test]
    async fn test_wait_ready_blocks_until_first_commit() {
        let cache = SnapshotCache::new();
        let mut subscription = cache.subscribe();

        let waiter = tokio::spawn(async move { subscription.wait_ready().await.map(|s| s.generation) });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        cache.commit(vec![record_set("default", "public", &["a.com"])]);

        assert_eq!(waiter.await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_wait_ready_returns_immediately_when_ready() {
        let cache = SnapshotCache::new();
        cache.commit(Vec::new());
        cache.commit(Vec::new());

        let mut subscription = cache.subscribe();
        let snapshot = subscription.wait_ready().await.unwrap();

        assert_eq!(snapshot.generation, 2);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_cache_dropped() {
        let cache = SnapshotCache::new();
        let mut subscription = cache.subscribe();
        drop(cache);

        assert!(subscription.next().await.is_none());
        assert!(subscription.wait_ready().await.is_none());
    }

    #[test]
    fn test_filtered_view() {
        let cache = SnapshotCache::new();
        cache.commit(vec![
            record_set("team-a", "public", &["a.com"]),
            record_set("team-b", "public", &["b.com"]),
        ]);
        let snapshot = cache.snapshot();

        let unfiltered = snapshot.view(&FqdnFilters::default());
        assert!(Arc::ptr_eq(&unfiltered, &snapshot.fqdns));

        let filtered = snapshot.view(&FqdnFilters {
            namespace: Some("team-b".to_string()),
            ..Default::default()
        });
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name(), "b.com");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_refreshes_immediately_and_on_interval() {
        let cache = SnapshotCache::new();
        let source = Arc::new(ScriptedSource::with(vec![
            Ok(vec![record_set("default", "public", &["a.com"])]),
            Err("timeout".to_string()),
            Ok(vec![record_set("default", "public", &["a.com", "b.com"])]),
        ]));
        let cancel = CancellationToken::new();

        let mut subscription = cache.subscribe();
        let handle = {
            let cache = cache.clone();
            let source: Arc<dyn RecordSetSource> = source.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { cache.run(source, Duration::from_secs(30), cancel).await })
        };

        let first = subscription.wait_ready().await.unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(source.calls(), 1);

        // The failed tick commits nothing; the next wakeup is the third scan
        let next = subscription.next().await.unwrap();
        assert_eq!(next.generation, 2);
        assert_eq!(next.fqdns.len(), 2);
        assert_eq!(source.calls(), 3);

        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(cache.snapshot().generation, 2);
    }

    #[tokio::test]
    async fn test_run_exits_when_already_cancelled() {
        let cache = SnapshotCache::new();
        let source: Arc<dyn RecordSetSource> = Arc::new(ScriptedSource::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        cache.run(source, Duration::from_secs(1), cancel).await;

        assert!(!cache.is_ready());
    }
}
