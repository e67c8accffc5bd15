use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::store::Post;

/// Rendered detail pages keyed by slug. An entry never expires out of
/// the map on its own: past the staleness window it is still served
/// while one background refresh replaces it.
pub struct PageCache {
    entries: RwLock<HashMap<String, Entry>>,
    render_gates: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    window: Duration,
}

struct Entry {
    post: Arc<Post>,
    html: Arc<String>,
    rendered_at: DateTime<Utc>,
    refreshing: bool,
}

pub enum Lookup {
    Fresh { post: Arc<Post>, html: Arc<String> },
    Stale { post: Arc<Post>, html: Arc<String> },
    Miss,
}

impl PageCache {
    pub fn new(window: Duration) -> PageCache {
        PageCache {
            entries: RwLock::new(HashMap::new()),
            render_gates: Mutex::new(HashMap::new()),
            window,
        }
    }

    pub fn lookup(&self, slug: &str) -> Lookup {
        let entries = self.entries.read().unwrap();
        match entries.get(slug) {
            Some(entry) => {
                let post = entry.post.clone();
                let html = entry.html.clone();
                if Utc::now() - entry.rendered_at <= self.window {
                    Lookup::Fresh { post, html }
                } else {
                    Lookup::Stale { post, html }
                }
            }
            None => Lookup::Miss,
        }
    }

    /// Claim the refresh of a stale entry. Returns false when another
    /// caller already holds the claim, or when the slug is not cached
    /// at all; at most one refresh runs per entry at a time.
    pub fn begin_refresh(&self, slug: &str) -> bool {
        let mut entries = self.entries.write().unwrap();
        match entries.get_mut(slug) {
            Some(entry) if !entry.refreshing => {
                entry.refreshing = true;
                true
            }
            _ => false,
        }
    }

    /// Release a refresh claim without replacing the entry. The stale
    /// content stays served and a later request may claim again.
    pub fn abort_refresh(&self, slug: &str) {
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.get_mut(slug) {
            entry.refreshing = false;
        }
    }

    /// Insert or replace an entry with freshly rendered content. Clears
    /// any refresh claim on the slug.
    pub fn store(&self, slug: &str, post: Post, html: String) -> (Arc<Post>, Arc<String>) {
        let post = Arc::new(post);
        let html = Arc::new(html);
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            slug.to_string(),
            Entry {
                post: post.clone(),
                html: html.clone(),
                rendered_at: Utc::now(),
                refreshing: false,
            },
        );
        (post, html)
    }

    /// Gate for the first render of one slug. Requests that find no
    /// entry take this lock before querying the store, so concurrent
    /// misses line up behind a single fetch and hit the cache when
    /// their turn comes.
    pub fn render_gate(&self, slug: &str) -> Arc<AsyncMutex<()>> {
        let mut gates = self.render_gates.lock().unwrap();
        gates.entry(slug.to_string()).or_default().clone()
    }

    /// Drop a slug's render gate once its render settled. Requests
    /// still queued on the old gate re-check the cache when they
    /// acquire it.
    pub fn retire_gate(&self, slug: &str) {
        let mut gates = self.render_gates.lock().unwrap();
        gates.remove(slug);
    }

    pub fn remove(&self, slug: &str) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(slug);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::POST_DETAIL_JSON;

    fn sample_post() -> Post {
        serde_json::from_str(POST_DETAIL_JSON).unwrap()
    }

    #[test]
    fn test_lookup_within_window_is_fresh() {
        let cache = PageCache::new(Duration::milliseconds(200));
        let (post, html) = cache.store("hello-world", sample_post(), "<html>".to_string());

        match cache.lookup("hello-world") {
            Lookup::Fresh { post: p, html: h } => {
                assert!(Arc::ptr_eq(&p, &post));
                assert!(Arc::ptr_eq(&h, &html));
            }
            _ => panic!("expected fresh entry"),
        }
    }

    #[test]
    fn test_lookup_past_window_is_stale_with_last_good_content() {
        let cache = PageCache::new(Duration::milliseconds(50));
        cache.store("hello-world", sample_post(), "<html>".to_string());

        std::thread::sleep(std::time::Duration::from_millis(120));
        match cache.lookup("hello-world") {
            Lookup::Stale { html, .. } => assert_eq!(html.as_str(), "<html>"),
            _ => panic!("expected stale entry"),
        }
    }

    #[test]
    fn test_lookup_unknown_slug_is_miss() {
        let cache = PageCache::new(Duration::seconds(60));
        assert!(matches!(cache.lookup("nope"), Lookup::Miss));
    }

    #[test]
    fn test_begin_refresh_is_single_flight() {
        let cache = PageCache::new(Duration::milliseconds(50));
        cache.store("hello-world", sample_post(), "<html>".to_string());

        assert!(cache.begin_refresh("hello-world"));
        assert!(!cache.begin_refresh("hello-world"));
    }

    #[test]
    fn test_begin_refresh_without_entry_is_refused() {
        let cache = PageCache::new(Duration::seconds(60));
        assert!(!cache.begin_refresh("missing"));
    }

    #[test]
    fn test_store_clears_the_refresh_claim() {
        let cache = PageCache::new(Duration::milliseconds(50));
        cache.store("hello-world", sample_post(), "v1".to_string());
        assert!(cache.begin_refresh("hello-world"));

        cache.store("hello-world", sample_post(), "v2".to_string());
        assert!(cache.begin_refresh("hello-world"));
    }

    #[test]
    fn test_abort_refresh_allows_another_claim() {
        let cache = PageCache::new(Duration::milliseconds(50));
        cache.store("hello-world", sample_post(), "<html>".to_string());

        assert!(cache.begin_refresh("hello-world"));
        cache.abort_refresh("hello-world");
        assert!(cache.begin_refresh("hello-world"));

        match cache.lookup("hello-world") {
            Lookup::Fresh { html, .. } | Lookup::Stale { html, .. } => {
                assert_eq!(html.as_str(), "<html>")
            }
            Lookup::Miss => panic!("entry should survive an aborted refresh"),
        }
    }

    #[test]
    fn test_render_gate_is_shared_while_open() {
        let cache = PageCache::new(Duration::seconds(60));
        let first = cache.render_gate("hello-world");
        let second = cache.render_gate("hello-world");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &cache.render_gate("other-slug")));

        let held = first.try_lock().unwrap();
        assert!(second.try_lock().is_err());
        drop(held);
        assert!(second.try_lock().is_ok());
    }

    #[test]
    fn test_retired_gate_is_replaced() {
        let cache = PageCache::new(Duration::seconds(60));
        let first = cache.render_gate("hello-world");
        cache.retire_gate("hello-world");
        assert!(!Arc::ptr_eq(&first, &cache.render_gate("hello-world")));
    }

    #[test]
    fn test_remove_drops_the_entry() {
        let cache = PageCache::new(Duration::seconds(60));
        cache.store("hello-world", sample_post(), "<html>".to_string());
        assert_eq!(cache.len(), 1);

        cache.remove("hello-world");
        assert_eq!(cache.len(), 0);
        assert!(matches!(cache.lookup("hello-world"), Lookup::Miss));
    }
}
