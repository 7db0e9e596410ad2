// ==============================================
// LFU EVICTION SCENARIOS (integration)
// ==============================================
//
// End-to-end checks of the eviction contract through the public API only,
// for both the single-owner engine and the shared handle.

use expensekit::policy::lfu::LfuCache;
use expensekit::sync::SharedLfuCache;
use expensekit::traits::{ConcurrentCache, CoreCache};

fn resident<C: CoreCache<i64, &'static str>>(cache: &C, keys: &[i64]) -> Vec<i64> {
    keys.iter().copied().filter(|k| cache.contains(k)).collect()
}

mod engine {
    use super::*;

    #[test]
    fn frequent_key_outlives_newer_cold_key() {
        let mut cache = LfuCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.get(&1), Some("a"));
        cache.put(3, "c");

        assert_eq!(resident(&cache, &[1, 2, 3]), vec![1, 3]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn tie_evicts_oldest_touch() {
        let mut cache = LfuCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");

        assert_eq!(resident(&cache, &[1, 2, 3]), vec![2, 3]);
    }

    #[test]
    fn capacity_zero_never_stores() {
        let mut cache = LfuCache::new(0);
        cache.put(1, "a");
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn overwrite_then_get_reaches_frequency_three() {
        let mut cache = LfuCache::new(2);
        cache.put(1, "a");
        cache.put(1, "b");
        assert_eq!(cache.get(&1), Some("b"));
        // insert + overwrite + get
        assert_eq!(cache.frequency(&1), Some(3));
    }

    #[test]
    fn trait_object_drives_engine() {
        let mut cache: LfuCache<i64, &str> = LfuCache::new(3);
        let dyn_cache: &mut dyn CoreCache<i64, &str> = &mut cache;
        dyn_cache.put(1, "a");
        dyn_cache.put(2, "b");
        assert_eq!(dyn_cache.remove(&1), Some("a"));
        assert_eq!(dyn_cache.len(), 1);
        dyn_cache.clear();
        assert!(dyn_cache.is_empty());
        assert_eq!(dyn_cache.capacity(), 3);
    }

    #[test]
    fn victim_is_reported_before_eviction() {
        let mut cache = LfuCache::new(3);
        cache.put(10, "x");
        cache.put(20, "y");
        cache.put(30, "z");
        cache.get(&10);
        cache.get(&30);

        let victim = cache.peek_victim().map(|(k, _)| *k);
        assert_eq!(victim, Some(20));
        cache.put(40, "w");
        assert!(!cache.contains(&20));
        assert_eq!(cache.keys_by_eviction_order(), vec![40, 10, 30]);
    }
}

mod shared {
    use super::*;

    #[test]
    fn scenarios_hold_through_shared_handle() {
        let cache: SharedLfuCache<i64, &str> = SharedLfuCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);
        cache.put(3, "c");
        assert!(cache.contains(&1) && cache.contains(&3) && !cache.contains(&2));

        let cache: SharedLfuCache<i64, &str> = SharedLfuCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        assert!(!cache.contains(&1) && cache.contains(&2) && cache.contains(&3));
    }

    #[test]
    fn remove_then_get_misses() {
        let cache: SharedLfuCache<i64, String> = SharedLfuCache::new(8);
        cache.put(1, "a".into());
        assert_eq!(cache.remove(&1), Some("a".to_string()));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.remove(&1), None);
    }

    #[test]
    fn clear_forgets_everything() {
        let cache: SharedLfuCache<i64, i64> = SharedLfuCache::with_shards(20, 3, 5);
        for k in 0..20 {
            cache.put(k, k * 10);
        }
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!((0..20).all(|k| cache.get(&k).is_none()));
        cache.check_invariants().unwrap();
    }
}
