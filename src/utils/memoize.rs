use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

/// Caches `func`'s result per distinct argument.
///
/// The lock is not held while `func` runs, so two racing callers with the
/// same fresh key may both compute it; the first result stored wins.
pub struct Memoized<K, V, F> {
    func: F,
    cache: Mutex<HashMap<K, V>>,
}

impl<K, V, F> Memoized<K, V, F>
where
    K: Hash + Eq + Clone,
    V: Clone,
    F: Fn(&K) -> V,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: K) -> V {
        if let Some(hit) = self.cache.lock().get(&key) {
            return hit.clone();
        }
        let value = (self.func)(&key);
        self.cache.lock().entry(key).or_insert(value).clone()
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn computes_each_key_once() {
        let calls = AtomicUsize::new(0);
        let square = Memoized::new(|n: &u64| {
            calls.fetch_add(1, Ordering::SeqCst);
            n * n
        });

        assert_eq!(square.get(4), 16);
        assert_eq!(square.get(4), 16);
        assert_eq!(square.get(5), 25);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(square.len(), 2);

        square.clear();
        assert!(square.is_empty());
        assert_eq!(square.get(4), 16);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn tuple_keys_stand_in_for_argument_lists() {
        let join = Memoized::new(|(a, b): &(String, u32)| format!("{a}#{b}"));
        assert_eq!(join.get(("note".into(), 3)), "note#3");
        assert_eq!(join.get(("note".into(), 4)), "note#4");
        assert_eq!(join.len(), 2);
    }
}
