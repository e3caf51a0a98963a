use std::sync::{Arc, Mutex, MutexGuard};
use super::{data::DictionaryLoader, word::Dictionary};

///
/// Holds the Dictionary once it has been loaded, and loads it the first time somebody asks.
///
/// The mutex is held for the whole load, so callers that race on the first `get` wait for the one
/// load already in flight instead of starting their own. After that, `get` hands out a cheap Arc
/// clone and callers never hold the lock while they work.
///
pub struct DictionaryCache {
    loader: DictionaryLoader,
    loaded: Mutex<Option<Arc<Dictionary>>>,
}

impl Default for DictionaryCache {
    fn default() -> Self {
        Self::new(DictionaryLoader::default())
    }
}

impl DictionaryCache {
    pub fn new(loader: DictionaryLoader) -> Self {
        Self {
            loader,
            loaded: Mutex::new(None),
        }
    }

    /// A cache that starts out holding the given dictionary. `reload` still uses the loader.
    pub fn preloaded(loader: DictionaryLoader, dictionary: Dictionary) -> Self {
        Self {
            loader,
            loaded: Mutex::new(Some(Arc::new(dictionary))),
        }
    }

    // the only thing done under the lock is swapping an Option, so a poisoned lock still holds a
    // consistent value
    fn lock(&self) -> MutexGuard<'_, Option<Arc<Dictionary>>> {
        self.loaded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Arc<Dictionary> {
        let mut loaded = self.lock();
        if let Some(dictionary) = loaded.as_ref() {
            return dictionary.clone();
        }

        let dictionary = Arc::new(self.loader.load());
        log::debug!("dictionary cache loaded {} words", dictionary.len());
        *loaded = Some(dictionary.clone());
        dictionary
    }

    /// Loads the dictionary again and swaps it in. Callers holding the old Arc keep using it.
    pub fn reload(&self) -> Arc<Dictionary> {
        let dictionary = Arc::new(self.loader.load());
        log::debug!("dictionary cache reloaded {} words", dictionary.len());
        *self.lock() = Some(dictionary.clone());
        dictionary
    }

    /// Drops the cached dictionary, the next `get` loads it again
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }
}
