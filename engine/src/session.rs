//! Gateway session cookies shared by every proxied call.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Process-wide cookie jar. No expiry tracking: a cookie lives until it is
/// overwritten by a later `Set-Cookie` or the jar is cleared.
#[derive(Debug, Default)]
pub struct SessionStore {
    cookies: Mutex<BTreeMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        match self.cookies.lock() {
            Ok(g) => g,
            Err(e) => {
                warn!(target: "portal", "Recovered from poisoned mutex: cookies");
                e.into_inner()
            }
        }
    }

    /// `Cookie` header value for all known cookies, `None` when the jar is empty.
    pub fn get(&self) -> Option<String> {
        let jar = self.lock();
        if jar.is_empty() { return None; }
        Some(jar.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("; "))
    }

    /// Merge raw `Set-Cookie` header values; last write wins per name.
    pub fn merge<I, S>(&self, set_cookie_headers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut jar = self.lock();
        for header in set_cookie_headers {
            let pair = header.as_ref().split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else { continue };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() { continue; }
            debug!(target: "portal", cookie = name, "stored gateway cookie");
            jar.insert(name.to_string(), value.to_string());
        }
    }

    pub fn clear(&self) { self.lock().clear(); }

    pub fn len(&self) -> usize { self.lock().len() }

    pub fn is_empty(&self) -> bool { self.lock().is_empty() }

    pub fn value(&self, name: &str) -> Option<String> { self.lock().get(name).cloned() }
}
