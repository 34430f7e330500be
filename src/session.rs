use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::Error;

/// Handle to the per-request session payload.
///
/// Inserted into request extensions by the session layer. Cheap to clone;
/// clones share the same payload.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Payload as loaded from the request cookie. Never mutated.
    previous: Option<Value>,
    current: Mutex<Option<Value>>,
}

/// What the response should do with the session cookie.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionAction {
    /// No session before, none now.
    Noop,
    /// Fresh or modified payload to sign.
    Save(Value),
    /// Unchanged payload; re-sign to slide the expiry window.
    Touch(Value),
    /// Session was cleared; expire the cookie.
    Destroy,
}

impl Session {
    pub(crate) fn new(loaded: Option<Value>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                previous: loaded.clone(),
                current: Mutex::new(loaded),
            }),
        }
    }

    /// Deserialize the payload into `T`.
    ///
    /// Returns `Ok(None)` when no session is present.
    pub fn get<T: DeserializeOwned>(&self) -> Result<Option<T>, Error> {
        self.value()
            .map(|value| serde_json::from_value(value).map_err(Error::Deserialize))
            .transpose()
    }

    /// The raw payload, if any.
    pub fn value(&self) -> Option<Value> {
        self.lock_current().clone()
    }

    /// Replace the payload.
    ///
    /// Serializing to JSON `null` clears the session instead: `null` is the
    /// absence marker on the wire.
    pub fn set<T: Serialize>(&self, data: T) -> Result<(), Error> {
        let value = serde_json::to_value(data).map_err(Error::Serialize)?;
        *self.lock_current() = if value.is_null() { None } else { Some(value) };
        Ok(())
    }

    /// Drop the payload. If a session was loaded, the response will expire
    /// the cookie.
    pub fn clear(&self) {
        *self.lock_current() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.lock_current().is_none()
    }

    /// Compare the loaded snapshot against the final payload and decide what
    /// the response cookie should do. Called once, after the inner service
    /// has run.
    pub(crate) fn finalize(&self) -> SessionAction {
        let current = self.lock_current();
        match (&self.inner.previous, &*current) {
            (None, None) => SessionAction::Noop,
            (Some(previous), Some(current)) if previous == current => {
                SessionAction::Touch(current.clone())
            }
            (_, Some(current)) => SessionAction::Save(current.clone()),
            (Some(_), None) => SessionAction::Destroy,
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<Value>> {
        // The guard never crosses user code; a poisoned lock still holds a
        // fully written payload.
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
