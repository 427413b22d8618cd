//! Bounded log of dispatched requests.

use std::sync::Arc;

use courier_domain::environment::Environment;
use courier_domain::history::{HistoryEntry, MAX_HISTORY_ENTRIES, RequestHistory};
use courier_domain::request::{FileAttachment, MultipartPart, RequestSnapshot, ResolvedBody, ResolvedRequest};
use tracing::{debug, warn};

use crate::builder::RequestBuilder;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{Clock, KeyValueStore, StoreError, load_json, save_json};

/// Store key for the history list.
pub const HISTORY_KEY: &str = "requestHistory";

/// Request history persisted after every change.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    history: RequestHistory,
}

impl HistoryStore {
    /// Loads history from `store`. An unreadable value starts a fresh log.
    ///
    /// # Errors
    /// Returns an error if the store itself cannot be read.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let entries = match load_json::<Vec<HistoryEntry>>(store.as_ref(), HISTORY_KEY).await {
            Ok(entries) => entries.unwrap_or_default(),
            Err(StoreError::Serialization(message)) => {
                warn!(key = HISTORY_KEY, %message, "ignoring unreadable stored value");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            store,
            clock,
            history: RequestHistory::from_entries(entries, MAX_HISTORY_ENTRIES),
        })
    }

    /// Returns all entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.history.to_vec()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Returns an entry by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.history.get(id)
    }

    /// Records a built request, evicting the oldest past the cap.
    ///
    /// # Errors
    /// Returns an error if the history cannot be persisted. The entry is kept
    /// in memory either way.
    pub async fn record(
        &mut self,
        snapshot: RequestSnapshot,
        request: ResolvedRequest,
        environment: &str,
    ) -> Result<HistoryEntry, StoreError> {
        let entry = HistoryEntry::new(snapshot, request, environment, self.clock.now());
        self.history.add(entry.clone());
        debug!(id = %entry.id, len = self.history.len(), "history entry recorded");

        self.persist().await?;
        Ok(entry)
    }

    /// Removes every entry.
    ///
    /// # Errors
    /// Returns an error if the empty history cannot be persisted.
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.history.clear();
        self.persist().await
    }

    /// Rebuilds the request of entry `id` against `environment`.
    ///
    /// Attachments are taken from the stored request, so files need not
    /// still exist on disk.
    ///
    /// # Errors
    /// Returns `HistoryNotFound` or a build error.
    pub fn replay(
        &self,
        id: &str,
        environment: &Environment,
    ) -> ApplicationResult<(RequestSnapshot, ResolvedRequest)> {
        let entry = self
            .history
            .get(id)
            .ok_or_else(|| ApplicationError::HistoryNotFound(id.to_string()))?;

        let files = stored_files(&entry.request);
        let request = RequestBuilder::build_loaded(&entry.snapshot, &files, environment)?;
        Ok((entry.snapshot.clone(), request))
    }

    async fn persist(&self) -> Result<(), StoreError> {
        save_json(self.store.as_ref(), HISTORY_KEY, &self.history.to_vec())
            .await
            .inspect_err(|e| warn!(error = %e, "failed to persist history"))
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("len", &self.history.len())
            .finish_non_exhaustive()
    }
}

/// Recovers the loaded attachments from a stored multipart body.
fn stored_files(request: &ResolvedRequest) -> Vec<FileAttachment> {
    let ResolvedBody::Multipart(payload) = &request.body else {
        return Vec::new();
    };
    payload
        .parts
        .iter()
        .filter_map(|part| match part {
            MultipartPart::File {
                field,
                file_name,
                content,
            } => Some(FileAttachment::new(
                file_name.clone(),
                Some(field.clone()),
                content.clone(),
            )),
            MultipartPart::Text { .. } => None,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use courier_domain::auth::AuthSpec;
    use courier_domain::request::{Attachment, BodySpec, BodyType, FormSpec, HttpMethod};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[derive(Default)]
    struct MockStore {
        values: Mutex<HashMap<String, Value>>,
    }

    #[async_trait]
    impl KeyValueStore for MockStore {
        async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
            self.values.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()))
    }

    fn env() -> Environment {
        Environment::new("dev")
            .with_variable("host", "api.example.com")
            .with_variable("token", "secret")
    }

    fn snapshot(path: &str) -> RequestSnapshot {
        RequestSnapshot::new(HttpMethod::Get, format!("https://{{{{host}}}}/{path}"))
    }

    #[tokio::test]
    async fn test_record_caps_and_persists() {
        let backing = Arc::new(MockStore::default());
        let mut store = HistoryStore::load(backing.clone(), clock()).await.unwrap();
        let env = env();

        for i in 0..25 {
            let snap = snapshot(&i.to_string());
            let request = RequestBuilder::build_loaded(&snap, &[], &env).unwrap();
            store.record(snap, request, "dev").await.unwrap();
        }

        assert_eq!(store.len(), 20);
        assert_eq!(store.entries()[0].request.url, "https://api.example.com/24");

        let persisted = backing.values.lock().unwrap().get(HISTORY_KEY).cloned().unwrap();
        assert_eq!(persisted.as_array().unwrap().len(), 20);

        let reloaded = HistoryStore::load(backing.clone(), clock()).await.unwrap();
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[tokio::test]
    async fn test_clear() {
        let backing = Arc::new(MockStore::default());
        let mut store = HistoryStore::load(backing.clone(), clock()).await.unwrap();
        let snap = snapshot("x");
        let request = RequestBuilder::build_loaded(&snap, &[], &env()).unwrap();
        store.record(snap, request, "dev").await.unwrap();

        store.clear().await.unwrap();

        assert!(store.is_empty());
        assert_eq!(
            backing.values.lock().unwrap().get(HISTORY_KEY).cloned(),
            Some(Value::Array(vec![]))
        );
    }

    #[tokio::test]
    async fn test_replay_reproduces_request() {
        let backing = Arc::new(MockStore::default());
        let mut store = HistoryStore::load(backing, clock()).await.unwrap();
        let env = env();

        let mut form = FormSpec::new(r#"{"note":"{{host}}"}"#);
        form.attach(Attachment::inline("a.bin", vec![1, 2, 3]));
        form.attach(Attachment::from_path("gone.txt", "/no/such/file").with_field("doc"));
        let snap = snapshot("upload")
            .with_headers(r#"{"X-Env":"{{host}}"}"#)
            .with_auth(AuthSpec::bearer("{{token}}"))
            .with_body(BodySpec::Formdata(form));
        let files = vec![
            FileAttachment::new("a.bin", None, vec![1, 2, 3]),
            FileAttachment::new("gone.txt", Some("doc".into()), b"old bytes".to_vec()),
        ];
        let original = RequestBuilder::build_loaded(&snap, &files, &env).unwrap();
        let entry = store.record(snap.clone(), original.clone(), "dev").await.unwrap();

        let (replayed_snapshot, replayed) = store.replay(&entry.id, &env).unwrap();

        assert_eq!(replayed_snapshot, snap);
        assert_eq!(replayed, original);
        assert_eq!(replayed.body_type, BodyType::Formdata);
    }

    #[tokio::test]
    async fn test_replay_unknown_id() {
        let store = HistoryStore::load(Arc::new(MockStore::default()), clock())
            .await
            .unwrap();
        assert!(matches!(
            store.replay("missing", &env()),
            Err(ApplicationError::HistoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_history_starts_empty() {
        let backing = Arc::new(MockStore::default());
        backing
            .values
            .lock()
            .unwrap()
            .insert(HISTORY_KEY.to_string(), Value::String("garbage".into()));

        let store = HistoryStore::load(backing, clock()).await.unwrap();
        assert!(store.is_empty());
    }
}
