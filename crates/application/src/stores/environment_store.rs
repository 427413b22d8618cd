//! Named environments and the active selection.

use std::sync::Arc;

use courier_domain::environment::{DEFAULT_ENVIRONMENT, Environment};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::ports::{KeyValueStore, StoreError, load_json};

/// Store key for the environment list.
pub const ENVIRONMENTS_KEY: &str = "apiEnvironments";

/// Store key for the active environment name.
pub const ACTIVE_ENVIRONMENT_KEY: &str = "activeEnvironment";

/// Errors that can occur during environment operations.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// Environment not found.
    #[error("Environment not found: {0}")]
    NotFound(String),

    /// An environment with this name already exists.
    #[error("Environment '{0}' already exists")]
    AlreadyExists(String),

    /// The default environment cannot be renamed or deleted.
    #[error("Environment '{0}' is reserved")]
    ReservedName(String),

    /// Names must contain something other than whitespace.
    #[error("Name must not be empty")]
    EmptyName,

    /// Persisting the change failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Environments in creation order, with `default` always first.
pub struct EnvironmentStore {
    store: Arc<dyn KeyValueStore>,
    environments: Vec<Environment>,
    active: String,
    sender: watch::Sender<Environment>,
}

impl EnvironmentStore {
    /// Loads environments and the active selection from `store`.
    ///
    /// Unreadable stored values are logged and replaced by defaults.
    ///
    /// # Errors
    /// Returns an error if the store itself cannot be read.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let environments = load_json::<Vec<Environment>>(store.as_ref(), ENVIRONMENTS_KEY)
            .await
            .or_else(recover_corrupt(ENVIRONMENTS_KEY))?
            .unwrap_or_default();
        let active = load_json::<String>(store.as_ref(), ACTIVE_ENVIRONMENT_KEY)
            .await
            .or_else(recover_corrupt(ACTIVE_ENVIRONMENT_KEY))?
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let (environments, active) = normalize(environments, active);
        info!(count = environments.len(), %active, "environments loaded");

        Ok(Self::from_parts(store, environments, active))
    }

    fn from_parts(store: Arc<dyn KeyValueStore>, environments: Vec<Environment>, active: String) -> Self {
        let current = environments
            .iter()
            .find(|e| e.name == active)
            .cloned()
            .unwrap_or_else(Environment::default_environment);
        let (sender, _) = watch::channel(current);
        Self {
            store,
            environments,
            active,
            sender,
        }
    }

    /// Returns all environments.
    #[must_use]
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Returns an environment by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Returns the active environment.
    #[must_use]
    pub fn active(&self) -> Environment {
        self.get(&self.active)
            .cloned()
            .unwrap_or_else(Environment::default_environment)
    }

    /// Returns the active environment's name.
    #[must_use]
    pub fn active_name(&self) -> &str {
        &self.active
    }

    /// Subscribes to changes of the active environment.
    ///
    /// The receiver sees the active environment after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Environment> {
        self.sender.subscribe()
    }

    /// Creates an empty environment.
    ///
    /// # Errors
    /// Returns `EmptyName`, `AlreadyExists`, or a store error.
    pub async fn create(&mut self, name: &str) -> Result<(), EnvironmentError> {
        let name = valid_name(name)?;
        if self.get(name).is_some() {
            return Err(EnvironmentError::AlreadyExists(name.to_string()));
        }
        self.update(|environments, _| {
            environments.push(Environment::new(name));
            Ok(())
        })
        .await
    }

    /// Renames an environment, following the active selection.
    ///
    /// # Errors
    /// Returns `ReservedName` for `default`, `NotFound`, `AlreadyExists`,
    /// `EmptyName`, or a store error.
    pub async fn rename(&mut self, old: &str, new: &str) -> Result<(), EnvironmentError> {
        if old == DEFAULT_ENVIRONMENT {
            return Err(EnvironmentError::ReservedName(old.to_string()));
        }
        let new = valid_name(new)?;
        if new == DEFAULT_ENVIRONMENT {
            return Err(EnvironmentError::ReservedName(new.to_string()));
        }
        if new != old && self.get(new).is_some() {
            return Err(EnvironmentError::AlreadyExists(new.to_string()));
        }

        self.update(|environments, active| {
            find_mut(environments, old)?.name = new.to_string();
            if active == old {
                *active = new.to_string();
            }
            Ok(())
        })
        .await
    }

    /// Deletes an environment. Deleting the active one re-activates `default`.
    ///
    /// # Errors
    /// Returns `ReservedName` for `default`, `NotFound`, or a store error.
    pub async fn delete(&mut self, name: &str) -> Result<(), EnvironmentError> {
        if name == DEFAULT_ENVIRONMENT {
            return Err(EnvironmentError::ReservedName(name.to_string()));
        }
        self.update(|environments, active| {
            let before = environments.len();
            environments.retain(|e| e.name != name);
            if environments.len() == before {
                return Err(EnvironmentError::NotFound(name.to_string()));
            }
            if active == name {
                *active = DEFAULT_ENVIRONMENT.to_string();
            }
            Ok(())
        })
        .await
    }

    /// Sets a variable, coercing non-string values to text.
    ///
    /// # Errors
    /// Returns `NotFound`, `EmptyName` for a blank key, or a store error.
    pub async fn set_variable(
        &mut self,
        environment: &str,
        key: &str,
        value: &Value,
    ) -> Result<(), EnvironmentError> {
        let key = valid_name(key)?;
        self.update(|environments, _| {
            find_mut(environments, environment)?.set_value(key, value);
            Ok(())
        })
        .await
    }

    /// Removes a variable. Returns whether it existed.
    ///
    /// # Errors
    /// Returns `NotFound` or a store error.
    pub async fn remove_variable(
        &mut self,
        environment: &str,
        key: &str,
    ) -> Result<bool, EnvironmentError> {
        let exists = self
            .get(environment)
            .ok_or_else(|| EnvironmentError::NotFound(environment.to_string()))?
            .resolve(key)
            .is_some();
        if !exists {
            return Ok(false);
        }
        self.update(|environments, _| {
            Ok(find_mut(environments, environment)?
                .remove_variable(key)
                .is_some())
        })
        .await
    }

    /// Makes `name` the active environment.
    ///
    /// # Errors
    /// Returns `NotFound` or a store error.
    pub async fn activate(&mut self, name: &str) -> Result<(), EnvironmentError> {
        if self.get(name).is_none() {
            return Err(EnvironmentError::NotFound(name.to_string()));
        }
        self.update(|_, active| {
            *active = name.to_string();
            Ok(())
        })
        .await
    }

    /// Replaces every environment and the active selection at once.
    ///
    /// Duplicate names keep their first occurrence, `default` is restored if
    /// missing, and an unknown active name falls back to `default`.
    ///
    /// # Errors
    /// Returns a store error.
    pub async fn replace_all(
        &mut self,
        environments: Vec<Environment>,
        active: String,
    ) -> Result<(), EnvironmentError> {
        let (environments, active) = normalize(environments, active);
        self.update(|current, current_active| {
            *current = environments;
            *current_active = active;
            Ok(())
        })
        .await
    }

    /// Applies `change` to a copy of the state and persists it. Only a
    /// successful write replaces the in-memory state and republishes the
    /// active environment; on failure nothing changes.
    async fn update<T>(
        &mut self,
        change: impl FnOnce(&mut Vec<Environment>, &mut String) -> Result<T, EnvironmentError>,
    ) -> Result<T, EnvironmentError> {
        let mut environments = self.environments.clone();
        let mut active = self.active.clone();
        let outcome = change(&mut environments, &mut active)?;

        self.persist(&environments, &active).await?;

        self.environments = environments;
        self.active = active;
        self.sender.send_replace(self.active());
        Ok(outcome)
    }

    async fn persist(
        &self,
        environments: &[Environment],
        active: &str,
    ) -> Result<(), EnvironmentError> {
        let entries = vec![
            (
                ENVIRONMENTS_KEY.to_string(),
                serde_json::to_value(environments).map_err(StoreError::from)?,
            ),
            (
                ACTIVE_ENVIRONMENT_KEY.to_string(),
                Value::String(active.to_string()),
            ),
        ];
        self.store.set_many(entries).await.map_err(|e| {
            warn!(error = %e, "failed to persist environments");
            EnvironmentError::from(e)
        })
    }
}

impl std::fmt::Debug for EnvironmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentStore")
            .field("environments", &self.environments)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

fn find_mut<'a>(
    environments: &'a mut [Environment],
    name: &str,
) -> Result<&'a mut Environment, EnvironmentError> {
    environments
        .iter_mut()
        .find(|e| e.name == name)
        .ok_or_else(|| EnvironmentError::NotFound(name.to_string()))
}

fn valid_name(name: &str) -> Result<&str, EnvironmentError> {
    Environment::validate_name(name).map_err(|_| EnvironmentError::EmptyName)
}

fn recover_corrupt<T>(key: &'static str) -> impl FnOnce(StoreError) -> Result<Option<T>, StoreError> {
    move |error| match error {
        StoreError::Serialization(message) => {
            warn!(key, %message, "ignoring unreadable stored value");
            Ok(None)
        }
        other => Err(other),
    }
}

fn normalize(environments: Vec<Environment>, active: String) -> (Vec<Environment>, String) {
    let mut result: Vec<Environment> = Vec::with_capacity(environments.len() + 1);
    for environment in environments {
        if environment.name.trim().is_empty() || result.iter().any(|e| e.name == environment.name)
        {
            continue;
        }
        result.push(environment);
    }

    match result.iter().position(Environment::is_default) {
        Some(0) => {}
        Some(index) => {
            let default = result.remove(index);
            result.insert(0, default);
        }
        None => result.insert(0, Environment::default_environment()),
    }

    let active = if result.iter().any(|e| e.name == active) {
        active
    } else {
        DEFAULT_ENVIRONMENT.to_string()
    };
    (result, active)
}
