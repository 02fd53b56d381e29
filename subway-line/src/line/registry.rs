//! In-memory line registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::{LineId, PathError, Placement, Station};

use super::{Line, LineConfig};

/// Errors returned by [`LineRegistry`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No line with this id
    #[error("{0} not found")]
    LineNotFound(LineId),

    /// A line with this id is already registered
    #[error("{0} already exists")]
    LineExists(LineId),

    /// Every line id has been handed out
    #[error("no line ids left to assign")]
    IdsExhausted,

    /// The path rejected the operation
    #[error(transparent)]
    Path(#[from] PathError),
}

#[derive(Default)]
struct Inner {
    lines: HashMap<LineId, Arc<Mutex<Line>>>,
    next_id: u64,
}

/// Thread-safe registry of lines.
///
/// The map lock is only held to find a line; each line has its own mutex,
/// so mutations of one line are serialized without blocking other lines.
#[derive(Clone, Default)]
pub struct LineRegistry {
    inner: Arc<RwLock<Inner>>,
    config: Arc<LineConfig>,
}

impl LineRegistry {
    /// Create an empty registry.
    pub fn new(config: LineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    /// Create a line with its first section and return its id.
    pub async fn create(
        &self,
        name: &str,
        color: &str,
        up: Station,
        down: Station,
        length: i64,
    ) -> Result<LineId, RegistryError> {
        let mut guard = self.inner.write().await;
        let id = guard
            .next_id
            .checked_add(1)
            .map(LineId)
            .ok_or(RegistryError::IdsExhausted)?;
        let line = Line::new(id, name, color, up, down, length)?;

        guard.next_id = id.0;
        guard.lines.insert(id, Arc::new(Mutex::new(line)));
        debug!(line = %id, name, "Created line");
        Ok(id)
    }

    /// Register a previously stored line under its own id.
    pub async fn restore(&self, line: Line) -> Result<(), RegistryError> {
        let mut guard = self.inner.write().await;
        let id = line.id();
        if guard.lines.contains_key(&id) {
            return Err(RegistryError::LineExists(id));
        }
        guard.next_id = guard.next_id.max(id.0);
        guard.lines.insert(id, Arc::new(Mutex::new(line)));
        Ok(())
    }

    async fn line(&self, id: LineId) -> Result<Arc<Mutex<Line>>, RegistryError> {
        let guard = self.inner.read().await;
        guard
            .lines
            .get(&id)
            .cloned()
            .ok_or(RegistryError::LineNotFound(id))
    }

    /// A snapshot of the line.
    pub async fn get(&self, id: LineId) -> Result<Line, RegistryError> {
        let line = self.line(id).await?;
        let guard = line.lock().await;
        Ok(guard.clone())
    }

    /// Ids of all registered lines, ascending.
    pub async fn ids(&self) -> Vec<LineId> {
        let guard = self.inner.read().await;
        let mut ids: Vec<LineId> = guard.lines.keys().copied().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.lines.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lines.is_empty()
    }

    /// Change a line's name and colour.
    pub async fn rename(
        &self,
        id: LineId,
        name: &str,
        color: &str,
    ) -> Result<(), RegistryError> {
        let line = self.line(id).await?;
        line.lock().await.rename(name, color);
        Ok(())
    }

    /// Remove a line entirely, returning it.
    pub async fn delete(&self, id: LineId) -> Result<Line, RegistryError> {
        let removed = self
            .inner
            .write()
            .await
            .lines
            .remove(&id)
            .ok_or(RegistryError::LineNotFound(id))?;
        let line = removed.lock().await.clone();
        debug!(line = %id, "Deleted line");
        Ok(line)
    }

    /// Stations of a line in path order.
    pub async fn stations(&self, id: LineId) -> Result<Vec<Station>, RegistryError> {
        let line = self.line(id).await?;
        let guard = line.lock().await;
        Ok(guard.stations()?)
    }

    /// Add a section to a line.
    pub async fn add_section(
        &self,
        id: LineId,
        up: Station,
        down: Station,
        length: i64,
    ) -> Result<Placement, RegistryError> {
        let line = self.line(id).await?;
        let mut guard = line.lock().await;
        guard.add_section(up, down, length).map_err(|e| {
            warn!(line = %id, error = %e, "Rejected section");
            RegistryError::from(e)
        })
    }

    /// Remove a station from a line under the configured removal policy.
    pub async fn remove_station(
        &self,
        id: LineId,
        station: &Station,
    ) -> Result<(), RegistryError> {
        let line = self.line(id).await?;
        let mut guard = line.lock().await;
        guard
            .remove_station(station, self.config.removal_policy)
            .map_err(|e| {
                warn!(line = %id, station = %station, error = %e, "Rejected station removal");
                RegistryError::from(e)
            })
    }
}
