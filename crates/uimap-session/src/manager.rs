//! Session manager for coordinating sessions against several applications.

use std::collections::HashMap;

use tracing::info;

use uimap_core::{Error, PerceptionConfig, Result, SessionId, SessionInfo, SessionSettings};
use uimap_driver::Driver;

use crate::session::Session;

/// Configuration for session manager.
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self::from_settings(&SessionSettings::default())
    }
}

impl SessionManagerConfig {
    /// Configuration from the `session` configuration section.
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            max_sessions: settings.max_sessions,
        }
    }
}

/// Owner of every open session.
///
/// Sessions are created and dropped explicitly; nothing is process-global.
#[derive(Debug)]
pub struct SessionManager<D: Driver> {
    sessions: HashMap<SessionId, Session<D>>,
    config: SessionManagerConfig,
}

impl<D: Driver> SessionManager<D> {
    /// Create a new session manager with default configuration.
    pub fn new() -> Self {
        Self::with_config(SessionManagerConfig::default())
    }

    /// Create a new session manager with custom configuration.
    pub fn with_config(config: SessionManagerConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Open a session on `driver`.
    pub fn create_session(&mut self, driver: D, config: PerceptionConfig) -> Result<&mut Session<D>> {
        if self.sessions.len() >= self.config.max_sessions {
            return Err(Error::SessionLimitReached(self.config.max_sessions));
        }
        self.insert(Session::new(driver, config))
    }

    /// Register an already built session (for example one resumed from cache).
    pub fn insert(&mut self, session: Session<D>) -> Result<&mut Session<D>> {
        if self.sessions.len() >= self.config.max_sessions {
            return Err(Error::SessionLimitReached(self.config.max_sessions));
        }
        let id = *session.id();
        Ok(self.sessions.entry(id).or_insert(session))
    }

    /// Get a session by ID.
    pub fn get_session(&self, session_id: &SessionId) -> Result<&Session<D>> {
        self.sessions
            .get(session_id)
            .ok_or(Error::SessionNotFound(*session_id))
    }

    /// Get a session by ID for loading or gestures.
    pub fn get_session_mut(&mut self, session_id: &SessionId) -> Result<&mut Session<D>> {
        self.sessions
            .get_mut(session_id)
            .ok_or(Error::SessionNotFound(*session_id))
    }

    /// List all open sessions.
    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        self.sessions.values().map(Session::info).collect()
    }

    /// Close a session by ID.
    pub fn close_session(&mut self, session_id: &SessionId) -> Result<()> {
        let mut session = self
            .sessions
            .remove(session_id)
            .ok_or(Error::SessionNotFound(*session_id))?;
        session.close();
        Ok(())
    }

    /// Close all sessions.
    pub fn close_all(&mut self) {
        let count = self.sessions.len();
        for (_, mut session) in self.sessions.drain() {
            session.close();
        }
        if count > 0 {
            info!("Closed {} session(s)", count);
        }
    }

    /// Get the number of open sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl<D: Driver> Default for SessionManager<D> {
    fn default() -> Self {
        Self::new()
    }
}
