//! SessionClient: the partner session handle.
//!
//! Sessions have no expiry timer. An invalid session shows up as a
//! `Forbidden` answer to a later filter call and is then replaced.

use std::sync::Arc;

use workplan_external::info_rtu::{RtuExternalProject, RtuFilter};

use crate::ports::{RtuApi, SessionError};

/// Thin stateful wrapper around [`RtuApi`] tracking the current session id.
pub struct SessionClient {
    api: Arc<dyn RtuApi>,
    session_id: Option<String>,
}

impl SessionClient {
    pub fn new(api: Arc<dyn RtuApi>) -> Self {
        Self {
            api,
            session_id: None,
        }
    }

    /// Open a fresh session, replacing the current one.
    pub async fn open(&mut self) -> Result<&str, SessionError> {
        let id = self.api.open_session().await?;
        tracing::debug!("Partner session opened");
        Ok(self.session_id.insert(id).as_str())
    }

    /// Attach `filter` to the current session.
    pub async fn set_filter(&self, filter: &RtuFilter) -> Result<(), SessionError> {
        let id = self.require_session()?;
        self.api.set_filter(id, filter).await
    }

    /// List projects matching the current session's filter.
    pub async fn list_projects(&self) -> Result<Vec<RtuExternalProject>, SessionError> {
        let id = self.require_session()?;
        self.api.list_projects(id).await
    }

    fn require_session(&self) -> Result<&str, SessionError> {
        self.session_id
            .as_deref()
            .ok_or_else(|| SessionError::Unexpected("no open session".to_string()))
    }
}
