// Message channel to the privileged background process.
// The snapshot may arrive late or not at all; callers keep serving the last one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ServiceError;
use crate::modules::backoff::calculate_backoff;
use crate::settings::BackoffSettings;
use crate::state::{Tab, WindowId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TabEventKind {
    Created,
    Updated,
    Removed,
    Moved,
    Attached,
    Detached,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BackgroundMessage {
    /// Full tab list. Always replaces what we have.
    Tabs { tabs: Vec<Tab> },
    /// Something changed; treated as "refetch everything", never as a patch.
    TabEvent { kind: TabEventKind },
    #[serde(rename_all = "camelCase")]
    ActiveWindow { window_id: Option<WindowId> },
}

/// Requests the page sends to the background process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageRequest {
    GetTabs,
}

pub struct BackgroundPort {
    pub name: String,
    outgoing: mpsc::UnboundedSender<PageRequest>,
    incoming: mpsc::UnboundedReceiver<BackgroundMessage>,
}

impl BackgroundPort {
    pub fn new(
        name: impl Into<String>,
        outgoing: mpsc::UnboundedSender<PageRequest>,
        incoming: mpsc::UnboundedReceiver<BackgroundMessage>,
    ) -> Self {
        Self { name: name.into(), outgoing, incoming }
    }

    pub fn send(&self, request: PageRequest) -> Result<(), ServiceError> {
        self.outgoing.send(request).map_err(|_| ServiceError::Disconnected)
    }

    /// `None` once the background side hung up.
    pub async fn recv(&mut self) -> Option<BackgroundMessage> {
        self.incoming.recv().await
    }
}

#[async_trait]
pub trait BackgroundConnector: Send + Sync {
    async fn connect(&self, name: &str) -> Result<BackgroundPort, ServiceError>;
}

/// Connect, retrying per `settings` until the backoff policy gives up.
pub async fn connect_with_retry(
    connector: &dyn BackgroundConnector,
    name: &str,
    settings: &BackoffSettings,
) -> Result<BackgroundPort, ServiceError> {
    let mut attempt = 0;
    loop {
        match connector.connect(name).await {
            Ok(port) => {
                log::info!("[Channel] Connected '{}' after {} attempt(s)", name, attempt + 1);
                return Ok(port);
            }
            Err(e) => {
                let Some(delay) = calculate_backoff(attempt, settings) else {
                    log::error!("[Channel] Giving up on '{}' after {} attempts: {}", name, attempt + 1, e);
                    return Err(e);
                };
                log::warn!("[Channel] Connect '{}' failed ({}), retrying in {:?}", name, e, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
