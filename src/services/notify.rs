//! In-process local notification scheduling

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::services::NotificationScheduler;

/// Errors surfaced by the notification collaborator
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("fire time is in the past")]
    PastFireTime,

    #[error("notification permission denied")]
    PermissionDenied,
}

/// A registration waiting to fire
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// A notification that reached its fire time
#[derive(Debug, Clone)]
pub struct DeliveredNotification {
    pub id: String,
    pub title: String,
    pub body: String,
}

/// Local notification center.
///
/// Registrations are keyed by id; re-registering a key replaces the prior
/// registration. Each pending notification is a sleeping task that delivers
/// on a broadcast channel when it fires.
pub struct LocalNotificationCenter {
    pending: Arc<RwLock<HashMap<String, (NotificationRequest, JoinHandle<()>)>>>,
    delivered: broadcast::Sender<DeliveredNotification>,
    granted: AtomicBool,
}

impl LocalNotificationCenter {
    pub fn new() -> Self {
        let (delivered, _) = broadcast::channel(32);
        Self {
            pending: Arc::new(RwLock::new(HashMap::new())),
            delivered,
            granted: AtomicBool::new(false),
        }
    }

    /// Subscribe to notifications as they fire
    pub fn on_delivery(&self) -> broadcast::Receiver<DeliveredNotification> {
        self.delivered.subscribe()
    }

    /// Ids of every registration still waiting to fire
    pub async fn pending_ids(&self) -> Vec<String> {
        self.pending.read().await.keys().cloned().collect()
    }

    /// The registration waiting under `id`, if any
    pub async fn pending_request(&self, id: &str) -> Option<NotificationRequest> {
        self.pending.read().await.get(id).map(|(req, _)| req.clone())
    }

    /// Whether the one-time permission request has been made and granted
    pub fn permission_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }
}

impl Default for LocalNotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationScheduler for LocalNotificationCenter {
    async fn request_permission(&self) -> Result<bool, NotifyError> {
        // The in-process center has nothing to deny; platform backends
        // forward the OS prompt result here.
        self.granted.store(true, Ordering::SeqCst);
        Ok(true)
    }

    async fn schedule_at(
        &self,
        id: &str,
        fire_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        let delay = (fire_at - Utc::now())
            .to_std()
            .map_err(|_| NotifyError::PastFireTime)?;

        let mut pending = self.pending.write().await;
        if let Some((_, prior)) = pending.remove(id) {
            debug!("replacing pending notification {id}");
            prior.abort();
        }

        let request = NotificationRequest {
            fire_at,
            title: title.to_string(),
            body: body.to_string(),
        };

        let task_id = id.to_string();
        let task_pending = Arc::clone(&self.pending);
        let delivered = self.delivered.clone();
        let delivered_payload = DeliveredNotification {
            id: task_id.clone(),
            title: request.title.clone(),
            body: request.body.clone(),
        };

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task_pending.write().await.remove(&task_id);
            // Nobody listening is fine; the registration already served
            // its purpose by existing until now.
            let _ = delivered.send(delivered_payload);
        });

        info!("scheduled notification {id} for {fire_at}");
        pending.insert(id.to_string(), (request, handle));
        Ok(())
    }

    async fn cancel(&self, id: &str) {
        let mut pending = self.pending.write().await;
        if let Some((_, handle)) = pending.remove(id) {
            info!("cancelled notification {id}");
            handle.abort();
        }
    }
}
