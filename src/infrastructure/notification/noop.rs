//! Notifier used when desktop alerts are disabled

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

pub struct NoOpNotifier;

impl NoOpNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(
        &self,
        title: &str,
        _message: &str,
        _icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        debug!(title, "notification suppressed");
        Ok(())
    }
}
