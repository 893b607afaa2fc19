use std::sync::Arc;

use crate::notify::NotificationSender;
use crate::schedule::Schedule;
use crate::storage::BookingStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub schedule: Arc<Schedule>,
    pub sender: Arc<dyn NotificationSender>,
    /// Serializes read-modify-write cycles on date partitions
    pub write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BookingStore>,
        schedule: Schedule,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            store,
            schedule: Arc::new(schedule),
            sender,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}
