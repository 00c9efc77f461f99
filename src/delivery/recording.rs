//! Recording delivery backend

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::DeliveryBackend;

/// A message handed to the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sent {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Keeps every message instead of sending it
#[derive(Clone, Debug)]
pub struct Recording {
    sent: Arc<Mutex<Vec<Sent>>>,
    accept: Arc<AtomicBool>,
}

impl Default for Recording {
    fn default() -> Self {
        Self {
            sent: Arc::default(),
            accept: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl Recording {
    /// Refuse (or accept again) all following messages
    pub fn refuse(&self, refuse: bool) {
        self.accept.store(!refuse, Ordering::SeqCst);
    }

    /// All messages, accepted or not
    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl DeliveryBackend for Recording {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> bool {
        self.sent.lock().await.push(Sent {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        });

        self.accept.load(Ordering::SeqCst)
    }
}
