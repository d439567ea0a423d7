//! Shared application state for the Axum API server.

use std::sync::Arc;

use telechat_common::config::AppConfig;
use telechat_engine::{ContextStore, DocumentStore, NotificationDispatcher};
use telechat_notifier::PushSender;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: ContextStore,
    pub push: Arc<dyn PushSender>,
    pub dispatcher: NotificationDispatcher,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(docs: Arc<dyn DocumentStore>, push: Arc<dyn PushSender>, config: AppConfig) -> Self {
        let store = ContextStore::new(docs);
        let dispatcher = NotificationDispatcher::new(store.clone(), push.clone())
            .with_concurrency(config.fanout_concurrency);

        Self {
            store,
            push,
            dispatcher,
            config,
        }
    }
}
