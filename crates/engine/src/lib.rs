//! Chat message notification engine: recipient resolution, policy gating,
//! payload construction and push fanout.

pub mod dispatcher;
pub mod documents;
pub mod payload;
pub mod policy;
pub mod resolver;
pub mod store;

pub use dispatcher::{DispatchReport, MessageEvent, NotificationDispatcher};
pub use documents::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
pub use store::ContextStore;
