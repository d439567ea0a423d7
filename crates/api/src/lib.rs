//! TeleChat push backend HTTP API.
//!
//! Endpoints:
//! - GET  /, /health, /api/version: liveness and version
//! - POST /api/fcm/register: register a user's push token
//! - POST /api/fcm/test-push: send a synthetic push to a raw token
//! - POST /api/messages/send-notif: notify a chat of a new message

pub mod extract;
pub mod routes;
pub mod state;
