//! Order persistence and notification core of the storefront.
//!
//! Orders live in a single JSON document behind [`store::OrderStorage`].
//! [`service::OrderService`] persists each mutation, then sends a
//! best-effort mail through [`notifications::NotificationDispatcher`].
//! [`actors::OrderWriterHandle`] serializes every store access in a process.

pub mod actors;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod notifications;
pub mod service;
pub mod store;
pub mod utils;
