//! # Filegate
//!
//! HTTP gateway that fetches objects from remote object storage and returns
//! them to callers.
//!
//! This crate provides:
//! - **Access gate**: shared-secret header check on every route
//! - **Provider resolution**: request parameters select a storage backend
//! - **File retrieval**: download, content-type sniffing, temp-file cleanup
//! - **Error responder**: uniform JSON envelope and error monitoring
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                      Filegate                       │
//! ├─────────────────────────────────────────────────────┤
//! │  Request ID │ Logging │ Access Gate │ Error Reporter│
//! ├─────────────────────────────────────────────────────┤
//! │        Handlers (welcome, file, fallback)           │
//! ├─────────────────────────────────────────────────────┤
//! │                  filegate-storage                   │
//! │       (ProviderRegistry, StorageClient, S3)         │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod monitor;
pub mod routes;
pub mod server;
pub mod sniff;
pub mod staging;
pub mod state;

pub use config::{GatewayConfig, ProviderConfig};
pub use envelope::Envelope;
pub use error::{ApiError, ErrorKind};
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
