//! Backend client: generation requests, health checks, sessions and exports.

pub mod client;
pub mod download;
pub mod session;
pub mod transport;
pub mod types;

pub use client::BackendClient;
pub use download::{decode_base64, Downloader, ExportFormat, SavedFile};
pub use session::{FileStorage, MemoryStorage, SessionStore, Storage, SESSION_KEY};
pub use transport::{HttpTransport, DEFAULT_TIMEOUT};
pub use types::{GenerateRequest, GenerationResult, HealthStatus, ModelObject, ModelParams};
