pub mod cache_service;
pub mod clock;
pub mod ingest_service;
pub mod logger_config;
pub mod logger_service;
pub mod staleness;

pub use cache_service::{CacheService, CacheSnapshot, ReadingSnapshot};
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "mock"))]
pub use clock::ManualClock;
pub use ingest_service::IngestService;
pub use logger_config::{LoggerConfiguration, Selection};
pub use logger_service::{CycleReport, FlushReport, LoggerService};
pub use staleness::{CACHE_TTL, liveness};
