use std::time::Duration;

use desalink_api::models::SensorStatus;

/// Age after which a cached reading is reported inactive.
pub const CACHE_TTL: Duration = Duration::from_secs(30);

/// Liveness of a reading received at `received_at`, judged at `now`.
///
/// Both instants are monotonic offsets from the same clock origin.
pub fn liveness(now: Duration, received_at: Duration, ttl: Duration) -> SensorStatus {
    if now.saturating_sub(received_at) <= ttl {
        SensorStatus::Active
    } else {
        SensorStatus::Inactive
    }
}
