use crate::models::HealthRes;

/// Simple health service used by the REST API and the CLI.
///
/// The backend has no dependencies worth probing (the store recovers from a missing file), so
/// liveness is the only signal.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is alive.
    pub fn check_health() -> HealthRes {
        HealthRes { ok: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_serialises_ok_true() {
        let json = serde_json::to_value(HealthService::check_health()).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true }));
    }
}
