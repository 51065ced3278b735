use chrono::Utc;

/// UTC now with a literal `Z`, e.g. `2026-10-17T21:49:03.123456Z`.
pub fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}
