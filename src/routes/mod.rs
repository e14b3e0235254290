use axum::http::HeaderMap;

pub mod assistant;
pub mod events;
pub mod export;
pub mod health;
pub mod share;
pub mod towns;
pub mod weather;

/// Stable per-device identifier sent by the client. Without the header (first
/// visit, or a privacy setting stripping it) we fall back to a throwaway id:
/// the request still works, interactions just don't stick.
pub fn device_id(headers: &HeaderMap) -> String {
    headers
        .get("x-device-id")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| {
            tracing::debug!("No X-Device-Id header; using ephemeral device id");
            uuid::Uuid::new_v4().to_string()
        })
}

/// Optional per-request Gemini API key supplied by the client.
pub fn client_api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-device-id", "abc-123".parse().unwrap());
        assert_eq!(device_id(&headers), "abc-123");
    }

    #[test]
    fn test_missing_header_yields_fresh_ids() {
        let headers = HeaderMap::new();
        let a = device_id(&headers);
        let b = device_id(&headers);
        assert_ne!(a, b);
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "   ".parse().unwrap());
        assert_eq!(client_api_key(&headers), None);

        headers.insert("x-api-key", "sk-test".parse().unwrap());
        assert_eq!(client_api_key(&headers).as_deref(), Some("sk-test"));
    }
}
