use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header carrying the ingestion time in epoch milliseconds.
pub const HEADER_TIMESTAMP: &str = "timestamp";

/// A single record handed to the downstream channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Event {
    pub fn new(body: Vec<u8>, ingested_at: DateTime<Utc>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            HEADER_TIMESTAMP.to_string(),
            ingested_at.timestamp_millis().to_string(),
        );
        Self { headers, body }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn carries_ingestion_timestamp() {
        let at = Utc.timestamp_millis_opt(1_420_070_400_000).unwrap();
        let event = Event::new(b"a,b".to_vec(), at);
        assert_eq!(event.header(HEADER_TIMESTAMP), Some("1420070400000"));
        assert_eq!(event.body_str(), Some("a,b"));
    }
}
