use crate::sql::base::adapter::DatabaseKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const JDBC_PREFIX: &str = "jdbc:";

/// Connection descriptor handed to the session, passed through untouched
/// apart from an optional `jdbc:` prefix on the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub url: String,
    /// Extra `connection.*` properties with the prefix removed (`user`, `password`, ...).
    pub properties: BTreeMap<String, String>,
}

impl ConnectionSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// URL as understood by the native drivers.
    pub fn driver_url(&self) -> &str {
        self.url.strip_prefix(JDBC_PREFIX).unwrap_or(&self.url)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn user(&self) -> Option<&str> {
        self.property("user").or_else(|| self.property("username"))
    }

    pub fn password(&self) -> Option<&str> {
        self.property("password")
    }

    pub fn kind(&self) -> DatabaseKind {
        let url = self.driver_url();
        let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or(url);
        match scheme.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => DatabaseKind::MySql,
            "postgres" | "postgresql" => DatabaseKind::Postgres,
            other => DatabaseKind::Other(other.to_string()),
        }
    }
}
