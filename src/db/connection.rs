use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{ConnectorError, Result};

/// Supported backend families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Document store through the native driver, with sub-database aliases
    MongoDB,
    /// Document store through a caller-supplied ORM connection object
    MongoOrm,
    /// Relational store with a connection-string pool
    MySQL,
    /// Relational store with a single library-managed client
    PostgreSQL,
    /// Key-value store signalling readiness by event
    Redis,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::MongoDB => "MongoDB",
            BackendKind::MongoOrm => "MongoOrm",
            BackendKind::MySQL => "MySQL",
            BackendKind::PostgreSQL => "PostgreSQL",
            BackendKind::Redis => "Redis",
        }
    }

    /// Cargo feature that compiles the driver for this family
    pub fn feature_name(&self) -> &'static str {
        match self {
            BackendKind::MongoDB => "mongodb",
            BackendKind::MongoOrm => "orm",
            BackendKind::MySQL => "mysql",
            BackendKind::PostgreSQL => "postgres",
            BackendKind::Redis => "redis",
        }
    }

    pub fn schemes(&self) -> &'static [&'static str] {
        match self {
            BackendKind::MongoDB | BackendKind::MongoOrm => &["mongodb", "mongodb+srv"],
            BackendKind::MySQL => &["mysql"],
            BackendKind::PostgreSQL => &["postgres", "postgresql"],
            BackendKind::Redis => &["redis", "rediss"],
        }
    }

    /// Families in connect dispatch order
    pub fn all() -> &'static [BackendKind] {
        &[
            BackendKind::MongoOrm,
            BackendKind::MongoDB,
            BackendKind::MySQL,
            BackendKind::PostgreSQL,
            BackendKind::Redis,
        ]
    }

    fn from_scheme(scheme: &str) -> Option<BackendKind> {
        [
            BackendKind::MongoDB,
            BackendKind::MySQL,
            BackendKind::PostgreSQL,
            BackendKind::Redis,
        ]
        .into_iter()
        .find(|kind| kind.schemes().iter().any(|s| s.eq_ignore_ascii_case(scheme)))
    }

    /// Route a spec to exactly one family.
    ///
    /// The scheme is sniffed from the raw string rather than parsed as a URL,
    /// since multi-host strings such as `mongodb://a:1,b:2/db` are not valid URLs.
    /// The name field is validated against the family at the same time.
    pub fn classify(spec: &ConnectionSpec) -> Result<BackendKind> {
        let scheme = spec.scheme().ok_or_else(|| {
            ConnectorError::Configuration(format!(
                "cannot route {}: connection string has no scheme",
                spec.target()
            ))
        })?;

        let kind = match (BackendKind::from_scheme(scheme), spec.orm) {
            (Some(BackendKind::MongoDB), true) => BackendKind::MongoOrm,
            (Some(kind), false) => kind,
            (_, true) => {
                return Err(ConnectorError::Configuration(format!(
                    "{} requests the ORM layer but scheme {scheme}:// is not a document store",
                    spec.target()
                )))
            }
            (None, false) => {
                return Err(ConnectorError::Configuration(format!(
                    "cannot route {}: unsupported scheme {scheme}://",
                    spec.target()
                )))
            }
        };

        spec.validate_name(kind)?;
        Ok(kind)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The `name` field of a spec: one name, or several for document-store aliasing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameSpec {
    One(String),
    Many(Vec<String>),
}

impl NameSpec {
    pub fn as_slice(&self) -> &[String] {
        match self {
            NameSpec::One(name) => std::slice::from_ref(name),
            NameSpec::Many(names) => names,
        }
    }
}

impl From<&str> for NameSpec {
    fn from(name: &str) -> Self {
        NameSpec::One(name.to_string())
    }
}

impl From<Vec<&str>> for NameSpec {
    fn from(names: Vec<&str>) -> Self {
        NameSpec::Many(names.into_iter().map(String::from).collect())
    }
}

/// One requested connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
    pub connection_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<NameSpec>,
    /// Connect through the injected ORM connection instead of the native driver
    #[serde(default, alias = "mongoose")]
    pub orm: bool,
}

impl ConnectionSpec {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            name: None,
            orm: false,
        }
    }

    pub fn named(mut self, name: impl Into<NameSpec>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_orm(mut self) -> Self {
        self.orm = true;
        self
    }

    /// Parse a JSON array of specs
    pub fn parse_list(json: &str) -> Result<Vec<ConnectionSpec>> {
        serde_json::from_str(json)
            .map_err(|e| ConnectorError::Configuration(format!("malformed connection list: {e}")))
    }

    pub fn scheme(&self) -> Option<&str> {
        self.connection_string
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .filter(|scheme| !scheme.is_empty())
    }

    /// Name used in log lines: the requested name(s), else the sanitized connection string
    pub fn target(&self) -> String {
        match &self.name {
            Some(name) => name.as_slice().join(", "),
            None => sanitize(&self.connection_string),
        }
    }

    /// Registry name for single-name families
    pub fn registry_name(&self) -> String {
        match &self.name {
            Some(NameSpec::One(name)) => name.clone(),
            _ => self.default_name(),
        }
    }

    /// Name derived from the connection string: database path, else host
    pub fn default_name(&self) -> String {
        match url::Url::parse(&self.connection_string) {
            Ok(url) => {
                let path = url.path().trim_matches('/');
                if !path.is_empty() {
                    path.to_string()
                } else {
                    url.host_str()
                        .map(String::from)
                        .unwrap_or_else(|| sanitize(&self.connection_string))
                }
            }
            Err(_) => sanitize(&self.connection_string),
        }
    }

    fn validate_name(&self, kind: BackendKind) -> Result<()> {
        let Some(name) = &self.name else {
            return Ok(());
        };

        if let NameSpec::Many(names) = name {
            if kind != BackendKind::MongoDB {
                return Err(ConnectorError::Configuration(format!(
                    "{kind} connection {} must be named with a single string",
                    self.target()
                )));
            }
            if names.is_empty() {
                return Err(ConnectorError::Configuration(format!(
                    "name list of {} is empty",
                    sanitize(&self.connection_string)
                )));
            }
        }

        if name.as_slice().iter().any(|n| n.trim().is_empty()) {
            return Err(ConnectorError::Configuration(format!(
                "{kind} connection {} has an empty name",
                sanitize(&self.connection_string)
            )));
        }
        Ok(())
    }
}

/// Mask the password of a connection string for logging
pub fn sanitize(connection_string: &str) -> String {
    match url::Url::parse(connection_string) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => match connection_string.split_once("://") {
            Some((scheme, rest)) => match rest.rsplit_once('@') {
                Some((_, host)) => format!("{scheme}://***@{host}"),
                None => connection_string.to_string(),
            },
            None => connection_string.to_string(),
        },
    }
}
