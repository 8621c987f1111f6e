//! Native document-store connector
//!
//! One connection serves a primary database plus any number of aliased
//! databases on the same socket. Each requested name is either `physical` or
//! `physical<sep>alias`. The primary is registered as
//! `<database><sep><alias, alias, ...>` and is the only entry that gets closed.

use async_trait::async_trait;
use std::sync::Arc;

use super::downcast;
use crate::db::connection::{BackendKind, ConnectionSpec, NameSpec};
use crate::db::driver::{Connector, DocumentDriver, Registration};
use crate::db::error::{ConnectorError, Result};
use crate::db::options::ConnectOptions;
use crate::db::registry::Handle;

/// Registry names for one document-store connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNames {
    pub primary: String,
    /// `(physical database, alias)` pairs, in request order
    pub aliases: Vec<(String, String)>,
}

impl DocumentNames {
    pub fn plan(database_name: &str, names: Option<&NameSpec>, separator: &str) -> Self {
        let requested: Vec<&str> = match names {
            Some(names) => names.as_slice().iter().map(String::as_str).collect(),
            None => vec![database_name],
        };

        let aliases: Vec<(String, String)> = requested
            .into_iter()
            .map(|name| {
                let mut parts = name.split(separator);
                let physical = parts.next().unwrap_or(name);
                let alias = parts.next().filter(|a| !a.is_empty()).unwrap_or(physical);
                (physical.to_string(), alias.to_string())
            })
            .collect();

        let short_names: Vec<&str> = aliases.iter().map(|(_, alias)| alias.as_str()).collect();
        // joined with the configured separator too, not a fixed ':'
        let primary = format!("{database_name}{separator}{}", short_names.join(", "));

        Self { primary, aliases }
    }
}

pub struct DocumentConnector<D> {
    driver: D,
}

impl<D: DocumentDriver> DocumentConnector<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: DocumentDriver> Connector for DocumentConnector<D> {
    fn kind(&self) -> BackendKind {
        BackendKind::MongoDB
    }

    async fn connect(
        &self,
        spec: &ConnectionSpec,
        options: &ConnectOptions,
    ) -> Result<Vec<Registration>> {
        let client = self
            .driver
            .connect(&spec.connection_string)
            .await
            .map_err(|cause| ConnectorError::Connect {
                backend: self.kind(),
                target: spec.target(),
                cause,
            })?;

        let database_name = self.driver.database_name(&client);
        let names = DocumentNames::plan(&database_name, spec.name.as_ref(), &options.separator);

        let client = Arc::new(client);
        let mut registrations = Vec::with_capacity(names.aliases.len() + 1);
        registrations.push(Registration::primary(names.primary.clone(), client.clone()));

        for (physical, alias) in &names.aliases {
            let database = self.driver.database(&client, physical);
            registrations.push(Registration::alias(
                alias.clone(),
                names.primary.clone(),
                Arc::new(database),
            ));
        }
        Ok(registrations)
    }

    async fn close(&self, handle: Handle) -> std::result::Result<(), String> {
        let client = downcast::<D::Client>(handle)?;
        self.driver.close(&client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_share_one_primary() {
        let names = DocumentNames::plan(
            "app",
            Some(&NameSpec::from(vec!["db1:alpha", "db1:beta"])),
            ":",
        );
        assert_eq!(names.primary, "app:alpha, beta");
        assert_eq!(
            names.aliases,
            vec![
                ("db1".to_string(), "alpha".to_string()),
                ("db1".to_string(), "beta".to_string()),
            ]
        );
    }

    #[test]
    fn bare_names_alias_themselves() {
        let names = DocumentNames::plan("app", Some(&NameSpec::from("logs")), ":");
        assert_eq!(names.primary, "app:logs");
        assert_eq!(names.aliases, vec![("logs".to_string(), "logs".to_string())]);
    }

    #[test]
    fn unnamed_spec_uses_database_name() {
        let names = DocumentNames::plan("test", None, ":");
        assert_eq!(names.primary, "test:test");
        assert_eq!(names.aliases, vec![("test".to_string(), "test".to_string())]);
    }

    #[test]
    fn honours_custom_separator() {
        let names = DocumentNames::plan("app", Some(&NameSpec::from(vec!["db1/alpha", "db2"])), "/");
        assert_eq!(names.primary, "app/alpha, db2");
        assert_eq!(names.aliases[0], ("db1".to_string(), "alpha".to_string()));
        assert_eq!(names.aliases[1], ("db2".to_string(), "db2".to_string()));
    }
}
