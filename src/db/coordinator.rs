//! Lifecycle coordinator
//!
//! `init` routes every spec to its family's connector and runs all connects
//! concurrently. The first failure settles `init`; sibling connects keep
//! running in the background and still register whatever they open.
//! `close` releases aliases, then closes every primary concurrently, and
//! never fails.

use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::connection::{BackendKind, ConnectionSpec};
use super::connectors::OrmConnector;
use super::driver::Connector;
use super::error::{ConnectorError, Result};
use super::lifecycle::{ConnectionStatus, StateTable};
use super::logger::{Logger, TracingLogger};
use super::options::ConnectOptions;
use super::registry::{Entry, Handle, Registry};

pub struct Coordinator {
    connectors: HashMap<BackendKind, Arc<dyn Connector>>,
    registry: Arc<Registry>,
    states: Arc<StateTable>,
    logger: RwLock<Arc<dyn Logger>>,
}

impl Coordinator {
    /// Coordinator with a connector for every compiled driver
    #[allow(unused_mut)]
    pub fn new() -> Self {
        let mut coordinator = Self::empty().with_connector(Arc::new(OrmConnector));

        #[cfg(feature = "mongodb")]
        {
            use super::connectors::DocumentConnector;
            use super::drivers::mongo::MongoDriver;
            coordinator = coordinator.with_connector(Arc::new(DocumentConnector::new(MongoDriver)));
        }

        #[cfg(feature = "mysql")]
        {
            use super::connectors::PooledConnector;
            use super::drivers::mysql::MySqlDriver;
            coordinator = coordinator.with_connector(Arc::new(PooledConnector::new(MySqlDriver)));
        }

        #[cfg(feature = "postgres")]
        {
            use super::connectors::ClientConnector;
            use super::drivers::postgres::PostgresDriver;
            coordinator = coordinator.with_connector(Arc::new(ClientConnector::new(PostgresDriver)));
        }

        #[cfg(feature = "redis")]
        {
            use super::connectors::KeyValueConnector;
            use super::drivers::redis_driver::RedisDriver;
            coordinator = coordinator.with_connector(Arc::new(KeyValueConnector::new(RedisDriver)));
        }

        coordinator
    }

    /// Coordinator with no connectors; add them with [`Coordinator::with_connector`]
    pub fn empty() -> Self {
        Self {
            connectors: HashMap::new(),
            registry: Arc::new(Registry::new()),
            states: Arc::new(StateTable::default()),
            logger: RwLock::new(Arc::new(TracingLogger)),
        }
    }

    /// Install `connector` for its family, replacing any previous one
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connectors.insert(connector.kind(), connector);
        self
    }

    /// Process-wide coordinator with the default connectors
    pub fn global() -> &'static Coordinator {
        static GLOBAL: OnceLock<Coordinator> = OnceLock::new();
        GLOBAL.get_or_init(Coordinator::new)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn get(&self, name: &str) -> Result<Handle> {
        self.registry.get(name)
    }

    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.registry.get_as(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Lifecycle state of every spec passed to `init`, in dispatch order
    pub fn states(&self) -> Vec<ConnectionStatus> {
        self.states.snapshot()
    }

    /// Connect every spec and register the resulting handles.
    ///
    /// Specs are validated up front, so a configuration error opens nothing.
    /// Once dispatched, connects are not cancelled: when one fails the others
    /// run to completion in the background and remain registered.
    pub async fn init(&self, specs: Vec<ConnectionSpec>, options: ConnectOptions) -> Result<()> {
        let plan = self.plan(specs, &options)?;
        *self.logger.write().unwrap_or_else(PoisonError::into_inner) = options.logger.clone();

        let options = Arc::new(options);
        let mut pending = FuturesUnordered::new();

        for (kind, spec) in plan {
            let Some(connector) = self.connectors.get(&kind).cloned() else {
                return Err(ConnectorError::DriverNotAvailable(kind.feature_name()));
            };
            let target = spec.target();
            let slot = self.states.track(target.clone(), kind);
            tracing::debug!(backend = %kind, connection = %target, "dispatching connect");

            let task = tokio::spawn(connect_one(
                connector,
                spec,
                options.clone(),
                self.registry.clone(),
                self.states.clone(),
                slot,
            ));
            pending.push(async move {
                task.await.unwrap_or_else(|e| {
                    Err(ConnectorError::Connect {
                        backend: kind,
                        target,
                        cause: format!("connect task failed: {e}"),
                    })
                })
            });
        }

        while let Some(outcome) = pending.next().await {
            outcome?;
        }
        Ok(())
    }

    /// Close every registered connection. Failures are logged, never returned.
    pub async fn close(&self) {
        let logger = self.logger.read().unwrap_or_else(PoisonError::into_inner).clone();

        for (name, entry) in self.registry.drain_aliases() {
            tracing::debug!(backend = %entry.kind, connection = %name, "alias released");
        }

        let closing = self.registry.drain_primaries().into_iter().map(|(name, entry)| {
            let connector = self.connectors.get(&entry.kind).cloned();
            let logger = logger.clone();
            let states = self.states.clone();
            let label = format!("{}/{name}", entry.kind);

            let task = tokio::spawn(async move {
                let outcome = match connector {
                    Some(connector) => connector.close(entry.handle).await,
                    None => Err(format!("no connector for {}", entry.kind)),
                };
                states.closed(&name);
                outcome
            });

            async move {
                match task.await {
                    Ok(Ok(())) => logger.info(&format!("{label} connection closed")),
                    Ok(Err(cause)) => logger.error(&format!("{label} connection close error: {cause}")),
                    Err(e) => logger.error(&format!("{label} connection close error: {e}")),
                }
            }
        });

        join_all(closing).await;
    }

    /// Route and validate every spec, ordered for dispatch
    fn plan(
        &self,
        specs: Vec<ConnectionSpec>,
        options: &ConnectOptions,
    ) -> Result<Vec<(BackendKind, ConnectionSpec)>> {
        if options.separator.is_empty() {
            return Err(ConnectorError::Configuration("separator must not be empty".into()));
        }

        let mut plan = Vec::with_capacity(specs.len());
        for spec in specs {
            let kind = BackendKind::classify(&spec)?;
            if !self.connectors.contains_key(&kind) {
                return Err(ConnectorError::DriverNotAvailable(kind.feature_name()));
            }
            plan.push((kind, spec));
        }

        let orm_specs = plan.iter().filter(|(kind, _)| *kind == BackendKind::MongoOrm).count();
        if orm_specs > 1 {
            return Err(ConnectorError::Configuration(format!(
                "only one ORM-layer connection is supported, got {orm_specs}"
            )));
        }
        if orm_specs == 1 && options.orm.is_none() {
            return Err(ConnectorError::Configuration(
                "an ORM connection object must be provided for ORM-layer specs".into(),
            ));
        }

        // stable: input order is kept within a family
        plan.sort_by_key(|(kind, _)| BackendKind::all().iter().position(|k| k == kind));
        Ok(plan)
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

async fn connect_one(
    connector: Arc<dyn Connector>,
    spec: ConnectionSpec,
    options: Arc<ConnectOptions>,
    registry: Arc<Registry>,
    states: Arc<StateTable>,
    slot: usize,
) -> Result<()> {
    let kind = connector.kind();

    let connected = match options.connect_timeout {
        Some(limit) => tokio::time::timeout(limit, connector.connect(&spec, &options))
            .await
            .unwrap_or_else(|_| {
                Err(ConnectorError::Timeout {
                    backend: kind,
                    target: spec.target(),
                    after: limit,
                })
            }),
        None => connector.connect(&spec, &options).await,
    };

    let mut registrations = match connected {
        Ok(registrations) => registrations.into_iter(),
        Err(e) => {
            states.failed(slot);
            return Err(e);
        }
    };

    let Some(primary) = registrations.next() else {
        states.failed(slot);
        return Err(ConnectorError::Connect {
            backend: kind,
            target: spec.target(),
            cause: "driver returned no handle".into(),
        });
    };

    let primary_name = primary.name;
    let entry = Entry {
        kind,
        role: primary.role,
        handle: primary.handle.clone(),
    };
    if let Err(collision) = registry.register(primary_name.clone(), entry) {
        states.failed(slot);
        // the connection is open but unreachable by name
        if let Err(cause) = connector.close(primary.handle).await {
            options
                .logger
                .error(&format!("{kind}/{primary_name} connection close error: {cause}"));
        }
        return Err(collision);
    }
    states.connected(slot, &primary_name);

    for alias in registrations {
        registry.register(
            alias.name,
            Entry {
                kind,
                role: alias.role,
                handle: alias.handle,
            },
        )?;
    }

    options.logger.info(&format!("{kind}/{primary_name} connection OK"));
    Ok(())
}
