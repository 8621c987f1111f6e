use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::driver::OrmConnection;
use super::logger::{Logger, TracingLogger};

/// Watchdog for the ORM connection, which may never report success or failure
pub const DEFAULT_ORM_WATCHDOG: Duration = Duration::from_secs(60);

pub const DEFAULT_SEPARATOR: &str = ":";

/// Options shared by every connector during one `init`
#[derive(Clone)]
pub struct ConnectOptions {
    pub logger: Arc<dyn Logger>,
    /// Splits `physicalName<sep>aliasName` document-store names
    pub separator: String,
    /// Connection object for the ORM-layer family, owned by the caller
    pub orm: Option<Arc<dyn OrmConnection>>,
    pub orm_watchdog: Duration,
    /// Deadline applied to every connect; `None` leaves it to the driver
    pub connect_timeout: Option<Duration>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_orm(mut self, orm: Arc<dyn OrmConnection>) -> Self {
        self.orm = Some(orm);
        self
    }

    pub fn with_orm_watchdog(mut self, watchdog: Duration) -> Self {
        self.orm_watchdog = watchdog;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            separator: DEFAULT_SEPARATOR.to_string(),
            orm: None,
            orm_watchdog: DEFAULT_ORM_WATCHDOG,
            connect_timeout: None,
        }
    }
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("separator", &self.separator)
            .field("orm", &self.orm.is_some())
            .field("orm_watchdog", &self.orm_watchdog)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}
