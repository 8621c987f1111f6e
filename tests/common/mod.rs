//! In-memory drivers scripted by the host part of the connection string:
//!
//! - `down*`      connect fails with "connection refused"
//! - `slow*`      connect takes five seconds
//! - `*closefail*` close reports an error
//! - `errbeforeready` / `errafterready` / `silent` drive the key-value events

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use db_connector::db::connectors::{
    ClientConnector, DocumentConnector, KeyValueConnector, OrmConnector, PooledConnector,
};
use db_connector::db::driver::{
    ClientDriver, DocumentDriver, KeyValueDriver, OrmConnection, PoolDriver,
};
use db_connector::db::events::{event_channel, DriverEvent, EventSender, EventStream};
use db_connector::{ConnectOptions, Coordinator, Logger};

pub fn host_of(uri: &str) -> &str {
    let rest = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
    let rest = rest.rsplit_once('@').map(|(_, host)| host).unwrap_or(rest);
    rest.split(|c: char| c == '/' || c == ':').next().unwrap_or("")
}

fn path_of(uri: &str) -> Option<String> {
    let rest = uri.split_once("://").map(|(_, rest)| rest)?;
    let (_, path) = rest.split_once('/')?;
    let path = path.split('?').next()?;
    (!path.is_empty()).then(|| path.to_string())
}

async fn simulate(uri: &str) -> Result<(), String> {
    let host = host_of(uri);
    if host.starts_with("slow") {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    if host.starts_with("down") {
        return Err("connection refused".into());
    }
    Ok(())
}

/// Records every log line handed to the sink
#[derive(Default)]
pub struct Lines {
    lines: Mutex<Vec<(bool, String)>>,
}

impl Logger for Lines {
    fn info(&self, message: &str) {
        self.lines.lock().unwrap().push((false, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lines.lock().unwrap().push((true, message.to_string()));
    }
}

impl Lines {
    pub fn infos(&self) -> Vec<String> {
        self.collect(false)
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(true)
    }

    fn collect(&self, errors: bool) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(is_error, _)| *is_error == errors)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

/// Every close call any fake driver received, by connection string
#[derive(Default)]
pub struct Closes(Mutex<Vec<String>>);

impl Closes {
    fn record(&self, uri: &str) -> Result<(), String> {
        self.0.lock().unwrap().push(uri.to_string());
        if host_of(uri).contains("closefail") {
            Err("socket already closed".into())
        } else {
            Ok(())
        }
    }

    pub fn uris(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeHandle {
    pub uri: String,
}

impl FakeHandle {
    fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeDatabase {
    pub uri: String,
    pub name: String,
}

pub struct FakeDocument(Arc<Closes>);

#[async_trait]
impl DocumentDriver for FakeDocument {
    type Client = FakeHandle;
    type Database = FakeDatabase;

    async fn connect(&self, uri: &str) -> Result<FakeHandle, String> {
        simulate(uri).await?;
        Ok(FakeHandle::new(uri))
    }

    fn database_name(&self, client: &FakeHandle) -> String {
        path_of(&client.uri).unwrap_or_else(|| "test".to_string())
    }

    fn database(&self, client: &FakeHandle, name: &str) -> FakeDatabase {
        FakeDatabase {
            uri: client.uri.clone(),
            name: name.to_string(),
        }
    }

    async fn close(&self, client: &FakeHandle) -> Result<(), String> {
        self.0.record(&client.uri)
    }
}

pub struct FakePool(Arc<Closes>);

#[async_trait]
impl PoolDriver for FakePool {
    type Pool = FakeHandle;

    fn create_pool(&self, uri: &str) -> Result<FakeHandle, String> {
        if host_of(uri).is_empty() {
            return Err("URL has no host".into());
        }
        Ok(FakeHandle::new(uri))
    }

    async fn check_out(&self, pool: &FakeHandle) -> Result<(), String> {
        simulate(&pool.uri).await
    }

    async fn end(&self, pool: &FakeHandle) -> Result<(), String> {
        self.0.record(&pool.uri)
    }
}

pub struct FakeClient(Arc<Closes>);

#[async_trait]
impl ClientDriver for FakeClient {
    type Client = FakeHandle;

    async fn connect(&self, uri: &str) -> Result<FakeHandle, String> {
        simulate(uri).await?;
        Ok(FakeHandle::new(uri))
    }

    async fn close(&self, client: &FakeHandle) -> Result<(), String> {
        self.0.record(&client.uri)
    }
}

pub struct FakeKeyValue {
    closes: Arc<Closes>,
    held: Mutex<Vec<EventSender<FakeHandle>>>,
}

#[async_trait]
impl KeyValueDriver for FakeKeyValue {
    type Client = FakeHandle;

    fn open(&self, uri: &str) -> EventStream<FakeHandle> {
        let (events, stream) = event_channel();
        match host_of(uri) {
            "errbeforeready" => {
                events.send(DriverEvent::Error("ECONNREFUSED".into())).unwrap();
                events.send(DriverEvent::Error("ECONNREFUSED".into())).unwrap();
            }
            "errafterready" => {
                events.send(DriverEvent::Ready(FakeHandle::new(uri))).unwrap();
                events.send(DriverEvent::Error("READONLY replica".into())).unwrap();
            }
            "silent" => self.held.lock().unwrap().push(events),
            _ => events.send(DriverEvent::Ready(FakeHandle::new(uri))).unwrap(),
        }
        stream
    }

    async fn quit(&self, client: &FakeHandle) -> Result<(), String> {
        self.closes.record(&client.uri)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrmMode {
    Open,
    Fail,
    Silent,
    /// Opens, but `disconnect` reports an error
    CloseFail,
}

pub struct FakeOrm {
    mode: OrmMode,
    held: Mutex<Vec<EventSender<()>>>,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl FakeOrm {
    pub fn new(mode: OrmMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            held: Mutex::new(Vec::new()),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl OrmConnection for FakeOrm {
    fn connect(&self, _uri: &str) -> EventStream<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let (events, stream) = event_channel();
        match self.mode {
            OrmMode::Open | OrmMode::CloseFail => events.send(DriverEvent::Ready(())).unwrap(),
            OrmMode::Fail => events.send(DriverEvent::Error("authentication failed".into())).unwrap(),
            OrmMode::Silent => self.held.lock().unwrap().push(events),
        }
        stream
    }

    async fn disconnect(&self) -> Result<(), String> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            OrmMode::CloseFail => Err("socket already closed".into()),
            _ => Ok(()),
        }
    }
}

pub struct Harness {
    pub coordinator: Arc<Coordinator>,
    pub closes: Arc<Closes>,
    pub lines: Arc<Lines>,
}

impl Harness {
    pub fn new() -> Self {
        let closes = Arc::new(Closes::default());
        let coordinator = Coordinator::empty()
            .with_connector(Arc::new(OrmConnector))
            .with_connector(Arc::new(DocumentConnector::new(FakeDocument(closes.clone()))))
            .with_connector(Arc::new(PooledConnector::new(FakePool(closes.clone()))))
            .with_connector(Arc::new(ClientConnector::new(FakeClient(closes.clone()))))
            .with_connector(Arc::new(KeyValueConnector::new(FakeKeyValue {
                closes: closes.clone(),
                held: Mutex::new(Vec::new()),
            })));

        Self {
            coordinator: Arc::new(coordinator),
            closes,
            lines: Arc::new(Lines::default()),
        }
    }

    pub fn options(&self) -> ConnectOptions {
        ConnectOptions::new().with_logger(self.lines.clone())
    }
}

/// Let background tasks run until `done` holds
pub async fn eventually(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if done() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    done()
}
