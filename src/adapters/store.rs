//! Reading/event persistence.
//!
//! [`JsonlStore`] appends one JSON object per line to `readings.jsonl` and
//! `events.jsonl`.  The control loop never talks to it directly: records go
//! through a bounded [`PersistenceQueue`] and a dedicated writer thread
//! does the file I/O.
//!
//! ```text
//! ┌──────────────┐  StoreRecord  ┌───────────────┐  append  ┌────────────┐
//! │ LogEventSink │──try_send────▶│ writer thread │────────▶│ JsonlStore │
//! │ (core lock)  │  depth 32     │ (block_on rx) │          │  *.jsonl   │
//! └──────────────┘               └───────────────┘          └────────────┘
//! ```
//!
//! A full queue drops the record with a warning; storage can never stall a
//! tick.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::block_on;
use log::{info, warn};
use serde::Serialize;

use crate::app::events::{EventRecord, ReadingRecord};
use crate::app::ports::ReadingStore;
use crate::error::PersistenceError;

pub const READINGS_FILE: &str = "readings.jsonl";
pub const EVENTS_FILE: &str = "events.jsonl";

/// Writer queue depth.
pub const QUEUE_DEPTH: usize = 32;

// ───────────────────────────────────────────────────────────────
// JSON-lines store
// ───────────────────────────────────────────────────────────────

pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    /// Create the data directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("Store: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The last `limit` readings, oldest first.  Unparseable lines are skipped.
    pub fn recent_readings(&self, limit: usize) -> Result<Vec<ReadingRecord>, PersistenceError> {
        let file = match File::open(self.dir.join(READINGS_FILE)) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(_) => return Err(PersistenceError::IoError),
        };

        let mut out: Vec<ReadingRecord> = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|_| PersistenceError::IoError)?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => out.push(record),
                Err(e) => warn!("Store: skipping bad reading line: {}", e),
            }
        }

        let skip = out.len().saturating_sub(limit);
        Ok(out.split_off(skip))
    }

    fn append<T: Serialize>(&self, file: &str, record: &T) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_string(record).map_err(|_| PersistenceError::Encoding)?;
        line.push('\n');
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(file))
            .and_then(|mut f| f.write_all(line.as_bytes()))
            .map_err(|_| PersistenceError::IoError)
    }
}

impl ReadingStore for JsonlStore {
    fn log_reading(&mut self, record: &ReadingRecord) -> Result<(), PersistenceError> {
        self.append(READINGS_FILE, record)
    }

    fn log_event(&mut self, record: &EventRecord) -> Result<(), PersistenceError> {
        self.append(EVENTS_FILE, record)
    }
}

// ───────────────────────────────────────────────────────────────
// Non-blocking queue + writer thread
// ───────────────────────────────────────────────────────────────

/// Message to the writer thread.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRecord {
    Reading(ReadingRecord),
    Event(EventRecord),
    /// Drain point: the writer exits after everything queued before it.
    Stop,
}

type RecordChannel = Channel<CriticalSectionRawMutex, StoreRecord, QUEUE_DEPTH>;

/// Producer side.  Cloneable; never blocks.
#[derive(Clone)]
pub struct PersistenceQueue {
    channel: Arc<RecordChannel>,
}

impl PersistenceQueue {
    fn push(&self, record: StoreRecord) -> Result<(), PersistenceError> {
        self.channel
            .try_send(record)
            .map_err(|_| PersistenceError::QueueFull)
    }
}

impl ReadingStore for PersistenceQueue {
    fn log_reading(&mut self, record: &ReadingRecord) -> Result<(), PersistenceError> {
        self.push(StoreRecord::Reading(record.clone()))
    }

    fn log_event(&mut self, record: &EventRecord) -> Result<(), PersistenceError> {
        self.push(StoreRecord::Event(record.clone()))
    }
}

/// Consumer side: owns the writer thread, hands the store back on stop.
pub struct PersistenceWriter<S> {
    channel: Arc<RecordChannel>,
    handle: JoinHandle<S>,
}

/// Start a writer thread for `store`.
pub fn spawn_writer<S>(store: S) -> io::Result<(PersistenceQueue, PersistenceWriter<S>)>
where
    S: ReadingStore + Send + 'static,
{
    let channel: Arc<RecordChannel> = Arc::new(Channel::new());
    let rx = channel.clone();

    let handle = thread::Builder::new()
        .name("store-writer".into())
        .spawn(move || {
            let mut store = store;
            loop {
                let result = match block_on(rx.receive()) {
                    StoreRecord::Reading(r) => store.log_reading(&r),
                    StoreRecord::Event(e) => store.log_event(&e),
                    StoreRecord::Stop => break,
                };
                if let Err(e) = result {
                    warn!("Store: write failed: {}", e);
                }
            }
            store
        })?;

    Ok((
        PersistenceQueue {
            channel: channel.clone(),
        },
        PersistenceWriter { channel, handle },
    ))
}

impl<S> PersistenceWriter<S> {
    /// Write out everything already queued, stop the thread, return the store.
    pub fn stop(self) -> Option<S> {
        // Waits for queue space, so the stop marker is never dropped.
        block_on(self.channel.send(StoreRecord::Stop));
        match self.handle.join() {
            Ok(store) => Some(store),
            Err(_) => {
                warn!("Store: writer thread panicked");
                None
            }
        }
    }
}
