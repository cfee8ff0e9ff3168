//! Output backends for emitted broadcasts.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::instruction::Broadcast;
use crate::DispatchResult;

/// Receiver of every broadcast the dispatcher emits, in emission order.
pub trait BroadcastSink {
    fn emit(&mut self, broadcast: &Broadcast) -> DispatchResult<()>;

    /// Flush and close any underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> DispatchResult<()> {
        Ok(())
    }
}

// ── MemorySink ────────────────────────────────────────────────────────────────

/// Collects broadcasts in a `Vec`.
#[derive(Default, Debug)]
pub struct MemorySink {
    pub broadcasts: Vec<Broadcast>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything collected so far.
    pub fn take(&mut self) -> Vec<Broadcast> {
        std::mem::take(&mut self.broadcasts)
    }

    pub fn len(&self) -> usize {
        self.broadcasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.broadcasts.is_empty()
    }
}

impl BroadcastSink for MemorySink {
    fn emit(&mut self, broadcast: &Broadcast) -> DispatchResult<()> {
        self.broadcasts.push(broadcast.clone());
        Ok(())
    }
}

// ── CsvSink ───────────────────────────────────────────────────────────────────

/// Writes `broadcasts.csv` in the configured directory, one row per
/// instruction.  Routes are `;`-joined segment indices.
pub struct CsvSink {
    writer:   Writer<File>,
    finished: bool,
}

impl CsvSink {
    pub const FILE_NAME: &'static str = "broadcasts.csv";

    /// Create (or truncate) the file in `dir` and write the header row.
    pub fn new(dir: &Path) -> DispatchResult<Self> {
        let mut writer = Writer::from_path(dir.join(Self::FILE_NAME))?;
        writer.write_record(["tick", "origin_rsu", "kind", "accident", "vehicle", "route"])?;
        Ok(Self { writer, finished: false })
    }
}

impl BroadcastSink for CsvSink {
    fn emit(&mut self, broadcast: &Broadcast) -> DispatchResult<()> {
        let ins = &broadcast.instruction;
        let route = ins
            .route()
            .iter()
            .map(|s| s.0.to_string())
            .collect::<Vec<_>>()
            .join(";");
        self.writer.write_record(&[
            broadcast.tick.0.to_string(),
            broadcast.origin_rsu.map(|r| r.0.to_string()).unwrap_or_default(),
            ins.kind().to_owned(),
            ins.accident().0.to_string(),
            ins.vehicle().0.to_string(),
            route,
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> DispatchResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}
