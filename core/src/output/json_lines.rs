use crate::diff::{ChangeRecord, DiffError, DiffReport};
use crate::sink::ChangeSink;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonLinesHeader {
    kind: &'static str,
    version: &'static str,
}

/// Streams one JSON object per change record, preceded by a header line
/// carrying the schema version. Suitable for piping without buffering the
/// whole report.
pub struct JsonLinesSink<W: Write> {
    w: W,
    wrote_header: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            wrote_header: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> ChangeSink for JsonLinesSink<W> {
    fn begin(&mut self) -> Result<(), DiffError> {
        if self.wrote_header {
            return Ok(());
        }

        let header = JsonLinesHeader {
            kind: "Header",
            version: DiffReport::SCHEMA_VERSION,
        };

        serde_json::to_writer(&mut self.w, &header)
            .map_err(|e| DiffError::SinkError { message: e.to_string() })?;
        self.w
            .write_all(b"\n")
            .map_err(|e| DiffError::SinkError { message: e.to_string() })?;

        self.wrote_header = true;
        Ok(())
    }

    fn emit(&mut self, record: ChangeRecord) -> Result<(), DiffError> {
        serde_json::to_writer(&mut self.w, &record)
            .map_err(|e| DiffError::SinkError { message: e.to_string() })?;
        self.w
            .write_all(b"\n")
            .map_err(|e| DiffError::SinkError { message: e.to_string() })?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DiffError> {
        self.w
            .flush()
            .map_err(|e| DiffError::SinkError { message: e.to_string() })
    }
}
