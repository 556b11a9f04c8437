use crate::diff::{ChangeRecord, DiffError};

/// Trait for streaming change records to a consumer.
pub trait ChangeSink {
    /// Called once before any records are emitted.
    ///
    /// Default is a no-op so sinks that don't need setup can ignore it.
    fn begin(&mut self) -> Result<(), DiffError> {
        Ok(())
    }

    fn emit(&mut self, record: ChangeRecord) -> Result<(), DiffError>;

    fn finish(&mut self) -> Result<(), DiffError> {
        Ok(())
    }
}

/// A sink that collects records into a Vec.
#[derive(Default)]
pub struct VecSink {
    records: Vec<ChangeRecord>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn into_records(self) -> Vec<ChangeRecord> {
        self.records
    }
}

impl ChangeSink for VecSink {
    fn emit(&mut self, record: ChangeRecord) -> Result<(), DiffError> {
        self.records.push(record);
        Ok(())
    }
}

/// A sink that forwards records to a callback.
pub struct CallbackSink<F: FnMut(ChangeRecord)> {
    f: F,
}

impl<F: FnMut(ChangeRecord)> CallbackSink<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: FnMut(ChangeRecord)> ChangeSink for CallbackSink<F> {
    fn emit(&mut self, record: ChangeRecord) -> Result<(), DiffError> {
        (self.f)(record);
        Ok(())
    }
}
