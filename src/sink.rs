//SPDX-License-Identifier: MIT OR Apache-2.0
use crate::log_record::LogRecord;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

/// A destination for finished log records.
///
/// Transport (files, collectors, consoles) is the sink's business; the facade only
/// builds records and hands them over.
pub trait Sink: Debug + Send + Sync {
    /**
        Submits the log record for writing.
    */
    fn finish_log_record(&self, record: LogRecord);

    /**
    Submits the log record asynchronously.

    This allows sinks to reuse an async context that already exists.
    Sinks may choose to implement this as a simple wrapper around [Self::finish_log_record] if they wish.
    */
    fn finish_log_record_async<'s>(
        &'s self,
        record: LogRecord,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 's>>;

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn prepare_to_die(&self);
}
