// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::log_record::LogRecord;
use crate::sink::Sink;

/**
A reference sink that writes one line per record to stderr.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StdErrorSink {}

impl StdErrorSink {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Sink for StdErrorSink {
    fn finish_log_record(&self, record: LogRecord) {
        use std::io::Write;
        let mut lock = std::io::stderr().lock();
        // write failures are dropped
        let _ = writeln!(lock, "{record}");
    }

    fn finish_log_record_async<'s>(
        &'s self,
        record: LogRecord,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 's>> {
        Box::pin(async move { self.finish_log_record(record) })
    }

    fn prepare_to_die(&self) {
        use std::io::Write;
        let _ = std::io::stderr().flush();
    }
}
