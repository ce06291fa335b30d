//! Tracing setup
//!
//! Console output goes through the usual `fmt` layer. Events from this crate
//! are also appended to a diagnostic log file as
//! `[YYYY-MM-DD HH:MM:SS] [LEVEL] message` lines. The file is written from a
//! background worker so a slow or failing disk never holds up a response.

use std::fmt;
use std::fs::OpenOptions;

use chrono::Local;
use tracing::{warn, Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::Config;

/// Line format of the diagnostic log file
pub struct DiagnosticFormat;

impl<S, N> FormatEvent<S, N> for DiagnosticFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(&mut writer, "[{}] [{}] ", timestamp, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(&mut writer)
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let (file, open_error) = if config.log_file.is_empty() {
        (None, None)
    } else {
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
        {
            Ok(file) => (Some(file), None),
            Err(e) => (None, Some(e)),
        }
    };

    let (file_layer, guard) = match file {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .event_format(DiagnosticFormat)
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(
                    Targets::new().with_target(env!("CARGO_CRATE_NAME"), Level::INFO),
                );
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().with_filter(
                EnvFilter::builder()
                    .with_default_directive(Level::INFO.into())
                    .from_env_lossy(),
            ),
        )
        .with(file_layer)
        .init();

    if let Some(e) = open_error {
        warn!(
            "Cannot open diagnostic log {}: {}; logging to stdout only",
            config.log_file, e
        );
    }

    guard
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use tracing::{error, info};
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuf {
        type Writer = SharedBuf;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_diagnostic_line_format() {
        let buf = SharedBuf::default();
        let subscriber = tracing_subscriber::fmt()
            .event_format(DiagnosticFormat)
            .with_writer(buf.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            info!("Executing command ps: sudo docker ps");
            error!("Command restart failed ({}): {}", 1, "No such container");
        });

        let contents = buf.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        // [2026-01-01 12:00:00] [INFO] ...
        assert_eq!(&lines[0][0..1], "[");
        assert_eq!(&lines[0][20..21], "]");
        assert!(lines[0][21..].starts_with(" [INFO] Executing command ps"));
        assert!(lines[1].ends_with("[ERROR] Command restart failed (1): No such container"));
    }
}
