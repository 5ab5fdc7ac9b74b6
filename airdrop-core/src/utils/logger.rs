use anyhow::{Context, Result};
use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Targets,
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer,
};

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "airdrop";
const FILE_DIRECTIVES: &str = "warn,session_event=info";
const CONSOLE_DIRECTIVES: &str = "error,session_event=info";

/// Console + hourly rolling file logging. Session events are shown at INFO,
/// everything else at WARN (file) and ERROR (console) unless `RUST_LOG` is
/// set, in which case it drives both layers.
///
/// The returned guard flushes the file writer and must be kept alive.
pub fn setup_logger() -> Option<WorkerGuard> {
    std::fs::create_dir_all(LOG_DIR).ok();

    let file_appender = tracing_appender::rolling::hourly(LOG_DIR, LOG_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(layer_filter(FILE_DIRECTIVES));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(layer_filter(CONSOLE_DIRECTIVES));

    let result = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    match result {
        Ok(()) => Some(guard),
        // A subscriber is already installed (tests, embedding apps)
        Err(_) => None,
    }
}

pub fn setup_logger_with_file(log_path: &str) -> Result<WorkerGuard> {
    let file = File::create(log_path).context("Failed to create log file")?;
    let (non_blocking, guard) = tracing_appender::non_blocking(BufWriter::new(file));

    let subscriber = tracing_subscriber::registry().with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .event_format(FileFormatter)
            .with_filter(default_filter(tracing::Level::DEBUG)),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global subscriber")?;

    Ok(guard)
}

/// `RUST_LOG` when set and valid, otherwise the layer's own directives.
fn layer_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

fn default_filter(level: tracing::Level) -> Targets {
    Targets::new()
        .with_target("session_event", tracing::Level::INFO)
        .with_default(level)
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn paint_keywords(msg: String) -> String {
    let green = Style::new().fg(Color::LightGreen).bold();
    let red = Style::new().fg(Color::LightRed).bold();
    let yellow = Style::new().fg(Color::Yellow).bold();

    let mut out = msg;
    for word in ["SUCCESS", "CLAIMED", "SOLD"] {
        if out.contains(word) {
            out = out.replace(word, &green.paint(word).to_string());
        }
    }
    if out.contains("FAILED") {
        out = out.replace("FAILED", &red.paint("FAILED").to_string());
    }
    if out.contains("cancelled") {
        out = out.replace("cancelled", &yellow.paint("cancelled").to_string());
    }
    out
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);

        write!(writer, "{}", paint_keywords(msg_visitor.message))?;
        writeln!(writer)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();
        let target = event.metadata().target();

        write!(writer, "{} [{}] {}: ", timestamp, level, target)?;

        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);
        writeln!(writer, "{}", msg_visitor.message)
    }
}
