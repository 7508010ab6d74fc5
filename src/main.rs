use anyhow::{Context, Result};
use dotenvy::dotenv;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tg_dispatch::config::DispatchSettings;
use tg_dispatch::telegram::TelegramTransport;
use tg_dispatch::{Destination, DispatchableMessage, Dispatcher};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting the bot token from log output
struct RedactionPatterns {
    token_url: Regex,
    token_bare: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            token_bare: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let output = self
            .token_url
            .replace_all(input, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        self.token_bare
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string()
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the original length even if redaction changed it
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: (self.make_inner)(),
            patterns: Arc::clone(&self.patterns),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let patterns = Arc::new(RedactionPatterns::new().context("compiling redaction patterns")?);
    init_logging(patterns);

    let settings = match DispatchSettings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let Some(destination) = settings.target_destination() else {
        error!("TARGET_CHAT is not set, nothing to relay to.");
        std::process::exit(1);
    };

    let transport = Arc::new(TelegramTransport::from_token(settings.telegram_token.clone()));
    let dispatcher = Dispatcher::from_settings(transport, &settings);

    info!("Relaying stdin to {}...", destination);
    let sent = relay_stdin(&dispatcher, &destination, &settings).await?;
    info!("Stdin closed, {} message(s) delivered.", sent);

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter {
        make_inner: io::stderr,
        patterns,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

/// Sends every non-empty stdin line as a text message.
///
/// A message that cannot be delivered is logged and skipped.
async fn relay_stdin(
    dispatcher: &Dispatcher,
    destination: &Destination,
    settings: &DispatchSettings,
) -> Result<usize> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sent = 0;

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let mut msg = DispatchableMessage::text(line).with_format(settings.default_format);
        match msg.send(dispatcher, destination).await {
            Ok(()) => sent += 1,
            Err(e) if e.is_exhausted() => warn!("Message dropped: {}", e),
            Err(e) => error!("Failed to send message to {}: {}", destination, e),
        }
    }

    Ok(sent)
}
