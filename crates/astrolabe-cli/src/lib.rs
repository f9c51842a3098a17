//! CLI logic for the Astrolabe layout tool.
//!
//! The CLI hosts a [`LayoutWorker`] in one of two modes:
//!
//! - File mode lays out a single graph document and writes the resulting
//!   `POSITIONS_UPDATED` event as pretty JSON.
//! - Serve mode forwards JSON-lines commands from stdin to the worker and
//!   writes every event it emits to stdout, one per line.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use config::ConfigError;

use std::{
    fs,
    io::{self, BufRead, BufReader, Write},
    thread,
};

use crossbeam_channel::select;
use log::{debug, info, warn};

use astrolabe::{
    AstrolabeError, LayoutWorker,
    config::AppConfig,
    fallback::static_layout,
    protocol::{Command, Event, ProtocolError, RunRequest, decode_command, encode_event},
};

/// Run the Astrolabe CLI application
///
/// # Errors
///
/// Returns `AstrolabeError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed graph documents
/// - A worker that stops before answering
pub fn run(args: &Args) -> Result<(), AstrolabeError> {
    let app_config = config::load_config(args.config.as_ref())?;

    if args.serve {
        info!("Serving layout protocol on stdin/stdout");
        let mut stdout = io::stdout().lock();
        return serve(&app_config, BufReader::new(io::stdin()), &mut stdout);
    }

    let Some(input) = args.input.as_deref() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no input file given").into());
    };

    info!(input_path = input; "Laying out graph");

    let source = fs::read_to_string(input)?;
    let request: RunRequest = serde_json::from_str(&source).map_err(ProtocolError::Decode)?;

    let event = if args.fallback {
        info!("Fallback requested, skipping simulation");
        fallback_event(&request, &app_config)
    } else {
        simulate(request, &app_config)?
    };

    let json = serde_json::to_string_pretty(&event).map_err(ProtocolError::Encode)?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))?;
            info!(output_file = path.as_str(); "Layout written");
        }
        None => writeln!(io::stdout().lock(), "{json}")?,
    }

    Ok(())
}

/// Runs one request on a fresh worker and returns the event to write.
///
/// An `ERROR` answer is replaced with the static layout of the same entities.
fn simulate(request: RunRequest, app_config: &AppConfig) -> Result<Event, AstrolabeError> {
    let worker = LayoutWorker::spawn(app_config)?;

    match worker.recv()? {
        Event::Ready => {}
        other => {
            return Err(AstrolabeError::Worker(format!(
                "expected READY, received {other:?}"
            )));
        }
    }

    let fallback = fallback_event(&request, app_config);
    debug!(
        entity_count = request.entities().len(),
        connection_count = request.connections().len();
        "Sending graph to worker"
    );
    worker.send(Command::ConfigureAndRun(request))?;

    let event = match worker.recv()? {
        Event::Error { message } => {
            warn!(message = message.as_str(); "Simulation failed, writing static layout");
            fallback
        }
        event => event,
    };

    worker.shutdown()?;
    Ok(event)
}

fn fallback_event(request: &RunRequest, app_config: &AppConfig) -> Event {
    let config = app_config.simulation_config().merge(request.config());
    Event::PositionsUpdated(static_layout(request.entities(), &config))
}

/// Speaks the JSON-lines protocol between `input` and `output`.
///
/// The first line written is always `READY`. Each non-blank input line is
/// decoded as a [`Command`]; lines that are not UTF-8 or fail to decode are
/// answered with an `ERROR` event and skipped. When `input` ends, the worker
/// finishes every queued command and its remaining events are written before
/// returning.
///
/// # Errors
///
/// Returns `AstrolabeError` if reading `input` or writing `output` fails, or
/// if the worker stops unexpectedly.
pub fn serve<R, W>(app_config: &AppConfig, input: R, output: &mut W) -> Result<(), AstrolabeError>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let mut worker = LayoutWorker::spawn(app_config)?;
    let ready = worker.recv()?;
    write_event(output, &ready)?;

    let (line_tx, line_rx) = crossbeam_channel::unbounded();
    thread::Builder::new()
        .name("astrolabe-input".to_string())
        .spawn(move || {
            for line in input.lines() {
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })?;

    loop {
        select! {
            recv(line_rx) -> line => match line {
                Ok(Ok(line)) => forward_line(&worker, &line, output)?,
                // Not UTF-8; the reader has already moved past the line.
                Ok(Err(err)) if err.kind() == io::ErrorKind::InvalidData => {
                    warn!(err:%; "Rejecting unreadable input line");
                    write_event(
                        output,
                        &Event::Error {
                            message: err.to_string(),
                        },
                    )?;
                }
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => break,
            },
            recv(worker.events()) -> event => match event {
                Ok(event) => write_event(output, &event)?,
                Err(_) => {
                    return Err(AstrolabeError::Worker(
                        "layout worker stopped unexpectedly".to_string(),
                    ));
                }
            },
        }
    }

    debug!("Input closed, draining remaining events");
    worker.close();
    for event in worker.events().iter() {
        write_event(output, &event)?;
    }

    worker.shutdown()
}

fn forward_line<W: Write>(
    worker: &LayoutWorker,
    line: &str,
    output: &mut W,
) -> Result<(), AstrolabeError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    match decode_command(line) {
        Ok(command) => worker.send(command),
        Err(err) => {
            warn!(err:%; "Rejecting undecodable command");
            write_event(
                output,
                &Event::Error {
                    message: err.to_string(),
                },
            )
        }
    }
}

fn write_event<W: Write>(output: &mut W, event: &Event) -> Result<(), AstrolabeError> {
    let line = encode_event(event)?;
    writeln!(output, "{line}")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use astrolabe::protocol::Snapshot;

    use super::*;

    fn serve_lines(lines: &str) -> Vec<Event> {
        serve_bytes(lines.as_bytes())
    }

    fn serve_bytes(input: &[u8]) -> Vec<Event> {
        let mut output = Vec::new();
        serve(&AppConfig::default(), Cursor::new(input.to_vec()), &mut output).unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_serve_empty_input_only_ready() {
        assert_eq!(serve_lines(""), vec![Event::Ready]);
    }

    #[test]
    fn test_serve_reset() {
        let events = serve_lines("{\"cmd\": \"RESET\"}\n\n");
        assert_eq!(
            events,
            vec![Event::Ready, Event::PositionsUpdated(Snapshot::empty())]
        );
    }

    #[test]
    fn test_serve_undecodable_line_continues() {
        let events = serve_lines(concat!(
            "not json\n",
            "{\"cmd\": \"CONFIGURE_AND_RUN\", \"entities\": [{\"id\": \"a\"}, {\"id\": \"b\"}], ",
            "\"connections\": [{\"fromEntityId\": \"a\", \"toEntityId\": \"b\", \"strength\": 1.0}]}\n",
        ));

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], Event::Ready);
        assert!(matches!(events[1], Event::Error { .. }));
        let Event::PositionsUpdated(snapshot) = &events[2] else {
            panic!("Expected POSITIONS_UPDATED, got {:?}", events[2]);
        };
        assert_eq!(snapshot.entity_ids(), ["a", "b"]);
    }

    #[test]
    fn test_serve_non_utf8_line_continues() {
        let events = serve_bytes(b"\xff\xfe bad\n{\"cmd\": \"RESET\"}\n");

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], Event::Ready);
        let Event::Error { message } = &events[1] else {
            panic!("Expected ERROR, got {:?}", events[1]);
        };
        assert!(message.contains("UTF-8"), "{message}");
        assert_eq!(events[2], Event::PositionsUpdated(Snapshot::empty()));
    }

    #[test]
    fn test_serve_pause_is_silent() {
        let events = serve_lines("{\"cmd\": \"PAUSE\"}\n{\"cmd\": \"RESUME\"}\n");
        assert_eq!(
            events,
            vec![Event::Ready, Event::PositionsUpdated(Snapshot::empty())]
        );
    }

    #[test]
    fn test_fallback_event_uses_request_range() {
        let request: RunRequest = serde_json::from_str(
            r#"{"entities": [{"id": "a"}, {"id": "b"}], "config": {"targetRange": 40}}"#,
        )
        .unwrap();

        let Event::PositionsUpdated(snapshot) = fallback_event(&request, &AppConfig::default())
        else {
            panic!("Expected POSITIONS_UPDATED");
        };

        // Two columns across a 40-wide extent.
        assert_eq!(snapshot.positions()[0], -10.0);
        assert_eq!(snapshot.positions()[3], 10.0);
    }
}
