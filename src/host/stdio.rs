//! Stdin/stdout JSON bridge for the host command channel.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages from stdin,
//! dispatches them through the `HostCommandServer` router, and writes
//! `ResponseEnvelope` and `EventEnvelope` messages as newline-delimited
//! JSON to stdout.
//!
//! Every `target.write` event produced by a command is written before
//! that command's response, so a client can treat the response line as the
//! end of the command's output.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use crate::error::{BridgeError, Result};
use crate::host::channel::{HostCommandClient, SyncHandler, command_channel};
use crate::host::contract::{CommandEnvelope, CommandName, EventEnvelope, ResponseEnvelope};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Default request channel capacity for the stdio bridge.
const REQUEST_CAPACITY: usize = 16;

/// Default event broadcast channel capacity for the stdio bridge.
const EVENT_CAPACITY: usize = 64;

/// Run the JSON bridge on the process's stdin and stdout until stdin
/// closes or a `runtime.stop` command is received.
pub async fn run_stdio_bridge<H: SyncHandler>(handler: H) -> Result<()> {
    run_bridge(
        handler,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Run the JSON bridge over arbitrary line-oriented streams.
///
/// The router runs the `HostCommandServer` on a blocking thread. The
/// calling task reads commands from `input`, dispatches each through the
/// host command client, then writes the events the command broadcast
/// followed by its response.
///
/// The bridge exits when the reader finishes. Dropping the client closes
/// the request channel, which ends the router.
pub async fn run_bridge<H, R, W>(handler: H, input: R, mut output: W) -> Result<()>
where
    H: SyncHandler,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (client, server) = command_channel(REQUEST_CAPACITY, EVENT_CAPACITY, handler);
    // Subscribed before the first request so no event can be missed.
    let events = client.subscribe_events();

    let server_handle = tokio::spawn(server.run());
    let reader_result = run_reader(client, events, input, &mut output).await;
    let _ = server_handle.await;

    reader_result
}

/// Read commands line by line, dispatch each, and write its events and
/// response.
async fn run_reader<R, W>(
    client: HostCommandClient,
    mut events: broadcast::Receiver<EventEnvelope>,
    mut input: R,
    writer: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = input
            .read_line(&mut line)
            .await
            .map_err(|e| BridgeError::Host(format!("failed to read from stdin: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); shutting down bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, raw_line = %trimmed, "failed to parse command envelope");
                let response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_json(writer, &response).await?;
                continue;
            }
        };

        let is_stop = envelope.command == CommandName::RuntimeStop;
        let request_id = envelope.request_id.clone();

        let response = match client.send(envelope).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, "host command dispatch failed");
                ResponseEnvelope::error(request_id, format!("dispatch failed: {e}"))
            }
        };
        // The router broadcasts a command's events before replying, so
        // they are all queued by now.
        drain_events(&mut events, writer).await?;
        write_json(writer, &response).await?;

        if is_stop {
            tracing::info!("runtime.stop received; shutting down bridge");
            break;
        }
    }

    Ok(())
}

/// Write every queued event without waiting for more.
async fn drain_events<W: AsyncWrite + Unpin>(
    events: &mut broadcast::Receiver<EventEnvelope>,
    writer: &mut W,
) -> Result<()> {
    loop {
        match events.try_recv() {
            Ok(event) => write_json(writer, &event).await?,
            Err(TryRecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "event queue overflowed; some events were dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

async fn write_json<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(message)
        .map_err(|e| BridgeError::Host(format!("failed to serialize envelope: {e}")))?;
    write_line(writer, &json).await
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin + ?Sized>(writer: &mut W, json: &str) -> Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| BridgeError::Host(format!("failed to write to stdout: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| BridgeError::Host(format!("failed to write newline to stdout: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| BridgeError::Host(format!("failed to flush stdout: {e}")))?;
    Ok(())
}
