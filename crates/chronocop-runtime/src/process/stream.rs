//! Async stream log readers (non-UTF8-safe).
//!
//! The backend (and anything it shells out to) can emit non-UTF8 bytes on
//! stdout/stderr. `BufReader::lines()` would end the reader task on invalid
//! UTF-8, so lines are read as bytes and decoded lossily.

use std::sync::Arc;

use chronocop_core::{LogStream, ServerLogSinkPort};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

/// Forward every line of `stream` to `sink` until EOF or a read error.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    port: u16,
    origin: LogStream,
    sink: Arc<dyn ServerLogSinkPort>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    sink.append(port, origin, String::from_utf8_lossy(&buf).into_owned());
                }
                Err(e) => {
                    debug!(port, stream = %origin, error = %e, "log stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(port, stream = %origin, "log stream reader task exiting");
    })
}
