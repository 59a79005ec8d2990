//! Line stream bridge
//!
//! Turns blocking byte sources (process pipes) into an ordered stream of text
//! lines for a single consumer. The source is drained by a named reader thread,
//! which pushes lines into an unbounded channel; the consumer pulls them either
//! blocking ([`Iterator`]) or async ([`LineStream::next_line`]).
//!
//! End of stream is the channel closing: once the reader thread hits
//! end-of-input (or a read error, which is treated the same way) and drops its
//! sender, the consumer sees `None`.
//!
//! The queue is unbounded, so a consumer that stops pulling lets memory grow
//! without limit. There are no timeouts: a silent process blocks the consumer.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::thread;

use tokio::sync::mpsc;

use odomon_core::prelude::*;

/// Ordered, single-pass sequence of lines read from one source
#[derive(Debug)]
pub struct LineStream {
    rx: mpsc::UnboundedReceiver<String>,
}

impl LineStream {
    /// Start draining `source` on a dedicated thread
    pub fn spawn<R>(name: &str, source: R) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_reader(name, source, tx)?;
        Ok(Self { rx })
    }

    /// Wait for the next line; `None` once the stream has ended
    pub async fn next_line(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Blocking iteration. Must not be driven from inside an async task; use
/// [`LineStream::next_line`] there.
impl Iterator for LineStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.rx.blocking_recv()
    }
}

fn spawn_reader<R>(name: &str, source: R, tx: mpsc::UnboundedSender<String>) -> Result<()>
where
    R: Read + Send + 'static,
{
    let thread_name = format!("line-reader-{}", name);
    let source_name = name.to_string();
    thread::Builder::new()
        .name(thread_name)
        .spawn(move || read_lines(&source_name, source, tx))?;
    Ok(())
}

/// Reader thread body. Never reports read errors; they end the stream.
fn read_lines<R: Read>(name: &str, source: R, tx: mpsc::UnboundedSender<String>) {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();
    let mut count: u64 = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                debug!("{}: end of input after {} lines", name, count);
                break;
            }
            Ok(_) => {
                let line = decode_line(&buf);
                trace!("{}: {}", name, line);
                if tx.send(line).is_err() {
                    debug!("{}: consumer dropped, stopping reader", name);
                    break;
                }
                count += 1;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("{}: read failed after {} lines, ending stream: {}", name, count, e);
                break;
            }
        }
    }
}

/// Strip the line terminator; invalid UTF-8 becomes U+FFFD
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
