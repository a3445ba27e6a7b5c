//! ## Network module
//!
//! The rig is reached over a single TCP connection. The read half feeds the gateway
//! ([`serve`]); the write half becomes the shared [`CommandWriter`] all cars emit through.
//!
//! A bad line is logged and skipped. Only a transport failure ends [`serve`].

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;

use crate::config::Limits;
use crate::elevio::writer::CommandWriter;
use crate::elevio;
use crate::error::ParseError;
use crate::manager::Dispatcher;
use crate::print;

/// The two halves of the rig connection.
pub struct Connection {
    /// Buffered inbound side, handed to [`serve`]
    pub reader: BufReader<OwnedReadHalf>,
    /// Serialized outbound side, shared by every car
    pub writer: CommandWriter,
}

impl Connection {
    /// Splits a connected stream.
    pub fn new(stream: TcpStream, write_timeout: std::time::Duration) -> Self {
        let (read, write) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer: CommandWriter::new(write, write_timeout),
        }
    }
}

/// Gateway loop: reads lines from the rig and routes them through `dispatcher`.
///
/// ## Behavior
/// - Each line is parsed with [`elevio::parse_line`] against `limits`.
/// - Unknown or malformed lines (including non-UTF-8) are reported and dropped; the loop
///   continues with the next line.
/// - Blank lines are skipped silently.
///
/// ## Errors
/// A read error, a failed stop command, or the rig closing the connection.
pub async fn serve<R>(reader: R, dispatcher: &Dispatcher, limits: Limits) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut segments = reader.split(b'\n');
    while let Some(raw) = segments.next_segment().await.context("failed to read from rig")? {
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                print::warn(format!("Discarding non-text line: {}", e));
                continue;
            }
        };

        match elevio::parse_line(&line, &limits) {
            Ok(event) => dispatcher.dispatch(event).await?,
            Err(ParseError::Empty) => {}
            Err(e) => print::warn(format!("Discarding line {:?}: {}", line.trim_end(), e)),
        }
    }
    Err(anyhow!("rig closed the connection"))
}
