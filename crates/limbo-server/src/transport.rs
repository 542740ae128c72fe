//! Line-delimited JSON over TCP.
//!
//! One command per line in, one response per line out. Lines longer than
//! [`MAX_LINE_LEN`] end the connection, since there is no way to resync
//! inside an unbounded line.

use std::net::SocketAddr;

use limbo_proto::Response;
use limbo_proto::commands::MAX_LINE_LEN;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter},
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};

use crate::error::ServerError;

/// Listening TCP socket.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Bind to `address` (e.g. "0.0.0.0:8080").
    pub async fn bind(address: &str) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| ServerError::Transport(format!("couldn't bind {address}: {e}")))?;
        Ok(Self { listener })
    }

    /// Wait for the next client.
    pub async fn accept(&self) -> Result<(LineConnection, SocketAddr), ServerError> {
        let (stream, peer) = self.listener.accept().await?;
        Ok((LineConnection::new(stream), peer))
    }

    /// Local address the transport is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }
}

/// One client connection, framed into lines.
pub struct LineConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    line: String,
}

impl LineConnection {
    /// Wrap an accepted stream.
    pub fn new(stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self { reader: BufReader::new(read), writer: BufWriter::new(write), line: String::new() }
    }

    /// Next non-blank line without its terminator. `None` at end of stream.
    pub async fn read_line(&mut self) -> Result<Option<&str>, ServerError> {
        loop {
            self.line.clear();
            let limit = MAX_LINE_LEN as u64 + 2;
            let read = (&mut self.reader).take(limit).read_line(&mut self.line).await.map_err(
                |e| match e.kind() {
                    std::io::ErrorKind::InvalidData => ServerError::Protocol(e.to_string()),
                    _ => ServerError::Transport(e.to_string()),
                },
            )?;

            if read == 0 {
                return Ok(None);
            }
            let content = self.line.trim_end_matches(['\r', '\n']).len();
            if content > MAX_LINE_LEN {
                return Err(ServerError::Protocol(format!("line exceeds {MAX_LINE_LEN} bytes")));
            }
            if !self.line.trim().is_empty() {
                return Ok(Some(&self.line[..content]));
            }
        }
    }

    /// Send one response line.
    pub async fn send(&mut self, response: &Response) -> Result<(), ServerError> {
        let mut line = response.encode().map_err(|e| ServerError::Internal(e.to_string()))?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
