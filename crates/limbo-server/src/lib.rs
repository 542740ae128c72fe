//! Limbo bulletin-board server.
//!
//! Production glue around the pure logic in [`limbo_core`]: storage
//! backends, command handlers, password hashing, configuration and a tokio
//! TCP runtime speaking line-delimited JSON.
//!
//! # Architecture
//!
//! [`BoardDriver`] is a synchronous function of (session, command) to
//! response over injected storage, hasher and environment. [`Server`] owns
//! the listening socket, gives every connection its own [`Session`], and
//! runs each command on the blocking pool so storage and hashing never stall
//! the async executor.
//!
//! # Components
//!
//! - [`BoardDriver`]: command handlers
//! - [`storage`]: [`MemoryStorage`], [`RedbStorage`], [`ChaoticStorage`]
//! - [`list_threads`]: the listing engine
//! - [`Argon2Hasher`]: production password hashing
//! - [`SystemEnv`]: production environment (real time, crypto RNG)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command_error;
pub mod config;
mod driver;
mod error;
mod listing;
pub mod password;
mod session;
pub mod storage;
mod system_env;
mod transport;

use std::{net::SocketAddr, sync::Arc};

pub use command_error::{CommandError, ErrorClass};
pub use config::{BoardConfig, FileConfig, RuntimeConfig};
pub use driver::BoardDriver;
pub use error::ServerError;
use limbo_core::Environment;
use limbo_proto::{Command, Response};
pub use listing::{ThreadPage, list_threads};
pub use password::{Argon2Hasher, HashError, PasswordHasher};
pub use session::Session;
pub use storage::{ChaoticStorage, MemoryStorage, RedbStorage, Storage, StorageError};
pub use system_env::SystemEnv;
pub use transport::{LineConnection, TcpTransport};

/// Wrt value for replies to lines that aren't a known command.
const UNKNOWN_COMMAND: &str = "unknown";

/// Production Limbo server.
///
/// Wraps a shared [`BoardDriver`] with a TCP listener.
pub struct Server<S, E = SystemEnv, H = Argon2Hasher>
where
    S: Storage,
    E: Environment,
    H: PasswordHasher,
{
    driver: Arc<BoardDriver<E, S, H>>,
    transport: TcpTransport,
}

impl<S: Storage> Server<S> {
    /// Create and bind a server with the production environment and hasher.
    pub async fn bind(config: RuntimeConfig, storage: S) -> Result<Self, ServerError> {
        let driver =
            BoardDriver::new(SystemEnv::new(), storage, Argon2Hasher::new(), config.board);
        Self::with_driver(driver, &config.bind_address).await
    }
}

impl<S, E, H> Server<S, E, H>
where
    S: Storage,
    E: Environment,
    H: PasswordHasher,
{
    /// Bind a server around an existing driver.
    pub async fn with_driver(
        driver: BoardDriver<E, S, H>,
        bind_address: &str,
    ) -> Result<Self, ServerError> {
        let transport = TcpTransport::bind(bind_address).await?;
        Ok(Self { driver: Arc::new(driver), transport })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.transport.local_addr()
    }

    /// Run the server, accepting connections until the task is dropped.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server listening on {}", self.transport.local_addr()?);

        loop {
            match self.transport.accept().await {
                Ok((conn, peer)) => {
                    let driver = Arc::clone(&self.driver);
                    tokio::spawn(async move {
                        tracing::debug!(%peer, "connection opened");
                        match handle_connection(conn, driver).await {
                            Ok(()) => tracing::debug!(%peer, "connection closed"),
                            Err(e) => tracing::warn!(%peer, error = %e, "connection ended"),
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                },
            }
        }
    }
}

/// Serve one connection until the client disconnects.
async fn handle_connection<S, E, H>(
    mut conn: LineConnection,
    driver: Arc<BoardDriver<E, S, H>>,
) -> Result<(), ServerError>
where
    S: Storage,
    E: Environment,
    H: PasswordHasher,
{
    let mut session = Session::Anonymous;

    while let Some(line) = conn.read_line().await? {
        let response = match Command::decode(line) {
            Ok(command) => {
                let driver = Arc::clone(&driver);
                let (response, next) = tokio::task::spawn_blocking(move || {
                    let response = driver.handle(&mut session, command);
                    (response, session)
                })
                .await
                .map_err(|e| ServerError::Internal(e.to_string()))?;
                session = next;
                response
            },
            Err(e) => {
                tracing::warn!(error = %e, "malformed command");
                Response::error(UNKNOWN_COMMAND, e.to_string())
            },
        };

        conn.send(&response).await?;
    }

    Ok(())
}
