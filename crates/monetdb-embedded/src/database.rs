//! Embedded database instance lifecycle.
//!
//! The engine allows one running database per process. [`Database::start`]
//! checks the engine before starting it rather than holding a process-wide
//! lock, and [`Database::stop`] closes every connection it handed out before
//! shutting the engine down.

use std::path::{Path, PathBuf};

use monetdb_marshal::MarshalConfig;
use parking_lot::Mutex;

use crate::config::EmbeddedConfig;
use crate::connection::{Connection, ConnectionInner, SharedConnection};
use crate::engine::{SharedEngine, StartupOptions, StorageEngine};
use crate::error::{ALREADY_RUNNING, EmbeddedError, NOT_RUNNING, Result};

/// A running embedded database.
#[derive(Debug)]
pub struct Database<E: StorageEngine> {
    engine: SharedEngine<E>,
    directory: Option<PathBuf>,
    silent: bool,
    sequential: bool,
    reply_size: usize,
    marshal: MarshalConfig,
    connections: Mutex<Vec<SharedConnection>>,
}

impl<E: StorageEngine> Database<E> {
    /// Start the engine with the configured directory and flags.
    pub fn start(engine: SharedEngine<E>, config: &EmbeddedConfig) -> Result<Self> {
        let options = StartupOptions {
            directory: config.directory.clone(),
            silent: config.silent,
            sequential: config.sequential,
        };

        {
            let mut guard = engine.lock();
            if guard.is_initialized() {
                return Err(EmbeddedError::interface(ALREADY_RUNNING));
            }
            guard.startup(&options)?;
        }

        tracing::debug!(
            directory = ?options.directory,
            sequential = options.sequential,
            "database started"
        );

        Ok(Self {
            engine,
            directory: options.directory,
            silent: options.silent,
            sequential: options.sequential,
            reply_size: config.reply_size.get(),
            marshal: config.marshal,
            connections: Mutex::new(Vec::new()),
        })
    }

    /// Close every live connection and shut the engine down.
    pub fn stop(&self) -> Result<()> {
        if !self.is_running() {
            return Err(EmbeddedError::interface(NOT_RUNNING));
        }

        // Connection state is always locked before the engine
        let open: Vec<_> = self
            .connections
            .lock()
            .drain(..)
            .filter_map(|shared| {
                let mut inner = shared.lock();
                match std::mem::replace(&mut *inner, ConnectionInner::Disconnected) {
                    ConnectionInner::Connected(id) => Some(id),
                    ConnectionInner::Disconnected => None,
                }
            })
            .collect();

        let mut engine = self.engine.lock();
        for id in open {
            if let Err(err) = engine.disconnect(id) {
                tracing::warn!(connection = id, error = %err, "failed to close connection on shutdown");
            }
        }

        if !engine.is_initialized() {
            return Err(EmbeddedError::interface(NOT_RUNNING));
        }
        engine.shutdown()?;
        tracing::debug!("database stopped");
        Ok(())
    }

    /// Open a new connection with the configured reply size.
    pub fn connect(&self) -> Result<Connection<E>> {
        let mut connections = self.connections.lock();
        let id = {
            let mut engine = self.engine.lock();
            if !engine.is_initialized() {
                return Err(EmbeddedError::interface(NOT_RUNNING));
            }
            let id = engine.connect()?;
            if let Err(err) = engine.set_reply_size(id, self.reply_size) {
                if let Err(cleanup) = engine.disconnect(id) {
                    tracing::warn!(connection = id, error = %cleanup, "failed to drop half-open connection");
                }
                return Err(err.into());
            }
            id
        };

        let connection = Connection::new(id, self.engine.clone(), self.marshal);
        connections.retain(|c| matches!(*c.lock(), ConnectionInner::Connected(_)));
        connections.push(connection.shared());
        tracing::debug!(connection = id, "connection opened");
        Ok(connection)
    }

    /// Number of connections opened here and not yet closed.
    pub fn live_connections(&self) -> usize {
        self.connections
            .lock()
            .iter()
            .filter(|c| matches!(*c.lock(), ConnectionInner::Connected(_)))
            .count()
    }

    /// Returns true while the engine is started.
    pub fn is_running(&self) -> bool {
        self.engine.lock().is_initialized()
    }

    /// Database directory, `None` when in memory.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Returns true for an in-memory database.
    pub const fn is_in_memory(&self) -> bool {
        self.directory.is_none()
    }

    /// Whether engine console output is suppressed.
    pub const fn is_silent(&self) -> bool {
        self.silent
    }

    /// Whether the engine runs single-threaded.
    pub const fn is_sequential(&self) -> bool {
        self.sequential
    }

    /// Marshal settings given to every connection.
    pub const fn marshal_config(&self) -> &MarshalConfig {
        &self.marshal
    }
}
