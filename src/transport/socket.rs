//! Unix domain socket connect/listen.
//!
//! # Example
//!
//! ```ignore
//! use custard_client::transport::{connect, generate_socket_path, SocketListener};
//!
//! let path = generate_socket_path();
//! let listener = SocketListener::bind(&path)?;
//! let client_side = connect(&path).await?;
//! let server_side = listener.accept().await?;
//! ```

use std::path::Path;

use tokio::net::{UnixListener, UnixStream};

use crate::error::{ClientError, Result};

/// Generate a unique socket path for this process.
///
/// Format: `/tmp/custard-{pid}-{random}.sock`
pub fn generate_socket_path() -> String {
    let pid = std::process::id();
    format!("/tmp/custard-{}-{:x}.sock", pid, rand_u64())
}

/// Simple random u64 using system time, process ID and a counter.
fn rand_u64() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    let pid = std::process::id() as u64;
    nanos.wrapping_mul(0x517cc1b727220a95) ^ pid ^ count.rotate_left(32)
}

/// Open a fresh connection to the socket at `path`.
///
/// # Errors
///
/// Returns `Connect` if nothing is listening there.
pub async fn connect(path: &str) -> Result<UnixStream> {
    UnixStream::connect(path)
        .await
        .map_err(|source| ClientError::Connect {
            path: path.to_string(),
            source,
        })
}

/// Unix Domain Socket listener that removes its socket file on drop.
pub struct SocketListener {
    listener: UnixListener,
    path: String,
}

impl SocketListener {
    /// Bind to a Unix socket path.
    ///
    /// Removes any existing socket file at the path before binding.
    /// Must be called from within a tokio runtime.
    pub fn bind(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            std::fs::remove_file(path)?;
        }

        let listener = UnixListener::bind(path)?;

        Ok(Self {
            listener,
            path: path.to_string(),
        })
    }

    /// Accept a single connection.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self.listener.accept().await?;
        Ok(stream)
    }

    /// Get the socket path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Drop for SocketListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_generate_socket_path_format() {
        let path = generate_socket_path();
        assert!(path.starts_with("/tmp/custard-"));
        assert!(path.ends_with(".sock"));
        assert!(path.contains(&std::process::id().to_string()));
    }

    #[test]
    fn test_generate_socket_path_uniqueness() {
        let paths: Vec<String> = (0..10).map(|_| generate_socket_path()).collect();

        for (i, p1) in paths.iter().enumerate() {
            for (j, p2) in paths.iter().enumerate() {
                if i != j {
                    assert_ne!(p1, p2, "Paths should be unique");
                }
            }
        }
    }

    #[tokio::test]
    async fn test_connect_missing_socket() {
        let path = generate_socket_path();
        let err = connect(&path).await.unwrap_err();
        assert!(matches!(err, ClientError::Connect { .. }));
        assert!(err.is_transport());
        assert!(err.to_string().contains(&path));
    }

    #[tokio::test]
    async fn test_bind_accept_and_cleanup() {
        let path = generate_socket_path();
        let listener = SocketListener::bind(&path).unwrap();
        assert_eq!(listener.path(), path);

        let mut client = connect(&path).await.unwrap();
        let mut server = listener.accept().await.unwrap();

        client.write_all(b"hi").await.unwrap();
        let mut buf = [0u8; 2];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hi");

        drop(listener);
        assert!(!Path::new(&path).exists());
    }

    #[tokio::test]
    async fn test_bind_replaces_stale_socket_file() {
        let path = generate_socket_path();
        std::fs::write(&path, b"stale").unwrap();
        let listener = SocketListener::bind(&path).unwrap();
        assert!(connect(listener.path()).await.is_ok());
    }
}
