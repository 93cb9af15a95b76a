//! Transport module - Unix domain socket handling.
//!
//! The client is always the connecting side and opens one connection per
//! call. The listening side is used by the reference [`Server`](crate::server::Server).

mod socket;

pub use socket::{connect, generate_socket_path, SocketListener};
