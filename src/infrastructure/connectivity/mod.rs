pub mod tcp_probe;

pub use tcp_probe::{TcpConnectivityProbe, spawn_probe_loop};
