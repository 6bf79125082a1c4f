pub mod tcp_transport;

pub use tcp_transport::TcpTransport;
