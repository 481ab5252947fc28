pub mod config;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod server;
pub mod state;
pub mod stream;
pub mod translate;
pub mod transport;
