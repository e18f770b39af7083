mod http;
mod websocket;

pub use http::{current_round, get_round, get_tables, health_check};
pub use websocket::websocket_handler;
