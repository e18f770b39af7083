//! Types and utilities shared by the roundfeed server and client.

pub mod logger;
pub mod round;
pub mod time;
pub mod wire;
