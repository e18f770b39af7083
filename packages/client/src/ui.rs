//! UI utilities for the client.

use std::io::Write;

pub const PROMPT: &str = "roundfeed> ";

/// Redisplay the prompt after printing asynchronous output
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}
