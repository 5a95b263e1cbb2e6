//! UI utilities for the client.

use std::io::Write;

/// Redisplay the prompt after printing channel output
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}

/// Prompt shown while talking to `peer`
pub fn prompt_for(self_id: &str, peer: &str) -> String {
    format!("{} → {}> ", self_id, peer)
}
