//! Terminal chat client built on the realtime channel.

mod formatter;
mod prompt;
mod session;

pub use formatter::MessageFormatter;
pub use session::run_chat;
