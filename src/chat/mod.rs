pub mod session;

pub use session::{run_chat, ChatSession, CHAT_DEFAULTS};
