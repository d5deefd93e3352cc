//! Tutor conversation orchestration
//!
//! Sequences one practice turn — transcribe, chat, optional translation,
//! speech playback — and maintains the append-only conversation history.

mod backend;
mod message;
mod session;

pub use backend::{HttpTutorBackend, TutorBackend};
pub use message::{ChatMessage, Role, FALLBACK_REPLY, WELCOME_MESSAGE};
pub use session::{TutorSession, TutorSettings};
