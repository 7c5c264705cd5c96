//! CLI command implementations.

mod chat;
mod config;
mod doctor;
mod serve;
mod transcribe;
mod whisper;

pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use serve::{router, run_serve, AppState};
pub use transcribe::run_transcribe;
pub use whisper::run_whisper;
