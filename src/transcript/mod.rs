//! Transcript cleanup and assembly.
//!
//! Raw caption segments are normalized one by one and then joined into a
//! single readable document.

mod assemble;
mod format;
mod models;
mod normalize;

pub use assemble::{assemble, Assembled};
pub use format::{format_transcript, OutputFormat, TranscriptExport};
pub use models::{Transcript, TranscriptSegment};
pub use normalize::{decode_entities, normalize};
