//! Spoken dialogue building blocks
//!
//! - `prompt`: the slot-filling prompt machine with history and reprompting
//! - `binary`: the yes/no grammar used for confirmations
//! - `translator`: NLU entities to validated command slots

pub mod binary;
pub mod prompt;
pub mod translator;

pub use prompt::{PromptAction, PromptEvent, PromptFn, PromptState, SlotPrompt, CLARIFICATIONS};
pub use translator::{CommandKind, CommandTranslator, Slot, SlotError};
