//! Voice interaction subsystem
//!
//! A single actor owns the speech device. Actors register as listeners, ask it
//! to SPEAK or LISTEN, and receive the resulting events on their own channel.
//! The listening timeout lives here: if nobody starts talking within the
//! configured window the owner gets [`VoiceEvent::Timeout`].

pub mod actor;
pub mod console;
pub mod scripted;

pub use actor::{VoiceClient, VoiceHandle};
pub use console::ConsoleSpeech;
pub use scripted::{ScriptLine, ScriptedSpeech, Transcript};

use tokio::sync::mpsc;

use crate::core::error::Result;

/// Identifies a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

/// One recognition hypothesis
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub utterance: String,
    pub confidence: f32,
}

impl Hypothesis {
    pub fn new(utterance: impl Into<String>, confidence: f32) -> Self {
        Self {
            utterance: utterance.into(),
            confidence,
        }
    }
}

/// Events delivered to the listener that issued the command
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    /// The user started talking
    StartSpeech,
    /// ASRRESULT
    Recognised(Hypothesis),
    /// Nobody spoke within the listening window
    Timeout,
    /// Speech synthesis finished
    EndSpeech,
    /// The device could not be set up
    Failed,
}

/// Raw notifications pushed by a speech backend
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    SpeechStarted,
    Recognised(Hypothesis),
    SpeakingFinished,
}

/// A speech device: recognition plus synthesis
///
/// Calls return immediately; completion is reported through the event sender
/// handed over in [`SpeechBackend::acquire`].
pub trait SpeechBackend: Send + 'static {
    /// Claim the device
    fn acquire(&mut self, events: mpsc::UnboundedSender<DeviceEvent>) -> Result<()>;

    fn start_recognition(&mut self);

    fn stop_recognition(&mut self);

    fn speak(&mut self, text: &str);
}
