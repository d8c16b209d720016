//! Scripted speech device for headless runs and tests
//!
//! Each LISTEN consumes one script line. `Say` produces a speech start and a
//! recognition result, `Silence` produces nothing so the listening window
//! times out. Everything spoken is recorded in a shared [`Transcript`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::core::error::{GameError, Result};
use crate::voice::{DeviceEvent, Hypothesis, SpeechBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    Say(String),
    Silence,
}

impl ScriptLine {
    pub fn say(text: &str) -> Self {
        ScriptLine::Say(text.to_string())
    }
}

/// Shared record of what the device has spoken
#[derive(Debug, Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<String>>>);

impl Transcript {
    fn push(&self, text: &str) {
        if let Ok(mut lines) = self.0.lock() {
            lines.push(text.to_string());
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Whether any spoken line contains `text`
    pub fn mentions(&self, text: &str) -> bool {
        self.lines().iter().any(|l| l.contains(text))
    }
}

#[derive(Debug, Default)]
pub struct ScriptedSpeech {
    script: VecDeque<ScriptLine>,
    /// Replayed in a loop once the script runs out
    repeat: Vec<ScriptLine>,
    repeat_at: usize,
    events: Option<mpsc::UnboundedSender<DeviceEvent>>,
    transcript: Transcript,
    fail_setup: bool,
}

impl ScriptedSpeech {
    pub fn new(script: impl IntoIterator<Item = ScriptLine>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Loop over `lines` after the script is exhausted
    pub fn then_repeat(mut self, lines: impl IntoIterator<Item = ScriptLine>) -> Self {
        self.repeat = lines.into_iter().collect();
        self
    }

    /// A device that refuses to be acquired
    pub fn failing() -> Self {
        Self {
            fail_setup: true,
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    fn next_line(&mut self) -> Option<ScriptLine> {
        if let Some(line) = self.script.pop_front() {
            return Some(line);
        }
        if self.repeat.is_empty() {
            return None;
        }
        let line = self.repeat[self.repeat_at % self.repeat.len()].clone();
        self.repeat_at += 1;
        Some(line)
    }

    fn emit(&self, event: DeviceEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

impl SpeechBackend for ScriptedSpeech {
    fn acquire(&mut self, events: mpsc::UnboundedSender<DeviceEvent>) -> Result<()> {
        if self.fail_setup {
            return Err(GameError::VoiceSetup("scripted device disabled".into()));
        }
        self.events = Some(events);
        Ok(())
    }

    fn start_recognition(&mut self) {
        if let Some(ScriptLine::Say(text)) = self.next_line() {
            self.emit(DeviceEvent::SpeechStarted);
            self.emit(DeviceEvent::Recognised(Hypothesis::new(text, 1.0)));
        }
    }

    fn stop_recognition(&mut self) {}

    fn speak(&mut self, text: &str) {
        self.transcript.push(text);
        self.emit(DeviceEvent::SpeakingFinished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_then_repeat() {
        let mut speech = ScriptedSpeech::new([ScriptLine::say("a")])
            .then_repeat([ScriptLine::say("b"), ScriptLine::Silence]);
        assert_eq!(speech.next_line(), Some(ScriptLine::say("a")));
        assert_eq!(speech.next_line(), Some(ScriptLine::say("b")));
        assert_eq!(speech.next_line(), Some(ScriptLine::Silence));
        assert_eq!(speech.next_line(), Some(ScriptLine::say("b")));
    }

    #[test]
    fn test_exhausted_script_is_silent() {
        let mut speech = ScriptedSpeech::default();
        assert_eq!(speech.next_line(), None);
    }

    #[test]
    fn test_speak_records_transcript() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut speech = ScriptedSpeech::default();
        let transcript = speech.transcript();
        speech.acquire(tx).unwrap();
        speech.speak("Huh?");
        assert!(transcript.mentions("Huh"));
        assert_eq!(rx.try_recv(), Ok(DeviceEvent::SpeakingFinished));
    }
}
