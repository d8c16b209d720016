//! Terminal speech device
//!
//! SPEAK prints the text, LISTEN accepts the next line typed on stdin. Lines
//! typed while nobody is listening are dropped.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::core::error::{GameError, Result};
use crate::voice::{DeviceEvent, Hypothesis, SpeechBackend};

#[derive(Debug, Default)]
pub struct ConsoleSpeech {
    events: Option<mpsc::UnboundedSender<DeviceEvent>>,
    listening: Arc<AtomicBool>,
}

impl ConsoleSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, event: DeviceEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

impl SpeechBackend for ConsoleSpeech {
    fn acquire(&mut self, events: mpsc::UnboundedSender<DeviceEvent>) -> Result<()> {
        if self.events.is_some() {
            return Err(GameError::VoiceSetup("console already in use".into()));
        }

        let listening = Arc::clone(&self.listening);
        let reader_events = events.clone();
        std::thread::Builder::new()
            .name("console-input".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines().map_while(std::result::Result::ok) {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if !listening.swap(false, Ordering::SeqCst) {
                        debug!("input while not listening: {}", line);
                        continue;
                    }
                    let heard = reader_events
                        .send(DeviceEvent::SpeechStarted)
                        .and_then(|_| {
                            reader_events.send(DeviceEvent::Recognised(Hypothesis::new(line, 1.0)))
                        });
                    if heard.is_err() {
                        break;
                    }
                }
            })?;

        self.events = Some(events);
        Ok(())
    }

    fn start_recognition(&mut self) {
        self.listening.store(true, Ordering::SeqCst);
        println!("   (listening...)");
    }

    fn stop_recognition(&mut self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn speak(&mut self, text: &str) {
        println!("S> {}", text);
        self.emit(DeviceEvent::SpeakingFinished);
    }
}
