//! Slot-filling prompt machine
//!
//! A [`SlotPrompt`] cycles through prompt variants until its completion
//! predicate holds on the dialogue context:
//!
//! ```text
//! Init -> Prompt(n) -EndSpeech-> Ask(n) -Timeout-> Prompt(n+1 mod len)
//!                                 Ask(n) -Recognised-> Final | NoMatch
//!                                 NoMatch -EndSpeech-> (history)
//! ```
//!
//! The machine is pure: it never touches the voice device. Callers feed it
//! events and carry out the returned [`PromptAction`]s.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Clarification requests played after an utterance fills nothing
pub const CLARIFICATIONS: &[&str] = &[
    "Sorry, could you please repeat that?",
    "I didn't catch that?",
    "What did you say?",
    "Come again?",
    "Sorry?",
    "Huh?",
];

/// Builds the text of one prompt variant from the dialogue context
pub type PromptFn<C> = fn(&C) -> String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Init,
    /// Speaking prompt variant n
    Prompt(usize),
    /// Listening after prompt variant n
    Ask(usize),
    /// Speaking a clarification or an explanation
    NoMatch,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Start,
    EndSpeech,
    /// The listening window closed without speech
    Timeout,
    /// An utterance was recognised and applied to the context
    Recognised,
    /// The utterance named something invalid; speak this and ask again
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    Speak(String),
    Listen,
    Done,
}

pub struct SlotPrompt<C> {
    prompts: Vec<PromptFn<C>>,
    complete: fn(&C) -> bool,
    state: PromptState,
    /// Last Prompt/Ask sub-state, consulted on re-entry
    history: Option<PromptState>,
}

impl<C> SlotPrompt<C> {
    pub fn new(prompts: Vec<PromptFn<C>>, complete: fn(&C) -> bool) -> Self {
        Self {
            prompts,
            complete,
            state: PromptState::Init,
            history: None,
        }
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    pub fn history(&self) -> Option<PromptState> {
        self.history
    }

    pub fn is_final(&self) -> bool {
        self.state == PromptState::Final
    }

    /// Advance the machine by one event
    pub fn handle(&mut self, event: PromptEvent, ctx: &C, rng: &mut ChaCha8Rng) -> Vec<PromptAction> {
        match (self.state, event) {
            (PromptState::Init, PromptEvent::Start) => {
                if (self.complete)(ctx) || self.prompts.is_empty() {
                    self.finish()
                } else {
                    self.prompt(0, ctx)
                }
            }
            (PromptState::Prompt(n), PromptEvent::EndSpeech) => self.ask(n),
            (PromptState::Ask(n), PromptEvent::Timeout) => {
                // REPROMPT with the next variant
                self.prompt((n + 1) % self.prompts.len(), ctx)
            }
            (PromptState::Ask(_), PromptEvent::Recognised) => {
                if (self.complete)(ctx) {
                    self.finish()
                } else {
                    let phrase = CLARIFICATIONS.choose(rng).copied().unwrap_or("Sorry?");
                    self.state = PromptState::NoMatch;
                    vec![PromptAction::Speak(phrase.to_string())]
                }
            }
            (PromptState::Ask(_), PromptEvent::Rejected(explanation)) => {
                self.state = PromptState::NoMatch;
                vec![PromptAction::Speak(explanation)]
            }
            (PromptState::NoMatch, PromptEvent::EndSpeech) => self.reenter(ctx),
            _ => Vec::new(),
        }
    }

    fn prompt(&mut self, n: usize, ctx: &C) -> Vec<PromptAction> {
        self.state = PromptState::Prompt(n);
        self.history = Some(self.state);
        vec![PromptAction::Speak((self.prompts[n])(ctx))]
    }

    fn ask(&mut self, n: usize) -> Vec<PromptAction> {
        self.state = PromptState::Ask(n);
        self.history = Some(self.state);
        vec![PromptAction::Listen]
    }

    fn finish(&mut self) -> Vec<PromptAction> {
        self.state = PromptState::Final;
        vec![PromptAction::Done]
    }

    fn reenter(&mut self, ctx: &C) -> Vec<PromptAction> {
        match self.history {
            Some(PromptState::Ask(n)) => self.ask(n),
            Some(PromptState::Prompt(n)) => self.prompt(n, ctx),
            _ if self.prompts.is_empty() => self.finish(),
            _ => self.prompt(0, ctx),
        }
    }
}
