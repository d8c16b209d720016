//! The voice actor and its handles
//!
//! States: `SettingUp → Idle ⇄ Recognising | Speaking`, or `Failed` if the
//! device cannot be acquired. Commands arriving while the device is busy wait
//! in a queue. The listening deadline is only armed while recognising with no
//! input yet, and is cleared on every exit from that state.

use std::collections::VecDeque;
use std::time::Duration;

use ahash::AHashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::core::error::{GameError, Result};
use crate::voice::{DeviceEvent, ListenerId, SpeechBackend, VoiceEvent};

#[derive(Debug)]
enum VoiceCommand {
    Register {
        reply: oneshot::Sender<(ListenerId, mpsc::UnboundedReceiver<VoiceEvent>)>,
    },
    Speak {
        owner: ListenerId,
        text: String,
    },
    Listen {
        owner: ListenerId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recognition {
    NoInput,
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoiceState {
    SettingUp,
    Idle,
    Recognising {
        owner: ListenerId,
        phase: Recognition,
    },
    Speaking {
        owner: ListenerId,
    },
    Failed,
}

/// Address of the voice actor
#[derive(Debug, Clone)]
pub struct VoiceHandle {
    tx: mpsc::UnboundedSender<VoiceCommand>,
}

impl VoiceHandle {
    /// Spawn the actor and acquire the device
    ///
    /// Fails with [`GameError::VoiceSetup`] when the backend cannot be claimed.
    pub async fn start(backend: Box<dyn SpeechBackend>, listen_timeout: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (device_tx, device_rx) = mpsc::unbounded_channel();
        let (setup_tx, setup_rx) = oneshot::channel();

        let actor = VoiceActor {
            backend,
            state: VoiceState::SettingUp,
            commands: rx,
            device: device_rx,
            listeners: AHashMap::new(),
            next_id: 0,
            pending: VecDeque::new(),
            deadline: None,
            listen_timeout,
        };
        tokio::spawn(actor.run(device_tx, setup_tx));

        match setup_rx.await {
            Ok(Ok(())) => Ok(Self { tx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(GameError::ActorGone("voice")),
        }
    }

    /// Register a new listener
    pub async fn register(&self) -> Result<VoiceClient> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(VoiceCommand::Register { reply })
            .map_err(|_| GameError::ActorGone("voice"))?;
        let (id, events) = rx.await.map_err(|_| GameError::ActorGone("voice"))?;
        Ok(VoiceClient {
            id,
            tx: self.tx.clone(),
            events,
        })
    }
}

/// A registered listener's view of the voice actor
#[derive(Debug)]
pub struct VoiceClient {
    id: ListenerId,
    tx: mpsc::UnboundedSender<VoiceCommand>,
    events: mpsc::UnboundedReceiver<VoiceEvent>,
}

impl VoiceClient {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// SPEAK; completion arrives as [`VoiceEvent::EndSpeech`]
    pub fn speak(&self, text: impl Into<String>) -> Result<()> {
        self.tx
            .send(VoiceCommand::Speak {
                owner: self.id,
                text: text.into(),
            })
            .map_err(|_| GameError::ActorGone("voice"))
    }

    /// LISTEN; answered by a recognition result or a timeout
    pub fn listen(&self) -> Result<()> {
        self.tx
            .send(VoiceCommand::Listen { owner: self.id })
            .map_err(|_| GameError::ActorGone("voice"))
    }

    pub async fn next_event(&mut self) -> Option<VoiceEvent> {
        self.events.recv().await
    }

    /// Speak and wait until the device is done
    pub async fn say(&mut self, text: impl Into<String>) -> Result<()> {
        self.speak(text)?;
        loop {
            match self.next_event().await {
                Some(VoiceEvent::EndSpeech) => return Ok(()),
                Some(VoiceEvent::Failed) => {
                    return Err(GameError::VoiceSetup("device unavailable".into()))
                }
                Some(other) => debug!(?other, "ignoring voice event while speaking"),
                None => return Err(GameError::ActorGone("voice")),
            }
        }
    }
}

struct VoiceActor {
    backend: Box<dyn SpeechBackend>,
    state: VoiceState,
    commands: mpsc::UnboundedReceiver<VoiceCommand>,
    device: mpsc::UnboundedReceiver<DeviceEvent>,
    listeners: AHashMap<ListenerId, mpsc::UnboundedSender<VoiceEvent>>,
    next_id: u32,
    pending: VecDeque<VoiceCommand>,
    deadline: Option<Instant>,
    listen_timeout: Duration,
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl VoiceActor {
    async fn run(
        mut self,
        device_tx: mpsc::UnboundedSender<DeviceEvent>,
        setup: oneshot::Sender<Result<()>>,
    ) {
        let acquired = self.backend.acquire(device_tx);
        match &acquired {
            Ok(()) => {
                info!("voice device ready");
                self.state = VoiceState::Idle;
            }
            Err(e) => {
                warn!("voice setup failed: {}", e);
                self.state = VoiceState::Failed;
            }
        }
        let _ = setup.send(acquired);

        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(event) = self.device.recv() => self.on_device(event),
                _ = wait_for(deadline) => self.on_timeout(),
            }
        }
        debug!("voice actor stopped");
    }

    fn on_command(&mut self, command: VoiceCommand) {
        match command {
            VoiceCommand::Register { reply } => {
                let id = ListenerId(self.next_id);
                self.next_id += 1;
                let (tx, rx) = mpsc::unbounded_channel();
                self.listeners.insert(id, tx);
                let _ = reply.send((id, rx));
            }
            command => match self.state {
                VoiceState::Failed => {
                    if let VoiceCommand::Speak { owner, .. } | VoiceCommand::Listen { owner } =
                        command
                    {
                        self.notify(owner, VoiceEvent::Failed);
                    }
                }
                VoiceState::Idle => self.execute(command),
                _ => self.pending.push_back(command),
            },
        }
    }

    fn execute(&mut self, command: VoiceCommand) {
        match command {
            VoiceCommand::Speak { owner, text } => {
                debug!(%text, "SPEAK");
                self.state = VoiceState::Speaking { owner };
                self.backend.speak(&text);
            }
            VoiceCommand::Listen { owner } => {
                debug!("LISTEN");
                self.state = VoiceState::Recognising {
                    owner,
                    phase: Recognition::NoInput,
                };
                self.deadline = Some(Instant::now() + self.listen_timeout);
                self.backend.start_recognition();
            }
            VoiceCommand::Register { .. } => {}
        }
    }

    fn on_device(&mut self, event: DeviceEvent) {
        match (self.state, event) {
            (
                VoiceState::Recognising {
                    owner,
                    phase: Recognition::NoInput,
                },
                DeviceEvent::SpeechStarted,
            ) => {
                self.deadline = None;
                self.state = VoiceState::Recognising {
                    owner,
                    phase: Recognition::InProgress,
                };
                self.notify(owner, VoiceEvent::StartSpeech);
            }
            (VoiceState::Recognising { owner, .. }, DeviceEvent::Recognised(hypothesis)) => {
                self.deadline = None;
                self.backend.stop_recognition();
                debug!(utterance = %hypothesis.utterance, "ASRRESULT");
                self.notify(owner, VoiceEvent::Recognised(hypothesis));
                self.become_idle();
            }
            (VoiceState::Speaking { owner }, DeviceEvent::SpeakingFinished) => {
                self.notify(owner, VoiceEvent::EndSpeech);
                self.become_idle();
            }
            (state, event) => debug!(?state, ?event, "device event ignored"),
        }
    }

    fn on_timeout(&mut self) {
        self.deadline = None;
        if let VoiceState::Recognising {
            owner,
            phase: Recognition::NoInput,
        } = self.state
        {
            self.backend.stop_recognition();
            debug!("listening timed out");
            self.notify(owner, VoiceEvent::Timeout);
            self.become_idle();
        }
    }

    fn become_idle(&mut self) {
        self.state = VoiceState::Idle;
        while self.state == VoiceState::Idle {
            let Some(next) = self.pending.pop_front() else {
                break;
            };
            self.execute(next);
        }
    }

    fn notify(&self, owner: ListenerId, event: VoiceEvent) {
        if let Some(listener) = self.listeners.get(&owner) {
            let _ = listener.send(event);
        }
    }
}
