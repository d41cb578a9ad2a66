//! Persona coordinator (spec.md §4.5, §6): GetActivePersona, SetActivePersona,
//! GetActiveMode, SetMode (publishes ModeChanged), ProcessInput,
//! GetModeHistory, BuildSystemPrompt, Stats.

use async_trait::async_trait;
use std::sync::RwLock;

use super::CoordinatorError;
use crate::events::EventEmitter;

/// Behavioral modes drawn from the fixed set exposed on the wire (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Debugging,
    Teaching,
    Pair,
    Review,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Debugging => "debugging",
            Mode::Teaching => "teaching",
            Mode::Pair => "pair",
            Mode::Review => "review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Mode::Normal),
            "debugging" => Some(Mode::Debugging),
            "teaching" => Some(Mode::Teaching),
            "pair" => Some(Mode::Pair),
            "review" => Some(Mode::Review),
            _ => None,
        }
    }
}

/// A bundle of identity, traits, expertise domains, communication style,
/// and behavioral modes that shapes the system prompt (spec.md glossary).
#[derive(Debug, Clone)]
pub struct Persona {
    pub id: String,
    pub identity: String,
    pub traits: Vec<String>,
    pub expertise: Vec<String>,
    pub communication_style: String,
}

impl Persona {
    pub fn default_persona() -> Self {
        Self {
            id: "default".to_string(),
            identity: "a careful, direct engineering assistant".to_string(),
            traits: vec!["precise".to_string(), "terse".to_string()],
            expertise: Vec::new(),
            communication_style: "plain, technical".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PersonaStats {
    pub mode_transitions: u64,
}

#[async_trait]
pub trait PersonaCoordinator: Send + Sync {
    async fn get_active_persona(&self) -> Result<Persona, CoordinatorError>;

    async fn set_active_persona(&self, id: &str) -> Result<(), CoordinatorError>;

    async fn get_active_mode(&self) -> Mode;

    /// Set the active mode and publish `ModeChanged` (spec.md §4.5).
    async fn set_mode(&self, mode: Mode, trigger: &str, emitter: &EventEmitter) -> Result<(), CoordinatorError>;

    /// Inspect free-form input for an implicit mode-switch trigger (e.g. "let's debug this");
    /// returns whether a transition occurred.
    async fn process_input(&self, input: &str, emitter: &EventEmitter) -> bool;

    fn get_mode_history(&self) -> Vec<(Mode, String)>;

    async fn build_system_prompt(&self) -> Result<String, CoordinatorError>;

    fn stats(&self) -> PersonaStats;
}

struct NoopInner {
    mode: Mode,
    history: Vec<(Mode, String)>,
}

/// Disabled variant: fixed default persona, mode transitions tracked
/// in-memory but with no persistence (spec.md §4.5).
pub struct NoopPersonaCoordinator {
    inner: RwLock<NoopInner>,
}

impl Default for NoopPersonaCoordinator {
    fn default() -> Self {
        Self {
            inner: RwLock::new(NoopInner {
                mode: Mode::Normal,
                history: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl PersonaCoordinator for NoopPersonaCoordinator {
    async fn get_active_persona(&self) -> Result<Persona, CoordinatorError> {
        Ok(Persona::default_persona())
    }

    async fn set_active_persona(&self, id: &str) -> Result<(), CoordinatorError> {
        if id == "default" {
            Ok(())
        } else {
            Err(CoordinatorError::UnknownPersona { id: id.to_string() })
        }
    }

    async fn get_active_mode(&self) -> Mode {
        self.inner.read().unwrap().mode
    }

    async fn set_mode(&self, mode: Mode, trigger: &str, emitter: &EventEmitter) -> Result<(), CoordinatorError> {
        let mut inner = self.inner.write().unwrap();
        inner.mode = mode;
        inner.history.push((mode, trigger.to_string()));
        drop(inner);
        emitter.mode_changed(mode.as_str(), trigger, false);
        Ok(())
    }

    async fn process_input(&self, _input: &str, _emitter: &EventEmitter) -> bool {
        false
    }

    fn get_mode_history(&self) -> Vec<(Mode, String)> {
        self.inner.read().unwrap().history.clone()
    }

    async fn build_system_prompt(&self) -> Result<String, CoordinatorError> {
        let persona = self.get_active_persona().await?;
        Ok(format!("You are {}.", persona.identity))
    }

    fn stats(&self) -> PersonaStats {
        PersonaStats {
            mode_transitions: self.inner.read().unwrap().history.len() as u64,
        }
    }
}
