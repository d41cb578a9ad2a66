//! Orchestrator configuration (spec.md §6, "Configuration options").

use std::time::Duration;

/// RAPID gate tuning (spec.md §3, §4.2, §6).
#[derive(Debug, Clone, Copy)]
pub struct RapidConfig {
    pub enabled: bool,
    pub min_confidence: f32,
    pub skip_for_simple_commands: bool,
    pub max_clarifications: u32,
    pub skip_in_voice_mode: bool,
}

impl Default for RapidConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_confidence: 0.6,
            skip_for_simple_commands: true,
            max_clarifications: 2,
            skip_in_voice_mode: true,
        }
    }
}

/// Construction-time options for the [`crate::orchestrator::Orchestrator`]
/// (spec.md §6).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub default_timeout: Duration,
    pub max_tool_calls: u32,
    pub enable_knowledge: bool,
    pub enable_fingerprint: bool,
    pub require_confirmation: bool,
    pub skip_routing_for_simple_commands: bool,
    pub rapid: RapidConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(5 * 60),
            max_tool_calls: 10,
            enable_knowledge: true,
            enable_fingerprint: true,
            require_confirmation: false,
            skip_routing_for_simple_commands: true,
            rapid: RapidConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_matches_spec_example() {
        assert_eq!(OrchestratorConfig::default().default_timeout, Duration::from_secs(300));
    }
}
