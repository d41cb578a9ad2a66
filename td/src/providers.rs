//! Model name → provider inference (spec.md §4.9).
//!
//! Provider names are plain strings rather than an enum so coordinators can
//! add providers without a core release; the ordered pattern matches below
//! are the single source of truth other modules (token-metrics splitting,
//! the LLM stage's escalation check) consult.

/// Ordered pattern matches: Anthropic, OpenAI, Google, xAI, then local
/// providers (spec.md §4.9).
pub fn infer_provider_from_model(model: &str) -> &'static str {
    let lower = model.to_lowercase();
    if lower.contains("claude") {
        "anthropic"
    } else if lower.contains("gpt") || lower.starts_with("o1") || lower.starts_with("o3") {
        "openai"
    } else if lower.contains("gemini") {
        "google"
    } else if lower.contains("grok") {
        "xai"
    } else if lower.starts_with("mlx-community/") {
        "mlx"
    } else if lower.contains(':') {
        "ollama"
    } else if ["llama", "mistral", "qwen", "phi", "gemma"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        "ollama"
    } else {
        "unknown"
    }
}

/// Providers whose inference runs on the caller's own hardware, used to
/// split token metrics into local vs external (spec.md §3, §4.9).
pub fn is_local_provider(provider: &str) -> bool {
    matches!(provider.to_lowercase().as_str(), "mlx" | "ollama")
}

/// Convenience wrapper combining inference with the local-provider check
/// (spec.md §4.9).
pub fn is_local_model(model: &str) -> bool {
    is_local_provider(infer_provider_from_model(model))
}

/// Enforce the compatibility matrix from spec.md §4.9: MLX models only run
/// on MLX, `:`-tagged Ollama-style models only on Ollama, cloud model names
/// only on their respective provider.
pub fn is_model_compatible_with_provider(model: &str, provider: &str) -> bool {
    let inferred = infer_provider_from_model(model);
    if inferred == "unknown" {
        // An unrecognized model name is not yet proven incompatible;
        // the caller (escalation policy) decides whether to trust it.
        return true;
    }
    inferred.eq_ignore_ascii_case(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_models_map_to_expected_providers() {
        assert_eq!(infer_provider_from_model("claude-sonnet-4-20250514"), "anthropic");
        assert_eq!(infer_provider_from_model("gpt-4o"), "openai");
        assert_eq!(infer_provider_from_model("o1-preview"), "openai");
        assert_eq!(infer_provider_from_model("gemini-1.5-pro"), "google");
        assert_eq!(infer_provider_from_model("grok-2"), "xai");
    }

    #[test]
    fn local_models_map_to_local_providers() {
        assert_eq!(infer_provider_from_model("mlx-community/Llama-3-8B"), "mlx");
        assert_eq!(infer_provider_from_model("llama3:8b"), "ollama");
        assert_eq!(infer_provider_from_model("mistral"), "ollama");
        assert_eq!(infer_provider_from_model("qwen2.5-coder"), "ollama");
    }

    #[test]
    fn unknown_model_names_fall_back() {
        assert_eq!(infer_provider_from_model("some-custom-thing"), "unknown");
    }

    #[test]
    fn local_provider_classification() {
        assert!(is_local_provider("mlx"));
        assert!(is_local_provider("ollama"));
        assert!(!is_local_provider("anthropic"));
        assert!(is_local_model("llama3:8b"));
        assert!(!is_local_model("claude-sonnet-4-20250514"));
    }

    #[test]
    fn compatibility_matrix() {
        assert!(is_model_compatible_with_provider("mlx-community/Llama-3-8B", "mlx"));
        assert!(!is_model_compatible_with_provider("mlx-community/Llama-3-8B", "ollama"));
        assert!(is_model_compatible_with_provider("llama3:8b", "ollama"));
        assert!(!is_model_compatible_with_provider("llama3:8b", "mlx"));
        assert!(is_model_compatible_with_provider("claude-sonnet-4-20250514", "anthropic"));
        assert!(!is_model_compatible_with_provider("claude-sonnet-4-20250514", "openai"));
    }
}
