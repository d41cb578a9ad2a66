//! Platform/project fingerprint, per spec.md §3 and the glossary entry for
//! "Fingerprint".

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Detected project/platform context: language, project root, git branch,
/// runtime versions (spec.md glossary).
#[derive(Debug, Clone, Default)]
pub struct Fingerprint {
    pub platform: String,
    pub project_root: Option<String>,
    pub language: Option<String>,
    pub git_branch: Option<String>,
    pub runtime_versions: HashMap<String, String>,
}

impl Fingerprint {
    pub fn detect(working_dir: Option<&str>) -> Self {
        let platform = std::env::consts::OS.to_string();
        let project_root = working_dir.map(|d| d.to_string());
        let git_branch = project_root.as_deref().and_then(detect_git_branch);
        let language = project_root.as_deref().and_then(detect_language);

        Self {
            platform,
            project_root,
            language,
            git_branch,
            runtime_versions: HashMap::new(),
        }
    }
}

fn detect_git_branch(dir: &str) -> Option<String> {
    let head = std::path::Path::new(dir).join(".git").join("HEAD");
    let contents = std::fs::read_to_string(head).ok()?;
    contents
        .trim()
        .strip_prefix("ref: refs/heads/")
        .map(|s| s.to_string())
}

fn detect_language(dir: &str) -> Option<String> {
    let root = std::path::Path::new(dir);
    if root.join("Cargo.toml").exists() {
        Some("rust".to_string())
    } else if root.join("package.json").exists() {
        Some("javascript".to_string())
    } else if root.join("go.mod").exists() {
        Some("go".to_string())
    } else if root.join("pyproject.toml").exists() || root.join("requirements.txt").exists() {
        Some("python".to_string())
    } else {
        None
    }
}

/// Resolves spec.md §9's open question about `GetProjectContext()`: rather
/// than returning a stub `nil`, the orchestrator keeps a small per-session
/// cache so repeated requests against the same working directory don't
/// re-walk the filesystem every time.
#[derive(Default)]
pub struct ProjectContextCache {
    inner: RwLock<HashMap<String, (Fingerprint, Instant)>>,
    ttl: Duration,
}

impl ProjectContextCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Return a cached fingerprint for `working_dir` if still fresh,
    /// otherwise detect and cache a new one.
    pub fn get_or_detect(&self, working_dir: &str) -> Fingerprint {
        if let Some((fp, at)) = self.inner.read().unwrap().get(working_dir) {
            if at.elapsed() < self.ttl {
                return fp.clone();
            }
        }
        let fp = Fingerprint::detect(Some(working_dir));
        self.inner
            .write()
            .unwrap()
            .insert(working_dir.to_string(), (fp.clone(), Instant::now()));
        fp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_fingerprint_across_calls() {
        let cache = ProjectContextCache::new(Duration::from_secs(60));
        let dir = std::env::temp_dir();
        let dir = dir.to_str().unwrap();
        let first = cache.get_or_detect(dir);
        let second = cache.get_or_detect(dir);
        assert_eq!(first.platform, second.platform);
    }
}
