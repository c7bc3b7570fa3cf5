use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_MAX_LEN: usize = 30;

static UNSAFE_RE: OnceLock<Regex> = OnceLock::new();

fn unsafe_re() -> &'static Regex {
    UNSAFE_RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").unwrap())
}

/// Derive a project / repository name from free-text idea.
///
/// Trim, lowercase, replace every character outside `[a-zA-Z0-9_-]` with
/// `-`, keep the first `max_len` characters, then trim `-` from both ends.
/// Total: pathological input yields an empty string.
pub fn project_name(idea: &str, max_len: usize) -> String {
    let lowered = idea.trim().to_lowercase();
    let replaced = unsafe_re().replace_all(&lowered, "-");
    let truncated: String = replaced.chars().take(max_len).collect();
    truncated.trim_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
