//! Pure classification functions over a request's raw input (spec.md §4.8).
//!
//! These are the only ambiguous policy in the core; every function here is
//! side-effect free and deterministic, and its output is part of the
//! testable contract (spec.md §8, invariant #10).

/// Fixed set of simple shell commands recognized by
/// [`is_simple_shell_command`] (spec.md §4.8).
const SIMPLE_COMMANDS: &[&str] = &[
    "ls", "cd", "pwd", "cat", "head", "tail", "mkdir", "rm", "cp", "mv", "echo", "date", "whoami", "hostname",
    "uname", "clear", "history", "git", "make", "grep", "find", "ping", "curl", "wget", "chmod", "chown", "touch",
    "diff", "wc", "sort", "uniq", "tar", "ps", "kill", "df", "du", "ssh", "scp", "which",
];

/// Phrases that, if present (case-insensitively), mark the input as a
/// personal question (spec.md §4.8).
const PERSONAL_QUESTION_PATTERNS: &[&str] = &[
    "who am i",
    "my name",
    "do you know me",
    "my wife",
    "my husband",
    "my son",
    "my daughter",
    "my kids",
    "my family",
    "when is my",
    "where do i live",
    "my birthday",
    "my job",
    "my boss",
    "about me",
    "remember me",
];

/// Public figures exempt from the `who is <Name>` personal-question rule
/// (spec.md §4.8).
const PUBLIC_FIGURES: &[&str] = &[
    "Einstein", "Newton", "Shakespeare", "Lincoln", "Gandhi", "Darwin", "Napoleon", "Socrates", "Plato", "Aristotle",
];

/// Factual question prefixes recognized by [`can_answer_directly`]
/// (spec.md §4.8).
const FACTUAL_PREFIXES: &[&str] = &[
    "what is", "what are", "explain", "how does", "how do", "why", "when was", "when did", "who was", "who is",
    "define", "what does",
];

/// Indicators that a factual-looking question is actually action/context
/// bound, and should not be answered directly (spec.md §4.8).
const ACTION_INDICATORS: &[&str] = &[
    "this file",
    "the folder",
    "this machine",
    "run this",
    "list all",
    "in this repo",
    "in this project",
    "this directory",
    "/",
    "~/",
    "./",
];

const GREETINGS: &[&str] = &["hi", "hello", "hey", "yo", "sup", "howdy", "greetings"];
const SIGN_OFFS: &[&str] = &["bye", "goodbye", "see you", "later", "night", "good night"];
const ACKNOWLEDGEMENTS: &[&str] = &["thanks", "thank you", "ok", "okay", "got it", "cool", "great", "nice", "sure"];
const SELF_IDENTITY: &[&str] = &["who are you", "what are you", "what can you do", "what's your name"];

/// Natural-language markers that disqualify an input from
/// [`looks_like_command`] (spec.md §4.8).
const NATURAL_LANGUAGE_MARKERS: &[&str] = &["please", "how to", "online", "?"];

/// Shell operators that qualify an input for [`looks_like_command`].
const SHELL_OPERATORS: &[char] = &['|', '>', '<', ';', '$'];

fn first_token(input: &str) -> Option<&str> {
    input.split_whitespace().next()
}

/// True iff `input`'s first token is a known simple shell command, or
/// starts with `./`, `/`, or `~` (spec.md §4.8).
///
/// Personal questions are excluded first so `"who am i?"` does not match
/// the `who` pattern via some future extension of `SIMPLE_COMMANDS`, and so
/// that the testable invariant `is_personal_question ⇒
/// ¬is_simple_shell_command` (spec.md §8, invariant #10) holds.
pub fn is_simple_shell_command(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return false;
    }
    if is_personal_question(trimmed) {
        return false;
    }
    let Some(token) = first_token(trimmed) else {
        return false;
    };
    let lower = token.to_lowercase();
    SIMPLE_COMMANDS.contains(&lower.as_str())
        || token.starts_with("./")
        || token.starts_with('/')
        || token.starts_with('~')
}

/// True iff `input` contains a personal-question pattern, with a special
/// rule for `who is <Name>` (spec.md §4.8).
pub fn is_personal_question(input: &str) -> bool {
    let lower = input.to_lowercase();
    if PERSONAL_QUESTION_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }
    is_who_is_personal_name(input)
}

/// `who is <Name>` is personal iff the name is short (1-2 words),
/// capitalized, and not a known public figure.
fn is_who_is_personal_name(input: &str) -> bool {
    let trimmed = input.trim();
    let lower_prefix_len = "who is ".len();
    if trimmed.len() <= lower_prefix_len || !trimmed[..lower_prefix_len].eq_ignore_ascii_case("who is ") {
        return false;
    }
    let rest = trimmed[lower_prefix_len..].trim_end_matches(['?', '.', '!']).trim();
    if rest.is_empty() {
        return false;
    }
    let words: Vec<&str> = rest.split_whitespace().collect();
    if words.is_empty() || words.len() > 2 {
        return false;
    }

    let capitalized = words
        .first()
        .map(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
        .unwrap_or(false);
    if !capitalized {
        return false;
    }

    let name = words.join(" ").to_lowercase();
    !PUBLIC_FIGURES.iter().any(|f| f.to_lowercase() == name)
}

/// True iff `input` starts with a factual prefix and does not contain an
/// action/specific-file indicator (spec.md §4.8).
pub fn can_answer_directly(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    let starts_factual = FACTUAL_PREFIXES.iter().any(|p| lower.starts_with(p));
    if !starts_factual {
        return false;
    }
    !ACTION_INDICATORS.iter().any(|a| lower.contains(a))
}

/// True for short greetings, sign-offs, thanks, acknowledgements, or
/// self-identity questions about the assistant (spec.md §4.8).
pub fn is_simple_conversation(input: &str) -> bool {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();
    let word_count = trimmed.split_whitespace().count();

    if SELF_IDENTITY.iter().any(|p| lower.contains(p)) {
        return true;
    }
    if word_count > 6 {
        return false;
    }
    GREETINGS.iter().any(|g| lower == *g || lower.starts_with(&format!("{g} ")))
        || SIGN_OFFS.iter().any(|s| lower.contains(s))
        || ACKNOWLEDGEMENTS.iter().any(|a| lower == *a || lower.starts_with(&format!("{a} ")))
}

/// Used by the tool stage to decide whether command-execution applies to
/// freeform text (spec.md §4.8).
pub fn looks_like_command(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lower = trimmed.to_lowercase();
    if NATURAL_LANGUAGE_MARKERS.iter().any(|m| lower.contains(m)) {
        return false;
    }

    if trimmed.contains("&&") || trimmed.contains("||") || SHELL_OPERATORS.iter().any(|op| trimmed.contains(*op)) {
        return true;
    }

    let Some(token) = first_token(trimmed) else {
        return false;
    };
    let lower_token = token.to_lowercase();
    SIMPLE_COMMANDS.contains(&lower_token.as_str())
        || token.starts_with("./")
        || token.starts_with('/')
        || token.starts_with('~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_commands_recognized() {
        assert!(is_simple_shell_command("ls -la"));
        assert!(is_simple_shell_command("  cd /tmp"));
        assert!(is_simple_shell_command("./run.sh"));
        assert!(is_simple_shell_command("/usr/bin/env"));
        assert!(is_simple_shell_command("~/bin/tool"));
        assert!(!is_simple_shell_command(""));
        assert!(!is_simple_shell_command("   "));
        assert!(!is_simple_shell_command("please help me understand recursion"));
    }

    #[test]
    fn personal_question_overrides_simple_command_for_who() {
        assert!(is_personal_question("who am I?"));
        assert!(!is_simple_shell_command("who am I?"));
    }

    #[test]
    fn personal_question_patterns() {
        assert!(is_personal_question("what's my name again?"));
        assert!(is_personal_question("do you know me"));
        assert!(!is_personal_question("what is the capital of France?"));
    }

    #[test]
    fn who_is_rule_distinguishes_public_figures() {
        assert!(is_personal_question("who is Bob"));
        assert!(!is_personal_question("who is Einstein"));
        assert!(!is_personal_question("who is the president of the united states and what do they do"));
    }

    #[test]
    fn can_answer_directly_rejects_action_indicators() {
        assert!(can_answer_directly("what is recursion?"));
        assert!(can_answer_directly("explain dependency injection"));
        assert!(!can_answer_directly("what is in this file?"));
        assert!(!can_answer_directly("run this and tell me what happens"));
    }

    #[test]
    fn simple_conversation_detection() {
        assert!(is_simple_conversation("hi"));
        assert!(is_simple_conversation("hey there"));
        assert!(is_simple_conversation("thanks a lot"));
        assert!(is_simple_conversation("who are you?"));
        assert!(!is_simple_conversation("explain how async executors schedule tasks in depth"));
    }

    #[test]
    fn looks_like_command_rejects_natural_language() {
        assert!(looks_like_command("ls -la"));
        assert!(looks_like_command("grep foo | wc -l"));
        assert!(!looks_like_command("how to install rust please"));
        assert!(!looks_like_command("is this available online?"));
    }

    #[test]
    fn invariant_personal_question_implies_not_simple_shell_command() {
        let inputs = ["who am I?", "what is my name", "ls -la", "who is Bob", "cd /tmp"];
        for input in inputs {
            if is_personal_question(input) {
                assert!(!is_simple_shell_command(input), "violated for {input:?}");
            }
        }
    }
}
