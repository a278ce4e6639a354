//! Turn routing
//!
//! Resolves which agent answers a message. A leading `@key` mention
//! switches the session to that agent for this and following turns; an
//! unknown mention falls through to the current agent with the message
//! untouched. Pure function over its inputs and the read-only registry.

use crate::agent::registry::AgentRegistry;

/// The marker character that introduces an agent mention
pub const MENTION_MARKER: char = '@';

/// Resolve the target agent for a raw message.
///
/// Returns the target agent key and the message text to forward. When a
/// known mention is present the mention token and the whitespace after it
/// are stripped (the remainder may be empty); otherwise the message passes
/// through unchanged and the current agent (or the registry default, for a
/// session with no current agent) answers.
pub fn route<'a>(
    raw_message: &'a str,
    active_agent: Option<&str>,
    registry: &AgentRegistry,
) -> (String, &'a str) {
    let fallback = || {
        let key = active_agent.unwrap_or_else(|| registry.default_key());
        (key.to_lowercase(), raw_message)
    };

    let Some(rest) = raw_message.strip_prefix(MENTION_MARKER) else {
        return fallback();
    };

    // The token runs to the first whitespace; "@ name" has an empty token
    // and is not a mention
    let token: &str = rest
        .split(char::is_whitespace)
        .next()
        .unwrap_or_default();

    if token.is_empty() || !registry.contains(token) {
        // Unknown or malformed mention: not an error, the message passes
        // through to the current agent as-is
        return fallback();
    }

    let stripped = rest[token.len()..].trim();
    (token.to_lowercase(), stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::roster::builtin_registry;

    #[test]
    fn test_known_mention_switches_and_strips() {
        let registry = builtin_registry();
        let (key, text) = route(
            "@ideation tell me about space startups",
            Some("manager"),
            &registry,
        );
        assert_eq!(key, "ideation");
        assert_eq!(text, "tell me about space startups");
    }

    #[test]
    fn test_mention_is_case_insensitive() {
        let registry = builtin_registry();
        let (key, text) = route("@IDEATION hello", Some("manager"), &registry);
        assert_eq!(key, "ideation");
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_no_marker_keeps_current_agent() {
        let registry = builtin_registry();
        let (key, text) = route("just a question", Some("cto"), &registry);
        assert_eq!(key, "cto");
        assert_eq!(text, "just a question");
    }

    #[test]
    fn test_no_marker_no_session_agent_uses_default() {
        let registry = builtin_registry();
        let (key, text) = route("hello there", None, &registry);
        assert_eq!(key, "manager");
        assert_eq!(text, "hello there");
    }

    #[test]
    fn test_unknown_mention_falls_through_unmodified() {
        let registry = builtin_registry();
        let (key, text) = route("@unknownagent hello", Some("manager"), &registry);
        assert_eq!(key, "manager");
        assert_eq!(text, "@unknownagent hello");
    }

    #[test]
    fn test_bare_mention_forwards_empty_text() {
        let registry = builtin_registry();
        let (key, text) = route("@ideation", Some("manager"), &registry);
        assert_eq!(key, "ideation");
        assert_eq!(text, "");
    }

    #[test]
    fn test_marker_followed_by_space_is_not_a_mention() {
        let registry = builtin_registry();
        let (key, text) = route("@ ideation hello", Some("manager"), &registry);
        assert_eq!(key, "manager");
        assert_eq!(text, "@ ideation hello");
    }

    #[test]
    fn test_mention_with_extra_whitespace_trims_remainder() {
        let registry = builtin_registry();
        let (key, text) = route("@cto   which stack?  ", Some("manager"), &registry);
        assert_eq!(key, "cto");
        assert_eq!(text, "which stack?");
    }
}
