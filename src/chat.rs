//! Room chat: sanitizing, addressing and a bounded log

use crate::game::Game;
use crate::types::{ChatEntry, ChatTarget, ChatVisibility, PlayerId};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

pub const MAX_CHAT_CHARS: usize = 500;
pub const CHAT_LOG_LIMIT: usize = 200;

fn html_tag() -> &'static Regex {
    static HTML_TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
    &HTML_TAG
}

fn angle_bracket() -> &'static Regex {
    static ANGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[<>]").expect("static regex"));
    &ANGLE
}

/// Strip markup, trim and cap the length. `None` when nothing is left.
pub fn sanitize_message(text: &str) -> Option<String> {
    let stripped = html_tag().replace_all(text, "");
    let stripped = angle_bracket().replace_all(&stripped, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_CHAT_CHARS).collect())
}

pub fn visibility(to: &ChatTarget) -> ChatVisibility {
    match to {
        ChatTarget::Global => ChatVisibility::Global,
        ChatTarget::PresidentOnly | ChatTarget::ChancellorOnly => ChatVisibility::Limited,
        ChatTarget::Players(_) => ChatVisibility::Private,
    }
}

/// Who receives a chat line, sender included. `None` when the target needs
/// a running government and there is no game.
pub fn recipients(
    roster: &[PlayerId],
    game: Option<&Game>,
    from_id: &PlayerId,
    to: &ChatTarget,
) -> Option<Vec<PlayerId>> {
    let mut ids: Vec<PlayerId> = match to {
        ChatTarget::Global => return Some(roster.to_vec()),
        ChatTarget::PresidentOnly => vec![game?.president_id().clone()],
        ChatTarget::ChancellorOnly => game?.chancellor().map(|c| c.id.clone()).into_iter().collect(),
        ChatTarget::Players(targets) => roster
            .iter()
            .filter(|id| targets.contains(id))
            .cloned()
            .collect(),
    };
    if !ids.contains(from_id) {
        ids.push(from_id.clone());
    }
    Some(ids)
}

/// Most recent chat lines of a room
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    entries: VecDeque<ChatEntry>,
}

impl ChatLog {
    pub fn push(&mut self, entry: ChatEntry) {
        if self.entries.len() == CHAT_LOG_LIMIT {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter()
    }

    /// Lines a returning player could have seen. Government-addressed lines
    /// are only replayed to their sender since the office may have moved.
    pub fn visible_to<'a>(&'a self, player_id: &'a str) -> impl Iterator<Item = &'a ChatEntry> + 'a {
        self.entries.iter().filter(move |entry| {
            entry.from_id == player_id
                || match &entry.to {
                    ChatTarget::Global => true,
                    ChatTarget::Players(ids) => ids.iter().any(|id| id == player_id),
                    ChatTarget::PresidentOnly | ChatTarget::ChancellorOnly => false,
                }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<PlayerId> {
        (0..5).map(|i| format!("p{i}")).collect()
    }

    #[test]
    fn test_sanitize_strips_markup() {
        assert_eq!(
            sanitize_message("<b>hello</b> there"),
            Some("hello there".to_string())
        );
        assert_eq!(
            sanitize_message("  a > b < c  "),
            Some("a  b  c".to_string())
        );
        assert_eq!(
            sanitize_message("<script>alert(1)</script>"),
            Some("alert(1)".to_string())
        );
    }

    #[test]
    fn test_sanitize_drops_empty_and_truncates() {
        assert_eq!(sanitize_message("   "), None);
        assert_eq!(sanitize_message("<img src=x>"), None);

        let long = "ä".repeat(MAX_CHAT_CHARS + 20);
        let clean = sanitize_message(&long).unwrap();
        assert_eq!(clean.chars().count(), MAX_CHAT_CHARS);
    }

    #[test]
    fn test_visibility_by_target() {
        assert_eq!(visibility(&ChatTarget::Global), ChatVisibility::Global);
        assert_eq!(
            visibility(&ChatTarget::ChancellorOnly),
            ChatVisibility::Limited
        );
        assert_eq!(
            visibility(&ChatTarget::Players(vec![])),
            ChatVisibility::Private
        );
    }

    #[test]
    fn test_private_recipients_include_sender_and_skip_strangers() {
        let to = ChatTarget::Players(vec!["p2".to_string(), "ghost".to_string()]);
        let ids = recipients(&roster(), None, &"p0".to_string(), &to).unwrap();
        assert_eq!(ids, vec!["p2", "p0"]);
    }

    #[test]
    fn test_government_targets_need_a_game() {
        let from = "p1".to_string();
        assert!(recipients(&roster(), None, &from, &ChatTarget::PresidentOnly).is_none());

        let seats = roster().into_iter().map(|id| (id.clone(), id)).collect();
        let mut game = Game::with_seed(seats, 5).unwrap();
        game.president_index = 3;
        let ids = recipients(&roster(), Some(&game), &from, &ChatTarget::PresidentOnly).unwrap();
        assert_eq!(ids, vec!["p3", "p1"]);

        // No chancellor seated yet: only the sender hears it
        let ids = recipients(&roster(), Some(&game), &from, &ChatTarget::ChancellorOnly).unwrap();
        assert_eq!(ids, vec!["p1"]);
    }

    #[test]
    fn test_chat_log_is_bounded() {
        let mut log = ChatLog::default();
        for i in 0..CHAT_LOG_LIMIT + 5 {
            log.push(ChatEntry {
                from_id: "p0".to_string(),
                from: "P0".to_string(),
                text: format!("line {i}"),
                to: ChatTarget::Global,
                visibility: ChatVisibility::Global,
                ts: String::new(),
            });
        }
        assert_eq!(log.len(), CHAT_LOG_LIMIT);
        assert_eq!(log.iter().next().map(|e| e.text.as_str()), Some("line 5"));
    }

    #[test]
    fn test_replay_respects_audience() {
        let entry = |from: &str, to: ChatTarget| ChatEntry {
            from_id: from.to_string(),
            from: from.to_uppercase(),
            text: "x".to_string(),
            visibility: visibility(&to),
            to,
            ts: String::new(),
        };
        let mut log = ChatLog::default();
        log.push(entry("p0", ChatTarget::Global));
        log.push(entry("p1", ChatTarget::Players(vec!["p2".to_string()])));
        log.push(entry("p3", ChatTarget::PresidentOnly));
        log.push(entry("p2", ChatTarget::ChancellorOnly));

        let seen: Vec<&str> = log.visible_to("p2").map(|e| e.from_id.as_str()).collect();
        assert_eq!(seen, vec!["p0", "p1", "p2"]);
        assert_eq!(log.visible_to("p4").count(), 1);
    }
}
