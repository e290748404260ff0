//! Policy deck with discard-and-reshuffle semantics
//!
//! The draw pile is stored bottom-first: the last element is the top card.

use crate::types::Policy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const LIBERAL_POLICY_COUNT: usize = 6;
pub const FASCIST_POLICY_COUNT: usize = 11;
pub const TOTAL_POLICY_COUNT: usize = LIBERAL_POLICY_COUNT + FASCIST_POLICY_COUNT;

#[derive(Debug, Clone)]
pub struct PolicyDeck {
    draw_pile: Vec<Policy>,
    discard_pile: Vec<Policy>,
    rng: StdRng,
}

impl PolicyDeck {
    /// Full 17-card deck in a fresh random order
    pub fn new(mut rng: StdRng) -> Self {
        let mut draw_pile = vec![Policy::Liberal; LIBERAL_POLICY_COUNT];
        draw_pile.extend(vec![Policy::Fascist; FASCIST_POLICY_COUNT]);
        draw_pile.shuffle(&mut rng);

        Self {
            draw_pile,
            discard_pile: Vec::new(),
            rng,
        }
    }

    /// Deck with a fixed order, top card first. Used to pin draws in tests.
    pub fn stacked(top_first: &[Policy], discard: &[Policy], rng: StdRng) -> Self {
        Self {
            draw_pile: top_first.iter().rev().copied().collect(),
            discard_pile: discard.to_vec(),
            rng,
        }
    }

    pub fn draw_len(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn discard_len(&self) -> usize {
        self.discard_pile.len()
    }

    /// Draw `n` cards, reshuffling the discard pile back in as often as needed.
    /// Returns fewer than `n` only when both piles are empty.
    pub fn draw(&mut self, n: usize) -> Vec<Policy> {
        let mut drawn = Vec::with_capacity(n);
        while drawn.len() < n {
            if self.draw_pile.is_empty() {
                if self.discard_pile.is_empty() {
                    tracing::warn!("Policy deck exhausted after {} of {} cards", drawn.len(), n);
                    break;
                }
                self.reshuffle();
            }
            if let Some(card) = self.draw_pile.pop() {
                drawn.push(card);
            }
        }
        drawn
    }

    /// Look at the top `n` cards without removing them, reshuffling first if
    /// fewer than `n` remain.
    pub fn peek(&mut self, n: usize) -> Vec<Policy> {
        if self.draw_pile.len() < n {
            self.reshuffle();
        }
        self.draw_pile.iter().rev().take(n).copied().collect()
    }

    pub fn discard(&mut self, policy: Policy) {
        self.discard_pile.push(policy);
    }

    /// Shuffle the discard pile and slide it beneath the remaining draw pile
    fn reshuffle(&mut self) {
        let mut pile = std::mem::take(&mut self.discard_pile);
        pile.shuffle(&mut self.rng);
        tracing::debug!(
            "Reshuffling {} discarded policies under {} remaining",
            pile.len(),
            self.draw_pile.len()
        );
        pile.append(&mut self.draw_pile);
        self.draw_pile = pile;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn count(cards: &[Policy], kind: Policy) -> usize {
        cards.iter().filter(|c| **c == kind).count()
    }

    #[test]
    fn test_new_deck_has_standard_split() {
        let mut deck = PolicyDeck::new(rng());
        assert_eq!(deck.draw_len(), TOTAL_POLICY_COUNT);

        let all = deck.draw(TOTAL_POLICY_COUNT);
        assert_eq!(count(&all, Policy::Liberal), LIBERAL_POLICY_COUNT);
        assert_eq!(count(&all, Policy::Fascist), FASCIST_POLICY_COUNT);
    }

    #[test]
    fn test_seeded_decks_are_reproducible() {
        let mut a = PolicyDeck::new(StdRng::seed_from_u64(99));
        let mut b = PolicyDeck::new(StdRng::seed_from_u64(99));
        assert_eq!(a.draw(17), b.draw(17));
    }

    #[test]
    fn test_stacked_deck_draws_top_first() {
        let mut deck = PolicyDeck::stacked(
            &[Policy::Fascist, Policy::Liberal, Policy::Liberal],
            &[],
            rng(),
        );
        assert_eq!(deck.draw(1), vec![Policy::Fascist]);
        assert_eq!(deck.draw(2), vec![Policy::Liberal, Policy::Liberal]);
    }

    #[test]
    fn test_draw_reshuffles_mid_draw() {
        let mut deck = PolicyDeck::stacked(
            &[Policy::Liberal],
            &[Policy::Fascist, Policy::Fascist],
            rng(),
        );

        let drawn = deck.draw(3);
        assert_eq!(drawn[0], Policy::Liberal);
        assert_eq!(count(&drawn, Policy::Fascist), 2);
        assert_eq!(deck.draw_len(), 0);
        assert_eq!(deck.discard_len(), 0);
    }

    #[test]
    fn test_draw_reshuffles_repeatedly_for_large_requests() {
        let mut deck = PolicyDeck::new(rng());
        let first = deck.draw(10);
        for card in first {
            deck.discard(card);
        }
        // 7 left in the pile, 10 in discard: the request spans a reshuffle
        let drawn = deck.draw(TOTAL_POLICY_COUNT);
        assert_eq!(drawn.len(), TOTAL_POLICY_COUNT);
        assert_eq!(count(&drawn, Policy::Liberal), LIBERAL_POLICY_COUNT);
    }

    #[test]
    fn test_draw_stops_when_both_piles_empty() {
        let mut deck = PolicyDeck::stacked(&[Policy::Liberal], &[], rng());
        assert_eq!(deck.draw(3), vec![Policy::Liberal]);
    }

    #[test]
    fn test_peek_does_not_remove_cards() {
        let mut deck = PolicyDeck::stacked(
            &[Policy::Fascist, Policy::Liberal, Policy::Fascist, Policy::Liberal],
            &[],
            rng(),
        );
        let seen = deck.peek(3);
        assert_eq!(
            seen,
            vec![Policy::Fascist, Policy::Liberal, Policy::Fascist]
        );
        assert_eq!(deck.draw_len(), 4);
        assert_eq!(deck.draw(3), seen);
    }

    #[test]
    fn test_peek_reshuffles_under_remaining_cards() {
        let mut deck = PolicyDeck::stacked(
            &[Policy::Liberal, Policy::Liberal],
            &[Policy::Fascist, Policy::Fascist, Policy::Fascist],
            rng(),
        );
        let seen = deck.peek(3);
        assert_eq!(seen, vec![Policy::Liberal, Policy::Liberal, Policy::Fascist]);
        assert_eq!(deck.draw_len(), 5);
        assert_eq!(deck.discard_len(), 0);
    }
}
