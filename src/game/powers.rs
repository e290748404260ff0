use crate::types::Power;

/// Presidential power granted by the `ordinal`-th fascist policy (1-based)
/// at a table of `player_count` seats.
pub fn power_for(player_count: usize, ordinal: u8) -> Option<Power> {
    use Power::*;

    match (player_count, ordinal) {
        (5..=6, 3) => Some(PolicyPeek),
        (7..=10, 3) => Some(SpecialElection),
        (5..=10, 4 | 5) => Some(Execution),
        (7..=8, 2) => Some(Investigate),
        (9..=10, 1 | 2) => Some(Investigate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_table_track() {
        for count in 5..=6 {
            assert_eq!(power_for(count, 1), None);
            assert_eq!(power_for(count, 2), None);
            assert_eq!(power_for(count, 3), Some(Power::PolicyPeek));
            assert_eq!(power_for(count, 4), Some(Power::Execution));
            assert_eq!(power_for(count, 5), Some(Power::Execution));
        }
    }

    #[test]
    fn test_medium_table_track() {
        for count in 7..=8 {
            assert_eq!(power_for(count, 1), None);
            assert_eq!(power_for(count, 2), Some(Power::Investigate));
            assert_eq!(power_for(count, 3), Some(Power::SpecialElection));
            assert_eq!(power_for(count, 4), Some(Power::Execution));
        }
    }

    #[test]
    fn test_large_table_track() {
        for count in 9..=10 {
            assert_eq!(power_for(count, 1), Some(Power::Investigate));
            assert_eq!(power_for(count, 2), Some(Power::Investigate));
            assert_eq!(power_for(count, 3), Some(Power::SpecialElection));
            assert_eq!(power_for(count, 5), Some(Power::Execution));
        }
    }

    #[test]
    fn test_sixth_policy_grants_nothing() {
        assert_eq!(power_for(7, 6), None);
        assert_eq!(power_for(4, 3), None);
    }
}
