use crate::types::{Role, MAX_PLAYERS, MIN_PLAYERS};
use rand::seq::SliceRandom;
use rand::Rng;

/// Role split for one table size. There is always exactly one Hitler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDistribution {
    pub liberals: usize,
    pub fascists: usize,
}

pub fn role_distribution(player_count: usize) -> Option<RoleDistribution> {
    let (liberals, fascists) = match player_count {
        5 => (3, 1),
        6 => (4, 1),
        7 => (4, 2),
        8 => (5, 2),
        9 => (5, 3),
        10 => (6, 3),
        _ => return None,
    };
    debug_assert!((MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count));
    Some(RoleDistribution { liberals, fascists })
}

/// Shuffled role per seat for the given player count
pub fn assign_roles<R: Rng + ?Sized>(player_count: usize, rng: &mut R) -> Option<Vec<Role>> {
    let dist = role_distribution(player_count)?;

    let mut roles = Vec::with_capacity(player_count);
    roles.extend(vec![Role::Liberal; dist.liberals]);
    roles.extend(vec![Role::Fascist; dist.fascists]);
    roles.push(Role::Hitler);
    roles.shuffle(rng);

    Some(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_distribution_for_every_supported_count() {
        for count in MIN_PLAYERS..=MAX_PLAYERS {
            let mut rng = StdRng::seed_from_u64(count as u64);
            let roles = assign_roles(count, &mut rng).unwrap();
            let dist = role_distribution(count).unwrap();

            assert_eq!(roles.len(), count);
            assert_eq!(roles.iter().filter(|r| **r == Role::Hitler).count(), 1);
            assert_eq!(
                roles.iter().filter(|r| **r == Role::Liberal).count(),
                dist.liberals
            );
            assert_eq!(
                roles.iter().filter(|r| **r == Role::Fascist).count(),
                dist.fascists
            );
            // Liberals always hold a strict majority of seats
            assert!(dist.liberals > count / 2);
        }
    }

    #[test]
    fn test_unsupported_counts_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(assign_roles(4, &mut rng).is_none());
        assert!(assign_roles(11, &mut rng).is_none());
        assert!(role_distribution(0).is_none());
    }

    #[test]
    fn test_hitler_seat_is_uniform() {
        const TRIALS: usize = 10_000;
        let count = 5;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut hitler_seats = [0usize; 5];

        for _ in 0..TRIALS {
            let roles = assign_roles(count, &mut rng).unwrap();
            let seat = roles.iter().position(|r| *r == Role::Hitler).unwrap();
            hitler_seats[seat] += 1;
        }

        // Expected 2000 per seat; allow a generous band
        for hits in hitler_seats {
            assert!((1700..=2300).contains(&hits), "skewed seat count {hits}");
        }
    }
}
