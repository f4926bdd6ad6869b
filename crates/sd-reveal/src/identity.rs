//! Stable card-slot identities
//!
//! A slot's token outlives any content change: the same token renders the
//! slot whether the card is face down, mid-animation, or revealed, which is
//! what lets the layout system treat a moving card as one element across
//! stacks. Only `location` and `card_id` ever mutate.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Which stack a card slot currently belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotLocation {
    /// Face down in the unrevealed stack
    Unrevealed,
    /// Face up in the revealed stack
    Revealed,
    /// In transit between stacks
    Animating,
}

/// One card slot with a session-stable identity token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardIdentity {
    /// Stable token; never recreated within a session
    pub token: u64,
    /// Position in the session layout
    pub slot_index: usize,
    pub location: SlotLocation,
    /// Bound card, once known
    pub card_id: Option<u64>,
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

fn fresh_token() -> u64 {
    NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}

/// Create `total` slots; the first `revealed_ids.len()` are revealed and
/// bound in order, the rest unrevealed with no card bound.
pub fn generate_identities(total: usize, revealed_ids: &[u64]) -> Vec<CardIdentity> {
    (0..total)
        .map(|slot_index| match revealed_ids.get(slot_index) {
            Some(&card_id) => CardIdentity {
                token: fresh_token(),
                slot_index,
                location: SlotLocation::Revealed,
                card_id: Some(card_id),
            },
            None => CardIdentity {
                token: fresh_token(),
                slot_index,
                location: SlotLocation::Unrevealed,
                card_id: None,
            },
        })
        .collect()
}

/// Bind `new_card_id` to the lowest-index unrevealed slot and transition it
/// to `Animating` (or directly `Revealed`). All other slots are untouched.
///
/// Returns the mutated slot index. Nothing happens when no unrevealed slot
/// remains, or when `animating` is requested while another slot is already
/// in transit (at most one may animate at a time).
pub fn update_on_reveal(
    identities: &mut [CardIdentity],
    new_card_id: u64,
    animating: bool,
) -> Option<usize> {
    if animating
        && identities
            .iter()
            .any(|c| c.location == SlotLocation::Animating)
    {
        log::warn!("reveal requested while another slot is animating — ignored");
        return None;
    }

    let slot = identities
        .iter_mut()
        .find(|c| c.location == SlotLocation::Unrevealed)?;

    slot.location = if animating {
        SlotLocation::Animating
    } else {
        SlotLocation::Revealed
    };
    slot.card_id = Some(new_card_id);
    Some(slot.slot_index)
}

/// Transition any animating slot to revealed. Returns how many moved (0/1).
pub fn complete_animation(identities: &mut [CardIdentity]) -> usize {
    let mut moved = 0;
    for slot in identities.iter_mut() {
        if slot.location == SlotLocation::Animating {
            slot.location = SlotLocation::Revealed;
            moved += 1;
        }
    }
    moved
}

/// Number of revealed slots
pub fn revealed_count(identities: &[CardIdentity]) -> usize {
    identities
        .iter()
        .filter(|c| c.location == SlotLocation::Revealed)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_binds_revealed_ids_in_order() {
        let ids = generate_identities(5, &[101, 102]);
        assert_eq!(ids.len(), 5);

        assert_eq!(ids[0].location, SlotLocation::Revealed);
        assert_eq!(ids[0].card_id, Some(101));
        assert_eq!(ids[1].location, SlotLocation::Revealed);
        assert_eq!(ids[1].card_id, Some(102));

        for slot in &ids[2..] {
            assert_eq!(slot.location, SlotLocation::Unrevealed);
            assert_eq!(slot.card_id, None);
        }
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_identities(4, &[]);
        let b = generate_identities(4, &[]);
        let mut tokens: Vec<u64> = a.iter().chain(b.iter()).map(|c| c.token).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_update_mutates_at_most_one_slot() {
        let mut ids = generate_identities(5, &[101, 102]);
        let before = ids.clone();

        let mutated = update_on_reveal(&mut ids, 200, true);
        assert_eq!(mutated, Some(2));

        let changed: Vec<usize> = ids
            .iter()
            .zip(&before)
            .filter(|(now, was)| now != was)
            .map(|(now, _)| now.slot_index)
            .collect();
        assert_eq!(changed, vec![2]);
        assert_eq!(ids[2].location, SlotLocation::Animating);
        assert_eq!(ids[2].card_id, Some(200));
    }

    #[test]
    fn test_second_animating_reveal_is_refused() {
        let mut ids = generate_identities(4, &[]);
        assert_eq!(update_on_reveal(&mut ids, 1, true), Some(0));
        assert_eq!(update_on_reveal(&mut ids, 2, true), None);
    }

    #[test]
    fn test_complete_animation_settles_the_moving_slot() {
        let mut ids = generate_identities(3, &[]);
        update_on_reveal(&mut ids, 7, true);
        assert_eq!(complete_animation(&mut ids), 1);
        assert_eq!(ids[0].location, SlotLocation::Revealed);
        assert_eq!(revealed_count(&ids), 1);

        // Idempotent once nothing is animating
        assert_eq!(complete_animation(&mut ids), 0);
    }

    #[test]
    fn test_direct_reveal_skips_animation() {
        let mut ids = generate_identities(3, &[]);
        assert_eq!(update_on_reveal(&mut ids, 9, false), Some(0));
        assert_eq!(ids[0].location, SlotLocation::Revealed);
    }

    #[test]
    fn test_tokens_survive_reveals() {
        let mut ids = generate_identities(3, &[]);
        let tokens: Vec<u64> = ids.iter().map(|c| c.token).collect();

        update_on_reveal(&mut ids, 1, true);
        complete_animation(&mut ids);
        update_on_reveal(&mut ids, 2, false);

        assert_eq!(tokens, ids.iter().map(|c| c.token).collect::<Vec<u64>>());
    }
}
