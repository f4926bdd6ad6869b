//! Symbol catalog, rarity palette, and reel view model

use serde::{Deserialize, Serialize};

/// Symbol classification in the collectible catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Another player's profile card
    User,
    /// Collectible character card
    Character,
    /// Claim-point prize symbol
    Claim,
}

/// One entry of the local symbol catalog shown on the reels
///
/// Immutable for the lifetime of a session. Identity is the `(id, kind)`
/// pair — ids are only unique within a kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolCard {
    /// Server-side id within `kind`
    pub id: u64,
    /// Symbol classification
    pub kind: SymbolKind,
    /// Display name
    pub name: String,
    /// Icon reference (URL or asset key)
    pub icon: String,
}

impl SymbolCard {
    /// Create a catalog entry
    pub fn new(id: u64, kind: SymbolKind, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            icon: icon.into(),
        }
    }

    /// Session-stable identity key
    pub fn key(&self) -> (u64, SymbolKind) {
        (self.id, self.kind)
    }
}

/// Resolve a server-returned symbol reference against the local catalog.
///
/// An identifier the catalog doesn't know degrades to index 0 with a
/// warning — a reel must still stop somewhere, so this is never fatal.
pub fn resolve_symbol_index(catalog: &[SymbolCard], id: u64, kind: SymbolKind) -> usize {
    match catalog.iter().position(|s| s.id == id && s.kind == kind) {
        Some(idx) => idx,
        None => {
            log::warn!(
                "server symbol ({id}, {kind:?}) not in local catalog of {} — falling back to index 0",
                catalog.len()
            );
            0
        }
    }
}

/// Prize rarity palette for the resolution wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Fixed wheel palette, in display order
    pub const PALETTE: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    /// Position of this rarity on the wheel
    pub fn palette_index(self) -> usize {
        Self::PALETTE
            .iter()
            .position(|r| *r == self)
            .unwrap_or(0)
    }
}

/// Reel animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReelState {
    /// Resting, showing a static symbol
    Idle,
    /// Scrolling; no authoritative symbol yet
    Spinning,
    /// Landed on its resolved symbol
    Stopped,
}

/// Render model for one reel column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelView {
    /// Reel position, 0 = leftmost
    pub index: usize,
    /// Animation state
    pub state: ReelState,
    /// Current scroll offset in pixels (negative = scrolled down)
    pub offset_px: f32,
    /// Duration the current animation should take
    pub duration_ms: u64,
}

impl ReelView {
    /// Idle reel at a given rest offset
    pub fn idle(index: usize, offset_px: f32) -> Self {
        Self {
            index,
            state: ReelState::Idle,
            offset_px,
            duration_ms: 0,
        }
    }
}

/// A resolved-but-not-yet-applied win outcome.
///
/// Created the moment the verify response arrives and consumed exactly once
/// when the final reel stops. At most one may be outstanding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWin {
    /// The winning symbol
    pub symbol: SymbolCard,
    /// Rarity to resolve on the wheel, if any
    pub rarity: Option<Rarity>,
    /// Whether this was a guaranteed-win megaspin
    pub megaspin: bool,
}

/// Per-reel outcome mapped back to local catalog positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResolution {
    /// Local catalog index each reel lands on
    pub reel_indices: Vec<usize>,
    /// Server-declared win flag
    pub is_win: bool,
    /// Rarity of the prize, when the win carries one
    pub rarity: Option<Rarity>,
}

/// Player addressing shared by every backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub user_id: u64,
    pub chat_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<SymbolCard> {
        vec![
            SymbolCard::new(7, SymbolKind::Character, "Mona", "mona.png"),
            SymbolCard::new(3, SymbolKind::User, "Riley", "riley.png"),
            SymbolCard::new(7, SymbolKind::Claim, "Claim", "claim.png"),
        ]
    }

    #[test]
    fn test_resolve_symbol_index_matches_on_id_and_kind() {
        let cat = catalog();
        assert_eq!(resolve_symbol_index(&cat, 7, SymbolKind::Character), 0);
        assert_eq!(resolve_symbol_index(&cat, 7, SymbolKind::Claim), 2);
        assert_eq!(resolve_symbol_index(&cat, 3, SymbolKind::User), 1);
    }

    #[test]
    fn test_resolve_symbol_index_unknown_falls_back_to_zero() {
        let cat = catalog();
        assert_eq!(resolve_symbol_index(&cat, 999, SymbolKind::Character), 0);
    }

    #[test]
    fn test_rarity_palette_round_trip() {
        for rarity in Rarity::PALETTE {
            assert_eq!(Rarity::PALETTE[rarity.palette_index()], rarity);
        }
    }
}
