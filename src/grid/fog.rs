//! Fog of war for the player side
//!
//! Visible tiles are recomputed from scratch on every update; the ever-seen
//! set only grows. With fog disabled everything is visible.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{GridPos, MoveType};
use crate::grid::constants::vision_range_for;
use crate::grid::ranges::vision_range;

/// How a tile is drawn under fog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibilityState {
    /// Never seen: fully dark
    Unknown,
    /// Seen before but not now: dimmed
    Remembered,
    /// In sight now
    Observed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FogOfWar {
    enabled: bool,
    cols: i32,
    rows: i32,
    /// Currently visible tiles
    visible: AHashSet<GridPos>,
    /// Every tile revealed so far
    ever_seen: AHashSet<GridPos>,
}

impl FogOfWar {
    pub fn new(cols: i32, rows: i32, enabled: bool) -> Self {
        Self {
            enabled,
            cols,
            rows,
            visible: AHashSet::new(),
            ever_seen: AHashSet::new(),
        }
    }

    pub fn disabled(cols: i32, rows: i32) -> Self {
        Self::new(cols, rows, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Replace the visible set with the union of every viewer's vision
    ///
    /// Each viewer sees by its movement class. No-op when fog is disabled.
    pub fn update<I>(&mut self, viewers: I)
    where
        I: IntoIterator<Item = (GridPos, MoveType)>,
    {
        if !self.enabled {
            return;
        }

        let mut visible = AHashSet::new();
        for (pos, move_type) in viewers {
            visible.extend(vision_range(self.cols, self.rows, pos, vision_range_for(move_type)));
        }
        self.ever_seen.extend(visible.iter().copied());
        self.visible = visible;
    }

    pub fn is_visible(&self, pos: GridPos) -> bool {
        !self.enabled || self.visible.contains(&pos)
    }

    pub fn was_seen(&self, pos: GridPos) -> bool {
        !self.enabled || self.ever_seen.contains(&pos)
    }

    pub fn state(&self, pos: GridPos) -> VisibilityState {
        if self.is_visible(pos) {
            VisibilityState::Observed
        } else if self.was_seen(pos) {
            VisibilityState::Remembered
        } else {
            VisibilityState::Unknown
        }
    }

    /// Currently visible tiles, sorted; empty when fog is disabled
    pub fn visible_tiles(&self) -> Vec<GridPos> {
        let mut tiles: Vec<GridPos> = self.visible.iter().copied().collect();
        tiles.sort();
        tiles
    }

    pub fn ever_seen_count(&self) -> usize {
        self.ever_seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_fog_shows_everything() {
        let fog = FogOfWar::disabled(5, 5);
        assert!(fog.is_visible(GridPos::new(4, 4)));
        assert_eq!(fog.state(GridPos::new(0, 0)), VisibilityState::Observed);
    }

    #[test]
    fn test_enabled_fog_dark_before_update() {
        let fog = FogOfWar::new(5, 5, true);
        assert!(!fog.is_visible(GridPos::new(0, 0)));
        assert_eq!(fog.state(GridPos::new(2, 2)), VisibilityState::Unknown);
    }

    #[test]
    fn test_vision_radius_by_class() {
        let mut fog = FogOfWar::new(15, 15, true);
        let center = GridPos::new(7, 7);
        fog.update([(center, MoveType::Cavalry)]);
        assert!(fog.is_visible(GridPos::new(11, 7)));
        assert!(!fog.is_visible(GridPos::new(12, 7)));
        assert!(fog.is_visible(GridPos::new(9, 9)));
        assert!(!fog.is_visible(GridPos::new(10, 9)));
    }

    #[test]
    fn test_seen_tiles_are_remembered() {
        let mut fog = FogOfWar::new(12, 3, true);
        fog.update([(GridPos::new(0, 1), MoveType::Infantry)]);
        fog.update([(GridPos::new(11, 1), MoveType::Infantry)]);

        assert_eq!(fog.state(GridPos::new(0, 1)), VisibilityState::Remembered);
        assert_eq!(fog.state(GridPos::new(11, 1)), VisibilityState::Observed);
        assert_eq!(fog.state(GridPos::new(6, 1)), VisibilityState::Unknown);
    }

    #[test]
    fn test_update_unions_viewers() {
        let mut fog = FogOfWar::new(20, 1, true);
        fog.update([
            (GridPos::new(0, 0), MoveType::Infantry),
            (GridPos::new(19, 0), MoveType::Flying),
        ]);
        assert_eq!(fog.visible_tiles().len(), 4 + 6);
    }
}
