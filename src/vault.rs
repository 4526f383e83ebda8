//! Reward vault: clip naming and unlock listing
//!
//! Completing a level unlocks three placeholder reward clips. This module
//! owns the level-id and asset-path formats and builds the tile lists the
//! vault and reward views render from.

use crate::consts::CLIPS_PER_LEVEL;
use crate::ledger::{GameId, Ledger};
use crate::levels::LevelCatalog;

/// Inline message shown when a clip's media file is absent (non-fatal)
pub const CLIP_MISSING_MESSAGE: &str =
    "Video file missing. Drop an mp4 at the path shown in README.";

/// Level id for a zero-based level index: `L01`, `L02`, ...
pub fn level_id(index: usize) -> String {
    format!("L{:02}", index + 1)
}

/// Asset path for one reward clip
pub fn clip_path(game: GameId, level_index: usize, clip: u32) -> String {
    format!(
        "assets/videos/{}_{}_{}.mp4",
        game.as_str(),
        level_id(level_index),
        clip
    )
}

/// One unlocked reward clip, ready for the reward modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardClip {
    pub label: String,
    pub path: String,
}

/// The three reward clips for a game/level pair
pub fn reward_clips(game: GameId, level_index: usize) -> Vec<RewardClip> {
    (1..=CLIPS_PER_LEVEL)
        .map(|clip| RewardClip {
            label: format!("{} {} - Clip {}", game.as_str(), level_id(level_index), clip),
            path: clip_path(game, level_index, clip),
        })
        .collect()
}

/// One tile in the vault gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultTile {
    pub game: GameId,
    pub level_index: usize,
    pub clip: u32,
    pub unlocked: bool,
    pub label: String,
    /// Present only when unlocked
    pub path: Option<String>,
}

/// Every vault tile across all games and levels, in display order
pub fn tiles(catalog: &LevelCatalog, ledger: &Ledger) -> Vec<VaultTile> {
    let mut tiles = Vec::new();
    for game in GameId::ALL {
        for index in 0..catalog.level_count(game) {
            let id = level_id(index);
            let unlocked = ledger.is_unlocked(game, &id);
            for clip in 1..=CLIPS_PER_LEVEL {
                let label = if unlocked {
                    format!("{} {} - Clip {}", game.as_str(), id, clip)
                } else {
                    format!("Beat {id} to unlock")
                };
                tiles.push(VaultTile {
                    game,
                    level_index: index,
                    clip,
                    unlocked,
                    label,
                    path: unlocked.then(|| clip_path(game, index, clip)),
                });
            }
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Stats;
    use crate::levels::test_docs;

    #[test]
    fn test_level_id_format() {
        assert_eq!(level_id(0), "L01");
        assert_eq!(level_id(9), "L10");
    }

    #[test]
    fn test_clip_path_format() {
        assert_eq!(
            clip_path(GameId::Blocks, 0, 1),
            "assets/videos/A_L01_1.mp4"
        );
        assert_eq!(
            clip_path(GameId::Sequence, 11, 3),
            "assets/videos/D_L12_3.mp4"
        );
    }

    #[test]
    fn test_reward_clips() {
        let clips = reward_clips(GameId::Escape, 0);
        assert_eq!(clips.len(), CLIPS_PER_LEVEL as usize);
        assert_eq!(clips[0].label, "B L01 - Clip 1");
        assert_eq!(clips[2].path, "assets/videos/B_L01_3.mp4");
    }

    #[test]
    fn test_tiles_track_unlock_state() {
        let catalog = test_docs::catalog();
        let mut ledger = Ledger::default();
        ledger.mark_completed(GameId::Blocks, "L01", Stats::moves(3));
        ledger.unlock_clips(GameId::Blocks, "L01", CLIPS_PER_LEVEL);

        let tiles = tiles(&catalog, &ledger);
        // 4 games x 1 level x 3 clips
        assert_eq!(tiles.len(), 12);

        let blocks: Vec<_> = tiles.iter().filter(|t| t.game == GameId::Blocks).collect();
        assert!(blocks.iter().all(|t| t.unlocked && t.path.is_some()));

        let escape: Vec<_> = tiles.iter().filter(|t| t.game == GameId::Escape).collect();
        assert!(escape.iter().all(|t| !t.unlocked && t.path.is_none()));
        assert_eq!(escape[0].label, "Beat L01 to unlock");
    }
}
