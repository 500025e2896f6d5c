//! Board construction
//!
//! Reveals the block grid one cell at a time, row-major, each block fading in
//! after the previous one by a fixed stagger. The grid grows with the level.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::effects::{Effects, Sfx};
use super::machine::MatchEvent;
use super::sequencer::{Sequencer, SettleRule};
use super::state::{Arena, Block, BlockKind};
use super::tween::{Easing, Sprite, Tween};
use crate::consts::*;

/// Board layout and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub blocks_per_row: u32,
    pub block_width: f32,
    pub block_height: f32,
    /// Left edge of the grid; `None` centres it horizontally
    pub start_x: Option<f32>,
    pub start_y: f32,
    pub stagger_ms: f32,
    pub start_delay_ms: f32,
    pub fade_in_ms: f32,
    pub settle: SettleRule,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            blocks_per_row: BLOCKS_PER_ROW,
            block_width: BLOCK_WIDTH,
            block_height: BLOCK_HEIGHT,
            start_x: None,
            start_y: BOARD_START_Y,
            stagger_ms: BLOCK_STAGGER_MS,
            start_delay_ms: SEQUENCE_START_DELAY_MS,
            fade_in_ms: BLOCK_FADE_MS,
            settle: SettleRule::Counted,
        }
    }
}

/// Rows on the board for a level
pub fn rows_for_level(level: u32) -> u32 {
    (BASE_ROWS + level).min(MAX_ROWS)
}

/// Total blocks on the board for a level
pub fn block_count(level: u32, blocks_per_row: u32) -> u32 {
    rows_for_level(level) * blocks_per_row
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardBuilder {
    config: BoardConfig,
    sequencer: Sequencer,
    on_complete: Option<MatchEvent>,
    complete: bool,
    /// Blocks revealed this cycle, in reveal order
    placed: Vec<u32>,
}

impl BoardBuilder {
    pub fn new(config: BoardConfig) -> Self {
        let sequencer = Sequencer::new(config.stagger_ms, config.start_delay_ms, config.settle);
        Self {
            config,
            sequencer,
            on_complete: None,
            complete: false,
            placed: Vec::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Clear the board and start revealing the grid for `level`
    ///
    /// `on_complete` is returned from [`update`](Self::update) once every
    /// block has faded in.
    pub fn start_building(&mut self, level: u32, arena: &mut Arena, on_complete: MatchEvent) {
        self.destroy_blocks(arena);
        self.complete = false;
        self.on_complete = Some(on_complete);

        let total = block_count(level, self.config.blocks_per_row);
        self.sequencer.start(total);
        log::info!(
            "Building level {} board: {} rows, {} blocks",
            level,
            rows_for_level(level),
            total
        );
    }

    /// Advance one frame; returns the completion event exactly once
    pub fn update(
        &mut self,
        dt_ms: f32,
        arena: &mut Arena,
        effects: &mut Effects,
    ) -> Option<MatchEvent> {
        debug_assert!(
            self.sequencer.is_running(),
            "board builder ticked before start_building"
        );
        if !self.sequencer.is_running() || self.complete {
            return None;
        }

        for _ in 0..arena.tick_block_fades(dt_ms) {
            self.sequencer.item_finished();
        }

        if let Some(index) = self.sequencer.advance(dt_ms) {
            self.place_block(index, arena, effects);
        }

        if self.sequencer.is_settled() {
            self.complete = true;
            return self.on_complete.take();
        }
        None
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Block ids revealed so far this cycle
    pub fn blocks(&self) -> &[u32] {
        &self.placed
    }

    /// Stop building and remove every block
    pub fn reset(&mut self, arena: &mut Arena) {
        self.destroy_blocks(arena);
        self.sequencer.reset();
        self.on_complete = None;
        self.complete = false;
    }

    /// Remove every block from the board and the shared collection
    pub fn destroy_blocks(&mut self, arena: &mut Arena) {
        arena.clear_blocks();
        self.placed.clear();
    }

    /// Pixel centre of grid cell `index`
    pub fn cell_center(&self, index: u32, field_width: f32) -> Vec2 {
        let cfg = &self.config;
        let row = index / cfg.blocks_per_row;
        let col = index % cfg.blocks_per_row;
        let start_x = cfg
            .start_x
            .unwrap_or((field_width - cfg.blocks_per_row as f32 * cfg.block_width) / 2.0);
        Vec2::new(
            start_x + col as f32 * cfg.block_width + cfg.block_width / 2.0,
            cfg.start_y + row as f32 * cfg.block_height + cfg.block_height / 2.0,
        )
    }

    fn place_block(&mut self, index: u32, arena: &mut Arena, effects: &mut Effects) {
        let row = index / self.config.blocks_per_row;
        let col = index % self.config.blocks_per_row;
        let center = self.cell_center(index, arena.width);
        let size = Vec2::new(self.config.block_width, self.config.block_height);

        let hidden = Sprite::new(center).with_alpha(0.0);
        let id = arena.next_entity_id();
        arena.blocks.push(Block {
            id,
            row,
            col,
            kind: BlockKind::for_row(row),
            rect: Rect::new(center, size),
            sprite: hidden,
            fade: Some(Tween::new(
                hidden,
                Sprite::new(center),
                self.config.fade_in_ms,
                Easing::Power2,
            )),
            immovable: true,
        });
        self.placed.push(id);
        effects.sfx(Sfx::BlockPlaced);
    }
}
