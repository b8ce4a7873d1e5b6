//! Player: lateral steering shared with the input thread, drawing, hit test.

use crate::audio::AudioCues;
use crate::rain::Drop;
use crate::render::{Rect, Renderer};
use crate::sprite::Sprite;
use anyhow::{Result, ensure};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};

/// Frames the winning/losing sprite stays up after a hit.
const REACTION_FRAMES: u32 = 10;

/// Sprite frame roles, in load order. At least these three must exist.
pub(crate) const MOVING: usize = 0;
pub(crate) const WINNING: usize = 1;
pub(crate) const LOSING: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Center,
    Left,
    Right,
}

impl Direction {
    fn as_u8(self) -> u8 {
        match self {
            Self::Center => 0,
            Self::Left => 1,
            Self::Right => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Left,
            2 => Self::Right,
            _ => Self::Center,
        }
    }
}

/// Hit box within the player sprite, as fractions of its size.
/// `flip_offset` shifts the box left when the sprite is drawn mirrored.
#[derive(Debug, Clone, Copy)]
pub struct HitSquare {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub flip_offset: f32,
}

impl Default for HitSquare {
    fn default() -> Self {
        Self {
            x: 0.4,
            y: 0.8,
            w: 0.3,
            h: 0.15,
            flip_offset: 0.1,
        }
    }
}

/// The player state the input thread is allowed to touch. Lateral position
/// and facing are atomics; see `app` for the full threading contract.
#[derive(Debug, Default)]
pub struct PlayerControl {
    x: AtomicI32,
    facing: AtomicU8, // Direction::as_u8, starts at Center
}

impl PlayerControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the player by `step` pixels. Left is negative, Right positive,
    /// Center a no-op. Safe to call while the draw pass runs.
    pub fn steer(&self, d: Direction, step: i32) {
        match d {
            Direction::Left => {
                self.facing.store(d.as_u8(), Ordering::Relaxed);
                self.x.fetch_sub(step, Ordering::Relaxed);
            }
            Direction::Right => {
                self.facing.store(d.as_u8(), Ordering::Relaxed);
                self.x.fetch_add(step, Ordering::Relaxed);
            }
            Direction::Center => {}
        }
    }

    fn position(&self) -> i32 {
        self.x.load(Ordering::Relaxed)
    }

    fn set_position(&self, x: i32) {
        self.x.store(x, Ordering::Relaxed);
    }

    fn facing(&self) -> Direction {
        Direction::from_u8(self.facing.load(Ordering::Relaxed))
    }

    fn set_facing(&self, d: Direction) {
        self.facing.store(d.as_u8(), Ordering::Relaxed);
    }
}

pub struct Player {
    control: Arc<PlayerControl>,
    frames: Vec<Rc<Sprite>>,
    current: usize,
    y: i32,
    hit_box: Rect,
    reaction: u32,
    default_side: Direction,
    hit_square: HitSquare,
    audio: Rc<dyn AudioCues>,
}

impl Player {
    pub fn new(
        frames: Vec<Rc<Sprite>>,
        control: Arc<PlayerControl>,
        audio: Rc<dyn AudioCues>,
        default_side: Direction,
        hit_square: HitSquare,
    ) -> Result<Self> {
        ensure!(
            frames.len() >= 3,
            "need at least 3 player frames (moving, winning, losing), got {}",
            frames.len()
        );
        ensure!(
            default_side != Direction::Center,
            "default player side must be Left or Right"
        );
        Ok(Self {
            control,
            frames,
            current: MOVING,
            y: 0,
            hit_box: Rect::default(),
            reaction: 0,
            default_side,
            hit_square,
            audio,
        })
    }

    /// Draw the player and refresh the hit box for this frame's collision
    /// pass. Clamps the shared lateral position into the viewport; the very
    /// first frame (facing still Center) snaps it to the middle instead.
    pub fn draw(&mut self, viewport: Rect, r: &mut dyn Renderer) {
        if self.reaction > 0 {
            // Swap back from the reaction sprite after 10 frames.
            if self.reaction == REACTION_FRAMES {
                self.reaction = 0;
                self.current = MOVING;
            } else {
                self.reaction += 1;
            }
        }
        let (w, h) = self.frames[self.current].size();
        let mut facing = self.control.facing();
        let mut x = self.control.position();
        if facing == Direction::Center {
            x = viewport.w / 2 - w / 2;
            facing = self.default_side;
            self.control.set_facing(facing);
        } else {
            x = x.clamp(0, (viewport.w - w).max(0));
        }
        self.control.set_position(x);
        self.y = (viewport.h as f32 / 1.5) as i32 - h / 2;

        let hs = self.hit_square;
        self.hit_box = Rect {
            x: x + (w as f32 * hs.x) as i32,
            y: self.y + (h as f32 * hs.y) as i32,
            w: (w as f32 * hs.w) as i32,
            h: (h as f32 * hs.h) as i32,
        };
        let dst = Rect { x, y: self.y, w, h };
        if facing == self.default_side {
            r.draw_sprite(&self.frames[self.current], dst, false);
        } else {
            // Mirrored draw; compensate the hit box for the flipped art.
            r.draw_sprite(&self.frames[self.current], dst, true);
            self.hit_box.x -= (w as f32 * hs.flip_offset) as i32;
        }
    }

    /// True when the drop overlaps the hit box. The vertical test compares
    /// the drop's span against the hit box's top edge only and ignores the
    /// box height, so the drop registers as it crosses that edge.
    /// On a hit the reaction animation starts and the matching cue plays;
    /// the caller is expected to consume the drop.
    pub fn hit(&mut self, drop: &Drop) -> bool {
        let hit = self.hit_box;
        let area = drop.pos();
        if area.y + area.h < hit.y || area.y > hit.y {
            return false;
        }
        if area.x + area.w < hit.x || area.x > hit.x + hit.w {
            return false;
        }
        self.reaction = 1;
        if drop.points() > 0 {
            self.current = WINNING;
            self.audio.cue_win();
        } else {
            self.current = LOSING;
            self.audio.cue_lose();
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn current_frame(&self) -> usize {
        self.current
    }

    #[cfg(test)]
    pub(crate) fn hit_box(&self) -> Rect {
        self.hit_box
    }

    #[cfg(test)]
    pub(crate) fn set_hit_box(&mut self, hit_box: Rect) {
        self.hit_box = hit_box;
    }
}
