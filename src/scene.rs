//! Scene orchestration: one `update` per frame ties the pieces together.

use crate::audio::AudioCues;
use crate::player::{Direction, HitSquare, Player, PlayerControl};
use crate::rain::{Drop, DropTemplate, Rain, Spawner};
use crate::render::Renderer;
use crate::score::{DifficultyController, Scoreboard};
use crate::sprite::{self, Sprite};
use anyhow::{Context, Result};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

/// Points per rank of the good drop series (`drop_good_N` is worth `5 * N`).
const GOOD_POINTS_PER_RANK: i64 = 5;

/// Points lost per rank of the bad drop series (`drop_bad_N` costs `20 * N`).
const BAD_POINTS_PER_RANK: i64 = 20;

/// Background music is fire-and-forget: started once, restarted whenever
/// the track runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MusicState {
    NotStarted,
    Playing,
}

/// Knobs for scene construction; everything that was a process-wide global
/// in older arcade codebases is an explicit value here.
pub struct SceneOptions {
    pub seed: u64,
    pub default_side: Direction,
    pub hit_square: HitSquare,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            default_side: Direction::Right,
            hit_square: HitSquare::default(),
        }
    }
}

pub struct Scene {
    background: Rc<Sprite>,
    scoreboard: Scoreboard,
    rain: Rain,
    player: Player,
    difficulty: DifficultyController,
    music: MusicState,
    audio: Rc<dyn AudioCues>,
}

impl Scene {
    /// Build the scene from the sprite assets in `dir`: `background.txt`,
    /// at least three `player_frame_N.txt`, and the `drop_good_N.txt` /
    /// `drop_bad_N.txt` series. Any of these missing is fatal; nothing is
    /// retried later.
    pub fn load(
        dir: &Path,
        control: Arc<PlayerControl>,
        audio: Rc<dyn AudioCues>,
        options: &SceneOptions,
    ) -> Result<Self> {
        let background =
            Rc::new(sprite::load(&dir.join("background.txt")).context("loading background")?);
        let frames = sprite::load_series(dir, "player_frame_").context("loading player frames")?;
        let player = Player::new(
            frames,
            control,
            Rc::clone(&audio),
            options.default_side,
            options.hit_square,
        )?;

        let mut templates = Vec::new();
        let good = sprite::load_series(dir, "drop_good_").context("loading good drops")?;
        for (i, s) in good.into_iter().enumerate() {
            templates.push(DropTemplate {
                sprite: s,
                points: (i as i64 + 1) * GOOD_POINTS_PER_RANK,
            });
        }
        let bad = sprite::load_series(dir, "drop_bad_").context("loading bad drops")?;
        for (i, s) in bad.into_iter().enumerate() {
            templates.push(DropTemplate {
                sprite: s,
                points: -((i as i64 + 1) * BAD_POINTS_PER_RANK),
            });
        }
        let rain = Rain::new(Spawner::new(templates, options.seed));
        Ok(Self::from_parts(background, rain, player, audio))
    }

    fn from_parts(
        background: Rc<Sprite>,
        rain: Rain,
        player: Player,
        audio: Rc<dyn AudioCues>,
    ) -> Self {
        Self {
            background,
            scoreboard: Scoreboard::new(),
            rain,
            player,
            difficulty: DifficultyController::new(Instant::now()),
            music: MusicState::NotStarted,
            audio,
        }
    }

    /// One simulation/draw frame, in order: music upkeep, background,
    /// player (which refreshes the hit box), rain advance, collision
    /// resolution into the scoreboard, difficulty feedback, scoreboard.
    pub fn update(&mut self, now: Instant, r: &mut dyn Renderer) {
        let viewport = r.viewport();
        if self.music == MusicState::NotStarted || !self.audio.music_playing() {
            self.audio.start_music();
            self.music = MusicState::Playing;
        }
        r.draw_sprite(&self.background, viewport, false);
        self.player.draw(viewport, r);
        self.rain.advance(now, viewport, r);

        let deltas = resolve_collisions(&mut self.player, self.rain.drops_mut());
        let any_hit = !deltas.is_empty();
        for delta in deltas {
            self.scoreboard.add(delta);
        }
        self.difficulty.on_frame_result(
            now,
            any_hit,
            self.scoreboard.total(),
            self.rain.spawner_mut(),
        );
        self.scoreboard.draw(viewport, r);
    }

    #[cfg(test)]
    pub(crate) fn testing_parts(&mut self) -> (&mut Rain, &mut Player, &Scoreboard) {
        (&mut self.rain, &mut self.player, &self.scoreboard)
    }
}

/// Test every live drop against the player in storage order; hits are
/// consumed and their point deltas returned for the scoreboard.
pub fn resolve_collisions(player: &mut Player, drops: &mut [Drop]) -> Vec<i64> {
    let mut deltas = Vec::new();
    for drop in drops.iter_mut() {
        if drop.consumed() {
            continue;
        }
        if player.hit(drop) {
            drop.consume();
            deltas.push(drop.points());
        }
    }
    deltas
}
