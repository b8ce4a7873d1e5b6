//! Score tracking and the score -> drop-rate feedback loop.

use crate::rain::Spawner;
use crate::render::{Rect, Renderer, text_width};
use crate::sprite::Rgb;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

const SCORE_COLOUR: Rgb = Rgb(255, 0, 0);

/// Rate updates happen at most this often, and only on hit frames.
const RATE_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Running score. `add` is the only mutation path; reads and writes are
/// atomic because the total is shared across the input/draw boundary.
#[derive(Debug, Default)]
pub struct Scoreboard {
    points: AtomicI64,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, delta: i64) {
        self.points.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn total(&self) -> i64 {
        self.points.load(Ordering::Relaxed)
    }

    /// Draw the total near the top-right corner, inset 10% on both axes.
    pub fn draw(&self, viewport: Rect, r: &mut dyn Renderer) {
        let text = self.total().to_string();
        let x = viewport.w - text_width(&text) - (viewport.w as f32 * 0.1) as i32;
        let y = (viewport.h as f32 * 0.1) as i32;
        r.draw_text(&text, x, y, SCORE_COLOUR);
    }
}

/// Feeds the score back into the spawner's rate: at most once per second,
/// and only on frames where something was caught.
pub struct DifficultyController {
    last_update: Instant,
}

impl DifficultyController {
    pub fn new(now: Instant) -> Self {
        Self {
            // Backdated so the very first hit may retune immediately.
            last_update: now.checked_sub(RATE_UPDATE_INTERVAL).unwrap_or(now),
        }
    }

    pub fn on_frame_result(&mut self, now: Instant, any_hit: bool, total: i64, spawner: &mut Spawner) {
        if !any_hit || now.duration_since(self.last_update) < RATE_UPDATE_INTERVAL {
            return;
        }
        self.last_update = now;
        // i64 division truncates toward zero, so a score of -1500 gives
        // tier 0 and a delay above one second.
        let tier = total / 1000 + 1;
        spawner.set_rate(tier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_adds() {
        let board = Arc::new(Scoreboard::new());
        let handles: Vec<_> = [5i64, -20]
            .into_iter()
            .map(|delta| {
                let board = Arc::clone(&board);
                thread::spawn(move || board.add(delta))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(board.total(), -15);
    }

    #[test]
    fn test_draw_places_total_top_right() {
        let board = Scoreboard::new();
        board.add(5);
        let mut r = crate::render::testing::RecordingRenderer::new(100, 100);
        board.draw(r.viewport, &mut r);
        // text "5" is 3 px wide: x = 100 - 3 - 10, y = 10.
        assert_eq!(r.texts, vec![("5".to_string(), 87, 10)]);
    }

    fn spawner() -> Spawner {
        Spawner::new(Vec::new(), 1)
    }

    #[test]
    fn test_no_hit_never_retunes() {
        let mut s = spawner();
        let before = s.delay();
        let now = Instant::now();
        let mut dc = DifficultyController::new(now);
        for i in 0..600 {
            dc.on_frame_result(now + Duration::from_millis(i * 33), false, 5000, &mut s);
        }
        assert_eq!(s.delay(), before);
    }

    #[test]
    fn test_retune_at_most_once_per_second() {
        let mut s = spawner();
        let now = Instant::now();
        let mut dc = DifficultyController::new(now);
        dc.on_frame_result(now, true, 4000, &mut s);
        assert_eq!(s.delay(), Duration::from_millis(600));
        // Within a second: ignored even though the score changed tier.
        dc.on_frame_result(now + Duration::from_millis(500), true, 9000, &mut s);
        assert_eq!(s.delay(), Duration::from_millis(600));
        dc.on_frame_result(now + Duration::from_secs(1), true, 9000, &mut s);
        assert_eq!(s.delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_tier_truncates_toward_zero_for_negative_scores() {
        let mut s = spawner();
        let now = Instant::now();
        let mut dc = DifficultyController::new(now);
        // -1500 / 1000 == -1 in Rust, so tier 0 and an 1100 ms delay.
        dc.on_frame_result(now, true, -1500, &mut s);
        assert_eq!(s.delay(), Duration::from_millis(1100));
    }
}
