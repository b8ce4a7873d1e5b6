//! App: terminal init, the fixed-rate frame loop, and the input thread.
//!
//! Threading contract, in one place: the input thread mutates exactly the
//! player's lateral position and facing (the `PlayerControl` atomics) plus
//! the `stop` and `fullscreen` flags. Every other piece of game state —
//! rain, hit box, reaction counter, spawn and difficulty timers, the pixel
//! buffer — is confined to the draw thread and never crosses over.

use crate::GameConfig;
use crate::audio::{AudioCues, NullAudio, RodioAudio};
use crate::input::{Intent, key_to_intent};
use crate::player::{Direction, PlayerControl};
use crate::render::{Renderer, TermRenderer};
use crate::scene::{Scene, SceneOptions};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Cadence at which the input thread polls for events between stop checks.
const INPUT_POLL: Duration = Duration::from_millis(50);

pub struct App {
    config: GameConfig,
    scene: Scene,
    renderer: TermRenderer,
    control: Arc<PlayerControl>,
    stop: Arc<AtomicBool>,
    fullscreen: Arc<AtomicBool>,
}

impl App {
    /// Load assets and open the audio device. Failures here are fatal and
    /// happen before any terminal state is touched.
    pub fn new(config: GameConfig) -> Result<Self> {
        let control = Arc::new(PlayerControl::new());
        let audio: Rc<dyn AudioCues> = if config.mute {
            Rc::new(NullAudio)
        } else {
            Rc::new(RodioAudio::new())
        };
        let options = SceneOptions {
            seed: rand::random(),
            ..SceneOptions::default()
        };
        let scene = Scene::load(&config.assets, Arc::clone(&control), audio, &options)
            .with_context(|| format!("loading assets from {}", config.assets.display()))?;
        let renderer = TermRenderer::new(config.width, config.height);
        Ok(Self {
            config,
            scene,
            renderer,
            control,
            stop: Arc::new(AtomicBool::new(false)),
            fullscreen: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            cursor, execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let input = self.spawn_input_thread();
        let result = self.run_loop(&mut terminal);

        // Stop regardless of how the loop ended, then restore the terminal.
        self.stop.store(true, Ordering::Relaxed);
        let _ = input.join();
        execute!(std::io::stdout(), LeaveAlternateScreen, cursor::Show)?;
        disable_raw_mode()?;
        result
    }

    /// Fixed-rate draw/update loop. A slow frame just shortens the sleep;
    /// there is no catch-up or frame skipping, and a started frame always
    /// completes before the stop flag is honoured.
    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let fps = self.config.fps.max(1);
        let frame_budget = Duration::from_secs_f64(1.0 / f64::from(fps));
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return Ok(());
            }
            let frame_start = Instant::now();

            // Viewport is re-derived every frame so resizes and fullscreen
            // toggles take effect immediately.
            let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
            self.renderer
                .set_fullscreen(self.fullscreen.load(Ordering::Relaxed));
            self.renderer.begin_frame(cols, rows);

            self.scene.update(Instant::now(), &mut self.renderer);
            terminal.draw(|f| f.render_widget(self.renderer.widget(), f.area()))?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_budget {
                thread::sleep(frame_budget - elapsed);
            }
        }
    }

    fn spawn_input_thread(&self) -> thread::JoinHandle<()> {
        let control = Arc::clone(&self.control);
        let stop = Arc::clone(&self.stop);
        let fullscreen = Arc::clone(&self.fullscreen);
        let step = self.config.player_speed;
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                // A failed or empty poll is a benign idle tick; retry.
                match event::poll(INPUT_POLL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        log::debug!("input poll failed: {e}");
                        continue;
                    }
                }
                let ev = match event::read() {
                    Ok(ev) => ev,
                    Err(e) => {
                        log::debug!("input read failed: {e}");
                        continue;
                    }
                };
                let Event::Key(key) = ev else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key_to_intent(key) {
                    Intent::MoveLeft => control.steer(Direction::Left, step),
                    Intent::MoveRight => control.steer(Direction::Right, step),
                    Intent::ToggleFullscreen => {
                        fullscreen.fetch_xor(true, Ordering::Relaxed);
                    }
                    Intent::Quit => {
                        stop.store(true, Ordering::Relaxed);
                        return;
                    }
                    Intent::None => {}
                }
            }
        })
    }
}
