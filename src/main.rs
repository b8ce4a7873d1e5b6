//! Catfall — catch-the-falling-treats arcade game in the terminal.

mod app;
mod audio;
mod input;
mod player;
mod rain;
mod render;
mod scene;
mod score;
mod sprite;

use anyhow::Result;
use app::App;
use clap::Parser;
use std::path::PathBuf;

/// Options derived from the CLI that shape the running game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub player_speed: i32,
    pub assets: PathBuf,
    pub mute: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = GameConfig {
        fps: args.fps,
        width: args.width,
        height: args.height,
        player_speed: args.speed,
        assets: args.assets,
        mute: args.mute,
    };
    let mut app = App::new(config)?;
    app.run()?;
    Ok(())
}

/// Catch-the-falling-treats arcade game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "catfall",
    version,
    about = "Catch the falling treats, dodge the junk. Drop rate scales with your score.",
    long_about = "Catfall is a terminal arcade game: treats and junk rain from the top of the \
        screen and you catch them at the bottom. Good drops score points, bad drops cost \
        more; every thousand points the rain falls harder.\n\n\
        CONTROLS:\n  Left/a/h   Move left    Right/d/l  Move right\n  f          Fullscreen   q / Esc    Quit"
)]
pub struct Args {
    /// Target frames per second for the draw/update loop.
    #[arg(long, default_value = "30", value_name = "RATE")]
    pub fps: u32,

    /// Maximum pixel width of the play area; the terminal may not have
    /// room for all of it. Lifted while fullscreen (press f).
    #[arg(long, default_value = "800", value_name = "PX")]
    pub width: u32,

    /// Maximum pixel height of the play area. One terminal row is two
    /// pixels tall.
    #[arg(long, default_value = "600", value_name = "PX")]
    pub height: u32,

    /// Pixels the player moves per key press.
    #[arg(short, long, default_value = "20", value_name = "PX")]
    pub speed: i32,

    /// Directory holding the sprite assets.
    #[arg(long, default_value = "assets", value_name = "DIR")]
    pub assets: PathBuf,

    /// Run without audio output.
    #[arg(long)]
    pub mute: bool,
}
