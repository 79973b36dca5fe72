#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Crossroads.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Holding an arrow key repeats the move after [`REPEAT_DELAY`], once every
//! [`REPEAT_INTERVAL`], the way a desktop keyboard auto-repeats.
//!
//! Sprites are loaded once, when the window opens, and cached per
//! [`SpriteKey`]. Anything that cannot be loaded is reported through `log`
//! and drawn as a flat rectangle instead.

mod sprites;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use crossroads_core::Direction;
use crossroads_rendering::{
    ActorPresentation, BannerPresentation, Color, FrameInput, Presentation, RenderingBackend,
    Scene, SpriteKey, TextPresentation, BACKGROUND_SIZE,
};
use glam::Vec2;
use log::{info, warn};
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};

pub use self::sprites::SpriteAtlas;

/// How long an arrow key must be held before it starts repeating.
pub const REPEAT_DELAY: Duration = Duration::from_millis(400);

/// Time between repeated moves while an arrow key stays held.
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(40);

/// Upper bound on repeats one key may produce in a single frame.
const MAX_REPEATS_PER_FRAME: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}

/// Turns held arrow keys into a stream of moves.
///
/// Each slot holds the time left until the next repeat of that direction,
/// or `None` while the key is up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyRepeat {
    until_repeat: [Option<Duration>; 4],
}

impl KeyRepeat {
    fn gather(
        &mut self,
        frame_dt: Duration,
        mut held: impl FnMut(KeyCode) -> bool,
    ) -> FrameInput {
        let mut moves = Vec::new();
        for (slot, direction) in self.until_repeat.iter_mut().zip(Direction::ALL) {
            if !held(key_code_for(direction)) {
                *slot = None;
                continue;
            }

            let Some(mut remaining) = *slot else {
                moves.push(direction);
                *slot = Some(REPEAT_DELAY);
                continue;
            };

            let mut elapsed = frame_dt;
            let mut repeats = 0;
            while elapsed >= remaining {
                elapsed -= remaining;
                remaining = REPEAT_INTERVAL;
                repeats += 1;
                moves.push(direction);
                if repeats == MAX_REPEATS_PER_FRAME {
                    elapsed = Duration::ZERO;
                    break;
                }
            }
            *slot = Some(remaining - elapsed);
        }
        FrameInput { moves }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    sprite_manifest: Option<PathBuf>,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            sprite_manifest: Some(SpriteAtlas::default_manifest_path()),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Selects the sprite manifest to load, or `None` to draw placeholder shapes only.
    #[must_use]
    pub fn with_sprite_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.sprite_manifest = manifest;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            sprite_manifest,
        } = self;

        let Presentation {
            window_title,
            window_size,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_size.x.round() as i32,
            window_height: window_size.y.round() as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = sprite_manifest.and_then(|path| load_atlas(&path));
            let background = to_macroquad_color(clear_color);
            let mut key_repeat = KeyRepeat::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    info!("quit requested");
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = key_repeat
                    .gather(frame_dt, |key| is_key_pressed(key) || is_key_down(key));

                update_scene(frame_dt, frame_input, &mut scene);

                macroquad::window::clear_background(background);
                draw_scene(&scene, sprite_atlas.as_ref());

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn load_atlas(path: &std::path::Path) -> Option<SpriteAtlas> {
    match SpriteAtlas::from_manifest_path(path) {
        Ok(atlas) => {
            info!(
                "loaded {} sprites from {}",
                atlas.texture_count(),
                path.display()
            );
            Some(atlas)
        }
        Err(error) => {
            warn!("{error:#}; drawing placeholder shapes instead of sprites");
            None
        }
    }
}

fn key_code_for(direction: Direction) -> KeyCode {
    match direction {
        Direction::Left => KeyCode::Left,
        Direction::Right => KeyCode::Right,
        Direction::Up => KeyCode::Up,
        Direction::Down => KeyCode::Down,
    }
}

fn draw_scene(scene: &Scene, sprite_atlas: Option<&SpriteAtlas>) {
    draw_sprite_or_fallback(
        sprite_atlas,
        scene.background,
        Vec2::ZERO,
        BACKGROUND_SIZE,
        scene.background_fallback,
    );
    draw_actor(&scene.player, sprite_atlas);
    draw_actor(&scene.ai, sprite_atlas);

    draw_text_line(&scene.hud.position_readout);
    draw_banner(&scene.hud.stop_sign);
    if let Some(outcome) = &scene.hud.outcome {
        draw_banner(outcome);
    }
}

fn draw_actor(actor: &ActorPresentation, sprite_atlas: Option<&SpriteAtlas>) {
    draw_sprite_or_fallback(
        sprite_atlas,
        actor.sprite,
        actor.origin,
        actor.size,
        actor.fallback,
    );
}

fn draw_sprite_or_fallback(
    sprite_atlas: Option<&SpriteAtlas>,
    key: SpriteKey,
    origin: Vec2,
    size: Vec2,
    fallback: Color,
) {
    if let Some(atlas) = sprite_atlas {
        if atlas.draw(key, origin, size) {
            return;
        }
    }

    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(fallback),
    );
}

fn draw_banner(banner: &BannerPresentation) {
    let panel = banner.panel;
    macroquad::shapes::draw_rectangle(
        panel.origin.x,
        panel.origin.y,
        panel.size.x,
        panel.size.y,
        to_macroquad_color(panel.color),
    );
    draw_text_line(&banner.label);
}

fn draw_text_line(text: &TextPresentation) {
    macroquad::text::draw_text(
        &text.text,
        text.position.x,
        text.position.y,
        text.font_size,
        to_macroquad_color(text.color),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
