#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Crossroads adapters.
//!
//! A [`Scene`] is a backend-agnostic description of one frame, built from a
//! [`SimulationSnapshot`]. Backends draw it and never reach back into the
//! simulation.

use std::{fmt, str::FromStr, time::Duration};

use anyhow::Result as AnyResult;
use crossroads_core::{
    ActorKind, ActorSnapshot, Direction, Outcome, Position, SimulationSnapshot, StopSignDisplay,
};
use glam::Vec2;
use thiserror::Error;

/// Width of the game window in pixels.
pub const WINDOW_WIDTH: f32 = 960.0;

/// Height of the game window in pixels.
pub const WINDOW_HEIGHT: f32 = 700.0;

/// Size the background image is stretched to; it overhangs the window bottom.
pub const BACKGROUND_SIZE: Vec2 = Vec2::new(960.0, 720.0);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::from_rgb_u8(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Color = Color::from_rgb_u8(0, 0, 0);
    /// Banner text blue.
    pub const BLUE: Color = Color::from_rgb_u8(0, 0, 255);
    /// Win banner green.
    pub const GREEN: Color = Color::from_rgb_u8(0, 255, 0);
    /// Loss banner red.
    pub const RED: Color = Color::from_rgb_u8(255, 0, 0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Identifies every image the game can draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Player car facing left.
    PlayerLeft,
    /// Player car facing right.
    PlayerRight,
    /// Player car facing up.
    PlayerUp,
    /// Player car facing down.
    PlayerDown,
    /// AI car facing left.
    AiLeft,
    /// AI car facing right.
    AiRight,
    /// AI car facing up.
    AiUp,
    /// AI car facing down.
    AiDown,
    /// Junction backdrop.
    Background,
}

impl SpriteKey {
    /// Every key, in manifest order.
    pub const ALL: [SpriteKey; 9] = [
        SpriteKey::PlayerLeft,
        SpriteKey::PlayerRight,
        SpriteKey::PlayerUp,
        SpriteKey::PlayerDown,
        SpriteKey::AiLeft,
        SpriteKey::AiRight,
        SpriteKey::AiUp,
        SpriteKey::AiDown,
        SpriteKey::Background,
    ];

    /// Sprite drawn for a vehicle of `kind` facing `facing`.
    #[must_use]
    pub const fn for_actor(kind: ActorKind, facing: Direction) -> Self {
        match (kind, facing) {
            (ActorKind::Player, Direction::Left) => Self::PlayerLeft,
            (ActorKind::Player, Direction::Right) => Self::PlayerRight,
            (ActorKind::Player, Direction::Up) => Self::PlayerUp,
            (ActorKind::Player, Direction::Down) => Self::PlayerDown,
            (ActorKind::Ai, Direction::Left) => Self::AiLeft,
            (ActorKind::Ai, Direction::Right) => Self::AiRight,
            (ActorKind::Ai, Direction::Up) => Self::AiUp,
            (ActorKind::Ai, Direction::Down) => Self::AiDown,
        }
    }

    /// Name used for the key in sprite manifests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PlayerLeft => "PlayerLeft",
            Self::PlayerRight => "PlayerRight",
            Self::PlayerUp => "PlayerUp",
            Self::PlayerDown => "PlayerDown",
            Self::AiLeft => "AiLeft",
            Self::AiRight => "AiRight",
            Self::AiUp => "AiUp",
            Self::AiDown => "AiDown",
            Self::Background => "Background",
        }
    }
}

impl fmt::Display for SpriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpriteKey {
    type Err = RenderingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == name)
            .ok_or_else(|| RenderingError::UnknownSpriteKey {
                name: name.to_owned(),
            })
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Directional key presses detected this frame, in the order they arrived.
    pub moves: Vec<Direction>,
}

/// Filled rectangle drawn behind text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelPresentation {
    /// Top-left corner in window pixels.
    pub origin: Vec2,
    /// Extent in window pixels.
    pub size: Vec2,
    /// Fill color.
    pub color: Color,
}

/// Line of text anchored at its baseline origin.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPresentation {
    /// Text to draw.
    pub text: String,
    /// Baseline origin in window pixels.
    pub position: Vec2,
    /// Font size in pixels.
    pub font_size: f32,
    /// Text color.
    pub color: Color,
}

/// Text drawn over a backing panel.
#[derive(Clone, Debug, PartialEq)]
pub struct BannerPresentation {
    /// Panel drawn first.
    pub panel: PanelPresentation,
    /// Text drawn over the panel.
    pub label: TextPresentation,
}

/// Overlay text shown above the junction.
#[derive(Clone, Debug, PartialEq)]
pub struct HudPresentation {
    /// Player coordinate read-out in the top-left corner.
    pub position_readout: TextPresentation,
    /// Stop-sign instructions or progress.
    pub stop_sign: BannerPresentation,
    /// Win or loss banner once the run is decided.
    pub outcome: Option<BannerPresentation>,
}

/// Vehicle drawn scaled to its bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorPresentation {
    /// Which vehicle this is.
    pub kind: ActorKind,
    /// Image selected by the vehicle's facing.
    pub sprite: SpriteKey,
    /// Top-left corner in window pixels.
    pub origin: Vec2,
    /// Bounding-box extent in window pixels.
    pub size: Vec2,
    /// Color used when the sprite is unavailable.
    pub fallback: Color,
}

impl ActorPresentation {
    /// Builds the presentation for a vehicle snapshot.
    #[must_use]
    pub fn from_snapshot(actor: &ActorSnapshot) -> Self {
        let bounds = actor.bounding_box();
        let fallback = match actor.kind {
            ActorKind::Player => Color::from_rgb_u8(40, 90, 200),
            ActorKind::Ai => Color::from_rgb_u8(200, 60, 40),
        };
        Self {
            kind: actor.kind,
            sprite: SpriteKey::for_actor(actor.kind, actor.facing),
            origin: Vec2::new(bounds.left(), bounds.top()),
            size: Vec2::new(bounds.size().width(), bounds.size().height()),
            fallback,
        }
    }
}

/// Scene description for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Backdrop sprite, drawn first and stretched to [`BACKGROUND_SIZE`].
    pub background: SpriteKey,
    /// Color used when the backdrop is unavailable.
    pub background_fallback: Color,
    /// The player's car.
    pub player: ActorPresentation,
    /// The AI car.
    pub ai: ActorPresentation,
    /// Overlay text.
    pub hud: HudPresentation,
}

impl Scene {
    /// Builds the frame for the provided snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &SimulationSnapshot) -> Self {
        Self {
            background: SpriteKey::Background,
            background_fallback: Color::from_rgb_u8(96, 96, 96),
            player: ActorPresentation::from_snapshot(&snapshot.player),
            ai: ActorPresentation::from_snapshot(&snapshot.ai.actor),
            hud: HudPresentation {
                position_readout: TextPresentation {
                    text: position_readout(snapshot.player.position),
                    position: Vec2::new(10.0, 20.0),
                    font_size: 14.0,
                    color: Color::BLACK,
                },
                stop_sign: stop_sign_banner(snapshot.stop_sign.display()),
                outcome: outcome_banner(snapshot.outcome),
            },
        }
    }
}

/// Coordinate read-out for the player.
#[must_use]
pub fn position_readout(position: Position) -> String {
    format!("Player X: {} | Y: {}", position.x(), position.y())
}

/// Message telling the player where they stand with the stop sign.
#[must_use]
pub fn stop_sign_text(display: StopSignDisplay) -> String {
    match display {
        StopSignDisplay::Instructions => "Stop at the stop sign for 2 seconds!".to_owned(),
        StopSignDisplay::CountingDown { elapsed } => {
            format!("Stopping... {:.2} / 2.00 seconds", elapsed.as_secs_f32())
        }
        StopSignDisplay::Cleared => "You may proceed!".to_owned(),
    }
}

/// Banner text and color for a decided run.
#[must_use]
pub fn outcome_text(outcome: Outcome) -> Option<(&'static str, Color)> {
    match outcome {
        Outcome::InProgress => None,
        Outcome::Won => Some(("You Win!", Color::GREEN)),
        Outcome::Lost(_) => Some(("You Lost!", Color::RED)),
    }
}

fn stop_sign_banner(display: StopSignDisplay) -> BannerPresentation {
    let text_x = match display {
        StopSignDisplay::Cleared => 350.0,
        StopSignDisplay::Instructions | StopSignDisplay::CountingDown { .. } => 250.0,
    };
    BannerPresentation {
        panel: PanelPresentation {
            origin: Vec2::new(230.0, 15.0),
            size: Vec2::new(500.0, 30.0),
            color: Color::WHITE,
        },
        label: TextPresentation {
            text: stop_sign_text(display),
            position: Vec2::new(text_x, 40.0),
            font_size: 20.0,
            color: Color::BLUE,
        },
    }
}

fn outcome_banner(outcome: Outcome) -> Option<BannerPresentation> {
    let (text, color) = outcome_text(outcome)?;
    Some(BannerPresentation {
        panel: PanelPresentation {
            origin: Vec2::new(300.0, 300.0),
            size: Vec2::new(360.0, 80.0),
            color: Color::WHITE,
        },
        label: TextPresentation {
            text: text.to_owned(),
            position: Vec2::new(380.0, 350.0),
            font_size: 40.0,
            color,
        },
    })
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Window extent in pixels.
    pub window_size: Vec2,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError::InvalidWindowSize`] unless both extents are positive.
    pub fn new<T>(
        window_title: T,
        window_size: Vec2,
        clear_color: Color,
        scene: Scene,
    ) -> Result<Self, RenderingError>
    where
        T: Into<String>,
    {
        if !(window_size.x > 0.0 && window_size.y > 0.0) {
            return Err(RenderingError::InvalidWindowSize {
                width: window_size.x,
                height: window_size.y,
            });
        }

        Ok(Self {
            window_title: window_title.into(),
            window_size,
            clear_color,
            scene,
        })
    }
}

/// Rendering backend capable of presenting Crossroads scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta and
    /// the key presses captured by the adapter, and replaces the scene before
    /// it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Window extents must be positive.
    #[error("window size must be positive (received {width}x{height})")]
    InvalidWindowSize {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
    /// A sprite name did not match any known key.
    #[error("unknown sprite key `{name}`")]
    UnknownSpriteKey {
        /// Name that failed to parse.
        name: String,
    },
}
