#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crossroads engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, inspect immutable snapshots, and
//! respond exclusively with new command batches.
//!
//! All wall-clock reads go through the [`Clock`] abstraction so that timing
//! rules can be exercised deterministically with a [`ManualClock`].

mod clock;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock};

/// Title shown by adapters that open a window.
pub const WINDOW_TITLE: &str = "Crossroads Game";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation to the provided wall-clock reading.
    Tick {
        /// Clock reading captured once at the start of the step.
        now: Timestamp,
    },
    /// Moves the player one speed increment in the provided direction.
    MovePlayer {
        /// Direction of travel, which also becomes the player's facing.
        direction: Direction,
    },
    /// Moves the AI vehicle and records the phase its script is in.
    AdvanceAi {
        /// Phase the AI occupies after this tick.
        phase: AiPhase,
        /// Displacement applied to the AI position.
        offset: Offset,
    },
    /// Replaces the stop-sign session phase.
    UpdateStopSign {
        /// Phase the session should enter.
        phase: StopSignPhase,
    },
    /// Ends the run as a loss.
    DeclareLoss {
        /// Rule the player broke.
        reason: LossReason,
    },
    /// Ends the run as a win.
    DeclareWin,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clock reading recorded for the tick.
        now: Timestamp,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
        /// Facing adopted by the player.
        facing: Direction,
    },
    /// Confirms that the AI vehicle moved.
    AiAdvanced {
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
        /// Phase the AI occupies after the move.
        phase: AiPhase,
    },
    /// Announces that the AI script entered a new phase.
    AiPhaseChanged {
        /// Phase that was left.
        from: AiPhase,
        /// Phase that became active.
        to: AiPhase,
    },
    /// Announces that the stop-sign session changed phase.
    StopSignChanged {
        /// Phase that was left.
        from: StopSignPhase,
        /// Phase that became active.
        to: StopSignPhase,
    },
    /// Announces that the run ended as a loss.
    GameLost {
        /// Rule the player broke.
        reason: LossReason,
    },
    /// Announces that the run ended as a win.
    GameWon,
    /// Reports that a command was dropped without mutating the world.
    CommandIgnored {
        /// Why the world refused the command.
        reason: IgnoreReason,
    },
}

/// Returns the clock reading of the most recent tick in `events`, if any.
///
/// Systems that only act on ticks bail out when this returns `None`.
#[must_use]
pub fn latest_tick(events: &[Event]) -> Option<Timestamp> {
    events.iter().rev().find_map(|event| match event {
        Event::TimeAdvanced { now } => Some(*now),
        _ => None,
    })
}

/// Reasons the world drops a command without touching its state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// The run already ended; the state is frozen.
    Frozen,
    /// The AI script may not return to an earlier phase.
    AiPhaseRegression,
    /// The stop-sign dwell was already satisfied and stays satisfied.
    StopSignCleared,
}

/// Screen-space directions used for both movement and facing.
///
/// The y axis grows downward, so [`Direction::Up`] decreases y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing x.
    Left,
    /// Toward increasing x.
    Right,
    /// Toward decreasing y.
    Up,
    /// Toward increasing y.
    Down,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Reports whether the direction lies on the x axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Bounding-box preset used by a vehicle facing this direction.
    #[must_use]
    pub const fn box_size(self) -> BoxSize {
        if self.is_horizontal() {
            BoxSize::HORIZONTAL
        } else {
            BoxSize::VERTICAL
        }
    }
}

/// Real-valued position of an actor's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate, growing downward.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position displaced by `offset`.
    #[must_use]
    pub fn translated(self, offset: Offset) -> Self {
        Self {
            x: self.x + offset.dx,
            y: self.y + offset.dy,
        }
    }
}

/// Displacement applied to a position in a single tick or key press.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    dx: f32,
    dy: f32,
}

impl Offset {
    /// Offset that leaves a position untouched.
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    /// Creates a new offset from explicit components.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Offset of `distance` units travelling in `direction`.
    #[must_use]
    pub fn toward(direction: Direction, distance: f32) -> Self {
        match direction {
            Direction::Left => Self::new(-distance, 0.0),
            Direction::Right => Self::new(distance, 0.0),
            Direction::Up => Self::new(0.0, -distance),
            Direction::Down => Self::new(0.0, distance),
        }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> f32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> f32 {
        self.dy
    }

    /// Reports whether the offset has no effect.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Width and height of a vehicle's bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    width: f32,
    height: f32,
}

impl BoxSize {
    /// Wide, short box used while facing left or right.
    pub const HORIZONTAL: BoxSize = BoxSize::new(146.0, 110.0);

    /// Narrow, tall box used while facing up or down.
    pub const VERTICAL: BoxSize = BoxSize::new(110.0, 146.0);

    /// Creates a new box size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    origin: Position,
    size: BoxSize,
}

impl BoundingBox {
    /// Constructs a box from its top-left corner and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: Position, size: BoxSize) -> Self {
        Self { origin, size }
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.origin.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.origin.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Size of the box.
    #[must_use]
    pub const fn size(&self) -> BoxSize {
        self.size
    }

    /// Strict intersection test; boxes that merely share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Wall-clock reading measured from the owning clock's origin.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// The clock origin.
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    /// Creates a timestamp from the time elapsed since the clock origin.
    #[must_use]
    pub const fn from_elapsed(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    /// Creates a timestamp from whole milliseconds since the clock origin.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Time elapsed since the clock origin.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.0
    }

    /// Time elapsed between `earlier` and `self`, or zero if `earlier` is later.
    #[must_use]
    pub fn saturating_duration_since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

/// Inclusive rectangle the player's post-move position must stay within.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayfieldBounds {
    /// Smallest accepted x.
    pub min_x: f32,
    /// Largest accepted x.
    pub max_x: f32,
    /// Smallest accepted y.
    pub min_y: f32,
    /// Largest accepted y.
    pub max_y: f32,
}

impl PlayfieldBounds {
    /// Reports whether the position lies inside the bounds, edges included.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x())
            && (self.min_y..=self.max_y).contains(&position.y())
    }
}

/// Fixed layout of the junction the player must cross.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JunctionGeometry {
    /// Left of this x the player must stay inside the crossable band.
    pub corridor_left: f32,
    /// Right of this x the player must stay inside the crossable band.
    pub corridor_right: f32,
    /// Top of the crossable band (inclusive).
    pub band_top: f32,
    /// Bottom of the crossable band (inclusive).
    pub band_bottom: f32,
    /// Horizontal coordinate of the stop sign.
    pub stop_sign_x: f32,
    /// Distance from the stop sign still counted as being at it (inclusive).
    pub stop_sign_tolerance: f32,
    /// Continuous time the player must spend at the stop sign.
    pub stop_sign_dwell: Duration,
    /// Reaching or passing this y wins once the dwell is cleared.
    pub goal_y: f32,
    /// Rectangle bounding accepted player moves.
    pub playfield: PlayfieldBounds,
}

impl JunctionGeometry {
    /// The one junction the game ships with.
    pub const STANDARD: JunctionGeometry = JunctionGeometry {
        corridor_left: 300.0,
        corridor_right: 525.0,
        band_top: 200.0,
        band_bottom: 300.0,
        stop_sign_x: 590.0,
        stop_sign_tolerance: 10.0,
        stop_sign_dwell: Duration::from_millis(2_000),
        goal_y: 505.0,
        playfield: PlayfieldBounds {
            min_x: -5.0,
            max_x: 820.0,
            min_y: -10.0,
            max_y: 508.0,
        },
    };

    /// Reports whether `y` lies within the crossable band.
    #[must_use]
    pub fn within_band(&self, y: f32) -> bool {
        (self.band_top..=self.band_bottom).contains(&y)
    }

    /// Reports whether a player at `position` has left the road corridor.
    #[must_use]
    pub fn violates_corridor(&self, position: Position) -> bool {
        let outside_corridor =
            position.x() < self.corridor_left || position.x() > self.corridor_right;
        outside_corridor && !self.within_band(position.y())
    }

    /// Reports whether `x` is close enough to the stop sign to count as stopped at it.
    #[must_use]
    pub fn in_stop_zone(&self, x: f32) -> bool {
        (x - self.stop_sign_x).abs() <= self.stop_sign_tolerance
    }

    /// Reports whether `y` has reached the goal line.
    #[must_use]
    pub fn reached_goal(&self, y: f32) -> bool {
        y >= self.goal_y
    }
}

impl Default for JunctionGeometry {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Phases of the AI vehicle's scripted route, in the only order they may occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiPhase {
    /// Driving right toward the first stopping point.
    Approach,
    /// Waiting at the first stopping point.
    Paused {
        /// Clock reading when the wait began.
        since: Timestamp,
    },
    /// Driving right again toward the turning point.
    ResumeApproach,
    /// Driving up, indefinitely.
    Ascend,
}

impl AiPhase {
    /// Position of the phase within the script; it never decreases.
    #[must_use]
    pub const fn ordinal(&self) -> u8 {
        match self {
            Self::Approach => 0,
            Self::Paused { .. } => 1,
            Self::ResumeApproach => 2,
            Self::Ascend => 3,
        }
    }

    /// Facing the AI vehicle adopts while in this phase.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        match self {
            Self::Ascend => Direction::Up,
            Self::Approach | Self::Paused { .. } | Self::ResumeApproach => Direction::Right,
        }
    }
}

/// Phases of the stop-sign compliance session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopSignPhase {
    /// The player is not being timed.
    Inactive,
    /// The player is inside the tolerance zone and being timed.
    Timing {
        /// Clock reading when the player entered the zone.
        since: Timestamp,
    },
    /// The dwell requirement is satisfied for the rest of the run.
    Cleared,
}

impl StopSignPhase {
    /// Reports whether the dwell requirement has been satisfied.
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared)
    }

    /// Reports whether the player is currently being timed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Timing { .. })
    }
}

/// Rule whose violation ended the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossReason {
    /// The player drove off the road outside the crossable band.
    LeftCorridor,
    /// The player's vehicle overlapped the AI vehicle.
    Collided,
    /// The player left the stop sign before the dwell elapsed.
    RolledStopSign,
}

/// Terminal state of a run. A run is won or lost, never both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The run is still being played.
    #[default]
    InProgress,
    /// The player crossed the goal after clearing the stop sign.
    Won,
    /// The player broke a rule.
    Lost(LossReason),
}

impl Outcome {
    /// Reports whether the run has ended, freezing all state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Reports whether the run was won.
    #[must_use]
    pub const fn won(&self) -> bool {
        matches!(self, Self::Won)
    }

    /// Reports whether the run was lost.
    #[must_use]
    pub const fn lost(&self) -> bool {
        matches!(self, Self::Lost(_))
    }
}

/// Identifies which vehicle a snapshot describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// The keyboard-controlled vehicle.
    Player,
    /// The scripted vehicle.
    Ai,
}

/// Immutable representation of a vehicle used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Which vehicle this is.
    pub kind: ActorKind,
    /// Top-left corner of the vehicle.
    pub position: Position,
    /// Direction the vehicle is facing.
    pub facing: Direction,
    /// Distance covered by a single displacement.
    pub speed: f32,
}

impl ActorSnapshot {
    /// Bounding box derived from the position and the facing's size preset.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_origin_and_size(self.position, self.facing.box_size())
    }
}

/// Immutable representation of the AI vehicle including its script phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiSnapshot {
    /// Vehicle state.
    pub actor: ActorSnapshot,
    /// Current phase of the scripted route.
    pub phase: AiPhase,
}

/// Immutable representation of the stop-sign session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopSignSnapshot {
    /// Current session phase.
    pub phase: StopSignPhase,
    /// Time spent in the zone as of the last tick; zero unless timing.
    pub elapsed: Duration,
}

impl StopSignSnapshot {
    /// Message the HUD should show for this session.
    #[must_use]
    pub fn display(&self) -> StopSignDisplay {
        match self.phase {
            StopSignPhase::Inactive => StopSignDisplay::Instructions,
            StopSignPhase::Timing { .. } => StopSignDisplay::CountingDown {
                elapsed: self.elapsed,
            },
            StopSignPhase::Cleared => StopSignDisplay::Cleared,
        }
    }
}

/// What the stop-sign banner should tell the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopSignDisplay {
    /// Ask the player to stop at the sign.
    Instructions,
    /// Show how long the player has waited so far.
    CountingDown {
        /// Time spent in the zone.
        elapsed: Duration,
    },
    /// Tell the player they may drive on.
    Cleared,
}

/// Consistent read-only copy of everything a renderer needs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Clock reading of the last processed tick.
    pub now: Timestamp,
    /// The player's vehicle.
    pub player: ActorSnapshot,
    /// The AI vehicle.
    pub ai: AiSnapshot,
    /// The stop-sign session.
    pub stop_sign: StopSignSnapshot,
    /// Terminal state of the run.
    pub outcome: Outcome,
}

impl SimulationSnapshot {
    /// Reports whether the run was won.
    #[must_use]
    pub const fn won(&self) -> bool {
        self.outcome.won()
    }

    /// Reports whether the run was lost.
    #[must_use]
    pub const fn lost(&self) -> bool {
        self.outcome.lost()
    }
}
