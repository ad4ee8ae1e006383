//! State-to-color lookup for the renderer
//!
//! Each controller state has one fixed RGB tag; the renderer tints the actor
//! with it.

use serde::{Deserialize, Serialize};

use super::player::PlayerState;
use super::target::TargetState;

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);

    /// Normalized `[r, g, b]` in 0..=1
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }

    /// Packed `0xRRGGBB`
    pub fn to_hex(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }
}

/// Indexed by `PlayerState as usize`
pub const PLAYER_COLORS: [Rgb; PlayerState::COUNT] =
    [Rgb::BLACK, Rgb::WHITE, Rgb::BLUE, Rgb::GREEN];

/// Indexed by `TargetState as usize`
pub const TARGET_COLORS: [Rgb; TargetState::COUNT] = [Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::WHITE];

/// Anything the renderer can tint by state
pub trait VisualState {
    fn color(&self) -> Rgb;
}

impl VisualState for PlayerState {
    fn color(&self) -> Rgb {
        PLAYER_COLORS[*self as usize]
    }
}

impl VisualState for TargetState {
    fn color(&self) -> Rgb {
        TARGET_COLORS[*self as usize]
    }
}
