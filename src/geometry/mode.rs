//! Growth modes as a closed set of axis/direction pairs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::io::error::{GrowError, invalid_parameter};

/// Axis along which the canvas grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Width grows, height is fixed
    Horizontal,
    /// Height grows, width is fixed
    Vertical,
}

/// Which end of the growth axis is the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Frontier at the far end (right or bottom); old content stays at the origin
    Forward,
    /// Frontier at the origin (left or top); old content shifts by the advance
    Reverse,
}

/// One of the four fixed growth directions of a session
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthMode {
    /// Append columns on the right
    GrowRight,
    /// Prepend columns on the left
    GrowLeft,
    /// Append rows at the bottom
    GrowDown,
    /// Prepend rows at the top
    GrowUp,
}

impl GrowthMode {
    /// All modes in a stable order
    pub const ALL: [Self; 4] = [Self::GrowRight, Self::GrowLeft, Self::GrowDown, Self::GrowUp];

    /// Growth axis of this mode
    pub const fn axis(self) -> Axis {
        match self {
            Self::GrowRight | Self::GrowLeft => Axis::Horizontal,
            Self::GrowDown | Self::GrowUp => Axis::Vertical,
        }
    }

    /// Frontier direction of this mode
    pub const fn direction(self) -> Direction {
        match self {
            Self::GrowRight | Self::GrowDown => Direction::Forward,
            Self::GrowLeft | Self::GrowUp => Direction::Reverse,
        }
    }

    /// Stable symbolic name used in persisted metadata
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GrowRight => "grow-right",
            Self::GrowLeft => "grow-left",
            Self::GrowDown => "grow-down",
            Self::GrowUp => "grow-up",
        }
    }

    /// Where the conditioning half sits inside a tile
    pub const fn conditioning_side(self) -> &'static str {
        match self {
            Self::GrowRight => "left half",
            Self::GrowLeft => "right half",
            Self::GrowDown => "top half",
            Self::GrowUp => "bottom half",
        }
    }

    /// Where the freshly generated half sits inside a tile
    pub const fn new_side(self) -> &'static str {
        match self {
            Self::GrowRight => "right half",
            Self::GrowLeft => "left half",
            Self::GrowDown => "bottom half",
            Self::GrowUp => "top half",
        }
    }
}

impl Axis {
    /// Length along this axis of an image of the given (width, height)
    pub const fn along(self, size: (u32, u32)) -> u32 {
        match self {
            Self::Horizontal => size.0,
            Self::Vertical => size.1,
        }
    }

    /// Length across this axis of an image of the given (width, height)
    pub const fn across(self, size: (u32, u32)) -> u32 {
        match self {
            Self::Horizontal => size.1,
            Self::Vertical => size.0,
        }
    }

    /// Build a (width, height) pair from lengths along and across this axis
    pub const fn size(self, along: u32, across: u32) -> (u32, u32) {
        match self {
            Self::Horizontal => (along, across),
            Self::Vertical => (across, along),
        }
    }
}

impl fmt::Display for GrowthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrowthMode {
    type Err = GrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                invalid_parameter(
                    "mode",
                    &s,
                    &"expected one of grow-right, grow-left, grow-down, grow-up",
                )
            })
    }
}
