//! Contains utilities, enums, constants and simple data structures that are
//! used across the program.

use serde::Deserialize;

/// The direction of a sweep over the ranks of a layered graph.
#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Up,
    Down,
    Both,
    None,
}

impl Direction {
    pub fn is_down(&self) -> bool {
        match self {
            Direction::None | Direction::Up => false,
            Direction::Both | Direction::Down => true,
        }
    }
    pub fn is_up(&self) -> bool {
        match self {
            Direction::Both | Direction::Up => true,
            Direction::None | Direction::Down => false,
        }
    }
}

/// The direction in which the layers of a layered drawing grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    TopToBottom,
    LeftToRight,
    BottomToTop,
    RightToLeft,
}

impl Orientation {
    pub fn is_top_to_bottom(&self) -> bool {
        matches!(self, Orientation::TopToBottom)
    }

    /// \returns True if the layers run along the x axis. These graphs are
    /// laid out top-to-bottom and transposed at the end.
    pub fn is_left_right(&self) -> bool {
        matches!(self, Orientation::LeftToRight | Orientation::RightToLeft)
    }

    /// \returns True if the layer axis is mirrored after placement.
    pub fn is_reversed(&self) -> bool {
        matches!(self, Orientation::BottomToTop | Orientation::RightToLeft)
    }

    pub fn flip(&self) -> Orientation {
        match self {
            Orientation::TopToBottom => Orientation::LeftToRight,
            Orientation::LeftToRight => Orientation::TopToBottom,
            Orientation::BottomToTop => Orientation::RightToLeft,
            Orientation::RightToLeft => Orientation::BottomToTop,
        }
    }
}

#[test]
fn test_orientation() {
    assert!(Orientation::default().is_top_to_bottom());
    assert!(Orientation::RightToLeft.is_left_right());
    assert!(Orientation::RightToLeft.is_reversed());
    assert!(!Orientation::LeftToRight.is_reversed());
    assert_eq!(Orientation::BottomToTop.flip(), Orientation::RightToLeft);
    assert!(Direction::Both.is_up() && Direction::Both.is_down());
}
