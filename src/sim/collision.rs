//! Boundary collision
//!
//! A move is integrated in one step and then clamped axis by axis into the
//! field. Any axis the clamp changed is a bump against that edge.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Field edge a robot ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

impl Edge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Bottom => "bottom",
            Edge::Top => "top",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of clamping a destination into the field
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryResult {
    /// Destination after clamping, always inside the field
    pub position: Vec2,
    /// Edge clamped on the x axis, if any
    pub x_edge: Option<Edge>,
    /// Edge clamped on the y axis, if any
    pub y_edge: Option<Edge>,
}

impl BoundaryResult {
    /// Whether the clamp changed anything
    pub fn bumped(&self) -> bool {
        self.x_edge.is_some() || self.y_edge.is_some()
    }

    /// Clamped edges, x axis first
    pub fn edges(&self) -> impl Iterator<Item = Edge> {
        self.x_edge.into_iter().chain(self.y_edge)
    }
}

/// Destination after travelling `speed * dt` metres along `heading` from `from`
#[inline]
pub fn destination(from: Vec2, heading: f32, speed: f32, dt: f32) -> Vec2 {
    from + Vec2::new(heading.cos(), heading.sin()) * (speed * dt)
}

/// Clamp `to` into `[0, width] × [0, height]`, reporting which edges stopped it
pub fn clamp_to_field(to: Vec2, width: f32, height: f32) -> BoundaryResult {
    let x = to.x.clamp(0.0, width);
    let y = to.y.clamp(0.0, height);

    let x_edge = if to.x < 0.0 {
        Some(Edge::Left)
    } else if to.x > width {
        Some(Edge::Right)
    } else {
        None
    };
    let y_edge = if to.y < 0.0 {
        Some(Edge::Bottom)
    } else if to.y > height {
        Some(Edge::Top)
    } else {
        None
    };

    BoundaryResult {
        position: Vec2::new(x, y),
        x_edge,
        y_edge,
    }
}
