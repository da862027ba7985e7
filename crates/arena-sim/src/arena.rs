//! Arena layouts and static obstacle collision.

use arena_common::{DataError, Rect, Side, Vec2};
use serde::{Deserialize, Serialize};

/// Default arena width.
pub const ARENA_WIDTH: f32 = 1200.0;
/// Default arena height.
pub const ARENA_HEIGHT: f32 = 800.0;

/// Presentation kind of an obstacle. All kinds collide identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Long barrier
    Wall,
    /// Square column
    Pillar,
    /// Crystal formation
    Crystal,
}

/// Static axis-aligned obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Presentation kind
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
}

impl Obstacle {
    /// Create an obstacle.
    #[must_use]
    pub const fn new(kind: ObstacleKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            kind,
        }
    }

    /// Bounding rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A named arena: bounds plus obstacles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaLayout {
    /// Unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Width in arena units
    pub width: f32,
    /// Height in arena units
    pub height: f32,
    /// Static obstacles
    pub obstacles: Vec<Obstacle>,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self::open()
    }
}

impl ArenaLayout {
    /// Create an empty arena of the given size.
    #[must_use]
    pub fn empty(id: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            width,
            height,
            obstacles: Vec::new(),
        }
    }

    /// Add an obstacle.
    #[must_use]
    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Whether a body of `radius` at `pos` is out of bounds or inside an
    /// obstacle. `padding` is added to the radius.
    #[must_use]
    pub fn is_blocked(&self, pos: Vec2, radius: f32, padding: f32) -> bool {
        let r = radius + padding;
        if pos.x < r || pos.x > self.width - r || pos.y < r || pos.y > self.height - r {
            return true;
        }
        self.obstacles.iter().any(|o| o.rect().overlaps_box(pos, r))
    }

    /// Spawn point for a side, `inset` units from its edge.
    #[must_use]
    pub fn spawn_point(&self, side: Side, inset: f32) -> Vec2 {
        let y = self.height / 2.0;
        match side {
            Side::Local => Vec2::new(inset, y),
            Side::Remote => Vec2::new(self.width - inset, y),
        }
    }

    /// Parse a list of layouts from RON.
    pub fn list_from_ron(source: &str) -> Result<Vec<Self>, DataError> {
        ron::from_str(source).map_err(|e| DataError::Parse {
            what: "arena layouts",
            reason: e.to_string(),
        })
    }

    /// Look up a built-in layout by id.
    pub fn builtin(id: &str) -> Result<Self, DataError> {
        Self::builtins()
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| DataError::UnknownId {
                what: "arena",
                id: id.to_string(),
            })
    }

    /// All built-in layouts.
    #[must_use]
    pub fn builtins() -> Vec<Self> {
        vec![Self::open(), Self::colosseum(), Self::sanctum()]
    }

    /// Flat arena without obstacles.
    #[must_use]
    pub fn open() -> Self {
        Self {
            name: "Open Plain".into(),
            ..Self::empty("open", ARENA_WIDTH, ARENA_HEIGHT)
        }
    }

    /// Four pillars around the centre.
    #[must_use]
    pub fn colosseum() -> Self {
        let pillar = |x, y| Obstacle::new(ObstacleKind::Pillar, x, y, 60.0, 60.0);
        Self {
            name: "Colosseum".into(),
            ..Self::empty("colosseum", ARENA_WIDTH, ARENA_HEIGHT)
        }
        .with_obstacle(pillar(350.0, 200.0))
        .with_obstacle(pillar(790.0, 200.0))
        .with_obstacle(pillar(350.0, 540.0))
        .with_obstacle(pillar(790.0, 540.0))
    }

    /// Central wall between the spawns, crystals in two corners.
    #[must_use]
    pub fn sanctum() -> Self {
        Self {
            name: "Crystal Sanctum".into(),
            ..Self::empty("sanctum", ARENA_WIDTH, ARENA_HEIGHT)
        }
        .with_obstacle(Obstacle::new(ObstacleKind::Wall, 580.0, 250.0, 40.0, 300.0))
        .with_obstacle(Obstacle::new(ObstacleKind::Crystal, 300.0, 120.0, 50.0, 50.0))
        .with_obstacle(Obstacle::new(ObstacleKind::Crystal, 850.0, 630.0, 50.0, 50.0))
    }
}
