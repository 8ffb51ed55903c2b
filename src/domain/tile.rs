/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Wall,     // Impassable border / corridor wall
    Player,   // Exactly one per live grid
    Pursuer,  // Mobile enemy, lethal on entry
    Hazard,   // Static enemy, lethal on entry
    Goal,     // Reaching it completes the level
    Obstacle, // Impassable, but not part of the maze structure
}

impl Tile {
    /// Does this tile block movement outright?
    pub fn is_impassable(self) -> bool {
        matches!(self, Tile::Wall | Tile::Obstacle)
    }

    /// Does entering this tile end the session in a loss?
    pub fn is_lethal(self) -> bool {
        matches!(self, Tile::Pursuer | Tile::Hazard)
    }

    /// Does entering this tile end the session in a win?
    pub fn is_goal(self) -> bool {
        matches!(self, Tile::Goal)
    }

    /// Can a pursuer step here? Walls, obstacles and other pursuers block it.
    pub fn blocks_pursuer(self) -> bool {
        self.is_impassable() || self == Tile::Pursuer
    }

    /// Decode one level-file glyph.
    pub fn from_glyph(ch: char) -> Option<Tile> {
        match ch {
            '.' | ' ' => Some(Tile::Empty),
            '#' => Some(Tile::Wall),
            'P' => Some(Tile::Player),
            'Z' => Some(Tile::Pursuer),
            '*' => Some(Tile::Hazard),
            'G' => Some(Tile::Goal),
            '%' => Some(Tile::Obstacle),
            _ => None,
        }
    }

    /// Canonical glyph, the inverse of `from_glyph`.
    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Wall => '#',
            Tile::Player => 'P',
            Tile::Pursuer => 'Z',
            Tile::Hazard => '*',
            Tile::Goal => 'G',
            Tile::Obstacle => '%',
        }
    }
}
