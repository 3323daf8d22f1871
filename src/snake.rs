use crate::Coords;
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Ladder order used by the planners: vertical first, then horizontal.
    pub const ALL: [Direction; 4] = [Down, Up, Right, Left];

    pub fn delta(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn step_from(self, pos: Coords) -> Coords {
        let (dx, dy) = self.delta();
        (pos.0 + dx, pos.1 + dy)
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right))
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }
}

/// Cells touched by one committed move.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub new_head: Coords,
    pub old_head: Coords,
    pub old_tail: Option<Coords>,
}

/// Trailing-history body, `body[0]` is the head.
///
/// Segments are only adjacent as a side effect of single steps; after a
/// portal crossing the head and the first body segment sit on opposite edges.
pub struct Snake {
    body: Vec<Coords>,
    direction: Direction,
    grow_next_move: bool,
}

impl Snake {
    pub fn new(pos: Coords, size: usize, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();

        let body = (0..i16::try_from(size.max(1)).unwrap_or(i16::MAX))
            .map(|i| (pos.0 - dx * i, pos.1 - dy * i))
            .collect();
        Snake { body, direction, grow_next_move: false }
    }

    #[cfg(test)]
    pub fn from_segments(body: Vec<Coords>, direction: Direction) -> Self {
        Snake { body, direction, grow_next_move: false }
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether `cell` will be covered by the body once the next move shifts
    /// it. The tail cell is vacated by that shift unless the snake grows.
    pub fn blocks(&self, cell: Coords) -> bool {
        let keep = if self.grow_next_move { self.body.len() } else { self.body.len() - 1 };
        cell == self.head() || is_occupied(cell, &self.body[..keep])
    }

    pub fn move_to(&mut self, new_head: Coords, heading: Direction) -> MoveResult {
        let old_head = self.head();
        self.direction = heading;
        self.body.insert(0, new_head);

        if self.grow_next_move {
            self.grow_next_move = false;
            MoveResult { new_head, old_head, old_tail: None }
        } else {
            let old_tail = self.body.pop();
            MoveResult { new_head, old_head, old_tail }
        }
    }

    pub fn set_direction(&mut self, new_direction: Direction) {
        if !new_direction.is_opposite(self.direction) {
            self.direction = new_direction;
        }
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn grow(&mut self) {
        self.grow_next_move = true;
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// True iff `cell` matches a body segment other than the head.
pub fn is_occupied(cell: Coords, body: &[Coords]) -> bool {
    body.iter().skip(1).any(|seg| *seg == cell)
}
