use std::collections::VecDeque;

use crate::board::Board;
use crate::planner::{commit, is_open, StepOutcome};
use crate::snake::{Direction, Snake};
use crate::Coords;

/// Breadth-first search from the head to `target`, treating a portal crossing
/// as a single step and blocks as walls. Returns the first step of a shortest
/// path, or `None` when the target cannot be reached.
///
/// The body is taken as it stands after this tick's shift and assumed not to
/// move further while searching.
pub fn plan_search(snake: &Snake, target: Coords, board: &Board) -> Option<StepOutcome> {
    let head = snake.head();
    if !board.contains(head) {
        return None;
    }

    let width = board.width() as usize;
    let index = |(x, y): Coords| (y - 1) as usize * width + (x - 1) as usize;

    let mut seen = vec![false; width * board.height() as usize];
    let mut queue = VecDeque::new();

    seen[index(head)] = true;
    queue.push_back((head, None));

    while let Some((pos, first)) = queue.pop_front() {
        for &dir in Direction::ALL.iter() {
            let step = commit(pos, dir, board);
            let next = match step {
                StepOutcome::Moved { new_head, .. } => new_head,
                StepOutcome::Stalled => continue,
            };

            if !board.contains(next) || seen[index(next)] || !is_open(next, snake, board) {
                continue;
            }
            seen[index(next)] = true;

            let first = first.unwrap_or(step);
            if next == target {
                return Some(first);
            }
            queue.push_back((next, Some(first)));
        }
    }

    None
}
