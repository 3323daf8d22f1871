use crate::board::{Board, Portal};
use crate::route::Route;
use crate::snake::{Direction::{self, *}, Snake};
use crate::Coords;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// One cardinal step, or a step onto a portal approach that lands on the
    /// paired mouth (`crossed` names the portal entered).
    Moved { new_head: Coords, heading: Direction, crossed: Option<Portal> },
    /// All four neighbours are walls or body.
    Stalled,
}

const PORTAL_ESCAPE: [Direction; 4] = [Right, Left, Down, Up];

/// Picks exactly one step for the head, walking a fixed fallback ladder and
/// taking the first candidate that is passable and not covered by the body.
///
/// With a portal route the head closes the vertical gap to the waypoint
/// first, then the horizontal one, and escapes in any direction when both are
/// shut. Without one it heads for `target` directly, refusing a vertical step
/// into a one-cell gap between two blocks unless the target lies past them,
/// then backs off inside the fallback region, then escapes.
pub fn plan_step(snake: &Snake, route: &Route, target: Coords, board: &Board, fallback_bound: i16) -> StepOutcome {
    let head = snake.head();
    let open = |dir: Direction| is_open(dir.step_from(head), snake, board);

    let choice = if route.uses_portal() {
        toward_portal(head, route.waypoint, &open)
    } else {
        toward_target(head, target, board, fallback_bound, &open)
    };

    match choice {
        Some(dir) => commit(head, dir, board),
        None => StepOutcome::Stalled,
    }
}

pub fn is_open(cell: Coords, snake: &Snake, board: &Board) -> bool {
    board.is_passable(cell) && !snake.blocks(cell)
}

/// Turns a chosen direction into the new head, teleporting when the step
/// lands on a portal approach.
pub fn commit(head: Coords, dir: Direction, board: &Board) -> StepOutcome {
    let next = dir.step_from(head);

    match board.portal_at_approach(next) {
        Some(portal) => StepOutcome::Moved { new_head: board.mouth(portal.pair()), heading: dir, crossed: Some(portal) },
        None => StepOutcome::Moved { new_head: next, heading: dir, crossed: None },
    }
}

fn toward_portal(head: Coords, waypoint: Coords, open: &impl Fn(Direction) -> bool) -> Option<Direction> {
    let ((x, y), (wx, wy)) = (head, waypoint);

    first_open(&[(y < wy, Down), (y > wy, Up), (x < wx, Right), (x > wx, Left)], open)
        .or_else(|| PORTAL_ESCAPE.iter().copied().find(|dir| open(*dir)))
}

fn toward_target(
    head: Coords,
    target: Coords,
    board: &Board,
    fallback_bound: i16,
    open: &impl Fn(Direction) -> bool,
) -> Option<Direction> {
    let ((x, y), (tx, ty)) = (head, target);
    let (block_width, _) = board.block_size();

    let boxed_in_below = board.is_block((x - 1, y + 1)) && board.is_block((x + 1, y + 1));
    let boxed_in_above = board.is_block((x - 1, y - 1)) && board.is_block((x + 1, y - 1));
    let inside = |dir: Direction| within_fallback_region(head, dir, fallback_bound);

    let toward = [
        (y < ty && (!boxed_in_below || tx > x - block_width), Down),
        (y > ty && (!boxed_in_above || tx < x + block_width), Up),
        (x < tx, Right),
        (x > tx, Left),
    ];

    // Horizontal back-off moves away from the target on purpose
    let back_off = [
        (ty > y && inside(Down), Down),
        (ty < y && inside(Up), Up),
        (tx < x && inside(Right), Right),
        (tx > x && inside(Left), Left),
    ];

    let bounded = [(inside(Down), Down), (inside(Up), Up), (inside(Right), Right), (inside(Left), Left)];
    let escape = [(true, Down), (true, Up), (true, Right), (true, Left)];

    first_open(&toward, open)
        .or_else(|| first_open(&back_off, open))
        .or_else(|| first_open(&bounded, open))
        .or_else(|| first_open(&escape, open))
}

fn within_fallback_region(head: Coords, dir: Direction, bound: i16) -> bool {
    match dir {
        Down => head.1 < bound - 1,
        Up => head.1 > 0,
        Right => head.0 < bound - 1,
        Left => head.0 > 0,
    }
}

fn first_open(candidates: &[(bool, Direction)], open: &impl Fn(Direction) -> bool) -> Option<Direction> {
    candidates.iter()
        .find(|(wanted, dir)| *wanted && open(*dir))
        .map(|(_, dir)| *dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::route::{estimate, PortalBias};

    fn default_board() -> Board {
        Board::initialize(&SimConfig::default())
    }

    fn board_with_blocks(blocks: Vec<Coords>) -> Board {
        Board::initialize(&SimConfig { width: 30, height: 40, blocks, ..SimConfig::default() })
    }

    fn direct(target: Coords) -> Route {
        Route { waypoint: target, portal: None, cost: 0 }
    }

    fn moved(new_head: Coords, heading: Direction) -> StepOutcome {
        StepOutcome::Moved { new_head, heading, crossed: None }
    }

    #[test]
    fn start_position_heads_right_past_the_blocks() {
        let board = default_board();
        let snake = Snake::new((40, 20), 10, Right);
        let route = estimate(snake.head(), (75, 8), &board, PortalBias::Skewed);

        assert_eq!(plan_step(&snake, &route, (75, 8), &board, 10), moved((41, 20), Right));
    }

    #[test]
    fn direct_mode_prefers_vertical() {
        let board = default_board();
        let snake = Snake::new((10, 10), 3, Right);

        assert_eq!(plan_step(&snake, &direct((20, 30)), (20, 30), &board, 10), moved((10, 11), Down));
        assert_eq!(plan_step(&snake, &direct((20, 10)), (20, 10), &board, 10), moved((11, 10), Right));
    }

    #[test]
    fn refuses_gap_between_blocks_when_target_is_behind() {
        let board = board_with_blocks(vec![(10, 10), (16, 10)]);
        let snake = Snake::new((15, 9), 3, Down);

        // Column 15 is a one-cell gap between the two blocks
        assert!(board.is_passable((15, 10)));
        assert_eq!(plan_step(&snake, &direct((5, 30)), (5, 30), &board, 10), moved((14, 9), Left));

        // A target just past the blocks lets the snake take the gap
        assert_eq!(plan_step(&snake, &direct((12, 30)), (12, 30), &board, 10), moved((15, 10), Down));

        let open_board = board_with_blocks(vec![]);
        assert_eq!(plan_step(&snake, &direct((5, 30)), (5, 30), &open_board, 10), moved((15, 10), Down));
    }

    #[test]
    fn backs_off_away_from_a_blocked_target() {
        let board = board_with_blocks(vec![(11, 8)]);
        let snake = Snake::new((10, 10), 3, Up);

        assert_eq!(plan_step(&snake, &direct((20, 10)), (20, 10), &board, 10), moved((9, 10), Left));
    }

    #[test]
    fn fallback_region_is_bounded() {
        let board = board_with_blocks(vec![(11, 18)]);
        let snake = Snake::new((10, 20), 3, Right);

        // Right is a block, left is body, both vertical cells are free
        assert_eq!(plan_step(&snake, &direct((20, 20)), (20, 20), &board, 10), moved((10, 19), Up));
        assert_eq!(plan_step(&snake, &direct((20, 20)), (20, 20), &board, 30), moved((10, 21), Down));
    }

    #[test]
    fn refuses_upward_gap_unless_target_is_short_of_the_blocks() {
        let board = board_with_blocks(vec![(10, 20), (16, 20)]);
        let snake = Snake::new((15, 25), 3, Up);

        // Both upper diagonals are blocks, column 15 runs between them
        assert!(board.is_block((14, 24)) && board.is_block((16, 24)));
        assert!(board.is_passable((15, 24)));
        assert_eq!(plan_step(&snake, &direct((25, 5)), (25, 5), &board, 10), moved((16, 25), Right));
        assert_eq!(plan_step(&snake, &direct((18, 5)), (18, 5), &board, 10), moved((15, 24), Up));
    }

    #[test]
    fn escapes_outside_the_fallback_region() {
        let board = default_board();
        // Up and left are body, the target lies up and to the left
        let snake = Snake::from_segments(vec![(10, 10), (9, 10), (9, 9), (10, 9), (11, 9)], Left);

        // Inside the region the snake backs off to the right
        assert_eq!(plan_step(&snake, &direct((5, 5)), (5, 5), &board, 30), moved((11, 10), Right));
        // Outside it only the last rung is left, which tries down first
        assert_eq!(plan_step(&snake, &direct((5, 5)), (5, 5), &board, 5), moved((10, 11), Down));
    }

    #[test]
    fn portal_mode_walks_into_the_mouth() {
        let board = default_board();
        let snake = Snake::new((3, 20), 3, Left);
        let route = estimate(snake.head(), (78, 20), &board, PortalBias::Skewed);

        assert_eq!(route.portal, Some(Portal::Left));
        assert_eq!(plan_step(&snake, &route, (78, 20), &board, 10), moved((2, 20), Left));
    }

    #[test]
    fn stepping_past_the_mouth_teleports() {
        let board = default_board();
        let snake = Snake::from_segments(vec![(1, 20), (2, 20), (3, 20)], Left);
        let route = estimate(snake.head(), (78, 20), &board, PortalBias::Skewed);

        assert_eq!(
            plan_step(&snake, &route, (78, 20), &board, 10),
            StepOutcome::Moved { new_head: (80, 20), heading: Left, crossed: Some(Portal::Left) }
        );
    }

    #[test]
    fn portal_mode_escapes_when_blocked() {
        let board = default_board();
        let snake = Snake::from_segments(vec![(2, 19), (2, 20), (3, 20)], Up);
        let route = Route { waypoint: (0, 20), portal: Some(Portal::Left), cost: 0 };

        // Down is body, left is border: first escape is right
        assert_eq!(plan_step(&snake, &route, (78, 20), &board, 10), moved((3, 19), Right));
    }

    #[test]
    fn tail_cell_counts_as_free() {
        let board = default_board();
        let snake = Snake::from_segments(vec![(10, 10), (10, 11), (11, 11), (11, 10)], Up);

        // (11, 10) is the tail and moves away this tick
        assert_eq!(plan_step(&snake, &direct((20, 10)), (20, 10), &board, 10), moved((11, 10), Right));
    }

    #[test]
    fn enclosed_head_stalls() {
        let board = default_board();
        // Border above, own body on the other three sides
        let coiled = vec![
            (20, 2), (21, 2), (21, 3), (20, 3), (19, 3),
            (19, 2), (18, 2), (17, 2), (16, 2), (15, 2),
        ];
        let snake = Snake::from_segments(coiled, Left);

        assert_eq!(plan_step(&snake, &direct((75, 8)), (75, 8), &board, 10), StepOutcome::Stalled);

        let route = Route { waypoint: (0, 20), portal: Some(Portal::Left), cost: 0 };
        assert_eq!(plan_step(&snake, &route, (75, 8), &board, 10), StepOutcome::Stalled);
    }
}
