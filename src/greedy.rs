//! The simpler driving variant: a greedy larger-axis direction chooser, and a
//! single ordered list of teleport rules applied to the raw step.

use crate::board::{Board, Portal};
use crate::snake::{Direction::{self, *}, Snake};
use crate::Coords;

/// Steps along the axis with the larger gap to `target`, switching axis when
/// the next cell is a block.
///
/// If the other axis is blocked too the chooser switches back and returns the
/// original (blocked) direction, so the snake can be driven into a block.
pub fn choose_direction(head: Coords, target: Coords, board: &Board) -> Direction {
    let dx = target.0 - head.0;
    let dy = target.1 - head.1;

    let horizontal = if dx > 0 { Right } else { Left };
    let vertical = if dy > 0 { Down } else { Up };
    let other_axis = |dir: Direction| if dir.is_vertical() { horizontal } else { vertical };

    let first = if dx.abs() > dy.abs() { horizontal } else { vertical };
    if !board.is_block(first.step_from(head)) {
        return first;
    }

    let second = other_axis(first);
    if !board.is_block(second.step_from(head)) {
        return second;
    }

    other_axis(second)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TeleportRule {
    /// Past a portal's mouth: come out of the paired mouth.
    Beyond(Portal),
    /// On a portal's mouth: come out of the paired mouth.
    Mouth(Portal),
    /// Off the board on one side: reappear on the opposite edge.
    Wrap(Side),
}

impl TeleportRule {
    pub fn name(&self) -> String {
        match self {
            TeleportRule::Beyond(portal) => format!("beyond-{}", portal.name()),
            TeleportRule::Mouth(portal) => format!("mouth-{}", portal.name()),
            TeleportRule::Wrap(side) => format!("wrap-{}", side.name()),
        }
    }

    pub fn apply(&self, pos: Coords, board: &Board) -> Option<Coords> {
        let (width, height) = (board.width(), board.height());

        match *self {
            TeleportRule::Beyond(portal) if pos == board.approach(portal) => Some(board.mouth(portal.pair())),
            TeleportRule::Mouth(portal) if board.portal_at_mouth(pos) == Some(portal) => Some(board.mouth(portal.pair())),
            TeleportRule::Wrap(Side::Left) if pos.0 < 1 => Some((width, pos.1)),
            TeleportRule::Wrap(Side::Right) if pos.0 > width => Some((1, pos.1)),
            TeleportRule::Wrap(Side::Top) if pos.1 < 1 => Some((pos.0, height)),
            TeleportRule::Wrap(Side::Bottom) if pos.1 > height => Some((pos.0, 1)),
            _ => None,
        }
    }
}

/// Teleport rules in priority order. Evaluated once per tick, first match
/// wins, and the result is never fed back into the list.
pub struct TeleportRules {
    rules: Vec<TeleportRule>,
}

impl TeleportRules {
    /// Portal approaches, then portal mouths, then plain wraparound.
    pub fn standard() -> Self {
        let mut rules: Vec<TeleportRule> = Portal::ALL.iter().map(|p| TeleportRule::Beyond(*p)).collect();
        rules.extend(Portal::ALL.iter().map(|p| TeleportRule::Mouth(*p)));
        rules.extend([Side::Left, Side::Right, Side::Top, Side::Bottom].iter().map(|s| TeleportRule::Wrap(*s)));

        TeleportRules { rules }
    }

    pub fn rules(&self) -> &[TeleportRule] {
        &self.rules
    }

    pub fn resolve(&self, pos: Coords, board: &Board) -> (Coords, Option<TeleportRule>) {
        self.rules.iter()
            .find_map(|rule| rule.apply(pos, board).map(|to| (to, Some(*rule))))
            .unwrap_or((pos, None))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GreedyOutcome {
    Moved { new_head: Coords, heading: Direction, rule: Option<TeleportRule> },
    /// The resolved cell is a wall, a block, or the body.
    Crashed { at: Coords },
}

/// Moves one cell along `heading`, resolves teleports, then checks the landing
/// cell.
pub fn advance(snake: &Snake, heading: Direction, board: &Board, rules: &TeleportRules) -> GreedyOutcome {
    let (new_head, rule) = rules.resolve(heading.step_from(snake.head()), board);

    if !board.is_passable(new_head) || snake.blocks(new_head) {
        GreedyOutcome::Crashed { at: new_head }
    } else {
        GreedyOutcome::Moved { new_head, heading, rule }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn default_board() -> Board {
        Board::initialize(&SimConfig::default())
    }

    #[test]
    fn follows_the_larger_gap() {
        let board = default_board();

        assert_eq!(choose_direction((40, 20), (75, 8), &board), Right);
        assert_eq!(choose_direction((10, 10), (12, 30), &board), Down);
        // Equal gaps go vertical, a zero vertical gap counts as up
        assert_eq!(choose_direction((10, 10), (5, 15), &board), Down);
        assert_eq!(choose_direction((10, 10), (10, 10), &board), Up);
    }

    #[test]
    fn switches_axis_in_front_of_a_block() {
        let board = default_board();

        // (38, 17) belongs to the (38, 15) block
        assert_eq!(choose_direction((37, 17), (60, 17), &board), Up);
    }

    #[test]
    fn returns_blocked_direction_when_both_axes_are_blocked() {
        let board = Board::initialize(&SimConfig { blocks: vec![(10, 10), (5, 15)], ..SimConfig::default() });

        // Right of (9, 14) is the first block, below it the second
        assert!(board.is_block((10, 14)) && board.is_block((9, 15)));
        assert_eq!(choose_direction((9, 14), (20, 30), &board), Down);
    }

    #[test]
    fn each_rule_fires_on_its_own_cells() {
        let board = default_board();

        let cases = [
            (TeleportRule::Beyond(Portal::Left), (0, 20), Some((80, 20))),
            (TeleportRule::Beyond(Portal::Right), (81, 20), Some((1, 20))),
            (TeleportRule::Beyond(Portal::Top), (40, 0), Some((40, 40))),
            (TeleportRule::Beyond(Portal::Bottom), (40, 41), Some((40, 1))),
            (TeleportRule::Beyond(Portal::Left), (0, 19), None),
            (TeleportRule::Mouth(Portal::Left), (1, 20), Some((80, 20))),
            (TeleportRule::Mouth(Portal::Top), (40, 1), Some((40, 40))),
            (TeleportRule::Mouth(Portal::Top), (41, 1), None),
            (TeleportRule::Wrap(Side::Left), (0, 5), Some((80, 5))),
            (TeleportRule::Wrap(Side::Right), (81, 5), Some((1, 5))),
            (TeleportRule::Wrap(Side::Top), (5, 0), Some((5, 40))),
            (TeleportRule::Wrap(Side::Bottom), (5, 41), Some((5, 1))),
            (TeleportRule::Wrap(Side::Bottom), (5, 40), None),
        ];

        for &(rule, from, expected) in cases.iter() {
            assert_eq!(rule.apply(from, &board), expected, "{} from {:?}", rule.name(), from);
        }
    }

    #[test]
    fn rules_resolve_in_priority_order() {
        let board = default_board();
        let rules = TeleportRules::standard();

        assert_eq!(rules.rules().len(), 12);
        assert_eq!(rules.rules()[0].name(), "beyond-left");
        assert_eq!(rules.rules()[11].name(), "wrap-bottom");

        // (0, 20) is both past the left mouth and off the left side
        assert_eq!(rules.resolve((0, 20), &board), ((80, 20), Some(TeleportRule::Beyond(Portal::Left))));
        assert_eq!(rules.resolve((40, 41), &board), ((40, 1), Some(TeleportRule::Beyond(Portal::Bottom))));
        assert_eq!(rules.resolve((80, 20), &board), ((1, 20), Some(TeleportRule::Mouth(Portal::Right))));
        assert_eq!(rules.resolve((0, 7), &board), ((80, 7), Some(TeleportRule::Wrap(Side::Left))));
        assert_eq!(rules.resolve((12, 12), &board), ((12, 12), None));
    }

    #[test]
    fn advance_teleports_through_a_mouth() {
        let board = default_board();
        let rules = TeleportRules::standard();
        let snake = Snake::new((2, 20), 3, Left);

        assert_eq!(
            advance(&snake, Left, &board, &rules),
            GreedyOutcome::Moved { new_head: (80, 20), heading: Left, rule: Some(TeleportRule::Mouth(Portal::Left)) }
        );
    }

    #[test]
    fn advance_crashes_into_walls_and_body() {
        let board = default_board();
        let rules = TeleportRules::standard();

        let snake = Snake::new((2, 5), 3, Left);
        assert_eq!(advance(&snake, Left, &board, &rules), GreedyOutcome::Crashed { at: (1, 5) });

        let snake = Snake::new((37, 17), 3, Right);
        assert_eq!(advance(&snake, Right, &board, &rules), GreedyOutcome::Crashed { at: (38, 17) });

        let snake = Snake::from_segments(vec![(10, 10), (11, 10), (11, 11), (10, 11), (9, 11)], Up);
        assert_eq!(advance(&snake, Down, &board, &rules), GreedyOutcome::Crashed { at: (10, 11) });
    }
}
