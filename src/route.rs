use clap::ValueEnum;

use crate::board::{Board, Portal};
use crate::Coords;

/// Per-portal offset added to the via-portal cost.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PortalBias {
    /// left -1, right +1, top +1, bottom -1
    Skewed,
    /// No offset on any portal
    Symmetric,
}

impl PortalBias {
    pub fn offset(self, portal: Portal) -> i32 {
        match self {
            PortalBias::Symmetric => 0,
            PortalBias::Skewed => match portal {
                Portal::Left | Portal::Bottom => -1,
                Portal::Right | Portal::Top => 1,
            },
        }
    }
}

/// Where the head should aim this tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Route {
    pub waypoint: Coords,
    /// The portal to enter, if going through one is cheaper than going direct.
    pub portal: Option<Portal>,
    pub cost: i32,
}

impl Route {
    pub fn uses_portal(&self) -> bool {
        self.portal.is_some()
    }
}

pub fn manhattan(a: Coords, b: Coords) -> i32 {
    (a.0 as i32 - b.0 as i32).abs() + (a.1 as i32 - b.1 as i32).abs()
}

/// Picks the cheaper of going straight to `target` or through one of the
/// four portals. Blocks are not taken into account.
///
/// Candidates are compared in the order direct, left, right, top, bottom and
/// a later one only wins on a strictly lower cost.
pub fn estimate(head: Coords, target: Coords, board: &Board, bias: PortalBias) -> Route {
    let mut best = Route { waypoint: target, portal: None, cost: manhattan(head, target) };

    for &portal in Portal::ALL.iter() {
        let cost = manhattan(head, board.mouth(portal))
            + manhattan(board.mouth(portal.pair()), target)
            + bias.offset(portal);

        if cost < best.cost {
            best = Route { waypoint: board.approach(portal), portal: Some(portal), cost };
        }
    }

    best
}
