use crate::config::SimConfig;
use crate::Coords;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CellKind {
    Empty,
    Border,
    Block,
    Apple,
    BodySegment,
    Head,
}

/// One of the four border gaps. Entering a portal exits through its pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Portal {
    Left,
    Right,
    Top,
    Bottom,
}

impl Portal {
    pub const ALL: [Portal; 4] = [Portal::Left, Portal::Right, Portal::Top, Portal::Bottom];

    pub fn pair(self) -> Portal {
        match self {
            Portal::Left => Portal::Right,
            Portal::Right => Portal::Left,
            Portal::Top => Portal::Bottom,
            Portal::Bottom => Portal::Top,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Portal::Left => "left",
            Portal::Right => "right",
            Portal::Top => "top",
            Portal::Bottom => "bottom",
        }
    }
}

/// Static layout: border ring with four portal gaps, fixed blocks, and the
/// active apple overlaid on top. Coordinates are 1-indexed, `1..=width` and
/// `1..=height`.
pub struct Board {
    width: i16,
    height: i16,
    blocks: Vec<Coords>,
    block_size: (i16, i16),
    cells: Vec<CellKind>,
}

impl Board {
    pub fn initialize(config: &SimConfig) -> Self {
        let (width, height) = (config.width, config.height);
        let cells = vec![CellKind::Empty; width.max(0) as usize * height.max(0) as usize];

        let mut board = Board {
            width,
            height,
            blocks: config.blocks.clone(),
            block_size: config.block_size,
            cells,
        };

        for x in 1..=width {
            board.set((x, 1), CellKind::Border);
            board.set((x, height), CellKind::Border);
        }
        for y in 1..=height {
            board.set((1, y), CellKind::Border);
            board.set((width, y), CellKind::Border);
        }

        for portal in Portal::ALL.iter() {
            board.set(board.mouth(*portal), CellKind::Empty);
        }

        let (bw, bh) = board.block_size;
        for &(bx, by) in config.blocks.iter() {
            for x in bx..bx + bw {
                for y in by..by + bh {
                    board.set((x, y), CellKind::Block);
                }
            }
        }

        board
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn block_size(&self) -> (i16, i16) {
        self.block_size
    }

    pub fn contains(&self, pos: Coords) -> bool {
        pos.0 >= 1 && pos.1 >= 1 && pos.0 <= self.width && pos.1 <= self.height
    }

    /// The border cell left open for `portal`.
    pub fn mouth(&self, portal: Portal) -> Coords {
        match portal {
            Portal::Left => (1, self.height / 2),
            Portal::Right => (self.width, self.height / 2),
            Portal::Top => (self.width / 2, 1),
            Portal::Bottom => (self.width / 2, self.height),
        }
    }

    /// The off-board cell just past `portal`'s mouth. Stepping onto it means
    /// crossing the portal.
    pub fn approach(&self, portal: Portal) -> Coords {
        match portal {
            Portal::Left => (0, self.height / 2),
            Portal::Right => (self.width + 1, self.height / 2),
            Portal::Top => (self.width / 2, 0),
            Portal::Bottom => (self.width / 2, self.height + 1),
        }
    }

    pub fn portal_at_mouth(&self, pos: Coords) -> Option<Portal> {
        Portal::ALL.iter().copied().find(|p| self.mouth(*p) == pos)
    }

    pub fn portal_at_approach(&self, pos: Coords) -> Option<Portal> {
        Portal::ALL.iter().copied().find(|p| self.approach(*p) == pos)
    }

    /// Off-board cells read as `Border`, except the four portal approaches.
    pub fn cell_kind(&self, pos: Coords) -> CellKind {
        match self.index(pos) {
            Some(i) => self.cells[i],
            None if self.portal_at_approach(pos).is_some() => CellKind::Empty,
            None => CellKind::Border,
        }
    }

    pub fn is_passable(&self, pos: Coords) -> bool {
        !matches!(self.cell_kind(pos), CellKind::Border | CellKind::Block)
    }

    /// Rectangle-membership test against the configured blocks.
    pub fn is_block(&self, pos: Coords) -> bool {
        let (bw, bh) = self.block_size;
        self.blocks.iter().any(|&(bx, by)| {
            pos.0 >= bx && pos.0 < bx + bw && pos.1 >= by && pos.1 < by + bh
        })
    }

    pub fn place_apple(&mut self, pos: Coords) {
        if self.cell_kind(pos) == CellKind::Empty {
            self.set(pos, CellKind::Apple);
        }
    }

    pub fn remove_apple(&mut self, pos: Coords) {
        if self.cell_kind(pos) == CellKind::Apple {
            self.set(pos, CellKind::Empty);
        }
    }

    /// Every on-board cell that is neither Empty nor Apple, for drawing.
    pub fn walls(&self) -> impl Iterator<Item = (Coords, CellKind)> + '_ {
        self.positions()
            .map(move |pos| (pos, self.cell_kind(pos)))
            .filter(|(_, kind)| matches!(kind, CellKind::Border | CellKind::Block))
    }

    /// Empty interior cells, row by row. Portal mouths are not included.
    pub fn free_cells(&self) -> impl Iterator<Item = Coords> + '_ {
        self.positions()
            .filter(move |&(x, y)| x > 1 && y > 1 && x < self.width && y < self.height)
            .filter(move |&pos| self.cell_kind(pos) == CellKind::Empty)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn positions(&self) -> impl Iterator<Item = Coords> {
        let (width, height) = (self.width, self.height);
        (1..=height).flat_map(move |y| (1..=width).map(move |x| (x, y)))
    }

    fn index(&self, pos: Coords) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.1 - 1) as usize * self.width as usize + (pos.0 - 1) as usize)
        } else {
            None
        }
    }

    fn set(&mut self, pos: Coords, kind: CellKind) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_board() -> Board {
        Board::initialize(&SimConfig::default())
    }

    #[test]
    fn portals_sit_at_edge_midpoints() {
        let board = default_board();

        assert_eq!(board.mouth(Portal::Left), (1, 20));
        assert_eq!(board.mouth(Portal::Right), (80, 20));
        assert_eq!(board.mouth(Portal::Top), (40, 1));
        assert_eq!(board.mouth(Portal::Bottom), (40, 40));
        assert_eq!(board.approach(Portal::Right), (81, 20));
        assert_eq!(board.approach(Portal::Top), (40, 0));

        for portal in Portal::ALL.iter() {
            assert_eq!(portal.pair().pair(), *portal);
            assert!(board.is_passable(board.mouth(*portal)));
            assert!(board.is_passable(board.approach(*portal)));
        }
    }

    #[test]
    fn passability_matches_border_ring_and_blocks() {
        let config = SimConfig::default();
        let board = Board::initialize(&config);
        let (bw, bh) = config.block_size;

        for x in -1..=82 {
            for y in -1..=42 {
                let pos = (x, y);
                let on_ring = board.contains(pos) && (x == 1 || y == 1 || x == 80 || y == 40);
                let is_gap = board.portal_at_mouth(pos).is_some();
                let in_block = config.blocks.iter()
                    .any(|&(bx, by)| x >= bx && x < bx + bw && y >= by && y < by + bh);
                let off_board = !board.contains(pos) && board.portal_at_approach(pos).is_none();

                let blocked = (on_ring && !is_gap) || in_block || off_board;
                assert_eq!(board.is_passable(pos), !blocked, "cell {:?}", pos);
                assert_eq!(board.is_block(pos), in_block, "cell {:?}", pos);
            }
        }
    }

    #[test]
    fn apples_overlay_empty_cells_only() {
        let mut board = default_board();

        board.place_apple((10, 10));
        assert_eq!(board.cell_kind((10, 10)), CellKind::Apple);
        assert!(board.is_passable((10, 10)));

        board.remove_apple((10, 10));
        assert_eq!(board.cell_kind((10, 10)), CellKind::Empty);

        board.place_apple((40, 23));
        assert_eq!(board.cell_kind((40, 23)), CellKind::Block);
    }

    #[test]
    fn free_cells_skip_walls_and_portals() {
        let board = default_board();
        let free: Vec<Coords> = board.free_cells().collect();

        // 78x38 interior minus six 5x5 blocks
        assert_eq!(free.len(), 78 * 38 - 6 * 25);
        assert!(!free.contains(&(1, 20)));
        assert!(!free.contains(&(40, 17)));

        let walls = board.walls().count();
        assert_eq!(walls, 80 * 40 - 78 * 38 - 4 + 6 * 25);
    }
}
