/// Pursuer AI — greedy axis-priority chase with a passability fallback chain.
///
/// For a pursuer at `g` chasing a player at `p`, with `dx = p.x - g.x` and
/// `dy = p.y - g.y`, candidates are tried in this order:
///
///   1. a step along the axis with the larger absolute delta
///      (ties go to the y axis),
///   2. a step along the other axis, if its delta is non-zero,
///   3. a diagonal step, only when both deltas are non-zero.
///
/// The first candidate that lands in-bounds on a tile a pursuer may enter
/// (and that no earlier pursuer claimed this tick) wins. No candidate →
/// stay put. Walls running across the chase axis therefore stall a pursuer,
/// which is what keeps levels solvable.

use super::grid::{Grid, Position};

/// Ordered unit-step deltas toward `to`, at most three.
pub fn plan_candidates(from: Position, to: Position) -> Vec<(i32, i32)> {
    let dx = to.x as i64 - from.x as i64;
    let dy = to.y as i64 - from.y as i64;
    let sx = dx.signum() as i32;
    let sy = dy.signum() as i32;

    let mut out = Vec::with_capacity(3);
    if dx.abs() > dy.abs() {
        out.push((sx, 0));
        if dy != 0 { out.push((0, sy)); }
    } else if dy != 0 {
        out.push((0, sy));
        if dx != 0 { out.push((sx, 0)); }
    } else if dx != 0 {
        out.push((sx, 0));
    }

    if dx != 0 && dy != 0 {
        out.push((sx, sy));
    }
    out
}

/// Pick the destination for a pursuer at `from`, or `None` to stay.
///
/// `claimed` holds destinations already decided by earlier pursuers in
/// the same tick; they block like a `Pursuer` tile would.
pub fn choose_step(
    grid: &Grid,
    from: Position,
    player: Position,
    claimed: &[Position],
) -> Option<Position> {
    plan_candidates(from, player).into_iter()
        .filter_map(|(dx, dy)| grid.offset(from, dx, dy))
        .find(|&next| {
            let open = grid.get(next).is_some_and(|t| !t.blocks_pursuer());
            open && !claimed.contains(&next)
        })
}
