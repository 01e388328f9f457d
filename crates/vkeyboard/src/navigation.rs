use crate::geom::{Direction, Rect};

/// Find the key to select when moving from `current` in `direction`.
///
/// Candidates are the keys whose centre lies strictly beyond the current
/// centre in the requested direction. The candidate with the nearest centre
/// wins; equal distances go to the earliest key in reading order. `rects` is
/// the key set in reading order and the result indexes into it.
pub fn find_target(current: usize, direction: Direction, rects: &[Rect]) -> Option<usize> {
    let from = rects.get(current)?.center();
    rects
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != current)
        .filter(|(_, r)| {
            let c = r.center();
            match direction {
                Direction::Right => c.x > from.x,
                Direction::Left => c.x < from.x,
                Direction::Down => c.y > from.y,
                Direction::Up => c.y < from.y,
            }
        })
        .min_by_key(|(i, r)| (r.center().distance_sq(from), *i))
        .map(|(i, _)| i)
}
