//! Selection of tick boundaries whose fee growth must be refreshed after a swap.
//!
//! When the active tick moves, every initialized boundary it crossed had its
//! fee-growth-outside values flipped on chain. The sweep walks the boundaries
//! between the old and new tick, one tick spacing at a time, and gives up when
//! the move spans more than [`MAX_TICK_CROSSINGS`] spacings.

/// Largest move, in tick spacings, that is swept.
pub const MAX_TICK_CROSSINGS: i64 = 100;

/// Tick indices to resync after a swap moved the active tick from `old_tick`
/// to `new_tick`, in the order they should be visited.
///
/// The list starts with `new_tick` when it lies on a boundary, followed by the
/// crossed boundaries walking from `old_tick` toward `new_tick`. An index is
/// listed once. Callers resync only indices that have a stored record.
pub fn ticks_to_resync(old_tick: Option<i32>, new_tick: i32, tick_spacing: i32) -> Vec<i32> {
    let mut ticks = Vec::new();
    if tick_spacing <= 0 {
        return ticks;
    }
    if new_tick.rem_euclid(tick_spacing) == 0 {
        ticks.push(new_tick);
    }

    let Some(old_tick) = old_tick else {
        return ticks;
    };
    for idx in crossed_boundaries(old_tick, new_tick, tick_spacing) {
        if !ticks.contains(&idx) {
            ticks.push(idx);
        }
    }
    ticks
}

/// Whole tick spacings between two ticks (integer division).
pub fn crossing_steps(old_tick: i32, new_tick: i32, tick_spacing: i32) -> i64 {
    if tick_spacing <= 0 {
        return 0;
    }
    (i64::from(old_tick) - i64::from(new_tick)).abs() / i64::from(tick_spacing)
}

/// Boundaries crossed moving from `old_tick` to `new_tick`, empty when the
/// ticks are equal or the move exceeds [`MAX_TICK_CROSSINGS`] spacings.
pub fn crossed_boundaries(old_tick: i32, new_tick: i32, tick_spacing: i32) -> Vec<i32> {
    let (old, new, spacing) = (
        i64::from(old_tick),
        i64::from(new_tick),
        i64::from(tick_spacing),
    );
    if old == new || spacing <= 0 {
        return Vec::new();
    }
    if crossing_steps(old_tick, new_tick, tick_spacing) > MAX_TICK_CROSSINGS {
        return Vec::new();
    }

    let mut crossed = Vec::new();
    if new > old {
        let first = old + 1;
        let mut idx = first + (spacing - first.rem_euclid(spacing)) % spacing;
        while idx <= new {
            crossed.push(idx);
            idx += spacing;
        }
    } else {
        let mut idx = old - old.rem_euclid(spacing);
        while idx >= new {
            crossed.push(idx);
            idx -= spacing;
        }
    }

    // Every pushed index lies between two i32 ticks.
    crossed
        .into_iter()
        .filter_map(|idx| i32::try_from(idx).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upward_move_within_one_spacing() {
        assert_eq!(crossed_boundaries(100, 130, 60), vec![120]);
        assert_eq!(ticks_to_resync(Some(100), 130, 60), vec![120]);
    }

    #[test]
    fn test_upward_move_landing_on_boundary() {
        assert_eq!(crossed_boundaries(100, 240, 60), vec![120, 180, 240]);
        // The landing boundary is listed first and only once.
        assert_eq!(ticks_to_resync(Some(100), 240, 60), vec![240, 120, 180]);
    }

    #[test]
    fn test_upward_from_boundary_excludes_start() {
        assert_eq!(crossed_boundaries(120, 170, 60), Vec::<i32>::new());
        assert_eq!(crossed_boundaries(120, 180, 60), vec![180]);
    }

    #[test]
    fn test_downward_move_includes_start_boundary() {
        assert_eq!(crossed_boundaries(130, 100, 60), vec![120]);
        assert_eq!(crossed_boundaries(120, 60, 60), vec![120, 60]);
    }

    #[test]
    fn test_negative_ticks() {
        assert_eq!(crossed_boundaries(-10, -130, 60), vec![-60, -120]);
        assert_eq!(crossed_boundaries(-130, -10, 60), vec![-120, -60]);
    }

    #[test]
    fn test_equal_ticks_do_not_sweep() {
        assert!(crossed_boundaries(60, 60, 60).is_empty());
        assert_eq!(ticks_to_resync(Some(60), 60, 60), vec![60]);
        assert!(ticks_to_resync(Some(61), 61, 60).is_empty());
    }

    #[test]
    fn test_move_beyond_ceiling_is_skipped() {
        // 101 spacings.
        assert!(crossed_boundaries(0, 6060, 60).is_empty());
        assert!(ticks_to_resync(Some(1), 6061, 60).is_empty());
        // Exactly 100 spacings is still swept.
        assert_eq!(crossed_boundaries(0, 6000, 60).len(), 100);
    }

    #[test]
    fn test_crossing_steps_truncates() {
        assert_eq!(crossing_steps(100, 130, 60), 0);
        assert_eq!(crossing_steps(130, -130, 60), 4);
        assert_eq!(crossing_steps(0, 6060, 60), 101);
    }

    #[test]
    fn test_unknown_old_tick_checks_only_landing_boundary() {
        assert_eq!(ticks_to_resync(None, 600, 200), vec![600]);
        assert!(ticks_to_resync(None, 601, 200).is_empty());
    }

    #[test]
    fn test_extreme_ticks_stay_in_range() {
        let crossed = crossed_boundaries(887_220, 887_272, 1);
        assert_eq!(crossed.len(), 52);
        assert_eq!(crossed.last(), Some(&887_272));
    }
}
