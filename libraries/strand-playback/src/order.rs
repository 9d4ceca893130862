//! Next/previous track selection
//!
//! Pure functions over the listing length, the active index and the shuffle
//! order. `None` means there is no valid index to move to.

/// Shuffle state consulted by the ordering functions
#[derive(Debug, Clone, Copy)]
pub enum TrackOrder<'a> {
    /// Walk the listing in order, wrapping at both ends
    Sequential,

    /// Walk the given permutation of indices
    Shuffled(&'a [usize]),
}

/// Index to play after `current`
pub fn next_index(count: usize, current: Option<usize>, ordering: TrackOrder<'_>) -> Option<usize> {
    if count == 0 {
        return None;
    }

    match ordering {
        TrackOrder::Sequential => Some(match current {
            Some(index) => (index + 1) % count,
            None => 0,
        }),
        TrackOrder::Shuffled(order) => {
            if order.is_empty() {
                return None;
            }
            match position_in(order, current) {
                Some(pos) => Some(order[(pos + 1) % order.len()]),
                None => Some(order[0]),
            }
        }
    }
}

/// Index to play before `current`
pub fn previous_index(
    count: usize,
    current: Option<usize>,
    ordering: TrackOrder<'_>,
) -> Option<usize> {
    if count == 0 {
        return None;
    }

    match ordering {
        TrackOrder::Sequential => Some(match current {
            Some(index) if index > 0 => index - 1,
            _ => count - 1,
        }),
        TrackOrder::Shuffled(order) => {
            let last = order.len().checked_sub(1)?;
            match position_in(order, current) {
                Some(pos) if pos > 0 => Some(order[pos - 1]),
                _ => Some(order[last]),
            }
        }
    }
}

/// Position of the active index inside the shuffle order, found by value
fn position_in(order: &[usize], current: Option<usize>) -> Option<usize> {
    let current = current?;
    order.iter().position(|&index| index == current)
}
