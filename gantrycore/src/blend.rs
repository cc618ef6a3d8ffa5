//! Junction speed solving: how fast two neighbouring moves may share their
//! boundary.

use uom::si::f64::{Length, Velocity};

use crate::constraint::SystemConstraints;
use crate::motion::Move;

/// Fastest speed `current` may carry at its start, given the move before
/// it.
///
/// Every axis in motion on either side of the junction imposes its
/// permitted speed discontinuity: the direction-change allowance when the
/// axis truly reverses, the plain allowance otherwise. Axes at rest on
/// both sides impose nothing, and the move's own speed cap applies on top.
/// With no previous move, or a zero-distance one, the start counts as
/// direction-continuous on every axis.
pub fn find_initial_speed(
    constraints: &SystemConstraints,
    current: &Move,
    previous: Option<&Move>,
) -> Velocity {
    junction_limit(constraints, current, previous)
}

/// Mirror of [`find_initial_speed`] for the end of `current`.
pub fn find_final_speed(
    constraints: &SystemConstraints,
    current: &Move,
    next: Option<&Move>,
) -> Velocity {
    junction_limit(constraints, current, next)
}

fn junction_limit(
    constraints: &SystemConstraints,
    current: &Move,
    neighbour: Option<&Move>,
) -> Velocity {
    // A zero-distance neighbour has no direction of its own, so it can
    // never force the reversal allowance.
    let neighbour = neighbour
        .filter(|candidate| candidate.distance > Length::default())
        .map(|candidate| &candidate.unit_vector);

    let mut speed = current.max_speed;
    for (axis, limits) in constraints.iter() {
        let own = current.unit_vector[axis];
        let other = neighbour.map_or(0.0, |unit_vector| unit_vector[axis]);
        if own == 0.0 && other == 0.0 {
            continue;
        }
        let limit = if own * other < 0.0 {
            limits.max_direction_change_speed_discontinuity
        } else {
            limits.max_speed_discontinuity
        };
        if limit < speed {
            speed = limit;
        }
    }
    speed
}
