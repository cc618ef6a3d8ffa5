//! Trapezoidal block construction for a single move.

use core::marker::PhantomData;

use uom::si::f64::{Acceleration, Length, Velocity};

use crate::coordinate::sqrt;
use crate::motion::Block;
use crate::planner::PlanError;

/// Slack for speed comparisons that should coincide exactly; it absorbs
/// kinematic back-substitution error and nothing more.
pub const SPEED_SLACK: Velocity = Velocity {
    dimension: PhantomData,
    units: PhantomData,
    value: 1e-9,
};

/// Fastest speed reachable from `speed` over `distance` at `acceleration`.
pub fn max_transition_speed(
    speed: Velocity,
    acceleration: Acceleration,
    distance: Length,
) -> Velocity {
    sqrt(speed * speed + 2.0 * acceleration * distance)
}

/// Build the accelerate/cruise/decelerate profile for one move.
///
/// `entry` and `exit` must already be mutually reachable over `distance`
/// at `acceleration` and sit under `max_speed`; the planner guarantees
/// that before calling. A violation here means the junction solver and
/// this builder disagree about physics, which is not recoverable, so it
/// surfaces as [`PlanError::InfeasibleProfile`] instead of being clamped
/// away.
pub fn build_blocks(
    distance: Length,
    entry: Velocity,
    exit: Velocity,
    acceleration: Acceleration,
    max_speed: Velocity,
) -> Result<(Block, Block, Block), PlanError> {
    let infeasible = || PlanError::InfeasibleProfile {
        distance,
        entry,
        exit,
    };

    if entry > max_speed + SPEED_SLACK || exit > max_speed + SPEED_SLACK {
        return Err(infeasible());
    }

    if distance <= Length::default() {
        if (entry - exit).abs() > SPEED_SLACK {
            return Err(infeasible());
        }
        let rest = Block {
            distance: Length::default(),
            initial_speed: entry,
            acceleration: Acceleration::default(),
        };
        return Ok((rest, rest, rest));
    }

    if exit > max_transition_speed(entry, acceleration, distance) + SPEED_SLACK
        || entry > max_transition_speed(exit, acceleration, distance) + SPEED_SLACK
    {
        return Err(infeasible());
    }

    // Absorb float spill above the cap; anything larger was rejected.
    let entry = if entry > max_speed { max_speed } else { entry };
    let exit = if exit > max_speed { max_speed } else { exit };

    let accelerate_distance = (max_speed * max_speed - entry * entry) / (2.0 * acceleration);
    let decelerate_distance = (max_speed * max_speed - exit * exit) / (2.0 * acceleration);

    Ok(if accelerate_distance + decelerate_distance <= distance {
        let cruise_distance = distance - accelerate_distance - decelerate_distance;
        (
            Block {
                distance: accelerate_distance,
                initial_speed: entry,
                acceleration,
            },
            Block {
                distance: cruise_distance,
                initial_speed: max_speed,
                acceleration: Acceleration::default(),
            },
            Block {
                distance: decelerate_distance,
                initial_speed: max_speed,
                acceleration: -acceleration,
            },
        )
    } else {
        // Too short for the full trapezoid: find the peak the distance
        // allows and drop the cruise phase.
        let peak = sqrt((entry * entry + exit * exit + 2.0 * acceleration * distance) / 2.0);
        let mut accelerate_distance = (peak * peak - entry * entry) / (2.0 * acceleration);
        if accelerate_distance < Length::default() {
            accelerate_distance = Length::default();
        }
        if accelerate_distance > distance {
            accelerate_distance = distance;
        }
        let decelerate_distance = distance - accelerate_distance;
        (
            Block {
                distance: accelerate_distance,
                initial_speed: entry,
                acceleration,
            },
            Block {
                distance: Length::default(),
                initial_speed: peak,
                acceleration: Acceleration::default(),
            },
            Block {
                distance: decelerate_distance,
                initial_speed: peak,
                acceleration: -acceleration,
            },
        )
    })
}
