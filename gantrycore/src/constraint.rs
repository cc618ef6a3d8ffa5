//! Per-axis mechanical limits and their reduction to per-move scalars.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use uom::si::f64::{Acceleration, Velocity};

use crate::coordinate::{Axis, AxisMap};
use crate::planner::PlanError;

/// Mechanical limits of one axis.
///
/// The speed discontinuities are the largest instantaneous speed changes
/// the axis tolerates without a deceleration phase; a reversal has its own
/// allowance, and neither ordering between the two is assumed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct AxisConstraints {
    pub max_acceleration: Acceleration,
    pub max_speed_discontinuity: Velocity,
    pub max_direction_change_speed_discontinuity: Velocity,
}

/// Limits for every axis the planner may drive, loaded once from machine
/// configuration and read-only for the session.
pub type SystemConstraints = AxisMap<AxisConstraints>;

impl AxisMap<AxisConstraints> {
    /// Reject tables that cannot bound any motion before planning starts.
    pub fn validate(&self) -> Result<(), PlanError> {
        fn positive(value: f64) -> bool {
            value > 0.0 && value.is_finite()
        }

        for (axis, limits) in self.iter() {
            if !positive(limits.max_acceleration.value)
                || !positive(limits.max_speed_discontinuity.value)
                || !positive(limits.max_direction_change_speed_discontinuity.value)
            {
                return Err(PlanError::Constraint { axis });
            }
        }
        Ok(())
    }

    /// Largest path acceleration that keeps every moving axis inside its
    /// own limit: each axis allows `max_acceleration` divided by its share
    /// of the direction vector, and the tightest axis wins.
    pub fn acceleration_limit(&self, unit_vector: &AxisMap<f64>) -> Acceleration {
        let mut limit: Option<Acceleration> = None;
        for (axis, limits) in self.iter() {
            let share = unit_vector[axis].abs();
            if share == 0.0 {
                continue;
            }
            let candidate = limits.max_acceleration / share;
            if limit.map_or(true, |current| candidate < current) {
                limit = Some(candidate);
            }
        }
        // A zero-distance move has no moving axis and its blocks never
        // accelerate; any positive value serves.
        limit.unwrap_or_else(|| {
            let mut fallback = self[Axis::X].max_acceleration;
            for (_, limits) in self.iter() {
                if limits.max_acceleration < fallback {
                    fallback = limits.max_acceleration;
                }
            }
            fallback
        })
    }
}
