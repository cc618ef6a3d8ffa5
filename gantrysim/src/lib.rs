//! Fixed-period execution of planned moves.
//!
//! This walks a plan the way the downstream move-group runner does:
//! block by block, sliced into constant-period setpoints, with positions
//! recovered through each move's unit vector. Tests use the recorded
//! trace to check that a plan honours the limits it was built against.

use typed_builder::TypedBuilder;
use uom::si::f64::{Acceleration, Length, Time, Velocity};

use gantrycore::coordinate::{Axis, AxisMap, Coordinates};
use gantrycore::motion::Move;

/// One streamed setpoint on the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Setpoint {
    pub time: Time,
    pub position: Coordinates,
    pub speed: Velocity,
}

/// Everything one execution observed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    pub setpoints: Vec<Setpoint>,
    pub final_position: Coordinates,
    pub max_axis_speed: AxisMap<Velocity>,
    pub max_axis_acceleration: AxisMap<Acceleration>,
    /// Largest speed mismatch across any block or move boundary.
    pub max_boundary_jump: Velocity,
}

#[derive(Debug, TypedBuilder)]
pub struct Simulator {
    period: Time,
    origin: Coordinates,
}

impl Simulator {
    pub fn run(&self, moves: &[Move]) -> Trace {
        let mut trace = Trace::default();
        let mut position = self.origin;
        let mut clock = Time::default();
        let mut boundary_speed: Option<Velocity> = None;

        for current in moves {
            let move_start = position;
            let mut path_offset = Length::default();

            for block in current.phases() {
                if let Some(handover) = boundary_speed {
                    let jump = (block.initial_speed - handover).abs();
                    if jump > trace.max_boundary_jump {
                        trace.max_boundary_jump = jump;
                    }
                }

                // Per-axis envelope of this constant-acceleration phase.
                let block_peak = {
                    let final_speed = block.final_speed();
                    if final_speed > block.initial_speed {
                        final_speed
                    } else {
                        block.initial_speed
                    }
                };
                for &axis in Axis::ALL.iter() {
                    let share = current.unit_vector[axis].abs();
                    let axis_speed = block_peak * share;
                    if axis_speed > trace.max_axis_speed[axis] {
                        trace.max_axis_speed[axis] = axis_speed;
                    }
                    let axis_acceleration = block.acceleration.abs() * share;
                    if axis_acceleration > trace.max_axis_acceleration[axis] {
                        trace.max_axis_acceleration[axis] = axis_acceleration;
                    }
                }

                let duration = block.duration();
                let mut elapsed = self.period;
                while elapsed < duration {
                    trace.setpoints.push(Setpoint {
                        time: clock + elapsed,
                        position: along(
                            &move_start,
                            &current.unit_vector,
                            path_offset + block.distance_at(elapsed),
                        ),
                        speed: block.speed_at(elapsed),
                    });
                    elapsed += self.period;
                }

                clock += duration;
                path_offset += block.distance;
                boundary_speed = Some(block.final_speed());
            }

            position = along(&move_start, &current.unit_vector, current.distance);
            trace.setpoints.push(Setpoint {
                time: clock,
                position,
                speed: boundary_speed.unwrap_or_default(),
            });
        }

        trace.final_position = position;
        trace
    }
}

fn along(start: &Coordinates, unit_vector: &AxisMap<f64>, path: Length) -> Coordinates {
    AxisMap::from_fn(|axis| start[axis] + unit_vector[axis] * path)
}
