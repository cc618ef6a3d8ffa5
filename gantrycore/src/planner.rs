//! Plan-wide orchestration: build moves from targets, solve junction
//! speeds, and iterate the whole sequence to a fixed point.

use core::marker::PhantomData;

use thiserror::Error;
use tracing::{debug, warn};
use uom::si::f64::{Length, Time, Velocity};

use crate::blend::{find_final_speed, find_initial_speed};
use crate::constraint::SystemConstraints;
use crate::coordinate::{Axis, Coordinates};
use crate::motion::{targets_to_moves, Move, MoveTarget};
use crate::profile::{build_blocks, max_transition_speed};

/// Junction speeds moving less than this between passes count as settled.
pub const CONVERGENCE_TOLERANCE: Velocity = Velocity {
    dimension: PhantomData,
    units: PhantomData,
    value: 1e-9,
};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum PlanError {
    #[error("no targets to plan")]
    NoTargets,
    #[error("{axis:?} constraints must be positive and finite")]
    Constraint { axis: Axis },
    #[error("target {index} needs a positive, finite max speed and finite coordinates")]
    Target { index: usize },
    #[error("no profile joins {entry:?} to {exit:?} over {distance:?}")]
    InfeasibleProfile {
        distance: Length,
        entry: Velocity,
        exit: Velocity,
    },
}

/// One pass of the blend loop, kept for diagnostics and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendPass {
    /// Largest junction-speed change relative to the previous pass.
    pub max_shift: Velocity,
    /// Boundary speeds after the pass: the first move's entry, then each
    /// move's exit in order.
    pub junction_speeds: Vec<Velocity>,
}

/// The planner's result. Only a converged plan is safe to stream to
/// hardware; an exhausted one may still carry junction mismatches and
/// must be discarded or re-planned by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionPlan {
    pub converged: bool,
    pub moves: Vec<Move>,
    pub blend_log: Vec<BlendPass>,
}

impl MotionPlan {
    pub fn duration(&self) -> Time {
        let mut total = Time::default();
        for current in &self.moves {
            total += current.duration();
        }
        total
    }
}

/// Plans multi-axis motion against one machine's constraint table.
///
/// Planning is a pure, synchronous computation over its inputs; separate
/// planners (or the same one from several threads) never interfere.
#[derive(Clone, Debug)]
pub struct MotionPlanner {
    constraints: SystemConstraints,
}

impl MotionPlanner {
    pub fn new(constraints: SystemConstraints) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &SystemConstraints {
        &self.constraints
    }

    /// Plan the path `origin -> targets[0] -> ... -> targets[n-1]`.
    ///
    /// Junction speeds of neighbouring moves depend on each other, so the
    /// whole sequence is re-solved until no boundary moves more than
    /// [`CONVERGENCE_TOLERANCE`], or `iteration_limit` passes run out. The
    /// latter is reported through `converged`, not as an error; every pass
    /// is linear in the number of moves and retrying identical inputs
    /// cannot help, so the trade-off belongs to the caller.
    pub fn plan_motion(
        &self,
        origin: &Coordinates,
        targets: &[MoveTarget],
        iteration_limit: usize,
    ) -> Result<MotionPlan, PlanError> {
        self.constraints.validate()?;
        if targets.is_empty() {
            return Err(PlanError::NoTargets);
        }
        for (index, target) in targets.iter().enumerate() {
            let speed_valid = target.max_speed.value > 0.0 && target.max_speed.value.is_finite();
            let position_valid = Axis::ALL
                .iter()
                .all(|&axis| target.position[axis].value.is_finite());
            if !speed_valid || !position_valid {
                return Err(PlanError::Target { index });
            }
        }

        let mut moves = targets_to_moves(origin, targets);
        let mut blend_log = Vec::new();
        let mut converged = false;
        for pass in 0..iteration_limit {
            let record = self.blend_pass(&mut moves)?;
            debug!(pass, max_shift = record.max_shift.value, "blend pass");
            let settled = record.max_shift <= CONVERGENCE_TOLERANCE;
            blend_log.push(record);
            if settled {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                passes = iteration_limit,
                moves = moves.len(),
                "junction speeds did not settle; the plan is not safe to execute"
            );
        }
        Ok(MotionPlan {
            converged,
            moves,
            blend_log,
        })
    }

    // One forward sweep: re-solve both boundaries of every move and
    // rebuild its blocks with the result.
    fn blend_pass(&self, moves: &mut [Move]) -> Result<BlendPass, PlanError> {
        let mut max_shift = Velocity::default();
        let mut junction_speeds = Vec::with_capacity(moves.len() + 1);
        for index in 0..moves.len() {
            let (entry, exit, acceleration) = {
                let current = &moves[index];
                let previous = index.checked_sub(1).map(|at| &moves[at]);
                let next = moves.get(index + 1);

                let mut entry = find_initial_speed(&self.constraints, current, previous);
                let mut exit = find_final_speed(&self.constraints, current, next);

                // A junction is one shared boundary; whichever side is
                // currently slower governs both. This is what carries a
                // tight bound backwards and forwards through the sequence
                // across passes.
                if let Some(previous) = previous {
                    let boundary = previous.exit_speed();
                    if boundary < entry {
                        entry = boundary;
                    }
                }
                if let Some(next) = next {
                    let boundary = next.entry_speed();
                    if boundary < exit {
                        exit = boundary;
                    }
                }

                // Never ask the block builder for speeds the distance
                // cannot join.
                let acceleration = self.constraints.acceleration_limit(&current.unit_vector);
                let forward = max_transition_speed(entry, acceleration, current.distance);
                if forward < exit {
                    exit = forward;
                }
                let backward = max_transition_speed(exit, acceleration, current.distance);
                if backward < entry {
                    entry = backward;
                }

                (entry, exit, acceleration)
            };

            let entry_shift = (entry - moves[index].entry_speed()).abs();
            let exit_shift = (exit - moves[index].exit_speed()).abs();
            if entry_shift > max_shift {
                max_shift = entry_shift;
            }
            if exit_shift > max_shift {
                max_shift = exit_shift;
            }

            moves[index].blocks = build_blocks(
                moves[index].distance,
                entry,
                exit,
                acceleration,
                moves[index].max_speed,
            )?;

            if index == 0 {
                junction_speeds.push(entry);
            }
            junction_speeds.push(exit);
        }
        Ok(BlendPass {
            max_shift,
            junction_speeds,
        })
    }
}
