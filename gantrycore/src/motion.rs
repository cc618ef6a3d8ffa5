//! The move/block data model and the builder that turns target lists into
//! moves.

use serde::{Deserialize, Serialize};
use uom::si::f64::{Acceleration, Length, Time, Velocity};

use crate::coordinate::{sqrt, AxisMap, Coordinates};

/// One kinematic phase of a move: constant-acceleration motion over a
/// fixed path distance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Block {
    pub distance: Length,
    pub initial_speed: Velocity,
    pub acceleration: Acceleration,
}

impl Block {
    /// Speed at the end of the block, from `v² = u² + 2·a·s`.
    pub fn final_speed(&self) -> Velocity {
        sqrt(self.initial_speed * self.initial_speed + 2.0 * self.acceleration * self.distance)
    }

    /// Time the block takes at its average speed; zero for a block that
    /// never moves.
    pub fn duration(&self) -> Time {
        let average = (self.initial_speed + self.final_speed()) / 2.0;
        if average <= Velocity::default() {
            Time::default()
        } else {
            self.distance / average
        }
    }

    /// Speed `elapsed` into the block.
    pub fn speed_at(&self, elapsed: Time) -> Velocity {
        self.initial_speed + self.acceleration * elapsed
    }

    /// Path distance covered `elapsed` into the block.
    pub fn distance_at(&self, elapsed: Time) -> Length {
        self.initial_speed * elapsed + self.acceleration * elapsed * elapsed / 2.0
    }
}

/// One straight-line multi-axis displacement and its three-phase
/// (accelerate, cruise, decelerate) velocity profile.
///
/// Phases the distance cannot afford stay present as zero-distance blocks,
/// so consumers always see exactly three blocks per move. A zero-distance
/// move carries the zero vector for its direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    pub unit_vector: AxisMap<f64>,
    pub distance: Length,
    pub max_speed: Velocity,
    pub blocks: (Block, Block, Block),
}

impl Move {
    /// A move whose profile has not been planned yet: three empty blocks
    /// pinned at the requested speed cap.
    pub fn naive(unit_vector: AxisMap<f64>, distance: Length, max_speed: Velocity) -> Self {
        let block = Block {
            distance: Length::default(),
            initial_speed: max_speed,
            acceleration: Acceleration::default(),
        };
        Self {
            unit_vector,
            distance,
            max_speed,
            blocks: (block, block, block),
        }
    }

    pub fn entry_speed(&self) -> Velocity {
        self.blocks.0.initial_speed
    }

    pub fn exit_speed(&self) -> Velocity {
        self.blocks.2.final_speed()
    }

    pub fn duration(&self) -> Time {
        self.blocks.0.duration() + self.blocks.1.duration() + self.blocks.2.duration()
    }

    /// The profile in execution order.
    pub fn phases(&self) -> [Block; 3] {
        [self.blocks.0, self.blocks.1, self.blocks.2]
    }
}

/// One requested stop on a path: where to be and how fast the segment
/// toward it may run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub position: Coordinates,
    pub max_speed: Velocity,
}

/// Convert an ordered target list into moves with naive profiles.
///
/// Output length and order always match the input; a target coincident
/// with its predecessor becomes a zero-distance move rather than being
/// dropped, so callers can line results up with their requests.
pub fn targets_to_moves(origin: &Coordinates, targets: &[MoveTarget]) -> Vec<Move> {
    let mut previous = *origin;
    let mut moves = Vec::with_capacity(targets.len());
    for target in targets {
        let displacement = previous.displacement_to(&target.position);
        moves.push(Move::naive(
            displacement.unit_vector(),
            displacement.magnitude(),
            target.max_speed,
        ));
        previous = target.position;
    }
    moves
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use uom::si::acceleration::millimeter_per_second_squared;
    use uom::si::length::millimeter;
    use uom::si::time::second;
    use uom::si::velocity::millimeter_per_second;

    use super::*;
    use crate::coordinate::Axis;

    fn block(distance: f64, initial_speed: f64, acceleration: f64) -> Block {
        Block {
            distance: Length::new::<millimeter>(distance),
            initial_speed: Velocity::new::<millimeter_per_second>(initial_speed),
            acceleration: Acceleration::new::<millimeter_per_second_squared>(acceleration),
        }
    }

    #[test]
    fn test_block_final_speed_and_duration() {
        // 0 -> 40 mm/s over 20 mm at 40 mm/s^2 takes one second.
        let block = block(20.0, 0.0, 40.0);
        assert_relative_eq!(
            block.final_speed().get::<millimeter_per_second>(),
            40.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(block.duration().get::<second>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_block_final_speed_clamps_to_zero() {
        // Decelerating harder than the distance allows must saturate at
        // rest instead of going imaginary.
        let block = block(10.0, 10.0, -40.0);
        assert_eq!(block.final_speed(), Velocity::default());
    }

    #[test]
    fn test_block_sampling_matches_endpoints() {
        let block = block(20.0, 10.0, 40.0);
        assert_relative_eq!(
            block.speed_at(Time::default()).get::<millimeter_per_second>(),
            10.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            block
                .distance_at(block.duration())
                .get::<millimeter>(),
            20.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            block.speed_at(block.duration()).get::<millimeter_per_second>(),
            block.final_speed().get::<millimeter_per_second>(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_targets_to_moves_preserves_order_and_count() {
        let origin = Coordinates::default();
        let speed = Velocity::new::<millimeter_per_second>(25.0);
        let mut first = Coordinates::default();
        first[Axis::X] = Length::new::<millimeter>(30.0);
        let mut second_pos = first;
        second_pos[Axis::Y] = Length::new::<millimeter>(40.0);
        let targets = [
            MoveTarget {
                position: first,
                max_speed: speed,
            },
            MoveTarget {
                position: second_pos,
                max_speed: speed,
            },
        ];

        let moves = targets_to_moves(&origin, &targets);
        assert_eq!(moves.len(), 2);
        assert_relative_eq!(moves[0].distance.get::<millimeter>(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(moves[0].unit_vector[Axis::X], 1.0, epsilon = 1e-12);
        assert_relative_eq!(moves[1].distance.get::<millimeter>(), 40.0, epsilon = 1e-9);
        assert_relative_eq!(moves[1].unit_vector[Axis::Y], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_coincident_target_becomes_zero_distance_move() {
        let origin = Coordinates::default();
        let target = MoveTarget {
            position: origin,
            max_speed: Velocity::new::<millimeter_per_second>(25.0),
        };

        let moves = targets_to_moves(&origin, &[target]);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].distance, Length::default());
        assert_eq!(moves[0].unit_vector, AxisMap::default());
    }

    #[test]
    fn test_naive_profile_pins_blocks_at_the_cap() {
        let speed = Velocity::new::<millimeter_per_second>(25.0);
        let naive = Move::naive(AxisMap::default(), Length::default(), speed);
        for block in naive.phases() {
            assert_eq!(block.distance, Length::default());
            assert_eq!(block.initial_speed, speed);
            assert_eq!(block.acceleration, Acceleration::default());
        }
    }
}
