use std::hint::black_box;

use criterion::*;
use gantrycore::{
    constraint::{AxisConstraints, SystemConstraints},
    coordinate::{Axis, AxisMap, Coordinates},
    motion::MoveTarget,
    planner::MotionPlanner,
};
use uom::si::{
    acceleration::millimeter_per_second_squared,
    f64::{Acceleration, Length, Velocity},
    length::millimeter,
    velocity::millimeter_per_second,
};

fn constraints() -> SystemConstraints {
    AxisMap::uniform(
        AxisConstraints::builder()
            .max_acceleration(Acceleration::new::<millimeter_per_second_squared>(1500.0))
            .max_speed_discontinuity(Velocity::new::<millimeter_per_second>(15.0))
            .max_direction_change_speed_discontinuity(Velocity::new::<millimeter_per_second>(
                20.0,
            ))
            .build(),
    )
}

// A serpentine wash pattern: long strokes with a short sideways shift
// between each, the worst realistic case for junction blending.
fn serpentine(rows: usize) -> Vec<MoveTarget> {
    let mut targets = Vec::with_capacity(2 * rows);
    let mut y = 0.0;
    for row in 0..rows {
        let x = if row % 2 == 0 { 200.0 } else { 0.0 };
        let mut position = Coordinates::default();
        position[Axis::X] = Length::new::<millimeter>(x);
        position[Axis::Y] = Length::new::<millimeter>(y);
        targets.push(MoveTarget {
            position,
            max_speed: Velocity::new::<millimeter_per_second>(80.0),
        });

        y += 9.0;
        let mut position = Coordinates::default();
        position[Axis::X] = Length::new::<millimeter>(x);
        position[Axis::Y] = Length::new::<millimeter>(y);
        targets.push(MoveTarget {
            position,
            max_speed: Velocity::new::<millimeter_per_second>(40.0),
        });
    }
    targets
}

fn bench_plan_motion(c: &mut Criterion) {
    let planner = MotionPlanner::new(constraints());
    let origin = Coordinates::default();
    let targets = serpentine(20);

    c.bench_function("plan_serpentine_40_moves", |b| {
        b.iter(|| planner.plan_motion(&origin, black_box(&targets), 20))
    });
}

criterion_group!(benches, bench_plan_motion);
criterion_main!(benches);
