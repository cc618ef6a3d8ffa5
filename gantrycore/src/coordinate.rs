//! Per-axis coordinate maps and the vector arithmetic built on them.

use core::marker::PhantomData;
use core::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use uom::marker::Div;
use uom::si::f64::Length;
use uom::si::{Dimension, Quantity, ISQ, SI};
use uom::typenum::{
    consts::{P2, Z0},
    operator_aliases::PartialQuot,
    type_operators::PartialDiv,
    Integer,
};
use uom::Kind;

type SquaredLength = Quantity<ISQ<P2, Z0, Z0, Z0, Z0, Z0, Z0, dyn Kind>, SI<f64>, f64>;

/// One independently controllable degree of freedom of the gantry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    /// Left mount carriage.
    Z,
    /// Right mount carriage.
    A,
    /// Left pipette plunger.
    B,
    /// Right pipette plunger.
    C,
}

impl Axis {
    pub const ALL: [Self; 6] = [Self::X, Self::Y, Self::Z, Self::A, Self::B, Self::C];

    fn index(self) -> usize {
        self as usize
    }
}

/// Dense fixed-capacity storage with one slot per [`Axis`].
///
/// Axes a caller never touches simply hold the zero of `T`, which keeps
/// every map usable with every constraint table without membership checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisMap<T> {
    values: [T; 6],
}

impl<T> AxisMap<T> {
    pub fn from_fn(mut f: impl FnMut(Axis) -> T) -> Self {
        Self {
            values: Axis::ALL.map(&mut f),
        }
    }

    pub fn uniform(value: T) -> Self
    where
        T: Copy,
    {
        Self { values: [value; 6] }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> {
        Axis::ALL.iter().map(move |&axis| (axis, &self.values[axis.index()]))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Axis, &T) -> U) -> AxisMap<U> {
        AxisMap::from_fn(|axis| f(axis, &self[axis]))
    }
}

impl<T> Index<Axis> for AxisMap<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        &self.values[axis.index()]
    }
}

impl<T> IndexMut<Axis> for AxisMap<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        &mut self.values[axis.index()]
    }
}

/// An absolute machine position, one length per axis.
pub type Coordinates = AxisMap<Length>;

impl AxisMap<Length> {
    /// Componentwise displacement from `self` to `other`.
    pub fn displacement_to(&self, other: &Self) -> Self {
        AxisMap::from_fn(|axis| other[axis] - self[axis])
    }

    /// Euclidean norm over all axes.
    pub fn magnitude(&self) -> Length {
        let mut sum = SquaredLength::default();
        for &axis in Axis::ALL.iter() {
            let component = self[axis];
            sum += component * component;
        }
        sqrt(sum)
    }

    /// Direction cosines of this displacement, or the zero vector when the
    /// displacement itself is zero and no direction exists.
    pub fn unit_vector(&self) -> AxisMap<f64> {
        let magnitude = self.magnitude();
        if magnitude <= Length::default() {
            return AxisMap::default();
        }
        self.map(|_, &component| (component / magnitude).value)
    }
}

// Square root over any evenly-divisible dimension. Inputs pushed slightly
// negative by floating error are clamped to zero before the root.
#[allow(clippy::type_complexity)]
pub(crate) fn sqrt<D>(
    val: Quantity<D, SI<f64>, f64>,
) -> Quantity<
    ISQ<
        PartialQuot<D::L, P2>,
        PartialQuot<D::M, P2>,
        PartialQuot<D::T, P2>,
        PartialQuot<D::I, P2>,
        PartialQuot<D::Th, P2>,
        PartialQuot<D::N, P2>,
        PartialQuot<D::J, P2>,
    >,
    SI<f64>,
    f64,
>
where
    D: Dimension + ?Sized,
    D::L: PartialDiv<P2>,
    <D::L as PartialDiv<P2>>::Output: Integer,
    D::M: PartialDiv<P2>,
    <D::M as PartialDiv<P2>>::Output: Integer,
    D::T: PartialDiv<P2>,
    <D::T as PartialDiv<P2>>::Output: Integer,
    D::I: PartialDiv<P2>,
    <D::I as PartialDiv<P2>>::Output: Integer,
    D::Th: PartialDiv<P2>,
    <D::Th as PartialDiv<P2>>::Output: Integer,
    D::N: PartialDiv<P2>,
    <D::N as PartialDiv<P2>>::Output: Integer,
    D::J: PartialDiv<P2>,
    <D::J as PartialDiv<P2>>::Output: Integer,
    D::Kind: Div,
{
    Quantity {
        dimension: PhantomData,
        units: PhantomData,
        value: if val.value < 0.0 { 0.0 } else { val.value.sqrt() },
    }
}
