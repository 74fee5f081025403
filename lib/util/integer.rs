use std::iter::Map;
use std::mem::transmute_copy;
use std::ops::RangeInclusive;

/// Trait for types that can be represented by a contiguous range of primitive integers.
///
/// # Safety
///
/// Must only be implemented for types that can be safely transmuted to and from [`Integer::Repr`].
pub unsafe trait Integer: Copy {
    /// The equivalent primitive integer type.
    type Repr: Primitive;

    /// The minimum repr.
    const MIN: Self::Repr;

    /// The maximum repr.
    const MAX: Self::Repr;

    /// The minimum value.
    #[inline(always)]
    fn lower() -> Self {
        Self::new(Self::MIN)
    }

    /// The maximum value.
    #[inline(always)]
    fn upper() -> Self {
        Self::new(Self::MAX)
    }

    /// Casts from [`Integer::Repr`].
    #[inline(always)]
    fn new(i: Self::Repr) -> Self {
        assert!(Self::in_range(i));
        unsafe { transmute_copy(&i) }
    }

    /// Casts to [`Integer::Repr`].
    #[inline(always)]
    fn get(self) -> Self::Repr {
        unsafe { transmute_copy(&self) }
    }

    /// Casts to an index, suitable for addressing arrays.
    #[inline(always)]
    fn index(self) -> usize {
        (self.get().widen() - Self::MIN.widen()) as usize
    }

    /// Converts to another [`Integer`] if possible without data loss.
    #[inline(always)]
    fn convert<I: Integer>(self) -> Option<I> {
        let i = I::Repr::narrow(self.get().widen())?;
        I::in_range(i).then(|| I::new(i))
    }

    /// Whether a value is in the range `(Self::MIN..=Self::MAX)`.
    #[inline(always)]
    fn in_range(i: Self::Repr) -> bool {
        Self::MIN <= i && i <= Self::MAX
    }

    /// An iterator over all values in the range [`Integer::MIN`]..=[`Integer::MAX`].
    #[inline(always)]
    #[allow(clippy::type_complexity)]
    fn iter() -> Map<RangeInclusive<Self::Repr>, fn(Self::Repr) -> Self>
    where
        RangeInclusive<Self::Repr>: Iterator<Item = Self::Repr>,
    {
        (Self::MIN..=Self::MAX).map(Self::new)
    }
}

/// Trait for primitive integer types.
pub trait Primitive: Integer<Repr = Self> + Ord {
    /// Losslessly widens to `i32`.
    fn widen(self) -> i32;

    /// Narrows from `i32`, if representable.
    fn narrow(i: i32) -> Option<Self>;
}

macro_rules! impl_primitive_for {
    ($i: ty) => {
        impl Primitive for $i {
            #[inline(always)]
            fn widen(self) -> i32 {
                self.into()
            }

            #[inline(always)]
            fn narrow(i: i32) -> Option<Self> {
                i.try_into().ok()
            }
        }

        unsafe impl Integer for $i {
            type Repr = $i;
            const MIN: Self::Repr = <$i>::MIN;
            const MAX: Self::Repr = <$i>::MAX;
        }
    };
}

impl_primitive_for!(i8);
impl_primitive_for!(u8);
impl_primitive_for!(i16);
impl_primitive_for!(u16);
