use num_traits::{One, PrimInt};

/// Implemented by flag enums whose discriminant is a bit index.
///
/// The backing integer is chosen per enum through `Storage`, so a three-axis lock set
/// can live in a `u8` while larger sets pick `u32`/`u64`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be below the bit width of `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// Plain bit set over a primitive integer, addressed through [`FlagBitmask`] tags.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub const fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn from_tags<U: FlagBitmask<Storage = T> + Copy>(tags: &[U]) -> Self {
        let mut flags = Self::new(T::zero());
        flags.add_many(tags);
        flags
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    /// True when every tag in `tags` is set. An empty slice is trivially contained.
    pub fn has_all<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) == combined
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}

/// Declare a bit-indexed flag enum and implement [`FlagBitmask`] for it.
///
/// ```ignore
/// define_bitmask_flags!(LockedAxis, u8, {
///     TranslationX,
///     TranslationY,
///     Rotation,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}
