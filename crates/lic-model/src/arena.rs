//! Index-addressed storage for shared document entities.
//!
//! Abstract parts and placed part instances are owned by one arena each and
//! referenced everywhere else by a typed index. Nothing is ever removed from
//! an arena, so an index stays valid for the lifetime of the document.

use std::fmt;
use std::marker::PhantomData;

/// Trait for typed arena indices.
pub trait ArenaIdx: Copy {
    /// Create an index from a raw slot number.
    fn from_u32(idx: u32) -> Self;
    /// Raw slot number of this index.
    fn to_u32(self) -> u32;
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl ArenaIdx for $name {
            fn from_u32(idx: u32) -> Self {
                Self(idx)
            }

            fn to_u32(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

arena_id!(
    /// Stable handle of an [`AbstractPart`](crate::AbstractPart) (plain part, submodel or main model).
    AbstractPartId
);
arena_id!(
    /// Stable handle of a placed [`Part`](crate::Part).
    PartInstanceId
);

/// Append-only arena.
#[derive(Debug, Clone)]
pub struct Arena<T, Idx: ArenaIdx> {
    items: Vec<T>,
    _phantom: PhantomData<Idx>,
}

impl<T, Idx: ArenaIdx> Default for Arena<T, Idx> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            _phantom: PhantomData,
        }
    }
}

impl<T, Idx: ArenaIdx> Arena<T, Idx> {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a value and return its index.
    pub fn push(&mut self, item: T) -> Idx {
        let idx = self.items.len() as u32;
        self.items.push(item);
        Idx::from_u32(idx)
    }

    /// Get a value by index, `None` if the index belongs to another arena.
    pub fn get(&self, idx: Idx) -> Option<&T> {
        self.items.get(idx.to_u32() as usize)
    }

    /// Mutable access by index.
    pub fn get_mut(&mut self, idx: Idx) -> Option<&mut T> {
        self.items.get_mut(idx.to_u32() as usize)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over `(index, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Idx, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (Idx::from_u32(i as u32), item))
    }

    /// Iterate mutably over `(index, value)` pairs in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Idx, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .map(|(i, item)| (Idx::from_u32(i as u32), item))
    }

    /// All indices currently allocated.
    pub fn ids(&self) -> impl Iterator<Item = Idx> + use<T, Idx> {
        (0..self.items.len() as u32).map(Idx::from_u32)
    }
}
