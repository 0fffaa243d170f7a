//! Dense index newtypes for operations, units, and control states.

/// Implemented by types that wrap a dense, 0-based index.
pub trait IndexRef: Copy + Eq {
    fn index(&self) -> usize;
    fn new(input: usize) -> Self;
}

macro_rules! impl_idx {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
        )]
        #[cfg_attr(
            feature = "serialize",
            derive(serde::Serialize),
            serde(transparent)
        )]
        pub struct $name(u32);

        impl IndexRef for $name {
            fn index(&self) -> usize {
                self.0 as usize
            }

            fn new(input: usize) -> Self {
                $name(input as u32)
            }
        }

        impl From<usize> for $name {
            fn from(input: usize) -> Self {
                <$name as IndexRef>::new(input)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
            ) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_idx!(
    OpIdx,
    "Identifier of an operation in a [`DependenceGraph`](crate::DependenceGraph). \
     Dense and 0-based, assigned once by the front end and never reused."
);
impl_idx!(
    UnitIdx,
    "Index of a physical functional-unit instance within its resource-class pool."
);
impl_idx!(
    StateIdx,
    "Identifier of the basic block / controller state an operation is scheduled in."
);
