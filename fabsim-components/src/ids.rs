//! Typed arena indices.
//!
//! Configuration records reference each other by string `ID`; the factory
//! resolves every reference to an index into the owning arena at build time,
//! so the hot path never touches strings. Each entity kind gets its own
//! index type to keep cross-arena mixups unrepresentable.

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }
    };
}

index_type!(TimeModelIdx);
index_type!(ProcessIdx);
index_type!(QueueIdx);
index_type!(ResourceIdx);
index_type!(ProductIdx);
index_type!(SourceIdx);
index_type!(SinkIdx);
index_type!(AuxiliaryIdx);
