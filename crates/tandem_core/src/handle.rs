//! # Resource Handles
//!
//! Backend resources are named by small integer ids, never by pointers.
//! An id is an index into a table the backend owns; the queue only copies
//! ids around and asks the [`HandleAllocator`](crate::HandleAllocator) to
//! release them once it is safe.
//!
//! Id `0` is reserved as the invalid handle.

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// The reserved invalid handle.
            pub const INVALID: Self = Self(0);

            /// Wraps a raw id handed out by an allocator.
            #[inline]
            #[must_use]
            pub const fn from_raw(id: u32) -> Self {
                Self(id)
            }

            /// Returns the raw id.
            #[inline]
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Returns true unless this is [`Self::INVALID`].
            #[inline]
            #[must_use]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

resource_handle!(
    /// Handle to a vertex or index buffer.
    BufferId
);
resource_handle!(
    /// Handle to a texture or render target.
    ImageId
);
resource_handle!(
    /// Handle to a compiled shader program.
    ShaderId
);
resource_handle!(
    /// Handle to a pipeline state object.
    PipelineId
);
resource_handle!(
    /// Handle to an offscreen render pass.
    PassId
);
