//! # Slot Allocator
//!
//! Fixed-capacity id pools, one per resource kind. Ids are slot indices
//! offset by one so that `0` stays the invalid handle.
//!
//! Freed ids go on a free list and are handed out again LIFO, so an id
//! only comes back after the cleanup scheduler decided it is safe.

use parking_lot::Mutex;

use super::HandleAllocator;
use crate::handle::{BufferId, ImageId, PassId, PipelineId, ShaderId};

/// One kind's pool.
struct IdPool {
    /// Whether each slot is handed out.
    allocated: Box<[bool]>,
    /// Indices of available slots.
    free_list: Vec<u32>,
}

impl IdPool {
    fn new(capacity: u32) -> Self {
        Self {
            allocated: vec![false; capacity as usize].into_boxed_slice(),
            free_list: (0..capacity).rev().collect(),
        }
    }

    /// Raw id, or 0 when the pool is exhausted.
    fn alloc(&mut self) -> u32 {
        match self.free_list.pop() {
            Some(index) => {
                self.allocated[index as usize] = true;
                index + 1
            }
            None => 0,
        }
    }

    fn dealloc(&mut self, id: u32, kind: &'static str) {
        let Some(index) = id.checked_sub(1) else {
            tracing::warn!("Ignoring dealloc of invalid {} handle", kind);
            return;
        };
        match self.allocated.get_mut(index as usize) {
            Some(slot) if *slot => {
                *slot = false;
                self.free_list.push(index);
            }
            _ => tracing::warn!("Ignoring dealloc of unallocated {} handle {}", kind, id),
        }
    }

    fn live(&self) -> usize {
        self.allocated.len() - self.free_list.len()
    }
}

/// Live id counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotCounts {
    /// Live buffer ids.
    pub buffers: usize,
    /// Live image ids.
    pub images: usize,
    /// Live shader ids.
    pub shaders: usize,
    /// Live pipeline ids.
    pub pipelines: usize,
    /// Live pass ids.
    pub passes: usize,
}

impl SlotCounts {
    /// Sum over all kinds.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.buffers + self.images + self.shaders + self.pipelines + self.passes
    }
}

/// Thread-safe [`HandleAllocator`] with a fixed number of slots per kind.
///
/// # Example
///
/// ```rust
/// use tandem_core::{HandleAllocator, SlotAllocator};
///
/// let slots = SlotAllocator::new(16);
/// let buffer = slots.alloc_buffer();
/// assert!(buffer.is_valid());
/// slots.dealloc_buffer(buffer);
/// assert_eq!(slots.live().buffers, 0);
/// ```
pub struct SlotAllocator {
    buffers: Mutex<IdPool>,
    images: Mutex<IdPool>,
    shaders: Mutex<IdPool>,
    pipelines: Mutex<IdPool>,
    passes: Mutex<IdPool>,
}

impl SlotAllocator {
    /// Creates pools of `capacity` slots for every kind.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        Self {
            buffers: Mutex::new(IdPool::new(capacity)),
            images: Mutex::new(IdPool::new(capacity)),
            shaders: Mutex::new(IdPool::new(capacity)),
            pipelines: Mutex::new(IdPool::new(capacity)),
            passes: Mutex::new(IdPool::new(capacity)),
        }
    }

    /// Returns how many ids of each kind are currently handed out.
    #[must_use]
    pub fn live(&self) -> SlotCounts {
        SlotCounts {
            buffers: self.buffers.lock().live(),
            images: self.images.lock().live(),
            shaders: self.shaders.lock().live(),
            pipelines: self.pipelines.lock().live(),
            passes: self.passes.lock().live(),
        }
    }
}

impl HandleAllocator for SlotAllocator {
    fn alloc_buffer(&self) -> BufferId {
        BufferId::from_raw(self.buffers.lock().alloc())
    }

    fn alloc_image(&self) -> ImageId {
        ImageId::from_raw(self.images.lock().alloc())
    }

    fn alloc_shader(&self) -> ShaderId {
        ShaderId::from_raw(self.shaders.lock().alloc())
    }

    fn alloc_pipeline(&self) -> PipelineId {
        PipelineId::from_raw(self.pipelines.lock().alloc())
    }

    fn alloc_pass(&self) -> PassId {
        PassId::from_raw(self.passes.lock().alloc())
    }

    fn dealloc_buffer(&self, buffer: BufferId) {
        self.buffers.lock().dealloc(buffer.raw(), "buffer");
    }

    fn dealloc_image(&self, image: ImageId) {
        self.images.lock().dealloc(image.raw(), "image");
    }

    fn dealloc_shader(&self, shader: ShaderId) {
        self.shaders.lock().dealloc(shader.raw(), "shader");
    }

    fn dealloc_pipeline(&self, pipeline: PipelineId) {
        self.pipelines.lock().dealloc(pipeline.raw(), "pipeline");
    }

    fn dealloc_pass(&self, pass: PassId) {
        self.passes.lock().dealloc(pass.raw(), "pass");
    }
}
