//! Boundary to the renderer that compiles display lists and measures
//! rendered images.
//!
//! Nothing here draws anything. The document decides *what* to compile and
//! in which order; a [`Renderer`] implementation owns the graphics state.

use tracing::debug;

use crate::color::LicColor;
use crate::geometry::{Matrix, Primitive};
use crate::part::Dimensions;

/// Offscreen buffer sizes tried in order when measuring an image.
pub const BUFFER_LADDER: [u32; 5] = [128, 256, 512, 1024, 2048];

/// Handle of a compiled display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayListId(pub u32);

/// One placed reference to another display list.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    pub list: DisplayListId,
    pub matrix: Matrix,
    pub color: Option<LicColor>,
    pub invert: bool,
}

/// Graphics backend used to compile and measure display lists.
pub trait Renderer {
    /// Offscreen render target.
    type Buffer;

    /// Compile the geometry of an abstract part.
    fn compile_part(&mut self, primitives: &[Primitive], children: &[DisplayItem]) -> DisplayListId;

    /// Compile a CSI as `previous` (the prior CSI in the same lineage)
    /// followed by the step's own parts.
    fn compile_csi(&mut self, previous: Option<DisplayListId>, parts: &[DisplayItem])
    -> DisplayListId;

    /// Obtain a square offscreen buffer of `size` pixels.
    fn acquire(&mut self, size: u32) -> Option<Self::Buffer>;

    /// Render `list` into `buffer` and measure it. `None` when the image
    /// does not fit the buffer.
    fn measure(&mut self, buffer: &mut Self::Buffer, list: DisplayListId) -> Option<Dimensions>;

    fn release(&mut self, buffer: Self::Buffer);
}

/// Acquired offscreen buffer, released when dropped.
pub struct ScopedBuffer<'r, R: Renderer> {
    renderer: &'r mut R,
    buffer: Option<R::Buffer>,
    size: u32,
}

impl<'r, R: Renderer> ScopedBuffer<'r, R> {
    /// Acquire a buffer; `None` when the renderer cannot provide one.
    pub fn acquire(renderer: &'r mut R, size: u32) -> Option<Self> {
        let buffer = renderer.acquire(size)?;
        Some(Self {
            renderer,
            buffer: Some(buffer),
            size,
        })
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn measure(&mut self, list: DisplayListId) -> Option<Dimensions> {
        let buffer = self.buffer.as_mut()?;
        self.renderer.measure(buffer, list)
    }
}

impl<R: Renderer> Drop for ScopedBuffer<'_, R> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.renderer.release(buffer);
        }
    }
}

/// Measure `list`, retrying with the next larger buffer whenever the
/// image falls outside the current one.
pub fn measure_with_ladder<R: Renderer>(renderer: &mut R, list: DisplayListId) -> Option<Dimensions> {
    for size in BUFFER_LADDER {
        let Some(mut buffer) = ScopedBuffer::acquire(renderer, size) else {
            debug!(size, "renderer could not provide a buffer");
            continue;
        };
        if let Some(dims) = buffer.measure(list) {
            return Some(dims);
        }
        debug!(size, list = list.0, "image exceeds buffer, retrying larger");
    }
    None
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::geometry::PointF;

    /// Renderer double: every list fits once the buffer reaches `fits_at`.
    #[derive(Debug, Default)]
    pub(crate) struct MockRenderer {
        pub next_id: u32,
        pub acquired: Vec<u32>,
        pub released: usize,
        pub fits_at: u32,
        pub csi_calls: Vec<(Option<DisplayListId>, usize)>,
    }

    impl MockRenderer {
        pub(crate) fn fitting_at(size: u32) -> Self {
            Self {
                fits_at: size,
                ..Self::default()
            }
        }
    }

    impl Renderer for MockRenderer {
        type Buffer = u32;

        fn compile_part(&mut self, _: &[Primitive], _: &[DisplayItem]) -> DisplayListId {
            self.next_id += 1;
            DisplayListId(self.next_id)
        }

        fn compile_csi(
            &mut self,
            previous: Option<DisplayListId>,
            parts: &[DisplayItem],
        ) -> DisplayListId {
            self.csi_calls.push((previous, parts.len()));
            self.next_id += 1;
            DisplayListId(self.next_id)
        }

        fn acquire(&mut self, size: u32) -> Option<u32> {
            self.acquired.push(size);
            Some(size)
        }

        fn measure(&mut self, buffer: &mut u32, _: DisplayListId) -> Option<Dimensions> {
            (*buffer >= self.fits_at).then(|| Dimensions {
                width: 40,
                height: 30,
                left_inset: 2,
                bottom_inset: 3,
                center: PointF::new(1.0, -1.0),
            })
        }

        fn release(&mut self, _: u32) {
            self.released += 1;
        }
    }
}
