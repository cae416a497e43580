//! Viewport: the scrollable block that follows the frozen region.
//!
//! Per axis the viewport keeps its origin as a position of the layer below
//! plus a pixel offset into that position, so the first visible column or
//! row survives structural changes. The offset is recorded together with the
//! size of its position and scales with it, so a DPI change or a resize of
//! the origin position keeps the same share of it scrolled away. The minimum
//! origin is the first position
//! after the frozen span; `None` means nothing is left to scroll.

use nattable_core::Axis;

use crate::event::StructuralChange;
use crate::layer::Layer;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AxisViewport {
    origin_position: usize,
    origin_offset: u32,
    /// Size of the origin position when `origin_offset` was recorded
    origin_size: u32,
    minimum: Option<usize>,
    client_area: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewportLayer {
    columns: AxisViewport,
    rows: AxisViewport,
}

impl ViewportLayer {
    /// Unscrolled and unfrozen over `underlying`.
    pub fn new<L: Layer + ?Sized>(underlying: &L) -> Self {
        let mut viewport = Self::default();
        for axis in [Axis::Column, Axis::Row] {
            viewport.axis_mut(axis).minimum = (underlying.count(axis) > 0).then_some(0);
        }
        viewport
    }

    fn axis(&self, axis: Axis) -> &AxisViewport {
        match axis {
            Axis::Column => &self.columns,
            Axis::Row => &self.rows,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisViewport {
        match axis {
            Axis::Column => &mut self.columns,
            Axis::Row => &mut self.rows,
        }
    }

    pub fn minimum_origin_position(&self, axis: Axis) -> Option<usize> {
        self.axis(axis).minimum
    }

    /// Pixel just after the frozen region.
    pub fn minimum_origin<L: Layer + ?Sized>(&self, axis: Axis, underlying: &L) -> u32 {
        self.axis(axis)
            .minimum
            .and_then(|m| underlying.start_pixel_of_position(axis, m))
            .unwrap_or_else(|| underlying.pixel_extent(axis))
    }

    /// First visible position, `None` when nothing can be shown.
    pub fn origin_position(&self, axis: Axis) -> Option<usize> {
        let state = self.axis(axis);
        state.minimum.map(|_| state.origin_position)
    }

    pub fn origin<L: Layer + ?Sized>(&self, axis: Axis, underlying: &L) -> u32 {
        let state = self.axis(axis);
        underlying
            .start_pixel_of_position(axis, state.origin_position)
            .unwrap_or_else(|| underlying.pixel_extent(axis))
            .saturating_add(self.offset(axis, underlying))
    }

    /// Pixel offset into the origin position at its current size.
    fn offset<L: Layer + ?Sized>(&self, axis: Axis, underlying: &L) -> u32 {
        let state = self.axis(axis);
        let size = underlying.size_by_position(axis, state.origin_position);
        if state.origin_size == 0 || state.origin_size == size {
            return state.origin_offset;
        }
        let scaled = u64::from(state.origin_offset) * u64::from(size) / u64::from(state.origin_size);
        u32::try_from(scaled).unwrap_or(u32::MAX).min(size.saturating_sub(1))
    }

    pub fn client_area(&self, axis: Axis) -> Option<u32> {
        self.axis(axis).client_area
    }

    /// Visible positions: from the origin to the end of the client area, or
    /// to the end of the layer when no client area is set.
    pub fn count<L: Layer + ?Sized>(&self, axis: Axis, underlying: &L) -> usize {
        let total = underlying.count(axis);
        let Some(start) = self.origin_position(axis).filter(|&s| s < total) else {
            return 0;
        };
        match self.axis(axis).client_area {
            None => total - start,
            Some(0) => 0,
            Some(area) => {
                let end = self.origin(axis, underlying).saturating_add(area);
                underlying
                    .position_by_pixel(axis, end - 1)
                    .map_or(total - start, |last| last + 1 - start)
            }
        }
    }

    pub fn local_to_underlying<L: Layer + ?Sized>(&self, axis: Axis, position: usize, underlying: &L) -> Option<usize> {
        let start = self.origin_position(axis)?;
        (position < self.count(axis, underlying)).then(|| start + position)
    }

    pub fn underlying_to_local<L: Layer + ?Sized>(&self, axis: Axis, position: usize, underlying: &L) -> Option<usize> {
        let local = position.checked_sub(self.origin_position(axis)?)?;
        (local < self.count(axis, underlying)).then_some(local)
    }

    fn set_origin_pixel<L: Layer + ?Sized>(&mut self, axis: Axis, pixel: u32, underlying: &L) {
        let last = underlying.count(axis).saturating_sub(1);
        let position = underlying.position_by_pixel(axis, pixel).unwrap_or(last);
        let start = underlying.start_pixel_of_position(axis, position).unwrap_or(pixel);
        let size = underlying.size_by_position(axis, position);
        let state = self.axis_mut(axis);
        state.origin_position = position;
        state.origin_offset = pixel.saturating_sub(start);
        state.origin_size = size;
    }

    /// Keep the origin within `[minimum origin, maximum origin]`.
    pub fn clamp<L: Layer + ?Sized>(&mut self, axis: Axis, underlying: &L) {
        let total = underlying.count(axis);
        let state = *self.axis(axis);
        let Some(minimum) = state.minimum.filter(|&m| m < total) else {
            let state = self.axis_mut(axis);
            state.minimum = None;
            state.origin_position = total;
            state.origin_offset = 0;
            return;
        };

        let min_pixel = underlying.start_pixel_of_position(axis, minimum).unwrap_or(0);
        let max_pixel = match state.client_area {
            Some(area) => underlying.pixel_extent(axis).saturating_sub(area),
            None => underlying.start_pixel_of_position(axis, total - 1).unwrap_or(0),
        }
        .max(min_pixel);
        let pixel = self.origin(axis, underlying).clamp(min_pixel, max_pixel);
        self.set_origin_pixel(axis, pixel, underlying);
    }

    pub fn set_client_area<L: Layer + ?Sized>(&mut self, axis: Axis, extent: Option<u32>, underlying: &L) {
        self.axis_mut(axis).client_area = extent;
        self.clamp(axis, underlying);
    }

    /// Move the origin to the start of `position`.
    pub fn set_origin_position<L: Layer + ?Sized>(&mut self, axis: Axis, position: usize, underlying: &L) {
        let state = self.axis_mut(axis);
        state.origin_position = position;
        state.origin_offset = 0;
        self.clamp(axis, underlying);
    }

    /// Scroll by `delta` pixels. Returns whether the origin moved.
    pub fn scroll<L: Layer + ?Sized>(&mut self, axis: Axis, delta: i64, underlying: &L) -> bool {
        let before = *self.axis(axis);
        let pixel = (self.origin(axis, underlying) as i64 + delta).clamp(0, u32::MAX as i64) as u32;
        self.set_origin_pixel(axis, pixel, underlying);
        self.clamp(axis, underlying);
        *self.axis(axis) != before
    }

    /// Scroll the least amount that makes `position` fully visible.
    /// Returns whether the origin moved.
    pub fn show_position<L: Layer + ?Sized>(&mut self, axis: Axis, position: usize, underlying: &L) -> bool {
        let before = *self.axis(axis);
        let Some(minimum) = before.minimum else {
            return false;
        };
        if position < minimum || position >= underlying.count(axis) {
            return false;
        }
        let Some(start) = underlying.start_pixel_of_position(axis, position) else {
            return false;
        };
        let end = start.saturating_add(underlying.size_by_position(axis, position));
        let origin = self.origin(axis, underlying);

        if start < origin {
            self.set_origin_pixel(axis, start, underlying);
        } else if let Some(area) = before.client_area {
            if end > origin.saturating_add(area) {
                self.set_origin_pixel(axis, end.saturating_sub(area).min(start), underlying);
            }
        }
        self.clamp(axis, underlying);
        *self.axis(axis) != before
    }

    /// Install a new minimum origin position.
    ///
    /// An unscrolled viewport follows the new minimum. A scrolled one keeps
    /// its first visible position, moved through `change` when given.
    pub fn set_minimum<L: Layer + ?Sized>(
        &mut self,
        axis: Axis,
        minimum: Option<usize>,
        change: Option<&StructuralChange>,
        underlying: &L,
    ) {
        let state = self.axis_mut(axis);
        let unscrolled = state
            .minimum
            .map_or(true, |m| state.origin_position == m && state.origin_offset == 0);
        if unscrolled {
            state.origin_position = minimum.unwrap_or(0);
            state.origin_offset = 0;
        } else if let Some(change) = change {
            state.origin_position = change.shift_position(state.origin_position);
        }
        state.minimum = minimum;
        self.clamp(axis, underlying);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::LayerCommand;
    use crate::data::VecDataProvider;
    use crate::data_layer::DataLayer;
    use crate::event::{ChangeKind, StructuralDiff};
    use nattable_config::GridSettings;
    use nattable_core::Range;

    /// 10 columns, 100 pixels wide.
    fn data() -> DataLayer<VecDataProvider> {
        DataLayer::new(VecDataProvider::numbered(10, 5), &GridSettings::default())
    }

    #[test]
    fn test_unscrolled_shows_everything() {
        let data = data();
        let viewport = ViewportLayer::new(&data);
        assert_eq!(viewport.minimum_origin_position(Axis::Column), Some(0));
        assert_eq!(viewport.count(Axis::Column, &data), 10);
        assert_eq!(viewport.local_to_underlying(Axis::Column, 3, &data), Some(3));
        assert_eq!(viewport.local_to_underlying(Axis::Column, 10, &data), None);
    }

    #[test]
    fn test_client_area_limits_count() {
        let data = data();
        let mut viewport = ViewportLayer::new(&data);
        viewport.set_client_area(Axis::Column, Some(250), &data);
        assert_eq!(viewport.count(Axis::Column, &data), 3);
        viewport.set_client_area(Axis::Column, Some(0), &data);
        assert_eq!(viewport.count(Axis::Column, &data), 0);
    }

    #[test]
    fn test_scroll_clamps() {
        let data = data();
        let mut viewport = ViewportLayer::new(&data);
        viewport.set_client_area(Axis::Column, Some(300), &data);

        assert!(viewport.scroll(Axis::Column, 150, &data));
        assert_eq!(viewport.origin(Axis::Column, &data), 150);
        assert_eq!(viewport.origin_position(Axis::Column), Some(1));
        assert_eq!(viewport.count(Axis::Column, &data), 4);

        viewport.scroll(Axis::Column, 5_000, &data);
        assert_eq!(viewport.origin(Axis::Column, &data), 700);
        assert!(viewport.scroll(Axis::Column, -5_000, &data));
        assert_eq!(viewport.origin(Axis::Column, &data), 0);
        assert!(!viewport.scroll(Axis::Column, -1, &data));
    }

    #[test]
    fn test_scroll_offset_follows_dpi_scaling() {
        let mut data = data();
        let mut viewport = ViewportLayer::new(&data);
        viewport.set_client_area(Axis::Column, Some(300), &data);
        viewport.scroll(Axis::Column, 350, &data);
        assert_eq!(viewport.origin(Axis::Column, &data), 350);

        assert!(data.do_command(LayerCommand::ConfigureScaling { dpi_factor: 2.0 }));
        assert_eq!(viewport.origin_position(Axis::Column), Some(3));
        assert_eq!(viewport.origin(Axis::Column, &data), 700);

        viewport.clamp(Axis::Column, &data);
        assert_eq!(viewport.origin(Axis::Column, &data), 700);
    }

    #[test]
    fn test_minimum_after_freeze() {
        let data = data();
        let mut viewport = ViewportLayer::new(&data);
        viewport.set_minimum(Axis::Column, Some(3), None, &data);
        assert_eq!(viewport.minimum_origin(Axis::Column, &data), 300);
        assert_eq!(viewport.origin_position(Axis::Column), Some(3));
        assert_eq!(viewport.count(Axis::Column, &data), 7);

        viewport.set_minimum(Axis::Column, None, None, &data);
        assert_eq!(viewport.count(Axis::Column, &data), 0);
        assert_eq!(viewport.origin_position(Axis::Column), None);
    }

    #[test]
    fn test_scrolled_origin_follows_change() {
        let data = data();
        let mut viewport = ViewportLayer::new(&data);
        viewport.set_client_area(Axis::Column, Some(200), &data);
        viewport.scroll(Axis::Column, 500, &data);
        assert_eq!(viewport.origin_position(Axis::Column), Some(5));

        // Two columns before the origin went away
        let change = StructuralChange::new(
            Axis::Column,
            ChangeKind::Hide,
            Some(vec![StructuralDiff::Delete { before: Range::new(1, 3) }]),
        );
        viewport.set_minimum(Axis::Column, Some(0), Some(&change), &data);
        assert_eq!(viewport.origin_position(Axis::Column), Some(3));
    }

    #[test]
    fn test_show_position() {
        let data = data();
        let mut viewport = ViewportLayer::new(&data);
        viewport.set_client_area(Axis::Column, Some(250), &data);

        assert!(viewport.show_position(Axis::Column, 4, &data));
        assert_eq!(viewport.origin(Axis::Column, &data), 250);
        assert!(!viewport.show_position(Axis::Column, 4, &data));
        assert!(viewport.show_position(Axis::Column, 0, &data));
        assert_eq!(viewport.origin(Axis::Column, &data), 0);
        assert!(!viewport.show_position(Axis::Column, 12, &data));
    }
}
