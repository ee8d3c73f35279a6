//! Virtual window math.
//!
//! Pure index/pixel arithmetic for a list of fixed-height rows: which rows
//! must be materialized for a scroll position, and where to scroll so a row
//! becomes visible. Nothing here touches a rendering surface.

use std::ops::RangeInclusive;

use crate::config::ComboboxConfig;

/// A row that must be materialized, with its absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualItem {
    /// Index into the flattened rows.
    pub index: usize,
    /// Distance from the top of the content, in pixels.
    pub offset_top: u64,
}

/// The rows to materialize for one scroll position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualWindow {
    /// Materialized rows in index order.
    pub items: Vec<VirtualItem>,
    /// Height of the whole list, in pixels.
    pub total_height: u64,
}

impl VirtualWindow {
    /// Inclusive index range, `None` when there are no rows.
    pub fn range(&self) -> Option<RangeInclusive<usize>> {
        let first = self.items.first()?;
        let last = self.items.last()?;
        Some(first.index..=last.index)
    }

    /// Whether no rows are materialized.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Computes virtual windows for rows of a fixed height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Virtualizer {
    item_height: u32,
    overscan: usize,
    fallback_viewport_height: u32,
}

impl Virtualizer {
    /// Creates a virtualizer. A zero `item_height` is treated as 1.
    pub fn new(item_height: u32, overscan: usize, fallback_viewport_height: u32) -> Self {
        Self {
            item_height: item_height.max(1),
            overscan,
            fallback_viewport_height,
        }
    }

    /// Creates a virtualizer from a validated config.
    pub fn from_config(config: &ComboboxConfig) -> Self {
        Self::new(
            config.item_height,
            config.overscan,
            config.fallback_viewport_height,
        )
    }

    /// Row height in pixels.
    pub fn item_height(&self) -> u32 {
        self.item_height
    }

    /// The reported viewport height, or the fallback while none is known.
    pub fn effective_viewport(&self, viewport_height: Option<u32>) -> u32 {
        match viewport_height {
            Some(height) if height > 0 => height,
            _ => self.fallback_viewport_height,
        }
    }

    /// Height of `item_count` rows.
    pub fn total_height(&self, item_count: usize) -> u64 {
        item_count as u64 * self.item_height as u64
    }

    /// Largest scroll offset that still shows content.
    pub fn max_scroll_offset(&self, item_count: usize, viewport_height: Option<u32>) -> u64 {
        self.total_height(item_count)
            .saturating_sub(self.effective_viewport(viewport_height) as u64)
    }

    /// Rows to materialize for `scroll_offset`, padded by the overscan.
    pub fn window(
        &self,
        item_count: usize,
        scroll_offset: u64,
        viewport_height: Option<u32>,
    ) -> VirtualWindow {
        let total_height = self.total_height(item_count);
        if item_count == 0 {
            return VirtualWindow {
                items: Vec::new(),
                total_height,
            };
        }

        let height = self.item_height as u64;
        let viewport = self.effective_viewport(viewport_height) as u64;
        let last = item_count - 1;

        let first_visible = (scroll_offset / height) as usize;
        let last_visible = scroll_offset.saturating_add(viewport).div_ceil(height) as usize;

        let end = last_visible.saturating_add(self.overscan).min(last);
        // Past the end of the content only the last row remains.
        let start = first_visible.saturating_sub(self.overscan).min(end);

        let items = (start..=end)
            .map(|index| VirtualItem {
                index,
                offset_top: index as u64 * height,
            })
            .collect();

        VirtualWindow {
            items,
            total_height,
        }
    }

    /// Scroll offset that brings row `index` into view with minimal movement.
    ///
    /// Rows above the viewport align to its top, rows below align to its
    /// bottom, and visible rows leave the offset unchanged.
    pub fn scroll_into_view(
        &self,
        index: usize,
        scroll_offset: u64,
        viewport_height: Option<u32>,
    ) -> u64 {
        let viewport = self.effective_viewport(viewport_height) as u64;
        let top = index as u64 * self.item_height as u64;
        let bottom = top + self.item_height as u64;

        if top < scroll_offset {
            top
        } else if bottom > scroll_offset.saturating_add(viewport) {
            bottom - viewport
        } else {
            scroll_offset
        }
    }
}

impl Default for Virtualizer {
    fn default() -> Self {
        Self::from_config(&ComboboxConfig::default())
    }
}
