use crate::error::{CoreResult, InvalidViewportWidthSnafu};

/// Width below which the shell renders its mobile layout.
pub const MOBILE_BREAKPOINT_PX: f32 = 768.0;
/// Sidebar width when expanded on desktop.
pub const SIDEBAR_EXPANDED_WIDTH_PX: f32 = 280.0;
/// Sidebar width when collapsed to icons.
pub const SIDEBAR_COLLAPSED_WIDTH_PX: f32 = 80.0;

const _: () = {
    assert!(SIDEBAR_COLLAPSED_WIDTH_PX < SIDEBAR_EXPANDED_WIDTH_PX);
    assert!(SIDEBAR_EXPANDED_WIDTH_PX < MOBILE_BREAKPOINT_PX);
};

/// Layout class derived from viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Viewport {
    Mobile,
    Desktop,
}

impl Viewport {
    pub fn classify(width: f32) -> Self {
        if width < MOBILE_BREAKPOINT_PX {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Self::Mobile)
    }
}

/// Snapshot of the shell frame handed to the render boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    pub viewport: Viewport,
    /// Desktop-only concept; forced to true when the viewport turns mobile.
    pub sidebar_collapsed: bool,
    /// Mobile-only concept; returning to desktop does not reopen it.
    pub mobile_overlay_open: bool,
}

impl Default for ShellLayout {
    fn default() -> Self {
        Self {
            viewport: Viewport::Desktop,
            sidebar_collapsed: false,
            mobile_overlay_open: false,
        }
    }
}

/// Rejection reason for a toggle that is invalid in the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellRejection {
    CollapseUnavailable { viewport: Viewport },
    OverlayUnavailable { viewport: Viewport },
}

/// Single owner of sidebar/overlay/viewport state for the whole process.
#[derive(Debug, Default)]
pub struct ShellState {
    layout: ShellLayout,
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the initial state from a first width reading; an unusable
    /// reading falls back to the default desktop layout.
    pub fn from_width(width: f32) -> Self {
        let mut state = Self::default();
        if let Err(error) = state.observe_width(width) {
            tracing::warn!(%error, "ignoring initial viewport reading");
        }
        state
    }

    pub fn layout(&self) -> ShellLayout {
        self.layout
    }

    pub fn viewport(&self) -> Viewport {
        self.layout.viewport
    }

    /// Applies a (already debounced) width reading. Non-finite or
    /// non-positive widths are rejected and the last known-good layout is
    /// retained.
    ///
    /// A desktop-to-mobile transition forces the sidebar collapsed; the
    /// overlay is left alone in both directions.
    pub fn observe_width(&mut self, width: f32) -> CoreResult<Viewport> {
        if !width.is_finite() || width <= 0.0 {
            return InvalidViewportWidthSnafu {
                stage: "observe-viewport-width",
                width,
            }
            .fail();
        }

        let next = Viewport::classify(width);
        if self.layout.viewport == Viewport::Desktop && next == Viewport::Mobile {
            self.layout.sidebar_collapsed = true;
        }
        self.layout.viewport = next;
        Ok(next)
    }

    /// Desktop-only. Flips the sidebar and returns the new collapsed flag.
    pub fn toggle_collapse(&mut self) -> Result<bool, ShellRejection> {
        if self.layout.viewport.is_mobile() {
            return Err(ShellRejection::CollapseUnavailable {
                viewport: self.layout.viewport,
            });
        }

        self.layout.sidebar_collapsed = !self.layout.sidebar_collapsed;
        Ok(self.layout.sidebar_collapsed)
    }

    /// Mobile-only. Flips the overlay and returns the new open flag.
    pub fn toggle_mobile_overlay(&mut self) -> Result<bool, ShellRejection> {
        if !self.layout.viewport.is_mobile() {
            return Err(ShellRejection::OverlayUnavailable {
                viewport: self.layout.viewport,
            });
        }

        self.layout.mobile_overlay_open = !self.layout.mobile_overlay_open;
        Ok(self.layout.mobile_overlay_open)
    }

    /// Navigation always dismisses the overlay and never touches the desktop
    /// collapse state.
    pub fn handle_navigation(&mut self) {
        self.layout.mobile_overlay_open = false;
    }
}
