// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What the bridge needs from the host toolkit.

use alloc::rc::Rc;
use alloc::string::String;

use hoststory_event_state::snapshot::WidgetId;
use hoststory_responder::cursor::NativeCursorFactory;
use hoststory_responder::scene::RepaintTarget;
use kurbo::Point;

/// The native widget a scene is embedded in.
///
/// The bridge repaints it through [`RepaintTarget`] and creates custom
/// cursors on it through [`NativeCursorFactory`].
pub trait NativeCanvas: RepaintTarget + NativeCursorFactory {
    /// Identity of the widget.
    fn widget(&self) -> WidgetId;

    /// Map a widget-relative point to display coordinates, as of now.
    fn to_display(&self, point: Point) -> Point;
}

/// Failures creating a canvas.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    /// The parent widget does not exist or was disposed.
    #[error("parent widget {0:?} is not available")]
    NoParent(WidgetId),
    /// The toolkit refused to create the widget.
    #[error("native canvas creation failed: {0}")]
    Creation(String),
}

/// Creates native canvas widgets.
pub trait NativeToolkit {
    /// Create a canvas widget inside `parent`.
    ///
    /// # Errors
    ///
    /// See [`CanvasError`].
    fn create_canvas(&self, parent: WidgetId) -> Result<Rc<dyn NativeCanvas>, CanvasError>;
}
