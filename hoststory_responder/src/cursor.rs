// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor bridging.
//!
//! On legacy platforms the scene cannot show custom image cursors by itself.
//! [`CursorBridge`] watches cursor changes and, for image cursors, rasterizes
//! the image, asks the host for a native cursor and installs it into the
//! cursor's current frame through [`PlatformInterop::set_platform_cursor`].
//!
//! Failures are logged and dropped. The scene then renders its default for
//! that cursor.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;
use peniko::{ImageAlphaType, ImageData, ImageFormat};
use tracing::{debug, warn};

use crate::interop::{InteropError, PlatformInterop};

/// Named system cursors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CursorKind {
    /// Arrow.
    Arrow,
    /// Crosshair.
    Crosshair,
    /// Text insertion beam.
    Text,
    /// Busy.
    Wait,
    /// Pointing hand.
    Hand,
    /// Move.
    Move,
    /// Horizontal resize.
    ResizeHorizontal,
    /// Vertical resize.
    ResizeVertical,
    /// No cursor.
    None,
}

/// A cursor backed by an image.
#[derive(Clone, Debug)]
pub struct ImageCursor {
    /// Cursor image.
    pub image: ImageData,
    /// Hot spot, in image pixels.
    pub hotspot: Point,
}

/// A scene cursor value.
#[derive(Clone, Debug, Default)]
pub enum SceneCursor {
    /// Inherit.
    #[default]
    Default,
    /// A system cursor.
    Named(CursorKind),
    /// A custom image.
    Image(ImageCursor),
}

/// Straight-alpha RGBA8 pixels, as native cursor creation expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA bytes.
    pub data: Vec<u8>,
}

/// Handle to a native cursor resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NativeCursor(pub u64);

/// Failures while bridging a custom cursor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// Zero width or height.
    #[error("cursor image is empty")]
    EmptyImage,
    /// Pixel data does not match the declared size.
    #[error("cursor image holds {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Bytes implied by width and height.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },
    /// Pixel format this bridge does not convert.
    #[error("unsupported cursor image format")]
    UnsupportedFormat,
    /// The host could not create the cursor.
    #[error("native cursor creation failed: {0}")]
    Creation(String),
    /// Installing into the cursor frame failed.
    #[error(transparent)]
    Install(#[from] InteropError),
}

/// Creates native cursor resources.
pub trait NativeCursorFactory {
    /// Create a cursor from `pixels` with its hot spot at `hotspot`.
    ///
    /// # Errors
    ///
    /// [`CursorError::Creation`] when the host refuses.
    fn create_cursor(&self, pixels: &PixelBuffer, hotspot: Point) -> Result<NativeCursor, CursorError>;

    /// Free a cursor returned by [`create_cursor`](Self::create_cursor).
    fn release_cursor(&self, cursor: NativeCursor);
}

/// Convert `image` to straight-alpha RGBA8.
///
/// # Errors
///
/// Rejects empty images, images whose data does not match their size, and
/// formats other than RGBA8/BGRA8.
pub fn rasterize(image: &ImageData) -> Result<PixelBuffer, CursorError> {
    if image.width == 0 || image.height == 0 {
        return Err(CursorError::EmptyImage);
    }
    let expected = image.width as usize * image.height as usize * 4;
    let src = image.data.data();
    if src.len() != expected {
        return Err(CursorError::SizeMismatch {
            expected,
            actual: src.len(),
        });
    }
    let swap = match image.format {
        ImageFormat::Rgba8 => false,
        ImageFormat::Bgra8 => true,
        _ => return Err(CursorError::UnsupportedFormat),
    };
    let premultiplied = matches!(image.alpha_type, ImageAlphaType::AlphaPremultiplied);
    let mut data = Vec::with_capacity(expected);
    for px in src.chunks_exact(4) {
        let (mut r, g, mut b, a) = (px[0], px[1], px[2], px[3]);
        if swap {
            core::mem::swap(&mut r, &mut b);
        }
        if premultiplied {
            data.extend([unpremultiply(r, a), unpremultiply(g, a), unpremultiply(b, a), a]);
        } else {
            data.extend([r, g, b, a]);
        }
    }
    Ok(PixelBuffer {
        width: image.width,
        height: image.height,
        data,
    })
}

fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
    u8::try_from(v).unwrap_or(u8::MAX)
}

/// Mirrors scene cursor changes onto the native widget.
///
/// The bridge owns the native cursor it installed and releases it when the
/// scene switches to another cursor, or when the bridge is dropped.
pub struct CursorBridge {
    factory: Rc<dyn NativeCursorFactory>,
    interop: Rc<dyn PlatformInterop>,
    installed: Option<NativeCursor>,
}

impl fmt::Debug for CursorBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorBridge")
            .field("installed", &self.installed)
            .finish_non_exhaustive()
    }
}

impl CursorBridge {
    /// Bridge cursors through `factory` and `interop`.
    pub fn new(factory: Rc<dyn NativeCursorFactory>, interop: Rc<dyn PlatformInterop>) -> Self {
        Self {
            factory,
            interop,
            installed: None,
        }
    }

    /// The native cursor installed by the last successful bridge.
    pub fn installed(&self) -> Option<NativeCursor> {
        self.installed
    }

    /// React to a change of the scene's cursor.
    ///
    /// Never fails; see the module docs. A failed install keeps the previous
    /// native cursor.
    pub fn cursor_changed(&mut self, cursor: &SceneCursor) {
        let SceneCursor::Image(image) = cursor else {
            self.release_installed();
            return;
        };
        match self.install(image) {
            Ok(native) => {
                debug!(?native, "custom cursor installed");
                self.release_installed();
                self.installed = Some(native);
            }
            Err(err) => {
                warn!(%err, "custom cursor not installed; using default rendering");
            }
        }
    }

    fn install(&self, cursor: &ImageCursor) -> Result<NativeCursor, CursorError> {
        let pixels = rasterize(&cursor.image)?;
        let native = self.factory.create_cursor(&pixels, cursor.hotspot)?;
        if let Err(err) = self.interop.set_platform_cursor(cursor, native) {
            self.factory.release_cursor(native);
            return Err(err.into());
        }
        Ok(native)
    }

    fn release_installed(&mut self) {
        if let Some(previous) = self.installed.take() {
            debug!(?previous, "native cursor released");
            self.factory.release_cursor(previous);
        }
    }
}

impl Drop for CursorBridge {
    fn drop(&mut self) {
        self.release_installed();
    }
}
