//! The render-surface port.
//!
//! The handler never touches a global `document`.  It is given something that
//! implements [`RenderSurface`] and asks it to resolve an element by id every
//! time it needs one.  The returned [`ElementHandle`] is used for a single
//! mutation and then dropped, so the surface stays the sole owner of its
//! elements' lifetimes.
//!
//! Implementations live in the infrastructure layer:
//! `MemorySurface` (tests and the harness) and `WebSurface` (browser).

use std::rc::Rc;

use domlink_core::StyleMap;
use thiserror::Error;

/// A mutation was rejected by the render surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The surface refused the change.  For style changes the element has
    /// been restored to its previous state.
    #[error("render surface rejected mutation of {target}: {reason}")]
    Rejected { target: String, reason: String },
}

/// A short-lived reference to one element of a render surface.
///
/// Each method performs exactly one visual mutation.
pub trait ElementHandle {
    /// Replaces the element's text content.
    fn set_text(&self, text: &str) -> Result<(), SurfaceError>;

    /// Removes the element from layout (`true`) or restores it (`false`).
    fn set_hidden(&self, hidden: bool) -> Result<(), SurfaceError>;

    /// Stops painting the element while keeping its box (`true`), or paints it.
    fn set_invisible(&self, invisible: bool) -> Result<(), SurfaceError>;

    /// Switches the element's disabled presentation on or off.
    fn set_disabled(&self, disabled: bool) -> Result<(), SurfaceError>;

    /// Sets every declaration of `style` on the element's inline style.
    ///
    /// Properties not named in `style` are left untouched.  All-or-nothing:
    /// on error the element's inline style must be as it was before the call.
    fn apply_style(&self, style: &StyleMap) -> Result<(), SurfaceError>;
}

/// Resolves stable element ids to live elements.
pub trait RenderSurface {
    type Element: ElementHandle;

    /// Looks up an element by id.  `None` when the surface has no such element.
    fn resolve(&self, element_id: &str) -> Option<Self::Element>;
}

// Shared surfaces: the page (or a test) keeps its own `Rc` and inspects the
// surface while the handler holds a clone.
impl<S: RenderSurface + ?Sized> RenderSurface for Rc<S> {
    type Element = S::Element;

    fn resolve(&self, element_id: &str) -> Option<Self::Element> {
        (**self).resolve(element_id)
    }
}

impl<S: RenderSurface + ?Sized> RenderSurface for &S {
    type Element = S::Element;

    fn resolve(&self, element_id: &str) -> Option<Self::Element> {
        (**self).resolve(element_id)
    }
}
