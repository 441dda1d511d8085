//! In-memory render surface.
//!
//! # Why an in-memory surface?
//!
//! The real surface (`WebSurface`) needs a browser document, cannot run in a
//! plain `cargo test`, and its state is awkward to read back from Rust.
//! [`MemorySurface`] keeps one [`ElementState`] record per element id instead,
//! so tests and the harness binary can see exactly what each update did.
//!
//! # Usage in tests
//!
//! ```rust
//! use std::rc::Rc;
//! use domlink_bridge::application::{DomHandler, NoopObserver};
//! use domlink_bridge::infrastructure::MemorySurface;
//! use domlink_core::RouteTable;
//!
//! let routes = RouteTable::default_routes();
//! let surface = Rc::new(MemorySurface::for_routes(&routes, &[]));
//! let mut handler = DomHandler::new(false, Rc::clone(&surface), routes, NoopObserver);
//!
//! handler.handle_update("lights.info", "50%");
//! assert_eq!(surface.element("lights-info").unwrap().text, "50%");
//! ```
//!
//! # `should_fail` flag
//!
//! [`MemorySurface::set_should_fail`] makes every mutation return
//! [`SurfaceError::Rejected`] without changing anything, to exercise the
//! handler's error path.
//!
//! # Threading
//!
//! The surface is single-threaded (`Rc` + `RefCell`), like the document it
//! stands in for.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use domlink_core::{RouteTable, StyleMap};
use serde::Serialize;

use crate::application::{ElementHandle, RenderSurface, SurfaceError};

/// Everything the bridge can change about one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElementState {
    /// Text content.
    pub text: String,
    /// Removed from layout.
    pub hidden: bool,
    /// Not painted, keeps its box.
    pub invisible: bool,
    /// Disabled presentation.
    pub disabled: bool,
    /// Inline style declarations.
    pub style: BTreeMap<String, String>,
    /// Number of mutations applied to this element.
    pub mutations: u64,
}

/// A render surface whose elements live in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    elements: RefCell<BTreeMap<String, Rc<RefCell<ElementState>>>>,
    should_fail: Cell<bool>,
}

impl MemorySurface {
    /// Creates a surface with no elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface with one blank element per id.
    pub fn with_elements<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let surface = Self::new();
        for id in ids {
            surface.add_element(id);
        }
        surface
    }

    /// Creates one element for every route target, except the ids in `omit`.
    pub fn for_routes(routes: &RouteTable, omit: &[String]) -> Self {
        Self::with_elements(
            routes
                .iter()
                .map(|r| r.target.as_str())
                .filter(|target| !omit.iter().any(|o| o == target)),
        )
    }

    /// Adds a blank element.  An existing element with the same id is kept.
    pub fn add_element(&self, id: impl Into<String>) {
        self.elements.borrow_mut().entry(id.into()).or_default();
    }

    /// Removes an element.  Returns `false` if there was none.
    pub fn remove_element(&self, id: &str) -> bool {
        self.elements.borrow_mut().remove(id).is_some()
    }

    /// Snapshot of one element's state.
    pub fn element(&self, id: &str) -> Option<ElementState> {
        self.elements.borrow().get(id).map(|e| e.borrow().clone())
    }

    /// Snapshot of every element, keyed by id.
    pub fn snapshot(&self) -> BTreeMap<String, ElementState> {
        self.elements
            .borrow()
            .iter()
            .map(|(id, e)| (id.clone(), e.borrow().clone()))
            .collect()
    }

    /// Mutations applied to one element (0 for unknown ids).
    pub fn mutation_count(&self, id: &str) -> u64 {
        self.elements
            .borrow()
            .get(id)
            .map_or(0, |e| e.borrow().mutations)
    }

    /// Mutations applied across all elements.
    pub fn total_mutations(&self) -> u64 {
        self.elements
            .borrow()
            .values()
            .map(|e| e.borrow().mutations)
            .sum()
    }

    /// When `true`, every mutation is rejected and nothing changes.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.set(fail);
    }
}

impl RenderSurface for MemorySurface {
    type Element = MemoryElement;

    fn resolve(&self, element_id: &str) -> Option<MemoryElement> {
        self.elements
            .borrow()
            .get(element_id)
            .map(|state| MemoryElement {
                id: element_id.to_string(),
                state: Rc::clone(state),
                should_fail: self.should_fail.get(),
            })
    }
}

/// Handle to one [`MemorySurface`] element.
#[derive(Debug, Clone)]
pub struct MemoryElement {
    id: String,
    state: Rc<RefCell<ElementState>>,
    should_fail: bool,
}

impl MemoryElement {
    /// Runs `f` as one mutation, or rejects it when the surface is failing.
    fn mutate(&self, f: impl FnOnce(&mut ElementState)) -> Result<(), SurfaceError> {
        if self.should_fail {
            return Err(SurfaceError::Rejected {
                target: self.id.clone(),
                reason: "mock failure".into(),
            });
        }
        let mut state = self.state.borrow_mut();
        f(&mut state);
        state.mutations += 1;
        Ok(())
    }
}

impl ElementHandle for MemoryElement {
    fn set_text(&self, text: &str) -> Result<(), SurfaceError> {
        self.mutate(|s| s.text = text.to_string())
    }

    fn set_hidden(&self, hidden: bool) -> Result<(), SurfaceError> {
        self.mutate(|s| s.hidden = hidden)
    }

    fn set_invisible(&self, invisible: bool) -> Result<(), SurfaceError> {
        self.mutate(|s| s.invisible = invisible)
    }

    fn set_disabled(&self, disabled: bool) -> Result<(), SurfaceError> {
        self.mutate(|s| s.disabled = disabled)
    }

    fn apply_style(&self, style: &StyleMap) -> Result<(), SurfaceError> {
        self.mutate(|s| {
            for (property, value) in style.iter() {
                s.style.insert(property.to_string(), value.to_string());
            }
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
