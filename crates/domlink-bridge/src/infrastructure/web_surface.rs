//! Browser render surface backed by `web_sys`.
//!
//! Resolves elements with `document.getElementById` on every lookup and
//! applies mutations through the DOM:
//!
//! | Effect     | DOM change                                                  |
//! |------------|-------------------------------------------------------------|
//! | text       | `textContent`                                               |
//! | hidden     | inline `display: none`                                      |
//! | invisible  | inline `visibility: hidden`                                 |
//! | disabled   | `disabled` attribute and `disabled` class                   |
//! | style      | `style.setProperty(name, value)` per declaration            |
//!
//! Only `HtmlElement`s are resolved; an id that names an SVG or other
//! non-HTML element is treated as missing.
//!
//! # Hiding and style channels on one element
//!
//! `display` and `visibility` can also be written by a style channel.  Before
//! hiding, the inline value in place is stashed in a `data-domlink-display` /
//! `data-domlink-visibility` attribute, and showing the element restores it.
//! The stash lives on the element itself because handles are resolved afresh
//! for every update.

use domlink_core::StyleMap;
use tracing::warn;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, HtmlElement};

use crate::application::{ElementHandle, RenderSurface, SurfaceError};

/// A render surface over a live browser document.
#[derive(Debug, Clone)]
pub struct WebSurface {
    document: Document,
}

impl WebSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl RenderSurface for WebSurface {
    type Element = WebElement;

    fn resolve(&self, element_id: &str) -> Option<WebElement> {
        self.document
            .get_element_by_id(element_id)?
            .dyn_into::<HtmlElement>()
            .ok()
            .map(|element| WebElement {
                id: element_id.to_string(),
                element,
            })
    }
}

/// Handle to one DOM element.
#[derive(Debug, Clone)]
pub struct WebElement {
    id: String,
    element: HtmlElement,
}

impl WebElement {
    fn rejected(&self, err: JsValue) -> SurfaceError {
        SurfaceError::Rejected {
            target: self.id.clone(),
            reason: format!("{err:?}"),
        }
    }

    /// Sets `property` to `value`, or removes it when `value` is `None`.
    fn set_style_property(&self, property: &str, value: Option<&str>) -> Result<(), SurfaceError> {
        let style = self.element.style();
        match value {
            Some(value) => style.set_property(property, value),
            None => style.remove_property(property).map(|_| ()),
        }
        .map_err(|e| self.rejected(e))
    }

    /// Switches `property` to `hidden_value` (on) or back to whatever inline
    /// value it held before (off).
    fn toggle_hiding(&self, property: &str, hidden_value: &str, on: bool) -> Result<(), SurfaceError> {
        let stash = format!("data-domlink-{property}");
        let current = self
            .element
            .style()
            .get_property_value(property)
            .map_err(|e| self.rejected(e))?;
        let stashed = self.element.get_attribute(&stash);

        match hiding_step(&current, stashed.as_deref(), hidden_value, on) {
            HidingStep::Hide { stash: keep } => {
                if let Some(keep) = keep {
                    self.element
                        .set_attribute(&stash, keep)
                        .map_err(|e| self.rejected(e))?;
                }
                self.set_style_property(property, Some(hidden_value))
            }
            HidingStep::Restore(previous) => {
                self.set_style_property(property, previous)?;
                self.element
                    .remove_attribute(&stash)
                    .map_err(|e| self.rejected(e))
            }
            HidingStep::Clear => self.set_style_property(property, None),
            HidingStep::Nothing => Ok(()),
        }
    }
}

/// What to do to a `display`/`visibility` property when hiding is switched.
#[derive(Debug, PartialEq, Eq)]
enum HidingStep<'a> {
    /// Stash the given value (if any), then write the hiding value.
    Hide { stash: Option<&'a str> },
    /// Write back the stashed value (`None` removes the property) and drop
    /// the stash.
    Restore(Option<&'a str>),
    /// Remove a hiding value that has nothing stashed behind it.
    Clear,
    Nothing,
}

fn hiding_step<'a>(
    current: &'a str,
    stashed: Option<&'a str>,
    hidden_value: &str,
    on: bool,
) -> HidingStep<'a> {
    if on {
        // Already hidden: keep the original stash.
        let stash = (current != hidden_value).then_some(current);
        return HidingStep::Hide { stash };
    }
    match stashed {
        Some(previous) => HidingStep::Restore((!previous.is_empty()).then_some(previous)),
        None if current == hidden_value => HidingStep::Clear,
        None => HidingStep::Nothing,
    }
}

impl ElementHandle for WebElement {
    fn set_text(&self, text: &str) -> Result<(), SurfaceError> {
        self.element.set_text_content(Some(text));
        Ok(())
    }

    fn set_hidden(&self, hidden: bool) -> Result<(), SurfaceError> {
        self.toggle_hiding("display", "none", hidden)
    }

    fn set_invisible(&self, invisible: bool) -> Result<(), SurfaceError> {
        self.toggle_hiding("visibility", "hidden", invisible)
    }

    fn set_disabled(&self, disabled: bool) -> Result<(), SurfaceError> {
        let classes = self.element.class_list();
        if disabled {
            self.element
                .set_attribute("disabled", "")
                .and_then(|()| classes.add_1("disabled"))
        } else {
            self.element
                .remove_attribute("disabled")
                .and_then(|()| classes.remove_1("disabled"))
        }
        .map_err(|e| self.rejected(e))
    }

    fn apply_style(&self, style: &StyleMap) -> Result<(), SurfaceError> {
        let declaration = self.element.style();

        // Remember what each property held so a failure part-way through can
        // put the element back exactly as it was.
        let mut previous: Vec<(&str, String)> = Vec::with_capacity(style.len());
        for (property, value) in style.iter() {
            let before = declaration
                .get_property_value(property)
                .map_err(|e| self.rejected(e))?;

            if let Err(err) = declaration.set_property(property, value) {
                for (done, before) in previous.iter().rev() {
                    let restore = (!before.is_empty()).then_some(before.as_str());
                    if let Err(undo) = self.set_style_property(done, restore) {
                        warn!(
                            element = %self.id,
                            property = *done,
                            error = %undo,
                            "style rollback failed; element keeps a partial update"
                        );
                    }
                }
                return Err(self.rejected(err));
            }
            previous.push((property, before));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_stashes_style_channel_value() {
        // A style channel set `display: flex` before the element was hidden
        assert_eq!(
            hiding_step("flex", None, "none", true),
            HidingStep::Hide { stash: Some("flex") }
        );
    }

    #[test]
    fn test_show_restores_stashed_value() {
        assert_eq!(
            hiding_step("none", Some("flex"), "none", false),
            HidingStep::Restore(Some("flex"))
        );
    }

    #[test]
    fn test_show_with_empty_stash_removes_property() {
        assert_eq!(
            hiding_step("none", Some(""), "none", false),
            HidingStep::Restore(None)
        );
    }

    #[test]
    fn test_hiding_twice_keeps_first_stash() {
        assert_eq!(
            hiding_step("none", Some("flex"), "none", true),
            HidingStep::Hide { stash: None }
        );
    }

    #[test]
    fn test_show_leaves_unrelated_value_alone() {
        // Never hidden by the bridge, and the style channel owns `display`
        assert_eq!(hiding_step("grid", None, "none", false), HidingStep::Nothing);
        assert_eq!(hiding_step("none", None, "none", false), HidingStep::Clear);
    }
}
