//! DomHandler: applies channel updates to a render surface.
//!
//! This is the dispatch component of the bridge.  For each inbound
//! `(channel, value)` pair it:
//!
//! 1. Looks the channel up in the [`RouteTable`] (exact match, no parsing of
//!    the dotted name).
//! 2. Parses the raw value for the route's [`Strategy`] into a typed
//!    [`Effect`].  The whole value is parsed before anything is touched.
//! 3. Resolves the route's target element on the [`RenderSurface`].
//! 4. Applies exactly one mutation to that element.
//! 5. Tells the observer `on_receive(channel, value)`.
//!
//! Any failure along the way stops the pipeline at that step: nothing is
//! mutated after a failed parse, and the observer is not called for an update
//! that did not land.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──initialize() / first handle_update()──▶ Ready
//! ```
//!
//! Initialization checks that every route's element exists.  A missing
//! element marks that one route unavailable and is logged; it never stops the
//! rest of the bridge.  Elements are looked up again on every update, so a
//! route becomes available again as soon as its element appears.
//!
//! # Errors are local
//!
//! [`DomHandler::handle_update`] never returns an error.  Unknown channels are
//! expected during partial rollouts and a bad value on one channel must not
//! affect the next update.  Failures are logged when the handler was built
//! with `debug = true`.  Callers that want to see the outcome use
//! [`DomHandler::try_handle_update`].

use std::collections::{BTreeSet, HashMap};

use domlink_core::{ChannelName, Effect, RouteTable, Strategy, ValueError};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::observer::{CallbackObserver, UpdateObserver};
use super::surface::{ElementHandle, RenderSurface, SurfaceError};

/// Why an update was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// No route exists for the channel.
    #[error("unknown channel {0:?}")]
    UnknownChannel(String),

    /// The value does not fit the route's strategy; nothing was changed.
    #[error("malformed value for channel {channel}: {source}")]
    MalformedValue {
        channel: ChannelName,
        #[source]
        source: ValueError,
    },

    /// The route's element could not be found on the render surface.
    #[error("target element {target:?} for channel {channel} is not available")]
    TargetUnavailable {
        channel: ChannelName,
        target: String,
    },

    /// The render surface rejected the mutation.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Lifecycle state of a [`DomHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Routes not yet resolved against the surface.
    Uninitialized,
    /// Routes resolved; accepting updates.
    Ready,
}

/// The channel-to-DOM dispatch component.
///
/// Generic over the render surface `S` and the observer `O` so tests can plug
/// in an in-memory surface and a recording observer.
pub struct DomHandler<S, O> {
    debug: bool,
    surface: S,
    routes: RouteTable,
    observer: O,
    state: HandlerState,
    /// Channels whose element was missing the last time it was looked up.
    unavailable: BTreeSet<ChannelName>,
    /// Last value successfully applied per channel (used by `echo`).
    last_values: HashMap<ChannelName, String>,
}

impl<S, O> DomHandler<S, O>
where
    S: RenderSurface,
    O: UpdateObserver,
{
    /// Creates a handler in the [`HandlerState::Uninitialized`] state.
    ///
    /// Nothing is resolved yet; the surface only has to be populated by the
    /// time [`initialize`](Self::initialize) or the first update runs.
    pub fn new(debug: bool, surface: S, routes: RouteTable, observer: O) -> Self {
        Self {
            debug,
            surface,
            routes,
            observer,
            state: HandlerState::Uninitialized,
            unavailable: BTreeSet::new(),
            last_values: HashMap::new(),
        }
    }

    /// Resolves every route's target and moves to [`HandlerState::Ready`].
    ///
    /// Calling this more than once has no further effect.
    pub fn initialize(&mut self) {
        if self.state == HandlerState::Ready {
            return;
        }

        for route in self.routes.iter() {
            if self.surface.resolve(&route.target).is_none() {
                warn!(
                    channel = %route.channel,
                    target = %route.target,
                    strategy = strategy_label(route.strategy),
                    "target element not found; route marked unavailable"
                );
                self.unavailable.insert(route.channel.clone());
            }
        }

        self.state = HandlerState::Ready;
        info!(
            routes = self.routes.len(),
            unavailable = self.unavailable.len(),
            "dom handler ready"
        );
    }

    /// Applies one inbound update.  Never fails; see the module docs.
    pub fn handle_update(&mut self, channel: &str, value: &str) {
        match self.try_handle_update(channel, value) {
            Ok(effect) => {
                if self.debug {
                    debug!(channel, value, ?effect, "update applied");
                }
            }
            Err(err) => {
                if self.debug {
                    warn!(channel, value, error = %err, "update ignored");
                }
            }
        }
    }

    /// Applies one inbound update and reports what happened.
    ///
    /// On success the returned [`Effect`] is the mutation that was applied,
    /// and the observer has been told `on_receive(channel, value)` exactly
    /// once.  On error nothing was mutated and the observer was not called.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::UnknownChannel`]: no route for `channel`.
    /// - [`UpdateError::MalformedValue`]: `value` does not fit the strategy.
    /// - [`UpdateError::TargetUnavailable`]: the element is not on the surface.
    /// - [`UpdateError::Surface`]: the surface rejected the mutation.
    pub fn try_handle_update(&mut self, channel: &str, value: &str) -> Result<Effect, UpdateError> {
        self.initialize();

        let route = self
            .routes
            .get(channel)
            .ok_or_else(|| UpdateError::UnknownChannel(channel.to_string()))?;

        let effect = route
            .effect_for(value)
            .map_err(|source| UpdateError::MalformedValue {
                channel: route.channel.clone(),
                source,
            })?;

        let Some(element) = self.surface.resolve(&route.target) else {
            self.unavailable.insert(route.channel.clone());
            return Err(UpdateError::TargetUnavailable {
                channel: route.channel.clone(),
                target: route.target.clone(),
            });
        };
        if self.unavailable.remove(&route.channel) {
            info!(channel = %route.channel, target = %route.target, "route available again");
        }

        apply_effect(&element, &effect)?;

        self.last_values
            .insert(route.channel.clone(), value.to_string());
        self.observer.on_receive(channel, value);
        Ok(effect)
    }

    /// Sends a value to the outbound observer port.
    ///
    /// This is the only path to `on_transmit`; plain inbound updates never
    /// trigger it.
    pub fn transmit(&self, channel: &str, value: &str) {
        if self.debug {
            debug!(channel, value, "transmit");
        }
        self.observer.on_transmit(channel, value);
    }

    /// Re-transmits the last value applied to `channel`.
    ///
    /// Returns `false` (and transmits nothing) if no value has been applied to
    /// that channel yet.
    pub fn echo(&self, channel: &str) -> bool {
        match self.last_values.get(channel) {
            Some(value) => {
                self.transmit(channel, value);
                true
            }
            None => {
                if self.debug {
                    debug!(channel, "nothing to echo");
                }
                false
            }
        }
    }

    /// The last value successfully applied to `channel`.
    pub fn last_value(&self, channel: &str) -> Option<&str> {
        self.last_values.get(channel).map(String::as_str)
    }

    /// Channels whose element was missing when last looked up.
    pub fn unavailable_routes(&self) -> impl Iterator<Item = &ChannelName> {
        self.unavailable.iter()
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<S, T, R> DomHandler<S, CallbackObserver<T, R>>
where
    S: RenderSurface,
    T: Fn(&str, &str),
    R: Fn(&str, &str),
{
    /// Builds a handler from two plain callbacks, in the order of the
    /// construction contract: `(debug, on_transmit, on_receive)`.
    pub fn with_callbacks(
        debug: bool,
        surface: S,
        routes: RouteTable,
        on_transmit: T,
        on_receive: R,
    ) -> Self {
        Self::new(
            debug,
            surface,
            routes,
            CallbackObserver::new(on_transmit, on_receive),
        )
    }
}

/// Performs the single mutation described by `effect`.
fn apply_effect<E: ElementHandle>(element: &E, effect: &Effect) -> Result<(), SurfaceError> {
    match effect {
        Effect::Text(text) => element.set_text(text),
        Effect::Hidden(hidden) => element.set_hidden(*hidden),
        Effect::Invisible(invisible) => element.set_invisible(*invisible),
        Effect::Disabled(disabled) => element.set_disabled(*disabled),
        Effect::Style(style) => element.apply_style(style),
    }
}

/// Short human-readable name of a strategy, for diagnostics.
fn strategy_label(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::SetText => "text",
        Strategy::SetVisibility(_) => "visibility",
        Strategy::SetStyle => "style",
        Strategy::SetEnabled => "enabled",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::observer::MockUpdateObserver;
    use crate::infrastructure::memory_surface::MemorySurface;
    use domlink_core::{Route, VisibilityMode};
    use std::rc::Rc;

    fn stock_surface() -> Rc<MemorySurface> {
        Rc::new(MemorySurface::for_routes(&RouteTable::default_routes(), &[]))
    }

    fn handler_with(
        surface: &Rc<MemorySurface>,
        observer: MockUpdateObserver,
    ) -> DomHandler<Rc<MemorySurface>, MockUpdateObserver> {
        DomHandler::new(true, Rc::clone(surface), RouteTable::default_routes(), observer)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    #[test]
    fn test_new_handler_is_uninitialized() {
        let surface = stock_surface();
        let handler = handler_with(&surface, MockUpdateObserver::new());
        assert_eq!(handler.state(), HandlerState::Uninitialized);
        assert!(handler.is_debug());
    }

    #[test]
    fn test_initialize_moves_to_ready() {
        let surface = stock_surface();
        let mut handler = handler_with(&surface, MockUpdateObserver::new());

        handler.initialize();

        assert_eq!(handler.state(), HandlerState::Ready);
        assert_eq!(handler.unavailable_routes().count(), 0);
    }

    #[test]
    fn test_first_update_initializes_lazily() {
        // Arrange
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().times(1).return_const(());
        let mut handler = handler_with(&surface, observer);

        // Act
        handler.handle_update("lights.info", "50%");

        // Assert
        assert_eq!(handler.state(), HandlerState::Ready);
    }

    #[test]
    fn test_missing_element_marks_only_that_route_unavailable() {
        // Arrange: the surface has every element except "hdmi"
        let surface = Rc::new(MemorySurface::for_routes(
            &RouteTable::default_routes(),
            &["hdmi".to_string()],
        ));
        let mut observer = MockUpdateObserver::new();
        observer
            .expect_on_receive()
            .withf(|ch, v| ch == "lights.info" && v == "50%")
            .times(1)
            .return_const(());
        let mut handler = handler_with(&surface, observer);

        // Act
        handler.initialize();
        let hdmi = handler.try_handle_update("hdmi.disable", "1");
        let info = handler.try_handle_update("lights.info", "50%");

        // Assert: one missing widget does not disable the bridge
        let unavailable: Vec<&str> = handler.unavailable_routes().map(|c| c.as_str()).collect();
        assert_eq!(unavailable, ["hdmi.disable"]);
        assert!(matches!(hdmi, Err(UpdateError::TargetUnavailable { .. })));
        assert!(info.is_ok());
    }

    #[test]
    fn test_route_recovers_when_element_appears() {
        // Arrange
        let surface = Rc::new(MemorySurface::for_routes(
            &RouteTable::default_routes(),
            &["hdmi".to_string()],
        ));
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().times(1).return_const(());
        let mut handler = handler_with(&surface, observer);
        handler.initialize();

        // Act: the page adds the element after initialization
        surface.add_element("hdmi");
        let result = handler.try_handle_update("hdmi.disable", "1");

        // Assert
        assert_eq!(result, Ok(Effect::Disabled(true)));
        assert_eq!(handler.unavailable_routes().count(), 0);
        assert!(surface.element("hdmi").unwrap().disabled);
    }

    #[test]
    fn test_element_removed_after_initialize_makes_route_unavailable() {
        // Arrange
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer
            .expect_on_receive()
            .withf(|ch, v| ch == "lights.info" && v == "50%")
            .times(1)
            .return_const(());
        let mut handler = handler_with(&surface, observer);
        handler.initialize();
        assert_eq!(handler.unavailable_routes().count(), 0);

        // Act: the page drops the element while the bridge is running
        assert!(surface.remove_element("lights-info"));
        let gone = handler.try_handle_update("lights.info", "100%");
        surface.add_element("lights-info");
        let back = handler.try_handle_update("lights.info", "50%");

        // Assert
        assert_eq!(
            gone,
            Err(UpdateError::TargetUnavailable {
                channel: ChannelName::new("lights.info").unwrap(),
                target: "lights-info".into(),
            })
        );
        assert_eq!(back, Ok(Effect::Text("50%".into())));
        assert_eq!(handler.last_value("lights.info"), Some("50%"));
        assert_eq!(handler.unavailable_routes().count(), 0);
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    #[test]
    fn test_known_channel_notifies_receive_once_with_original_arguments() {
        // Arrange
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer
            .expect_on_receive()
            .withf(|ch, v| ch == "computer.hidden" && v == "1")
            .times(1)
            .return_const(());
        observer.expect_on_transmit().never();
        let mut handler = handler_with(&surface, observer);

        // Act
        handler.handle_update("computer.hidden", "1");

        // Assert
        assert_eq!(surface.mutation_count("computer"), 1);
        assert!(surface.element("computer").unwrap().hidden);
    }

    #[test]
    fn test_unknown_channel_is_silent_no_op() {
        // Arrange
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().never();
        observer.expect_on_transmit().never();
        let mut handler = handler_with(&surface, observer);

        // Act
        let result = handler.try_handle_update("garage.door", "1");
        handler.handle_update("garage.door", "1");

        // Assert
        assert_eq!(result, Err(UpdateError::UnknownChannel("garage.door".into())));
        assert_eq!(surface.total_mutations(), 0);
    }

    #[test]
    fn test_malformed_flag_leaves_element_untouched() {
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().never();
        let mut handler = handler_with(&surface, observer);

        let result = handler.try_handle_update("hdmi.disable", "yes");

        assert!(matches!(
            result,
            Err(UpdateError::MalformedValue {
                source: ValueError::NotAFlag(_),
                ..
            })
        ));
        assert_eq!(surface.mutation_count("hdmi"), 0);
    }

    #[test]
    fn test_malformed_style_leaves_style_unchanged() {
        // Arrange: apply a valid style first
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer
            .expect_on_receive()
            .withf(|ch, v| ch == "lights.off.style" && v == r#"{"color":"red"}"#)
            .times(1)
            .return_const(());
        let mut handler = handler_with(&surface, observer);
        handler.handle_update("lights.off.style", r#"{"color":"red"}"#);

        // Act
        handler.handle_update("lights.off.style", "{not json");

        // Assert
        let el = surface.element("lights-off").unwrap();
        assert_eq!(el.style.get("color").map(String::as_str), Some("red"));
        assert_eq!(el.mutations, 1);
    }

    #[test]
    fn test_surface_rejection_is_reported_and_not_observed() {
        // Arrange
        let surface = stock_surface();
        surface.set_should_fail(true);
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().never();
        let mut handler = handler_with(&surface, observer);

        // Act
        let result = handler.try_handle_update("lights.info", "50%");

        // Assert
        assert!(matches!(result, Err(UpdateError::Surface(_))));
        assert_eq!(handler.last_value("lights.info"), None);
    }

    #[test]
    fn test_error_does_not_block_next_update() {
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().times(1).return_const(());
        let mut handler = handler_with(&surface, observer);

        handler.handle_update("lights.off.style", "{not json");
        handler.handle_update("lights.info", "100%");

        assert_eq!(surface.element("lights-info").unwrap().text, "100%");
    }

    #[test]
    fn test_inverted_polarity_route() {
        // laptop.active: "1" means the laptop control is active (enabled)
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().times(2).return_const(());
        let mut handler = handler_with(&surface, observer);

        handler.handle_update("laptop.active", "0");
        assert!(surface.element("laptop").unwrap().disabled);

        handler.handle_update("laptop.active", "1");
        assert!(!surface.element("laptop").unwrap().disabled);
    }

    #[test]
    fn test_invisible_route_keeps_hidden_flag_clear() {
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().times(1).return_const(());
        let mut handler = handler_with(&surface, observer);

        handler.handle_update("conference.invisible", "1");

        let el = surface.element("conference").unwrap();
        assert!(el.invisible);
        assert!(!el.hidden);
    }

    #[test]
    fn test_custom_route_table() {
        // Arrange: a table with a single inverted visibility route
        let routes = RouteTable::from_routes([Route::new(
            ChannelName::new("door.open").unwrap(),
            "door-panel",
            Strategy::SetVisibility(VisibilityMode::Hidden),
        )
        .with_polarity(domlink_core::Polarity::Inverted)])
        .unwrap();
        let surface = Rc::new(MemorySurface::with_elements(["door-panel"]));
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().times(1).return_const(());
        let mut handler = DomHandler::new(false, Rc::clone(&surface), routes, observer);

        // Act: "0" on an inverted visibility route hides the element
        handler.handle_update("door.open", "0");

        // Assert
        assert!(surface.element("door-panel").unwrap().hidden);
        assert!(handler.try_handle_update("lights.info", "1").is_err());
    }

    // ── Outbound ─────────────────────────────────────────────────────────────

    #[test]
    fn test_transmit_calls_on_transmit_once() {
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer
            .expect_on_transmit()
            .withf(|ch, v| ch == "hdmi.disable" && v == "0")
            .times(1)
            .return_const(());
        observer.expect_on_receive().never();
        let handler = handler_with(&surface, observer);

        handler.transmit("hdmi.disable", "0");

        assert_eq!(surface.total_mutations(), 0);
    }

    #[test]
    fn test_echo_retransmits_last_applied_value() {
        // Arrange
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_receive().times(2).return_const(());
        observer
            .expect_on_transmit()
            .withf(|ch, v| ch == "lights.info" && v == "100%")
            .times(1)
            .return_const(());
        let mut handler = handler_with(&surface, observer);
        handler.handle_update("lights.info", "50%");
        handler.handle_update("lights.info", "100%");

        // Act
        let echoed = handler.echo("lights.info");

        // Assert
        assert!(echoed);
        assert_eq!(handler.last_value("lights.info"), Some("100%"));
    }

    #[test]
    fn test_echo_without_value_transmits_nothing() {
        let surface = stock_surface();
        let mut observer = MockUpdateObserver::new();
        observer.expect_on_transmit().never();
        let handler = handler_with(&surface, observer);

        assert!(!handler.echo("lights.info"));
    }

    #[test]
    fn test_with_callbacks_keeps_argument_order() {
        // Arrange
        let received = std::cell::RefCell::new(Vec::new());
        let transmitted = std::cell::RefCell::new(Vec::new());
        let surface = stock_surface();
        let mut handler = DomHandler::with_callbacks(
            false,
            Rc::clone(&surface),
            RouteTable::default_routes(),
            |ch: &str, v: &str| transmitted.borrow_mut().push(format!("{ch}={v}")),
            |ch: &str, v: &str| received.borrow_mut().push(format!("{ch}={v}")),
        );

        // Act
        handler.handle_update("lights.info", "50%");
        handler.echo("lights.info");

        // Assert
        assert_eq!(received.borrow().as_slice(), ["lights.info=50%"]);
        assert_eq!(transmitted.borrow().as_slice(), ["lights.info=50%"]);
    }

    #[test]
    fn test_strategy_label() {
        assert_eq!(strategy_label(Strategy::SetText), "text");
        assert_eq!(
            strategy_label(Strategy::SetVisibility(VisibilityMode::Invisible)),
            "visibility"
        );
        assert_eq!(strategy_label(Strategy::SetStyle), "style");
        assert_eq!(strategy_label(Strategy::SetEnabled), "enabled");
    }
}
