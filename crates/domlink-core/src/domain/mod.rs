//! Domain entities for domlink.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain**.  Domain code:
//!
//! - Contains the core rules of the application.
//! - Has **no** imports from DOM bindings, network libraries, or UI frameworks.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! For domlink the rules are: a channel maps to exactly one element and one
//! update strategy, and a raw string value is only meaningful once it has been
//! parsed for that strategy.

/// Channel names: the lookup keys of the feed.
pub mod channel;

/// Routes and the route table.
///
/// See [`route::RouteTable`] for the main type.
pub mod route;

/// Raw value → typed visual effect conversion.
pub mod value;
