//! `garden` is a lightweight embedded HTTP request router.
//!
//! Given an incoming method and path it selects the single best-matching
//! registered route, assembles its ordered handler chain and executes it, or
//! falls back to corrective behavior (trailing-slash redirects, 404s) when no
//! exact match exists. One compressing path tree per HTTP method is used for
//! matching; the fixed collection of trees is the garden. The router performs
//! no I/O: a hosting server hands it an already-parsed method and path and a
//! mutable per-request [`Context`].
//!
//! Here is a simple example:
//! ```rust
//! use garden::{Context, Handler, Router};
//! use http::Method;
//!
//! # fn main() -> Result<(), garden::RegisterError> {
//! let mut router = Router::new();
//! router.handle(
//!     Method::GET,
//!     "/hello/{user}",
//!     vec![Handler::new("hello", |ctx: &mut Context| {
//!         let user = ctx.params.by_name("user").unwrap_or("world").to_string();
//!         ctx.write(&format!("Hello, {}", user));
//!     })],
//! )?;
//! router.build()?;
//!
//! let mut ctx = Context::new(Method::GET, "", "/hello/gopher");
//! assert!(router.dispatch(&mut ctx));
//! assert_eq!(ctx.body(), b"Hello, gopher");
//! # Ok(())
//! # }
//! ```
//!
//! The registered path can contain two types of dynamic segments:
//! ```ignore
//!  Syntax        Type
//!  {name}        named parameter (optionally typed: {name:int})
//!  {*name}       wildcard parameter
//! ```
//!
//! Named parameters are dynamic path segments, validated against a macro
//! from the route's [`MacroMap`] (`{id:int}` rejects non-integer segments at
//! match time, falling through to other candidates). They match anything
//! until the next `/` or the path end:
//! ```ignore
//!  Path: /blog/{category}/{post}
//!
//!  Requests:
//!   /blog/rust/request-routers     match: category="rust", post="request-routers"
//!   /blog/rust/                    no match
//! ```
//!
//! Wildcard parameters must be the final path element and match everything
//! until the path end, including slashes:
//! ```ignore
//!  Path: /files/{*filepath}
//!
//!  Requests:
//!   /files/LICENSE                 match: filepath="LICENSE"
//!   /files/templates/article.html  match: filepath="templates/article.html"
//!   /files                         no match, but the router would redirect
//! ```
//!
//! A route's chain is composed of four ordered zones — begin, main, fallback
//! and done (see [`Route`]) — and is frozen by [`Router::build`] before
//! serving begins. [`DomainRouter`] adds host filtering on top of the same
//! matching logic, and [`MemoryRouter`] memoizes prepared lookups in a
//! [`MemoryRouterCache`] with tick-driven eviction.

#![deny(clippy::all)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod cache;
pub mod context;
pub mod error;
pub mod handler;
pub mod params;
pub mod route;
pub mod router;
pub mod template;
pub mod tree;

pub use cache::{CachedDispatch, MemoryRouter, MemoryRouterCache};
pub use context::Context;
pub use error::{InsertError, ParseError, RegisterError, ResolveError};
pub use handler::{Handler, Handlers};
pub use params::{Param, Params};
pub use route::{method_none, Route};
pub use router::{DomainRouter, ErrorHandlers, Garden, Router};
pub use template::{MacroFn, MacroMap, Template, TemplateParam};
pub use tree::{Lookup, Tree};
