use crate::error::{RegisterError, ResolveError};
use crate::handler::Handlers;
use crate::template::{MacroMap, Template, FORMAT_PLACEHOLDER};

use http::Method;
use std::fmt;
use std::mem;

/// The method sentinel marking a route as offline.
pub fn method_none() -> Method {
    Method::from_bytes(b"NONE").expect("NONE is a valid method token")
}

/// A registered route: one (method, subdomain, path template) tuple owning an
/// ordered handler chain.
///
/// The chain is logically partitioned into four zones, in execution order:
/// begin, main, fallback and done. Main handlers are fixed at construction;
/// the other zones accept incremental additions, before and after
/// [`build_handlers`](Route::build_handlers), with add-order preserved within
/// each zone. Two cursors track where the next begin/fallback batch must be
/// spliced so repeated additions land correctly without re-scanning the chain.
///
/// Special routes (party-level or global fallback routes) catch "no route
/// found" within a scope; for them the empty-input short-circuit of
/// [`add_fallback_handlers`](Route::add_fallback_handlers) is skipped.
#[derive(Debug)]
pub struct Route {
    pub name: String,
    pub method: Method,
    /// The host this route is scoped to. Empty means no host constraint.
    pub subdomain: String,
    template: Template,
    /// The router-internal path, template markers normalized to `:`/`*`.
    pub path: String,
    /// The path with every dynamic segment replaced by `%v`, used for
    /// reverse routing.
    pub formatted_path: String,
    pub main_handler_name: String,

    // main + fallback zones; begin/done are merged in on build.
    handlers: Handlers,
    begin_handlers: Handlers,
    done_handlers: Handlers,

    // zone cursors: where the next begin/fallback batch is spliced.
    begin_index: usize,
    fallback_index: usize,

    is_special: bool,
}

impl Route {
    /// Creates a route by parsing `raw_path` against the shared macro set.
    ///
    /// Fails when the template is malformed or references an unknown macro,
    /// or when `handlers` is empty: a route must always carry at least one
    /// main handler.
    pub fn new(
        method: Method,
        subdomain: &str,
        raw_path: &str,
        main_handler_name: &str,
        handlers: Handlers,
        macros: &MacroMap,
    ) -> Result<Route, RegisterError> {
        if handlers.is_empty() {
            return Err(RegisterError::EmptyHandlers);
        }

        let template = Template::parse(raw_path, macros)?;
        let fallback_index = handlers.len();
        let name = format!("{}{}{}", method, subdomain, template.src);

        Ok(Route {
            name,
            method,
            subdomain: subdomain.to_string(),
            path: template.path.clone(),
            formatted_path: template.formatted_path.clone(),
            template,
            main_handler_name: main_handler_name.to_string(),
            handlers,
            begin_handlers: Vec::new(),
            done_handlers: Vec::new(),
            begin_index: 0,
            fallback_index,
            is_special: false,
        })
    }

    /// Marks this route as a special (scope-level or global fallback) route.
    pub fn special(mut self) -> Route {
        self.is_special = true;
        self
    }

    pub fn is_special(&self) -> bool {
        self.is_special
    }

    /// A route whose method is the `NONE` sentinel is offline.
    pub fn is_online(&self) -> bool {
        self.method != method_none()
    }

    pub fn set_name(&mut self, name: &str) -> &mut Route {
        self.name = name.to_string();
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The chain as currently merged (main and fallback zones, plus any
    /// begin/done batches already folded in by a build). Pending batches
    /// added since the last build are not included.
    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Appends middleware to the pending begin zone. No-op on empty input.
    pub fn add_begin_handlers(&mut self, handlers: Handlers) {
        if handlers.is_empty() {
            return;
        }
        self.begin_handlers.extend(handlers);
    }

    /// Appends cleanup handlers to the pending done zone. No-op on empty input.
    pub fn add_done_handlers(&mut self, handlers: Handlers) {
        if handlers.is_empty() {
            return;
        }
        self.done_handlers.extend(handlers);
    }

    /// Splices fallback handlers at the tracked fallback cursor and advances
    /// it, so earlier zones keep their positions on rebuild.
    ///
    /// Empty input is a no-op for normal routes; special routes always go
    /// through the splice to preserve their state.
    pub fn add_fallback_handlers(&mut self, handlers: Handlers) {
        if handlers.is_empty() && !self.is_special {
            return;
        }

        let count = handlers.len();
        self.handlers
            .splice(self.fallback_index..self.fallback_index, handlers);
        self.fallback_index += count;
    }

    /// Merges the pending begin and done zones into the chain and returns the
    /// built chain.
    ///
    /// The resulting order is exactly: begin handlers, main handlers with
    /// fallback handlers spliced at their tracked index, done handlers — with
    /// add-order preserved within each zone. Calling this again without
    /// intervening additions returns the same chain (the zone buffers are
    /// drained on every build).
    ///
    /// An empty result means the route carries no executable behavior and
    /// must not be served through.
    ///
    /// Not safe to call while the router is serving traffic.
    pub fn build_handlers(&mut self) -> Handlers {
        let begin_count = self.begin_handlers.len();
        if begin_count > 0 {
            self.fallback_index += begin_count;
            let batch = mem::take(&mut self.begin_handlers);
            self.handlers.splice(self.begin_index..self.begin_index, batch);
            self.begin_index += begin_count;
        }

        if !self.done_handlers.is_empty() {
            let mut batch = mem::take(&mut self.done_handlers);
            self.handlers.append(&mut batch);
        }

        self.handlers.clone()
    }

    /// The registered path up to (not including) the first parameter
    /// delimiter.
    ///
    /// For `/user/{id}` this returns `/user`; for `/assets/{*file}` it
    /// returns `/assets`; static routes return their full path.
    pub fn static_path(&self) -> &str {
        let src = &self.template.src;
        match src.find('{') {
            None => src,
            Some(idx) => {
                let prefix = src[..idx].trim_end_matches('/');
                if prefix.is_empty() {
                    "/"
                } else {
                    prefix
                }
            }
        }
    }

    /// Re-materializes a concrete path from `args`, substituting each `%v`
    /// placeholder left-to-right.
    ///
    /// Static routes ignore `args`. Routes ending in a wildcard join all
    /// args with `/` and substitute once. Otherwise the argument count must
    /// equal the parameter count, in declaration order.
    pub fn resolve_path(&self, args: &[&str]) -> Result<String, ResolveError> {
        if self.template.is_static() {
            return Ok(self.path.clone());
        }

        if self.template.has_wildcard() {
            let non_wildcard = self.template.params.len() - 1;
            if args.len() < non_wildcard {
                return Err(ResolveError {
                    expected: non_wildcard,
                    got: args.len(),
                });
            }
            let mut resolved = self.formatted_path.clone();
            for arg in &args[..non_wildcard] {
                resolved = resolved.replacen(FORMAT_PLACEHOLDER, arg, 1);
            }
            let remainder = args[non_wildcard..].join("/");
            return Ok(resolved.replacen(FORMAT_PLACEHOLDER, &remainder, 1));
        }

        if args.len() != self.template.params.len() {
            return Err(ResolveError {
                expected: self.template.params.len(),
                got: args.len(),
            });
        }

        let mut resolved = self.formatted_path.clone();
        for arg in args {
            resolved = resolved.replacen(FORMAT_PLACEHOLDER, arg, 1);
        }
        Ok(resolved)
    }

}

impl fmt::Display for Route {
    /// The `METHOD subdomain/path (*)` trace form, with the main handler name
    /// and the count of any additional handlers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.method)?;
        if !self.subdomain.is_empty() {
            write!(f, " {}", self.subdomain)?;
        }
        write!(f, " {} ", self.template.src)?;
        match self.handlers.len() {
            0 | 1 => write!(f, "-> {}()", self.main_handler_name)?,
            n => write!(f, "-> {}() and {} more", self.main_handler_name, n - 1)?,
        }
        if self.is_special {
            write!(f, " (*)")?;
        }
        Ok(())
    }
}
