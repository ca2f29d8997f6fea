//! Route registration and request dispatch.
//!
//! A [`Router`] is built in two phases. During registration, routes are
//! collected through [`handle`](Router::handle) / [`handle_many`](Router::handle_many)
//! and may be extended with begin/done/fallback handlers; [`build`](Router::build)
//! then freezes everything into the garden, the fixed collection of
//! per-method trees. Dispatch never mutates the garden, so serving requires
//! no locks; re-registration during live traffic is unsupported and must be
//! serialized externally, followed by another `build`.
//!
//! Dispatch resolves an incoming (method, path) against the garden and either
//! runs the matched chain, emits a trailing-slash redirect (path correction),
//! or falls back to the registered not-found handler. A handler panic is
//! caught once, at this boundary, and converted into the registered 500
//! handler; it is never retried and never crashes the process.

use crate::context::Context;
use crate::error::RegisterError;
use crate::handler::{Handler, Handlers};
use crate::params::Params;
use crate::route::{method_none, Route};
use crate::template::MacroMap;
use crate::tree::{Lookup, Tree};

use http::header::{HeaderValue, LOCATION};
use http::{Method, StatusCode};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

/// The ordered collection of per-method (optionally per-host) trees.
///
/// Fixed once the router is built; lookup is a linear scan, bounded by the
/// number of HTTP methods in use times the number of registered hosts.
#[derive(Default)]
pub struct Garden {
    trees: Vec<Tree>,
}

impl Garden {
    fn clear(&mut self) {
        self.trees.clear();
    }

    fn get_or_plant(&mut self, method: &Method, domain: &str) -> &mut Tree {
        let idx = self
            .trees
            .iter()
            .position(|tree| tree.method == *method && tree.domain == domain);
        match idx {
            Some(idx) => &mut self.trees[idx],
            None => {
                let tree = if domain.is_empty() {
                    Tree::new(method.clone())
                } else {
                    Tree::new_domain(method.clone(), domain)
                };
                self.trees.push(tree);
                self.trees.last_mut().expect("just planted")
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

/// The table of status-code handlers invoked for corrective responses.
///
/// 404 and 500 get plain-text defaults; both can be replaced per status.
pub struct ErrorHandlers {
    handlers: HashMap<StatusCode, Handler>,
}

impl Default for ErrorHandlers {
    fn default() -> Self {
        let mut table = ErrorHandlers {
            handlers: HashMap::new(),
        };
        table.on(
            StatusCode::NOT_FOUND,
            Handler::new("not_found", |ctx: &mut Context| {
                ctx.reset_body();
                ctx.status_code(StatusCode::NOT_FOUND);
                ctx.write("Not Found");
            }),
        );
        table.on(
            StatusCode::INTERNAL_SERVER_ERROR,
            Handler::new("internal_server_error", |ctx: &mut Context| {
                ctx.reset_body();
                ctx.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctx.write(
                    "The server encountered an unexpected condition which \
                     prevented it from fulfilling the request.",
                );
            }),
        );
        table
    }
}

impl ErrorHandlers {
    /// Registers the handler invoked for the given status code.
    pub fn on(&mut self, status: StatusCode, handler: Handler) {
        self.handlers.insert(status, handler);
    }

    /// Emits an error response for the given status code through its
    /// registered handler, or a bare status line if none is registered.
    pub fn emit(&self, status: StatusCode, ctx: &mut Context) {
        match self.handlers.get(&status) {
            Some(handler) => handler.call(ctx),
            None => {
                ctx.reset_body();
                ctx.status_code(status);
            }
        }
    }
}

/// The request router: per-method trees, dispatch policy and corrective
/// handlers.
pub struct Router {
    garden: Garden,
    macros: MacroMap,
    routes: Vec<Route>,
    fallback_route: Option<Route>,
    errors: ErrorHandlers,
    /// Enables trailing-slash redirect correction when a lookup reports that
    /// only the slash differs from a registered path.
    pub path_correction: bool,
    /// Permits path-correction redirects for methods other than GET/HEAD.
    /// Off by default: redirecting a request with a body is unsafe.
    pub redirect_all_methods: bool,
}

impl Default for Router {
    fn default() -> Self {
        Router {
            garden: Garden::default(),
            macros: MacroMap::default(),
            routes: Vec::new(),
            fallback_route: None,
            errors: ErrorHandlers::default(),
            path_correction: true,
            redirect_all_methods: false,
        }
    }
}

impl Router {
    pub fn new() -> Router {
        Router::default()
    }

    pub fn with_macros(macros: MacroMap) -> Router {
        Router {
            macros,
            ..Router::default()
        }
    }

    /// Registers a route for `method` and `path`. The last handler is the
    /// route's main handler; its name becomes the route's trace name.
    ///
    /// Returns the route's name, usable with [`route_mut`](Router::route_mut)
    /// to extend the route before (or between) builds.
    pub fn handle(
        &mut self,
        method: Method,
        path: &str,
        handlers: Handlers,
    ) -> Result<String, RegisterError> {
        self.handle_on(method, "", path, handlers)
    }

    /// Registers a host-scoped route. `subdomain` is the full host the route
    /// is served under, e.g. `admin.example.com`.
    pub fn handle_on(
        &mut self,
        method: Method,
        subdomain: &str,
        path: &str,
        handlers: Handlers,
    ) -> Result<String, RegisterError> {
        let main_handler_name = handlers
            .last()
            .map(|handler| handler.name().to_string())
            .ok_or(RegisterError::EmptyHandlers)?;
        let route = Route::new(
            method,
            subdomain,
            path,
            &main_handler_name,
            handlers,
            &self.macros,
        )?;
        let name = route.name.clone();
        self.routes.push(route);
        Ok(name)
    }

    /// Registers one route per (method, path) combination. Both lists are
    /// whitespace-separated; every combination shares the same handler chain.
    pub fn handle_many(
        &mut self,
        methods: &str,
        paths: &str,
        handlers: Handlers,
    ) -> Result<Vec<String>, RegisterError> {
        let mut names = Vec::new();
        for method in methods.split_whitespace() {
            let method = Method::from_bytes(method.as_bytes()).map_err(|_| {
                RegisterError::Parse(crate::error::ParseError::InvalidMethod {
                    name: method.to_string(),
                })
            })?;
            for path in paths.split_whitespace() {
                names.push(self.handle(method.clone(), path, handlers.clone())?);
            }
        }
        Ok(names)
    }

    /// Returns a registered route by name for incremental extension.
    pub fn route_mut(&mut self, name: &str) -> Option<&mut Route> {
        self.routes.iter_mut().find(|route| route.name == name)
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Prepends middleware to every registered route's begin zone.
    pub fn use_global(&mut self, handlers: Handlers) {
        for route in &mut self.routes {
            route.add_begin_handlers(handlers.clone());
        }
    }

    /// Appends cleanup handlers to every registered route's done zone.
    pub fn done_global(&mut self, handlers: Handlers) {
        for route in &mut self.routes {
            route.add_done_handlers(handlers.clone());
        }
    }

    /// Adds handlers to the global fallback route, which serves any request
    /// no other route matches. The first call creates the special route and
    /// requires at least one handler.
    pub fn fallback(&mut self, handlers: Handlers) -> Result<(), RegisterError> {
        match &mut self.fallback_route {
            Some(route) => {
                route.add_fallback_handlers(handlers);
                Ok(())
            }
            None => {
                let main_handler_name = handlers
                    .last()
                    .map(|handler| handler.name().to_string())
                    .ok_or(RegisterError::EmptyHandlers)?;
                let route = Route::new(
                    method_none(),
                    "",
                    "/",
                    &main_handler_name,
                    handlers,
                    &self.macros,
                )?
                .special();
                self.fallback_route = Some(route);
                Ok(())
            }
        }
    }

    /// Registers the handler invoked for the given corrective status code.
    pub fn on_error(&mut self, status: StatusCode, handler: Handler) {
        self.errors.on(status, handler);
    }

    /// Sets the handler for http status 404. The default writes
    /// "Not Found".
    pub fn on_not_found(&mut self, handler: Handler) {
        self.on_error(StatusCode::NOT_FOUND, handler);
    }

    /// Sets the handler invoked when a handler panics mid-chain. The default
    /// writes a plain 500 response.
    pub fn on_panic(&mut self, handler: Handler) {
        self.on_error(StatusCode::INTERNAL_SERVER_ERROR, handler);
    }

    /// Builds every route's chain and plants it into the garden, replacing
    /// any previous build.
    ///
    /// All registration errors (conflicting or duplicate routes) surface
    /// here, synchronously; request time can no longer fail. Must not run
    /// concurrently with dispatch.
    pub fn build(&mut self) -> Result<(), RegisterError> {
        self.garden.clear();

        for route in &mut self.routes {
            let chain = route.build_handlers();
            if chain.is_empty() || !route.is_online() {
                debug!("skipping offline or empty route {}", route);
                continue;
            }

            let insert_path = if route.subdomain.is_empty() {
                route.path.clone()
            } else {
                format!("{}{}", route.subdomain, route.path)
            };
            let tree = self.garden.get_or_plant(&route.method, &route.subdomain);
            tree.insert(&insert_path, route, chain)?;
            debug!("{}", route);
        }

        if let Some(fallback) = &mut self.fallback_route {
            fallback.build_handlers();
        }

        Ok(())
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    /// Resolves `path` against the tree registered for `method`, filling
    /// `params` on a hit. Host-scoped trees are not consulted; see
    /// [`DomainRouter`].
    pub fn lookup<'r>(&'r self, method: &Method, path: &str, params: &mut Params) -> Lookup<'r> {
        for tree in self.garden.iter() {
            if tree.hosts || tree.method != *method {
                continue;
            }
            return tree.lookup(path, params);
        }
        Lookup::NotFound
    }

    /// Dispatches the request held by `ctx` and returns true if a route's
    /// chain was executed.
    pub fn dispatch(&self, ctx: &mut Context) -> bool {
        let mut params = Params::new();
        let path = ctx.path.clone();
        match self.lookup(&ctx.method.clone(), &path, &mut params) {
            Lookup::Found {
                handlers,
                route_name,
            } => {
                trace!("{} {} -> {}", ctx.method, ctx.path, route_name);
                ctx.params = params;
                let chain = handlers.clone();
                self.serve_chain(&chain, ctx);
                true
            }
            Lookup::Redirect if self.path_correction => {
                self.redirect_corrected(ctx);
                false
            }
            _ => {
                self.serve_miss(ctx);
                false
            }
        }
    }

    /// Runs a built chain with the dispatch-level fault boundary: a panic in
    /// any handler abandons the chain and emits the registered 500 handler.
    pub(crate) fn serve_chain(&self, chain: &Handlers, ctx: &mut Context) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| ctx.run(chain)));
        if outcome.is_err() {
            error!("handler fault while serving {} {}", ctx.method, ctx.path);
            self.errors.emit(StatusCode::INTERNAL_SERVER_ERROR, ctx);
        }
    }

    /// Serves a request no tree matched: the global fallback route if one is
    /// registered, the 404 handler otherwise.
    pub(crate) fn serve_miss(&self, ctx: &mut Context) {
        if let Some(fallback) = &self.fallback_route {
            let chain = fallback.handlers().clone();
            if !chain.is_empty() {
                self.serve_chain(&chain, ctx);
                return;
            }
        }
        self.errors.emit(StatusCode::NOT_FOUND, ctx);
    }

    /// Emits the trailing-slash correction redirect.
    ///
    /// GET gets a 301 with a minimal HTML hint body; HEAD gets the bare 301.
    /// Other methods redirect (with 308, preserving the method) only when
    /// [`redirect_all_methods`](Router::redirect_all_methods) is enabled,
    /// and otherwise fall through to not-found.
    pub(crate) fn redirect_corrected(&self, ctx: &mut Context) {
        let safe = ctx.method == Method::GET || ctx.method == Method::HEAD;
        if !safe && !self.redirect_all_methods {
            self.serve_miss(ctx);
            return;
        }

        let corrected = correct_trailing_slash(&ctx.path);
        let location = if ctx.host.is_empty() {
            corrected.clone()
        } else {
            format!("{}://{}{}", ctx.scheme, ctx.host, corrected)
        };

        let status = if safe {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::PERMANENT_REDIRECT
        };
        ctx.status_code(status);
        if let Ok(value) = HeaderValue::from_str(&location) {
            ctx.header(LOCATION, value);
        }

        // RFC 2616 recommends a short note because older user agents may not
        // understand 301. Only GET carries it.
        if ctx.method == Method::GET {
            ctx.write(&format!(
                "<a href=\"{}\">Moved Permanently</a>.\n",
                html_escape(&location)
            ));
        }
    }
}

/// The host-filtering router variant.
///
/// Trees planted for a subdomain are eligible only when their domain equals
/// the request host (any `:port` suffix stripped); their routes were
/// inserted with the host-prefixed path, so the request path is prefixed the
/// same way before lookup. Global trees are consulted as usual.
pub struct DomainRouter {
    router: Router,
}

impl DomainRouter {
    pub fn new(router: Router) -> DomainRouter {
        DomainRouter { router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Dispatches the request held by `ctx`, filtering host-scoped trees by
    /// the request host before delegating to the shared matching logic.
    pub fn dispatch(&self, ctx: &mut Context) -> bool {
        let host = strip_port(&ctx.host).to_string();
        let method = ctx.method.clone();
        let mut params = Params::new();

        for tree in self.router.garden.iter() {
            if tree.method != method {
                continue;
            }
            let lookup_path = if tree.hosts {
                if tree.domain != host {
                    // not the host this tree expects
                    continue;
                }
                format!("{}{}", host, ctx.path)
            } else {
                ctx.path.clone()
            };

            match tree.lookup(&lookup_path, &mut params) {
                Lookup::Found {
                    handlers,
                    route_name,
                } => {
                    trace!("{} {}{} -> {}", method, host, ctx.path, route_name);
                    ctx.params = params;
                    let chain = handlers.clone();
                    self.router.serve_chain(&chain, ctx);
                    return true;
                }
                Lookup::Redirect if self.router.path_correction => {
                    self.router.redirect_corrected(ctx);
                    return false;
                }
                _ => continue,
            }
        }

        self.router.serve_miss(ctx);
        false
    }
}

/// Toggles the trailing slash on a request path, mirroring the tree's
/// redirect detection.
fn correct_trailing_slash(path: &str) -> String {
    if path.len() <= 1 {
        return "/".to_string();
    }
    match path.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => format!("{}/", path),
    }
}

fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_correction() {
        assert_eq!(correct_trailing_slash("/home/"), "/home");
        assert_eq!(correct_trailing_slash("/home"), "/home/");
        assert_eq!(correct_trailing_slash("/"), "/");
        assert_eq!(correct_trailing_slash(""), "/");
    }

    #[test]
    fn host_port_stripping() {
        assert_eq!(strip_port("example.com:8080"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
    }

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            html_escape("/a?<b>&\"c\""),
            "/a?&lt;b&gt;&amp;&#34;c&#34;"
        );
    }
}
