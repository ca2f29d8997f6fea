use crate::context::Context;

use std::fmt;
use std::sync::Arc;

/// A unit of work in a route's chain.
///
/// A handler receives the mutable per-request [`Context`] and either completes
/// normally, calls [`Context::stop_execution`] to abort the rest of the chain,
/// or panics (a fault, recovered once at the dispatch boundary).
///
/// Handlers carry an explicit name, used for route tracing in place of any
/// runtime reflection.
#[derive(Clone)]
pub struct Handler {
    name: Arc<str>,
    func: Arc<dyn Fn(&mut Context) + Send + Sync>,
}

impl Handler {
    pub fn new(name: &str, func: impl Fn(&mut Context) + Send + Sync + 'static) -> Handler {
        Handler {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, ctx: &mut Context) {
        (self.func)(ctx);
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({})", self.name)
    }
}

/// An ordered handler chain.
pub type Handlers = Vec<Handler>;
