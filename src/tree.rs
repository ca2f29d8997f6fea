//! The per-method path trie.
//!
//! One [`Tree`] holds every route registered for a single HTTP method
//! (optionally scoped to one host). Nodes are keyed by path segment: each
//! node carries a static edge set, at most one named-parameter edge and at
//! most one wildcard edge. Matching tries static edges first, then the
//! parameter edge (validating the captured segment against its macro, with
//! backtracking on failure), then the wildcard edge, which consumes the
//! remainder of the path including slashes.
//!
//! A path that differs from a registered one only by a trailing slash is
//! reported as [`Lookup::Redirect`] so the router can apply path correction.

use crate::error::InsertError;
use crate::handler::Handlers;
use crate::params::{Param, Params};
use crate::route::Route;
use crate::template::MacroFn;

use http::Method;
use std::sync::Arc;

/// The terminal payload of a registered route.
#[derive(Clone)]
struct Terminal {
    handlers: Handlers,
    route_name: String,
    /// The registered template source, reported in conflict errors.
    src: String,
}

struct ParamEdge {
    name: String,
    macro_name: String,
    validator: MacroFn,
    /// The template that first registered this edge, reported on conflicts.
    src: String,
    child: Box<Node>,
}

struct WildcardEdge {
    name: String,
    terminal: Terminal,
}

#[derive(Default)]
struct Node {
    statics: Vec<(String, Node)>,
    param: Option<ParamEdge>,
    wildcard: Option<WildcardEdge>,
    terminal: Option<Terminal>,
}

/// The result of a tree lookup.
pub enum Lookup<'t> {
    /// A route matched; its built chain and extracted parameters.
    Found {
        handlers: &'t Handlers,
        route_name: &'t str,
    },
    /// No exact match, but the path with its trailing slash toggled is
    /// registered; the router should redirect if path correction is enabled.
    Redirect,
    NotFound,
}

/// A tree of routes for one HTTP method, optionally scoped to one host.
pub struct Tree {
    pub method: Method,
    /// True when this tree only serves one host; its routes are inserted
    /// with the host-prefixed path so they cannot collide with global ones.
    pub hosts: bool,
    pub domain: String,
    root: Node,
}

impl Tree {
    pub fn new(method: Method) -> Tree {
        Tree {
            method,
            hosts: false,
            domain: String::new(),
            root: Node::default(),
        }
    }

    pub fn new_domain(method: Method, domain: &str) -> Tree {
        Tree {
            method,
            hosts: true,
            domain: domain.to_string(),
            root: Node::default(),
        }
    }

    /// Inserts a route's built handler chain under `path`.
    ///
    /// `path` is the router-internal form (`:name` / `*name` markers),
    /// host-prefixed for host-scoped trees; the validators come from the
    /// route's parsed template. Ambiguous or duplicate registrations fail
    /// with [`InsertError::Conflict`].
    pub fn insert(
        &mut self,
        path: &str,
        route: &Route,
        handlers: Handlers,
    ) -> Result<(), InsertError> {
        let src = route.template().src.as_str();
        let terminal = Terminal {
            handlers,
            route_name: route.name.clone(),
            src: src.to_string(),
        };

        let mut node = &mut self.root;
        let mut param_meta = route.template().params.iter();

        for segment in split_path(path) {
            if let Some(name) = segment.strip_prefix(':') {
                if let Some(wildcard) = &node.wildcard {
                    return Err(conflict(&wildcard.terminal.src));
                }

                let (macro_name, validator) = match param_meta.next() {
                    Some(meta) if !meta.wildcard => {
                        (meta.macro_name.clone(), Arc::clone(&meta.validator))
                    }
                    _ => (String::from("string"), Arc::new(not_empty) as MacroFn),
                };

                let edge = match &mut node.param {
                    Some(edge) => {
                        if edge.name != name || edge.macro_name != macro_name {
                            return Err(conflict(&edge.src));
                        }
                        edge
                    }
                    none @ None => none.insert(ParamEdge {
                        name: name.to_string(),
                        macro_name,
                        validator,
                        src: src.to_string(),
                        child: Box::new(Node::default()),
                    }),
                };
                node = edge.child.as_mut();
            } else if let Some(name) = segment.strip_prefix('*') {
                if let Some(edge) = &node.param {
                    return Err(conflict(&edge.src));
                }
                if let Some(existing) = &node.wildcard {
                    return Err(conflict(&existing.terminal.src));
                }
                node.wildcard = Some(WildcardEdge {
                    name: name.to_string(),
                    terminal,
                });
                return Ok(());
            } else {
                let idx = match node.statics.iter().position(|(label, _)| label == segment) {
                    Some(idx) => idx,
                    None => {
                        node.statics.push((segment.to_string(), Node::default()));
                        node.statics.len() - 1
                    }
                };
                node = &mut node.statics[idx].1;
            }
        }

        if let Some(existing) = &node.terminal {
            return Err(conflict(&existing.src));
        }
        node.terminal = Some(terminal);
        Ok(())
    }

    /// Walks the tree for `path`, filling `params` with captured values.
    ///
    /// Deterministic for a fixed tree and input: static edges win over the
    /// parameter edge, which wins over the wildcard edge.
    pub fn lookup<'t>(&'t self, path: &str, params: &mut Params) -> Lookup<'t> {
        params.clear();
        let segments = split_path(path);
        if let Some(terminal) = find(&self.root, &segments, params) {
            return Lookup::Found {
                handlers: &terminal.handlers,
                route_name: &terminal.route_name,
            };
        }

        // trailing-slash correction: report a redirect when only the slash
        // differs from a registered path.
        if let Some(toggled) = toggle_trailing_slash(path) {
            params.clear();
            let mut scratch = Params::new();
            if find(&self.root, &split_path(&toggled), &mut scratch).is_some() {
                return Lookup::Redirect;
            }
        }

        Lookup::NotFound
    }
}

fn conflict(with: &str) -> InsertError {
    InsertError::Conflict {
        with: with.to_string(),
    }
}

fn not_empty(s: &str) -> bool {
    !s.is_empty()
}

/// Splits a rooted path into segments. `/` becomes `[""]`, `/home/` becomes
/// `["home", ""]`, so a trailing slash is an ordinary (empty) final segment.
fn split_path(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

/// Returns the path with its trailing slash toggled, or `None` for the root.
fn toggle_trailing_slash(path: &str) -> Option<String> {
    if path.len() <= 1 {
        return None;
    }
    match path.strip_suffix('/') {
        Some(stripped) => Some(stripped.to_string()),
        None => Some(format!("{}/", path)),
    }
}

fn find<'t>(node: &'t Node, segments: &[&str], params: &mut Params) -> Option<&'t Terminal> {
    let (segment, rest) = match segments.split_first() {
        None => return node.terminal.as_ref(),
        Some(split) => split,
    };

    if let Some((_, child)) = node.statics.iter().find(|(label, _)| label == segment) {
        if let Some(terminal) = find(child, rest, params) {
            return Some(terminal);
        }
    }

    if let Some(edge) = &node.param {
        if !segment.is_empty() && (edge.validator)(segment) {
            let mark = params.len();
            params.push(Param::new(&edge.name, segment));
            if let Some(terminal) = find(&edge.child, rest, params) {
                return Some(terminal);
            }
            // abandoned branch: discard the capture and try the next edge
            params.truncate(mark);
        }
    }

    if let Some(edge) = &node.wildcard {
        params.push(Param::new(&edge.name, &segments.join("/")));
        return Some(&edge.terminal);
    }

    None
}
