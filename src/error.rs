use std::fmt;

/// Represents errors that can occur when parsing a route path template.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ParseError {
    /// The template references a parameter macro that was never registered.
    UnknownMacro {
        /// The unregistered macro name.
        name: String,
    },
    /// A segment mixes literal characters with `{}` parameter syntax,
    /// or contains unbalanced braces.
    MalformedParam {
        /// The offending path segment.
        segment: String,
    },
    /// Parameters must be registered with a name.
    UnnamedParam,
    /// Wildcard parameters are only allowed in the final path segment.
    InvalidWildcard,
    /// A parameter name may appear at most once per template.
    DuplicateParam {
        /// The repeated parameter name.
        name: String,
    },
    /// A method token in a `handle_many` registration is not a valid HTTP
    /// method.
    InvalidMethod {
        /// The rejected token.
        name: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMacro { name } => {
                write!(f, "path template references unknown macro '{}'", name)
            }
            Self::MalformedParam { segment } => {
                write!(f, "malformed parameter syntax in segment '{}'", segment)
            }
            Self::UnnamedParam => write!(f, "parameters must be registered with a name"),
            Self::InvalidWildcard => write!(
                f,
                "wildcard parameters are only allowed in the final path segment"
            ),
            Self::DuplicateParam { name } => {
                write!(f, "parameter '{}' is declared more than once", name)
            }
            Self::InvalidMethod { name } => {
                write!(f, "'{}' is not a valid HTTP method", name)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Represents errors that can occur when planting a route into a tree.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum InsertError {
    /// Attempted to insert a path that conflicts with an existing route.
    Conflict {
        /// The existing route that the insertion is conflicting with.
        with: String,
    },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { with } => {
                write!(
                    f,
                    "insertion failed due to conflict with previously registered route: {}",
                    with
                )
            }
        }
    }
}

impl std::error::Error for InsertError {}

/// Represents errors surfaced synchronously to a caller registering routes.
///
/// All of these are configuration errors: they are reported at registration
/// or build time and can never occur while serving a request.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RegisterError {
    /// The route's path template failed to parse.
    Parse(ParseError),
    /// The route conflicts with a previously registered one.
    Insert(InsertError),
    /// A route must always carry at least one main handler.
    EmptyHandlers,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => err.fmt(f),
            Self::Insert(err) => err.fmt(f),
            Self::EmptyHandlers => write!(f, "a route cannot be registered without handlers"),
        }
    }
}

impl std::error::Error for RegisterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Insert(err) => Some(err),
            Self::EmptyHandlers => None,
        }
    }
}

impl From<ParseError> for RegisterError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<InsertError> for RegisterError {
    fn from(err: InsertError) -> Self {
        Self::Insert(err)
    }
}

/// Reverse routing was given the wrong number of arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolveError {
    /// How many dynamic parameters the route declares.
    pub expected: usize,
    /// How many arguments the caller supplied.
    pub got: usize,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "route expects {} path argument(s) but {} were supplied",
            self.expected, self.got
        )
    }
}

impl std::error::Error for ResolveError {}
