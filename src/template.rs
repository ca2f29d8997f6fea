//! Path templates and parameter macros.
//!
//! A route path is written with `{}` parameter syntax:
//!
//! ```ignore
//!  Syntax        Type
//!  {name}        named parameter, validated by the `string` macro
//!  {name:macro}  named parameter, validated by the named macro
//!  {*name}       wildcard, matches the rest of the path (final segment only)
//! ```
//!
//! Parsing produces a [`Template`]: the original source, the router-internal
//! path (`:name` / `*name` markers), the formatted reverse-routing path (every
//! dynamic segment replaced by `%v`), and the declaration-ordered parameter
//! list with one validator per parameter.

use crate::error::ParseError;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A parameter-type validator. Returns true if the captured path segment is
/// acceptable for this macro.
pub type MacroFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// The positional placeholder used in formatted (reverse-routing) paths.
pub const FORMAT_PLACEHOLDER: &str = "%v";

/// The set of named parameter-type validators available to path templates.
///
/// The default set registers `string`, `int`, `uint`, `alphabetical` and
/// `file`. Additional macros can be registered with [`MacroMap::register`]
/// before any route using them is created.
#[derive(Clone)]
pub struct MacroMap {
    macros: HashMap<String, MacroFn>,
}

impl Default for MacroMap {
    fn default() -> Self {
        let mut map = MacroMap {
            macros: HashMap::new(),
        };
        map.register("string", |s| !s.is_empty());
        map.register("int", |s| s.parse::<i64>().is_ok());
        map.register("uint", |s| s.parse::<u64>().is_ok());
        map.register("alphabetical", |s| {
            !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic())
        });
        map.register("file", |s| {
            !s.is_empty()
                && s.bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_')
        });
        map
    }
}

impl MacroMap {
    /// Registers a macro under the given name, replacing any previous one.
    pub fn register(&mut self, name: &str, validator: impl Fn(&str) -> bool + Send + Sync + 'static) {
        self.macros.insert(name.to_string(), Arc::new(validator));
    }

    pub fn get(&self, name: &str) -> Option<&MacroFn> {
        self.macros.get(name)
    }
}

impl fmt::Debug for MacroMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.macros.keys()).finish()
    }
}

/// A single dynamic slot in a parsed template, in declaration order.
#[derive(Clone)]
pub struct TemplateParam {
    pub name: String,
    /// The macro this parameter is validated against. Wildcards carry no
    /// macro and accept the raw remainder of the path.
    pub macro_name: String,
    pub validator: MacroFn,
    pub wildcard: bool,
}

impl fmt::Debug for TemplateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateParam")
            .field("name", &self.name)
            .field("macro_name", &self.macro_name)
            .field("wildcard", &self.wildcard)
            .finish()
    }
}

/// A parsed path template.
#[derive(Clone, Debug)]
pub struct Template {
    /// The original, user-written source, e.g. `/api/user/{id:int}`.
    pub src: String,
    /// The router-internal path, e.g. `/api/user/:id`.
    pub path: String,
    /// The source with every dynamic segment replaced by `%v`, used to
    /// re-materialize concrete paths from argument lists.
    pub formatted_path: String,
    /// Dynamic parameters in declaration order.
    pub params: Vec<TemplateParam>,
}

impl Template {
    /// Parses a raw path against the given macro set.
    pub fn parse(src: &str, macros: &MacroMap) -> Result<Template, ParseError> {
        let src = if src.starts_with('/') {
            src.to_string()
        } else {
            format!("/{}", src)
        };

        let mut params: Vec<TemplateParam> = Vec::new();
        let mut path_segments = Vec::new();
        let mut formatted_segments = Vec::new();

        let raw_segments: Vec<&str> = src[1..].split('/').collect();
        let last = raw_segments.len() - 1;

        for (i, segment) in raw_segments.iter().enumerate() {
            if !segment.starts_with('{') {
                if segment.contains('{') || segment.contains('}') {
                    return Err(ParseError::MalformedParam {
                        segment: (*segment).to_string(),
                    });
                }
                path_segments.push((*segment).to_string());
                formatted_segments.push((*segment).to_string());
                continue;
            }

            let inner = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .ok_or_else(|| ParseError::MalformedParam {
                    segment: (*segment).to_string(),
                })?;
            if inner.contains('{') || inner.contains('}') {
                return Err(ParseError::MalformedParam {
                    segment: (*segment).to_string(),
                });
            }

            let param = if let Some(name) = inner.strip_prefix('*') {
                if i != last {
                    return Err(ParseError::InvalidWildcard);
                }
                if name.is_empty() {
                    return Err(ParseError::UnnamedParam);
                }
                if name.contains(':') {
                    return Err(ParseError::MalformedParam {
                        segment: (*segment).to_string(),
                    });
                }
                path_segments.push(format!("*{}", name));
                TemplateParam {
                    name: name.to_string(),
                    macro_name: String::new(),
                    // the remainder of the path is accepted as-is
                    validator: Arc::new(|_: &str| true),
                    wildcard: true,
                }
            } else {
                let (name, macro_name) = match inner.split_once(':') {
                    Some((name, macro_name)) => (name, macro_name),
                    None => (inner, "string"),
                };
                if name.is_empty() {
                    return Err(ParseError::UnnamedParam);
                }
                let validator = macros.get(macro_name).ok_or_else(|| ParseError::UnknownMacro {
                    name: macro_name.to_string(),
                })?;
                path_segments.push(format!(":{}", name));
                TemplateParam {
                    name: name.to_string(),
                    macro_name: macro_name.to_string(),
                    validator: Arc::clone(validator),
                    wildcard: false,
                }
            };

            if params.iter().any(|p| p.name == param.name) {
                return Err(ParseError::DuplicateParam { name: param.name });
            }
            formatted_segments.push(FORMAT_PLACEHOLDER.to_string());
            params.push(param);
        }

        Ok(Template {
            src,
            path: format!("/{}", path_segments.join("/")),
            formatted_path: format!("/{}", formatted_segments.join("/")),
            params,
        })
    }

    /// Returns true if the template's final segment is a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.params.last().map(|p| p.wildcard).unwrap_or(false)
    }

    /// Returns true if the template carries no dynamic parameters.
    pub fn is_static(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Template, ParseError> {
        Template::parse(src, &MacroMap::default())
    }

    #[test]
    fn static_template() {
        let tmpl = parse("/api/users").unwrap();
        assert_eq!(tmpl.src, "/api/users");
        assert_eq!(tmpl.path, "/api/users");
        assert_eq!(tmpl.formatted_path, "/api/users");
        assert!(tmpl.is_static());
    }

    #[test]
    fn typed_params() {
        let tmpl = parse("/api/user/{id:int}/posts/{slug}").unwrap();
        assert_eq!(tmpl.path, "/api/user/:id/posts/:slug");
        assert_eq!(tmpl.formatted_path, "/api/user/%v/posts/%v");
        assert_eq!(tmpl.params.len(), 2);
        assert_eq!(tmpl.params[0].macro_name, "int");
        assert!((tmpl.params[0].validator)("42"));
        assert!(!(tmpl.params[0].validator)("abc"));
        assert_eq!(tmpl.params[1].macro_name, "string");
    }

    #[test]
    fn wildcard_template() {
        let tmpl = parse("/files/{*file}").unwrap();
        assert_eq!(tmpl.path, "/files/*file");
        assert_eq!(tmpl.formatted_path, "/files/%v");
        assert!(tmpl.has_wildcard());
    }

    #[test]
    fn wildcard_must_be_last() {
        assert_eq!(
            parse("/files/{*file}/x").unwrap_err(),
            ParseError::InvalidWildcard
        );
    }

    #[test]
    fn unknown_macro() {
        assert_eq!(
            parse("/user/{id:uuid}").unwrap_err(),
            ParseError::UnknownMacro {
                name: "uuid".to_string()
            }
        );
    }

    #[test]
    fn malformed_segments() {
        assert!(matches!(
            parse("/user/{id"),
            Err(ParseError::MalformedParam { .. })
        ));
        assert!(matches!(
            parse("/user/x{id}"),
            Err(ParseError::MalformedParam { .. })
        ));
        assert_eq!(parse("/user/{}").unwrap_err(), ParseError::UnnamedParam);
    }

    #[test]
    fn duplicate_param_name() {
        assert_eq!(
            parse("/a/{id}/b/{id:int}").unwrap_err(),
            ParseError::DuplicateParam {
                name: "id".to_string()
            }
        );
    }

    #[test]
    fn custom_macro() {
        let mut macros = MacroMap::default();
        macros.register("even", |s| s.parse::<u64>().map(|n| n % 2 == 0).unwrap_or(false));
        let tmpl = Template::parse("/n/{n:even}", &macros).unwrap();
        assert!((tmpl.params[0].validator)("4"));
        assert!(!(tmpl.params[0].validator)("3"));
    }
}
