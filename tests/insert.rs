use garden::{Context, Handler, Handlers, InsertError, MacroMap, RegisterError, Route, Router, Tree};
use http::Method;

fn noop() -> Handlers {
    vec![Handler::new("noop", |_: &mut Context| {})]
}

fn conflict(with: &str) -> Result<(), InsertError> {
    Err(InsertError::Conflict {
        with: with.to_string(),
    })
}

struct InsertTest(Vec<(&'static str, Result<(), InsertError>)>);

impl InsertTest {
    fn run(self) {
        let macros = MacroMap::default();
        let mut tree = Tree::new(Method::GET);
        for (template, expected) in self.0 {
            let mut route = Route::new(Method::GET, "", template, "noop", noop(), &macros)
                .unwrap_or_else(|err| panic!("parse {}: {}", template, err));
            let chain = route.build_handlers();
            let path = route.path.clone();
            let got = tree.insert(&path, &route, chain);
            assert_eq!(got, expected, "inserting {}", template);
        }
    }
}

#[test]
fn duplicate_routes() {
    InsertTest(vec![
        ("/", Ok(())),
        ("/", conflict("/")),
        ("/doc/", Ok(())),
        ("/doc/", conflict("/doc/")),
    ])
    .run();
}

#[test]
fn wildcard_conflicts_with_param() {
    InsertTest(vec![
        ("/cmd/{tool}", Ok(())),
        ("/cmd/{*path}", conflict("/cmd/{tool}")),
    ])
    .run();
}

#[test]
fn param_conflicts_with_wildcard() {
    InsertTest(vec![
        ("/src/{*filepath}", Ok(())),
        ("/src/{file}", conflict("/src/{*filepath}")),
    ])
    .run();
}

#[test]
fn duplicate_wildcards() {
    InsertTest(vec![
        ("/src/{*filepath}", Ok(())),
        ("/src/{*other}", conflict("/src/{*filepath}")),
    ])
    .run();
}

#[test]
fn param_name_mismatch() {
    InsertTest(vec![
        ("/cmd/{tool}/{sub}", Ok(())),
        ("/cmd/{xxx}/names", conflict("/cmd/{tool}/{sub}")),
    ])
    .run();
}

#[test]
fn param_macro_mismatch() {
    InsertTest(vec![
        ("/user/{id:int}", Ok(())),
        ("/user/{id}", conflict("/user/{id:int}")),
    ])
    .run();
}

#[test]
fn param_edge_is_reusable() {
    InsertTest(vec![
        ("/user/{id:int}", Ok(())),
        ("/user/{id:int}/posts", Ok(())),
        ("/user/{id:int}/settings", Ok(())),
    ])
    .run();
}

#[test]
fn statics_coexist_with_params() {
    InsertTest(vec![
        ("/search/{query}", Ok(())),
        ("/search/new", Ok(())),
        ("/search/{query}/go", Ok(())),
    ])
    .run();
}

#[test]
fn wildcard_coexists_with_trailing_slash_terminal() {
    InsertTest(vec![
        ("/src1/", Ok(())),
        ("/src1/{*filepath}", Ok(())),
    ])
    .run();
}

#[test]
fn build_surfaces_conflicts() {
    let mut router = Router::new();
    router
        .handle(Method::GET, "/cmd/{tool}", noop())
        .unwrap();
    router
        .handle(Method::GET, "/cmd/{xxx}", noop())
        .unwrap();

    let err = router.build().unwrap_err();
    assert!(matches!(err, RegisterError::Insert(_)));
}

#[test]
fn methods_do_not_conflict() {
    let mut router = Router::new();
    router.handle(Method::GET, "/home", noop()).unwrap();
    router.handle(Method::POST, "/home", noop()).unwrap();
    router.build().unwrap();
    assert_eq!(router.garden().len(), 2);
}

#[test]
fn rebuild_replants_without_conflicts() {
    let mut router = Router::new();
    router.handle(Method::GET, "/a", noop()).unwrap();
    router.build().unwrap();

    router.handle(Method::GET, "/b", noop()).unwrap();
    router.build().unwrap();
    assert_eq!(router.garden().len(), 1);
}
