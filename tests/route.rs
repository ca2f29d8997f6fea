use garden::{Handler, Handlers, MacroMap, RegisterError, ResolveError, Route, Router};
use http::Method;

fn h(name: &'static str) -> Handler {
    Handler::new(name, |_ctx| {})
}

fn route(path: &str) -> Route {
    Route::new(Method::GET, "", path, "m", vec![h("m")], &MacroMap::default()).unwrap()
}

fn names(chain: &Handlers) -> Vec<&str> {
    chain.iter().map(Handler::name).collect()
}

#[test]
fn zones_merge_in_order() {
    let mut route = route("/zoned");
    route.add_begin_handlers(vec![h("a")]);
    route.add_fallback_handlers(vec![h("f")]);
    route.add_done_handlers(vec![h("d")]);

    let chain = route.build_handlers();
    assert_eq!(names(&chain), ["a", "m", "f", "d"]);
}

#[test]
fn incremental_additions_land_in_their_zones() {
    let mut route = route("/zoned");
    route.add_begin_handlers(vec![h("a")]);
    route.add_fallback_handlers(vec![h("f")]);
    route.add_done_handlers(vec![h("d")]);
    route.build_handlers();

    // a fallback batch added after a build still lands before the done zone
    route.add_fallback_handlers(vec![h("f2")]);
    let chain = route.build_handlers();
    assert_eq!(names(&chain), ["a", "m", "f", "f2", "d"]);

    // a begin batch added after a build lands after earlier begin handlers
    route.add_begin_handlers(vec![h("a2")]);
    let chain = route.build_handlers();
    assert_eq!(names(&chain), ["a", "a2", "m", "f", "f2", "d"]);
}

#[test]
fn build_is_idempotent() {
    let mut route = route("/stable");
    route.add_begin_handlers(vec![h("a")]);
    route.add_done_handlers(vec![h("d")]);

    let first = route.build_handlers();
    let second = route.build_handlers();
    assert_eq!(names(&first), names(&second));
}

#[test]
fn empty_batches_are_ignored() {
    let mut route = route("/plain");
    route.add_begin_handlers(Vec::new());
    route.add_fallback_handlers(Vec::new());
    route.add_done_handlers(Vec::new());

    let chain = route.build_handlers();
    assert_eq!(names(&chain), ["m"]);
}

#[test]
fn routes_require_a_main_handler() {
    let err = Route::new(
        Method::GET,
        "",
        "/empty",
        "none",
        Vec::new(),
        &MacroMap::default(),
    )
    .unwrap_err();
    assert_eq!(err, RegisterError::EmptyHandlers);
}

#[test]
fn default_name_and_rename() {
    let mut route = route("/about");
    assert_eq!(route.name, "GET/about");
    route.set_name("about-page");
    assert_eq!(route.name, "about-page");
}

#[test]
fn static_paths() {
    assert_eq!(route("/about").static_path(), "/about");
    assert_eq!(route("/user/{id}").static_path(), "/user");
    assert_eq!(route("/assets/{*file}").static_path(), "/assets");
    assert_eq!(route("/{p}").static_path(), "/");
}

#[test]
fn formatted_paths() {
    assert_eq!(route("/about").formatted_path, "/about");
    assert_eq!(route("/api/user/{id:int}").formatted_path, "/api/user/%v");
    assert_eq!(route("/files/{*f}").formatted_path, "/files/%v");
}

#[test]
fn resolve_static_path() {
    let route = route("/about");
    assert_eq!(route.resolve_path(&[]).unwrap(), "/about");
    // static routes ignore surplus arguments
    assert_eq!(route.resolve_path(&["x"]).unwrap(), "/about");
}

#[test]
fn resolve_param_path() {
    let route = route("/api/user/{id:int}");
    assert_eq!(route.resolve_path(&["42"]).unwrap(), "/api/user/42");

    assert_eq!(
        route.resolve_path(&[]).unwrap_err(),
        ResolveError {
            expected: 1,
            got: 0
        }
    );
    assert_eq!(
        route.resolve_path(&["1", "2"]).unwrap_err(),
        ResolveError {
            expected: 1,
            got: 2
        }
    );
}

#[test]
fn resolve_wildcard_path() {
    let route = route("/files/{*f}");
    assert_eq!(
        route.resolve_path(&["a", "b", "c.txt"]).unwrap(),
        "/files/a/b/c.txt"
    );
    assert_eq!(route.resolve_path(&[]).unwrap(), "/files/");

    let mixed = Route::new(
        Method::GET,
        "",
        "/u/{name}/files/{*f}",
        "m",
        vec![h("m")],
        &MacroMap::default(),
    )
    .unwrap();
    assert_eq!(
        mixed.resolve_path(&["bob", "x", "y"]).unwrap(),
        "/u/bob/files/x/y"
    );
    assert_eq!(
        mixed.resolve_path(&[]).unwrap_err(),
        ResolveError {
            expected: 1,
            got: 0
        }
    );
}

#[test]
fn trace_form() {
    let mut route = route("/about");
    assert_eq!(format!("{}", route), "GET: /about -> m()");

    route.add_begin_handlers(vec![h("a"), h("b")]);
    route.build_handlers();
    assert_eq!(format!("{}", route), "GET: /about -> m() and 2 more");
}

#[test]
fn route_extension_through_the_router() {
    let mut router = Router::new();
    let name = router
        .handle(Method::GET, "/x", vec![h("m")])
        .unwrap();
    router
        .route_mut(&name)
        .unwrap()
        .add_done_handlers(vec![h("d")]);
    router.build().unwrap();

    let route = router.routes().find(|r| r.name == name).unwrap();
    assert_eq!(names(route.handlers()), ["m", "d"]);
}
