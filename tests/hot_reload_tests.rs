use flapi::catalog::EndpointCatalog;
use flapi::config::{ConfigSource, YamlConfigSource};
use flapi::hot_reload::watch_config;
use flapi::router::RouteResolver;
use http::Method;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::temp_files::ConfigDir;

const CONFIG_V1: &str = "project_name: reload\nendpoints:\n  - url-path: /foo/:id\n";
const CONFIG_V2: &str = "project_name: reload\nendpoints:\n  - url-path: /bar/:id\n";
const CONFIG_BROKEN: &str = "project_name: reload\nendpoints:\n  - url-path: /bar//:id\n";

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..40 {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn test_watch_config_reload() {
    let dir = ConfigDir::new(CONFIG_V1);
    let source: Arc<dyn ConfigSource> = Arc::new(YamlConfigSource::new(dir.config_path()));
    let catalog = Arc::new(EndpointCatalog::load(source.as_ref()).unwrap());
    let resolver = RouteResolver::new(Arc::clone(&catalog));
    assert!(resolver.resolve(&Method::GET, "/foo/1").is_some());

    let watcher = watch_config(dir.config_path(), Arc::clone(&catalog), source).expect("watch_config");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));
    dir.rewrite(CONFIG_V2);

    assert!(wait_for(|| resolver.resolve(&Method::GET, "/bar/1").is_some()));
    assert!(resolver.resolve(&Method::GET, "/foo/1").is_none());

    drop(watcher);
}

#[test]
fn test_invalid_edit_keeps_previous_catalog() {
    let dir = ConfigDir::new(CONFIG_V1);
    let source: Arc<dyn ConfigSource> = Arc::new(YamlConfigSource::new(dir.config_path()));
    let catalog = Arc::new(EndpointCatalog::load(source.as_ref()).unwrap());
    let resolver = RouteResolver::new(Arc::clone(&catalog));

    let watcher = watch_config(dir.config_path(), Arc::clone(&catalog), source).expect("watch_config");
    std::thread::sleep(Duration::from_millis(100));

    dir.rewrite(CONFIG_BROKEN);
    std::thread::sleep(Duration::from_millis(500));
    assert!(resolver.resolve(&Method::GET, "/foo/1").is_some());

    // A later valid edit is still picked up
    dir.rewrite(CONFIG_V2);
    assert!(wait_for(|| resolver.resolve(&Method::GET, "/bar/1").is_some()));

    drop(watcher);
}
