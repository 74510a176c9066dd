//! Unit tests for CLI commands

use std::sync::Arc;

use clap::Parser;
use http::Method;

use crate::cli::{build_demo_router, Cli, Commands};
use crate::middleware::MetricsMiddleware;

#[test]
fn test_serve_command_with_flags() {
    let cli = Cli::try_parse_from([
        "burrow",
        "serve",
        "--addr",
        "127.0.0.1:9000",
        "--config",
        "burrow.yaml",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve { addr, config } => {
            assert_eq!(addr.as_deref(), Some("127.0.0.1:9000"));
            assert_eq!(config.unwrap().to_string_lossy(), "burrow.yaml");
        }
        Commands::Routes => panic!("Expected Serve command"),
    }
}

#[test]
fn test_routes_command_exists() {
    let cli = Cli::try_parse_from(["burrow", "routes"]).unwrap();
    assert!(matches!(cli.command, Commands::Routes));
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["burrow", "generate"]).is_err());
}

#[test]
fn test_demo_router_table() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let router = build_demo_router(&metrics).unwrap();
    let routes: Vec<String> = router
        .routes()
        .into_iter()
        .map(|(m, p)| format!("{m} {p}"))
        .collect();
    assert_eq!(
        routes,
        vec![
            "GET /",
            "POST /api/echo",
            "GET /api/metrics",
            "GET /api/status.xml",
            "GET /ping",
            "GET /static/*filepath",
            "GET /user/:id/post/:post_id",
        ]
    );

    let trie = router.snapshot();
    let m = trie.find("/user/1/post/2").unwrap();
    assert!(m.endpoint(&Method::GET).is_some());
}
