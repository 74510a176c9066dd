use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;

use crate::config::{AppConfig, RuntimeConfig};
use crate::context::RequestContext;
use crate::context_pool::ContextPool;
use crate::dispatcher::Dispatcher;
use crate::echo::echo_handler;
use crate::logging::init_logging_with_config;
use crate::middleware::{middleware, BoxedMiddleware, MetricsMiddleware, RequestLogger};
use crate::router::{Router, RouterError};
use crate::server::{AppService, HttpServer};

/// Command-line interface for burrow
#[derive(Parser)]
#[command(name = "burrow")]
#[command(about = "Segment-trie HTTP router demo server", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the demo application
    Serve {
        /// Address and port to bind (overrides the config file)
        #[arg(long, env = "BURROW_ADDR")]
        addr: Option<String>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the demo application's route table
    Routes,
}

/// Build the demo application's routes.
///
/// - `GET /` - landing page
/// - `GET /ping` - plain-text liveness
/// - `GET /user/:id/post/:post_id` - echo
/// - `GET /static/*filepath` - echo
/// - `/api` group behind [`RequestLogger`]:
///   `POST /api/echo` (JSON bind), `GET /api/metrics`, `GET /api/status.xml`
///
/// # Errors
///
/// Propagates registration errors.
pub fn build_demo_router(metrics: &Arc<MetricsMiddleware>) -> Result<Router, RouterError> {
    let router = Router::new();

    router.get(
        "/",
        |ctx: &mut RequestContext| {
            ctx.html(
                200,
                "<!doctype html><html><body><h1>burrow</h1><p>It routes.</p></body></html>",
            );
        },
        &[],
    )?;
    router.get(
        "/ping",
        |ctx: &mut RequestContext| ctx.string(200, "pong"),
        &[],
    )?;
    router.get("/user/:id/post/:post_id", echo_handler, &[])?;
    router.get("/static/*filepath", echo_handler, &[])?;

    let mut api = router.group("/api");
    api.use_middleware(middleware(RequestLogger));
    api.post(
        "/echo",
        |ctx: &mut RequestContext| match ctx.bind::<Value>() {
            Ok(body) => ctx.json(200, &json!({ "received": body })),
            Err(e) => ctx.json(400, &json!({ "error": e.to_string() })),
        },
        &[],
    )?;
    let snapshot_source = Arc::clone(metrics);
    api.get(
        "/metrics",
        move |ctx: &mut RequestContext| {
            let snapshot = snapshot_source.snapshot();
            ctx.json(200, &snapshot);
        },
        &[],
    )?;
    api.get(
        "/status.xml",
        |ctx: &mut RequestContext| {
            ctx.xml(200, "<?xml version=\"1.0\"?><status>ok</status>");
        },
        &[],
    )?;

    Ok(router)
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, logging cannot
/// be initialized, routes fail to register, or the server cannot bind.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { addr, config } => {
            let app = AppConfig::load_or_default(config.as_deref())
                .context("Failed to load configuration")?;
            let _log_guard = init_logging_with_config(&app.log_config())?;

            let runtime = RuntimeConfig::from_env();
            runtime.apply();
            info!(
                stack_size = runtime.stack_size,
                workers = runtime.workers,
                "Runtime configured"
            );

            let metrics = Arc::new(MetricsMiddleware::new());
            let router = Arc::new(build_demo_router(&metrics)?);
            let mut dispatcher =
                Dispatcher::with_pool(router, ContextPool::with_config(app.pool_config()));
            let metrics_mw: BoxedMiddleware = metrics;
            dispatcher.use_middleware(metrics_mw);

            let addr = addr.unwrap_or(app.server.addr);
            let handle = HttpServer(AppService::new(Arc::new(dispatcher)))
                .start(addr.as_str())
                .with_context(|| format!("Failed to start server on {addr}"))?;
            handle.wait_ready()?;
            info!(addr = %handle.addr(), "Serving");

            handle
                .join()
                .map_err(|_| anyhow!("server coroutine panicked"))?;
        }
        Commands::Routes => {
            let metrics = Arc::new(MetricsMiddleware::new());
            let router = build_demo_router(&metrics)?;
            router.dump_routes();
        }
    }
    Ok(())
}
