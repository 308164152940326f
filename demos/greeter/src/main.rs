//! Greeter Demo
//!
//! A small end-to-end tour of the Switchboard mediator:
//!
//! - declares a query and a command with `define_request!`
//! - registers handler factories and two middleware with different
//!   priorities
//! - dispatches through both `send` forms and shows context values flowing
//!   from middleware to handler
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --package greeter
//! ```

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use switchboard::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Written by [`StampLocale`], read by the greeting handler.
static LOCALE: ContextKey<&'static str> = ContextKey::new("locale");

pub struct GreetArgs {
    pub greetee: String,
}

define_request! {
    /// Produces a greeting for `greetee`.
    pub query Greet(GreetArgs) -> String;

    /// Records that a greeting went out.
    pub command RecordGreeting(String) -> usize;
}

// ============================================================================
// Handlers
// ============================================================================

struct GreetHandler;

#[async_trait]
impl Handler<Greet> for GreetHandler {
    async fn handle(&self, request: &Greet, cx: &mut RequestContext) -> String {
        match cx.get(&LOCALE) {
            Some(&"sv") => format!("Hej, {}!", request.args().greetee),
            _ => format!("Hello, {}!", request.args().greetee),
        }
    }
}

/// Counts greetings. The factory clones one shared instance, so the count
/// survives across dispatches.
struct RecordGreetingHandler {
    log: parking_lot::Mutex<Vec<String>>,
}

#[async_trait]
impl Handler<RecordGreeting> for RecordGreetingHandler {
    async fn handle(&self, request: &RecordGreeting, _cx: &mut RequestContext) -> usize {
        let mut log = self.log.lock();
        log.push(request.args().clone());
        log.len()
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Outermost: logs every dispatch with its wall time.
struct Timing;

#[async_trait]
impl Middleware for Timing {
    fn priority(&self) -> i32 {
        100
    }

    async fn handle(
        &self,
        request: &dyn AnyRequest,
        cx: &mut RequestContext,
        next: Next<'_>,
    ) -> DispatchResult {
        let started = Instant::now();
        let result = next.run(request, cx).await;
        info!(
            request_type = request.type_name(),
            request_id = %request.request_id(),
            elapsed = ?started.elapsed(),
            ok = result.is_ok(),
            "dispatch finished"
        );
        result
    }
}

/// Inner: stamps the locale the greeting handler should use.
struct StampLocale;

#[async_trait]
impl Middleware for StampLocale {
    fn priority(&self) -> i32 {
        10
    }

    async fn handle(
        &self,
        request: &dyn AnyRequest,
        cx: &mut RequestContext,
        next: Next<'_>,
    ) -> DispatchResult {
        cx.put(&LOCALE, "sv");
        next.run(request, cx).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let registry = Arc::new(MediatorRegistry::new());
    registry.handler_registry().register(|| GreetHandler);

    let record_handler = Arc::new(RecordGreetingHandler {
        log: parking_lot::Mutex::new(Vec::new()),
    });
    registry
        .handler_registry()
        .register(move || Arc::clone(&record_handler));

    registry.middleware_registry().register(Timing);
    registry.middleware_registry().register(StampLocale);

    let mediator = Mediator::new(registry);

    let greeting = mediator
        .send(Greet::new(GreetArgs {
            greetee: "World".into(),
        }))
        .await?;
    info!(%greeting, "instanced send");

    let greeting = mediator
        .send_with::<Greet>(GreetArgs {
            greetee: "Switchboard".into(),
        })
        .await?;
    info!(%greeting, "args-form send");

    let total = mediator.send_with::<RecordGreeting>(greeting).await?;
    info!(total, "greetings recorded");

    Ok(())
}
