use anyhow::Context;
use clap::Parser;
use rentwise_core::domain::analysis::Analysis;
use rentwise_core::llm::LlmClient;
use rentwise_core::requester::request_analysis;
use rentwise_core::session::Session;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinHandle};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Command;

mod commands;
mod render;

#[derive(Debug, Parser)]
#[command(name = "rentwise")]
struct Args {
    /// Rental market the advice is tailored to. Overrides RENTWISE_MARKET.
    #[arg(long)]
    market: Option<String>,

    /// Model provider: gemini or anthropic. Overrides LLM_PROVIDER.
    #[arg(long)]
    provider: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut settings = rentwise_core::config::Settings::from_env()?;
    if args.market.is_some() {
        settings.market = args.market;
    }
    if args.provider.is_some() {
        settings.llm_provider = args.provider;
    }
    let _sentry_guard = init_sentry(&settings);

    // stdout belongs to the interactive surface.
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let provider = settings.provider()?;
    let client = rentwise_core::llm::client_from_settings(&settings, provider)?;
    let session = Session::new(settings.market());

    tracing::info!(%provider, market = session.market(), "rentwise started");

    println!("{}\n", render::banner(session.market()));
    println!("{}", render::HELP);

    run(client, session).await
}

async fn run(client: Arc<dyn LlmClient>, mut session: Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<JoinHandle<anyhow::Result<Analysis>>> = None;

    loop {
        tokio::select! {
            joined = wait_pending(&mut pending) => {
                pending = None;
                settle(&mut session, joined);
                println!("\n{}", render::outcome(&session));
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    if let Some(handle) = pending.take() {
                        settle(&mut session, handle.await);
                        println!("\n{}", render::outcome(&session));
                    }
                    break;
                };
                match commands::parse(&line) {
                    Command::Set { field, raw } => {
                        let stored = session.update(field, &raw);
                        println!("{}: {}", field.label(), render::money(stored));
                    }
                    Command::Profile => println!("{}", render::profile(&session)),
                    Command::Analyze => match session.begin() {
                        Some(request) => {
                            let client = Arc::clone(&client);
                            pending = Some(tokio::spawn(async move {
                                request_analysis(client.as_ref(), request).await
                            }));
                            println!("Analyzing your budget for {}...", session.market());
                        }
                        None => println!("{}", render::submit_unavailable(&session)),
                    },
                    Command::Help => println!("{}", render::HELP),
                    Command::Quit => break,
                    Command::Empty => {}
                    Command::Unknown(word) => {
                        println!("Unknown command `{word}`. Type `help` for the list.");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if pending.is_some() {
        tracing::info!("exiting with an analysis request still outstanding");
    }
    Ok(())
}

/// Hands a finished task to the session. A panicked or cancelled task is a
/// failed request like any other.
fn settle(session: &mut Session, joined: Result<anyhow::Result<Analysis>, JoinError>) {
    let outcome = joined
        .context("analysis task did not complete")
        .and_then(|res| res);
    if let Err(err) = &outcome {
        match rentwise_core::llm::error::raw_output(err) {
            Some(raw) => sentry::with_scope(
                |scope| scope.set_extra("raw_llm_output", raw.into()),
                || sentry_anyhow::capture_anyhow(err),
            ),
            None => sentry_anyhow::capture_anyhow(err),
        };
    }
    session.complete(outcome);
}

/// Resolves with the outstanding task's result, or never if there is none.
async fn wait_pending<T>(pending: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn init_sentry(settings: &rentwise_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentwise_core::domain::profile::ProfileField;
    use rentwise_core::session::ANALYSIS_UNAVAILABLE;

    fn ready_session() -> Session {
        let mut session = Session::new("Austin, Texas");
        session.update(ProfileField::MonthlyIncome, "4000");
        session
    }

    #[tokio::test]
    async fn panicked_task_is_a_failed_request() {
        let mut session = ready_session();
        assert!(session.begin().is_some());
        assert!(session.is_busy());

        let handle: JoinHandle<anyhow::Result<Analysis>> =
            tokio::spawn(async { panic!("client blew up") });
        let mut pending = Some(handle);
        let joined = wait_pending(&mut pending).await;
        assert!(joined.as_ref().unwrap_err().is_panic());

        settle(&mut session, joined);
        assert!(!session.is_busy());
        assert!(session.analysis().is_none());
        assert_eq!(session.error(), Some(ANALYSIS_UNAVAILABLE));
    }

    #[tokio::test]
    async fn cancelled_task_is_a_failed_request() {
        let mut session = ready_session();
        assert!(session.begin().is_some());

        let handle: JoinHandle<anyhow::Result<Analysis>> =
            tokio::spawn(std::future::pending());
        handle.abort();
        settle(&mut session, handle.await);
        assert!(!session.is_busy());
        assert_eq!(session.error(), Some(ANALYSIS_UNAVAILABLE));
    }

    #[tokio::test]
    async fn task_error_is_a_failed_request() {
        let mut session = ready_session();
        assert!(session.begin().is_some());

        let mut pending = Some(tokio::spawn(async {
            Err::<Analysis, _>(anyhow::anyhow!("connection refused"))
        }));
        settle(&mut session, wait_pending(&mut pending).await);
        assert!(!session.is_busy());
        assert_eq!(session.error(), Some(ANALYSIS_UNAVAILABLE));
    }
}
