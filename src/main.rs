use anyhow::Result;
use blog_admin::api::HttpTransport;
use blog_admin::app::action::Action;
use blog_admin::app::event::AppEvent;
use blog_admin::app::handler;
use blog_admin::app::state::Session;
use blog_admin::{config, logging};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load_config()?;
    if let Some(path) = logging::init(&cfg.logging)? {
        eprintln!("Logging to {}", path.display());
    }

    let transport = HttpTransport::new(&cfg.api)?;
    tracing::info!(base_url = %transport.base_url(), "blog-admin starting");

    if let Err(e) = run_app(cfg, Arc::new(transport)).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(cfg: config::AppConfig, transport: Arc<HttpTransport>) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let mut session = Session::new(cfg, transport.clone());

    // Spawn stdin reader task
    let input_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if input_tx.send(AppEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
        let _ = input_tx.send(AppEvent::InputClosed);
    });

    println!("blog-admin connected to {}", transport.base_url());
    println!("Type /help for commands.");

    // Main event loop
    loop {
        let Some(event) = event_rx.recv().await else { break };

        let actions = handler::handle_event(&mut session, event);

        for line in session.drain_output() {
            println!("{}", line);
        }

        for action in actions {
            match action {
                Action::Send { entity, pending } => {
                    let tx = event_tx.clone();
                    tokio::spawn(async move {
                        let completion = pending.execute().await;
                        let _ = tx.send(AppEvent::Completed { entity, completion });
                    });
                }
                Action::SaveConfig => match config::save_config(&session.config) {
                    Ok(path) => println!("Config saved to {}", path.display()),
                    Err(e) => println!("!!! Failed to save config: {:#}", e),
                },
                Action::Quit => {}
            }
        }

        if session.should_quit {
            break;
        }
    }

    tracing::info!("blog-admin exiting");
    Ok(())
}
