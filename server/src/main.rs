use clap::Parser;
use hog_server::config::SessionConfig;
use hog_server::console::ConsoleInput;
use hog_server::host::SessionHandle;
use hog_server::session::GameSession;
use hog_shared::{StateView, SESSION_NAME};
use log::{error, info, warn};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Main-method of the application.
/// Parses command-line arguments, spawns one session and feeds it console lines from stdin.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Contributions required per stage; stage N needs N times this many
        #[clap(short, long, default_value = "10")]
        boops_per_round: u32,
        /// Reward multiplier applied at round completion
        #[clap(short, long, default_value = "100")]
        multiplier: f64,
        /// Shortest round duration used when scoring, in milliseconds
        #[clap(long, default_value = "1")]
        min_round_ms: u64,
    }

    let args = Args::parse();

    let config = SessionConfig {
        boops_per_round: args.boops_per_round,
        reward_multiplier: args.multiplier,
        min_round_duration: Duration::from_millis(args.min_round_ms),
    };
    let session = GameSession::with_system_clock(config)?;
    let handle = SessionHandle::spawn(session);
    info!("Session {} ready, reading commands from stdin", SESSION_NAME);

    // Print every published state change
    let printer = {
        let mut updates = handle.subscribe();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let view = updates.borrow_and_update().clone();
                print_view(&view);
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        if let Err(e) = dispatch(&handle, &line).await {
                            warn!("{}", e);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Received Ctrl+C, shutting down gracefully...");
                break;
            }
        }
    }

    let session = handle.shutdown().await?;
    printer.abort();
    print_view(&session.snapshot());

    Ok(())
}

/// Forwards one console line to the session
async fn dispatch(handle: &SessionHandle, line: &str) -> Result<(), Box<dyn std::error::Error>> {
    match ConsoleInput::parse(line)? {
        ConsoleInput::Join {
            participant,
            spectator,
        } => match handle.join(&participant, spectator).await {
            Ok(outcome) => info!("{} joined as {:?}", participant, outcome),
            Err(e) => warn!("{} was not admitted: {}", participant, e),
        },
        ConsoleInput::Leave { participant } => handle.leave(&participant)?,
        ConsoleInput::Send {
            participant,
            message,
        } => handle.send(&participant, message)?,
        ConsoleInput::Snapshot => print_view(&handle.snapshot()),
    }
    Ok(())
}

fn print_view(view: &StateView) {
    match serde_json::to_string(view) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to encode state: {}", e),
    }
}
