use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::*;
use dialoguer::{Input, Select};
use parley_client::{ChatSession, ClientError, EngineConfig, SessionEvent, SessionState};
use parley_core::{ChatMessage, Origin, RoomId};
use tokio::io::{AsyncBufReadExt, BufReader};

const QUIT_COMMAND: &str = "/quit";

pub async fn run(room: Option<RoomId>, signaling_url: String) -> Result<()> {
    let room = match room {
        Some(room) => Some(room),
        None => tokio::task::spawn_blocking(prompt_room)
            .await
            .context("Room prompt panicked")??,
    };

    let config = EngineConfig {
        signaling_url,
        ..Default::default()
    };
    let (session, mut events) = ChatSession::connect(config);

    match room {
        Some(room) => session.join_room(room)?,
        None => {
            let room = session.create_room()?;
            println!(
                "{} {}",
                "🔑 Share this room code:".green().bold(),
                room.to_string().cyan().bold()
            );
        }
    }
    println!("{}", format!("Type a message and press Enter, {QUIT_COMMAND} to leave.").dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut was_connected = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                if text == QUIT_COMMAND {
                    break;
                }
                match session.send(text).await {
                    Ok(message) => print_message(&message),
                    Err(ClientError::NotConnected) => {
                        println!("{}", "Not connected yet, message not sent.".yellow());
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                if let SessionEvent::StateChanged(SessionState::Connected) = event {
                    was_connected = true;
                }
                if !print_event(event, was_connected) {
                    break;
                }
            }
        }
    }

    session.disconnect().await?;
    println!("{}", "👋 Bye.".dimmed());
    Ok(())
}

/// `None` means a fresh room should be created.
fn prompt_room() -> Result<Option<RoomId>> {
    let choice = Select::new()
        .with_prompt("Start a conversation")
        .items(&["Create a new room", "Join with a room code"])
        .default(0)
        .interact()?;

    if choice == 0 {
        return Ok(None);
    }

    let code: String = Input::<String>::new()
        .with_prompt("Room code")
        .validate_with(|input: &String| RoomId::parse(input).map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()?;
    Ok(Some(RoomId::parse(&code)?))
}

/// Prints one session event. Returns false once the session is over.
fn print_event(event: SessionEvent, was_connected: bool) -> bool {
    match event {
        SessionEvent::Joined {
            room_id,
            member_count,
            ..
        } => {
            println!(
                "{} {} ({}/2)",
                "📥 Joined room".green(),
                room_id.to_string().cyan(),
                member_count
            );
            if member_count == 1 {
                println!("{}", "Waiting for the other participant...".dimmed());
            }
        }
        SessionEvent::PeerJoined { .. } => {
            println!("{}", "🤝 Peer joined, negotiating a direct connection...".cyan());
        }
        SessionEvent::StateChanged(SessionState::Connected) => {
            println!("{}", "✨ Connected. Say hello!".green().bold());
        }
        SessionEvent::StateChanged(SessionState::Idle) if was_connected => {
            println!("{}", "Conversation ended.".yellow());
            return false;
        }
        SessionEvent::StateChanged(_) => {}
        SessionEvent::PeerReady { .. } => {}
        SessionEvent::MessageReceived(message) => print_message(&message),
        SessionEvent::PeerLeft { .. } => {
            println!("{}", "🚪 The other participant left.".yellow());
        }
        SessionEvent::RoomFull { room_id } => {
            println!("{} {}", "⛔ Room is full:".red().bold(), room_id);
        }
        SessionEvent::Failed { reason } => {
            println!("{} {}", "❌ Session failed:".red().bold(), reason);
            return false;
        }
    }
    true
}

fn print_message(message: &ChatMessage) {
    let time = DateTime::from_timestamp_millis(message.timestamp)
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default();

    let who = match message.origin {
        Origin::Local => "you".blue().bold(),
        Origin::Remote => "peer".magenta().bold(),
    };
    println!("{} {}: {}", time.dimmed(), who, message.text);
}
