//! Interactive chat session over the realtime channel.

use std::sync::Arc;

use murmur_shared::time::SystemClock;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{broadcast::error::RecvError, mpsc, watch};

use crate::{
    channel::{Delivery, RealtimeChannel},
    config::ChannelConfig,
    domain::{ChatMessage, ParticipantId},
    infrastructure::WebSocketConnector,
};

use super::{
    formatter::MessageFormatter,
    prompt::{prompt_for, redisplay_prompt},
};

/// A line typed by the user
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    /// `/to <id>` switches the recipient
    SwitchPeer(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    match line.strip_prefix("/to") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
            Input::SwitchPeer(rest.trim())
        }
        _ => Input::Message(line),
    }
}

/// Run an interactive chat session as `self_id`, initially talking to `peer`.
///
/// Returns when the user exits (Ctrl+C / Ctrl+D).
pub async fn run_chat(
    config: ChannelConfig,
    self_id: String,
    peer: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let me = ParticipantId::new(self_id)?;
    let mut peer = ParticipantId::new(peer)?;

    let channel = RealtimeChannel::new(
        config,
        Arc::new(WebSocketConnector::new()),
        Arc::new(SystemClock),
    )?;

    let (prompt_tx, prompt_rx) = watch::channel(prompt_for(me.as_str(), peer.as_str()));

    // Print channel events as they arrive
    let mut events = channel.subscribe();
    let me_for_events = me.to_string();
    let event_prompt = prompt_rx.clone();
    let event_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    print!("{}", MessageFormatter::format_event(&event, &me_for_events));
                    redisplay_prompt(&event_prompt.borrow());
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} channel events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    channel.connect(me.as_str()).await?;

    println!(
        "\nYou are '{}', talking to '{}'. Type messages and press Enter to send.\n\
         Use /to <id> to switch recipient. Press Ctrl+C to exit.\n",
        me, peer
    );

    // Spawn a blocking thread for rustyline (synchronous readline)
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let readline_prompt = prompt_rx;
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            let prompt = readline_prompt.borrow().clone();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    while let Some(line) = input_rx.recv().await {
        match parse_input(&line) {
            Input::SwitchPeer(id) => match ParticipantId::new(id) {
                Ok(id) => {
                    peer = id;
                    prompt_tx.send_replace(prompt_for(me.as_str(), peer.as_str()));
                }
                Err(e) => println!("{}", e),
            },
            Input::Message(text) => {
                let message = ChatMessage::new(me.clone(), peer.clone(), text);
                match channel.send(message).await {
                    Ok(Delivery::Queued) => {
                        print!("{}", MessageFormatter::format_sent_confirmation(true));
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Message not sent: {}", e),
                }
            }
        }
    }

    channel.disconnect().await;
    event_task.abort();

    Ok(())
}
