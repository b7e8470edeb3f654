//! Simple IRC client example
//!
//! Connects to a server, joins a channel once registered, prints what
//! happens and reads slash commands or chat lines from stdin.
//!
//! Run with: `cargo run --example simple_client -- irc.libera.chat 6667 slirc_demo #slirc`

use std::env;

use tokio::io::{AsyncBufReadExt, BufReader};

use slirc_client::{client, ClientConfig, DomainEvent, MessageKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "irc.libera.chat".to_string());
    let port = args.next().map(|p| p.parse()).transpose()?.unwrap_or(6667);
    let nick = args.next().unwrap_or_else(|| "slirc_demo".to_string());
    let channel = args.next().unwrap_or_else(|| "#slirc".to_string());

    let (handle, mut events) = client::spawn(ClientConfig::default())?;
    handle.connect(&host, port, &nick).await?;

    let input = handle.clone();
    let target = channel.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let result = if line.starts_with('/') {
                input.execute(&line).await
            } else if !line.is_empty() {
                input.send_message(&target, &line).await
            } else {
                Ok(())
            };
            if let Err(e) = result {
                eprintln!("! {e}");
            }
        }
    });

    while let Some(event) = events.recv().await {
        match event {
            DomainEvent::Connected => {
                println!("✓ connected to {host}:{port}");
                handle.join(&channel).await?;
            }
            DomainEvent::Message {
                nick,
                target,
                content,
                kind,
            } => match kind {
                MessageKind::Message => println!("[{target}] <{nick}> {content}"),
                MessageKind::Notice => println!("[{target}] -{nick}- {content}"),
            },
            DomainEvent::Join { nick, channel } => println!("→ {nick} joined {channel}"),
            DomainEvent::Part { nick, channel, .. } => println!("← {nick} left {channel}"),
            DomainEvent::Quit { nick, reason, .. } => {
                println!("← {nick} quit ({})", reason.unwrap_or_default());
            }
            DomainEvent::TopicChanged { channel, topic } => println!("* topic for {channel}: {topic}"),
            DomainEvent::NamesUpdated { channel, users } => {
                println!("* {} users in {channel}", users.len());
            }
            DomainEvent::SystemNotice { content } => println!("* {content}"),
            DomainEvent::Error { cause } => eprintln!("! {cause}"),
            DomainEvent::Disconnected => println!("✗ disconnected"),
            DomainEvent::Reconnecting { attempt } => println!("… reconnecting (attempt {attempt})"),
            DomainEvent::ReconnectFailed => {
                eprintln!("! giving up");
                break;
            }
            other => println!("  {other:?}"),
        }
    }

    Ok(())
}
