//! `chatline chat`: interactive session over the command pipeline.

use super::Runtime;
use chatline_agent::{Chat, Strategy};
use chatline_commands::{Command, Invoker, Outcome};
use chatline_core::message::Role;
use chatline_core::user::User;
use chrono::{Duration, Utc};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const INSTRUCTIONS: &str = "You are a helpful assistant.";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Prompt(String),
    Switch(Strategy),
    History,
    New,
    Remove,
    Quit,
    Invalid(String),
    Empty,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Input::Prompt(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("switch"), Some(name)) => match name.parse() {
            Ok(strategy) => Input::Switch(strategy),
            Err(e) => Input::Invalid(e),
        },
        (Some("switch"), None) => Input::Invalid("usage: /switch standard|advanced|expert".into()),
        (Some("history"), _) => Input::History,
        (Some("new"), _) => Input::New,
        (Some("remove"), _) => Input::Remove,
        (Some("quit" | "exit"), _) => Input::Quit,
        (Some(other), _) => Input::Invalid(format!("unknown command '/{other}'")),
        (None, _) => Input::Empty,
    }
}

pub async fn run(
    offline: bool,
    subscribed_days: Option<i64>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::bootstrap(offline, verbose)?;
    let mut invoker = Invoker::new(rt.sink());

    let mut user = User::new(1, "you");
    if let Some(days) = subscribed_days {
        user = user.with_subscription_end(Utc::now() + Duration::days(days));
    }

    let mut chat = new_chat(&rt, &mut invoker, &user).await?;

    println!();
    println!("  Chatline: interactive mode");
    println!();
    println!("  Provider:  {}", if offline { "echo" } else { rt.config.provider.name.as_str() });
    println!("  User:      {user} ({})", user.tier());
    println!("  Chat:      {}", chat.id());
    println!();
    println!("  Type a message and press Enter.");
    println!("  Commands: /switch <strategy>, /history, /new, /remove, /quit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Prompt(text) => {
                invoker.set_command(rt.prompt(&chat, &text));
                if let Some(output) = invoker.execute_command().await?.and_then(Outcome::into_run_output) {
                    for line in output.output.lines() {
                        println!("  Assistant > {line}");
                    }
                }
            }
            Input::Switch(strategy) => {
                let switch = Command::switch_strategy(Arc::clone(&chat), strategy);
                invoker.set_command(rt.logged(switch.into(), false));
                if invoker.execute_command().await?.is_some() {
                    println!("  Switched to {strategy}");
                }
            }
            Input::History => print_history(&chat).await,
            Input::New => {
                chat = new_chat(&rt, &mut invoker, &user).await?;
                println!("  New chat {}", chat.id());
            }
            Input::Remove => {
                let remove = Command::remove_chat(Arc::clone(&rt.app), Arc::clone(&chat), user.clone());
                invoker.set_command(rt.logged(remove.into(), false));
                if invoker.execute_command().await?.is_some() {
                    println!("  Removed chat {}", chat.id());
                    chat = new_chat(&rt, &mut invoker, &user).await?;
                    println!("  New chat {}", chat.id());
                }
            }
            Input::Quit => break,
            Input::Invalid(reason) => eprintln!("  {reason}"),
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

async fn new_chat(rt: &Runtime, invoker: &mut Invoker, user: &User) -> Result<Arc<Chat>, Box<dyn std::error::Error>> {
    let create = Command::new_chat(Arc::clone(&rt.app), user.clone(), INSTRUCTIONS);
    invoker.set_command(rt.logged(create.into(), false));
    invoker
        .execute_command()
        .await?
        .and_then(Outcome::into_chat)
        .ok_or_else(|| "chat creation failed".into())
}

async fn print_history(chat: &Chat) {
    let snapshot = chat.context_snapshot().await;
    println!("  Strategy: {} (agent built: {})", snapshot.strategy, snapshot.built);
    for message in chat.messages().await {
        let who = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
            Role::Tool => "Tool",
        };
        if !message.content.is_empty() {
            println!("  {who} > {}", message.content);
        }
    }
}
