//! `chatline demo`: the scripted session.
//!
//! Create a chat, prompt it, switch strategy, prompt again. Every step goes
//! through the invoker with its own decorator chain.

use super::Runtime;
use chatline_agent::Strategy;
use chatline_commands::{Command, Invoker, Outcome};
use chatline_core::user::User;
use chrono::{Duration, Utc};
use std::sync::Arc;

const INSTRUCTIONS: &str = "You are a helpful assistant. Answer the user in Thai.";

pub async fn run(offline: bool, expert: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::bootstrap(offline, verbose)?;
    let mut invoker = Invoker::new(rt.sink());

    let user = User::new(1, "STACiA").with_subscription_end(Utc::now() + Duration::days(30));

    // New chat, logged verbosely
    let create = Command::new_chat(Arc::clone(&rt.app), user, INSTRUCTIONS);
    invoker.set_command(rt.logged(create.into(), true));
    let Some(chat) = invoker.execute_command().await?.and_then(Outcome::into_chat) else {
        return Err("chat creation failed".into());
    };
    println!("  chat created: {chat}");

    // Prompt with quota check and logging
    invoker.set_command(rt.guarded_prompt(&chat, "hi hi"));
    if let Some(output) = invoker.execute_command().await?.and_then(Outcome::into_run_output) {
        println!("  result: {}", output.output.trim());
    }

    // Switch strategy
    let strategy = if expert { Strategy::Expert } else { Strategy::Advanced };
    let switch = Command::switch_strategy(Arc::clone(&chat), strategy);
    invoker.set_command(rt.logged(switch.into(), true));
    if invoker.execute_command().await?.is_some() {
        println!("  strategy: {strategy}");
    }

    // Prompt again, with quota, retry and logging
    invoker.set_command(rt.prompt(&chat, "hi hi"));
    if let Some(output) = invoker.execute_command().await?.and_then(Outcome::into_run_output) {
        println!("  result: {}", output.output.trim());
    }

    println!("  audit entries: {}", rt.audit.count());
    Ok(())
}
