use std::sync::Arc;

use tokio::io::AsyncBufReadExt;

use crate::adapters::{PromptMode, stdin_input};
use crate::app;
use crate::config::ClientConfig;
use crate::ports::{NotificationPlatform, TimeProvider};
use crate::types::{Mode, ModeState};

const HELP: &str = "\
commands:
  toggle <mode>        flip a mode
  set <mode> on|off    set a mode
  notify <mode>        ask the other device for a mode
  enable               allow notifications on this device
  status               show modes and sync details
  help                 show this help
  quit                 leave
modes: best-friends, baby-mode, real-selves, lovers, benefits";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Toggle(Mode),
    Set(String, bool),
    Notify(Mode),
    Enable,
    Status,
    Help,
    Quit,
    Empty,
}

pub(crate) fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(Command::Empty);
    };
    let args: Vec<&str> = parts.collect();
    match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("toggle" | "t", [mode]) => parse_mode(mode).map(Command::Toggle),
        ("set", [mode, value]) => {
            parse_on_off(value).map(|value| Command::Set(mode.to_string(), value))
        }
        ("notify" | "n", [mode]) => parse_mode(mode).map(Command::Notify),
        ("enable", []) => Ok(Command::Enable),
        ("status" | "show", []) => Ok(Command::Status),
        ("help" | "?", []) => Ok(Command::Help),
        ("quit" | "exit" | "q", []) => Ok(Command::Quit),
        _ => Err(format!("unrecognized command '{}'; type 'help'", line.trim())),
    }
}

fn parse_mode(raw: &str) -> Result<Mode, String> {
    Mode::from_id(raw).ok_or_else(|| format!("unknown mode '{raw}'"))
}

fn parse_on_off(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(format!("expected on or off, got '{raw}'")),
    }
}

pub(crate) fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

pub(crate) fn render_state(state: &ModeState) -> String {
    Mode::ALL
        .into_iter()
        .map(|mode| {
            let value = state.get(mode).map(on_off).unwrap_or("-");
            format!("  {:<14}{value}", mode.display_name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Interactive terminal front end: polls in the background of the prompt
/// and applies commands as they are typed.
pub(crate) async fn run(config: &ClientConfig) -> i32 {
    let input = stdin_input();
    let client = match app::build_client(config, PromptMode::Ask(Arc::clone(&input))) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "failed to set up backend client");
            return 1;
        }
    };
    let mut last_shown: Option<ModeState> = None;
    let mut client = client.with_refresh(move |state| {
        if last_shown.as_ref() != Some(state) {
            println!("{}", render_state(state));
            last_shown = Some(state.clone());
        }
    });

    client.init().await;
    println!("signed in as {}. type 'help' for commands.", client.user());

    let time = *client.time();
    let mut next_tick = Box::pin(time.sleep(client.poll_interval()));
    loop {
        let line = {
            let mut lines = input.lock().await;
            tokio::select! {
                () = &mut next_tick => None,
                line = lines.next_line() => Some(line),
            }
        };
        let line = match line {
            None => {
                client.tick().await;
                next_tick = Box::pin(time.sleep(client.poll_interval()));
                continue;
            }
            Some(Ok(Some(line))) => line,
            Some(Ok(None)) => return 0,
            Some(Err(err)) => {
                tracing::error!(error = %err, "failed to read command");
                return 1;
            }
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match command {
            Command::Toggle(mode) => {
                client.toggle(mode).await;
            }
            Command::Set(id, value) => {
                if client.set_named(&id, value).await.is_none() {
                    println!("unknown mode '{id}'");
                }
            }
            Command::Notify(mode) => {
                if client.send_notification(mode).await {
                    println!("asked for {}", mode.display_name());
                }
            }
            Command::Enable => {
                if client.enable_notifications().await {
                    println!("notifications enabled");
                }
            }
            Command::Status => {
                let state = client.state();
                let on = state.iter().filter(|(_, value)| *value).count();
                println!("{}", render_state(state));
                println!("{on} of {} modes on", Mode::ALL.len());
                match client.synced_at() {
                    Some(at) => println!("last synced at {at}"),
                    None => println!("not synced yet"),
                }
                println!(
                    "notifications: {:?}, push {}",
                    client.gateway().platform().permission(),
                    if client.gateway().push_enabled() { "configured" } else { "off" }
                );
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return 0,
            Command::Empty => {}
        }
    }
}
