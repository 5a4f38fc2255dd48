//! Terminal session loop.
//!
//! Wires the realtime channel, the entity services and the terminal view
//! into a [`SessionController`], then multiplexes inbound events, typed
//! lines and the shutdown signal until the user leaves.

use std::sync::Arc;

use dialoguer::Password;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use super::{
    controller::SessionController,
    signal::shutdown_signal,
    state::{AppContext, build_services},
    view::TerminalView,
};
use crate::{
    cli::LoginOptions,
    config::ClientConfig,
    error::ClientError,
    infrastructure::realtime::{InboundEvent, WebSocketChannel},
};

/// What a typed line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Quit,
    Users,
    Help,
    Say(String),
    Nothing,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" => Command::Nothing,
        "/quit" | "/exit" => Command::Quit,
        "/users" => Command::Users,
        "/help" => Command::Help,
        _ => Command::Say(line.to_string()),
    }
}

/// Events produced by the blocking input thread
enum Input {
    Line(String),
    Eof,
}

pub async fn run(config: ClientConfig, login: LoginOptions) -> Result<(), ClientError> {
    let (user_service, message_service) = build_services(&config)?;
    let view = TerminalView::new(
        &config.templates.user_item,
        &config.templates.chat_message,
        std::io::stdout(),
    )?;

    let (channel, mut inbound) = WebSocketChannel::connect(&config.server).await?;
    let channel = Arc::new(channel);
    channel.start_heartbeat(config.pulse_interval());

    let mut controller = SessionController::new(AppContext {
        user_service,
        message_service,
        channel: channel.clone(),
        view: Box::new(view),
    });

    let result = session(&mut controller, &mut inbound, login).await;

    controller.logout();
    channel.close().await;
    result
}

async fn session(
    controller: &mut SessionController,
    inbound: &mut mpsc::UnboundedReceiver<InboundEvent>,
    login: LoginOptions,
) -> Result<(), ClientError> {
    let username = match login.username {
        Some(username) => username,
        None => ask(Prompt::Username).await?,
    };
    let password = match login.password {
        Some(password) => password,
        None => ask(Prompt::Password).await?,
    };

    if login.register {
        let user = controller.register(&username, &password).await?;
        println!("Registered '{}'", user.username);
    }
    let user = controller.authenticate(&username, &password).await?;
    println!("Welcome, {}! Type /help for commands.", user.username);

    let mut lines = spawn_input_thread();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = inbound.recv() => match event {
                Some(InboundEvent::Received(event)) => controller.handle_event(event).await,
                Some(InboundEvent::Disconnected(reason)) => {
                    controller.handle_disconnect(&reason);
                    println!("Disconnected from the server: {reason}");
                    break;
                }
                None => {
                    controller.handle_disconnect("channel closed");
                    break;
                }
            },
            input = lines.recv() => match input {
                Some(Input::Line(line)) => match parse_command(&line) {
                    Command::Quit => break,
                    Command::Users => controller.render_users(),
                    Command::Help => print_help(),
                    Command::Say(content) => {
                        if let Err(e) = controller.publish_message(&content).await {
                            println!("Message not sent: {e}");
                        }
                    }
                    Command::Nothing => {}
                },
                Some(Input::Eof) | None => break,
            },
            _ = &mut shutdown => break,
        }
    }

    Ok(())
}

fn print_help() {
    println!("/users  show who is online");
    println!("/quit   leave the chat");
}

/// Credentials asked for when not given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Username,
    Password,
}

impl Prompt {
    fn label(self) -> &'static str {
        match self {
            Prompt::Username => "username",
            Prompt::Password => "password",
        }
    }

    /// Typed characters are not echoed
    fn is_hidden(self) -> bool {
        matches!(self, Prompt::Password)
    }
}

/// Ask for one value on a blocking thread
async fn ask(prompt: Prompt) -> Result<String, ClientError> {
    tokio::task::spawn_blocking(move || {
        if prompt.is_hidden() {
            return Password::new()
                .with_prompt(prompt.label())
                .interact()
                .map_err(|e| ClientError::Input(e.to_string()));
        }
        let mut editor = DefaultEditor::new().map_err(|e| ClientError::Input(e.to_string()))?;
        editor
            .readline(&format!("{}: ", prompt.label()))
            .map(|line| line.trim().to_string())
            .map_err(|e| ClientError::Input(e.to_string()))
    })
    .await
    .map_err(|e| ClientError::Input(e.to_string()))?
}

/// Read chat lines on a dedicated thread; rustyline blocks
fn spawn_input_thread() -> mpsc::UnboundedReceiver<Input> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::error!("Failed to open terminal input: {}", e);
                let _ = tx.send(Input::Eof);
                return;
            }
        };

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if tx.send(Input::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    let _ = tx.send(Input::Eof);
                    break;
                }
                Err(e) => {
                    tracing::error!("Terminal input failed: {}", e);
                    let _ = tx.send(Input::Eof);
                    break;
                }
            }
        }
    });

    rx
}
