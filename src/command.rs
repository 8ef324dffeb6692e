//! Deferred effects.
//!
//! A [`Command`] describes work whose outcome re-enters the event loop as a
//! [`Message`]. Components and pages return commands from their update
//! functions; only the shell actually runs them, so all state mutation stays
//! on the one dispatch path.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc::UnboundedSender;

use crate::message::Message;

type BoxedMessageFuture = Pin<Box<dyn Future<Output = Message> + Send>>;

pub enum Command {
    /// Deliver a message immediately.
    Emit(Message),
    /// Run a future and deliver its message when it resolves.
    Perform(BoxedMessageFuture),
    /// Start every command without ordering guarantees among them.
    Batch(Vec<Command>),
    /// Await each command's completion before starting the next. Used where
    /// a message must be delivered before slow work begins, e.g. showing the
    /// loading state before a fetch.
    Sequence(Vec<Command>),
}

impl Command {
    pub fn perform<F>(future: F) -> Self
    where
        F: Future<Output = Message> + Send + 'static,
    {
        Self::Perform(Box::pin(future))
    }
}

/// Combine any number of optional commands into one batched command.
pub fn batch(commands: impl IntoIterator<Item = Option<Command>>) -> Option<Command> {
    let mut commands: Vec<Command> = commands.into_iter().flatten().collect();
    match commands.len() {
        0 => None,
        1 => Some(commands.remove(0)),
        _ => Some(Command::Batch(commands)),
    }
}

/// Combine any number of optional commands into one sequenced command.
pub fn sequence(commands: impl IntoIterator<Item = Option<Command>>) -> Option<Command> {
    let mut commands: Vec<Command> = commands.into_iter().flatten().collect();
    match commands.len() {
        0 => None,
        1 => Some(commands.remove(0)),
        _ => Some(Command::Sequence(commands)),
    }
}

/// Start a command on the runtime. Messages are delivered through `tx`, never
/// by mutating state from the spawned task.
pub fn spawn(command: Command, tx: UnboundedSender<Message>) {
    tokio::spawn(run(command, tx));
}

async fn run(command: Command, tx: UnboundedSender<Message>) {
    match command {
        Command::Emit(message) => {
            let _ = tx.send(message);
        }
        Command::Perform(future) => {
            let _ = tx.send(future.await);
        }
        Command::Batch(commands) => {
            for command in commands {
                spawn(command, tx.clone());
            }
        }
        Command::Sequence(commands) => {
            for command in commands {
                Box::pin(run(command, tx.clone())).await;
            }
        }
    }
}

/// Run a command to completion and collect every message it produces, in
/// delivery order. Batches are run sequentially here, which is deterministic
/// enough for assertions.
#[cfg(test)]
pub async fn drain(command: Command) -> Vec<Message> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    drain_into(command, &tx).await;
    drop(tx);
    let mut messages = Vec::new();
    while let Some(message) = rx.recv().await {
        messages.push(message);
    }
    messages
}

#[cfg(test)]
async fn drain_into(command: Command, tx: &UnboundedSender<Message>) {
    match command {
        Command::Emit(message) => {
            let _ = tx.send(message);
        }
        Command::Perform(future) => {
            let _ = tx.send(future.await);
        }
        Command::Batch(commands) | Command::Sequence(commands) => {
            for command in commands {
                Box::pin(drain_into(command, tx)).await;
            }
        }
    }
}
