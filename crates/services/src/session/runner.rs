//! Owns a `SessionController` inside a tokio task and feeds it events.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use assess_core::model::{Question, QuestionId};

use crate::backend::SubmitAck;
use crate::error::BackendError;

use super::controller::{
    LoadSource, RequestTicket, SessionController, SessionSnapshot, SubmitRequest, fetch_questions,
};

const TICK: Duration = Duration::from_secs(1);

/// User intents forwarded to the session task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select(QuestionId),
    Next,
    ChooseOption(usize),
    EditCode(String),
    SetLanguage(String),
    RequestSubmit,
    CancelSubmit,
    ConfirmSubmit,
    RetrySubmit,
    Teardown,
}

enum Reply {
    Loaded(RequestTicket, Result<Vec<Question>, BackendError>),
    Submitted(RequestTicket, Result<SubmitAck, BackendError>),
}

/// Handle to a running session task.
///
/// Dropping the handle closes the command channel, which tears the session down.
pub struct SessionRunner {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<SessionController>,
}

impl SessionRunner {
    /// Start loading `source` and drive the session until it ends or is torn down.
    pub fn spawn(
        controller: SessionController,
        source: LoadSource,
        visibility: mpsc::UnboundedReceiver<bool>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(controller.snapshot());
        let task = tokio::spawn(run(controller, source, visibility, command_rx, snapshot_tx));
        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Queue a command. Returns `false` once the session task has exited.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    #[must_use]
    pub fn latest(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn teardown(&self) {
        let _ = self.commands.send(SessionCommand::Teardown);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to exit and take back the controller.
    ///
    /// # Errors
    ///
    /// Returns `JoinError` if the task panicked or was aborted.
    pub async fn finished(self) -> Result<SessionController, JoinError> {
        self.task.await
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

async fn run(
    mut controller: SessionController,
    source: LoadSource,
    mut visibility: mpsc::UnboundedReceiver<bool>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
) -> SessionController {
    let (reply_tx, mut replies) = mpsc::unbounded_channel();

    if let Some(ticket) = controller.begin_load() {
        let backend = controller.backend();
        let tx = reply_tx.clone();
        tokio::spawn(async move {
            let result = fetch_questions(backend.as_ref(), &source).await;
            let _ = tx.send(Reply::Loaded(ticket, result));
        });
    }

    let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut visibility_open = true;

    loop {
        let request = tokio::select! {
            _ = ticker.tick() => controller.tick(),
            hidden = visibility.recv(), if visibility_open => match hidden {
                Some(hidden) => controller.visibility_changed(hidden),
                None => {
                    visibility_open = false;
                    None
                }
            },
            command = commands.recv() => match command {
                None | Some(SessionCommand::Teardown) => break,
                Some(command) => apply_command(&mut controller, command),
            },
            Some(reply) = replies.recv() => {
                apply_reply(&mut controller, reply);
                None
            }
        };

        if let Some(request) = request {
            spawn_submit(&controller, request, reply_tx.clone());
        }
        snapshots.send_replace(controller.snapshot());
        if controller.state().is_terminal() {
            break;
        }
    }

    controller.teardown();
    drop(visibility);
    snapshots.send_replace(controller.snapshot());
    controller
}

fn apply_command(controller: &mut SessionController, command: SessionCommand) -> Option<SubmitRequest> {
    let result = match command {
        SessionCommand::Select(id) => controller.select(id),
        SessionCommand::Next => controller.next(),
        SessionCommand::ChooseOption(index) => controller.choose_option(index),
        SessionCommand::EditCode(text) => controller.edit_code(text),
        SessionCommand::SetLanguage(language) => controller.set_language(&language),
        SessionCommand::RequestSubmit => controller.request_submit(),
        SessionCommand::CancelSubmit => controller.cancel_submit(),
        SessionCommand::ConfirmSubmit => return controller.confirm_submit(),
        SessionCommand::RetrySubmit => return controller.retry_submit(),
        SessionCommand::Teardown => {
            controller.teardown();
            Ok(())
        }
    };
    if let Err(err) = result {
        tracing::debug!(error = %err, "session command rejected");
    }
    None
}

fn apply_reply(controller: &mut SessionController, reply: Reply) {
    let outcome = match reply {
        Reply::Loaded(ticket, result) => controller.apply_loaded(ticket, result),
        Reply::Submitted(ticket, result) => controller.apply_submitted(ticket, result),
    };
    if let Err(err) = outcome {
        tracing::debug!(error = %err, "backend reply applied as failure");
    }
}

fn spawn_submit(
    controller: &SessionController,
    request: SubmitRequest,
    replies: mpsc::UnboundedSender<Reply>,
) {
    let backend = controller.backend();
    tokio::spawn(async move {
        let result = backend.submit(&request.record).await;
        let _ = replies.send(Reply::Submitted(request.ticket, result));
    });
}
