//! Terminal front end for the scoreboard: reads commands from stdin, forwards them to the
//! reconciliation controller and prints the board after each one.

use std::{
    io::{self, BufRead, Write},
    sync::{Arc, Mutex},
    thread,
};

use anyhow::Context;
use futures::future::BoxFuture;
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scoreboard::{
    client::{
        controller::{Confirm, Controller, Intent, IntentError, Outcome, coerce_quantity},
        feedback::{FeedbackKind, FeedbackTarget},
        http::HttpRemoteStore,
        view::{BoardSettings, BoardView},
    },
    config::{ClientConfig, TaskDefinition},
};

const HELP: &str = "\
commands:
  load                          reload players and channels
  add <name> <avatar-url>       add a player
  inc <rank|id> [n]             add n points (default 1)
  dec <rank|id> [n]             remove n points (default 1)
  task <rank|id> <task#> [qty]  award task points
  tasks                         list the task catalog
  del <rank|id>                 delete a player
  reset                         zero every score
  show                          print the board
  quit";

/// Parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Load,
    Add { name: String, avatar_url: String },
    Change { target: String, delta: i64 },
    Task { target: String, task: usize, quantity: i64 },
    Tasks,
    Delete { target: String },
    Reset,
    Show,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Command::Show);
        };
        let rest: Vec<&str> = words.collect();
        let target = |rest: &[&str]| {
            rest.first()
                .map(|word| word.to_string())
                .ok_or_else(|| format!("usage: {verb} <rank|id>"))
        };

        match verb {
            "load" => Ok(Command::Load),
            "add" => match rest.as_slice() {
                [name, avatar_url, ..] => Ok(Command::Add {
                    name: name.to_string(),
                    avatar_url: avatar_url.to_string(),
                }),
                _ => Ok(Command::Add {
                    name: rest.first().map(|word| word.to_string()).unwrap_or_default(),
                    avatar_url: String::new(),
                }),
            },
            "inc" | "dec" => {
                let points = coerce_quantity(rest.get(1).copied().unwrap_or("1"));
                let delta = if verb == "inc" { points } else { -points };
                Ok(Command::Change {
                    target: target(&rest)?,
                    delta,
                })
            }
            "task" => {
                let task = rest
                    .get(1)
                    .and_then(|word| word.parse::<usize>().ok())
                    .ok_or_else(|| "usage: task <rank|id> <task#> [qty]".to_string())?;
                Ok(Command::Task {
                    target: target(&rest)?,
                    task,
                    quantity: coerce_quantity(rest.get(2).copied().unwrap_or("1")),
                })
            }
            "tasks" => Ok(Command::Tasks),
            "del" | "delete" => Ok(Command::Delete {
                target: target(&rest)?,
            }),
            "reset" => Ok(Command::Reset),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command `{other}`; try `help`")),
        }
    }
}

/// Map a rank shown on the board to a player id; anything else is taken as an id.
fn resolve_target(view: &BoardView, target: &str) -> String {
    target
        .parse::<usize>()
        .ok()
        .and_then(|rank| view.card_at(rank))
        .map(|card| card.id.clone())
        .unwrap_or_else(|| target.to_string())
}

/// The password prompt is only worth showing when someone is on the board.
fn has_scores_to_reset(view: &BoardView) -> bool {
    !view.players.is_empty()
}

fn task_at(tasks: &[TaskDefinition], number: usize) -> Option<&TaskDefinition> {
    number.checked_sub(1).and_then(|index| tasks.get(index))
}

/// Answers confirmation prompts with the next input line.
#[derive(Clone, Default)]
struct LineConfirm {
    pending: Arc<Mutex<Option<oneshot::Sender<bool>>>>,
}

impl LineConfirm {
    /// Hand `line` to a waiting prompt; `false` when nobody is asking.
    fn answer(&self, line: &str) -> bool {
        let sender = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        match sender {
            Some(sender) => {
                let yes = matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes");
                let _ = sender.send(yes);
                true
            }
            None => false,
        }
    }
}

impl Confirm for LineConfirm {
    fn confirm(&self, prompt: String) -> BoxFuture<'static, bool> {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(tx);
        }
        prompt_line(&format!("{prompt} [y/N] "));
        Box::pin(async move { rx.await.unwrap_or(false) })
    }
}

fn prompt_line(prompt: &str) {
    print!("{prompt}");
    let _ = io::stdout().flush();
}

/// Forward stdin lines to the async side from a blocking thread.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

struct App {
    controller: Controller<HttpRemoteStore>,
    confirm: LineConfirm,
    board: BoardSettings,
    tasks: Vec<TaskDefinition>,
}

impl App {
    async fn view(&self) -> BoardView {
        let board = self.board;
        self.controller
            .read_session(move |session| BoardView::build(session, &board, Instant::now()))
            .await
    }

    async fn render(&self) {
        println!("\n{}", self.view().await);
    }

    /// Send `intent` to the controller. Gated intents run in the background so the prompt
    /// stays responsive; a second one while the first is in flight is dropped.
    async fn submit(&self, intent: Intent) {
        if intent.is_gated() && self.controller.is_busy() {
            println!("busy, try again");
            return;
        }

        let controller = self.controller.clone();
        let board = self.board;
        let gated = intent.is_gated();
        let run = async move {
            let result = controller.dispatch(intent).await;
            let rerender = match result {
                Ok(Outcome::Persisting(handle)) => {
                    print_board(&controller, board).await;
                    matches!(handle.await, Ok(Err(_)))
                }
                Ok(Outcome::Done) => true,
                Ok(Outcome::Skipped) => false,
                Err(IntentError::Busy) => {
                    println!("busy, try again");
                    false
                }
                Err(err) => {
                    debug!(error = %err, "intent failed");
                    if matches!(err, IntentError::UnknownPlayer(_)) {
                        println!("{err}");
                    }
                    true
                }
            };
            if rerender {
                print_board(&controller, board).await;
            }
        };

        if gated {
            tokio::spawn(run);
        } else {
            run.await;
        }
    }

    async fn handle(&self, command: Command, lines: &mut mpsc::UnboundedReceiver<String>) {
        match command {
            Command::Load => self.submit(Intent::Load).await,
            Command::Add { name, avatar_url } => {
                self.submit(Intent::AddPlayer { name, avatar_url }).await
            }
            Command::Change { target, delta } => {
                let id = resolve_target(&self.view().await, &target);
                self.submit(Intent::ChangeScore { id, delta }).await
            }
            Command::Task {
                target,
                task,
                quantity,
            } => {
                let Some(task) = task_at(&self.tasks, task) else {
                    println!("no task #{task}; try `tasks`");
                    return;
                };
                let id = resolve_target(&self.view().await, &target);
                self.submit(Intent::AddTaskPoints {
                    id,
                    points_per_unit: task.points,
                    quantity,
                })
                .await
            }
            Command::Tasks => {
                for (index, task) in self.tasks.iter().enumerate() {
                    println!("{:>2}. {} ({} pts)", index + 1, task.name, task.points);
                }
            }
            Command::Delete { target } => {
                let id = resolve_target(&self.view().await, &target);
                self.submit(Intent::DeletePlayer { id }).await
            }
            Command::Reset => {
                if !has_scores_to_reset(&self.view().await) {
                    println!("no players to reset");
                    return;
                }
                self.controller.clear_feedback(FeedbackTarget::Board).await;
                prompt_line("admin password (empty to cancel): ");
                let password = lines.recv().await.unwrap_or_default();
                if password.is_empty() {
                    self.controller
                        .notify(FeedbackTarget::Board, "Reset cancelled.", FeedbackKind::Error)
                        .await;
                    self.render().await;
                    return;
                }
                self.submit(Intent::ResetAllScores { password }).await
            }
            Command::Show => self.render().await,
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }
}

async fn print_board(controller: &Controller<HttpRemoteStore>, board: BoardSettings) {
    let view = controller
        .read_session(move |session| BoardView::build(session, &board, Instant::now()))
        .await;
    println!("\n{view}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::load();
    let remote = HttpRemoteStore::new(&config.base_url).context("building HTTP client")?;
    let confirm = LineConfirm::default();
    let controller = Controller::with_feedback_ttl(
        Arc::new(remote),
        Arc::new(confirm.clone()),
        config.feedback_ttl,
    );

    let app = App {
        controller,
        confirm,
        board: config.board,
        tasks: config.tasks,
    };

    println!("scoreboard at {} (type `help`)", config.base_url);
    if let Err(err) = app.controller.dispatch(Intent::Load).await {
        warn!(error = %err, "initial load failed");
    }
    app.render().await;

    let mut lines = spawn_stdin_reader();
    while let Some(line) = lines.recv().await {
        if app.confirm.answer(&line) {
            continue;
        }
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => app.handle(command, &mut lines).await,
            Err(message) => println!("{message}"),
        }
    }

    Ok(())
}

/// Logs go to stderr so they do not interleave with the board.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
