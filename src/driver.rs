//! Line-oriented driver for the headless shell.
//!
//! Each input line is either a platform signal (`online`, `offline`,
//! `visible`, `hidden`) or a user action. Replies are written one per line.

use std::str::FromStr;

use lp_core::ports::PlatformSignal;
use lp_core::{Credentials, OAuthProvider, Page, SignupRequest};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info_span, Instrument};

use crate::bootstrap::Wired;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Signal(PlatformSignal),
    Go(Page),
    Login(Credentials),
    Signup(SignupRequest),
    Demo,
    OAuth(OAuthProvider),
    Logout,
    View,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Page(#[from] lp_core::page::UnknownPage),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("online", []) => Command::Signal(PlatformSignal::Online),
            ("offline", []) => Command::Signal(PlatformSignal::Offline),
            ("visible", []) => Command::Signal(PlatformSignal::VisibilityChanged { visible: true }),
            ("hidden", []) => Command::Signal(PlatformSignal::VisibilityChanged { visible: false }),
            ("go", [page]) => Command::Go(page.parse()?),
            ("go", _) => return Err(CommandError::Usage("go <page>")),
            ("login", [email, password]) => Command::Login(credentials(email, password, false)),
            ("login", [email, password, "remember"]) => {
                Command::Login(credentials(email, password, true))
            }
            ("login", _) => return Err(CommandError::Usage("login <email> <password> [remember]")),
            ("signup", [email, password, first_name, last_name]) => {
                Command::Signup(SignupRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                })
            }
            ("signup", _) => {
                return Err(CommandError::Usage(
                    "signup <email> <password> <first name> <last name>",
                ))
            }
            ("oauth", [provider]) => Command::OAuth(OAuthProvider::new(*provider)),
            ("oauth", _) => return Err(CommandError::Usage("oauth <provider>")),
            ("demo", []) => Command::Demo,
            ("logout", []) => Command::Logout,
            ("view", []) => Command::View,
            ("help", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (other, _) => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn credentials(email: &str, password: &str, remember: bool) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
        remember,
    }
}

const HELP: &str = "commands: online | offline | visible | hidden | go <page> | \
login <email> <password> [remember] | signup <email> <password> <first> <last> | \
oauth <provider> | demo | logout | view | quit";

/// Read commands until `quit` or end of input.
pub async fn run_driver<R, W>(wired: &Wired, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => {
                let verb = line.split_whitespace().next().unwrap_or_default();
                let span = info_span!("driver.command", command = %verb);
                execute(wired, command).instrument(span).await?
            }
            Err(err) => format!("error: {err}"),
        };
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    debug!("driver input finished");
    Ok(())
}

async fn execute(wired: &Wired, command: Command) -> anyhow::Result<String> {
    let shell = &wired.shell;
    let reply = match command {
        Command::Signal(signal) => {
            wired.signals.emit(signal);
            "ok".to_string()
        }
        Command::Go(page) => {
            if shell.navigate(page).is_started() {
                format!("navigating to {page}")
            } else {
                "busy: transition in progress".to_string()
            }
        }
        Command::Login(credentials) => match shell.login(&credentials).await {
            Ok(user) => format!("signed in as {}", user.display_name()),
            Err(failure) => format!("login failed: {}", failure.message()),
        },
        Command::Signup(request) => match shell.signup(&request).await {
            Ok(user) => format!("signed up as {}", user.display_name()),
            Err(failure) => format!("signup failed: {}", failure.message()),
        },
        Command::Demo => match shell.login_as_demo().await {
            Ok(user) => format!("demo session for {}", user.display_name()),
            Err(failure) => format!("demo login failed: {}", failure.message()),
        },
        Command::OAuth(provider) => match shell.login_with_oauth(&provider).await {
            Ok(()) => format!("open {}", wired.backend.authorize_url(&provider)),
            Err(failure) => format!("oauth failed: {}", failure.message()),
        },
        Command::Logout => {
            shell.logout().await.finished().await;
            "signed out".to_string()
        }
        Command::View => serde_json::to_string(&shell.view())?,
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(reply)
}
