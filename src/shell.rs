//! Interactive line-oriented shell.
//!
//! Reads one command per line, applies it to the session and prints the
//! resulting screen. Errors are printed and the shell keeps running. While
//! the chat screen is active, a line that is not a command is sent as a
//! question.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use prospan_core::models::DocumentType;
use prospan_core::session::{DeleteOutcome, Screen, Session, View};

use crate::chat::{self, lock_session};
use crate::config::{AssistantConfig, Config};
use crate::genai::{create_model, GenerativeModel};
use crate::import::import_file;
use crate::render::render;

const HELP: &str = "\
Commands:
  dashboard                 Show the dashboard
  library                   List documents
  chat                      Open Smart Search
  open <n|id>               Show a document (n = row in the library)
  back                      Return to the library
  delete <n|id>             Delete a document (asks for confirmation)
  ask <question>            Ask the library a question
  import <path> [type]      Import a .txt, .md, .pdf or .docx file
  show                      Redraw the current screen
  help                      Show this help
  quit                      Leave the shell
In Smart Search, any other line is sent as a question.";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate(Screen),
    Open(String),
    Back,
    Delete(String),
    Ask(String),
    Import {
        path: PathBuf,
        doc_type: DocumentType,
    },
    Show,
    Help,
    Quit,
    /// Free text, sent as a question when the chat screen is active.
    Text(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let needs_arg = |name: &str| -> Result<String> {
            if rest.is_empty() {
                bail!("usage: {} <n|id>", name);
            }
            Ok(rest.to_string())
        };

        match word.to_ascii_lowercase().as_str() {
            "dashboard" | "home" => Ok(Command::Navigate(Screen::Dashboard)),
            "library" | "documents" | "ls" => Ok(Command::Navigate(Screen::Library)),
            "chat" | "search" => Ok(Command::Navigate(Screen::Chat)),
            "open" => Ok(Command::Open(needs_arg("open")?)),
            "back" => Ok(Command::Back),
            "delete" | "rm" => Ok(Command::Delete(needs_arg("delete")?)),
            "ask" => {
                if rest.is_empty() {
                    bail!("usage: ask <question>");
                }
                Ok(Command::Ask(rest.to_string()))
            }
            "import" => {
                let mut parts = rest.split_whitespace();
                let Some(path) = parts.next() else {
                    bail!("usage: import <path> [type]");
                };
                let doc_type = match parts.next() {
                    Some(t) => t.parse()?,
                    None => DocumentType::Other,
                };
                Ok(Command::Import {
                    path: PathBuf::from(path),
                    doc_type,
                })
            }
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Ok(Command::Text(line.to_string())),
        }
    }
}

pub struct Shell {
    session: Mutex<Session>,
    model: Arc<dyn GenerativeModel>,
    settings: AssistantConfig,
}

impl Shell {
    pub fn new(session: Session, model: Arc<dyn GenerativeModel>, settings: AssistantConfig) -> Self {
        Self {
            session: Mutex::new(session),
            model,
            settings,
        }
    }

    /// Run until `quit` or end of input.
    ///
    /// `interactive` controls whether a prompt is printed before each line.
    pub async fn run<R, W>(&self, input: R, out: &mut W, interactive: bool) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        write!(out, "{}", render(&lock_session(&self.session)))?;

        loop {
            if interactive {
                write!(out, "prospan> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match Command::parse(&line) {
                Ok(c) => c,
                Err(e) => {
                    writeln!(out, "Error: {}", e)?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }

            let answer = if let Command::Delete(target) = &command {
                // Confirmation is read from the same input stream.
                match self.confirm_prompt(target) {
                    Some(prompt) => {
                        write!(out, "{}", prompt)?;
                        out.flush()?;
                        let reply = lines.next_line().await?.unwrap_or_default();
                        Some(matches!(reply.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
                    }
                    None => None,
                }
            } else {
                None
            };

            if let Err(e) = self.execute(command, answer, out).await {
                writeln!(out, "Error: {:#}", e)?;
            }
        }
        Ok(())
    }

    fn confirm_prompt(&self, target: &str) -> Option<String> {
        let session = lock_session(&self.session);
        let id = resolve_target(&session, target)?;
        let doc = session.store().find_by_id(&id)?;
        Some(format!(
            "Delete \"{}\"? This cannot be undone. [y/N] ",
            doc.title()
        ))
    }

    async fn execute<W: Write>(
        &self,
        command: Command,
        confirmed: Option<bool>,
        out: &mut W,
    ) -> Result<()> {
        match command {
            Command::Navigate(screen) => lock_session(&self.session).navigate(screen),
            Command::Open(target) => {
                let mut session = lock_session(&self.session);
                let id = resolve_target(&session, &target).unwrap_or(target);
                session.open_document(&id)?;
            }
            Command::Back => lock_session(&self.session).back(),
            Command::Delete(target) => {
                let outcome = {
                    let mut session = lock_session(&self.session);
                    let id = resolve_target(&session, &target).unwrap_or(target);
                    let outcome =
                        session.delete_document(&id, |_| confirmed.unwrap_or(false));
                    if outcome == DeleteOutcome::Deleted {
                        tracing::info!(id = %id, "document deleted");
                    }
                    outcome
                };
                match outcome {
                    DeleteOutcome::Deleted => writeln!(out, "Deleted.")?,
                    DeleteOutcome::Declined => writeln!(out, "Kept.")?,
                    DeleteOutcome::NotFound => bail!("document not found"),
                }
            }
            Command::Ask(query) => self.ask(&query, out).await?,
            Command::Text(text) => {
                let in_chat = matches!(lock_session(&self.session).view(), View::Chat);
                if !in_chat {
                    bail!("unknown command: {} (type `help`)", text);
                }
                self.ask(&text, out).await?;
            }
            Command::Import { path, doc_type } => {
                writeln!(out, "Importing {} ...", path.display())?;
                out.flush()?;
                let report = import_file(
                    &self.session,
                    self.model.as_ref(),
                    &self.settings,
                    &path,
                    doc_type,
                )
                .await?;
                writeln!(
                    out,
                    "Imported {} as {} ({})",
                    report.title,
                    report.id,
                    report.status.as_str()
                )?;
                lock_session(&self.session).navigate(Screen::Library);
            }
            Command::Show => {}
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                return Ok(());
            }
            Command::Quit => return Ok(()),
        }
        write!(out, "{}", render(&lock_session(&self.session)))?;
        Ok(())
    }

    async fn ask<W: Write>(&self, query: &str, out: &mut W) -> Result<()> {
        lock_session(&self.session).navigate(Screen::Chat);
        writeln!(out, "Assistant is thinking...")?;
        out.flush()?;
        chat::submit(&self.session, self.model.as_ref(), &self.settings, query).await?;
        Ok(())
    }
}

/// A 1-based library row number or a document id.
fn resolve_target(session: &Session, target: &str) -> Option<String> {
    let docs = session.documents();
    if let Ok(n) = target.parse::<usize>() {
        if n >= 1 && n <= docs.len() {
            return Some(docs[n - 1].id().to_string());
        }
    }
    docs.iter()
        .find(|d| d.id() == target)
        .map(|d| d.id().to_string())
}

/// Run the shell on stdin/stdout with the configured provider.
pub async fn run_shell(config: &Config) -> Result<()> {
    let model = create_model(&config.ai)?;
    let shell = Shell::new(Session::seeded()?, model, config.assistant.clone());
    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    shell.run(stdin, &mut stdout, interactive).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::testing::ScriptedModel;
    use prospan_core::seed::SAMPLE_DOCUMENT_ID;

    async fn run_script(model: ScriptedModel, script: &str) -> (String, Shell) {
        let shell = Shell::new(
            Session::seeded().unwrap(),
            Arc::new(model),
            AssistantConfig::default(),
        );
        let mut out = Vec::new();
        shell
            .run(BufReader::new(script.as_bytes()), &mut out, false)
            .await
            .unwrap();
        (String::from_utf8(out).unwrap(), shell)
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("library").unwrap(), Command::Navigate(Screen::Library));
        assert_eq!(Command::parse("  open 1 ").unwrap(), Command::Open("1".into()));
        assert_eq!(
            Command::parse("ask what is EA 575?").unwrap(),
            Command::Ask("what is EA 575?".into())
        );
        assert_eq!(
            Command::parse("import notes.md guideline").unwrap(),
            Command::Import {
                path: PathBuf::from("notes.md"),
                doc_type: DocumentType::Guideline
            }
        );
        assert!(Command::parse("open").is_err());
        assert!(Command::parse("import a.txt nonsense").is_err());
        assert_eq!(
            Command::parse("hello there").unwrap(),
            Command::Text("hello there".into())
        );
    }

    #[tokio::test]
    async fn open_and_back_by_row_number() {
        let (out, shell) = run_script(ScriptedModel::new(), "library\nopen 1\n").await;
        assert!(out.contains("SOHACO"));
        assert_eq!(
            lock_session(&shell.session).view(),
            &View::DocumentDetail {
                document_id: SAMPLE_DOCUMENT_ID.to_string()
            }
        );
    }

    #[tokio::test]
    async fn declined_delete_keeps_the_document() {
        let (out, shell) = run_script(ScriptedModel::new(), "delete 1\nn\n").await;
        assert!(out.contains("[y/N]"));
        assert!(out.contains("Kept."));
        assert_eq!(lock_session(&shell.session).documents().len(), 1);
    }

    #[tokio::test]
    async fn confirmed_delete_of_open_document_returns_to_library() {
        let (out, shell) = run_script(ScriptedModel::new(), "open 1\ndelete 1\ny\n").await;
        assert!(out.contains("Deleted."));
        let session = lock_session(&shell.session);
        assert!(session.documents().is_empty());
        assert_eq!(session.view(), &View::Library);
    }

    #[tokio::test]
    async fn delete_unknown_document_does_not_prompt() {
        let (out, _shell) = run_script(ScriptedModel::new(), "delete doc_missing\n").await;
        assert!(!out.contains("[y/N]"));
        assert!(out.contains("Error: document not found"));
    }

    #[tokio::test]
    async fn free_text_in_chat_is_a_question() {
        let model = ScriptedModel::new().reply(&format!(
            r#"{{"answer":"Dùng 2 lần mỗi ngày.","citations":["{}"]}}"#,
            SAMPLE_DOCUMENT_ID
        ));
        let (out, shell) = run_script(model, "chat\nliều dùng?\n").await;
        assert!(out.contains("Dùng 2 lần mỗi ngày."));
        assert!(out.contains("Sources:"));
        assert_eq!(lock_session(&shell.session).transcript().len(), 2);
    }

    #[tokio::test]
    async fn free_text_outside_chat_is_rejected() {
        let (out, shell) = run_script(ScriptedModel::new(), "hello\n").await;
        assert!(out.contains("unknown command"));
        assert!(lock_session(&shell.session).transcript().is_empty());
    }

    #[tokio::test]
    async fn missing_key_is_reported_and_the_shell_continues() {
        let model = ScriptedModel::new().fail(crate::genai::AiError::MissingApiKey("API_KEY".into()));
        let (out, shell) = run_script(model, "ask hi\nlibrary\n").await;
        assert!(out.contains("Please set the API_KEY environment variable"));
        let session = lock_session(&shell.session);
        assert!(!session.is_awaiting_response());
        assert_eq!(session.view(), &View::Library);
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let (_out, shell) = run_script(ScriptedModel::new(), "quit\nlibrary\n").await;
        assert_eq!(lock_session(&shell.session).view(), &View::Dashboard);
    }
}
