//! Interactive editor shell
//!
//! A line-oriented front end over [`Runtime`] and [`LayoutHost`]: editor
//! commands change the layout, session commands go to the runtime, and
//! every line ends by dispatching the lifecycle events it caused.

use crate::host::{Host, InputMode, LayoutHost, NoticeLevel};
use crate::runtime::Runtime;
use anyhow::{Context, Result, anyhow, bail};
use std::io::{BufRead, Write};
use std::path::Path;

pub const PROMPT: &str = ":";

/// What the shell loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    Continue(Vec<String>),
    Quit(Vec<String>),
}

pub struct Shell {
    runtime: Runtime<LayoutHost>,
    verbose: bool,
}

impl Shell {
    pub fn new(runtime: Runtime<LayoutHost>, verbose: bool) -> Self {
        Self { runtime, verbose }
    }

    pub fn runtime(&self) -> &Runtime<LayoutHost> {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime<LayoutHost> {
        &mut self.runtime
    }

    /// Open the documents given on the command line
    pub fn open_all(&mut self, files: &[impl AsRef<Path>]) {
        for file in files {
            self.runtime.host_mut().open(file.as_ref());
        }
        self.runtime.pump();
    }

    /// Read commands from `input` until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        if self.verbose {
            writeln!(output, "Type 'help' for commands.")?;
        }

        let mut lines = input.lines();
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            let Some(line) = lines.next() else {
                // End of input behaves like quit.
                let messages = self.quit();
                Self::print(&mut output, &messages)?;
                return Ok(());
            };
            let line = line.context("Failed to read command")?;

            match self.handle_line(&line) {
                ShellAction::Continue(messages) => Self::print(&mut output, &messages)?,
                ShellAction::Quit(messages) => {
                    Self::print(&mut output, &messages)?;
                    return Ok(());
                }
            }
        }
    }

    /// Execute one command line
    pub fn handle_line(&mut self, line: &str) -> ShellAction {
        let line = line.trim();
        if line.is_empty() {
            return ShellAction::Continue(Vec::new());
        }
        if matches!(line, "quit" | "exit" | "q" | "qa") {
            return ShellAction::Quit(self.quit());
        }

        let mut messages = Vec::new();
        match self.runtime.execute_line(line) {
            Some(Ok(message)) => messages.push(message),
            Some(Err(_)) => {}
            None => match self.editor_command(line) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => {}
                Err(e) => self
                    .runtime
                    .host_mut()
                    .notify(NoticeLevel::Error, &format!("{:#}", e)),
            },
        }
        self.runtime.pump();

        messages.extend(self.drain_notices());
        ShellAction::Continue(messages)
    }

    fn quit(&mut self) -> Vec<String> {
        self.runtime.host_mut().quit();
        self.runtime.pump();
        self.drain_notices()
    }

    fn drain_notices(&mut self) -> Vec<String> {
        self.runtime
            .host_mut()
            .take_notices()
            .into_iter()
            .map(|(level, message)| format!("{}: {}", level, message))
            .collect()
    }

    fn editor_command(&mut self, line: &str) -> Result<Option<String>> {
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let host = self.runtime.host_mut();

        match word {
            "edit" | "e" => {
                let path = required(rest, "edit <file>")?;
                let document = host.open(Path::new(path));
                Ok(document.path.map(|p| format!("\"{}\"", p.display())))
            }
            "new" => {
                let document = host.open_scratch();
                Ok(Some(format!("scratch document {}", document.id)))
            }
            "enter" | "b" => {
                let path = required(rest, "enter <file>")?;
                host.enter(Path::new(path))?;
                Ok(None)
            }
            "close" | "bd" => {
                let path = match rest {
                    "" => host
                        .current_document()
                        .and_then(|document| document.path)
                        .ok_or_else(|| anyhow!("No current document to close"))?,
                    path => host.absolute(Path::new(path)),
                };
                host.close(&path)?;
                Ok(None)
            }
            "cursor" => {
                let [line, column] = numbers(rest, "cursor <line> <column>")?;
                host.set_cursor(line, column)?;
                Ok(None)
            }
            "fold" => {
                let [start, end] = numbers(rest, "fold <start> <end>")?;
                host.add_fold(start, end)?;
                Ok(None)
            }
            "set" => {
                let (name, value) = rest
                    .split_once('=')
                    .ok_or_else(|| anyhow!("usage: set <name>=<value>"))?;
                host.set_option(name.trim(), value.trim())?;
                Ok(None)
            }
            "mode" => {
                let mode = match rest {
                    "cmdline" => InputMode::CommandLine,
                    "normal" => InputMode::Normal,
                    _ => bail!("usage: mode cmdline|normal"),
                };
                host.set_mode(mode);
                Ok(None)
            }
            "cd" => {
                let dir = required(rest, "cd <dir>")?;
                let dir = host.absolute(Path::new(dir));
                host.set_cwd(dir.clone());
                Ok(Some(dir.display().to_string()))
            }
            "pwd" => Ok(Some(host.current_dir()?.display().to_string())),
            "ls" => Ok(Some(list_documents(host))),
            "where" => {
                let Some(path) = host.current_document().and_then(|d| d.path) else {
                    bail!("No current document");
                };
                let cursor = host.cursor(&path).unwrap_or_default();
                let folds = host.folds(&path);
                Ok(Some(format!(
                    "{} line {} column {}, {} fold(s)",
                    path.display(),
                    cursor.line,
                    cursor.column,
                    folds.len()
                )))
            }
            "help" => Ok(Some(help_text().to_string())),
            other => bail!("Not an editor command: {}", other),
        }
    }

    fn print<W: Write>(output: &mut W, messages: &[String]) -> Result<()> {
        for message in messages {
            writeln!(output, "{}", message)?;
        }
        Ok(())
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok(rest)
}

fn numbers(rest: &str, usage: &str) -> Result<[u32; 2]> {
    let values: Vec<u32> = rest
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| anyhow!("usage: {}", usage))?;
    match values.as_slice() {
        [a, b] => Ok([*a, *b]),
        _ => bail!("usage: {}", usage),
    }
}

fn list_documents(host: &LayoutHost) -> String {
    let current = host.current_document().map(|d| d.id);
    let lines: Vec<String> = host
        .documents()
        .into_iter()
        .map(|document| {
            let marker = if Some(document.id) == current { '%' } else { ' ' };
            let name = document
                .path
                .map(|p| format!("\"{}\"", p.display()))
                .unwrap_or_else(|| "[No Name]".to_string());
            format!("{:>4} {} {}", document.id, marker, name)
        })
        .collect();
    if lines.is_empty() {
        "No documents".to_string()
    } else {
        lines.join("\n")
    }
}

fn help_text() -> &'static str {
    "Editor commands:\n\
     \x20 edit <file>          open a document\n\
     \x20 new                  open a scratch document\n\
     \x20 enter <file>         switch to an open document\n\
     \x20 close [file]         close a document\n\
     \x20 cursor <line> <col>  move the cursor\n\
     \x20 fold <start> <end>   close a fold\n\
     \x20 set <name>=<value>   set a document option\n\
     \x20 mode cmdline|normal  switch input mode\n\
     \x20 cd <dir> | pwd       change or print the working directory\n\
     \x20 ls | where           list documents, show cursor\n\
     \x20 quit                 exit\n\
     Session commands:\n\
     \x20 SessionLoad[!] [file]\n\
     \x20 SessionStart[!] [file]\n\
     \x20 SessionStop\n\
     \x20 SessionStatus\n\
     \x20 SessionList"
}
