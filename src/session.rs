use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::pin::pin;
use std::thread;

use anyhow::Result;
use flume::Receiver;
use futures::future::{Either, select};
use log::{debug, warn};
use seekpad_search::{MatchSet, MatchSpan, SearchError, SearchMode, SearchState};

use crate::commands::{Command, help_text};
use crate::config::AppConfig;
use crate::document::Document;

enum Event {
    Line(String),
    InputClosed,
    SearchFinished {
        generation: u64,
        result: Result<MatchSet, SearchError>,
    },
}

/// Forwards stdin lines to the session until stdin closes or the session
/// goes away.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = flume::unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// One editing session: the document, its search state and the output the
/// results are reported to.
pub struct Session<W> {
    document: Document,
    search: SearchState,
    config: AppConfig,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(document: Document, search: SearchState, config: AppConfig, out: W) -> Self {
        Self {
            document,
            search,
            config,
            out,
        }
    }

    pub fn run(mut self, lines: Receiver<String>) -> Result<()> {
        smol::block_on(async {
            loop {
                match self.next_event(&lines).await {
                    Event::Line(line) => {
                        if self.handle_line(&line).await?.is_break() {
                            break;
                        }
                    }
                    Event::InputClosed => {
                        self.settle().await?;
                        break;
                    }
                    Event::SearchFinished { generation, result } => {
                        self.on_search_finished(generation, result)?;
                    }
                }
            }
            self.search.cancel_search();
            self.out.flush()?;
            Ok::<_, anyhow::Error>(())
        })
    }

    async fn next_event(&mut self, lines: &Receiver<String>) -> Event {
        let input = pin!(lines.recv_async());
        let Some(task) = self.search.pending_mut() else {
            return match input.await {
                Ok(line) => Event::Line(line),
                Err(_) => Event::InputClosed,
            };
        };

        let generation = task.generation();
        match select(task, input).await {
            Either::Left((result, _)) => Event::SearchFinished { generation, result },
            Either::Right((Ok(line), _)) => Event::Line(line),
            Either::Right((Err(_), _)) => Event::InputClosed,
        }
    }

    async fn handle_line(&mut self, line: &str) -> Result<ControlFlow<()>> {
        match Command::parse(line) {
            Ok(Some(command)) => self.dispatch(command).await,
            Ok(None) => Ok(ControlFlow::Continue(())),
            Err(e) => {
                writeln!(self.out, "error: {:#}", e)?;
                Ok(ControlFlow::Continue(()))
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<ControlFlow<()>> {
        debug!("Dispatching {:?}", command);
        match command {
            Command::Find(query) => {
                self.search.set_query(&query);
                if let Err(e) = self.search.start_search(self.document.snapshot()) {
                    warn!("{}", e);
                    writeln!(self.out, "error: {}", e)?;
                }
            }
            Command::Next => {
                self.settle().await?;
                let span = self.search.next_match();
                self.show_span(span)?;
            }
            Command::Previous => {
                self.settle().await?;
                let span = self.search.previous_match();
                self.show_span(span)?;
            }
            Command::ToggleRegex => {
                let mode = self.search.toggle_regex_mode();
                let label = match mode {
                    SearchMode::Literal => "off",
                    SearchMode::Pattern => "on",
                };
                writeln!(self.out, "Regex {} (applies to the next find)", label)?;
            }
            Command::ToggleCase => {
                let label = if self.search.toggle_case_sensitive() {
                    "sensitive"
                } else {
                    "insensitive"
                };
                writeln!(self.out, "Case {} (applies to the next find)", label)?;
            }
            Command::Goto(offset) => {
                self.settle().await?;
                self.document.set_caret(offset);
                match self.search.jump_to_nearest(self.document.caret()) {
                    Some(span) => self.select(span)?,
                    None => self.print_caret()?,
                }
            }
            Command::Insert { offset, text } => {
                self.document.insert(offset, &text);
                writeln!(
                    self.out,
                    "Inserted {} char(s); caret at {}",
                    text.chars().count(),
                    self.document.caret()
                )?;
                if !self.search.cursor().is_empty() {
                    writeln!(self.out, "Matches are from before the edit; run find to refresh")?;
                }
            }
            Command::Show => {
                self.settle().await?;
                match self.document.selection() {
                    Some(range) => {
                        let span = MatchSpan::new(range.start, range.end - range.start);
                        self.print_match(span)?;
                    }
                    None => self.print_caret()?,
                }
            }
            Command::Status => self.print_status()?,
            Command::Cancel => {
                if self.search.is_searching() {
                    self.search.cancel_search();
                    writeln!(self.out, "Search cancelled")?;
                } else {
                    writeln!(self.out, "No search running")?;
                }
            }
            Command::Help => write!(self.out, "{}", help_text())?,
            Command::Quit => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Wait for the in-flight search, if any, so the next command sees its
    /// results.
    async fn settle(&mut self) -> Result<()> {
        if let Some(task) = self.search.pending_mut() {
            let generation = task.generation();
            let result = task.await;
            self.on_search_finished(generation, result)?;
        }
        Ok(())
    }

    fn on_search_finished(
        &mut self,
        generation: u64,
        result: Result<MatchSet, SearchError>,
    ) -> Result<()> {
        let failed = matches!(&result, Err(e) if !e.is_cancelled());
        if !self.search.finish_search(generation, result) {
            if failed && let Some(e) = self.search.error() {
                writeln!(self.out, "error: {}", e)?;
            }
            return Ok(());
        }

        if self.config.start_at_caret {
            self.search.jump_to_nearest(self.document.caret());
        }

        match self.search.current() {
            Some(span) => self.select(span),
            None => {
                writeln!(self.out, "No matches for {:?}", self.search.query())?;
                Ok(())
            }
        }
    }

    fn show_span(&mut self, span: Option<MatchSpan>) -> Result<()> {
        match span {
            Some(span) => self.select(span),
            None => {
                writeln!(self.out, "No matches")?;
                Ok(())
            }
        }
    }

    fn select(&mut self, span: MatchSpan) -> Result<()> {
        self.document.select(span);
        self.print_match(span)
    }

    fn print_match(&mut self, span: MatchSpan) -> Result<()> {
        let (line, col) = self.document.line_col(span.start);
        let excerpt = self.document.excerpt(span, self.config.context_chars);
        match self.search.position() {
            Some((current, total)) if self.search.current() == Some(span) => writeln!(
                self.out,
                "match {} of {} at {}:{}  {}",
                current, total, line, col, excerpt
            )?,
            _ => writeln!(self.out, "selection at {}:{}  {}", line, col, excerpt)?,
        }
        Ok(())
    }

    fn print_caret(&mut self) -> Result<()> {
        let caret = self.document.caret();
        let (line, col) = self.document.line_col(caret);
        writeln!(self.out, "caret at {} ({}:{})", caret, line, col)?;
        Ok(())
    }

    fn print_status(&mut self) -> Result<()> {
        let (current, total) = self.search.position().unwrap_or((0, 0));
        writeln!(self.out, "query: {:?}", self.search.query())?;
        writeln!(
            self.out,
            "mode: {}, case {}",
            self.search.mode().label(),
            if self.search.is_case_sensitive() {
                "sensitive"
            } else {
                "insensitive"
            }
        )?;
        writeln!(self.out, "matches: {} of {}", current, total)?;
        writeln!(
            self.out,
            "document: {} chars, caret at {}",
            self.document.char_len(),
            self.document.caret()
        )?;
        if let Some(selected) = self.document.selected_text() {
            writeln!(self.out, "selected: {:?}", selected)?;
        }
        if self.search.is_searching() {
            writeln!(self.out, "search running")?;
        }
        if let Some(e) = self.search.error() {
            writeln!(self.out, "last error: {}", e)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(text: &str, config: AppConfig, script: &[&str]) -> String {
        let (tx, rx) = flume::unbounded();
        for line in script {
            tx.send(line.to_string()).unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        let search = SearchState::with_config(config.search_config());
        Session::new(Document::new(text.to_string()), search, config, &mut out)
            .run(rx)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn literal_search_cycles_through_matches() {
        let out = run_script(
            "abcabcabc",
            AppConfig::default(),
            &["find abc", "next", "next", "next", "prev"],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "match 1 of 3 at 1:1  [abc]abcabc",
                "match 2 of 3 at 1:4  abc[abc]abc",
                "match 3 of 3 at 1:7  abcabc[abc]",
                "match 1 of 3 at 1:1  [abc]abcabc",
                "match 3 of 3 at 1:7  abcabc[abc]",
            ]
        );
    }

    #[test]
    fn pattern_search_selects_first_match() {
        let out = run_script("aXbXXc", AppConfig::default(), &["regex", "/X+", "show"]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Regex on (applies to the next find)",
                "match 1 of 2 at 1:2  a[X]bXXc",
                "match 1 of 2 at 1:2  a[X]bXXc",
            ]
        );
    }

    #[test]
    fn invalid_pattern_keeps_previous_matches() {
        let config = AppConfig {
            regex: true,
            ..AppConfig::default()
        };
        let out = run_script("one two", config, &["find o", "show", "find (", "next"]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("match 1 of 2"));
        assert!(lines[1].starts_with("match 1 of 2"));
        assert!(lines[2].starts_with("error: invalid pattern `(`"));
        assert!(lines[3].starts_with("match 2 of 2"));
    }

    #[test]
    fn no_matches_and_empty_cursor() {
        let out = run_script("hello", AppConfig::default(), &["find zzz", "next"]);
        assert_eq!(out, "No matches for \"zzz\"\nNo matches\n");
    }

    #[test]
    fn start_at_caret_jumps_to_nearest() {
        let config = AppConfig {
            start_at_caret: true,
            ..AppConfig::default()
        };
        let out = run_script("a1 a2 a3", config, &["goto 4", "find a"]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "caret at 4 (1:5)");
        assert_eq!(lines[1], "match 3 of 3 at 1:7  a1 a2 [a]3");
    }

    #[test]
    fn edits_leave_matches_stale() {
        let out = run_script(
            "ab ab",
            AppConfig::default(),
            &["find ab", "show", "insert 0 xx", "next"],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "match 1 of 2 at 1:1  [ab] ab");
        assert_eq!(lines[2], "Inserted 2 char(s); caret at 2");
        assert_eq!(lines[3], "Matches are from before the edit; run find to refresh");
        assert_eq!(lines[4], "match 2 of 2 at 1:4  xxa[b ]ab");
    }

    #[test]
    fn newer_find_supersedes_running_search() {
        let text = format!("{}b b", "a".repeat(2_000_000));
        let out = run_script(&text, AppConfig::default(), &["find a", "find b", "next"]);
        let lines: Vec<&str> = out.lines().collect();
        let n = lines.len();
        assert!(n >= 2);
        assert!(lines[n - 2].starts_with("match 1 of 2 at 1:2000001"));
        assert!(lines[n - 1].starts_with("match 2 of 2 at 1:2000003"));
    }

    #[test]
    fn unknown_command_reports_error_and_continues() {
        let out = run_script("x", AppConfig::default(), &["load x.txt", "quit", "find x"]);
        assert_eq!(out, "error: unknown command `load` (try `help`)\n");
    }
}
