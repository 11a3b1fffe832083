use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Find(String),
    Next,
    Previous,
    ToggleRegex,
    ToggleCase,
    Goto(usize),
    Insert { offset: usize, text: String },
    Show,
    Status,
    Cancel,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub summary: &'static str,
}

const fn command(
    name: &'static str,
    aliases: &'static [&'static str],
    usage: &'static str,
    summary: &'static str,
) -> CommandSpec {
    CommandSpec {
        name,
        aliases,
        usage,
        summary,
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    command("find", &["/", "search"], "find <query>", "Search the document from the top"),
    command("next", &["n"], "next", "Select the next match"),
    command("prev", &["p", "previous"], "prev", "Select the previous match"),
    command("regex", &[], "regex", "Toggle regular expression mode"),
    command("case", &[], "case", "Toggle case-sensitive matching"),
    command("goto", &["g"], "goto <offset>", "Move the caret and jump to the nearest match"),
    command("insert", &["i"], "insert <offset> <text>", "Insert text (\\n for newline)"),
    command("show", &["s"], "show", "Show the current selection"),
    command("status", &[], "status", "Show query, mode and match count"),
    command("cancel", &[], "cancel", "Cancel the running search"),
    command("help", &["h", "?"], "help", "List commands"),
    command("quit", &["q", "exit"], "quit", "Leave seekpad"),
];

impl Command {
    /// Parses one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        let line = line.trim_start();
        if let Some(query) = line.strip_prefix('/') {
            return Ok(Some(Self::Find(query.to_string())));
        }

        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let name = name.to_ascii_lowercase();
        let Some(spec) = COMMANDS
            .iter()
            .find(|spec| spec.name == name || spec.aliases.contains(&name.as_str()))
        else {
            bail!("unknown command `{}` (try `help`)", name);
        };

        let command = match spec.name {
            "find" => Self::Find(rest.to_string()),
            "next" => Self::Next,
            "prev" => Self::Previous,
            "regex" => Self::ToggleRegex,
            "case" => Self::ToggleCase,
            "goto" => Self::Goto(parse_offset(rest)?),
            "insert" => {
                let (offset, text) = rest.trim_start().split_once(' ').unwrap_or((rest, ""));
                if text.is_empty() {
                    bail!("usage: insert <offset> <text>");
                }
                Self::Insert {
                    offset: parse_offset(offset)?,
                    text: text.replace("\\n", "\n"),
                }
            }
            "show" => Self::Show,
            "status" => Self::Status,
            "cancel" => Self::Cancel,
            "help" => Self::Help,
            "quit" => Self::Quit,
            other => bail!("command `{}` is not handled", other),
        };

        Ok(Some(command))
    }
}

fn parse_offset(value: &str) -> Result<usize> {
    let value = value.trim();
    value
        .parse::<usize>()
        .with_context(|| format!("expected a character offset, got `{}`", value))
}

pub fn help_text() -> String {
    let width = COMMANDS.iter().map(|c| c.usage.len()).max().unwrap_or(0);
    let mut out = String::from("Commands:\n");
    for spec in COMMANDS {
        out.push_str(&format!("  {:width$}  {}", spec.usage, spec.summary));
        if !spec.aliases.is_empty() {
            out.push_str(&format!(" (alias: {})", spec.aliases.join(", ")));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn find_keeps_query_whitespace() {
        assert_eq!(parse("find  two spaces"), Command::Find(" two spaces".to_string()));
        assert_eq!(parse("/a+b"), Command::Find("a+b".to_string()));
        assert_eq!(parse("search x\n"), Command::Find("x".to_string()));
        assert_eq!(parse("find"), Command::Find(String::new()));
    }

    #[test]
    fn navigation_and_toggles_parse() {
        assert_eq!(parse("next"), Command::Next);
        assert_eq!(parse("N"), Command::Next);
        assert_eq!(parse("prev"), Command::Previous);
        assert_eq!(parse("p"), Command::Previous);
        assert_eq!(parse("regex"), Command::ToggleRegex);
        assert_eq!(parse("case"), Command::ToggleCase);
        assert_eq!(parse("  quit"), Command::Quit);
    }

    #[test]
    fn goto_requires_offset() {
        assert_eq!(parse("goto 12"), Command::Goto(12));
        assert!(Command::parse("goto").is_err());
        assert!(Command::parse("goto -1").is_err());
    }

    #[test]
    fn insert_parses_offset_and_text() {
        assert_eq!(
            parse("insert 3 hello world\\n"),
            Command::Insert {
                offset: 3,
                text: "hello world\n".to_string()
            }
        );
        assert!(Command::parse("insert 3").is_err());
        assert!(Command::parse("insert x text").is_err());
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert!(Command::parse("   \n").unwrap().is_none());
        assert!(Command::parse("load file.txt").is_err());
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for spec in COMMANDS {
            assert!(help.contains(spec.usage));
        }
    }
}
