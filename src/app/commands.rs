//! Console slash-command parser.
//!
//! Parses `/command arg1 arg2 ...` input lines into typed [`ParsedCommand`]
//! values that the event handler can act on. Entity kinds are left as typed
//! by the user; the handler resolves them against the known resources.

/// A parsed console command. Each variant corresponds to a `/command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    List {
        kind: String,
        page: Option<u32>,
        size: Option<u32>,
        sort: Option<String>,
    },
    More { kind: String },
    Get { kind: String, id: String },
    Create { kind: String, json: String },
    Update { kind: String, json: String },
    Patch { kind: String, json: String },
    Delete { kind: String, id: String },
    Blob {
        kind: String,
        field: String,
        content_type: Option<String>,
        data: String,
    },
    Reset { kind: String },
    Show { kind: String },
    ConfigSave,
    Help,
    Quit,
}

/// Parse a slash-command string into a [`ParsedCommand`].
///
/// Returns `None` if the input does not start with `/`, is not a recognized
/// command, or lacks required arguments. Command names are case-insensitive.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let (cmd, args) = match rest.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd.to_lowercase(), args.trim()),
        None => (rest.to_lowercase(), ""),
    };
    let words: Vec<&str> = args.split_whitespace().collect();

    match cmd.as_str() {
        "list" | "ls" => {
            let kind = words.first()?.to_string();
            let page = match words.get(1) {
                Some(p) => Some(p.parse().ok()?),
                None => None,
            };
            let size = match words.get(2) {
                Some(s) => Some(s.parse().ok()?),
                None => None,
            };
            let sort = words.get(3).map(|s| s.to_string());
            Some(ParsedCommand::List { kind, page, size, sort })
        }
        "more" | "next" => Some(ParsedCommand::More {
            kind: words.first()?.to_string(),
        }),
        "get" => Some(ParsedCommand::Get {
            kind: words.first()?.to_string(),
            id: words.get(1)?.to_string(),
        }),
        "delete" | "del" | "rm" => Some(ParsedCommand::Delete {
            kind: words.first()?.to_string(),
            id: words.get(1)?.to_string(),
        }),
        "create" | "update" | "patch" => {
            let (kind, json) = split_first(args)?;
            let json = json.to_string();
            match cmd.as_str() {
                "create" => Some(ParsedCommand::Create { kind, json }),
                "update" => Some(ParsedCommand::Update { kind, json }),
                _ => Some(ParsedCommand::Patch { kind, json }),
            }
        }
        "blob" => {
            let (kind, rest) = split_first(args)?;
            let (field, rest) = split_first(rest)?;
            let (content_type, data) = split_first(rest)?;
            let content_type = (content_type != "-").then_some(content_type);
            Some(ParsedCommand::Blob {
                kind,
                field,
                content_type,
                data: data.to_string(),
            })
        }
        "reset" => Some(ParsedCommand::Reset {
            kind: words.first()?.to_string(),
        }),
        "show" => Some(ParsedCommand::Show {
            kind: words.first()?.to_string(),
        }),
        "config" => match words.first().map(|s| s.to_lowercase()).as_deref() {
            Some("save") => Some(ParsedCommand::ConfigSave),
            _ => None,
        },
        "help" | "h" => Some(ParsedCommand::Help),
        "quit" | "exit" | "q" => Some(ParsedCommand::Quit),
        _ => None,
    }
}

/// Split off the first word; the remainder must be non-empty.
fn split_first(args: &str) -> Option<(String, &str)> {
    let (first, rest) = args.trim().split_once(char::is_whitespace)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    Some((first.to_string(), rest))
}
