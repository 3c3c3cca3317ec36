// Command-surface models: the dot-prefix grammar and the static dispatch
// table. Dispatch is table-driven so the authorization and group-only rules
// live in data, not in a chain of conditionals.

pub const COMMAND_PREFIX: char = '.';

/// Everything the bot can be asked to do with a dot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Menu,
    Ping,
    TagAll,
    Kick,
    Warn,
    Open,
    Close,
    AntiLink,
}

/// One row of the dispatch table.
#[derive(Debug)]
pub struct CommandSpec {
    pub token: &'static str,
    pub command: Command,
    /// Protected commands require the caller to pass the authorization gate.
    pub admin_only: bool,
    /// Group-only commands are silently ignored in direct messages.
    pub group_only: bool,
}

/// Token -> handler table. First match wins; unknown tokens produce no
/// output. Order doubles as the `.menu` command list.
pub const COMMAND_TABLE: &[CommandSpec] = &[
    CommandSpec {
        token: "menu",
        command: Command::Menu,
        admin_only: false,
        group_only: false,
    },
    CommandSpec {
        token: "ping",
        command: Command::Ping,
        admin_only: false,
        group_only: false,
    },
    CommandSpec {
        token: "tagall",
        command: Command::TagAll,
        admin_only: true,
        group_only: true,
    },
    CommandSpec {
        token: "kick",
        command: Command::Kick,
        admin_only: true,
        group_only: true,
    },
    CommandSpec {
        token: "warn",
        command: Command::Warn,
        admin_only: true,
        group_only: true,
    },
    CommandSpec {
        token: "open",
        command: Command::Open,
        admin_only: true,
        group_only: true,
    },
    CommandSpec {
        token: "close",
        command: Command::Close,
        admin_only: true,
        group_only: true,
    },
    CommandSpec {
        token: "antilink",
        command: Command::AntiLink,
        admin_only: true,
        group_only: false,
    },
];

/// A parsed invocation: the matched table row plus the argument remainder.
#[derive(Debug)]
pub struct ParsedCommand<'a> {
    pub spec: &'static CommandSpec,
    pub args: &'a str,
}

/// Parse the leading command token out of message text. `None` when the text
/// does not start with the prefix or the token is unknown.
pub fn parse(text: &str) -> Option<ParsedCommand<'_>> {
    let rest = text.strip_prefix(COMMAND_PREFIX)?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let token = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    COMMAND_TABLE
        .iter()
        .find(|spec| spec.token.eq_ignore_ascii_case(token))
        .map(|spec| ParsedCommand { spec, args })
}

/// `.antilink` argument. Anything other than on/off produces no output,
/// matching the source behavior.
pub fn parse_toggle(args: &str) -> Option<bool> {
    match args.split_whitespace().next() {
        Some(arg) if arg.eq_ignore_ascii_case("on") => Some(true),
        Some(arg) if arg.eq_ignore_ascii_case("off") => Some(false),
        _ => None,
    }
}
