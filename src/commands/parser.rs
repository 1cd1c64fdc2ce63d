use super::types::Command;
use crate::structure::StructureId;

pub fn parse_command(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next()?.to_lowercase();
    let args = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "/list" | "/ls" => Some(Command::List),
        "/ref" | "/reference" => args.parse().ok().map(Command::Reference),
        "/target" | "/t" => args.parse().ok().map(Command::Target),
        "/submit" | "/align" => Some(Command::Submit),
        "/retry" => Some(Command::Retry),
        "/undo" => Some(Command::Undo),
        "/status" => Some(Command::Status),
        "/add" => parse_add(args),
        "/remove" | "/rm" => args.parse().ok().map(Command::Remove),
        "/reset" => args.parse().ok().map(Command::Reset),
        "/help" | "/?" => Some(Command::Help),
        "/quit" | "/exit" => Some(Command::Quit),
        _ => None,
    }
}

fn parse_add(args: &str) -> Option<Command> {
    let mut parts = args.splitn(2, char::is_whitespace);
    let id: StructureId = parts.next()?.parse().ok()?;
    let name = parts.next().unwrap_or("").trim();
    if name.is_empty() {
        return None;
    }
    Some(Command::Add {
        id,
        name: name.to_string(),
    })
}
