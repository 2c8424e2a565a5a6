//! Console commands.

use crate::chain::Response;
use crate::trigger::Interaction;

/// Commands understood by the console.
#[derive(Debug, Clone, PartialEq, Eq, variantly::Variantly)]
pub enum Command {
    /// Interact with the 0-based tile `(x, y)`.
    Interact {
        interaction: Interaction,
        x: u8,
        y: u8,
    },
    /// Talk to the character at `(x, y)` whose chain is `event_id`.
    Character {
        event_id: u16,
        x: u8,
        y: u8,
    },
    /// Answer the pending prompt.
    Respond(Response),
    EndTick,
    ResetGuard,
    SetHour(u8),
    Tiles,
    Party,
    Status,
    Save(Option<String>),
    Load(Option<String>),
    Help,
    Quit,
    Unknown,
}

/// Parse one input line.
pub fn parse_command(input: &str) -> Command {
    let words: Vec<&str> = input.split_whitespace().collect();
    match words.as_slice() {
        ["step" | "walk" | "move", x, y] => interact(Interaction::Step, x, y),
        ["look" | "eye", x, y] => interact(Interaction::Look, x, y),
        ["touch" | "hand", x, y] => interact(Interaction::Touch, x, y),
        ["talk" | "mouth", x, y] => interact(Interaction::Talk, x, y),
        ["levitate" | "fly", x, y] => interact(Interaction::Levitate, x, y),
        ["run", x, y] => interact(Interaction::Scripted, x, y),
        ["use", item, x, y] => match item.parse() {
            Ok(item) => interact(Interaction::UseItem(item), x, y),
            Err(_) => Command::Unknown,
        },
        ["npc", event, x, y] => match (event.parse(), x.parse(), y.parse()) {
            (Ok(event_id), Ok(x), Ok(y)) => Command::Character { event_id, x, y },
            _ => Command::Unknown,
        },
        ["close" | "ok" | "dismiss"] => Command::Respond(Response::Closed),
        ["yes" | "y"] => Command::Respond(Response::Yes),
        ["no" | "n"] => Command::Respond(Response::No),
        ["say", rest @ ..] if !rest.is_empty() => Command::Respond(Response::Word(rest.join(" "))),
        ["enter", number] => number
            .parse()
            .map_or(Command::Unknown, |number| Command::Respond(Response::Number(number))),
        ["unlock"] => Command::Respond(Response::Unlocked),
        ["won" | "win"] => Command::Respond(Response::Won),
        ["fled" | "flee"] => Command::Respond(Response::Fled),
        ["tick"] => Command::EndTick,
        ["reset"] => Command::ResetGuard,
        ["hour", hour] => hour
            .parse()
            .ok()
            .filter(|h| *h < 24)
            .map_or(Command::Unknown, Command::SetHour),
        ["tiles"] => Command::Tiles,
        ["party"] => Command::Party,
        ["status" | "state"] => Command::Status,
        ["save"] => Command::Save(None),
        ["save", path] => Command::Save(Some((*path).to_string())),
        ["load"] => Command::Load(None),
        ["load", path] => Command::Load(Some((*path).to_string())),
        ["help" | "?"] => Command::Help,
        ["quit" | "exit"] => Command::Quit,
        _ => Command::Unknown,
    }
}

fn interact(interaction: Interaction, x: &str, y: &str) -> Command {
    match (x.parse(), y.parse()) {
        (Ok(x), Ok(y)) => Command::Interact { interaction, x, y },
        _ => Command::Unknown,
    }
}
