//! Line protocol standing in for a chat host.
//!
//! - `<group> <user> <message...>` posts a message in a group
//! - `#status <group>` shows the group's boss
//! - `#player <user>` shows a player's stats
//! - `#help`, `#quit`

use boss_core::{Dispatcher, GroupId, GroupMessage, Plugin, UserId};
use tokio::io::{self, AsyncBufReadExt, BufReader};

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Quit,
    Help,
    Status(GroupId),
    Player(UserId),
    Message(GroupMessage),
    Invalid(String),
}

fn parse_line(line: &str) -> Input {
    let trimmed = line.trim_start();
    if trimmed.trim_end().is_empty() {
        return Input::Empty;
    }

    if let Some(command) = trimmed.strip_prefix('#') {
        let parts: Vec<&str> = command.split_whitespace().collect();
        return match parts.as_slice() {
            ["quit"] | ["exit"] => Input::Quit,
            ["help"] => Input::Help,
            ["status", group] => Input::Status(GroupId::from(*group)),
            ["player", user] => Input::Player(UserId::from(*user)),
            _ => Input::Invalid(format!("unknown command: {}", trimmed.trim_end())),
        };
    }

    // Message text is forwarded verbatim after the two ids so that exact
    // command matching sees what the user typed.
    let Some((group, rest)) = split_word(trimmed) else {
        return Input::Invalid("expected: <group> <user> <message>".to_string());
    };
    match split_word(rest) {
        Some((user, content)) if !content.is_empty() => Input::Message(GroupMessage::new(group, user, content)),
        _ => Input::Invalid("expected: <group> <user> <message>".to_string()),
    }
}

/// First whitespace-delimited word and whatever follows the whitespace after it.
fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    let end = text.find(char::is_whitespace)?;
    Some((&text[..end], text[end..].trim_start()))
}

fn print_help(dispatcher: &Dispatcher) {
    let config = dispatcher.config();
    println!("Post messages as: <group> <user> <message>");
    println!("  e.g. lobby alice {}", config.summon_command);
    println!("       lobby bob {}", config.attack_command);
    println!();
    println!("Commands:");
    println!("  #status <group> - Show the group's boss");
    println!("  #player <user>  - Show a player's stats");
    println!("  #help           - Show this help");
    println!("  #quit           - Exit");
}

/// Feed stdin to the plugin until EOF or `#quit`.
pub async fn run(dispatcher: &Dispatcher) -> io::Result<()> {
    let info = dispatcher.info();
    println!("=== {} v{} ===", info.name, info.version);
    println!("{}", info.description);
    println!();
    print_help(dispatcher);
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Input::Empty => {}
            Input::Quit => {
                println!("Goodbye!");
                break;
            }
            Input::Help => print_help(dispatcher),
            Input::Status(group) => match dispatcher.boss(&group).await {
                Some(boss) => println!(
                    "[STATUS] {}: {} HP {}/{} ATK {} DEF {} ({})",
                    group, boss.name, boss.hp, boss.max_hp, boss.attack, boss.defense, boss.personality
                ),
                None => println!("[STATUS] {group}: no boss"),
            },
            Input::Player(user) => match dispatcher.player(&user).await {
                Some(p) => println!(
                    "[PLAYER] {}: HP {} ATK {} DEF {} EXP {} LV {}",
                    user, p.hp, p.attack, p.defense, p.exp, p.level
                ),
                None => println!("[PLAYER] {user}: has not fought yet"),
            },
            Input::Message(message) => {
                if let Some(reply) = dispatcher.on_group_message(&message).await {
                    println!("[{}] {}", message.group_id, reply.to_string().replace('\n', "\n    "));
                }
            }
            Input::Invalid(reason) => println!("[ERROR] {reason}"),
        }
    }
    Ok(())
}
