use clap::Parser;
use log::info;

use multiban::{Direction, LevelMap, OwnerId, PlayState, UndoQuota, step};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Walk(OwnerId, Vec<Direction>),
    Undo,
}

/// Parse a move script such as `A:RRD B:L u A:U`.
///
/// Each token is either `u` (undo one turn) or an owner letter, a colon and a
/// run of direction letters (`U`, `D`, `L`, `R`).
fn parse_script(script: &str) -> Result<Vec<Command>, String> {
    script
        .split_whitespace()
        .map(|token| {
            if token.eq_ignore_ascii_case("u") {
                return Ok(Command::Undo);
            }
            let (who, dirs) = token
                .split_once(':')
                .ok_or_else(|| format!("Invalid token '{}': expected OWNER:DIRS or u", token))?;
            let mut letters = who.chars();
            let owner = match (letters.next(), letters.next()) {
                (Some(ch), None) if ch.is_ascii_uppercase() => OwnerId::from_letter(ch),
                _ => None,
            }
            .ok_or_else(|| format!("Invalid player '{}' in token '{}'", who, token))?;
            let dirs = dirs
                .chars()
                .map(|ch| {
                    Direction::from_char(ch)
                        .ok_or_else(|| format!("Invalid direction '{}' in token '{}'", ch, token))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Walk(owner, dirs))
        })
        .collect()
}

fn describe_quota(quota: UndoQuota) -> String {
    match quota {
        UndoQuota::Unlimited => "unlimited".to_string(),
        UndoQuota::Remaining(n) => n.to_string(),
    }
}

fn run(game: &mut PlayState, commands: &[Command], quiet: bool) {
    for command in commands {
        match command {
            Command::Walk(owner, dirs) => {
                for &dir in dirs {
                    match step(game, *owner, dir) {
                        Ok(_) if !quiet => println!("{} {}:\n{}", owner, dir, game),
                        Ok(_) => {}
                        Err(e) => println!("{} {}: {}", owner, dir, e),
                    }
                }
            }
            Command::Undo => match game.undo() {
                Ok(true) if !quiet => println!("Undo:\n{}", game),
                Ok(true) => {}
                Ok(false) => println!("Undo: nothing to undo"),
                Err(e) => println!("Undo: {}", e),
            },
        }
    }
}

#[derive(Parser)]
#[command(name = "multiban")]
#[command(about = "A multi-player box-pushing puzzle", long_about = None)]
struct Args {
    /// Path to the level file
    #[arg(value_name = "FILE")]
    level_file: String,

    /// Move script, e.g. "A:RRD B:L u"
    #[arg(value_name = "MOVES")]
    moves: Option<String>,

    /// Only print the starting and final boards
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let level = match LevelMap::from_file(&args.level_file) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error loading level: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Loaded {}x{} level with {} players from {}",
        level.width(),
        level.height(),
        level.player_ids().len(),
        args.level_file
    );

    let commands = match parse_script(args.moves.as_deref().unwrap_or("")) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut game = PlayState::new(&level);
    println!("Starting position:\n{}", game);
    run(&mut game, &commands, args.quiet);

    println!("Final position:\n{}", game);
    println!(
        "solved: {}  turns: {}  undos left: {}",
        if game.is_win() { 'Y' } else { 'N' },
        game.history_len(),
        describe_quota(game.undo_quota())
    );
}
