//! Terminal play
//!
//! Runs one game between any mix of human, engine and random opponents.
//! Humans type moves at the prompt; machine sides answer on their own.

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use chess_game::{
    Controller, DropOutcome, EngineError, GameController, GameObserver, MoveApplied,
    PlaySettings, MACHINE_REPLY_DELAY,
};
use chess_rules::{Side, UciMove};

fn print_usage() {
    println!("Chess Play");
    println!();
    println!("Usage:");
    println!("  chess_game [--config FILE] [--white WHO] [--black WHO]");
    println!("             [--engine PATH] [--address HOST:PORT] [--fen FEN]");
    println!();
    println!("Controllers:");
    println!("  human    - moves typed at the prompt, e.g. e2e4 or e7e8q");
    println!("  engine   - UCI engine from --engine or --address");
    println!("  random   - uniform choice among the legal moves");
    println!();
    println!("Prompt commands:");
    println!("  e2e4           - play a move");
    println!("  white random   - hand a side to another controller");
    println!("  time black 5   - set a side's think time in seconds");
    println!("  new            - restart from the starting position");
    println!("  quit           - leave");
}

fn parse_controller(word: &str) -> Controller {
    match word.parse() {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Warning: {}", e);
            eprintln!("Using human instead");
            Controller::Human
        }
    }
}

/// Prints every ply as it lands.
struct ConsolePrinter;

impl GameObserver for ConsolePrinter {
    fn move_applied(&mut self, update: &MoveApplied) {
        let mark = if update.checkmate {
            "#"
        } else if update.in_check {
            "+"
        } else {
            ""
        };
        println!("{} played {}{}", update.by.name(), update.mv, mark);
        println!("Position: {}", update.fen);
    }

    fn opponent_failed(&mut self, side: Side, error: &EngineError) {
        eprintln!("{}'s opponent gave up: {}", side.name(), error);
    }
}

enum Prompt {
    Handled,
    Quit,
}

fn handle_line(controller: &mut GameController, line: &str) -> Prompt {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => {}
        ["quit"] | ["exit"] => return Prompt::Quit,
        ["help"] => print_usage(),
        ["new"] => {
            controller.new_game();
            println!("Position: {}", controller.game().fen());
        }
        ["fen", rest @ ..] => {
            let fen = rest.join(" ");
            match controller.load_fen(&fen) {
                Ok(()) => println!("Position: {}", controller.game().fen()),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        [side_word @ ("white" | "black"), word] => {
            let side = if *side_word == "white" {
                Side::White
            } else {
                Side::Black
            };
            match word.parse::<Controller>() {
                Ok(controller_kind) => controller.set_controller(side, controller_kind),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        ["time", side_word @ ("white" | "black"), secs] => {
            let side = if *side_word == "white" {
                Side::White
            } else {
                Side::Black
            };
            match secs.parse::<u64>() {
                Ok(secs) => controller.set_think_time(side, secs),
                Err(_) => eprintln!("Error: think time must be a number of seconds"),
            }
        }
        [move_text] => match move_text.parse::<UciMove>() {
            Ok(mv) => {
                if controller.try_move(mv) == DropOutcome::Snapback {
                    println!("That move is not available, try again");
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        _ => {
            eprintln!("Unknown command: {}", line);
            println!("Type help for the command list");
        }
    }
    Prompt::Handled
}

async fn read_line(input: &mut Lines<BufReader<Stdin>>) -> Option<String> {
    print!("> ");
    let _ = std::io::stdout().flush();
    input.next_line().await.ok().flatten()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h" || a == "help") {
        print_usage();
        return;
    }

    let mut settings = PlaySettings::default();
    let mut start_fen: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    match PlaySettings::load(Path::new(&args[i + 1])) {
                        Ok(loaded) => settings = loaded,
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            return;
                        }
                    }
                    i += 1;
                }
            }
            "--white" | "-w" => {
                if i + 1 < args.len() {
                    settings.white.controller = parse_controller(&args[i + 1]);
                    i += 1;
                }
            }
            "--black" | "-b" => {
                if i + 1 < args.len() {
                    settings.black.controller = parse_controller(&args[i + 1]);
                    i += 1;
                }
            }
            "--engine" | "-e" => {
                if i + 1 < args.len() {
                    settings.engine.command = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--address" | "-a" => {
                if i + 1 < args.len() {
                    settings.engine.address = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--fen" => {
                if i + 1 < args.len() {
                    start_fen = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                return;
            }
        }
        i += 1;
    }

    if let Err(e) = settings.validate() {
        eprintln!("Error: {}", e);
        return;
    }

    let mut controller = GameController::new(settings);
    if let Some(fen) = start_fen {
        if let Err(e) = controller.load_fen(&fen) {
            eprintln!("Error: {}", e);
            return;
        }
    }
    controller.add_observer(Box::new(ConsolePrinter));

    println!("=== Chess Play ===");
    println!(
        "White: {}   Black: {}",
        controller.settings().white.controller,
        controller.settings().black.controller
    );
    println!("Position: {}", controller.game().fen());
    println!();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut machine_just_moved = false;

    loop {
        println!("{}", controller.status_line());

        if controller.machine_turn() {
            if machine_just_moved {
                tokio::time::sleep(MACHINE_REPLY_DELAY).await;
            }
            machine_just_moved = controller.advance().await;
            continue;
        }

        machine_just_moved = false;
        let Some(line) = read_line(&mut input).await else {
            break;
        };
        if let Prompt::Quit = handle_line(&mut controller, line.trim()) {
            break;
        }
    }
}
