use std::fmt;
use std::io::Write as _;
use std::sync::Arc;

use literacy_core::model::{LevelId, LevelState, SessionSnapshot, SessionStatus};
use services::game::messages;
use services::{
    AppServices, Clock, GameCommand, GameHandle, NarrationQueue, SpeechError, SpeechSynthesizer,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play   [--db <sqlite_url>] [--mute] [--verbose]");
    eprintln!("  cargo run -p app -- levels [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- reset  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://literacy.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LITERACY_DB_URL, LITERACY_AI_API_KEY, LITERACY_AI_BASE_URL, LITERACY_AI_MODEL");
    eprintln!("  RUST_LOG (log filter, written to stderr)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Levels,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "levels" => Some(Self::Levels),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    voice: bool,
    verbose: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("LITERACY_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://literacy.sqlite3".into(), normalize_sqlite_url);
        let mut voice = true;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--mute" => voice = false,
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            voice,
            verbose,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

/// Terminal stand-in for a text-to-speech engine.
struct ConsoleVoice;

impl SpeechSynthesizer for ConsoleVoice {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "  🔊 {text}").map_err(|err| SpeechError::Failed(err.to_string()))
    }

    // Lines already printed cannot be taken back.
    fn stop(&self) {}
}

async fn print_levels(services: &AppServices) {
    let catalog = services.catalog();
    let progress = services.progress().current().await;

    println!();
    println!(
        "{} de {} níveis desbloqueados",
        catalog.unlocked_count(progress),
        catalog.count()
    );
    for entry in catalog.overview(progress) {
        let marker = match entry.state {
            LevelState::Completed => "✓",
            LevelState::Current => "▶",
            LevelState::Locked => "🔒",
        };
        println!(
            "  {marker} {:>2}. {} - {}",
            entry.level.id(),
            entry.level.title(),
            entry.level.description()
        );
    }
}

fn render(snapshot: &SessionSnapshot) {
    println!();
    println!(
        "{} · {} · Atividade {} de {}",
        snapshot.level.subtitle(),
        snapshot.level.title(),
        snapshot.question_index,
        snapshot.questions_per_level
    );
    if let Some(question) = &snapshot.question {
        println!("{}", question.text());
        for (i, option) in question.options().iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }
    }
    if !snapshot.feedback.is_empty() {
        println!("{}", snapshot.feedback);
    }
}

fn prompt(text: &str) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "{text}")?;
    out.flush()
}

/// Map a line typed during a level to a game command. `None` means the input
/// did nothing and the screen should just be redrawn.
fn play_input(line: &str, snapshot: &SessionSnapshot) -> Option<GameCommand> {
    match line {
        "q" | "Q" => Some(GameCommand::EndSession),
        "r" | "R" => Some(GameCommand::RepeatQuestion),
        "" if snapshot.can_advance() => Some(GameCommand::AdvanceQuestion),
        "" if snapshot.is_level_complete() => Some(GameCommand::EndSession),
        "" => None,
        _ if !snapshot.status.accepts_answers() => None,
        _ => {
            let question = snapshot.question.as_ref()?;
            let option = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| question.options().get(i))
                .map_or_else(|| line.to_string(), Clone::clone);
            Some(GameCommand::SubmitAnswer(option))
        }
    }
}

fn play_prompt(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Correct => "Enter para continuar (q sai): ",
        SessionStatus::LevelComplete => "Enter para voltar aos níveis: ",
        _ => "Resposta (1-3, r repete, q sai): ",
    }
}

/// Wait until the engine has applied the last command and any question it
/// asked for is on screen.
async fn settle(
    snapshots: &mut watch::Receiver<Option<SessionSnapshot>>,
) -> Result<Option<SessionSnapshot>, watch::error::RecvError> {
    snapshots.changed().await?;
    let snapshot = snapshots
        .wait_for(|s| {
            s.as_ref()
                .is_none_or(|s| s.status != SessionStatus::Loading)
        })
        .await?
        .clone();
    Ok(snapshot)
}

async fn play(services: &AppServices, voice: bool) -> Result<(), Box<dyn std::error::Error>> {
    let narration = if voice {
        NarrationQueue::new(Arc::new(ConsoleVoice))
    } else {
        NarrationQueue::silent()
    };
    let (handle, task) = GameHandle::spawn(services.game_engine(narration));
    let mut snapshots = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let current = snapshots.borrow_and_update().clone();

        let Some(snapshot) = current else {
            print_levels(services).await;
            prompt("Escolha um nível (q para sair): ")?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                break;
            }
            let level = line
                .parse::<LevelId>()
                .ok()
                .filter(|id| services.catalog().level_by_id(*id).is_some());
            let Some(level) = level else {
                println!("Nível inválido: {line}");
                continue;
            };

            handle.start_level(level).await?;
            if settle(&mut snapshots).await?.is_none() && !voice {
                println!("{}", messages::LOCKED);
            }
            continue;
        };

        render(&snapshot);
        prompt(play_prompt(snapshot.status))?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = play_input(line.trim(), &snapshot) else {
            continue;
        };
        handle.send(command).await?;
        settle(&mut snapshots).await?;
    }

    drop(handle);
    task.await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    init_tracing(parsed.verbose);

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default()).await?;
    info!(db = %parsed.db_url, ?cmd, "storage ready");

    match cmd {
        Command::Play => play(&services, parsed.voice).await,
        Command::Levels => {
            print_levels(&services).await;
            Ok(())
        }
        Command::Reset => {
            services.progress().reset().await?;
            println!("{}", messages::PROGRESS_RESET);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
