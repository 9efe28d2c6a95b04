use cadence_cli::commands;
use cadence_cli::readline;
use cadence_cli::CliContext;
use cadence_cli::logging;
use clap::{Parser, Subcommand};

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();

    let ctx = CliContext::new().map_err(|e| e.to_string())?;
    println!("cadence - guided exercise sessions. Type `help` for commands.");

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                println!("{err}");
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "guided exercise session runner", no_binary_name = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog programs
    Programs,
    /// List catalog exercises
    Exercises,
    /// List recorded sessions
    Sessions {
        #[arg(short, long)]
        program: Option<String>,
    },
    /// Bind a program and start running it
    Run {
        #[arg(short, long)]
        id: String,
    },
    /// Start the bound program again (after completion)
    Start,
    Pause,
    Resume,
    /// Skip the current step, crediting its full duration
    Skip,
    /// Go back one step (restarts step one at the beginning)
    Previous,
    /// Restart the current step
    Restart,
    /// Speak the current instruction again
    Replay,
    /// Show the state of the active run
    Status,
    /// Shut the active run down
    Stop,
    /// Set music volume (0..1)
    Volume {
        #[arg(short, long)]
        level: f32,
    },
    Mute,
    Unmute,
    /// Toggle spoken step instructions
    Narration {
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Seek within the music track
    Seek {
        #[arg(short, long)]
        seconds: u64,
    },
    /// Play every cue and a sample narration
    SoundTest,
    /// Write the whole catalog to a JSON file
    Export {
        #[arg(short, long)]
        path: String,
    },
    /// Replace catalog collections from a JSON file
    Import {
        #[arg(short, long)]
        path: String,
    },
    /// Install the starter catalog
    Seed,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Programs) => commands::show_programs(ctx).await,
        Some(Commands::Exercises) => commands::show_exercises(ctx).await,
        Some(Commands::Sessions { program }) => {
            commands::show_sessions(ctx, program.as_deref()).await
        }
        Some(Commands::Run { id }) => commands::run_program(ctx, id).await,
        Some(Commands::Start) => commands::start(ctx).await,
        Some(Commands::Pause) => commands::pause(ctx).await,
        Some(Commands::Resume) => commands::resume(ctx).await,
        Some(Commands::Skip) => commands::skip(ctx).await,
        Some(Commands::Previous) => commands::previous(ctx).await,
        Some(Commands::Restart) => commands::restart(ctx).await,
        Some(Commands::Replay) => commands::replay(ctx).await,
        Some(Commands::Status) => commands::status(ctx).await,
        Some(Commands::Stop) => commands::stop_run(ctx).await,
        Some(Commands::Volume { level }) => commands::set_volume(ctx, *level).await,
        Some(Commands::Mute) => commands::set_muted(ctx, true).await,
        Some(Commands::Unmute) => commands::set_muted(ctx, false).await,
        Some(Commands::Narration { enabled }) => commands::set_narration(ctx, *enabled).await,
        Some(Commands::Seek { seconds }) => commands::seek(ctx, *seconds).await,
        Some(Commands::SoundTest) => commands::sound_test(ctx).await,
        Some(Commands::Export { path }) => commands::export_catalog(ctx, path).await,
        Some(Commands::Import { path }) => commands::import_catalog(ctx, path).await,
        Some(Commands::Seed) => commands::seed(ctx).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }

    Ok(false)
}
