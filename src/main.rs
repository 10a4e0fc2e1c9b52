//! sakura CLI: behavioral inference engine for a wellness companion.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use sakura_cycle::config::SakuraConfig;
use sakura_cycle::cycle;
use sakura_cycle::engine::InferenceEngine;
use sakura_cycle::insight::Insights;
use sakura_cycle::paths::SakuraPaths;
use sakura_cycle::predict::{self, PredictionRequest};
use sakura_cycle::signal::{Signal, SignalKind, SignalPayload};

#[derive(Parser)]
#[command(name = "sakura", version, about = "Behavioral inference engine for a wellness companion")]
struct Cli {
    /// Data directory for persistent storage.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to the config file (default: $XDG_CONFIG_HOME/sakura-cycle/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a behavioral signal.
    Log {
        /// Signal kind (e.g. TASK_COMPLETE, chat-message, game_played).
        kind: String,

        /// Message text for CHAT_MESSAGE.
        #[arg(long)]
        text: Option<String>,

        /// Game identifier for GAME_PLAYED.
        #[arg(long)]
        game: Option<String>,
    },

    /// Show mood and energy insights.
    Insights,

    /// Reset mood and energy to baseline.
    Reset,

    /// Enable inference and background decay.
    Enable,

    /// Disable inference; the state is frozen until re-enabled.
    Disable,

    /// Show raw state, enabled flag and labels as JSON.
    Status,

    /// Show the current cycle phase and predictions.
    Phase {
        /// First day of the last period (overrides the config file).
        #[arg(long)]
        last_period: Option<NaiveDate>,

        /// Current symptom (repeatable), e.g. --symptom cramps --symptom fatigue.
        #[arg(long = "symptom")]
        symptoms: Vec<String>,
    },

    /// Apply one decay step toward baseline.
    Decay,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = SakuraPaths::resolve()?;
    let config_file = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let config = SakuraConfig::load_or_default(&config_file)?;

    if let Commands::Phase {
        last_period,
        symptoms,
    } = cli.command
    {
        return show_phase(&config, last_period, symptoms);
    }

    let mut engine_config = config.to_engine_config(Some(paths.data_dir.clone()));
    if let Some(dir) = cli.data_dir {
        engine_config.data_dir = Some(dir);
    }
    // One-shot commands never leave a timer behind.
    engine_config.auto_start = false;
    let engine = InferenceEngine::new(engine_config)?;

    match cli.command {
        Commands::Log { kind, text, game } => {
            let kind = parse_kind(&kind);
            if let SignalKind::Unrecognized(ref name) = kind {
                println!("Unrecognized signal kind \"{name}\"; state unchanged.");
            }
            let payload = SignalPayload { text, game_id: game };
            engine.log_signal(Signal::with_payload(kind, payload));
            if !engine.is_enabled() {
                println!("Inference is disabled; signal ignored.");
            }
            print_insights(&engine.insights());
        }

        Commands::Insights => print_insights(&engine.insights()),

        Commands::Reset => {
            engine.reset();
            println!("State reset to baseline.");
            print_insights(&engine.insights());
        }

        Commands::Enable => {
            engine.set_enabled(true);
            println!("Inference enabled.");
        }

        Commands::Disable => {
            engine.set_enabled(false);
            println!("Inference disabled.");
        }

        Commands::Status => {
            let state = engine.state();
            let status = serde_json::json!({
                "enabled": engine.is_enabled(),
                "state": state,
                "insights": Insights::from(&state),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&status).into_diagnostic()?
            );
        }

        Commands::Decay => {
            engine.decay_tick();
            print_insights(&engine.insights());
        }

        Commands::Phase { .. } => unreachable!("handled before the engine is opened"),
    }

    engine.dispose();
    Ok(())
}

/// Accept `task-complete` or `task_complete` on the command line; the library
/// only knows the exact wire names.
fn parse_kind(arg: &str) -> SignalKind {
    let wire = arg.trim().to_ascii_uppercase().replace('-', "_");
    match SignalKind::from(wire) {
        SignalKind::Unrecognized(_) => SignalKind::Unrecognized(arg.to_string()),
        kind => kind,
    }
}

fn print_insights(insights: &Insights) {
    println!(
        "Mood:   {:<8} ({:.1})",
        insights.mood.label.to_string(),
        insights.mood.value
    );
    println!(
        "Energy: {:<8} ({:.1})",
        insights.energy.label.to_string(),
        insights.energy.value
    );
}

fn show_phase(
    config: &SakuraConfig,
    last_period: Option<NaiveDate>,
    symptoms: Vec<String>,
) -> Result<()> {
    let cycle_config = &config.cycle;
    let phase = if cycle_config.menopausal {
        println!("Cycle day: -");
        cycle::Phase::PostMenopause
    } else {
        let Some(start) = last_period.or(cycle_config.last_period_start) else {
            miette::bail!(
                help = "Pass --last-period YYYY-MM-DD or set `cycle.last_period_start` in the config file.",
                "no last period start date configured"
            );
        };
        let today = chrono::Local::now().date_naive();
        let day = cycle::calculate_cycle_day(start, today, cycle_config.cycle_length, false)?;
        println!("Cycle day: {day} of {}", cycle_config.cycle_length);
        cycle::calculate_phase(day, cycle_config.period_duration, false)
    };

    println!("Phase:     {} ({})", phase.display_name(), phase.description());

    let mut request = PredictionRequest::new(phase).with_symptoms(symptoms);
    if let Some(age) = cycle_config.age {
        request.age = age;
    }
    let predictor = predict::from_config(&config.prediction);
    let prediction = predictor.predict(&request)?;
    println!("Mood:      {}", prediction.mood);
    println!("Energy:    {}/10", prediction.energy);
    println!(
        "Focus:     {}/10",
        cycle::predict_focus(phase, &request.symptoms)
    );
    Ok(())
}
