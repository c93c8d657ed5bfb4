use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use quiz_warden::quality::relevance::RelevanceClassifier;
use quiz_warden::remediation::{remediate, Phase, RemediationOptions, Target};
use quiz_warden::selection::{load_session, save_session, select, SelectionParams, SelectionSession};
use quiz_warden::store::{load_corpus, save_corpus, Corpus, MemoryStore, RecordStore};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CleanupTarget {
    Invalid,
    Duplicates,
    All,
}

impl From<CleanupTarget> for Target {
    fn from(t: CleanupTarget) -> Self {
        match t {
            CleanupTarget::Invalid => Target::InvalidQuestions,
            CleanupTarget::Duplicates => Target::Duplicates,
            CleanupTarget::All => Target::All,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Audit the corpus and print the quality report (default)
    Audit,
    /// Delete or fix records failing the quality rules
    Cleanup {
        /// Which records to go after
        #[arg(long, value_enum, default_value = "all")]
        target: CleanupTarget,
        /// Scan and report, apply nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Select one quiz round for an entity
    Pick {
        /// Entity id the quiz is about
        #[arg(long)]
        entity: String,
        /// Questions to select
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Session state file (defaults to ~/.config/quiz-warden/session.json)
        #[arg(long)]
        session: Option<PathBuf>,
        /// Seed the shuffle for reproducible draws
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write a default config file
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "quiz-warden")]
#[command(about = "Quality gate and selection engine for country trivia corpora", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the corpus JSON file
    #[arg(long, global = true, default_value = "corpus.json")]
    corpus: PathBuf,

    /// Path to config file (defaults to ~/.config/quiz-warden/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn default_session_path() -> PathBuf {
    quiz_warden::config::get_config_dir().join("session.json")
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Audit);
    let start_time = Instant::now();

    let filter = if cli.verbose {
        EnvFilter::new("quiz_warden=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quiz_warden=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match quiz_warden::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Commands::Init = command {
        match quiz_warden::config::write_default_config(cli.config) {
            Ok(path) => {
                println!("Config written to {}", path.display());
                println!("Run `quiz-warden audit` to get started.");
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    let corpus = match load_corpus(&cli.corpus) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Corpus error: {}", e);
            std::process::exit(EXIT_DATA);
        }
    };

    if cli.verbose {
        eprintln!(
            "Loaded {} questions across {} entities from {}",
            corpus.questions.len(),
            corpus.entities.len(),
            cli.corpus.display()
        );
    }

    let classifier = RelevanceClassifier::new(&corpus.entities);
    let rules = config.validation.rules();
    let use_colors = quiz_warden::output::should_use_colors();

    match command {
        Commands::Audit => {
            let report =
                quiz_warden::quality::audit(&corpus.questions, &corpus.entities, &classifier, &rules);
            println!(
                "{}",
                quiz_warden::output::format_audit_report(&report, use_colors)
            );
            if cli.verbose {
                eprintln!("Audit finished in {:?}", start_time.elapsed());
            }
        }
        Commands::Cleanup { target, dry_run } => {
            let store = MemoryStore::seeded(corpus.questions.clone());
            let opts = RemediationOptions {
                batch_size: config.remediation.batch_size,
                batch_delay: Duration::from_millis(config.remediation.batch_delay_ms),
                dry_run,
            };
            let report = remediate(
                &store,
                &corpus.entities,
                &classifier,
                &rules,
                target.into(),
                &opts,
            )
            .await;

            println!(
                "{}",
                quiz_warden::output::format_remediation_report(&report, use_colors)
            );

            if report.phase == Phase::Failed {
                eprintln!("Cleanup failed before any batch was applied.");
                std::process::exit(EXIT_DATA);
            }

            if !dry_run {
                let cleaned = match store.query(&quiz_warden::store::Filter::all()).await {
                    Ok(qs) => qs,
                    Err(e) => {
                        eprintln!("Store error: {}", e);
                        std::process::exit(EXIT_DATA);
                    }
                };
                let updated = Corpus::new(corpus.entities.clone(), cleaned);
                if let Err(e) = save_corpus(&cli.corpus, &updated) {
                    eprintln!("Corpus error: {}", e);
                    std::process::exit(EXIT_DATA);
                }
                if cli.verbose {
                    eprintln!(
                        "Corpus rewritten with {} questions in {:?}",
                        updated.questions.len(),
                        start_time.elapsed()
                    );
                }
            }
        }
        Commands::Pick {
            entity,
            count,
            session,
            seed,
        } => {
            let entity = match corpus.entities.iter().find(|e| e.id == entity) {
                Some(e) => e.clone(),
                None => {
                    eprintln!("Unknown entity '{}' in corpus {}", entity, cli.corpus.display());
                    std::process::exit(EXIT_DATA);
                }
            };

            let session_path = session.unwrap_or_else(default_session_path);
            let mut session_state = match load_session(&session_path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Session error: {}", e);
                    std::process::exit(EXIT_DATA);
                }
            };
            // A freshly created session picks up the configured window.
            if session_state.used.is_empty() {
                session_state = SelectionSession::with_window(chrono::Duration::minutes(
                    config.selection.used_window_minutes,
                ));
            }

            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };

            let params = SelectionParams {
                entity: &entity,
                entities: &corpus.entities,
                classifier: &classifier,
                rules: &rules,
                count,
            };
            let picked = select(&corpus.questions, &params, &mut session_state, &mut rng);

            println!(
                "{}",
                quiz_warden::output::format_question_table(&picked, use_colors)
            );
            if picked.len() < count {
                eprintln!(
                    "Only {} distinct valid question(s) available for {} across all tiers.",
                    picked.len(),
                    entity.name
                );
            }

            if let Err(e) = save_session(&session_path, &session_state) {
                eprintln!("Session error: {}", e);
                std::process::exit(EXIT_DATA);
            }
        }
        Commands::Init => unreachable!("handled above"),
    }

    std::process::exit(EXIT_SUCCESS);
}
