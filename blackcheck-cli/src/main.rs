use blackcheck::config::{
    parse_bool, DEFAULT_FIXTURE_ROOT, DEFAULT_HOST, DEFAULT_TIMEOUT_SECS, DEFAULT_USER,
    DEFAULT_WINDOW_SIZE,
};
use blackcheck::decode::XmlOptions;
use blackcheck::fixtures::load_tree_file_with;
use blackcheck::scenario::catalog;
use blackcheck::{diff, HarnessConfig, IgnoreKeys, ScenarioRunner};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blackcheck", about = "Conformance checks for a BlackLab server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, env = "BLACKLAB_HOST", default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, env = "BLACKLAB_USER", default_value = DEFAULT_USER)]
    user: String,
    #[arg(long, env = "BLACKLAB_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,
    #[arg(long, env = "TEST_DATA_ROOT", default_value = DEFAULT_FIXTURE_ROOT)]
    fixtures: PathBuf,
    #[arg(long, env = "BLACKLAB_WINDOW_SIZE", default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: u32,
    #[arg(long, env = "BLACKLAB_WORDS_AROUND_HIT")]
    words_around_hit: Option<u32>,
    #[arg(long, env = "BLACKLAB_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Delete each scenario's index when it finishes
    #[arg(long, env = "BLACKLAB_CLEANUP", value_parser = parse_flag)]
    cleanup: bool,

    /// Run only the named scenario (repeatable)
    #[arg(long = "scenario", short = 's')]
    scenarios: Vec<String>,
    /// Run scenarios concurrently, each on its own index
    #[arg(long)]
    parallel: bool,
    /// Print reports as JSON instead of one line per scenario
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in scenarios
    List,
    /// Compare two saved responses (JSON or XML, chosen by file extension)
    Compare {
        expected: PathBuf,
        actual: PathBuf,
        /// Key to leave out of the comparison; dotted keys match a path from the root
        #[arg(long = "ignore", short = 'i')]
        ignore: Vec<String>,
        /// Decode XML attributes as `@name` keys and compare them too
        #[arg(long)]
        xml_attributes: bool,
    },
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    parse_bool(raw).ok_or_else(|| format!("expected true/false, 1/0, yes/no or on/off, got '{}'", raw))
}

impl Cli {
    fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            base_url: self.host.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
            window_size: self.window_size,
            words_around_hit: self.words_around_hit,
            fixture_root: self.fixtures.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            cleanup: self.cleanup,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_list() -> ExitCode {
    for scenario in catalog::builtin() {
        println!("{:<40} {}", scenario.name, scenario.description);
    }
    ExitCode::SUCCESS
}

fn run_compare(
    expected: &Path,
    actual: &Path,
    ignore: &[String],
    options: XmlOptions,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let expected_tree = load_tree_file_with(expected, options)?;
    let actual_tree = load_tree_file_with(actual, options)?;
    let ignore: IgnoreKeys = ignore.iter().cloned().collect();
    let subject = actual.display().to_string();

    match diff::compare(&subject, &expected_tree, &actual_tree, &ignore) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({"subject": subject, "equal": true}));
            } else {
                println!("MATCH {}", subject);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(mismatch) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "subject": subject,
                        "equal": false,
                        "differences": mismatch.differences,
                    }))?
                );
            } else {
                println!("{}", mismatch);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_scenarios(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = cli.harness_config();
    config.validate()?;
    let scenarios = catalog::select(cli.scenarios.as_slice())?;
    let runner = ScenarioRunner::new(config)?;

    let missing = runner.fixtures().missing();
    if !missing.is_empty() {
        tracing::warn!(
            root = %runner.fixtures().root().display(),
            "missing fixture files: {}",
            missing.join(", ")
        );
    }

    tracing::info!(
        host = %runner.config().base_url,
        scenarios = scenarios.len(),
        parallel = cli.parallel,
        "starting conformance run"
    );
    let reports = runner.run_all(&scenarios, cli.parallel).await;
    let failed = reports.iter().filter(|r| !r.passed()).count();

    if cli.json {
        let body: Vec<_> = reports.iter().map(|r| r.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        for report in &reports {
            println!("{}", report);
        }
        println!(
            "\n{} passed, {} failed",
            reports.len() - failed,
            failed
        );
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match &cli.command {
        Some(Command::List) => Ok(run_list()),
        Some(Command::Compare {
            expected,
            actual,
            ignore,
            xml_attributes,
        }) => {
            let options = XmlOptions {
                attributes: *xml_attributes,
            };
            run_compare(expected, actual, ignore, options, cli.json)
        }
        None => run_scenarios(&cli).await,
    }
}
