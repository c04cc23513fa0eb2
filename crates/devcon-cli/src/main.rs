mod settings;
mod ui;

use std::env;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use devcon_core::logging::ConsoleFeed;
use devcon_core::logging::DiagnosticLayer;
use devcon_core::logging::DiagnosticMessage;
use devcon_core::logging::LogRotator;
use devcon_core::logging::LogStatus;
use devcon_core::CommandRegistry;
use devcon_core::Config;
use devcon_core::Environment;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

const LOG_FILTER_ENV: &str = "DEVCON_LOG";

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum CliCommand {
    Help,
    Version,
    Console,
    Exec(Vec<String>),
    Commands,
}

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    config: Option<PathBuf>,
    command: CliCommand,
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let invocation = parse_args(env::args().skip(1).collect())?;

    match invocation.command {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Version => {
            println!("devcon {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliCommand::Commands => {
            let registry = CommandRegistry::initialize(devcon_commands::builtin())?;
            for info in registry.commands() {
                println!(
                    "{:<12} {} argument(s)  {}",
                    info.name, info.expected_arguments, info.description
                );
            }
            Ok(())
        }
        CliCommand::Exec(lines) => {
            let session = Session::start(invocation.config, Surface::Stderr)?;
            exec_lines(&session.registry, &lines)
        }
        CliCommand::Console => {
            let mut session = Session::start(invocation.config, Surface::Console)?;
            let feed = session
                .feed
                .take()
                .ok_or("console feed was not created")?;
            let status = session.status_line();
            ui::run(
                &session.registry,
                feed,
                status,
                session.config.console.scrollback,
            )
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<Invocation, Box<dyn std::error::Error>> {
    let mut config = None;
    let mut command = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--config requires a path".into());
                };
                config = Some(PathBuf::from(value));
                i += 2;
            }
            "--help" | "-h" | "help" => {
                return Ok(Invocation {
                    config,
                    command: CliCommand::Help,
                })
            }
            "--version" | "-V" | "version" => {
                return Ok(Invocation {
                    config,
                    command: CliCommand::Version,
                })
            }
            "commands" => {
                command = Some(CliCommand::Commands);
                i += 1;
            }
            "console" => {
                command = Some(CliCommand::Console);
                i += 1;
            }
            "exec" => {
                let lines = args[i + 1..].to_vec();
                if lines.is_empty() {
                    return Err("exec requires at least one command line".into());
                }
                command = Some(CliCommand::Exec(lines));
                break;
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
    }
    Ok(Invocation {
        config,
        command: command.unwrap_or(CliCommand::Console),
    })
}

/// Where diagnostics are shown besides the log file.
enum Surface {
    Stderr,
    Console,
}

/// Everything set up at process start, in order: configuration, environment,
/// log rotation, the diagnostic subscriber, then the command registry.
struct Session {
    config: Config,
    environment: Environment,
    rotator: LogRotator,
    registry: CommandRegistry,
    feed: Option<Receiver<DiagnosticMessage>>,
}

impl Session {
    fn start(
        config_path: Option<PathBuf>,
        surface: Surface,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = settings::load(config_path.as_deref())?;
        let environment = Environment::resolve();
        let rotator = LogRotator::new(config.logging.clone());
        rotator.initialize(environment);

        let (console_feed, feed) = match surface {
            Surface::Console => {
                let (sender, receiver) = ConsoleFeed::channel();
                (Some(sender), Some(receiver))
            }
            Surface::Stderr => (None, None),
        };
        let stderr_filter = feed.is_none().then(|| {
            EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
        });
        diagnostics_subscriber(
            stderr_filter,
            DiagnosticLayer::new()
                .with_optional_sink(rotator.open_sink())
                .with_optional_sink(console_feed),
        )
        .try_init()?;

        report_log_status(environment, rotator.status());

        let registry = CommandRegistry::initialize(devcon_commands::builtin())?;
        info!("{} commands registered", registry.commands().count());

        Ok(Self {
            config,
            environment,
            rotator,
            registry,
            feed,
        })
    }

    fn status_line(&self) -> String {
        let log = match self.rotator.status() {
            Some(LogStatus::Active(path)) => path.display().to_string(),
            Some(status) => status.label().to_string(),
            None => "uninitialized".to_string(),
        };
        format!("env: {}  log: {}", self.environment, log)
    }
}

/// Every event reaches the diagnostic sinks. `stderr_filter` only decides what
/// is echoed to stderr; `None` turns the stderr echo off.
fn diagnostics_subscriber(
    stderr_filter: Option<EnvFilter>,
    diagnostics: DiagnosticLayer,
) -> impl Subscriber + Send + Sync {
    let stderr_layer = stderr_filter.map(|filter| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(filter)
    });
    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(diagnostics)
}

fn report_log_status(environment: Environment, status: Option<&LogStatus>) {
    match status {
        Some(LogStatus::Active(path)) => {
            info!("environment {environment}; logging to {}", path.display());
        }
        Some(LogStatus::Failed(err)) => warn!("logging disabled: {err}"),
        Some(LogStatus::Disabled) | None => {
            info!("environment {environment}; log files disabled");
        }
    }
}

/// Dispatches each line in order. A failing command is reported and the
/// remaining lines still run.
fn exec_lines(
    registry: &CommandRegistry,
    lines: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut failures = 0_usize;
    for line in lines {
        if let Err(err) = registry.dispatch_line(line) {
            error!("{line}: {err}");
            failures += 1;
        }
    }
    if failures > 0 {
        return Err(format!("{failures} command(s) failed").into());
    }
    Ok(())
}

fn print_help() {
    println!("devcon {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  devcon [--config PATH] [console]");
    println!("  devcon [--config PATH] exec LINE...");
    println!("  devcon commands");
    println!("  devcon --help");
    println!("  devcon --version");
    println!();
    println!("Set {LOG_FILTER_ENV} to change the diagnostic filter (default: info).");
}
