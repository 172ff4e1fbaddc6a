//! Main CLI application

use crate::cli::{init_logging, OutputFormat, Verbosity};
use crate::config::{
    build_registry, parse_config_auto, parse_config_file, validate_config, Config,
    YamlConfigStore,
};
use crate::error::Result;
use crate::runner::{ShellExecutor, TaskInvoker};
use crate::task::{option_name, ArgumentSet, InputSpec, TaskDefinition, TaskName, TaskRegistry, Value};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Id of the trailing positional values on every task subcommand
const POSITIONAL_ARG: &str = "strata-positional";

/// Global argument ids; inputs sharing one of these are not exposed as options
const RESERVED_ARGS: [&str; 11] = [
    "file", "config", "set", "env", "verbose", "quiet", "silent", "output", "help", "version",
    POSITIONAL_ARG,
];

/// CLI application
pub struct App {
    command: Command,
    config: Config,
    config_path: PathBuf,
    registry: TaskRegistry,
    command_path: String,
}

impl App {
    /// Create a new app from the discovered task file
    pub fn new() -> Result<Self> {
        let (config, config_path) = parse_config_auto()?;
        Self::from_config(config, config_path)
    }

    /// Create app with a specific task file
    pub fn with_config_file(path: PathBuf) -> Result<Self> {
        let config = parse_config_file(&path)?;
        Self::from_config(config, path)
    }

    fn from_config(config: Config, config_path: PathBuf) -> Result<Self> {
        validate_config(&config)?;
        let registry = build_registry(&config)?;
        let command = build_command(&config, &registry);

        Ok(App {
            command,
            config,
            config_path,
            registry,
            command_path: "strata".to_string(),
        })
    }

    /// Path the program was invoked as, bound to `${cmd}`
    pub fn with_command_path(mut self, command_path: impl Into<String>) -> Self {
        self.command_path = command_path.into();
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Run the application with command line arguments
    pub fn run(self) -> Result<()> {
        let matches = self.command.clone().get_matches();

        let format = matches
            .get_one::<String>("output")
            .and_then(|name| OutputFormat::from_name(name))
            .unwrap_or(OutputFormat::Text);
        init_logging(get_verbosity(&matches), format);

        if let Some(output) = self.execute(&matches)? {
            println!("{}", output);
        }
        Ok(())
    }

    /// Run the task selected by `matches`, returning its output
    ///
    /// Returns `None` after printing help when no task was given.
    pub fn execute(&self, matches: &ArgMatches) -> Result<Option<String>> {
        let (segments, task_matches) = selected_task(matches);
        if segments.is_empty() {
            self.command.clone().print_help()?;
            println!();
            return Ok(None);
        }

        let name = TaskName::from_segments(segments)?;
        let definition = self.registry.find(&name)?;
        let environment = matches.get_one::<String>("env").cloned().unwrap_or_default();
        let mut explicit = explicit_arguments(definition, task_matches);
        if !environment.is_empty() && definition.inputs.iter().any(|i| i.name == "env") {
            explicit.insert("env", Value::from(environment.as_str()));
        }
        let positional: Vec<String> = task_matches
            .get_many::<String>(POSITIONAL_ARG)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let store = config_store(matches)?;
        let executor = self.executor();
        debug!(task = %name, file = %self.config_path.display(), "running task");

        let invoker = TaskInvoker::new(&self.registry, &store, &executor)
            .with_environment(environment)
            .with_command_path(self.command_path.clone());
        invoker
            .run_task(&name, &positional, &explicit, None)
            .map(Some)
    }

    fn executor(&self) -> ShellExecutor {
        let mut executor = ShellExecutor::new();
        if let Some(dir) = self.config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            executor = executor.with_working_dir(dir.to_path_buf());
        }
        if let Some(interpreter) = &self.config.interpreter {
            executor = executor.with_interpreter(interpreter.clone());
        }
        executor
    }
}

/// Build the clap command from the task file
fn build_command(config: &Config, registry: &TaskRegistry) -> Command {
    let mut cmd = Command::new(config.name.clone().unwrap_or_else(|| "strata".to_string()))
        .version(crate::VERSION)
        .about(config.usage.clone().unwrap_or_else(|| {
            "A declarative task runner with layered task inputs".to_string()
        }))
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to strata.yml task file")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("YAML file with input values")
                .global(true),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override a config value (repeatable)")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("env")
                .short('e')
                .long("env")
                .value_name("ENV")
                .help("Environment name, available to tasks as ${env}")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print task output, warnings and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print task output and errors only")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FORMAT")
                .help("Log format")
                .value_parser(OutputFormat::NAMES)
                .default_value("text")
                .global(true),
        );

    for task in registry.children(None) {
        cmd = cmd.subcommand(task_command(registry, task));
    }

    cmd
}

/// Subcommand for one task, with its children nested under it
fn task_command(registry: &TaskRegistry, task: &TaskDefinition) -> Command {
    let mut cmd = Command::new(task.name.short_name().to_string())
        .about(task.usage.clone().unwrap_or_default())
        .hide(task.private);

    if let Some(desc) = &task.description {
        cmd = cmd.long_about(desc.clone());
    }

    for input in task.inputs.iter().filter(|i| exposed_as_option(i)) {
        let help = input
            .description
            .clone()
            .unwrap_or_else(|| format!("Input: {}", input.name));
        cmd = cmd.arg(
            Arg::new(input.name.clone())
                .long(option_name(&input.name))
                .value_name(input.short_name().to_uppercase())
                .help(help),
        );
    }

    cmd = cmd.arg(
        Arg::new(POSITIONAL_ARG)
            .value_name("ARGS")
            .help("Positional input values")
            .num_args(0..),
    );

    for child in registry.children(Some(&task.name)) {
        cmd = cmd.subcommand(task_command(registry, child));
    }

    cmd
}

/// Subcommand names down to the deepest one given, with that one's matches
fn selected_task(matches: &ArgMatches) -> (Vec<String>, &ArgMatches) {
    let mut segments = Vec::new();
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        segments.push(name.to_string());
        current = sub;
    }
    (segments, current)
}

/// Options given on the command line for the task's declared inputs
fn explicit_arguments(task: &TaskDefinition, matches: &ArgMatches) -> ArgumentSet {
    task.inputs
        .iter()
        .filter(|input| exposed_as_option(input))
        .filter_map(|input| {
            matches
                .get_one::<String>(&input.name)
                .map(|value| (input.name.clone(), Value::from(value.as_str())))
        })
        .collect()
}

fn exposed_as_option(input: &InputSpec) -> bool {
    !RESERVED_ARGS.contains(&input.name.as_str())
}

/// Config values from `--config` layered under `--set` overrides
fn config_store(matches: &ArgMatches) -> Result<YamlConfigStore> {
    let mut store = match matches.get_one::<String>("config") {
        Some(path) => YamlConfigStore::load(Path::new(path))?,
        None => YamlConfigStore::new(),
    };

    if let Some(assignments) = matches.get_many::<String>("set") {
        for assignment in assignments {
            store = store.with_override(assignment)?;
        }
    }

    Ok(store)
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Run the CLI application with process arguments
pub fn run() -> Result<()> {
    // The command is built from the task file, so --file is read before clap
    let args: Vec<String> = std::env::args().collect();

    let app = match extract_file_arg(&args) {
        Some(path) => App::with_config_file(path)?,
        None => App::new()?,
    };

    match args.first() {
        Some(program) => app.with_command_path(program.as_str()).run(),
        None => app.run(),
    }
}

/// Extract --file argument before clap parsing
fn extract_file_arg(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--file" || arg == "-f" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--file=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}
