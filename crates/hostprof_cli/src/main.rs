use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use hostprof_config::{
    ConfigEntry, ConfigSource, ConfigTable, ConfigValue, EnvSource, FileSource, Layered, Memoizer,
    SettingDef, SettingId,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "hostprof", version, about)]
struct Cli {
    /// YAML file consulted for settings missing from the environment.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every setting with its memoized value.
    Show {
        /// Also print where each value came from.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print one setting, by getter name or environment key.
    Get { name: String },
    /// Validate the config file without printing settings.
    Check,
    /// Print the build identifiers the host checks on load.
    BuildId,
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::Registry::default()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
    subscriber.try_init()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing() {
        eprintln!("failed to initialize logging: {e}");
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        Command::Show { verbose } => {
            let source = build_source(cli.config.as_ref())?;
            let table = memoize(&source)?;
            for (def, entry) in table.snapshot() {
                println!("{}", render_row(def, &entry, verbose.then(|| origin(&source, def))));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Get { name } => {
            let Some(id) = SettingId::lookup(&name) else {
                eprintln!("unknown setting: {name}");
                return Ok(ExitCode::FAILURE);
            };
            let source = build_source(cli.config.as_ref())?;
            let table = memoize(&source)?;
            let entry = table.get(id).context("setting missing from table")?;
            println!("{}", entry.value);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            let Some(path) = cli.config else {
                eprintln!("no config file given. try `hostprof --config <path> check`");
                return Ok(ExitCode::FAILURE);
            };
            let file = FileSource::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            println!("{}: {} setting(s) ok", path.display(), file.len());
            Ok(ExitCode::SUCCESS)
        }
        Command::BuildId => {
            println!("extension: {}", hostprof_ext::extension_build_id());
            println!("module:    {}", hostprof_ext::module_build_id());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_source(config: Option<&PathBuf>) -> anyhow::Result<Layered> {
    let mut source = Layered::new().with(EnvSource);
    if let Some(path) = config {
        let file = FileSource::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        tracing::debug!("loaded {} setting(s) from {}", file.len(), path.display());
        source = source.with(file);
    }
    Ok(source)
}

fn memoize(source: &Layered) -> anyhow::Result<ConfigTable> {
    let table = ConfigTable::new();
    Memoizer::new(&table, source)
        .initialize()
        .context("failed to memoize configuration")?;
    Ok(table)
}

fn origin<'s>(source: &'s Layered, def: &SettingDef) -> &'s str {
    source.origin(def.env, def.kind()).unwrap_or("default")
}

fn render_row(def: &SettingDef, entry: &ConfigEntry<ConfigValue>, origin: Option<&str>) -> String {
    let value = match entry.get() {
        Some(value) => value.to_string(),
        None => "<unset>".to_string(),
    };
    match origin {
        Some(origin) => format!("{:<48} {:<44} {value} ({origin})", def.getter, def.env),
        None => format!("{:<44} {value}", def.env),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use hostprof_config::MapSource;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rows_show_value_and_origin() {
        let def = SettingId::TraceAgentPort.def();
        let entry = ConfigEntry::set(ConfigValue::Int(9126));
        let row = render_row(def, &entry, Some("file"));
        assert!(row.starts_with("get_dd_trace_agent_port"));
        assert!(row.ends_with("9126 (file)"));

        let row = render_row(def, &ConfigEntry::unset(ConfigValue::Int(0)), None);
        assert!(row.starts_with("DD_TRACE_AGENT_PORT"));
        assert!(row.ends_with("<unset>"));
    }

    #[test]
    fn file_layer_sits_below_environment() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hostprof.yaml");
        std::fs::write(&path, "DD_PROFILING_LOG_LEVEL: debug\n")?;

        let source = Layered::new()
            .with(MapSource::from_pairs("env", [("DD_SERVICE", "cli")]))
            .with(FileSource::load(&path)?);
        let table = memoize(&source)?;
        assert_eq!(table.string(SettingId::ProfilingLogLevel).as_deref(), Some("debug"));
        assert_eq!(origin(&source, SettingId::ProfilingLogLevel.def()), "file");
        assert_eq!(origin(&source, SettingId::Service.def()), "env");
        assert_eq!(origin(&source, SettingId::AgentHost.def()), "default");
        Ok(())
    }

    #[test]
    fn unparsable_env_value_is_not_reported_as_origin() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hostprof.yaml");
        std::fs::write(&path, "DD_TRACE_AGENT_PORT: 9126
")?;

        let source = Layered::new()
            .with(MapSource::from_pairs("env", [("DD_TRACE_AGENT_PORT", "not-a-port")]))
            .with(FileSource::load(&path)?);
        let table = memoize(&source)?;
        assert_eq!(table.int(SettingId::TraceAgentPort), Some(9126));
        assert_eq!(origin(&source, SettingId::TraceAgentPort.def()), "file");
        Ok(())
    }
}
