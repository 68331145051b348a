use anyhow::{bail, Context, Result};
use cascade_config::{explain, LoadedConfig, Loader, Value};
use cascade_yaml::YamlParser;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load a layered YAML configuration file and explain merged values
#[derive(Parser, Debug)]
#[command(name = "explain-config")]
#[command(about = "Load layered YAML configuration files", long_about = None)]
struct Args {
    /// Root configuration file
    file: PathBuf,

    /// Global replacement variable, NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Key path to explain, e.g. database::host
    #[arg(long, value_name = "KEY")]
    explain: Option<String>,

    /// Fail when an @unset path does not exist
    #[arg(long)]
    strict_unset: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "explain_config=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut replacements = Vec::with_capacity(args.set.len());
    for pair in &args.set {
        match pair.split_once('=') {
            Some((name, value)) => replacements.push((name.to_string(), value.to_string())),
            None => bail!("--set expects NAME=VALUE, got '{}'", pair),
        }
    }

    let file = args
        .file
        .to_str()
        .with_context(|| format!("non-UTF-8 path: {}", args.file.display()))?;

    let config = Loader::new(YamlParser)
        .with_replacements(replacements)
        .with_debug(args.explain.is_some())
        .with_strict_unset(args.strict_unset)
        .load(file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    print_tree(&config.value, 0);

    if let Some(key) = &args.explain {
        println!();
        print_explanation(key, &config);
    }

    Ok(())
}

/// Render the merged tree as indented `key: value` lines.
fn print_tree(value: &Value, indent: usize) {
    match value {
        Value::Mapping(entries) => {
            for (key, nested) in entries {
                match nested {
                    Value::Scalar(_) => println!("{:indent$}{}: {}", "", key, nested),
                    _ => {
                        println!("{:indent$}{}:", "", key);
                        print_tree(nested, indent + 2);
                    }
                }
            }
        }
        Value::Sequence(items) => {
            for item in items {
                match item {
                    Value::Scalar(_) => println!("{:indent$}- {}", "", item),
                    _ => {
                        println!("{:indent$}-", "");
                        print_tree(item, indent + 2);
                    }
                }
            }
        }
        Value::Scalar(_) => println!("{:indent$}{}", "", value),
    }
}

fn print_explanation(key: &str, config: &LoadedConfig) {
    match explain(key, config) {
        Some(trace) => print!("{}", trace),
        None => println!("no provenance available for {}", key),
    }
}
