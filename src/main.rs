use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use treequill::config::Config;
use treequill::document::content::Content;
use treequill::document::node::Subtree;
use treequill::document::tree::Tree;
use treequill::editor::state::EditorState;
use treequill::file::loader::{load_tree_file, load_tree_from_stdin};
use treequill::file::saver::{save_tree_file, serialize_tree};
use treequill::input::Command;

/// TreeQuill - A structural editor for named content trees
#[derive(Parser)]
#[command(name = "treequill")]
#[command(version)]
#[command(about = "A structural editor for named content trees", long_about = None)]
struct Cli {
    /// Tree file to edit (omit to read from stdin if piped, or use a sample tree if interactive)
    file: Option<String>,

    /// Edit command to run, e.g. `cut Sales Team 1` (repeatable, runs after --script)
    #[arg(short = 'e', long = "exec", value_name = "CMD")]
    commands: Vec<String>,

    /// File with one edit command per line
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Draw the resulting tree
    #[arg(long)]
    draw: bool,

    /// Print a summary of the resulting tree
    #[arg(long)]
    summary: bool,

    /// Save the resulting tree here instead of printing it
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = Config::load();
    let tree = load_initial_tree(cli.file.as_deref(), &config)?;

    let mut state = EditorState::with_config(tree, &config);
    if let Some(file) = &cli.file {
        state.set_filename(file.clone());
    }

    let mut lines = Vec::new();
    if let Some(script) = &cli.script {
        let text = std::fs::read_to_string(script)
            .with_context(|| format!("Failed to read script {}", script.display()))?;
        lines.extend(text.lines().map(str::to_string));
    }
    lines.extend(cli.commands.iter().cloned());

    for (number, line) in lines.iter().enumerate() {
        let Some(command) = Command::parse(line)
            .with_context(|| format!("command {}: '{}'", number + 1, line))?
        else {
            continue;
        };
        let delta = command
            .run(&mut state)
            .with_context(|| format!("command {}: '{}'", number + 1, line))?;
        info!(line = %line, changes = delta.changes.len(), "applied");
    }
    debug!(
        clipboard = %state.clipboard_state(),
        undo_levels = state.history().undo_levels(),
        redo_levels = state.history().redo_levels(),
        "session finished"
    );

    let root = state.tree().root();
    if cli.draw {
        print!("{}", state.tree().draw(root, config.draw_key.as_deref())?);
    }
    if cli.summary {
        println!("{}", state.tree().summary(root, config.summary_width)?);
    }

    match &cli.output {
        Some(output) => {
            save_tree_file(output, state.tree(), &config)?;
            state.clear_dirty();
            info!(path = %output, "saved");
        }
        None if !cli.draw && !cli.summary => {
            println!("{}", serialize_tree(state.tree(), config.indent_size)?);
        }
        None => {}
    }

    Ok(())
}

/// Loads the file if it exists, starts an empty tree for a new file, reads
/// piped stdin, or falls back to a sample tree.
fn load_initial_tree(file: Option<&str>, config: &Config) -> Result<Tree> {
    match file {
        Some("-") => load_tree_from_stdin(),
        Some(path) if Path::new(path).exists() => load_tree_file(path),
        Some(path) => {
            info!(path, "new file, starting with an empty tree");
            Ok(Tree::new(config.root_name.clone(), Content::Null))
        }
        None if !io::stdin().is_terminal() => load_tree_from_stdin(),
        None => Ok(sample_tree()?),
    }
}

fn sample_tree() -> treequill::errors::TreeResult<Tree> {
    Tree::from_subtree(
        Subtree::new("Company", "Acme Corp")
            .with_child(
                Subtree::new("Engineering", "Tech Team")
                    .with_child(Subtree::new("Backend", "Server Development"))
                    .with_child(Subtree::new("Frontend", "UI Development")),
            )
            .with_child(
                Subtree::new("Sales", "Revenue")
                    .with_child(Subtree::new("Sales Team 1", "North"))
                    .with_child(Subtree::new("Sales Team 2", "South")),
            )
            .with_child(Subtree::new("Marketing", "Growth Team")),
    )
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
