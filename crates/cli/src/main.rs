//! svgb - command-line front end for the SVG builder.
//!
//! Creates, inspects and edits SVG files through the same editor core the
//! interactive tools use, and moves documents in and out of a folder store.

mod logger;

use anyhow::{bail, Context, Result};
use canvas::{Action, ActionResult, Editor, EditorConfig, NullRenderer};
use clap::{Parser, Subcommand};
use interchange::{from_markup, to_markup, Parsed};
use logger::StderrLogger;
use node::{Color, Document, DocumentId, Element, Point};
use project::{DocumentStore, FolderStore};
use std::fs;
use std::path::{Path, PathBuf};

/// svgb - build and edit SVG documents
#[derive(Parser)]
#[command(name = "svgb")]
#[command(about = "Command-line interface for the SVG builder")]
struct Cli {
    /// Editor config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an empty document
    New {
        /// Output file
        output: PathBuf,
        #[arg(long, default_value = Document::DEFAULT_NAME)]
        name: String,
        #[arg(long, default_value_t = Document::DEFAULT_WIDTH)]
        width: f64,
        #[arg(long, default_value_t = Document::DEFAULT_HEIGHT)]
        height: f64,
        /// Background color, e.g. "#ffffff"
        #[arg(long)]
        background: Option<String>,
    },

    /// Print a document's size and element tree
    Inspect {
        file: PathBuf,
        /// Print the document as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Apply a JSON action (or array of actions) to a document
    Apply {
        file: PathBuf,
        /// JSON file with the actions
        actions: PathBuf,
        /// Where to write the result (default: overwrite FILE)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the elements under a point, topmost first
    Hit {
        file: PathBuf,
        x: f64,
        y: f64,
        /// Report every element under the point, not just the topmost
        #[arg(long)]
        all: bool,
    },

    /// Work with a folder of stored documents
    Store {
        /// Store directory
        #[arg(long)]
        dir: PathBuf,

        #[command(subcommand)]
        command: StoreCommands,
    },
}

#[derive(Subcommand)]
enum StoreCommands {
    /// Store an SVG file
    Save {
        file: PathBuf,
        /// Replace the stored document with this id
        #[arg(long)]
        id: Option<String>,
    },

    /// Write a stored document as SVG
    Load {
        id: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored documents, newest first
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    StderrLogger::init(StderrLogger::level_for(cli.verbose, cli.quiet))?;

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Commands::New {
            output,
            name,
            width,
            height,
            background,
        } => new_document(&output, name, width, height, background.as_deref()),
        Commands::Inspect { file, json } => inspect(&file, json),
        Commands::Apply { file, actions, output } => apply(&file, &actions, output.as_deref(), config),
        Commands::Hit { file, x, y, all } => hit(&file, Point::new(x, y), all, config),
        Commands::Store { dir, command } => {
            let store = FolderStore::new(dir);
            match command {
                StoreCommands::Save { file, id } => store_save(&store, &file, id.as_deref(), config),
                StoreCommands::Load { id, output } => store_load(&store, &id, output.as_deref(), config),
                StoreCommands::List => store_list(&store),
            }
        }
    }
}

fn read_document(path: &Path) -> Result<Document> {
    let markup = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let Parsed { document, warnings } =
        from_markup(&markup).with_context(|| format!("Failed to parse {}", path.display()))?;
    for warning in &warnings {
        log::warn!("{}:{}", path.display(), warning);
    }
    Ok(document)
}

fn write_document(path: &Path, document: &Document) -> Result<()> {
    let markup = to_markup(document)?;
    fs::write(path, markup).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn parse_id(id: &str) -> Result<DocumentId> {
    DocumentId::parse(id).with_context(|| format!("`{id}` is not a document id"))
}

fn new_document(output: &Path, name: String, width: f64, height: f64, background: Option<&str>) -> Result<()> {
    let background = match background {
        Some(value) => Color::parse(value).with_context(|| format!("Invalid background `{value}`"))?,
        None => Document::DEFAULT_BACKGROUND,
    };
    let document = Document::new(name, width, height, background)?;
    write_document(output, &document)?;
    println!("{}", output.display());
    Ok(())
}

fn inspect(file: &Path, json: bool) -> Result<()> {
    let document = read_document(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!(
        "{} ({} x {}, background {})",
        document.name,
        document.width,
        document.height,
        document.background.to_hex()
    );
    for element in &document.elements {
        print_tree(element, 1);
    }
    println!("{} element(s)", document.element_count());
    Ok(())
}

fn print_tree(element: &Element, depth: usize) {
    let bounds = element
        .local_bounds()
        .map(|b| format!(" [{}, {}] - [{}, {}]", b.min.x, b.min.y, b.max.x, b.max.y))
        .unwrap_or_default();
    println!("{}{} <{}>{}", "  ".repeat(depth), element.id, element.tag(), bounds);
    for child in &element.children {
        print_tree(child, depth + 1);
    }
}

/// Reads either a single action or an array of them.
fn read_actions(path: &Path) -> Result<Vec<Action>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let actions = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|action| vec![action])
    };
    actions.with_context(|| format!("Invalid action in {}", path.display()))
}

fn apply(file: &Path, actions: &Path, output: Option<&Path>, config: EditorConfig) -> Result<()> {
    let document = read_document(file)?;
    let actions = read_actions(actions)?;
    let mut editor = Editor::open(document, config, NullRenderer)?;

    let mut failed = 0;
    for action in actions {
        let result = editor.apply_action(action);
        if matches!(result, ActionResult::Error { .. }) {
            failed += 1;
        }
        println!("{}", serde_json::to_string(&result)?);
    }

    write_document(output.unwrap_or(file), &editor.document())?;
    if failed > 0 {
        bail!("{failed} action(s) failed");
    }
    Ok(())
}

fn hit(file: &Path, point: Point, all: bool, config: EditorConfig) -> Result<()> {
    let editor = Editor::open(read_document(file)?, config, NullRenderer)?;
    let hits = if all {
        editor.hit_test_all(point)
    } else {
        editor.hit_test(point).into_iter().collect()
    };
    for id in hits {
        println!("{id}");
    }
    Ok(())
}

fn store_save(store: &FolderStore, file: &Path, id: Option<&str>, config: EditorConfig) -> Result<()> {
    let mut document = read_document(file)?;
    if let Some(id) = id {
        document.id = parse_id(id)?;
    }
    let mut editor = Editor::open(document, config, NullRenderer)?;
    let job = editor.begin_save()?;
    let record = editor.finish_save(smol::block_on(job.run(store)))?;
    println!("{}", record.id);
    Ok(())
}

fn store_load(store: &FolderStore, id: &str, output: Option<&Path>, config: EditorConfig) -> Result<()> {
    let mut editor = Editor::new(config);
    let job = editor.begin_load(parse_id(id)?)?;
    for warning in editor.finish_load(smol::block_on(job.run(store)))? {
        log::warn!("{id}:{warning}");
    }

    let document = editor.document();
    match output {
        Some(path) => write_document(path, &document)?,
        None => print!("{}", to_markup(&document)?),
    }
    Ok(())
}

fn store_list(store: &FolderStore) -> Result<()> {
    let records = smol::block_on(store.list()).context("Failed to list documents")?;
    if records.is_empty() {
        println!("No documents in {}", store.root().display());
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {}  {} x {}  {}",
            record.id,
            record.modified_at.format("%Y-%m-%d %H:%M"),
            record.width,
            record.height,
            record.name
        );
    }
    Ok(())
}
