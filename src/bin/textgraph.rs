//! textgraph CLI: text in, knowledge graph out.
//!
//! Usage:
//!   textgraph generate (--text TEXT | --file PATH) [--out DIR] [--config PATH]
//!   textgraph assemble DOCUMENTS.json [--out DIR] [--config PATH]
//!   textgraph repl [--config PATH]

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use textgraph::{
    decode_upload, CacheEntry, Config, ExportedTables, Generation, GraphAssembler,
    GraphDocument, HtmlRenderer, Pipeline, Renderer, SessionCache, SessionId, SessionRegistry,
    TableExporter,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "textgraph",
    version,
    about = "Extract a knowledge graph from text and export it as HTML and CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a graph from text and write knowledge_graph.html, points.csv and links.csv
    Generate {
        /// Text to extract from
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        /// UTF-8 .txt file to extract from
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Assemble graph documents from a JSON file without calling a model
    Assemble {
        /// JSON file holding one graph document or an array of them
        documents: PathBuf,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Interactive session: generate repeatedly, export from the cache
    Repl,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    Config::load(path).map_err(|e| e.to_string())
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("failed to create tokio runtime: {}", e))
}

fn read_text_file(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    decode_upload(&bytes).map_err(|e| format!("'{}': {}", path.display(), e))
}

fn write_outputs(entry: &CacheEntry, tables: &ExportedTables, out: &Path) -> Result<(), String> {
    let html = entry
        .artifact
        .write_to(out)
        .map_err(|e| format!("cannot write graph page: {}", e))?;
    let csv = tables
        .write_to(out)
        .map_err(|e| format!("cannot write tables: {}", e))?;
    println!(
        "Graph: {} nodes, {} edges",
        entry.graph.node_count(),
        entry.graph.edge_count()
    );
    for path in std::iter::once(html).chain(csv) {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Export the cache entry and write every output file.
fn save_cache(exporter: &TableExporter, cache: &SessionCache, out: &Path) -> Result<(), String> {
    let (entry, tables) = match (cache.current(), cache.export(exporter)) {
        (Some(entry), Ok(Some(tables))) => (entry, tables),
        (_, Err(e)) => return Err(format!("export failed: {}", e)),
        _ => return Err("nothing generated yet".to_string()),
    };
    write_outputs(&entry, &tables, out)
}

fn cmd_generate(config: &Config, text: Option<String>, file: Option<PathBuf>, out: &Path) -> i32 {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => match read_text_file(&path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        (None, None) => {
            eprintln!("Error: either --text or --file is required");
            return 2;
        }
    };
    let pipeline = match Pipeline::from_config(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut cache = SessionCache::new();
    if let Err(e) = rt.block_on(pipeline.generate_into(&mut cache, &text)) {
        eprintln!("Error: {}", e);
        return 1;
    }
    match save_cache(pipeline.exporter(), &cache, out) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_assemble(config: &Config, documents: &Path, out: &Path) -> i32 {
    let text = match std::fs::read_to_string(documents) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", documents.display(), e);
            return 1;
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: '{}' is not valid JSON: {}", documents.display(), e);
            return 1;
        }
    };
    let docs = match GraphDocument::many_from_value(&value) {
        Ok(docs) => docs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let assembler = GraphAssembler::with_policy(config.assembly.merge_policy);
    let graph = match assembler.assemble(&docs) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let artifact = HtmlRenderer::new(config.render.clone()).render(&graph);
    let mut cache = SessionCache::new();
    cache.store(Generation {
        documents: docs,
        graph,
        artifact,
    });
    match save_cache(&TableExporter::new(), &cache, out) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Generate(String),
    Load(PathBuf),
    Export(PathBuf),
    Status,
    NewSession,
    Switch(String),
    Sessions,
    Close,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

fn parse_repl_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if !line.starts_with(':') {
        return ReplCommand::Generate(line.to_string());
    }
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };
    match (cmd, arg) {
        (":gen", text) => ReplCommand::Generate(text.to_string()),
        (":load", path) if !path.is_empty() => ReplCommand::Load(PathBuf::from(path)),
        (":export", "") => ReplCommand::Export(PathBuf::from(".")),
        (":export", dir) => ReplCommand::Export(PathBuf::from(dir)),
        (":status", _) => ReplCommand::Status,
        (":new", _) => ReplCommand::NewSession,
        (":switch", id) if !id.is_empty() => ReplCommand::Switch(id.to_string()),
        (":sessions", _) => ReplCommand::Sessions,
        (":close", _) => ReplCommand::Close,
        (":help", _) => ReplCommand::Help,
        (":quit", _) | (":q", _) => ReplCommand::Quit,
        _ => ReplCommand::Unknown(line.to_string()),
    }
}

const REPL_HELP: &str = "\
  <text>            generate a graph from text (same as :gen <text>)
  :load <path>      generate from a UTF-8 .txt file
  :export [dir]     write knowledge_graph.html, points.csv, links.csv from the cache
  :status           show the current session's cached graph
  :new              open a new session and switch to it
  :switch <id>      switch to another session
  :sessions         list sessions
  :close            close the current session and open a fresh one
  :quit             exit";

struct Repl {
    pipeline: Pipeline,
    registry: SessionRegistry,
    current: SessionId,
    rt: tokio::runtime::Runtime,
}

impl Repl {
    fn generate(&self, text: &str) {
        match self.rt.block_on(self.pipeline.generate_graph(text)) {
            Ok(generation) => match self.registry.store(&self.current, generation) {
                Ok(entry) => println!(
                    "Generated graph #{}: {} nodes, {} edges",
                    entry.generation,
                    entry.graph.node_count(),
                    entry.graph.edge_count()
                ),
                Err(e) => eprintln!("Error: {}", e),
            },
            Err(e) => {
                eprintln!("Error: {}", e);
                if let Ok(Some(_)) = self.registry.current(&self.current) {
                    eprintln!("Previous graph kept.");
                }
            }
        }
    }

    fn export(&self, dir: &Path) {
        let entry = match self.registry.current(&self.current) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                println!("Nothing to export yet; generate a graph first.");
                return;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        };
        match self.registry.export(&self.current, self.pipeline.exporter()) {
            Ok(Some(tables)) => {
                if let Err(e) = write_outputs(&entry, &tables, dir) {
                    eprintln!("Error: {}", e);
                }
            }
            Ok(None) => println!("Nothing to export yet; generate a graph first."),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    fn status(&self) {
        match self.registry.current(&self.current) {
            Ok(Some(entry)) => println!(
                "Session {}: graph #{} ({} nodes, {} edges, {} documents) generated {}",
                self.current,
                entry.generation,
                entry.graph.node_count(),
                entry.graph.edge_count(),
                entry.documents.len(),
                entry.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Ok(None) => println!("Session {}: no graph yet", self.current),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    fn sessions(&self) {
        for id in self.registry.list() {
            let marker = if id == self.current { "*" } else { " " };
            let state = match self.registry.current(&id) {
                Ok(Some(entry)) => format!("graph #{}", entry.generation),
                _ => "empty".to_string(),
            };
            println!("{} {}  {}", marker, id, state);
        }
    }

    /// Returns false when the loop should end.
    fn handle(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Generate(text) => self.generate(&text),
            ReplCommand::Load(path) => match read_text_file(&path) {
                Ok(text) => self.generate(&text),
                Err(e) => eprintln!("Error: {}", e),
            },
            ReplCommand::Export(dir) => self.export(&dir),
            ReplCommand::Status => self.status(),
            ReplCommand::NewSession => {
                self.current = self.registry.open();
                println!("Switched to new session {}", self.current);
            }
            ReplCommand::Switch(id) => {
                let id = SessionId::from_string(id);
                if self.registry.contains(&id) {
                    println!("Switched to session {}", id);
                    self.current = id;
                } else {
                    eprintln!("Error: session '{}' not found", id);
                }
            }
            ReplCommand::Sessions => self.sessions(),
            ReplCommand::Close => {
                if let Err(e) = self.registry.close(&self.current) {
                    eprintln!("Error: {}", e);
                }
                self.current = self.registry.open();
                println!("Session closed; now in {}", self.current);
            }
            ReplCommand::Help => println!("{}", REPL_HELP),
            ReplCommand::Quit => return false,
            ReplCommand::Unknown(line) => eprintln!("Unknown command '{}'; try :help", line),
            ReplCommand::Empty => {}
        }
        true
    }
}

fn cmd_repl(config: &Config) -> i32 {
    let pipeline = match Pipeline::from_config(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let registry = SessionRegistry::new();
    let current = registry.open();
    let mut repl = Repl {
        pipeline,
        registry,
        current,
        rt,
    };

    println!("textgraph {} (session {}). Type :help for commands.", textgraph::VERSION, repl.current);
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        if std::io::stdout().flush().is_err() {
            return 1;
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error: {}", e);
                return 1;
            }
            None => return 0,
        };
        if !repl.handle(parse_repl_command(&line)) {
            return 0;
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let code = match cli.command {
        Commands::Generate { text, file, out } => cmd_generate(&config, text, file, &out),
        Commands::Assemble { documents, out } => cmd_assemble(&config, &documents, &out),
        Commands::Repl => cmd_repl(&config),
    };
    std::process::exit(code);
}
