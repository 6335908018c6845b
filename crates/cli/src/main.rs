//! CLI tool for building product proposal decks from a spreadsheet catalog.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use deck_assets::{load_table_file, HttpFetcher, PdfiumRasterizer, SheetClient};
use deck_core::{Catalog, DeckConfig, RawTable, RowNormalizer, Session, SortOrder};
use deck_pptx::{DeckAssembler, DeckReader};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Build PowerPoint product proposals from a product spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "proposal-deck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Deck configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the products in the catalog
    Catalog {
        #[command(flatten)]
        source: SourceArgs,

        /// Listing order: sheet, name, code or category
        #[arg(long, default_value = "sheet")]
        sort: String,

        /// Only show products matching this text
        #[arg(long)]
        search: Option<String>,

        /// Print normalized records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or update the saved contact and project settings
    Settings {
        /// Session file (created if missing)
        #[arg(short, long)]
        session: PathBuf,

        #[command(flatten)]
        overrides: SessionOverrides,
    },

    /// Build a proposal deck from selected products
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Product codes (or names) to include, in order
        #[arg(long, num_args = 1..)]
        select: Vec<String>,

        /// Include every product in the catalog
        #[arg(long, conflicts_with = "select")]
        all: bool,

        /// Session file with contact and project details
        #[arg(short, long)]
        session: Option<PathBuf>,

        #[command(flatten)]
        overrides: SessionOverrides,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the slides of a generated deck
    Inspect {
        /// Deck file (.pptx)
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where the product table comes from.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Sheet data saved as JSON (`{"values": [...]}` or a bare array)
    #[arg(long, conflicts_with = "sheet_url")]
    table: Option<PathBuf>,

    /// Sheet endpoint URL (default: the configured endpoint)
    #[arg(long)]
    sheet_url: Option<String>,

    /// Sheet range (default: the configured range)
    #[arg(long)]
    range: Option<String>,
}

/// Values that replace what the session file holds.
#[derive(Args, Debug, Default)]
struct SessionOverrides {
    /// Contact name
    #[arg(long)]
    name: Option<String>,

    /// Contact email
    #[arg(long)]
    email: Option<String>,

    /// Contact phone
    #[arg(long)]
    phone: Option<String>,

    /// Contact job title
    #[arg(long)]
    title: Option<String>,

    /// Contact company
    #[arg(long)]
    company: Option<String>,

    /// Project name (also names the output file)
    #[arg(long)]
    project: Option<String>,

    /// Client name
    #[arg(long)]
    client: Option<String>,

    /// Presentation date
    #[arg(long)]
    date: Option<String>,
}

impl SessionOverrides {
    fn apply(&self, session: &mut Session) {
        set_field(&mut session.contact.name, &self.name);
        set_field(&mut session.contact.email, &self.email);
        set_field(&mut session.contact.phone, &self.phone);
        set_field(&mut session.contact.title, &self.title);
        set_field(&mut session.contact.company, &self.company);
        set_field(&mut session.project.project_name, &self.project);
        set_field(&mut session.project.client_name, &self.client);
        set_field(&mut session.project.presentation_date, &self.date);
    }
}

fn set_field(field: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *field = value.trim().to_string();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = match cli.config {
        Some(ref path) => {
            log::debug!("Loading config from {}", path.display());
            DeckConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => DeckConfig::default(),
    };

    match cli.command {
        Command::Catalog {
            source,
            sort,
            search,
            json,
        } => run_catalog(&config, &source, &sort, search.as_deref(), json),
        Command::Settings { session, overrides } => run_settings(&session, &overrides),
        Command::Build {
            source,
            select,
            all,
            session,
            overrides,
            output,
        } => run_build(
            config,
            &source,
            &select,
            all,
            session.as_deref(),
            &overrides,
            output.as_deref(),
        ),
        Command::Inspect { file, json } => run_inspect(&file, json),
    }
}

/// Fetch or read the raw table. A failure here stops the command.
fn load_table(config: &DeckConfig, source: &SourceArgs) -> Result<RawTable> {
    if let Some(ref path) = source.table {
        return load_table_file(path)
            .with_context(|| format!("Failed to read sheet data from {}", path.display()));
    }

    let fetcher = HttpFetcher::new(config)?;
    let endpoint = source
        .sheet_url
        .clone()
        .unwrap_or_else(|| config.sheet_endpoint.clone());
    let range = source.range.as_deref().unwrap_or(&config.sheet_range);

    SheetClient::new(&fetcher, endpoint.as_str())
        .fetch_table(range)
        .with_context(|| format!("Failed to load products from {}", endpoint))
}

fn load_catalog(config: &DeckConfig, source: &SourceArgs) -> Result<Catalog> {
    let table = load_table(config, source)?;
    let normalizer = RowNormalizer::new().with_proxy(config.proxy.clone());
    Ok(Catalog::from_table(&table, &normalizer))
}

fn run_catalog(
    config: &DeckConfig,
    source: &SourceArgs,
    sort: &str,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let order = SortOrder::from_name(sort)
        .ok_or_else(|| anyhow::anyhow!("Unknown sort order '{}'", sort))?;
    let catalog = load_catalog(config, source)?;

    let mut products = catalog.sorted(order);
    if let Some(query) = search {
        let hits = catalog.search(query);
        products.retain(|p| hits.iter().any(|hit| std::ptr::eq(*hit, *p)));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&products)?);
        return Ok(());
    }

    for product in &products {
        println!(
            "{:<14} {:<40} {:<18} {} bullets{}{}",
            product.code,
            product.display_name(),
            deck_core::deck::category_label(&product.category),
            product.specs_bullets.len(),
            if product.image_url.is_some() { ", image" } else { "" },
            if product.pdf_url.is_some() { ", spec sheet" } else { "" },
        );
    }
    eprintln!(
        "{} of {} products, categories: {}",
        products.len(),
        catalog.len(),
        catalog.categories().join(", ")
    );

    Ok(())
}

fn run_settings(path: &Path, overrides: &SessionOverrides) -> Result<()> {
    let mut session = Session::load(path)
        .with_context(|| format!("Failed to read session {}", path.display()))?;
    overrides.apply(&mut session);
    session
        .save(path)
        .with_context(|| format!("Failed to write session {}", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

fn run_build(
    config: DeckConfig,
    source: &SourceArgs,
    select: &[String],
    all: bool,
    session_path: Option<&Path>,
    overrides: &SessionOverrides,
    output: Option<&Path>,
) -> Result<()> {
    // Checked before any network work.
    if select.is_empty() && !all {
        return Err(deck_core::Error::NoProductsSelected.into());
    }

    let catalog = load_catalog(&config, source)?;
    let products = if all {
        catalog.products().to_vec()
    } else {
        let (products, missing) = catalog.select(select);
        for key in &missing {
            eprintln!("Warning: no product matches '{}'", key);
        }
        products
    };
    log::debug!("Selected {} of {} products", products.len(), catalog.len());

    let mut session = match session_path {
        Some(path) => Session::load(path)
            .with_context(|| format!("Failed to read session {}", path.display()))?,
        None => Session::default(),
    };
    overrides.apply(&mut session);
    let form = session.export_form();

    let fetcher = HttpFetcher::new(&config)?;
    let rasterizer = PdfiumRasterizer::new();
    let deck = DeckAssembler::new(&fetcher, &rasterizer)
        .with_config(config)
        .assemble(&products, &form)?;

    let output_path = get_output_path(output, &deck.file_name)?;
    write_output(&output_path, &deck.bytes)?;

    for warning in &deck.warnings {
        eprintln!("Skipped: {}", warning);
    }
    println!(
        "Written {} ({} slides, {} products)",
        output_path.display(),
        deck.kinds.len(),
        products.len()
    );

    Ok(())
}

fn run_inspect(path: &Path, json: bool) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let deck = DeckReader::new()
        .read(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to read deck {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&deck)?);
        return Ok(());
    }

    for slide in &deck.slides {
        let kind = slide.kind.map(|k| k.as_str()).unwrap_or("unknown");
        let headline = slide
            .texts
            .first()
            .and_then(|t| t.lines().next())
            .unwrap_or("");
        println!(
            "{:>3}  {:<11} pictures={} links={}  {}",
            slide.number, kind, slide.pictures, slide.hyperlinks, headline
        );
    }

    Ok(())
}

/// Determine the output path for a built deck.
fn get_output_path(output_dir: Option<&Path>, file_name: &str) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(file_name)
        }
        None => PathBuf::from(file_name),
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_arguments() {
        let cli = Cli::parse_from([
            "proposal-deck",
            "build",
            "--table",
            "sheet.json",
            "--select",
            "A1",
            "B2",
            "--project",
            "Lobby",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Build {
                select, overrides, ..
            } => {
                assert_eq!(select, vec!["A1", "B2"]);
                assert_eq!(overrides.project.as_deref(), Some("Lobby"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_table_and_sheet_url_conflict() {
        let result = Cli::try_parse_from([
            "proposal-deck",
            "catalog",
            "--table",
            "a.json",
            "--sheet-url",
            "https://deck.example.com/sheet-data",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_trim_and_replace() {
        let mut session = Session::default();
        session.contact.email = "old@acme.test".to_string();
        let overrides = SessionOverrides {
            name: Some("  Sam Lee ".to_string()),
            project: Some("Lobby".to_string()),
            ..Default::default()
        };
        overrides.apply(&mut session);

        assert_eq!(session.contact.name, "Sam Lee");
        assert_eq!(session.contact.email, "old@acme.test");
        assert_eq!(session.project.project_name, "Lobby");
    }

    #[test]
    fn test_build_without_selection_fails_before_loading() {
        let source = SourceArgs {
            table: Some(PathBuf::from("/nonexistent/sheet.json")),
            sheet_url: None,
            range: None,
        };
        let err = run_build(
            DeckConfig::default(),
            &source,
            &[],
            false,
            None,
            &SessionOverrides::default(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("No products selected"));
    }
}
