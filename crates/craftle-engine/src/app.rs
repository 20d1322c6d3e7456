//! Terminal front end.
//!
//! A line-oriented loop that turns typed commands into session calls and
//! renders the grid, the crafting preview and the attempt counter.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use craftle_common::{ItemId, DEFAULT_NAMESPACE};
use craftle_gameplay::daily::PuzzleMode;
use craftle_gameplay::palette::IngredientPalette;
use craftle_gameplay::session::{CraftOutcome, PuzzleSession, SessionError};
use craftle_kernel::catalog::Catalog;
use craftle_kernel::crafting_grid::{GRID_CELLS, GRID_SIZE};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog_loader::CatalogLoader;
use crate::config::{CraftleConfig, CONFIG_FILE};

/// Craftle - guess the hidden crafting recipe
#[derive(Parser, Debug, Default)]
#[command(name = "craftle")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Play a random recipe instead of today's puzzle
    #[arg(short, long)]
    pub random: bool,

    /// Play the daily puzzle of another date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Directory holding recipes.json, tags.json and items.json
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl Args {
    /// Loads the configuration file and applies command-line overrides.
    #[must_use]
    pub fn resolve_config(&self) -> CraftleConfig {
        let mut config = match &self.config {
            Some(path) => CraftleConfig::load_from(path),
            None => CraftleConfig::load_from(CONFIG_FILE),
        };
        if self.random {
            config.mode = PuzzleMode::Random;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir.clone_from(dir);
        }
        config
    }

    /// The date the daily puzzle is drawn for.
    #[must_use]
    pub fn puzzle_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Errors produced while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Unrecognised command word.
    #[error("unknown command `{0}`, type `help` for a list")]
    Unknown(String),
    /// A required argument was not given.
    #[error("usage: {0}")]
    Usage(&'static str),
    /// Cell numbers run from 1 to 9.
    #[error("cells are numbered 1 to 9, got `{0}`")]
    BadCell(String),
}

/// A parsed front-end command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Place an item into a cell (0-based index).
    Put(usize, String),
    /// Empty a cell (0-based index).
    Take(usize),
    /// Empty the whole grid.
    Clear,
    /// Craft the previewed output.
    Craft,
    /// Show the grid and preview.
    Grid,
    /// List palette items, optionally filtered.
    Palette(Option<String>),
    /// Start a new puzzle.
    New(PuzzleMode),
    /// Show the command list.
    Help,
    /// Leave the game.
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };

        let command = match word.to_lowercase().as_str() {
            "put" | "p" => {
                let cell = parse_cell(words.next().ok_or(CommandError::Usage("put <cell> <item>"))?)?;
                let item = words.collect::<Vec<_>>().join(" ");
                if item.is_empty() {
                    return Err(CommandError::Usage("put <cell> <item>"));
                }
                Self::Put(cell, item)
            },
            "take" | "t" => {
                Self::Take(parse_cell(words.next().ok_or(CommandError::Usage("take <cell>"))?)?)
            },
            "clear" => Self::Clear,
            "craft" | "c" => Self::Craft,
            "grid" | "g" => Self::Grid,
            "palette" | "items" => {
                let filter = words.collect::<Vec<_>>().join(" ");
                Self::Palette((!filter.is_empty()).then_some(filter))
            },
            "new" => match words.next().map(str::to_lowercase).as_deref() {
                Some("daily") => Self::New(PuzzleMode::Daily),
                Some("random") => Self::New(PuzzleMode::Random),
                _ => return Err(CommandError::Usage("new daily|random")),
            },
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_cell(word: &str) -> Result<usize, CommandError> {
    match word.parse::<usize>() {
        Ok(n) if (1..=GRID_CELLS).contains(&n) => Ok(n - 1),
        _ => Err(CommandError::BadCell(word.to_string())),
    }
}

/// Whether the loop keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// Stop the loop.
    Quit,
}

const HELP: &str = "\
Commands:
  put <cell> <item>   place an item (cells 1-9, left to right, top to bottom)
  take <cell>         empty a cell
  clear               empty the grid
  craft               craft the current output (uses an attempt)
  grid                show the grid
  palette [filter]    list placeable items
  new daily|random    start another puzzle
  help                show this list
  quit                leave";

/// Front-end state: the loaded catalog and the running session.
pub struct App {
    config: CraftleConfig,
    catalog: Arc<Catalog>,
    palette: IngredientPalette,
    session: PuzzleSession,
    date: NaiveDate,
}

impl App {
    /// Creates the front end and starts a puzzle in the configured mode.
    pub fn new(config: CraftleConfig, catalog: Arc<Catalog>, date: NaiveDate) -> Result<Self> {
        let palette = IngredientPalette::from_catalog(&catalog, config.palette_includes_results);
        let session = Self::start_session(&config, &catalog, config.mode, date)?;
        Ok(Self {
            config,
            catalog,
            palette,
            session,
            date,
        })
    }

    fn start_session(
        config: &CraftleConfig,
        catalog: &Arc<Catalog>,
        mode: PuzzleMode,
        date: NaiveDate,
    ) -> Result<PuzzleSession> {
        let session = PuzzleSession::start(Arc::clone(catalog), mode, date)
            .context("Failed to start puzzle")?
            .with_max_attempts(config.max_attempts);
        info!("Started {:?} puzzle for {}", mode, date);
        Ok(session)
    }

    /// The running session.
    #[must_use]
    pub fn session(&self) -> &PuzzleSession {
        &self.session
    }

    /// Reads commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "Craftle: craft the hidden recipe in {} attempts. Type `help` for commands.",
            self.session.max_attempts()
        )?;
        self.write_grid(out)?;

        for line in input.lines() {
            let line = line?;
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                },
            };
            debug!("Command: {:?}", command);
            if self.execute(command, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Applies one command and writes its feedback.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        match command {
            Command::Put(cell, name) => match self.resolve_item(&name) {
                Some(item) => {
                    let result = self.session.set_cell(cell, Some(item));
                    self.report(result, out, true)?;
                },
                None => writeln!(out, "`{name}` is not in the palette")?,
            },
            Command::Take(cell) => {
                let result = self.session.set_cell(cell, None);
                self.report(result, out, true)?;
            },
            Command::Clear => {
                let result = self.session.clear_grid();
                self.report(result, out, true)?;
            },
            Command::Craft => self.craft(out)?,
            Command::Grid => self.write_grid(out)?,
            Command::Palette(filter) => self.write_palette(filter.as_deref(), out)?,
            Command::New(mode) => {
                self.session = Self::start_session(&self.config, &self.catalog, mode, self.date)?;
                writeln!(out, "New {} puzzle.", mode_name(mode))?;
                self.write_grid(out)?;
            },
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        // The terminal redraws from session state; events are not needed.
        self.session.take_events();
        Ok(Flow::Continue)
    }

    fn craft<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let outcome = match self.session.attempt_craft() {
            Ok(outcome) => outcome,
            Err(e) => return self.report(Err(e), out, false),
        };
        let names = self.catalog.items();
        let target = self.session.target().result_item();

        match outcome {
            CraftOutcome::NoMatch => writeln!(out, "The grid does not craft anything.")?,
            CraftOutcome::Continue { attempt, crafted } => writeln!(
                out,
                "Attempt {attempt}: crafted {}, not the target. {} attempts left.",
                names.display_name(&crafted),
                self.session.attempts_remaining()
            )?,
            CraftOutcome::Solved { attempts } => {
                writeln!(
                    out,
                    "Solved! {} crafted in {attempts} attempts.",
                    names.display_name(target)
                )?;
            },
            CraftOutcome::Exhausted { attempts } => {
                writeln!(
                    out,
                    "Out of attempts after {attempts} crafts. The target was {}.",
                    names.display_name(target)
                )?;
            },
        }
        Ok(())
    }

    fn report<W: Write>(
        &self,
        result: Result<(), SessionError>,
        out: &mut W,
        show_grid: bool,
    ) -> Result<()> {
        match result {
            Ok(()) if show_grid => self.write_grid(out)?,
            Ok(()) => {},
            Err(SessionError::InvalidState(state)) => writeln!(
                out,
                "This puzzle is {state:?}. Type `new daily` or `new random` to play again."
            )?,
            Err(e) => writeln!(out, "{e}")?,
        }
        Ok(())
    }

    /// Finds a palette item by full ID, bare name, or display name.
    fn resolve_item(&self, name: &str) -> Option<ItemId> {
        let exact = ItemId::new(name);
        if self.palette.contains(&exact) {
            return Some(exact);
        }
        let namespaced = ItemId::new(format!("{DEFAULT_NAMESPACE}:{name}"));
        if self.palette.contains(&namespaced) {
            return Some(namespaced);
        }
        let names = self.catalog.items();
        self.palette
            .items()
            .iter()
            .find(|item| {
                names
                    .get(item)
                    .is_some_and(|info| info.name.eq_ignore_ascii_case(name))
            })
            .cloned()
    }

    fn write_grid<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let names = self.catalog.items();
        let grid = self.session.grid();

        for row in 0..GRID_SIZE {
            let cells: Vec<String> = (0..GRID_SIZE)
                .map(|col| {
                    let index = row * GRID_SIZE + col;
                    let label = grid.get(index).map_or(".", |item| names.display_name(item));
                    format!("{} {:<18}", index + 1, label)
                })
                .collect();
            writeln!(out, " {}", cells.join("| "))?;
        }

        let preview = self
            .session
            .preview_output()
            .map_or("nothing", |item| names.display_name(item));
        writeln!(
            out,
            " => {preview}    attempts {}/{}",
            self.session.attempts(),
            self.session.max_attempts()
        )
    }

    fn write_palette<W: Write>(&self, filter: Option<&str>, out: &mut W) -> io::Result<()> {
        let names = self.catalog.items();
        let items: Vec<&ItemId> = match filter {
            Some(query) => self.palette.search(query, names),
            None => self.palette.items().iter().collect(),
        };
        if items.is_empty() {
            return writeln!(out, "No matching items.");
        }
        for item in items {
            writeln!(out, "  {:<32} {}", item.as_str(), names.display_name(item))?;
        }
        Ok(())
    }
}

fn mode_name(mode: PuzzleMode) -> &'static str {
    match mode {
        PuzzleMode::Daily => "daily",
        PuzzleMode::Random => "random",
    }
}

/// Loads the catalog named by `config` and plays on stdin/stdout.
pub fn run(args: &Args, config: CraftleConfig) -> Result<()> {
    let mut loader = CatalogLoader::from_config(&config);
    let catalog = loader
        .load()
        .with_context(|| format!("Failed to load catalog from {}", config.data_dir.display()))?;

    let mut app = App::new(config, Arc::new(catalog), args.puzzle_date())?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    app.run(stdin.lock(), &mut stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftle_common::RecipeId;
    use craftle_gameplay::session::SessionState;
    use craftle_kernel::catalog::{ItemCatalog, ItemInfo};
    use craftle_kernel::recipe::{IngredientSpec, Recipe, ShapedPattern};
    use craftle_kernel::tags::TagCatalog;

    fn catalog() -> Arc<Catalog> {
        let tags = TagCatalog::new().with_tag("planks", ["minecraft:oak_planks"]);
        let recipes = vec![Recipe::shaped(
            RecipeId::new(0),
            ShapedPattern::new(&["#", "#"]).with_key('#', IngredientSpec::tag("planks")),
            "minecraft:stick",
        )
        .with_count(4)];
        let items: ItemCatalog = [
            ("minecraft:oak_planks", "Oak Planks"),
            ("minecraft:stick", "Stick"),
        ]
        .into_iter()
        .map(|(id, name)| {
            (
                ItemId::new(id),
                ItemInfo {
                    name: name.to_string(),
                    icon: String::new(),
                },
            )
        })
        .collect();
        Arc::new(Catalog::new(recipes, tags, items))
    }

    fn app() -> App {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).expect("date");
        App::new(CraftleConfig::default(), catalog(), date).expect("app")
    }

    fn play(app: &mut App, script: &str) -> String {
        let mut out = Vec::new();
        app.run(script.as_bytes(), &mut out).expect("run");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("put 5 oak planks"),
            Ok(Some(Command::Put(4, "oak planks".to_string())))
        );
        assert_eq!(Command::parse("take 1"), Ok(Some(Command::Take(0))));
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(Command::parse("NEW random"), Ok(Some(Command::New(PuzzleMode::Random))));
        assert_eq!(Command::parse("palette"), Ok(Some(Command::Palette(None))));
        assert_eq!(
            Command::parse("palette log"),
            Ok(Some(Command::Palette(Some("log".to_string()))))
        );
        assert_eq!(Command::parse("q"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Command::parse("put 0 stick"),
            Err(CommandError::BadCell("0".to_string()))
        );
        assert_eq!(
            Command::parse("take ten"),
            Err(CommandError::BadCell("ten".to_string()))
        );
        assert!(matches!(Command::parse("put 3"), Err(CommandError::Usage(_))));
        assert!(matches!(Command::parse("new weekly"), Err(CommandError::Usage(_))));
        assert!(matches!(Command::parse("dance"), Err(CommandError::Unknown(_))));
    }

    #[test]
    fn test_resolve_item_forms() {
        let app = app();
        let planks = Some(ItemId::new("minecraft:oak_planks"));
        assert_eq!(app.resolve_item("minecraft:oak_planks"), planks);
        assert_eq!(app.resolve_item("oak_planks"), planks);
        assert_eq!(app.resolve_item("oak planks"), planks);
        assert_eq!(app.resolve_item("stick"), None);
    }

    #[test]
    fn test_play_to_solution() {
        let mut app = app();
        let output = play(&mut app, "put 2 oak_planks\nput 5 Oak Planks\ncraft\nquit\n");

        assert!(output.contains("=> Stick"));
        assert!(output.contains("Solved! Stick crafted in 1 attempts."));
        assert_eq!(app.session().state(), SessionState::Solved);
    }

    #[test]
    fn test_unnamed_target_revealed_only_at_end() {
        let mut recipes = catalog().recipes().to_vec();
        recipes.push(Recipe::shapeless(
            RecipeId::new(1),
            vec![
                IngredientSpec::item("minecraft:coal"),
                IngredientSpec::item("minecraft:stick"),
            ],
            "minecraft:torch",
        ));
        let catalog = Arc::new(Catalog::new(
            recipes,
            TagCatalog::new().with_tag("planks", ["minecraft:oak_planks"]),
            catalog().items().clone(),
        ));
        let mut app = app();
        app.session = PuzzleSession::new(Arc::clone(&catalog), RecipeId::new(1))
            .expect("session")
            .with_max_attempts(2);
        app.catalog = catalog;

        let output = play(&mut app, "put 1 oak_planks\nput 4 oak_planks\ncraft\n");
        assert!(output.contains("Attempt 1: crafted Stick, not the target. 1 attempts left."));
        assert!(!output.contains("minecraft:torch"));

        let output = play(&mut app, "craft\n");
        assert!(output.contains("The target was minecraft:torch."));
        assert_eq!(app.session().state(), SessionState::Exhausted);
    }

    #[test]
    fn test_finished_puzzle_rejects_moves() {
        let mut app = app();
        let output = play(&mut app, "put 1 oak_planks\nput 4 oak_planks\ncraft\ntake 1\n");
        assert!(output.contains("Type `new daily` or `new random`"));

        let output = play(&mut app, "new daily\ngrid\n");
        assert!(output.contains("New daily puzzle."));
        assert_eq!(app.session().state(), SessionState::InProgress);
        assert_eq!(app.session().attempts(), 0);
    }

    #[test]
    fn test_empty_craft_and_unknown_item() {
        let mut app = app();
        let output = play(&mut app, "craft\nput 1 diamond\nbogus\n");
        assert!(output.contains("The grid does not craft anything."));
        assert!(output.contains("`diamond` is not in the palette"));
        assert!(output.contains("unknown command `bogus`"));
        assert_eq!(app.session().attempts(), 0);
    }

    #[test]
    fn test_palette_listing() {
        let mut app = app();
        let output = play(&mut app, "palette\npalette zzz\n");
        assert!(output.contains("minecraft:oak_planks"));
        assert!(output.contains("No matching items."));
    }

    #[test]
    fn test_args_override_config() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/craftle.toml")),
            random: true,
            date: NaiveDate::from_ymd_opt(2026, 10, 17),
            data_dir: Some(PathBuf::from("data")),
        };
        let config = args.resolve_config();
        assert_eq!(config.mode, PuzzleMode::Random);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(args.puzzle_date(), NaiveDate::from_ymd_opt(2026, 10, 17).expect("date"));
    }
}
