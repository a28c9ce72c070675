//! REPL state and command dispatch
//!
//! Reads one command per line, runs it against the PokeAPI client and the
//! session's pokedex, and writes the results. Command failures are reported
//! and the loop keeps going; only `exit` or end of input stops it.

use std::io::{self, Write};

use crossterm::style::Stylize;
use futures::future::join_all;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::data::PokeApiClient;
use crate::pokedex::{self, Pokedex};

/// Prompt shown before each command
pub const PROMPT: &str = "Pokedex > ";

/// A parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    /// Next page of location areas
    Map,
    /// Previous page of location areas
    MapBack,
    Explore(Vec<String>),
    Catch(Option<String>),
    Inspect(Option<String>),
    Pokedex,
    /// Response cache statistics
    Cache,
}

impl Command {
    /// Usage and description of every command, in help order
    pub fn usage() -> &'static [(&'static str, &'static str)] {
        &[
            ("help", "Displays a help message"),
            ("exit", "Exit the Pokedex"),
            ("map", "Get the next page of locations"),
            ("mapb", "Get the previous page of locations"),
            ("explore <area_name>...", "Explore one or more locations"),
            ("catch <pokemon_name>", "Attempt to catch a pokemon"),
            ("inspect <pokemon_name>", "View details about a caught Pokemon"),
            ("pokedex", "View the list of caught Pokemons"),
            ("cache", "Show response cache statistics"),
        ]
    }

    /// Parses cleaned input words into a command
    ///
    /// Returns `None` for empty input or an unknown command name.
    pub fn parse(words: &[String]) -> Option<Command> {
        let (name, args) = words.split_first()?;
        let first_arg = args.first().cloned();

        let command = match name.as_str() {
            "help" => Command::Help,
            "exit" => Command::Exit,
            "map" => Command::Map,
            "mapb" => Command::MapBack,
            "explore" => Command::Explore(args.to_vec()),
            "catch" => Command::Catch(first_arg),
            "inspect" => Command::Inspect(first_arg),
            "pokedex" => Command::Pokedex,
            "cache" => Command::Cache,
            _ => return None,
        };
        Some(command)
    }
}

/// Lowercases, trims and splits a line of input on whitespace
pub fn clean_input(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// REPL session state
pub struct App {
    client: PokeApiClient,
    /// URL of the next location-area page, if known
    next_page: Option<String>,
    /// URL of the previous location-area page, if any
    previous_page: Option<String>,
    /// Pokemon caught this session
    pub pokedex: Pokedex,
    catch_roll: fn(Option<u32>) -> bool,
    /// Whether the REPL should stop reading input
    pub should_quit: bool,
}

impl App {
    pub fn new(client: PokeApiClient) -> Self {
        Self {
            client,
            next_page: None,
            previous_page: None,
            pokedex: Pokedex::new(),
            catch_roll: pokedex::roll_catch,
            should_quit: false,
        }
    }

    /// Replaces the random catch roll, e.g. to make catches deterministic
    pub fn with_catch_roll(mut self, catch_roll: fn(Option<u32>) -> bool) -> Self {
        self.catch_roll = catch_roll;
        self
    }

    /// Reads commands from `input` until `exit` or end of input
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        while !self.should_quit {
            write!(out, "{}", PROMPT.bold().yellow())?;
            out.flush()?;

            match lines.next_line().await? {
                Some(line) => self.handle_line(&line, out).await?,
                None => {
                    writeln!(out)?;
                    debug!("input closed");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Runs a single line of input
    ///
    /// Only failures writing to `out` are returned; API errors are printed.
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<()> {
        let words = clean_input(line);
        if words.is_empty() {
            return Ok(());
        }

        match Command::parse(&words) {
            Some(command) => {
                debug!(?command, "dispatching command");
                self.execute(command, out).await
            }
            None => writeln!(out, "Unknown command"),
        }
    }

    async fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        match command {
            Command::Help => self.help(out),
            Command::Exit => {
                writeln!(out, "Closing the Pokedex... Goodbye!")?;
                self.should_quit = true;
                Ok(())
            }
            Command::Map => {
                let next = self.next_page.clone();
                self.show_page(next.as_deref(), out).await
            }
            Command::MapBack => match self.previous_page.clone() {
                Some(previous) => self.show_page(Some(&previous), out).await,
                None => writeln!(out, "you're on the first page"),
            },
            Command::Explore(areas) => self.explore(&areas, out).await,
            Command::Catch(Some(name)) => self.catch(&name, out).await,
            Command::Catch(None) => writeln!(out, "Usage: catch <pokemon_name>"),
            Command::Inspect(Some(name)) => self.inspect(&name, out),
            Command::Inspect(None) => writeln!(out, "Usage: inspect <pokemon_name>"),
            Command::Pokedex => self.list_pokedex(out),
            Command::Cache => self.cache_stats(out),
        }
    }

    fn help<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "Welcome to the Pokedex!".bold())?;
        writeln!(out, "Usage:")?;
        writeln!(out)?;
        for (usage, description) in Command::usage() {
            writeln!(out, "{}: {}", usage, description)?;
        }
        writeln!(out)
    }

    async fn show_page<W: Write>(&mut self, page_url: Option<&str>, out: &mut W) -> io::Result<()> {
        let page = match self.client.location_areas(page_url).await {
            Ok(page) => page,
            Err(err) => return writeln!(out, "Error: {}", err),
        };

        self.next_page = page.next;
        self.previous_page = page.previous;

        for area in &page.results {
            writeln!(out, "{}", area.name)?;
        }
        Ok(())
    }

    async fn explore<W: Write>(&self, areas: &[String], out: &mut W) -> io::Result<()> {
        if areas.is_empty() {
            return writeln!(out, "Usage: explore <area_name>");
        }

        let results = join_all(areas.iter().map(|area| self.client.location_area(area))).await;

        for (area, result) in areas.iter().zip(results) {
            writeln!(out, "Exploring {}...", area)?;
            match result {
                Ok(location) => {
                    writeln!(out, "Found Pokemon:")?;
                    for encounter in &location.pokemon_encounters {
                        writeln!(out, " - {}", encounter.pokemon.name)?;
                    }
                }
                Err(err) => writeln!(out, "Error: {}", err)?,
            }
        }
        Ok(())
    }

    async fn catch<W: Write>(&mut self, name: &str, out: &mut W) -> io::Result<()> {
        writeln!(out, "Throwing a Pokeball at {}...", name)?;

        let pokemon = match self.client.pokemon(name).await {
            Ok(pokemon) => pokemon,
            Err(err) => return writeln!(out, "Error: {}", err),
        };

        if !(self.catch_roll)(pokemon.base_experience) {
            return writeln!(out, "{} escaped!", pokemon.name);
        }

        let caught_name = pokemon.name.clone();
        if self.pokedex.insert(pokemon) {
            info!(pokemon = %caught_name, "caught");
            writeln!(out, "{} was caught!", caught_name)
        } else {
            writeln!(
                out,
                "{} was already in your pokedex, go catch someone else...",
                caught_name
            )
        }
    }

    fn inspect<W: Write>(&self, name: &str, out: &mut W) -> io::Result<()> {
        let Some(caught) = self.pokedex.get(name) else {
            return writeln!(out, "You have not caught the {} yet ...", name);
        };
        let pokemon = &caught.details;

        writeln!(out, "Name: {}", pokemon.name)?;
        writeln!(out, "Height: {}", pokemon.height)?;
        writeln!(out, "Weight: {}", pokemon.weight)?;
        match pokemon.base_experience {
            Some(base) => writeln!(out, "Base Experience: {}", base)?,
            None => writeln!(out, "Base Experience: unknown")?,
        }
        writeln!(out, "Caught: {}", caught.caught_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out, "Stats:")?;
        for stat in &pokemon.stats {
            writeln!(out, "  -{}: {}", stat.stat.name, stat.base_stat)?;
        }
        writeln!(out, "Types:")?;
        for slot in &pokemon.types {
            writeln!(out, "  - {}", slot.type_.name)?;
        }
        Ok(())
    }

    fn list_pokedex<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.pokedex.is_empty() {
            return writeln!(out, "Your pokedex is empty...");
        }
        for name in self.pokedex.names() {
            writeln!(out, "  - {}", name)?;
        }
        Ok(())
    }

    fn cache_stats<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let cache = self.client.cache();
        let stats = cache.stats();
        let config = cache.config();
        writeln!(
            out,
            "Cache: {} entries, {} hits, {} misses, {} expired (ttl {:?}, sweep every {:?})",
            stats.entries, stats.hits, stats.misses, stats.expired, config.ttl, config.sweep_interval
        )
    }
}
