//! `acpcheck` - CLI for acp-checklists
//!
//! This binary steps through the club aircraft checklists, manages the
//! favorite tab and the offline resource cache.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use tracing::warn;

use acp_checklists::cli::{
    repl, CacheCommand, Cli, Command, ConfigCommand, FavoriteCommand, OutputFormat, RecapCommand,
    ShowCommand,
};
use acp_checklists::offline::{DirectoryOrigin, Request};
use acp_checklists::render::{BriefingView, ProgressReport, RecapCard, RecapTable, ScreenView};
use acp_checklists::{
    init_logging, App, Catalog, Config, Intent, KeyValueStore, MemoryStore, OfflineCache,
    Preferences, Screen, Storage, TabId,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Tabs => {
            handle_tabs(&build_app(&config)?, &config.default_tab()?);
            Ok(())
        }
        Command::Show(show_cmd) => handle_show(&mut build_app(&config)?, &show_cmd),
        Command::Run(run_cmd) => handle_run(&mut build_app(&config)?, run_cmd.tab),
        Command::Recap(recap_cmd) => handle_recap(&config, &recap_cmd),
        Command::Favorite(favorite_cmd) => {
            handle_favorite(&mut build_app(&config)?, favorite_cmd)
        }
        Command::Cache(cache_cmd) => handle_cache(&config, cache_cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    Catalog::load(config.catalog.path.as_deref()).context("failed to load the checklist catalog")
}

/// Preferences go to the database, or to memory for this run if it cannot be
/// opened.
fn open_preference_store(config: &Config) -> Box<dyn KeyValueStore> {
    match Storage::open(config.database_path()) {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            warn!(error = %err, "Preferences will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

fn build_app(config: &Config) -> anyhow::Result<App> {
    let catalog = load_catalog(config)?;
    let preferences = Preferences::load(open_preference_store(config), &catalog);
    Ok(App::new(
        Arc::new(catalog),
        preferences,
        config.default_tab()?,
    ))
}

fn handle_tabs(app: &App, default_tab: &TabId) {
    for tab in app.catalog().tabs() {
        let title = app
            .catalog()
            .document(&tab)
            .map_or("", |document| document.title.as_str());
        let mut marks = Vec::new();
        if app.favorite() == Some(&tab) {
            marks.push("favorite");
        }
        if default_tab == &tab {
            marks.push("default");
        }

        if marks.is_empty() {
            println!("{tab:<8} {title}");
        } else {
            println!("{tab:<8} {title} [{}]", marks.join(", "));
        }
    }
}

fn handle_show(app: &mut App, cmd: &ShowCommand) -> anyhow::Result<()> {
    let tab: TabId = cmd.tab.parse()?;
    app.dispatch(Intent::SwitchTab(tab.clone()))?;
    for check in &cmd.checks {
        app.dispatch(Intent::ToggleItem(check.parse()?))?;
    }

    let screen = app.screen()?;
    match cmd.format {
        OutputFormat::Plain => print!("{}", ScreenView(&screen)),
        OutputFormat::Json => match &screen {
            Screen::Checklist(checklist) => {
                println!("{}", ProgressReport::new(checklist).to_json()?);
            }
            _ => bail!("{tab} has no checklist to report"),
        },
    }
    Ok(())
}

fn handle_run(app: &mut App, tab: Option<String>) -> anyhow::Result<()> {
    if let Some(tab) = tab {
        app.dispatch(Intent::SwitchTab(tab.parse()?))?;
    }
    repl::run(app, io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}

fn handle_recap(config: &Config, cmd: &RecapCommand) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;

    if let Some(tab) = &cmd.tab {
        let tab: TabId = tab.parse()?;
        let recap = catalog
            .recap(&tab)
            .ok_or_else(|| anyhow!("no performance recap for {tab}"))?;
        print!("{}", RecapCard(recap));
    } else if cmd.table {
        print!("{}", RecapTable(catalog.recaps()));
    } else {
        for (index, recap) in catalog.recaps().iter().enumerate() {
            if index > 0 {
                println!();
            }
            print!("{}", RecapCard(recap));
        }
    }

    if cmd.briefing {
        match catalog.briefing() {
            Some(briefing) => {
                println!();
                print!("{}", BriefingView(briefing));
            }
            None => println!("No passenger briefing in this catalog."),
        }
    }
    Ok(())
}

fn handle_favorite(app: &mut App, cmd: FavoriteCommand) -> anyhow::Result<()> {
    match cmd {
        FavoriteCommand::Show => {
            let screen = Screen::Favorites {
                current: app.favorite().cloned(),
                options: app.catalog().favorite_options(),
            };
            print!("{}", ScreenView(&screen));
        }
        FavoriteCommand::Toggle { tab } => {
            app.dispatch(Intent::SelectFavorite(tab.parse()?))?;
            match app.favorite() {
                Some(favorite) => println!("Favorite: {favorite}"),
                None => println!("Favorite cleared."),
            }
        }
        FavoriteCommand::Clear => {
            app.dispatch(Intent::ClearFavorite)?;
            println!("Favorite cleared.");
        }
    }
    Ok(())
}

fn origin_dir(config: &Config, origin: Option<PathBuf>) -> anyhow::Result<DirectoryOrigin> {
    origin
        .or_else(|| config.cache.origin.clone())
        .map(DirectoryOrigin::new)
        .context("no origin directory: pass --origin or set cache.origin")
}

fn runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

fn handle_cache(config: &Config, cmd: CacheCommand) -> anyhow::Result<()> {
    let storage = Storage::open(config.database_path())?;
    let cache = OfflineCache::new(&storage, config.cache_policy()?);

    match cmd {
        CacheCommand::Status { json } => {
            let status = cache.status()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                match &status.current {
                    Some(current) => println!("Current:  {current}"),
                    None => println!("Current:  none installed"),
                }
                for (name, count) in &status.generations {
                    let mark = if status.current.as_ref() == Some(name) {
                        "*"
                    } else {
                        " "
                    };
                    println!("  {mark} {name} ({count} resources)");
                }
            }
        }
        CacheCommand::Install { origin } => {
            let origin = origin_dir(config, origin)?;
            let name = runtime()?.block_on(cache.install(&origin))?;
            println!("Installed {name} from {}", origin.root().display());
        }
        CacheCommand::Get {
            url,
            method,
            origin,
        } => {
            let origin = origin_dir(config, origin)?;
            let request = Request::new(method, url);
            let fetched = runtime()?.block_on(cache.fetch(&request, &origin))?;
            eprintln!(
                "{} {} ({}, {} bytes)",
                fetched.response.status,
                request.url,
                fetched.source,
                fetched.response.body.len()
            );
            let mut stdout = io::stdout().lock();
            stdout.write_all(&fetched.response.body)?;
            stdout.flush()?;
        }
        CacheCommand::Activate => {
            let deleted = cache.activate()?;
            if deleted.is_empty() {
                println!("No old cache generation to delete.");
            } else {
                for name in deleted {
                    println!("Deleted {name}");
                }
            }
        }
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let app = build_app(config)?;
    let catalog_source = config
        .catalog
        .path
        .as_ref()
        .map_or_else(|| "built-in".to_string(), |path| path.display().to_string());
    let aircraft = app.catalog().aircraft_tabs().count();

    let (stats, cache) = match Storage::open(config.database_path()) {
        Ok(storage) => {
            let cache = OfflineCache::new(&storage, config.cache_policy()?).current_name()?;
            (Some(storage.stats()?), cache)
        }
        Err(err) => {
            warn!(error = %err, "Storage unavailable");
            (None, None)
        }
    };

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "config_path": Config::default_config_path(),
            "catalog": catalog_source,
            "aircraft": aircraft,
            "favorite": app.favorite(),
            "startup_tab": app.active_tab(),
            "storage": stats,
            "cache": cache,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("acpcheck status");
        println!("---------------");
        println!("Database:      {}", config.database_path().display());
        println!("Catalog:       {catalog_source} ({aircraft} aircraft)");
        println!(
            "Favorite:      {}",
            app.favorite().map_or_else(|| "none".to_string(), ToString::to_string)
        );
        println!("Startup tab:   {}", app.active_tab());
        match stats {
            Some(stats) => {
                println!("Preferences:   {}", stats.preferences);
                println!(
                    "Cached:        {} resources in {} generation(s)",
                    stats.cached_resources, stats.cache_generations
                );
                println!("Database size: {} bytes", stats.db_size_bytes);
            }
            None => println!("Storage:       unavailable"),
        }
        println!("Offline cache: {}", cache.as_deref().unwrap_or("not installed"));
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Catalog]");
                match &config.catalog.path {
                    Some(path) => println!("  Path:           {}", path.display()),
                    None => println!("  Path:           built-in"),
                }
                println!();
                println!("[App]");
                println!("  Default tab:    {}", config.app.default_tab);
                println!();
                println!("[Cache]");
                println!("  Version:        {}", config.cache.version);
                println!("  Precache:       {}", config.cache.precache.join(", "));
                println!("  Network first:  {}", config.cache.network_first.join(", "));
                match &config.cache.origin {
                    Some(origin) => println!("  Origin:         {}", origin.display()),
                    None => println!("  Origin:         not set"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
