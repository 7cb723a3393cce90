use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dialoguer::Input;
use log::debug;
use soundboard_downloader::cli::Cli;
use soundboard_downloader::progress_bars::ConsoleReporter;
use soundboard_downloader::soundboard::{fetch, search, BASE_URL};
use soundboard_downloader::{BoardDownloader, SearchResults, SnagError, SnagTotals};
use tokio::fs::create_dir_all;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::builder().format_timestamp(None).init();

    tokio::select! {
        result = run(args) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n{}", "Cancelled by user.".bold().red());
            exit(1);
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let download_root = prepare_download_root(args.download_root.clone()).await?;
    let reporter = ConsoleReporter::new(args.debug);

    if let Some(query) = args.search_and_download.clone() {
        return search_and_download(&args, &query, download_root, &reporter).await;
    }

    if let Some(query) = args.search.clone() {
        let client = fetch::client().map_err(SnagError::from)?;
        let results = search::search(&client, &query, &args.search_opts(), &reporter).await?;
        print_search_results(&results);

        if let Some(top) = results.boards.first() {
            println!("\n{}", "To download a board, use:".bold());
            println!(
                "  {}",
                format!("soundboard_downloader --board {}", top.name).dimmed()
            );
        }
        return Ok(());
    }

    let downloader = resolve_board(&args, download_root)?;
    match downloader.snag(&reporter).await {
        Ok(_) => Ok(()),
        Err(err) => {
            print_board_error(downloader.board_name(), &err);
            exit(1);
        }
    }
}

/// Creates the download root up front so an unwritable path fails before any
/// board work starts.
async fn prepare_download_root(root: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(dir) = &root {
        if !dir.exists() {
            create_dir_all(dir).await?;
            println!(
                "{}\n",
                format!("Created download root directory: {}", dir.display()).blue()
            );
        }
    }
    Ok(root)
}

/// Picks the board from `--board`, `--url` or an interactive prompt. The
/// prompt accepts either form.
fn resolve_board(args: &Cli, download_root: Option<PathBuf>) -> Result<BoardDownloader> {
    let delay = args.delay();

    if let Some(name) = &args.board {
        return Ok(BoardDownloader::new(name, download_root, delay)?);
    }
    if let Some(url) = &args.url {
        return Ok(BoardDownloader::from_url(url, download_root, delay)?);
    }

    let answer: String = Input::new()
        .with_prompt(format!(
            "Enter a board name or full URL ({}/sb/...)",
            BASE_URL
        ))
        .interact_text()?;
    let answer = answer.trim();

    let downloader = if answer.contains("://") {
        BoardDownloader::from_url(answer, download_root, delay)?
    } else {
        BoardDownloader::new(answer, download_root, delay)?
    };
    Ok(downloader)
}

async fn search_and_download(
    args: &Cli,
    query: &str,
    download_root: Option<PathBuf>,
    reporter: &ConsoleReporter,
) -> Result<()> {
    let client = fetch::client().map_err(SnagError::from)?;
    let results = search::search(&client, query, &args.search_opts(), reporter).await?;
    print_search_results(&results);

    if results.boards.is_empty() {
        return Ok(());
    }

    println!(
        "\n{}\n",
        format!("Downloading {} boards...", results.boards.len())
            .bold()
            .cyan()
    );

    let mut grand_total = SnagTotals::default();
    let mut failed_boards = 0usize;

    for board in &results.boards {
        let downloader = BoardDownloader::new(&board.name, download_root.clone(), args.delay())?;
        match downloader.snag(reporter).await {
            Ok(totals) => {
                grand_total.saved += totals.saved;
                grand_total.skipped += totals.skipped;
                grand_total.failed += totals.failed;
            }
            Err(err) => {
                print_board_error(&board.name, &err);
                failed_boards += 1;
            }
        }
        println!();
    }

    println!(
        "{} {} saved, {} skipped, {} failed across {} boards",
        "All boards done:".bold().green(),
        grand_total.saved.to_string().cyan(),
        grand_total.skipped,
        grand_total.failed,
        results.boards.len()
    );
    if failed_boards > 0 {
        println!(
            "{}",
            format!("{} board(s) could not be processed", failed_boards).red()
        );
    }
    Ok(())
}

fn print_search_results(results: &SearchResults) {
    if results.boards.is_empty() {
        println!("{}", "No downloadable boards found.".yellow());
        println!("   Try a different search, adjust filters with --min-views 0 --min-sounds 0, or use --debug to see all analyzed boards.");
        return;
    }

    println!("\n{}", format!("{:=^80}", " SEARCH RESULTS ").bold());

    for board in &results.boards {
        println!(
            "\n{} {} {}",
            "Board:".bold(),
            board.name.cyan(),
            format!("({} sounds total)", board.sound_count).dimmed()
        );
        println!("{}", format!("URL: {}", board.url()).dimmed());
        if let Some(desc) = &board.description {
            println!("{}", format!("Description: {}", desc).dimmed());
        }
        if let Some(category) = &board.category {
            println!("{}", format!("Category: {}", category).dimmed());
        }
        println!("{}", format!("Views: {}", board.views).dimmed());
        if !board.tags.is_empty() {
            println!("{}", format!("Tags: {}", board.tags.join(", ")).dimmed());
        }
        for sound in &board.sample_sounds {
            let title = if sound.title.is_empty() {
                "(untitled)"
            } else {
                sound.title.as_str()
            };
            println!("  {} {}", format!("#{}", sound.id).dimmed(), title);
        }
    }

    println!("\n{}", format!("{:=^80}", "").bold());
    println!(
        "{} downloadable boards found",
        results.boards.len().to_string().green().bold()
    );
    if results.skipped_by_filters > 0 {
        println!(
            "{}",
            format!(
                "({} downloadable boards were filtered out)",
                results.skipped_by_filters
            )
            .dimmed()
        );
    }
}

fn print_board_error(board: &str, err: &SnagError) {
    debug!("Board '{}' failed: {:?}", board, err);
    match err {
        SnagError::DownloadsDisabled { sounds } => {
            println!(
                "\n{}",
                "ERROR: This board has downloads disabled!".bold().red()
            );
            println!(
                "   Found {} sounds but {}.",
                sounds,
                "no download buttons".yellow()
            );
            println!("   The board owner has restricted this board to play-only mode.");
            println!(
                "\n   Board URL: {}",
                format!("{}/sb/{}", BASE_URL, board).cyan()
            );
            println!("   This board cannot be downloaded. Please try a different board.");
        }
        SnagError::NoSounds => {
            println!(
                "\n{} {}",
                "ERROR:".bold().red(),
                "No audio files found on this soundboard page."
            );
        }
        other => {
            println!("\n{} {}", "ERROR:".bold().red(), other);
        }
    }
}
