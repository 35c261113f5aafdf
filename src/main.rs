use std::{env, fs, io::{self, BufRead, Write}, sync::Arc, time::Instant};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use movie_content_recommender::{
    rank_by_category, CorpusBuilder, FittedIndex, IndexConfig, IndexError, RawItem, SharedIndex,
};

const DEFAULT_RESULTS: usize = 5;

enum Mode {
    Similar(String),
    Category(String),
    ListCategories,
    Interactive,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let program_start = Instant::now();
    let mut config = IndexConfig::default();
    let mut positional: Vec<String> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dense-threshold" => match args.next().map(|v| v.parse::<usize>()) {
                Some(Ok(v)) => config = config.with_dense_threshold(v),
                _ => { error!("--dense-threshold needs an integer"); return; }
            },
            "-h" | "--help" => {
                print_usage();
                return;
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(data_path) = positional.next() else {
        print_usage();
        return;
    };
    let command = positional.next();
    let operand = positional.next();
    let n = match positional.next().map(|v| v.parse::<usize>()) {
        None => DEFAULT_RESULTS,
        Some(Ok(v)) if v > 0 => v,
        Some(_) => { error!("result count must be a positive integer"); return; }
    };
    for extra in positional {
        warn!(arg = %extra, "extra arg ignored");
    }
    let mode = match (command.as_deref(), operand) {
        (None, _) => Mode::Interactive,
        (Some("similar"), Some(title)) => Mode::Similar(title),
        (Some("category"), Some(label)) => Mode::Category(label),
        (Some("categories"), None) => Mode::ListCategories,
        _ => {
            print_usage();
            return;
        }
    };

    // ---- load ----
    let raws: Vec<RawItem> = match fs::read_to_string(&data_path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(raws) => raws,
        Err(e) => { error!(path = %data_path, error = %e, "failed to read items"); return; }
    };
    let (corpus, report) = CorpusBuilder::new().build_all(&raws);
    for rejected in &report.rejected {
        warn!(row = rejected.row, title = ?rejected.title, reason = %rejected.reason, "record dropped");
    }
    let corpus = Arc::new(corpus);

    if let Mode::Category(label) = &mode {
        // pure category retrieval never needs a fit
        print_items(rank_by_category(&corpus, label, n).into_iter().map(|item| (item, None)));
        return;
    }
    if let Mode::ListCategories = mode {
        for label in corpus.categories() {
            println!("{label}");
        }
        return;
    }

    // ---- fit ----
    let fit_start = Instant::now();
    let shared = SharedIndex::new();
    let fitted = shared.fit(Arc::clone(&corpus), config);
    info!(elapsed_ms = fit_start.elapsed().as_secs_f64() * 1000.0, "fit done");

    match mode {
        Mode::Similar(title) => run_single_query(&fitted, &title, n),
        _ => run_interactive(&shared, n),
    }
    info!(elapsed_ms = program_start.elapsed().as_secs_f64() * 1000.0, "program total");
}

fn print_usage() {
    eprintln!("Usage: recommend [--dense-threshold N] <file> similar <title> [k]");
    eprintln!("       recommend [--dense-threshold N] <file> category <label> [n]");
    eprintln!("       recommend <file> categories");
    eprintln!("       recommend <file>");
    eprintln!("<file> is a JSON array of items (title, overview, genres, vote_average, release_year).");
    eprintln!("Without a command, titles are read from stdin.");
}

fn print_items<'a>(rows: impl Iterator<Item = (&'a movie_content_recommender::Item, Option<f64>)>) {
    let mut empty = true;
    for (rank, (item, score)) in rows.enumerate() {
        empty = false;
        let categories: Vec<&str> = item.categories().collect();
        match score {
            Some(score) => println!(
                "{:>3}. {} ({}) rating {:.1} [{}] similarity {:.4}",
                rank + 1, item.title(), item.year(), item.score(), categories.join(", "), score
            ),
            None => println!(
                "{:>3}. {} ({}) rating {:.1} [{}]",
                rank + 1, item.title(), item.year(), item.score(), categories.join(", ")
            ),
        }
    }
    if empty {
        println!("(no results)");
    }
}

fn run_single_query(fitted: &FittedIndex, title: &str, n: usize) {
    let t0 = Instant::now();
    match fitted.recommend(title, n) {
        Ok(recs) => {
            info!(elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0, "query done");
            print_items(recs.into_iter().map(|(item, score)| (item, Some(score))));
        }
        Err(IndexError::UnknownTitle(t)) => println!("unknown title: {t}"),
        Err(e) => error!(error = %e, "query failed"),
    }
}

fn run_interactive(shared: &SharedIndex, n: usize) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("Title> ");
        let _ = stdout.flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => { error!(error = %e, "read error"); break; }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            info!("bye");
            break;
        }
        match shared.snapshot() {
            Ok(fitted) => run_single_query(&fitted, trimmed, n),
            Err(e) => { error!(error = %e, "index unavailable"); break; }
        }
    }
}
