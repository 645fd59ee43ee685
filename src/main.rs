use picsweep::cli::{AppConfig, Args};
use picsweep::discover::{discover, TraversalConfig};
use picsweep::session;

fn main() {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let config: AppConfig = args.into();

    if config.test_search {
        run_test_search(&config);
        return;
    }

    if let Err(e) = session::run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Discovery preview: print up to the first 10 image names plus a total
/// count, then exit without an interactive session.
fn run_test_search(config: &AppConfig) {
    let traversal = TraversalConfig {
        roots: config.paths.clone(),
        max_depth: config.depth,
    };

    let mut shown = 0usize;
    let mut total = 0usize;
    for candidate in discover(&traversal) {
        total += 1;
        if shown < 10 {
            println!("  {}. {}", shown + 1, candidate.path.display());
            shown += 1;
        }
    }

    if total > shown {
        println!("  ... and {} more", total - shown);
    }
    println!("Found {} image files", total);
}
