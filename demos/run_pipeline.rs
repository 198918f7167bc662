use std::process;

use interactome::{Pipeline, PipelineConfig};

/// Runs the complete pipeline on a data folder
///
/// Usage: `cargo run --release --example run_pipeline -- [DATA_DIR]`
///
/// Set `RUST_LOG=debug` for more detailed progress messages.
fn main() {
    simple_logger::init_with_env().unwrap();

    let config = match std::env::args().nth(1) {
        Some(dir) => PipelineConfig::from_data_dir(dir),
        None => PipelineConfig::default(),
    };

    match Pipeline::new(config).run() {
        Ok(summary) => {
            println!("Fused interactions: {}", summary.interactions);
            for (threshold, count) in &summary.interactions_by_threshold {
                println!("  score >= {threshold}: {count}");
            }
            println!("Relevant terms: {}", summary.relevant_terms);
            for (file, count) in &summary.cleaned_files {
                println!("  {}: {count}", file.display());
            }
        }
        Err(err) => {
            eprintln!("Pipeline failed: {err}");
            process::exit(1);
        }
    }
}
