//! Run with: cargo run --package server --bin generate-types --features typescript

use std::fs;
use std::path::Path;

fn main() {
    println!("Generating TypeScript types...");

    let out_dir = Path::new("frontend/src/types/generated");

    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("Failed to create output directory: {}", e);
        std::process::exit(1);
    }

    #[cfg(feature = "typescript")]
    {
        use ts_rs::TS;

        consilium_core::JobStatus::export_all_to(out_dir).expect("Failed to export JobStatus");
        consilium_core::Job::export_all_to(out_dir).expect("Failed to export Job");
        consilium_core::Stage::export_all_to(out_dir).expect("Failed to export Stage");
        consilium_core::AnalysisRequest::export_all_to(out_dir)
            .expect("Failed to export AnalysisRequest");
        consilium_core::Clarification::export_all_to(out_dir)
            .expect("Failed to export Clarification");
        consilium_core::JobResult::export_all_to(out_dir).expect("Failed to export JobResult");
        consilium_core::JobError::export_all_to(out_dir).expect("Failed to export JobError");
        consilium_core::ArtifactSet::export_all_to(out_dir).expect("Failed to export ArtifactSet");
    }

    println!("TypeScript types written to {}", out_dir.display());
}
