use std::error::Error;

use tracing_subscriber::EnvFilter;

use molsearch::{
    engine_from_config, MolsearchConfig, RawCompoundRecord, SimilarityRequest, SubstructureRequest,
};

fn demo_records() -> Vec<RawCompoundRecord> {
    vec![
        RawCompoundRecord::new("demo:benzene", "c1ccccc1").with_collection("chebi"),
        RawCompoundRecord::new("demo:toluene", "Cc1ccccc1").with_collection("chebi"),
        RawCompoundRecord::new("demo:ethanol", "CCO").with_collection("chebi"),
        RawCompoundRecord::new("demo:aspirin", "CC(=O)Oc1ccccc1C(=O)O").with_collection("drugbank"),
        RawCompoundRecord::new("demo:phenylalanine", "[NH3+][C@@H](Cc1ccccc1)C(=O)[O-]")
            .with_collection("drugbank"),
    ]
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = engine_from_config(&MolsearchConfig::default())?;
    let summary = engine.load(&demo_records());
    tracing::info!(datasets = summary.compiled.len(), "demo data loaded");
    println!(
        "loaded {} datasets: {}",
        summary.compiled.len(),
        serde_json::to_string(&summary)?
    );

    let similar = engine.similarity_search(&SimilarityRequest::new("c1ccccc1"))?;
    println!("\nmost similar to benzene:");
    for hit in &similar {
        println!("  {:.3}  {}  ({})", hit.score, hit.record.id, hit.record.collection);
    }

    let containing = engine.substructure_search(&SubstructureRequest::new("c1ccccc1"))?;
    println!("\ncompounds containing a benzene ring:");
    for hit in &containing {
        println!("  {} match(es)  {}  {}", hit.match_count, hit.id, hit.structure);
    }

    println!("\nregistered fingerprint types:");
    for kind in engine.list_fingerprint_types() {
        println!("  {:<20} {}", kind.id, kind.short_name);
    }

    Ok(())
}
