use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use rusqlite::Connection;

use nald_sync::{
    count_rows, load_conditions, load_licence_versions, load_licences, load_parties,
    setup_database, ConditionStep, ImportOrchestrator, ImportOutcome, ImportStep, LicenceStep,
    LogNotifier, PartyStep, Table,
};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") if args.len() == 4 => {
            match run_import(Path::new(&args[2]), Path::new(&args[3])) {
                Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
                Ok(_) => ExitCode::FAILURE,
                Err(err) => {
                    eprintln!("❌ {err:#}");
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            eprintln!("Usage: nald-sync import <staging-dir> <db-path>");
            eprintln!();
            eprintln!("  <staging-dir> must contain the staged NALD extracts:");
            eprintln!("    NALD_ABS_LICENCES.csv");
            eprintln!("    NALD_ABS_LIC_VERSIONS.csv");
            eprintln!("    NALD_PARTIES.csv");
            eprintln!("    NALD_LIC_CONDITIONS.csv");
            ExitCode::FAILURE
        }
    }
}

fn run_import(staging_dir: &Path, db_path: &Path) -> Result<ImportOutcome> {
    println!("💧 NALD import - staged extracts → target store");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load staged extracts
    println!("\n📂 Loading staged extracts from {}...", staging_dir.display());
    let licences = load_licences(&extract_path(staging_dir, "NALD_ABS_LICENCES"))?;
    let versions = load_licence_versions(&extract_path(staging_dir, "NALD_ABS_LIC_VERSIONS"))?;
    let parties = load_parties(&extract_path(staging_dir, "NALD_PARTIES"))?;
    let conditions = load_conditions(&extract_path(staging_dir, "NALD_LIC_CONDITIONS"))?;
    println!(
        "✓ Loaded {} licences, {} versions, {} parties, {} conditions",
        licences.len(),
        versions.len(),
        parties.len(),
        conditions.len()
    );

    // 2. Setup target store
    println!("\n🔧 Setting up target store...");
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open target store {}", db_path.display()))?;
    setup_database(&conn)?;
    println!("✓ Target store initialized with WAL mode");

    // 3. Run the pipeline
    println!("\n💾 Running import...");
    let steps: Vec<Box<dyn ImportStep>> = vec![
        Box::new(LicenceStep { licences, versions }),
        Box::new(PartyStep { parties }),
        Box::new(ConditionStep { conditions }),
    ];

    let notifier = LogNotifier;
    let outcome = ImportOrchestrator::new(&notifier).run(&conn, &steps);

    // 4. Report
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    match &outcome {
        ImportOutcome::Completed { duration } => {
            println!("🎉 Import complete in {:.2}s", duration.as_secs_f64());
            println!(
                "✓ Store now holds {} licences, {} companies, {} contacts, {} conditions",
                count_rows(&conn, Table::Licences)?,
                count_rows(&conn, Table::Companies)?,
                count_rows(&conn, Table::Contacts)?,
                count_rows(&conn, Table::PurposeConditions)?,
            );
        }
        ImportOutcome::Failed { step, reason } => {
            println!("❌ Import failed at step '{step}': {reason}");
        }
    }

    Ok(outcome)
}

fn extract_path(staging_dir: &Path, collection: &str) -> PathBuf {
    staging_dir.join(format!("{collection}.csv"))
}
