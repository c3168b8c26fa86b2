// ==========================================
// Manifest Registry - CLI Entry Point
// ==========================================
// Operator commands over the core library: partition and
// template management, two-phase import, reconciliation
// sweep. The web layer is an external collaborator; this
// binary is the minimal operational surface.
// ==========================================

use manifest_registry::api::ImportApi;
use manifest_registry::domain::types::{EntryField, SheetFormat};
use manifest_registry::domain::{ImportTemplate, ManualFieldsInput};
use manifest_registry::repository::{
    PartitionRepository, PartitionRepositoryImpl, TemplateRepository, TemplateRepositoryImpl,
};
use std::collections::BTreeMap;
use std::process::ExitCode;
use std::str::FromStr;

fn default_db_path() -> String {
    if let Ok(path) = std::env::var("MANIFEST_REGISTRY_DB") {
        return path;
    }
    dirs::data_dir()
        .map(|dir| {
            dir.join("manifest-registry")
                .join("registry.db")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "registry.db".to_string())
}

fn usage() {
    println!("{} v{}", manifest_registry::APP_NAME, manifest_registry::VERSION);
    println!();
    println!("Usage:");
    println!("  manifest-registry partition create <year>");
    println!("  manifest-registry partition activate <year>");
    println!("  manifest-registry partition list");
    println!("  manifest-registry template save <name> <xls|xlsx> <start_row> <mapping_json>");
    println!("  manifest-registry template list");
    println!("  manifest-registry import <file> <template> <manifest_number> [options]");
    println!("  manifest-registry sweep");
    println!();
    println!("Import options:");
    println!("  --permit <no>      permit number");
    println!("  --date <date>      registration date (YYYY-MM-DD)");
    println!("  --request <id>     operation request id");
    println!("  --ship <name>      ship name");
    println!("  --flag <name>      flag name");
    println!("  --preview-only     stage and show the preview, do not commit");
    println!();
    println!("Database path: MANIFEST_REGISTRY_DB (default: {})", default_db_path());
}

#[tokio::main]
async fn main() -> ExitCode {
    manifest_registry::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = default_db_path();
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match args.first().map(String::as_str) {
        Some("partition") => run_partition(&db_path, &args[1..]).await,
        Some("template") => run_template(&db_path, &args[1..]).await,
        Some("import") => run_import(&db_path, &args[1..]).await,
        Some("sweep") => {
            let api = ImportApi::new(&db_path)?;
            let report = api.reconcile_sweep().await?;
            println!(
                "sweep complete: {} container types, {} flags, {} ships created; {} entries linked",
                report.container_types_created,
                report.flags_created,
                report.ships_created,
                report.entries_linked
            );
            Ok(())
        }
        _ => {
            usage();
            Ok(())
        }
    }
}

async fn run_partition(db_path: &str, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let repo = PartitionRepositoryImpl::new(db_path)?;
    match (args.first().map(String::as_str), args.get(1)) {
        (Some("create"), Some(year)) => {
            let partition = repo.create(year.parse()?).await?;
            println!("created {}", partition);
        }
        (Some("activate"), Some(year)) => {
            let partition = repo.activate(year.parse()?).await?;
            println!("activated {}", partition);
        }
        (Some("list"), _) => {
            for partition in repo.list().await? {
                let marker = if partition.is_active { " (active)" } else { "" };
                println!("{}{}", partition.year, marker);
            }
        }
        _ => return Err("usage: partition create|activate <year> | partition list".into()),
    }
    Ok(())
}

async fn run_template(db_path: &str, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let repo = TemplateRepositoryImpl::new(db_path)?;
    match args.first().map(String::as_str) {
        Some("save") => {
            let (name, format, start_row, mapping_json) = match (
                args.get(1),
                args.get(2),
                args.get(3),
                args.get(4),
            ) {
                (Some(n), Some(f), Some(s), Some(m)) => (n, f, s, m),
                _ => {
                    return Err(
                        "usage: template save <name> <xls|xlsx> <start_row> <mapping_json>".into(),
                    )
                }
            };
            let mapping: BTreeMap<EntryField, String> = serde_json::from_str(mapping_json)?;
            let template = ImportTemplate::new(
                name,
                SheetFormat::from_str(format)?,
                start_row.parse()?,
                mapping,
            )?;
            let stored = repo.save(&template).await?;
            println!(
                "saved template '{}' ({} mapped columns, data from row {})",
                stored.name,
                stored.mapping.len(),
                stored.start_row
            );
        }
        Some("list") => {
            for template in repo.list().await? {
                println!(
                    "{} [{}] start row {}, {} columns",
                    template.name,
                    template.sheet_format,
                    template.start_row,
                    template.mapping.len()
                );
            }
        }
        _ => return Err("usage: template save ... | template list".into()),
    }
    Ok(())
}

async fn run_import(db_path: &str, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let (file, template, manifest_number) = match (args.first(), args.get(1), args.get(2)) {
        (Some(f), Some(t), Some(m)) => (f.clone(), t.clone(), m.clone()),
        _ => return Err("usage: import <file> <template> <manifest_number> [options]".into()),
    };

    let mut manual = ManualFieldsInput {
        manifest_number,
        ..Default::default()
    };
    let mut preview_only = false;

    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--permit" => manual.permit_number = rest.next().cloned().unwrap_or_default(),
            "--date" => manual.registration_date = rest.next().cloned().unwrap_or_default(),
            "--request" => manual.operation_request = rest.next().cloned().unwrap_or_default(),
            "--ship" => manual.ship_name = rest.next().cloned().unwrap_or_default(),
            "--flag" => manual.flag_name = rest.next().cloned().unwrap_or_default(),
            "--preview-only" => preview_only = true,
            other => return Err(format!("unknown option: {}", other).into()),
        }
    }

    let bytes = std::fs::read(&file)?;
    let api = ImportApi::new(db_path)?;
    let session = uuid::Uuid::new_v4().to_string();

    let preview = api
        .preview(&session, &bytes, &file, &template, &manual)
        .await?;
    println!(
        "previewed {} row(s) for registry {} (manifest {})",
        preview.total_rows, preview.partition_year, manual.manifest_number
    );
    for row in &preview.rows {
        println!(
            "  row {}: container {} [{}] x{} {}",
            row.row_number,
            row.container_code,
            row.container_model,
            row.package_count.unwrap_or(0),
            row.gross_weight.as_deref().unwrap_or("-")
        );
    }

    if preview_only {
        println!("preview only; nothing committed (session {})", session);
        return Ok(());
    }

    let created = api.confirm(&session).await?;
    println!("committed {} entries", created);
    Ok(())
}
