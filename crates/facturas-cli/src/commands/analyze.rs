use super::{read_local_file, save_download};
use anyhow::Result;
use facturas_application::FacturasApp;
use facturas_core::{ClientConfig, Provenance};
use std::path::PathBuf;

pub async fn run(config: &ClientConfig, paths: &[PathBuf], download: Option<PathBuf>) -> Result<()> {
    let files = paths
        .iter()
        .map(|p| read_local_file(p))
        .collect::<Result<Vec<_>>>()?;

    let app = FacturasApp::from_config(config);
    let outcome = app.analyze_files(files).await?;

    for name in &outcome.skipped {
        println!("skipped  {} (not a PDF or ZIP)", name);
    }
    for (name, message) in &outcome.failed {
        println!("failed   {}: {}", name, message);
    }

    let groups = app.groups();
    println!("{:>6}  {:<40} {:>5}  {}", "ID", "GROUP", "PDFS", "ORIGIN");
    for group in &groups {
        let origin = match group.created_by {
            Provenance::Auto => "auto",
            Provenance::Manual => "manual",
        };
        println!(
            "{:>6}  {:<40} {:>5}  {}",
            group.id,
            group.base_name,
            group.pdfs.len(),
            origin
        );
    }

    if let Some(dir) = download {
        let zip = app.download_all().await?;
        let path = save_download(Some(dir), &zip)?;
        println!("Saved {}", path.display());
    }

    Ok(())
}
