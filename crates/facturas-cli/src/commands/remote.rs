//! One-shot operations against groups that already exist on the backend.

use super::save_download;
use anyhow::Result;
use facturas_core::{ClientConfig, DownloadedFile, GroupApi, GroupId};
use facturas_interaction::HttpGroupApi;
use std::path::PathBuf;

pub async fn download(
    config: &ClientConfig,
    group_id: GroupId,
    name: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let api = HttpGroupApi::from_config(config);
    let bytes = api.download_group(group_id).await?;
    let file = DownloadedFile {
        file_name: download_file_name(group_id, name.as_deref()),
        bytes,
    };
    let path = save_download(out, &file)?;
    println!("Saved {}", path.display());
    Ok(())
}

pub async fn delete(config: &ClientConfig, group_id: GroupId) -> Result<()> {
    let api = HttpGroupApi::from_config(config);
    api.delete_group(group_id).await?;
    println!("Deleted group {}", group_id);
    Ok(())
}

/// `{name}.pdf`; the group id stands in for the name, which the backend
/// cannot look up by id.
fn download_file_name(group_id: GroupId, name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("{}.pdf", name),
        None => format!("{}.pdf", group_id),
    }
}
