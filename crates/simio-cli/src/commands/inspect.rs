use crate::cli::InspectArgs;
use crate::error::Result;
use anyhow::Context;
use simio::core::filetype::{FileType, FormatCategory};
use simio::engine::registry::FileRegistry;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub file_type: FileType,
    pub category: Option<FormatCategory>,
    pub size: u64,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoding = self
            .category
            .map(|category| category.to_string())
            .unwrap_or_else(|| "no item encoding".to_string());
        write!(
            f,
            "{}: {} ({}), {} bytes",
            self.path.display(),
            self.file_type,
            encoding,
            self.size
        )
    }
}

pub fn run(args: InspectArgs, registry: &FileRegistry) -> Result<()> {
    info!("Inspecting {} file(s).", args.paths.len());
    for path in &args.paths {
        let report = inspect_file(registry, path)?;
        println!("{}", report);
    }
    Ok(())
}

pub fn inspect_file(registry: &FileRegistry, path: &Path) -> Result<FileReport> {
    let id = registry.open(path, "r")?;
    let file_type = registry.file_type(id)?;
    let metadata = std::fs::metadata(path);
    registry.close(id)?;
    let size = metadata
        .with_context(|| format!("Failed to read metadata of '{}'", path.display()))?
        .len();
    debug!("Inspected '{}': {} bytes.", path.display(), size);
    Ok(FileReport {
        path: path.to_path_buf(),
        file_type,
        category: file_type.category(),
        size,
    })
}
