use crate::cli::ConvertArgs;
use crate::error::Result;
use crate::utils::parser::{parse_file_type, parse_layout};
use simio::engine::handle::FileId;
use simio::engine::registry::FileRegistry;
use simio::workflows::transcode::transcode;
use std::path::Path;
use tracing::info;

pub fn run(args: ConvertArgs, registry: &FileRegistry) -> Result<()> {
    let layout = parse_layout(&args.items)?;
    info!("Converting with a layout of {} entries.", layout.len());

    let from = open_with(registry, &args.input, "r", args.input_type.as_deref())?;
    let to = match open_with(registry, &args.output, "w", args.output_type.as_deref()) {
        Ok(id) => id,
        Err(e) => {
            registry.close(from)?;
            return Err(e);
        }
    };
    if args.annotate {
        registry.set_debug(to, true)?;
    }

    let copied = transcode(registry, from, to, &layout);
    let closed_from = registry.close(from);
    let closed_to = registry.close(to);
    let copied = copied?;
    closed_from?;
    closed_to?;

    println!(
        "Copied {} items from '{}' to '{}'.",
        copied,
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

fn open_with(
    registry: &FileRegistry,
    path: &Path,
    mode: &str,
    file_type: Option<&str>,
) -> Result<FileId> {
    let id = match file_type {
        Some(extension) => registry.open_as(path, mode, parse_file_type(extension)?)?,
        None => registry.open(path, mode)?,
    };
    Ok(id)
}
