use simio::core::filetype::FileType;
use simio::core::item::ItemKind;
use simio::workflows::transcode::LayoutEntry;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Item layout cannot be empty.")]
    EmptyLayout,

    #[error(
        "Unknown item kind '{0}'. Expected one of real, double, int, step, uchar, nuchar, ushort, rvec, nrvec, ivec, string."
    )]
    UnknownKind(String),

    #[error("Invalid count '{count}' in layout entry '{entry}'. Expected a positive integer.")]
    InvalidCount { entry: String, count: String },

    #[error("Unknown file type '{0}'. Expected a known extension such as 'trr', 'tpr' or 'gro'.")]
    UnknownFileType(String),
}

/// Parses `kind[:count]` entries separated by commas.
pub fn parse_layout(layout: &str) -> Result<Vec<LayoutEntry>, ParseError> {
    let entries = layout
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect::<Result<Vec<_>, _>>()?;
    if entries.is_empty() {
        return Err(ParseError::EmptyLayout);
    }
    Ok(entries)
}

fn parse_entry(entry: &str) -> Result<LayoutEntry, ParseError> {
    let (name, count) = match entry.split_once(':') {
        Some((name, count)) => {
            let parsed = count
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| ParseError::InvalidCount {
                    entry: entry.to_string(),
                    count: count.to_string(),
                })?;
            (name.trim(), parsed)
        }
        None => (entry, 1),
    };
    Ok(LayoutEntry::new(parse_item_kind(name)?, count))
}

pub fn parse_item_kind(name: &str) -> Result<ItemKind, ParseError> {
    let lower = name.to_ascii_lowercase();
    let kind = match lower.as_str() {
        "uchars" => Some(ItemKind::UChars),
        "rvecs" => Some(ItemKind::RVecs),
        _ => ItemKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(&lower)),
    };
    kind.ok_or_else(|| ParseError::UnknownKind(name.to_string()))
}

pub fn parse_file_type(extension: &str) -> Result<FileType, ParseError> {
    match FileType::from_extension(extension.trim_start_matches('.')) {
        FileType::Other => Err(ParseError::UnknownFileType(extension.to_string())),
        file_type => Ok(file_type),
    }
}
