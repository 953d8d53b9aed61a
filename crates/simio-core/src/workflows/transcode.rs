use crate::core::item::ItemKind;
use crate::core::types::{IVec, RVec};
use crate::engine::error::FioError;
use crate::engine::handle::FileId;
use crate::engine::registry::FileRegistry;
use crate::engine::session::FileSession;
use std::fmt;
use tracing::{debug, info, instrument};

/// One step of a record layout.
///
/// For the array kinds (`NUCHAR`, `NRVEC`) `count` is the array length and the
/// entry is a single item; for every other kind the entry is `count` items in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEntry {
    pub kind: ItemKind,
    pub count: usize,
}

impl LayoutEntry {
    pub fn new(kind: ItemKind, count: usize) -> Self {
        Self { kind, count }
    }

    pub fn single(kind: ItemKind) -> Self {
        Self::new(kind, 1)
    }
}

impl fmt::Display for LayoutEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}:{}", self.kind, self.count)
        }
    }
}

/// Reads every entry of `layout` from `from` and writes it to `to`.
///
/// Both handles are selected here, so each side uses the encoding and
/// precision of its own file. Returns the number of items copied.
#[instrument(skip_all, name = "transcode_workflow", fields(from = %from, to = %to))]
pub fn transcode(
    registry: &FileRegistry,
    from: FileId,
    to: FileId,
    layout: &[LayoutEntry],
) -> Result<usize, FioError> {
    let source = registry.select(from)?;
    let target = registry.select(to)?;
    info!(
        "Copying {} layout entries from '{}' to '{}'.",
        layout.len(),
        registry.path(from)?.display(),
        registry.path(to)?.display()
    );

    let mut copied = 0;
    for (index, entry) in layout.iter().enumerate() {
        let desc = format!("entry {} ({})", index, entry);
        copied += copy_entry(&source, &target, *entry, &desc)?;
        debug!("Copied {}.", desc);
    }

    info!(copied, "Transcoding complete.");
    Ok(copied)
}

fn copy_entry(
    source: &FileSession,
    target: &FileSession,
    entry: LayoutEntry,
    desc: &str,
) -> Result<usize, FioError> {
    match entry.kind {
        ItemKind::UChars => {
            let mut values = vec![0u8; entry.count];
            source.read_uchars(&mut values, desc)?;
            target.write_uchars(&values, desc)?;
            Ok(1)
        }
        ItemKind::RVecs => {
            let mut values = vec![RVec::zeros(); entry.count];
            source.read_rvecs(&mut values, desc)?;
            target.write_rvecs(&values, desc)?;
            Ok(1)
        }
        kind => {
            for _ in 0..entry.count {
                copy_single(source, target, kind, desc)?;
            }
            Ok(entry.count)
        }
    }
}

fn copy_single(
    source: &FileSession,
    target: &FileSession,
    kind: ItemKind,
    desc: &str,
) -> Result<(), FioError> {
    match kind {
        ItemKind::Real => target.write_real(source.read_real(desc)?, desc),
        ItemKind::Double => target.write_double(source.read_double(desc)?, desc),
        ItemKind::Int => target.write_int(source.read_int(desc)?, desc),
        ItemKind::Step => target.write_step(source.read_step(desc)?, desc),
        ItemKind::UChar => target.write_uchar(source.read_uchar(desc)?, desc),
        ItemKind::UShort => target.write_ushort(source.read_ushort(desc)?, desc),
        ItemKind::RVec => target.write_rvec(source.read_rvec(desc)?, desc),
        ItemKind::IVec => {
            let value: IVec = source.read_ivec(desc)?;
            target.write_ivec(value, desc)
        }
        ItemKind::String => target.write_string(&source.read_string(desc)?, desc),
        ItemKind::UChars => {
            let mut value = [0u8; 1];
            source.read_uchars(&mut value, desc)?;
            target.write_uchars(&value, desc)
        }
        ItemKind::RVecs => {
            let mut value = [RVec::zeros(); 1];
            source.read_rvecs(&mut value, desc)?;
            target.write_rvecs(&value, desc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filetype::FileType;
    use crate::core::types::Precision;
    use std::fs;
    use tempfile::tempdir;

    fn frame_layout() -> Vec<LayoutEntry> {
        vec![
            LayoutEntry::single(ItemKind::String),
            LayoutEntry::new(ItemKind::Int, 2),
            LayoutEntry::single(ItemKind::Step),
            LayoutEntry::new(ItemKind::RVecs, 3),
        ]
    }

    #[test]
    fn canonical_frame_converts_to_text_and_back() {
        let dir = tempdir().unwrap();
        let registry = FileRegistry::default();
        let coords = [
            RVec::new(0.5, 1.0, 1.5),
            RVec::new(-0.25, 2.0, 0.0),
            RVec::new(4.0, 4.0, 4.0),
        ];

        let binary = dir.path().join("frame.trr");
        let id = registry.open(&binary, "w").unwrap();
        let fio = registry.select(id).unwrap();
        fio.write_string("water box", "title").unwrap();
        fio.write_int(3, "natoms").unwrap();
        fio.write_int(1, "nframes").unwrap();
        fio.write_step(5_000_000_000, "step").unwrap();
        fio.write_rvecs(&coords, "x").unwrap();
        registry.close(id).unwrap();

        let text = dir.path().join("frame.gro");
        let from = registry.open(&binary, "r").unwrap();
        let to = registry.open(&text, "w").unwrap();
        assert_eq!(transcode(&registry, from, to, &frame_layout()).unwrap(), 5);
        registry.close(from).unwrap();
        registry.close(to).unwrap();
        assert!(fs::read_to_string(&text).unwrap().starts_with("water_box"));

        let round = dir.path().join("round.trr");
        let from = registry.open(&text, "r").unwrap();
        let to = registry.open(&round, "w").unwrap();
        transcode(&registry, from, to, &frame_layout()).unwrap();
        registry.close(from).unwrap();
        registry.close(to).unwrap();

        assert_eq!(fs::read(&binary).unwrap(), fs::read(&round).unwrap());
    }

    #[test]
    fn each_side_keeps_its_own_precision() {
        let dir = tempdir().unwrap();
        let registry = FileRegistry::default();
        let single = dir.path().join("single.trr");
        let id = registry.open(&single, "w").unwrap();
        registry.select(id).unwrap().write_real(0.5, "x").unwrap();
        registry.close(id).unwrap();

        let double = dir.path().join("double.trr");
        let from = registry.open(&single, "r").unwrap();
        let to = registry.open(&double, "w").unwrap();
        registry.set_precision(to, Precision::Double).unwrap();
        transcode(&registry, from, to, &[LayoutEntry::single(ItemKind::Real)]).unwrap();
        registry.close(to).unwrap();
        assert_eq!(fs::metadata(&double).unwrap().len(), 8);
    }

    #[test]
    fn short_input_stops_with_a_soft_error() {
        let dir = tempdir().unwrap();
        let registry = FileRegistry::default();
        let input = dir.path().join("short.trr");
        fs::write(&input, 7i32.to_be_bytes()).unwrap();

        let from = registry.open(&input, "r").unwrap();
        let to = registry.open_as(dir.path().join("out.txt"), "w", FileType::Coordinates).unwrap();
        let err = transcode(&registry, from, to, &[LayoutEntry::new(ItemKind::Int, 2)]).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn layout_entries_display_kind_and_count() {
        assert_eq!(LayoutEntry::single(ItemKind::Int).to_string(), "INT");
        assert_eq!(LayoutEntry::new(ItemKind::RVecs, 3).to_string(), "NRVEC:3");
    }
}
