use phf::{Map, phf_map};
use std::fmt;
use std::path::Path;

/// Wire encoding family serviced by one codec implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCategory {
    Text,
    NativeBinary,
    CanonicalBinary,
}

impl FormatCategory {
    pub fn is_binary(self) -> bool {
        !matches!(self, FormatCategory::Text)
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatCategory::Text => "text",
            FormatCategory::NativeBinary => "native-binary",
            FormatCategory::CanonicalBinary => "canonical-binary",
        };
        write!(f, "{}", name)
    }
}

/// Kind of file as identified by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    RunInput,
    Trajectory,
    Energy,
    CompressedTrajectory,
    Matrix,
    Checkpoint,
    RunInputText,
    Coordinates,
    ProteinDataBank,
    RunInputBinary,
    NativeTrajectory,
    Log,
    XyPlot,
    Index,
    Parameters,
    Topology,
    TopologyInclude,
    Data,
    Other,
}

static EXTENSION_TYPES: Map<&'static str, FileType> = phf_map! {
    "tpr" => FileType::RunInput,
    "trr" => FileType::Trajectory,
    "edr" => FileType::Energy,
    "xtc" => FileType::CompressedTrajectory,
    "mtx" => FileType::Matrix,
    "cpt" => FileType::Checkpoint,
    "tpa" => FileType::RunInputText,
    "gro" => FileType::Coordinates,
    "pdb" => FileType::ProteinDataBank,
    "tpb" => FileType::RunInputBinary,
    "trj" => FileType::NativeTrajectory,
    "log" => FileType::Log,
    "xvg" => FileType::XyPlot,
    "ndx" => FileType::Index,
    "mdp" => FileType::Parameters,
    "top" => FileType::Topology,
    "itp" => FileType::TopologyInclude,
    "dat" => FileType::Data,
};

impl FileType {
    /// Looks up the file type for a path by its extension (case-insensitive).
    ///
    /// Unknown or missing extensions map to [`FileType::Other`].
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileType::Other)
    }

    pub fn from_extension(extension: &str) -> Self {
        let lowered = extension.trim_start_matches('.').to_ascii_lowercase();
        EXTENSION_TYPES
            .get(lowered.as_str())
            .copied()
            .unwrap_or(FileType::Other)
    }

    /// The codec family for this type, or `None` when the type is only ever
    /// handled as free-form text and cannot take part in item transfers.
    pub fn category(self) -> Option<FormatCategory> {
        match self {
            FileType::RunInput
            | FileType::Trajectory
            | FileType::Energy
            | FileType::CompressedTrajectory
            | FileType::Matrix
            | FileType::Checkpoint => Some(FormatCategory::CanonicalBinary),
            FileType::RunInputText | FileType::Coordinates | FileType::ProteinDataBank => {
                Some(FormatCategory::Text)
            }
            FileType::RunInputBinary | FileType::NativeTrajectory => {
                Some(FormatCategory::NativeBinary)
            }
            FileType::Log
            | FileType::XyPlot
            | FileType::Index
            | FileType::Parameters
            | FileType::Topology
            | FileType::TopologyInclude
            | FileType::Data
            | FileType::Other => None,
        }
    }

    pub fn is_binary(self) -> bool {
        self.category().is_some_and(FormatCategory::is_binary)
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileType::RunInput => "tpr",
            FileType::Trajectory => "trr",
            FileType::Energy => "edr",
            FileType::CompressedTrajectory => "xtc",
            FileType::Matrix => "mtx",
            FileType::Checkpoint => "cpt",
            FileType::RunInputText => "tpa",
            FileType::Coordinates => "gro",
            FileType::ProteinDataBank => "pdb",
            FileType::RunInputBinary => "tpb",
            FileType::NativeTrajectory => "trj",
            FileType::Log => "log",
            FileType::XyPlot => "xvg",
            FileType::Index => "ndx",
            FileType::Parameters => "mdp",
            FileType::Topology => "top",
            FileType::TopologyInclude => "itp",
            FileType::Data => "dat",
            FileType::Other => "",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Other => write!(f, "other"),
            known => write!(f, ".{}", known.extension()),
        }
    }
}
