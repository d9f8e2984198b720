use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    config::DegreePair,
    error::{Error, Result},
    proof_search::LeafSystem,
};

/// Writes `bytes` beside `path` first and renames the file into place, so a
/// failed run never leaves a truncated `path` behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveHeader {
    pub magic: [u8; 8],
    pub version: u32,
}

impl ArchiveHeader {
    pub const MAGIC: [u8; 8] = *b"ZEROONE\0";
    pub const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version == Self::VERSION
    }
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Every leaf system of one degree pair, in bincode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafArchive {
    pub header: ArchiveHeader,
    pub degrees: DegreePair,
    pub leaves: Vec<LeafSystem>,
}

impl LeafArchive {
    pub fn new(degrees: DegreePair, leaves: Vec<LeafSystem>) -> Self {
        Self {
            header: ArchiveHeader::new(),
            degrees,
            leaves,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn write_to(&self, out: &mut impl Write) -> Result<()> {
        bincode::serialize_into(out, self)?;
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header: ArchiveHeader = bincode::deserialize(bytes)?;
        if !header.is_valid() {
            return Err(Error::IncompatibleArchive);
        }
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn save_atomic(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes()?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::SolverConfig,
        proof_search::{collect_leaves, search, CaseId},
        system::EquationSystem,
    };

    fn leaves() -> Vec<LeafSystem> {
        let system = EquationSystem::from_parts(
            vec![1, 2],
            vec![1],
            vec![],
            vec![],
            vec!["p_1".parse().unwrap(), "p_2 + q_1".parse().unwrap()],
        );
        collect_leaves(search(system, SolverConfig::default()))
            .unwrap()
            .leaves
    }

    #[test]
    fn write_atomic_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("data/ZeroOneEquations_0004_0002.txt")),
            PathBuf::from("data/ZeroOneEquations_0004_0002.txt.tmp")
        );
    }

    #[test]
    fn archive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaves.bin");
        let archive = LeafArchive::new(DegreePair::new(4, 2).unwrap(), leaves());
        assert_eq!(archive.leaves.len(), 2);
        assert_eq!(archive.leaves[1].case, CaseId::root().child(true).child(true));

        archive.save_atomic(&path).unwrap();

        assert_eq!(LeafArchive::load(&path).unwrap(), archive);
    }

    #[test]
    fn archive_with_foreign_magic_is_rejected() {
        let mut archive = LeafArchive::new(DegreePair::new(3, 1).unwrap(), vec![]);
        archive.header.magic = *b"SOMEFILE";
        let bytes = archive.to_bytes().unwrap();
        assert!(matches!(
            LeafArchive::from_bytes(&bytes),
            Err(Error::IncompatibleArchive)
        ));
    }

    #[test]
    fn archive_with_zero_degrees_is_rejected() {
        let raw = (ArchiveHeader::new(), (0u16, 0u16), Vec::<LeafSystem>::new());
        let bytes = bincode::serialize(&raw).unwrap();
        assert!(matches!(
            LeafArchive::from_bytes(&bytes),
            Err(Error::Bincode(_))
        ));
    }

    #[test]
    fn archive_with_newer_version_is_rejected() {
        let mut archive = LeafArchive::new(DegreePair::new(3, 1).unwrap(), vec![]);
        archive.header.version += 1;
        let mut bytes = Vec::new();
        archive.write_to(&mut bytes).unwrap();
        assert!(matches!(
            LeafArchive::from_bytes(&bytes),
            Err(Error::IncompatibleArchive)
        ));
    }
}
