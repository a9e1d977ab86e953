//! Case output directory.

use crate::naming::CaseKey;
use crate::table::Table;
use crate::types::RunManifest;
use crate::{ResultsError, ResultsResult};
use ff_oned::SolutionSnapshot;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything written for one case.
pub struct CaseOutputs<'a> {
    pub gap_voltage: &'a Table,
    pub profile: &'a Table,
    pub snapshot: &'a SolutionSnapshot,
    pub manifest: &'a RunManifest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFiles {
    pub gap_voltage: PathBuf,
    pub profile: PathBuf,
    pub snapshot: PathBuf,
    pub manifest: PathBuf,
}

/// Flat directory of case outputs, named by [`CaseKey`].
#[derive(Clone, Debug)]
pub struct CaseStore {
    root_dir: PathBuf,
}

impl CaseStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root_dir.join(file_name)
    }

    pub fn has_case(&self, key: &CaseKey) -> bool {
        self.path(&key.profile_csv()).exists()
    }

    /// Write both tables, the snapshot and the manifest. Existing files are
    /// truncated.
    pub fn save_case(&self, key: &CaseKey, outputs: &CaseOutputs<'_>) -> ResultsResult<WrittenFiles> {
        let files = WrittenFiles {
            gap_voltage: self.path(&key.gap_voltage_csv()),
            profile: self.path(&key.profile_csv()),
            snapshot: self.path(&key.snapshot_json()),
            manifest: self.path(&key.manifest_json()),
        };

        outputs.gap_voltage.write(&files.gap_voltage)?;
        outputs.profile.write(&files.profile)?;

        let snapshot_json = serde_json::to_string_pretty(outputs.snapshot)?;
        fs::write(&files.snapshot, snapshot_json)?;

        let manifest_json = serde_json::to_string_pretty(outputs.manifest)?;
        fs::write(&files.manifest, manifest_json)?;

        Ok(files)
    }

    fn existing(&self, file_name: String) -> ResultsResult<PathBuf> {
        let path = self.path(&file_name);
        if !path.exists() {
            return Err(ResultsError::CaseNotFound { name: file_name });
        }
        Ok(path)
    }

    pub fn load_manifest(&self, key: &CaseKey) -> ResultsResult<RunManifest> {
        let path = self.existing(key.manifest_json())?;
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_snapshot(&self, key: &CaseKey) -> ResultsResult<SolutionSnapshot> {
        let path = self.existing(key.snapshot_json())?;
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_profile(&self, key: &CaseKey) -> ResultsResult<Table> {
        Table::read(&self.existing(key.profile_csv())?)
    }

    pub fn load_gap_voltage(&self, key: &CaseKey) -> ResultsResult<Table> {
        Table::read(&self.existing(key.gap_voltage_csv())?)
    }

    /// Every manifest in the directory, ordered by equivalence ratio then field.
    pub fn list_cases(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("manifest_") && name.ends_with(".json") {
                let content = fs::read_to_string(entry.path())?;
                if let Ok(manifest) = serde_json::from_str::<RunManifest>(&content) {
                    runs.push(manifest);
                }
            }
        }
        runs.sort_by(|a, b| {
            a.phi
                .total_cmp(&b.phi)
                .then_with(|| a.e_field.total_cmp(&b.e_field))
        });
        Ok(runs)
    }
}
