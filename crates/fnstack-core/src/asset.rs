// Deployable assets
//
// An asset is content-addressed: its BLAKE3 hash names the zip uploaded to
// the assets bucket, so unchanged code keeps the same S3 key between synths
// and any change to the sources or build options yields a new one.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Build output and VCS metadata never feed an asset hash
const SKIPPED_DIRS: [&str; 2] = ["target", ".git"];

/// Template parameter naming the bucket assets are uploaded to
pub const ASSETS_BUCKET_PARAMETER: &str = "AssetsBucket";

/// Cargo build options for a function binary
///
/// Every field is optional so layers of options can be overlaid key by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlingOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_args: Option<Vec<String>>,
}

impl BundlingOptions {
    /// Shallow merge: each key set in `upper` wins, unset keys fall through
    pub fn overlay(self, upper: BundlingOptions) -> BundlingOptions {
        BundlingOptions {
            package: upper.package.or(self.package),
            binary: upper.binary.or(self.binary),
            release: upper.release.or(self.release),
            target: upper.target.or(self.target),
            features: upper.features.or(self.features),
            cargo_args: upper.cargo_args.or(self.cargo_args),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "packaging", rename_all = "kebab-case")]
pub enum AssetPackaging {
    /// A `bootstrap` binary built by cargo
    CargoBinary { bundling: BundlingOptions },
    /// A directory zipped as-is
    Directory { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub hash: String,
    #[serde(flatten)]
    pub packaging: AssetPackaging,
}

impl Asset {
    /// Hash covers the build options plus every file under `sources`
    /// (crate directories, `Cargo.lock`). A missing source only contributes
    /// its path.
    pub fn cargo_binary(
        bundling: BundlingOptions,
        sources: &[PathBuf],
    ) -> Result<Self, CoreError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&serde_json::to_vec(&bundling)?);
        for source in sources {
            hasher.update(source.to_string_lossy().as_bytes());
            if source.is_dir() {
                hash_tree(source, source, &mut hasher)?;
            } else if source.is_file() {
                hash_file(source, source, &mut hasher)?;
            } else {
                warn!(path = %source.display(), "asset source not found, hashing its path only");
            }
        }
        Ok(Self {
            hash: hasher.finalize().to_hex().to_string(),
            packaging: AssetPackaging::CargoBinary { bundling },
        })
    }

    pub fn directory(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let mut hasher = blake3::Hasher::new();
        hash_tree(&path, &path, &mut hasher)?;
        Ok(Self {
            hash: hasher.finalize().to_hex().to_string(),
            packaging: AssetPackaging::Directory { path },
        })
    }

    pub fn object_key(&self) -> String {
        format!("{}.zip", self.hash)
    }

    /// `Code` / `Content` property pointing at the uploaded zip
    pub fn s3_location(&self) -> Value {
        json!({
            "S3Bucket": { "Ref": ASSETS_BUCKET_PARAMETER },
            "S3Key": self.object_key(),
        })
    }
}

fn hash_tree(root: &Path, dir: &Path, hasher: &mut blake3::Hasher) -> Result<(), CoreError> {
    let io_err = |source: std::io::Error| CoreError::AssetIo {
        path: dir.display().to_string(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if SKIPPED_DIRS.iter().any(|skip| entry.file_name() == *skip) {
                continue;
            }
            hash_tree(root, &path, hasher)?;
        } else {
            hash_file(root, &path, hasher)?;
        }
    }
    Ok(())
}

fn hash_file(root: &Path, path: &Path, hasher: &mut blake3::Hasher) -> Result<(), CoreError> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    hasher.update(relative.to_string_lossy().as_bytes());
    let content = fs::read(path).map_err(|source| CoreError::AssetIo {
        path: path.display().to_string(),
        source,
    })?;
    hasher.update(&content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_is_key_wise() {
        let base = BundlingOptions {
            package: Some("fnstack-lambda".into()),
            release: Some(false),
            ..Default::default()
        };
        let upper = BundlingOptions {
            release: Some(true),
            features: Some(vec!["tls".into()]),
            ..Default::default()
        };
        let merged = base.overlay(upper);
        assert_eq!(merged.package.as_deref(), Some("fnstack-lambda"));
        assert_eq!(merged.release, Some(true));
        assert_eq!(merged.features, Some(vec!["tls".to_string()]));
    }

    #[test]
    fn test_cargo_asset_hash_tracks_options() {
        let a = Asset::cargo_binary(
            BundlingOptions {
                binary: Some("return-200".into()),
                ..Default::default()
            },
            &[],
        )
        .unwrap();
        let b = Asset::cargo_binary(
            BundlingOptions {
                binary: Some("discord-pong".into()),
                ..Default::default()
            },
            &[],
        )
        .unwrap();
        assert_ne!(a.hash, b.hash);
        assert_eq!(a.object_key(), format!("{}.zip", a.hash));
    }

    #[test]
    fn test_cargo_asset_hash_tracks_source_content() {
        let dir = tempfile::tempdir().unwrap();
        let crate_dir = dir.path().join("handler");
        fs::create_dir_all(crate_dir.join("src")).unwrap();
        fs::create_dir_all(crate_dir.join("target/debug")).unwrap();
        fs::write(crate_dir.join("src/main.rs"), "fn main() {}").unwrap();
        let lock = dir.path().join("Cargo.lock");
        fs::write(&lock, "version = 3").unwrap();
        let sources = vec![crate_dir.clone(), lock.clone()];
        let options = BundlingOptions {
            binary: Some("discord-pong".into()),
            ..Default::default()
        };

        let first = Asset::cargo_binary(options.clone(), &sources).unwrap();
        fs::write(crate_dir.join("target/debug/discord-pong"), "stale").unwrap();
        let rebuilt = Asset::cargo_binary(options.clone(), &sources).unwrap();
        assert_eq!(first.hash, rebuilt.hash);

        fs::write(crate_dir.join("src/main.rs"), "fn main() { run() }").unwrap();
        let edited = Asset::cargo_binary(options.clone(), &sources).unwrap();
        assert_ne!(first.object_key(), edited.object_key());

        fs::write(&lock, "version = 4").unwrap();
        let relocked = Asset::cargo_binary(options, &sources).unwrap();
        assert_ne!(edited.hash, relocked.hash);
    }

    #[test]
    fn test_directory_hash_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nodejs")).unwrap();
        fs::write(dir.path().join("nodejs/index.mjs"), "export const a = 1;").unwrap();
        let first = Asset::directory(dir.path()).unwrap();
        let again = Asset::directory(dir.path()).unwrap();
        assert_eq!(first.hash, again.hash);

        fs::write(dir.path().join("nodejs/index.mjs"), "export const a = 2;").unwrap();
        let changed = Asset::directory(dir.path()).unwrap();
        assert_ne!(first.hash, changed.hash);
    }

    #[test]
    fn test_manifest_shape() {
        let asset = Asset {
            hash: "abc".into(),
            packaging: AssetPackaging::Directory {
                path: PathBuf::from("out/foo"),
            },
        };
        let value = serde_json::to_value(&asset).unwrap();
        assert_eq!(value["hash"], json!("abc"));
        assert_eq!(value["packaging"], json!("directory"));
        assert_eq!(value["path"], json!("out/foo"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let err = Asset::directory("/definitely/not/here").unwrap_err();
        assert!(matches!(err, CoreError::AssetIo { .. }));
    }
}
