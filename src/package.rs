// Asset packaging
//
// Cargo-binary assets are compiled for their Lambda target and zipped as a
// single executable `bootstrap` entry. Directory assets (layers) are zipped
// with their tree intact. Each zip is named after the asset hash so it
// matches the `S3Key` in the template.

use anyhow::{bail, Context, Result};
use fnstack_core::{Asset, AssetPackaging, BundlingOptions};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const BOOTSTRAP: &str = "bootstrap";

/// Build and zip every asset into `output_dir`
pub fn package_assets(assets: &[Asset], output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(assets.len());
    for asset in assets {
        let zip_path = output_dir.join(asset.object_key());
        match &asset.packaging {
            AssetPackaging::CargoBinary { bundling } => {
                let binary = build_binary(bundling)?;
                zip_binary(&binary, &zip_path)?;
            }
            AssetPackaging::Directory { path } => {
                zip_directory(path, &zip_path)?;
            }
        }
        info!(hash = %asset.hash, zip = %zip_path.display(), "packaged asset");
        written.push(zip_path);
    }
    Ok(written)
}

/// Arguments passed to `cargo` for a cargo-binary asset
pub fn cargo_build_args(bundling: &BundlingOptions) -> Result<Vec<String>> {
    let (Some(package), Some(binary)) = (&bundling.package, &bundling.binary) else {
        bail!("cargo-binary asset needs both a package and a binary: {:?}", bundling);
    };

    let mut args = vec![
        "build".to_string(),
        "-p".to_string(),
        package.clone(),
        "--bin".to_string(),
        binary.clone(),
    ];
    if let Some(target) = &bundling.target {
        args.push("--target".to_string());
        args.push(target.clone());
    }
    if bundling.release.unwrap_or(false) {
        args.push("--release".to_string());
    }
    if let Some(features) = bundling.features.as_ref().filter(|f| !f.is_empty()) {
        args.push("--features".to_string());
        args.push(features.join(","));
    }
    if let Some(extra) = &bundling.cargo_args {
        args.extend(extra.iter().cloned());
    }
    Ok(args)
}

/// Where cargo leaves the binary for `bundling`
pub fn binary_path(target_dir: &Path, bundling: &BundlingOptions) -> Option<PathBuf> {
    let binary = bundling.binary.as_ref()?;
    let profile = if bundling.release.unwrap_or(false) {
        "release"
    } else {
        "debug"
    };
    let mut dir = target_dir.to_path_buf();
    if let Some(target) = &bundling.target {
        dir.push(target);
    }
    Some(dir.join(profile).join(binary))
}

fn build_binary(bundling: &BundlingOptions) -> Result<PathBuf> {
    let args = cargo_build_args(bundling)?;
    info!(command = %format!("cargo {}", args.join(" ")), "building function binary");

    let status = Command::new("cargo")
        .args(&args)
        .status()
        .context("Failed to execute cargo")?;
    if !status.success() {
        bail!("cargo {} failed with {}", args.join(" "), status);
    }

    let target_dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target"));
    let path = binary_path(&target_dir, bundling)
        .with_context(|| format!("No binary named in bundling options: {:?}", bundling))?;
    if !path.is_file() {
        bail!("Expected lambda binary at '{}'", path.display());
    }
    Ok(path)
}

/// Zip `binary` as an executable `bootstrap` entry
pub fn zip_binary(binary: &Path, zip_path: &Path) -> Result<()> {
    let content =
        fs::read(binary).with_context(|| format!("Failed to read {}", binary.display()))?;
    let file = fs::File::create(zip_path)
        .with_context(|| format!("Failed to create {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file(BOOTSTRAP, options)?;
    zip.write_all(&content)?;
    zip.finish()?;
    Ok(())
}

/// Zip the tree under `dir`, entry names relative to it
pub fn zip_directory(dir: &Path, zip_path: &Path) -> Result<()> {
    let file = fs::File::create(zip_path)
        .with_context(|| format!("Failed to create {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    add_tree(&mut zip, dir, dir, options)?;
    zip.finish()?;
    Ok(())
}

fn add_tree(
    zip: &mut ZipWriter<fs::File>,
    root: &Path,
    dir: &Path,
    options: FileOptions,
) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry_name(root, &path)?;
        if path.is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
            add_tree(zip, root, &path, options)?;
        } else {
            debug!(entry = %name, "adding file");
            zip.start_file(name, options)?;
            zip.write_all(&fs::read(&path)?)?;
        }
    }
    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn bundling() -> BundlingOptions {
        BundlingOptions {
            package: Some("fnstack-lambda".into()),
            binary: Some("discord-pong".into()),
            release: Some(true),
            target: Some("aarch64-unknown-linux-gnu".into()),
            features: None,
            cargo_args: None,
        }
    }

    #[test]
    fn test_cargo_build_args() {
        let args = cargo_build_args(&bundling()).unwrap();
        assert_eq!(
            args,
            [
                "build",
                "-p",
                "fnstack-lambda",
                "--bin",
                "discord-pong",
                "--target",
                "aarch64-unknown-linux-gnu",
                "--release"
            ]
        );
    }

    #[test]
    fn test_cargo_build_args_with_features() {
        let mut options = bundling();
        options.release = Some(false);
        options.features = Some(vec!["a".into(), "b".into()]);
        options.cargo_args = Some(vec!["--locked".into()]);
        let args = cargo_build_args(&options).unwrap();
        assert!(!args.contains(&"--release".to_string()));
        assert!(args.ends_with(&[
            "--features".to_string(),
            "a,b".to_string(),
            "--locked".to_string()
        ]));
    }

    #[test]
    fn test_cargo_build_args_requires_binary() {
        let options = BundlingOptions {
            package: Some("fnstack-lambda".into()),
            ..Default::default()
        };
        assert!(cargo_build_args(&options).is_err());
    }

    #[test]
    fn test_binary_path() {
        let path = binary_path(Path::new("target"), &bundling()).unwrap();
        assert_eq!(
            path,
            Path::new("target/aarch64-unknown-linux-gnu/release/discord-pong")
        );
    }

    #[test]
    fn test_zip_binary_has_bootstrap_entry() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("discord-pong");
        fs::write(&binary, b"\x7fELF").unwrap();
        let zip_path = dir.path().join("fn.zip");

        zip_binary(&binary, &zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_name(BOOTSTRAP).unwrap();
        assert_eq!(entry.unix_mode().map(|m| m & 0o777), Some(0o755));
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"\x7fELF");
    }

    #[test]
    fn test_zip_directory_keeps_layout() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("layer");
        let module = content.join("nodejs/node_modules/@layer/auth");
        fs::create_dir_all(&module).unwrap();
        fs::write(module.join("index.mjs"), "export {}").unwrap();
        fs::write(module.join("package.json"), "{}").unwrap();
        let zip_path = dir.path().join("layer.zip");

        zip_directory(&content, &zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
        assert!(archive
            .by_name("nodejs/node_modules/@layer/auth/index.mjs")
            .is_ok());
        assert!(archive
            .by_name("nodejs/node_modules/@layer/auth/package.json")
            .is_ok());
    }
}
