use anyhow::{Context, Result};
use fnstack_core::{Asset, Template};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TEMPLATE_FILE: &str = "template.json";
pub const ASSETS_FILE: &str = "assets.json";

/// Paths written by [`write_assembly`]
#[derive(Debug)]
pub struct Assembly {
    pub template: PathBuf,
    pub assets: PathBuf,
}

/// Write the template and asset manifest into `dir`, creating it if needed
pub fn write_assembly(dir: &Path, template: &Template, assets: &[Asset]) -> Result<Assembly> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let template_path = dir.join(TEMPLATE_FILE);
    fs::write(&template_path, template.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", template_path.display()))?;

    let assets_path = dir.join(ASSETS_FILE);
    fs::write(&assets_path, serde_json::to_string_pretty(assets)?)
        .with_context(|| format!("Failed to write {}", assets_path.display()))?;

    info!(
        template = %template_path.display(),
        resources = template.resources.len(),
        assets = assets.len(),
        "wrote cloud assembly"
    );
    Ok(Assembly {
        template: template_path,
        assets: assets_path,
    })
}

/// Read the asset manifest written by a previous synth
pub fn read_assets(dir: &Path) -> Result<Vec<Asset>> {
    let path = dir.join(ASSETS_FILE);
    let content = fs::read_to_string(&path).with_context(|| {
        format!(
            "Failed to read {} (run `fnstack synth` first)",
            path.display()
        )
    })?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnstack_core::BundlingOptions;

    #[test]
    fn assembly_round_trips_assets() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cdk.out");
        let asset = Asset::cargo_binary(
            BundlingOptions {
                package: Some("fnstack-lambda".into()),
                binary: Some("return-200".into()),
                ..Default::default()
            },
            &[],
        )
        .unwrap();

        let assembly = write_assembly(&out, &Template::new(None), &[asset.clone()]).unwrap();
        assert!(assembly.template.is_file());
        assert_eq!(read_assets(&out).unwrap(), vec![asset]);
    }

    #[test]
    fn missing_manifest_mentions_synth() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_assets(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("fnstack synth"));
    }
}
