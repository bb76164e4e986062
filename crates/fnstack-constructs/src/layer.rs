// Layer builder
//
// A layer is a single ESM module published under the `@layer/<name>` scope
// so functions can import it by package name. Bundling runs synchronously
// at synth time; the layer version is declared from the bundled directory
// only after the bundle and its manifest are on disk.

use crate::error::ConstructError;
use crate::Result;
use fnstack_config::LayerConfig;
use fnstack_core::intrinsic::reference;
use fnstack_core::{logical_id, Asset, CfnResource, ConstructNode, Stack};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Entry files looked up in a layer's source directory, in order
pub const ENTRY_FILES: [&str; 4] = ["index.ts", "index.mts", "index.mjs", "index.js"];

/// Makes `require` usable from the ESM bundle
pub const REQUIRE_BANNER: &str =
    "import { createRequire } from 'module'; const require = createRequire(import.meta.url);";

/// Provided by the runtime or by other layers
pub const EXTERNAL_MODULES: [&str; 3] = ["@aws-sdk/*", "aws-lambda", "@layer/*"];

pub const MANIFEST_VERSION: &str = "0.0.1";
pub const MODULE_FILE: &str = "index.mjs";

/// `package.json` written next to the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerManifest {
    pub name: String,
    pub version: String,
    pub main: String,
}

impl LayerManifest {
    pub fn for_layer(name: &str) -> Self {
        Self {
            name: format!("@layer/{}", name),
            version: MANIFEST_VERSION.to_string(),
            main: MODULE_FILE.to_string(),
        }
    }
}

/// One bundling job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub entry: PathBuf,
    pub outfile: PathBuf,
    pub target: String,
    pub banner: String,
    pub externals: Vec<String>,
    pub minify: bool,
}

/// Turns a layer entry file into a single bundled module
pub trait Bundler {
    fn bundle(&self, request: &BundleRequest) -> std::result::Result<(), String>;
}

/// Bundles with the esbuild executable
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    program: PathBuf,
}

impl EsbuildBundler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(request: &BundleRequest) -> Vec<String> {
        let mut args = vec![
            request.entry.display().to_string(),
            "--bundle".to_string(),
            format!("--outfile={}", request.outfile.display()),
            "--format=esm".to_string(),
            "--platform=node".to_string(),
            format!("--target={}", request.target),
            "--main-fields=module,main".to_string(),
            format!("--banner:js={}", request.banner),
        ];
        if request.minify {
            args.push("--minify".to_string());
        }
        args.extend(request.externals.iter().map(|e| format!("--external:{}", e)));
        args
    }
}

impl Bundler for EsbuildBundler {
    fn bundle(&self, request: &BundleRequest) -> std::result::Result<(), String> {
        debug!(program = %self.program.display(), entry = %request.entry.display(), "running esbuild");
        let output = Command::new(&self.program)
            .args(Self::args(request))
            .output()
            .map_err(|e| format!("failed to run {}: {}", self.program.display(), e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            ));
        }
        Ok(())
    }
}

/// Handle to a built layer
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub logical_id: String,
    /// Directory published as the layer content
    pub content_dir: PathBuf,
    pub module_dir: PathBuf,
    pub manifest: LayerManifest,
    pub asset: Asset,
}

impl Layer {
    /// `Ref` of a layer version resolves to its ARN
    pub fn arn(&self) -> Value {
        reference(&self.logical_id)
    }
}

pub struct LayerBuilder<'a> {
    config: &'a LayerConfig,
    bundler: &'a dyn Bundler,
}

impl<'a> LayerBuilder<'a> {
    pub fn new(config: &'a LayerConfig, bundler: &'a dyn Bundler) -> Self {
        Self { config, bundler }
    }

    /// Layer names found under the source directory, sorted
    pub fn discover(&self) -> Result<Vec<String>> {
        let dir = &self.config.source_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(ConstructError::io(dir))? {
            let entry = entry.map_err(ConstructError::io(dir))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn build(&self, stack: &mut Stack, id: &str, name: &str) -> Result<Layer> {
        let source = self.config.source_dir.join(name);
        let entry = find_entry(&source).ok_or_else(|| ConstructError::LayerEntryNotFound {
            layer: name.to_string(),
            dir: source.clone(),
        })?;

        let content_dir = self.config.out_dir.join(name);
        let module_dir = content_dir
            .join("nodejs")
            .join("node_modules")
            .join("@layer")
            .join(name);
        fs::create_dir_all(&module_dir).map_err(ConstructError::io(&module_dir))?;

        let request = BundleRequest {
            entry,
            outfile: module_dir.join(MODULE_FILE),
            target: self.config.node_target.clone(),
            banner: REQUIRE_BANNER.to_string(),
            externals: EXTERNAL_MODULES.iter().map(|e| e.to_string()).collect(),
            minify: true,
        };
        self.bundler
            .bundle(&request)
            .map_err(|message| ConstructError::Bundle {
                layer: name.to_string(),
                message,
            })?;

        let manifest = LayerManifest::for_layer(name);
        let manifest_path = module_dir.join("package.json");
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
            .map_err(ConstructError::io(&manifest_path))?;

        let asset = Asset::directory(&content_dir)?;
        let content = stack.add_asset(asset.clone());

        let layer_logical_id = logical_id(&[id]);
        let runtimes: Vec<&str> = self
            .config
            .compatible_runtimes
            .iter()
            .map(|r| r.as_str())
            .collect();
        let architectures: Vec<&str> = self
            .config
            .compatible_architectures
            .iter()
            .map(|a| a.as_str())
            .collect();
        let resource = CfnResource::new(&layer_logical_id, "AWS::Lambda::LayerVersion")
            .with_property("Content", content)
            .with_property("CompatibleRuntimes", json!(runtimes))
            .with_property("CompatibleArchitectures", json!(architectures));
        stack.add(ConstructNode::fronting(id, resource))?;

        info!(layer = %name, id = %id, hash = %asset.hash, "layer bundled");
        Ok(Layer {
            id: id.to_string(),
            name: name.to_string(),
            logical_id: layer_logical_id,
            content_dir,
            module_dir,
            manifest,
            asset,
        })
    }
}

fn find_entry(dir: &Path) -> Option<PathBuf> {
    ENTRY_FILES
        .iter()
        .map(|file| dir.join(file))
        .find(|path| path.is_file())
}
