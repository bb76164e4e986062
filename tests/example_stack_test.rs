// End-to-end synthesis of the example stack
//
// Layers are bundled by a fake that writes a stub module, so no node
// toolchain is needed.

use fnstack::example_stack::{AUTHORIZER_LAYER, DISCORD_PONG, PUBLIC_KEY_ENV, RETURN_200};
use fnstack::{synth, ExampleStack};
use fnstack_config::StackConfig;
use fnstack_constructs::{BundleRequest, Bundler};
use fnstack_core::{AssetPackaging, RemovalPolicy};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct StubBundler;

impl Bundler for StubBundler {
    fn bundle(&self, request: &BundleRequest) -> Result<(), String> {
        fs::write(&request.outfile, "export const verify = () => true;\n")
            .map_err(|e| e.to_string())
    }
}

fn config(root: &Path) -> StackConfig {
    let mut config = StackConfig::default();
    config.layers.source_dir = root.join("layers");
    config.layers.out_dir = root.join("out");
    config
}

fn with_authorizer_layer(root: &Path) {
    let dir = root.join("layers").join(AUTHORIZER_LAYER);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("index.mjs"), "export const verify = () => true;\n").unwrap();
}

fn tags(resource: &Value) -> Vec<(String, String)> {
    resource["Properties"]["Tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            (
                t["Key"].as_str().unwrap().to_string(),
                t["Value"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[test]
fn builds_both_functions_with_the_authorizer_layer() {
    let tmp = TempDir::new().unwrap();
    with_authorizer_layer(tmp.path());
    let config = config(tmp.path());

    let example = ExampleStack::build(&config, &StubBundler).unwrap();
    let template = example.stack.synth().unwrap();

    assert_eq!(example.layers.len(), 1);
    let layer = &example.layers[AUTHORIZER_LAYER];
    assert_eq!(layer.id, "discord-authorizer-layer");
    assert!(template.resource(&layer.logical_id).is_some());

    let pong = &example.functions[0];
    let lambda = template.resource(&pong.logical_id).unwrap();
    assert_eq!(
        lambda["Properties"]["Description"],
        json!("A lambda example with a layer to answer to discord bot interaction with pong")
    );
    let layers = lambda["Properties"]["Layers"].as_array().unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[1], json!({ "Ref": layer.logical_id }));

    let env = &lambda["Properties"]["Environment"]["Variables"];
    assert_eq!(env["TEST_1"], json!("test Value 1"));
    assert!(env.get("PARAM_DB_USER").is_some());
    assert!(env.get(PUBLIC_KEY_ENV).is_none());

    let ret = &example.functions[1];
    assert_eq!(ret.id, RETURN_200);
    let lambda = template.resource(&ret.logical_id).unwrap();
    assert_eq!(lambda["Properties"]["Description"], json!("always return 200"));
    assert_eq!(lambda["Properties"]["Layers"].as_array().unwrap().len(), 1);
}

#[test]
fn functions_are_packaged_from_their_own_binaries() {
    let tmp = TempDir::new().unwrap();
    let example = ExampleStack::build(&config(tmp.path()), &StubBundler).unwrap();

    let binaries: Vec<_> = example
        .functions
        .iter()
        .map(|f| match &f.asset.packaging {
            AssetPackaging::CargoBinary { bundling } => bundling.binary.clone().unwrap(),
            other => panic!("unexpected packaging {:?}", other),
        })
        .collect();
    assert_eq!(binaries, [DISCORD_PONG, RETURN_200]);
}

#[test]
fn function_arns_are_exported() {
    let tmp = TempDir::new().unwrap();
    let example = ExampleStack::build(&config(tmp.path()), &StubBundler).unwrap();
    let template = example.stack.synth().unwrap();

    assert_eq!(
        template.outputs.keys().collect::<Vec<_>>(),
        ["DiscordPongArn", "Return200Arn"]
    );
    assert_eq!(
        template.outputs["DiscordPongArn"],
        json!({ "Value": { "Fn::GetAtt": [example.functions[0].logical_id, "Arn"] } })
    );
    assert_eq!(
        template.outputs["Return200Arn"]["Value"],
        example.functions[1].arn()
    );
}

#[test]
fn missing_layer_dir_still_builds_functions() {
    let tmp = TempDir::new().unwrap();
    let example = ExampleStack::build(&config(tmp.path()), &StubBundler).unwrap();
    assert!(example.layers.is_empty());

    let template = example.stack.synth().unwrap();
    assert_eq!(
        template
            .resources_of_type("AWS::Lambda::Function")
            .count(),
        2
    );
}

#[test]
fn aspect_tags_and_retains_resources() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(tmp.path());
    config.aspect.removal_policy = RemovalPolicy::Retain;

    let example = ExampleStack::build(&config, &StubBundler).unwrap();
    let template = example.stack.synth().unwrap();

    let pong = &example.functions[0];
    let role = template.resource(&pong.role_logical_id).unwrap();
    let role_tags = tags(role);
    assert!(role_tags.contains(&("resource:type".into(), "AWS::IAM::Role".into())));
    assert!(role_tags.contains(&("x-app".into(), "SampleApp".into())));
    assert_eq!(role["DeletionPolicy"], json!("Retain"));

    let lambda = template.resource(&pong.logical_id).unwrap();
    assert!(tags(lambda).contains(&("resource:type".into(), "AWS::Lambda::Function".into())));
    assert_eq!(lambda["DeletionPolicy"], json!("Retain"));
}

#[test]
fn configured_tags_replace_the_app_tag() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(tmp.path());
    config
        .aspect
        .tags
        .insert("team".to_string(), "bots".to_string());

    let example = ExampleStack::build(&config, &StubBundler).unwrap();
    let template = example.stack.synth().unwrap();

    let role = template
        .resource(&example.functions[1].role_logical_id)
        .unwrap();
    let role_tags = tags(role);
    assert!(role_tags.contains(&("x-team".into(), "bots".into())));
    assert!(!role_tags.iter().any(|(k, _)| k == "x-app"));
}

#[test]
fn public_key_is_passed_to_the_responder() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(tmp.path());
    config.stack.public_key = Some("ab".repeat(32));

    let example = ExampleStack::build(&config, &StubBundler).unwrap();
    let template = example.stack.synth().unwrap();

    let pong = template
        .resource(&example.functions[0].logical_id)
        .unwrap();
    assert_eq!(
        pong["Properties"]["Environment"]["Variables"][PUBLIC_KEY_ENV],
        json!("ab".repeat(32))
    );
    let ret = template
        .resource(&example.functions[1].logical_id)
        .unwrap();
    assert!(ret["Properties"]["Environment"]["Variables"]
        .get(PUBLIC_KEY_ENV)
        .is_none());
}

#[test]
fn synth_writes_template_and_asset_manifest() {
    let tmp = TempDir::new().unwrap();
    with_authorizer_layer(tmp.path());
    let example = ExampleStack::build(&config(tmp.path()), &StubBundler).unwrap();
    let template = example.stack.synth().unwrap();

    let out = tmp.path().join("cdk.out");
    synth::write_assembly(&out, &template, example.stack.assets()).unwrap();

    let written: Value =
        serde_json::from_str(&fs::read_to_string(out.join(synth::TEMPLATE_FILE)).unwrap())
            .unwrap();
    assert_eq!(written["AWSTemplateFormatVersion"], json!("2010-09-09"));
    assert!(written["Parameters"].get("AssetsBucket").is_some());

    let assets = synth::read_assets(&out).unwrap();
    assert_eq!(assets.len(), 3);
}
