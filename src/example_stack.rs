// Example stack
//
// Every directory under the layer source dir becomes a layer, then two
// functions are declared: `discord-pong`, which answers signed chat
// interactions through the `discord-authorizer` layer, and `return-200`.
// Both function ARNs are exported as stack outputs. The resource aspect
// runs last so it sees every resource.

use fnstack_config::StackConfig;
use fnstack_constructs::{
    Bundler, Function, FunctionBuilder, FunctionProps, FunctionSpec, Layer, LayerBuilder,
    ResourceAspect, Result, TagSet,
};
use fnstack_core::{logical_id, walk, Stack};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const DISCORD_PONG: &str = "discord-pong";
pub const RETURN_200: &str = "return-200";
pub const AUTHORIZER_LAYER: &str = "discord-authorizer";

/// Environment variable the responder reads its verification key from
pub const PUBLIC_KEY_ENV: &str = "APP_PUBLIC_KEY";

pub struct ExampleStack {
    pub stack: Stack,
    /// Built layers keyed by directory name
    pub layers: BTreeMap<String, Layer>,
    pub functions: Vec<Function>,
}

impl ExampleStack {
    pub fn build(config: &StackConfig, bundler: &dyn Bundler) -> Result<Self> {
        let mut stack = Stack::new(&config.stack.name, &config.stack.region)
            .with_account(config.stack.account.clone())
            .with_description(config.stack.description.clone());

        let layers = build_layers(config, bundler, &mut stack)?;

        let builder = FunctionBuilder::new(config);
        debug!(layer = %builder.observability_layer(), "observability layer");

        let mut pong = FunctionProps::default()
            .description(
                "A lambda example with a layer to answer to discord bot interaction with pong",
            )
            .env("TEST_1", "test Value 1");
        if let Some(layer) = layers.get(AUTHORIZER_LAYER) {
            pong = pong.layer(layer.arn());
        }
        if let Some(key) = &config.stack.public_key {
            pong = pong.env(PUBLIC_KEY_ENV, key.as_str());
        }
        let discord_pong = builder.build(
            &mut stack,
            DISCORD_PONG,
            FunctionSpec::new(pong).parameter("DB-USER"),
        )?;

        let return_200 = builder.build(
            &mut stack,
            RETURN_200,
            FunctionSpec::new(FunctionProps::default().description("always return 200")),
        )?;

        for function in [&discord_pong, &return_200] {
            stack.add_output(logical_id(&[function.id.as_str(), "Arn"]), function.arn());
        }

        let tags = if config.aspect.tags.is_empty() {
            TagSet::new().with("app", config.stack.app.as_str())
        } else {
            TagSet::from(&config.aspect.tags)
        };
        let aspect = ResourceAspect::new(config.aspect.removal_policy, tags);
        walk(stack.root_mut(), &aspect);

        info!(
            stack = %stack.name(),
            layers = layers.len(),
            functions = 2,
            "example stack built"
        );
        Ok(Self {
            stack,
            layers,
            functions: vec![discord_pong, return_200],
        })
    }
}

fn build_layers(
    config: &StackConfig,
    bundler: &dyn Bundler,
    stack: &mut Stack,
) -> Result<BTreeMap<String, Layer>> {
    let builder = LayerBuilder::new(&config.layers, bundler);
    let mut layers = BTreeMap::new();
    for name in builder.discover()? {
        let layer = builder.build(stack, &format!("{}-layer", name), &name)?;
        layers.insert(name, layer);
    }
    Ok(layers)
}
