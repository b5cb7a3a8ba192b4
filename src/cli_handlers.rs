use crate::config::ServerConfig;
use crate::error::Result;
use crate::paths::PathResolver;
use crate::quantities::QuantityFamily;
use crate::reactions::ReactionLookup;
use serde::Serialize;

/// Handle the info command
pub fn handle_info(config: &ServerConfig) -> Result<()> {
    let resolver: PathResolver = PathResolver::default();
    print_json(&resolver.describe_all(config)?)
}

/// Handle the separation and q-value commands
pub async fn handle_lookup(
    config: &ServerConfig,
    family: QuantityFamily,
    z: u32,
    a: u32,
    kind: Option<&str>,
) -> Result<()> {
    let resolver: PathResolver = PathResolver::default();
    let path = resolver.require(&config.nds)?;
    let lookup: ReactionLookup = ReactionLookup::default();

    let result = match family {
        QuantityFamily::SeparationEnergy => {
            lookup
                .get_separation_energy(path.as_path(), z, a, kind)
                .await?
        }
        QuantityFamily::QValue => lookup.get_q_value(path.as_path(), z, a, kind).await?,
    };
    print_json(&result)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
