use anyhow::Result;
use fdmkit_client::FdmClient;
use fdmkit_core::models::{
    InternalCertificate, NetworkObject, RadiusIdentitySource, SecurityIntelligenceNetworkPolicy,
};
use fdmkit_core::{ConfigObject, ConfigResource, ResourceClient, ResourceOperation};
use serde_json::Value;

use crate::cli::{OutputFormat, ResourceArgs, ResourceKind};
use crate::commands::{parse_params, read_data};
use crate::output::print_result;

pub async fn run(client: &FdmClient, args: &ResourceArgs, format: OutputFormat) -> Result<()> {
    let params = build_params(args)?;
    let operation = ResourceOperation::from(args.operation);

    let (response, changed) = match args.kind {
        ResourceKind::NetworkObject => execute::<NetworkObject>(client, operation, &params).await?,
        ResourceKind::RadiusIdentitySource => {
            execute::<RadiusIdentitySource>(client, operation, &params).await?
        }
        ResourceKind::InternalCertificate => {
            execute::<InternalCertificate>(client, operation, &params).await?
        }
        ResourceKind::SecurityIntelligenceNetworkPolicy => {
            execute::<SecurityIntelligenceNetworkPolicy>(client, operation, &params).await?
        }
    };

    print_result(&response, changed, format);
    Ok(())
}

async fn execute<R: ConfigResource>(
    client: &FdmClient,
    operation: ResourceOperation,
    params: &ConfigObject,
) -> Result<(Value, bool)> {
    let mut resources = ResourceClient::<R, _>::new(client.refreshing());
    let response = resources.execute(operation, params).await?;
    Ok((response, resources.config_changed()))
}

/// Parameter object for `ResourceClient::execute`. Paging values are
/// numeric, everything else is passed as a string.
fn build_params(args: &ResourceArgs) -> Result<ConfigObject> {
    let mut params = ConfigObject::new();
    for (key, value) in parse_params(&args.params)? {
        let value = match key.as_str() {
            "offset" | "limit" => Value::from(
                value
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("{key} must be a non-negative integer"))?,
            ),
            _ => Value::String(value),
        };
        params.insert(key, value);
    }
    if let Some(path) = &args.data {
        params.insert("data".to_string(), Value::Object(read_data(path)?));
    }
    Ok(params)
}
