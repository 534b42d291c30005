use anyhow::Result;
use fdmkit_client::FdmClient;
use fdmkit_core::{OperationRegistry, Reconciler, run_operation};
use tracing::info;

use crate::cli::{OutputFormat, RunArgs};
use crate::commands::{parse_params, read_data};
use crate::output::print_result;

pub async fn run(client: &FdmClient, args: &RunArgs, format: OutputFormat) -> Result<()> {
    let registry = OperationRegistry::with_builtin_resources();
    let spec = registry.get(&args.operation)?;
    let data = args.data.as_deref().map(read_data).transpose()?;
    let path_params = parse_params(&args.path_params)?;
    let query_params = parse_params(&args.query_params)?;

    let mut reconciler = Reconciler::new(client.refreshing());
    let response = run_operation(
        &mut reconciler,
        &args.operation,
        spec,
        data,
        &path_params,
        &query_params,
    )
    .await?;

    info!(operation = %args.operation, changed = reconciler.config_changed(), "operation finished");
    print_result(&response, reconciler.config_changed(), format);
    Ok(())
}

pub fn list_operations() {
    let registry = OperationRegistry::with_builtin_resources();
    for name in registry.names() {
        let Ok(spec) = registry.get(name) else { continue };
        println!("{name:<48} {:<6} {}", spec.method, spec.url);
    }
}
