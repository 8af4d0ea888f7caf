use serde_json::json;

use sinotick_core::{MarketDataSource, ProviderId};

use crate::cli::SourcesArgs;
use crate::error::CliError;

use super::{CommandResult, Providers};

pub fn run(_args: &SourcesArgs, providers: &Providers) -> Result<CommandResult, CliError> {
    let entries: Vec<_> = [
        (
            providers.eastmoney.id(),
            providers.eastmoney.capabilities(),
        ),
        (providers.sina.id(), providers.sina.capabilities()),
    ]
    .into_iter()
    .map(|(id, capabilities)| {
        json!({
            "id": id,
            "endpoints": capabilities.supported_endpoints(),
        })
    })
    .collect();

    let data = json!({ "sources": entries });

    Ok(CommandResult::ok(
        data,
        ProviderId::ALL.to_vec(),
    ))
}
