//! Asset command implementation.

use std::io::Write;

use farm_csv::NormalizerContext;
use farm_entity::{Asset, AssetId};
use tracing::info;

use crate::cli::AssetCommands;
use crate::context::FarmContext;
use crate::error::CliError;
use crate::output::{AssetView, LogList, LogView, MaybeLog, OutputFormat};

/// Handler for asset commands.
pub struct AssetCommand<'a> {
    ctx: &'a FarmContext,
}

impl<'a> AssetCommand<'a> {
    /// Creates a new asset command handler.
    #[must_use]
    pub const fn new(ctx: &'a FarmContext) -> Self {
        Self { ctx }
    }

    /// Executes an asset subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &AssetCommands,
    ) -> Result<(), CliError> {
        let raw = NormalizerContext::processed(false);

        match command {
            AssetCommands::Create { asset_type, name } => {
                let mut asset = Asset::new(asset_type.as_str());
                if let Some(name) = name {
                    asset.name.clone_from(name);
                }
                let id = self.ctx.store.save_asset(&mut asset)?;
                info!(asset_id = id.0, asset_type = %asset.asset_type, "created asset");
                format.write(out, &AssetView::from(&asset))
            }
            AssetCommands::Logs { id, log_type } => {
                let logs = self
                    .ctx
                    .asset_logs
                    .get_logs(AssetId(*id), log_type.as_deref())?;
                let views = logs.iter().map(|log| LogView::new(log, &raw)).collect();
                format.write(out, &LogList(views))
            }
            AssetCommands::FirstLog { id } => {
                let log = self.ctx.asset_logs.get_first_log(AssetId(*id))?;
                format.write(out, &MaybeLog(log.as_ref().map(|l| LogView::new(l, &raw))))
            }
        }
    }
}
