//! Log command implementation.

use std::io::Write;

use farm_csv::NormalizerContext;
use farm_entity::{AssetId, Log, LogId, LongText};
use farm_log::QueryCriteria;
use tracing::info;

use crate::cli::{CreateLogArgs, LogCommands};
use crate::context::FarmContext;
use crate::error::CliError;
use crate::output::{LogList, LogView, OutputFormat};

/// Text format for notes entered on the command line.
const PLAIN_TEXT_FORMAT: &str = "plain_text";

/// Handler for log commands.
pub struct LogCommand<'a> {
    ctx: &'a FarmContext,
}

impl<'a> LogCommand<'a> {
    /// Creates a new log command handler.
    #[must_use]
    pub const fn new(ctx: &'a FarmContext) -> Self {
        Self { ctx }
    }

    /// Executes a log subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &LogCommands,
    ) -> Result<(), CliError> {
        let raw = NormalizerContext::processed(false);

        match command {
            LogCommands::Create(args) => {
                let log = self.create(args)?;
                format.write(out, &LogView::new(&log, &raw))
            }
            LogCommands::Query(args) => {
                let criteria = QueryCriteria::from(args);
                let ids = self
                    .ctx
                    .queries
                    .get_query(&criteria)
                    .access_check(false)
                    .execute()?;
                let logs = self.ctx.store.load_logs(&ids)?;
                let views = logs.iter().map(|log| LogView::new(log, &raw)).collect();
                format.write(out, &LogList(views))
            }
            LogCommands::Show { id, processed } => {
                let log = self.load(LogId(*id))?;
                let context = NormalizerContext::processed(*processed);
                format.write(out, &LogView::new(&log, &context))
            }
            LogCommands::SetStatus { id, status } => {
                let mut log = self.load(LogId(*id))?;
                log.status = Some(status.clone());
                self.ctx.logs.save(&mut log)?;
                info!(log_id = id, status = %status, "changed log status");
                format.write(out, &LogView::new(&log, &raw))
            }
        }
    }

    fn create(&self, args: &CreateLogArgs) -> Result<Log, CliError> {
        let mut builder = Log::builder().log_type(args.log_type.as_str());
        if let Some(name) = &args.name {
            builder = builder.name(name.as_str());
        }
        if let Some(timestamp) = args.timestamp {
            builder = builder.timestamp(timestamp);
        }
        if let Some(status) = &args.status {
            builder = builder.status(status.as_str());
        }
        for asset in &args.assets {
            let asset = AssetId(*asset);
            if self.ctx.store.load_asset(asset)?.is_none() {
                return Err(CliError::NotFound(format!("asset {asset}")));
            }
            builder = builder.asset(asset);
        }
        if let Some(notes) = &args.notes {
            builder = builder.notes(LongText::new(notes.as_str(), PLAIN_TEXT_FORMAT));
        }

        let log = self.ctx.logs.create_and_save(builder)?;
        info!(
            log_id = ?log.id,
            log_type = %log.log_type,
            status = ?log.status,
            "created log"
        );
        Ok(log)
    }

    fn load(&self, id: LogId) -> Result<Log, CliError> {
        self.ctx
            .logs
            .load(id)?
            .ok_or_else(|| CliError::NotFound(format!("log {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Format, QueryArgs};
    use farm_entity::{Asset, MemoryEntityStore};
    use farm_log::FarmLogConfig;
    use std::sync::Arc;

    fn context() -> FarmContext {
        FarmContext::new(Arc::new(MemoryEntityStore::new()), &FarmLogConfig::default())
    }

    fn run(ctx: &FarmContext, command: &LogCommands) -> Result<serde_json::Value, CliError> {
        let mut out = Vec::new();
        LogCommand::new(ctx).execute(&mut out, &OutputFormat::new(Format::Json), command)?;
        Ok(serde_json::from_slice(&out).expect("json output"))
    }

    fn create_args(log_type: &str, timestamp: i64) -> CreateLogArgs {
        CreateLogArgs {
            log_type: log_type.into(),
            name: None,
            timestamp: Some(timestamp),
            status: None,
            assets: Vec::new(),
            notes: None,
        }
    }

    #[test]
    fn create_applies_configured_default_status() {
        let ctx = context();
        let log = run(&ctx, &LogCommands::Create(create_args("activity", 5))).expect("create");
        assert_eq!(log["status"], "pending");

        let log = run(&ctx, &LogCommands::Create(create_args("custom", 5))).expect("create");
        assert!(log["status"].is_null());
    }

    #[test]
    fn create_rejects_unknown_asset() {
        let ctx = context();
        let mut args = create_args("activity", 5);
        args.assets = vec![9];

        let result = run(&ctx, &LogCommands::Create(args));
        assert!(matches!(result, Err(CliError::NotFound(msg)) if msg == "asset 9"));
    }

    #[test]
    fn query_filters_and_orders() {
        let ctx = context();
        let asset = ctx.store.save_asset(&mut Asset::new("land")).expect("save");

        let mut with_asset = create_args("harvest", 20);
        with_asset.assets = vec![asset.0];
        run(&ctx, &LogCommands::Create(create_args("activity", 10))).expect("create");
        run(&ctx, &LogCommands::Create(with_asset)).expect("create");
        run(&ctx, &LogCommands::Create(create_args("activity", 30))).expect("create");

        let all = run(&ctx, &LogCommands::Query(QueryArgs::default())).expect("query");
        let ids: Vec<u64> = all
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|l| l["id"].as_u64())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let args = QueryArgs {
            asset: Some(asset.0),
            ..QueryArgs::default()
        };
        let filtered = run(&ctx, &LogCommands::Query(args)).expect("query");
        assert_eq!(filtered.as_array().map(Vec::len), Some(1));
        assert_eq!(filtered[0]["type"], "harvest");
    }

    #[test]
    fn show_renders_notes() {
        let ctx = context();
        let mut args = create_args("observation", 5);
        args.notes = Some("Saw a hawk".into());
        run(&ctx, &LogCommands::Create(args)).expect("create");

        let log = run(
            &ctx,
            &LogCommands::Show {
                id: 1,
                processed: false,
            },
        )
        .expect("show");
        assert_eq!(log["notes"], "Saw a hawk");
    }

    #[test]
    fn set_status_changes_status() {
        let ctx = context();
        run(&ctx, &LogCommands::Create(create_args("activity", 5))).expect("create");

        let log = run(
            &ctx,
            &LogCommands::SetStatus {
                id: 1,
                status: "done".into(),
            },
        )
        .expect("set status");
        assert_eq!(log["status"], "done");

        let stored = ctx.logs.load(LogId(1)).expect("load").expect("exists");
        assert_eq!(stored.status.as_deref(), Some("done"));
    }

    #[test]
    fn missing_log_is_not_found() {
        let ctx = context();
        let result = run(
            &ctx,
            &LogCommands::Show {
                id: 3,
                processed: true,
            },
        );
        assert!(matches!(result, Err(CliError::NotFound(_))));
    }
}
