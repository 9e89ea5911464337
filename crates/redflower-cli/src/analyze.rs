use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use redflower_analysis::{
    AnalyzeRequest, Artifact, FlowerAnalyzer, PipelineError, PipelineResult, SchemaError,
};
use redflower_config::{OutputFormat, RedflowerConfig, load_workspace_config, validate_config};
use redflower_core::{AggregateRow, Table};

use crate::cli::{AnalyzeArgs, InputArgs};
use crate::table_io::{read_csv_table, write_csv_table, write_json, write_json_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    SchemaFailed,
}

impl CommandOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::SchemaFailed => 2,
        }
    }
}

pub fn run_validate_command(
    workspace: &Path,
    args: InputArgs,
    out: &mut dyn Write,
) -> Result<CommandOutcome> {
    let config = load_config(workspace)?;
    let (events, roster) = read_inputs(&args)?;

    let errors = FlowerAnalyzer::new(config).validate(&events, &roster);
    if !errors.is_empty() {
        write_schema_errors(&errors, out).context("failed to write validation errors")?;
        return Ok(CommandOutcome::SchemaFailed);
    }

    writeln!(
        out,
        "VALIDATE: ok events_rows={} roster_rows={}",
        events.len(),
        roster.len()
    )
    .context("failed to write output")?;
    Ok(CommandOutcome::Completed)
}

pub fn run_analyze_command(
    workspace: &Path,
    args: AnalyzeArgs,
    out: &mut dyn Write,
) -> Result<CommandOutcome> {
    let config = load_config(workspace)?;
    let (events, roster) = read_inputs(&args.inputs)?;

    let analyzer = FlowerAnalyzer::new(config.clone());
    let result = match analyzer.analyze(
        &events,
        &roster,
        AnalyzeRequest {
            min_count: args.min_count,
        },
    ) {
        Ok(result) => result,
        Err(PipelineError::Schema(errors)) => {
            write_schema_errors(&errors, out).context("failed to write validation errors")?;
            return Ok(CommandOutcome::SchemaFailed);
        }
        Err(err) => return Err(err).context("analysis failed"),
    };

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| workspace.join(&config.output.directory));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;
    let format = args.format.unwrap_or(config.output.format);

    let written = write_artifacts(&result, &config, &out_dir, format)?;

    let stats = &result.stats;
    writeln!(
        out,
        "ANALYZE: events_read={} events_retained={} events_dropped={} recipients={} qualifying={} narrative_groups={} min_count={} roster_blank_ids={}",
        stats.events_read,
        stats.events_retained,
        stats.events_dropped,
        stats.distinct_recipients,
        stats.qualifying_recipients,
        stats.narrative_groups,
        stats.min_count,
        stats.roster_blank_ids,
    )
    .context("failed to write summary")?;
    for path in &written {
        writeln!(out, "ANALYZE: wrote {}", path.display()).context("failed to write summary")?;
    }
    write_preview(&result.aggregate, args.preview, out).context("failed to write preview")?;

    Ok(CommandOutcome::Completed)
}

/// Writes every artifact to a hidden staging file first and moves them into
/// place only once all of them were written. On failure the staging files are
/// removed and no artifact of this run is left in `out_dir`.
pub fn write_artifacts(
    result: &PipelineResult,
    config: &RedflowerConfig,
    out_dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    let tables = result.to_tables(&config.events, &config.output.columns);
    let mut staged = Vec::with_capacity(Artifact::ALL.len());

    for artifact in Artifact::ALL {
        let file_name = format!("{}.{}", artifact.file_stem(), format.extension());
        let staging = out_dir.join(format!(".{file_name}.partial"));
        let written = match format {
            OutputFormat::Csv => write_csv_table(&staging, tables.get(artifact)),
            OutputFormat::Json => match artifact {
                Artifact::EnrichedEvents => write_json_table(&staging, tables.get(artifact)),
                Artifact::RecipientCounts => write_json(&staging, &result.aggregate),
                Artifact::Narrative => write_json(&staging, &result.narrative),
                Artifact::OrgSummary => write_json(&staging, &result.org_summary),
            },
        };
        if let Err(err) = written {
            discard_staged(staged.iter().map(|(staging, _)| staging));
            discard_staged([&staging]);
            return Err(err);
        }
        staged.push((staging, out_dir.join(file_name)));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (staging, path) in &staged {
        fs::rename(staging, path).with_context(|| {
            format!("failed to move {} into place", path.display())
        })?;
        tracing::debug!(path = %path.display(), "artifact written");
        written.push(path.clone());
    }

    Ok(written)
}

fn discard_staged<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        if path.is_file()
            && let Err(err) = fs::remove_file(path)
        {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove staged artifact");
        }
    }
}

pub fn write_preview(
    aggregate: &[AggregateRow],
    limit: usize,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    if limit == 0 {
        return Ok(());
    }

    writeln!(out, "count\trecipient_id\trecipient_name\trecipient_org3")?;
    for row in aggregate.iter().take(limit) {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            row.count,
            normalize_preview_field(&row.recipient_id),
            normalize_preview_field(&row.recipient_name),
            normalize_preview_field(&row.recipient_org3)
        )?;
    }
    Ok(())
}

fn write_schema_errors(errors: &[SchemaError], out: &mut dyn Write) -> std::io::Result<()> {
    for error in errors {
        writeln!(out, "VALIDATE: {error}")?;
    }
    Ok(())
}

fn load_config(workspace: &Path) -> Result<RedflowerConfig> {
    let config = load_workspace_config(workspace).with_context(|| {
        format!(
            "failed to load workspace config at {}",
            redflower_config::config_path(workspace).display()
        )
    })?;
    for warning in validate_config(&config) {
        eprintln!(
            "REDFLOWER config warning [{}]: {}",
            warning.code, warning.message
        );
    }
    Ok(config)
}

fn read_inputs(args: &InputArgs) -> Result<(Table, Table)> {
    let events = read_csv_table(&args.events).context("failed to read events table")?;
    let roster = read_csv_table(&args.roster).context("failed to read roster table")?;
    Ok((events, roster))
}

fn normalize_preview_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate_row(id: &str, count: u32) -> AggregateRow {
        AggregateRow {
            recipient_id: id.to_owned(),
            recipient_name: format!("name\t{id}"),
            recipient_alias: String::new(),
            recipient_org3: "Ops".to_owned(),
            recipient_org4: String::new(),
            count,
        }
    }

    #[test]
    fn preview_is_limited_and_tab_safe() {
        let aggregate = vec![aggregate_row("E1", 3), aggregate_row("E2", 2), aggregate_row("E3", 1)];
        let mut out = Vec::new();

        write_preview(&aggregate, 2, &mut out).expect("preview");

        let text = String::from_utf8(out).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "3\tE1\tname E1\tOps");
        assert_eq!(lines[2], "2\tE2\tname E2\tOps");
    }

    #[test]
    fn zero_preview_prints_nothing() {
        let mut out = Vec::new();
        write_preview(&[aggregate_row("E1", 3)], 0, &mut out).expect("preview");
        assert!(out.is_empty());
    }

    #[test]
    fn outcome_exit_codes() {
        assert_eq!(CommandOutcome::Completed.exit_code(), 0);
        assert_eq!(CommandOutcome::SchemaFailed.exit_code(), 2);
    }
}
