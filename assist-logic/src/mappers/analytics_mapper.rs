use std::str::FromStr;

use assist_api::domain::analytics::{AnalyticsTurn, BackingSource, DailyMetrics, QueryFrequency};
use assist_db::models::AnalyticsTurnModel;
use assist_db::repository::{DailyMetricsRow, QueryFrequencyRow};
use heapless::String as HeaplessString;

pub struct AnalyticsMapper;

impl AnalyticsMapper {
    pub fn turn_to_model(turn: AnalyticsTurn) -> Result<AnalyticsTurnModel, String> {
        Ok(AnalyticsTurnModel {
            session_id: turn.session_id,
            user_turn_seq: turn.user_turn_seq,
            query_text: turn.query_text,
            normalized_query: turn.normalized_query,
            was_answered: turn.was_answered,
            backing_source: HeaplessString::from_str(backing_source_str(turn.backing_source))
                .map_err(|_| "backing_source too long".to_string())?,
            latency_ms: turn.latency_ms,
            created_at: turn.created_at,
            client_ip: turn
                .client_ip
                .map(|ip| HeaplessString::from_str(&ip).map_err(|_| "client_ip too long".to_string()))
                .transpose()?,
        })
    }

    pub fn daily_metrics_from_row(row: DailyMetricsRow) -> Result<DailyMetrics, String> {
        let by_source = row
            .by_source
            .into_iter()
            .map(|(source, count)| Ok((backing_source_from_str(&source)?, count)))
            .collect::<Result<Vec<_>, String>>()?;

        Ok(DailyMetrics {
            day: row.day,
            total_turns: row.total_turns,
            answered_turns: row.answered_turns,
            by_source,
            average_latency_ms: row.average_latency_ms,
        })
    }

    pub fn query_frequency_from_row(row: QueryFrequencyRow) -> QueryFrequency {
        QueryFrequency { normalized_query: row.normalized_query, count: row.count }
    }
}

fn backing_source_str(source: BackingSource) -> &'static str {
    match source {
        BackingSource::FeeEngine => "fee-engine",
        BackingSource::KnowledgeStore => "knowledge-store",
        BackingSource::Directory => "directory",
        BackingSource::ModelOnly => "model-only",
        BackingSource::None => "none",
    }
}

fn backing_source_from_str(s: &str) -> Result<BackingSource, String> {
    match s {
        "fee-engine" => Ok(BackingSource::FeeEngine),
        "knowledge-store" => Ok(BackingSource::KnowledgeStore),
        "directory" => Ok(BackingSource::Directory),
        "model-only" => Ok(BackingSource::ModelOnly),
        "none" => Ok(BackingSource::None),
        other => Err(format!("unknown backing_source '{other}'")),
    }
}
