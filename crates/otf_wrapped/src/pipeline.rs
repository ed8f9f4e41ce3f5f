//! End-to-end report pipeline: fetch, parse, align, segment, aggregate,
//! render.
//!
//! One pass over one member's history. Sections that cannot be computed
//! (an empty segment, a year with no classes) are logged and skipped; the
//! lenient template substitution then leaves their placeholder verbatim.
//! An entirely empty dataset is terminal.

use crate::aggregate::{self, ZoneFrame};
use crate::align::{self, DEFAULT_CUTOFF_PERCENTILE};
use crate::charts;
use crate::error::{ReportError, ReportResult};
use crate::records::{self, MemberSummary};
use crate::report;
use crate::segment;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use otf_client::OtfApi;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub template: String,
    /// Closed-open window for the zone/extrema section, normally one
    /// calendar year.
    pub range: (DateTime<FixedOffset>, DateTime<FixedOffset>),
    pub cutoff_percentile: f64,
}

impl ReportOptions {
    /// Year-in-review defaults: the built-in template and the given
    /// calendar year in UTC.
    pub fn for_year(year: i32) -> Self {
        let start = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .expect("jan 1 exists")
            .fixed_offset();
        let end = Utc
            .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
            .single()
            .expect("jan 1 exists")
            .fixed_offset();
        Self {
            template: report::DEFAULT_TEMPLATE.to_string(),
            range: (start, end),
            cutoff_percentile: DEFAULT_CUTOFF_PERCENTILE,
        }
    }
}

/// Insert a rendered section, or skip it when its input was insufficient.
/// Any other error stays terminal.
fn insert_or_skip(
    placeholders: &mut BTreeMap<&'static str, String>,
    name: &'static str,
    value: ReportResult<String>,
) -> ReportResult<()> {
    match value {
        Ok(v) => {
            placeholders.insert(name, v);
            Ok(())
        }
        Err(ReportError::InsufficientData(why)) => {
            tracing::warn!(placeholder = name, %why, "report section skipped");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn sorted_pairs(counts: std::collections::HashMap<String, usize>) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = counts
        .into_iter()
        .map(|(k, v)| (k, v as f64))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

/// Fetch everything and produce the final report HTML.
pub async fn generate_report(client: &dyn OtfApi, options: &ReportOptions) -> ReportResult<String> {
    let token = client.authenticate().await.map_err(ReportError::Api)?;
    tracing::info!("authenticated against provider");

    let workouts = client
        .get_in_studio_workouts(&token)
        .await
        .map_err(ReportError::Api)?;
    tracing::info!(classes = workouts.data.len(), "workout history fetched");

    let member = match workouts.member_uuid() {
        Some(uuid) => Some(
            client
                .get_member_summary(&token, uuid)
                .await
                .map_err(ReportError::Api)?,
        ),
        None => {
            tracing::warn!("no memberUuId on any class entry, skipping member summary");
            None
        }
    };

    let parsed = records::parse_workouts(&workouts);
    if parsed.dropped > 0 {
        tracing::warn!(dropped = parsed.dropped, "malformed class entries excluded");
    }
    if parsed.records.is_empty() {
        return Err(ReportError::InsufficientData(
            "no usable class records in workout history".into(),
        ));
    }

    let mut placeholders: BTreeMap<&'static str, String> = BTreeMap::new();

    if let Some(member) = &member {
        match MemberSummary::from_payload(member) {
            Ok(summary) => {
                for (label, value) in summary.display_rows() {
                    tracing::info!("{label}: {value}");
                }
                placeholders.insert("class_count", summary.total_classes_attended.to_string());
            }
            Err(err) => tracing::warn!(%err, "member summary unusable, leaving class count unfilled"),
        }
    }

    // Heart-rate progression, split by inferred starting station
    match align::align(&parsed.records, options.cutoff_percentile) {
        Ok(matrix) => {
            if matrix.dropped > 0 {
                tracing::info!(
                    dropped = matrix.dropped,
                    cutoff = matrix.cutoff,
                    "classes shorter than cutoff excluded from alignment"
                );
            }
            let segments = segment::segment(&matrix);
            insert_or_skip(
                &mut placeholders,
                "tread_start_plot",
                aggregate::describe_columns(&segments.tread_start).and_then(|summary| {
                    charts::hr_progression_svg(
                        &summary,
                        "Average Tread Start Heart Rate Progression",
                        segments.tread_start.len(),
                    )
                }),
            )?;
            insert_or_skip(
                &mut placeholders,
                "row_start_plot",
                aggregate::describe_columns(&segments.row_start).and_then(|summary| {
                    charts::hr_progression_svg(
                        &summary,
                        "Average Row Start Heart Rate Progression",
                        segments.row_start.len(),
                    )
                }),
            )?;
        }
        Err(ReportError::InsufficientData(why)) => {
            tracing::warn!(%why, "skipping heart-rate progression charts");
        }
        Err(err) => return Err(err),
    }

    // Categorical counters
    insert_or_skip(
        &mut placeholders,
        "class_by_type_plot",
        charts::bar_chart_svg(
            &sorted_pairs(aggregate::count_by_class_type(&parsed.records)),
            "Class By Type (When was your last 90 min or Tornado?!)",
            "Class Type",
            "Classes Taken (#)",
        ),
    )?;
    insert_or_skip(
        &mut placeholders,
        "class_by_coach_plot",
        charts::bar_chart_svg(
            &sorted_pairs(aggregate::count_by_coach(&parsed.records)),
            "Class By Coach (It's okay, everyone has favorites!)",
            "Coach",
            "Classes Taken (#)",
        ),
    )?;

    // Zone and extrema aggregation over the review window
    let frame = ZoneFrame::from_records(&parsed.records).filter_range(options.range.0, options.range.1);
    tracing::info!(classes_in_range = frame.len(), "zone frame filtered to review window");

    insert_or_skip(
        &mut placeholders,
        "minutes_in_zone_plot",
        frame.zone_minutes().and_then(|minutes| {
            let pairs: Vec<(String, f64)> = minutes
                .into_iter()
                .map(|(zone, mins)| (zone.to_string(), mins))
                .collect();
            charts::bar_chart_svg(
                &pairs,
                "Minutes in Each Zone (Where did you spend the most time?)",
                "Zone",
                "Minutes (min)",
            )
        }),
    )?;
    insert_or_skip(
        &mut placeholders,
        "total_calories",
        frame.total_calories().map(|v| v.to_string()),
    )?;
    insert_or_skip(
        &mut placeholders,
        "max_calories",
        frame.max_calories().map(|v| v.to_string()),
    )?;
    insert_or_skip(
        &mut placeholders,
        "max_splats",
        frame.max_splats().map(|v| v.to_string()),
    )?;
    insert_or_skip(
        &mut placeholders,
        "max_hr",
        frame.max_hr().map(|v| v.to_string()),
    )?;
    match frame.busiest_week() {
        Ok((week, count)) => {
            placeholders.insert("max_count_timestamp", week.to_string());
            placeholders.insert("max_count_value", count.to_string());
        }
        Err(ReportError::InsufficientData(why)) => {
            tracing::warn!(%why, "skipping busiest-week section");
        }
        Err(err) => return Err(err),
    }

    let filled = report::fill_template(&options.template, &placeholders);
    Ok(report::markdown_to_html(&filled))
}
