use crate::calculator::Standing;
use crate::models::{ChartData, ChartSlice, MetricsRow, SessionView, SubjectView};
use crate::session::{Entry, Session};

/// Slice colours, assigned in subject order and repeated past the end.
pub const PALETTE: [&str; 12] = [
    "#4C5C96", "#22D3EE", "#F87171", "#9CA3AF", "#B08A4A", "#3C8A8A", "#6F8A4A", "#8A4A6B",
    "#7C3AED", "#FB923C", "#FDE047", "#10B981",
];

pub fn build_view(session: &Session, notice: Option<&str>) -> SessionView {
    let subjects: Vec<SubjectView> = session
        .entries()
        .iter()
        .map(|entry| SubjectView {
            id: entry.id,
            name: entry.subject.name.clone(),
            lectures_per_week: entry.subject.lectures_per_week,
        })
        .collect();

    let (rows, errors, chart) = match session.projection() {
        Ok(metrics) => {
            let rows: Vec<MetricsRow> = session
                .entries()
                .iter()
                .zip(metrics)
                .map(|(entry, m)| MetricsRow {
                    id: entry.id,
                    name: entry.subject.name.clone(),
                    lectures_per_week: entry.subject.lectures_per_week,
                    total_lectures: m.total_lectures,
                    required_lectures: m.required_lectures,
                    max_bunkable: m.max_bunkable,
                    weekly_skip_limit: m.weekly_skip_limit,
                    bunkable_standing: Standing::of(m.max_bunkable),
                    skip_limit_standing: Standing::of(m.weekly_skip_limit),
                })
                .collect();
            (rows, Vec::new(), build_chart(session.entries()))
        }
        Err(errors) => (Vec::new(), errors.0, None),
    };

    SessionView {
        attendance_criterion: session.attendance_criterion().to_string(),
        working_days: session.working_days().to_string(),
        mode: session.mode(),
        duration: session.duration(),
        duration_values: session.duration_values(),
        last_lectures_per_week: session.last_lectures_per_week(),
        subjects,
        valid: errors.is_empty(),
        rows,
        errors,
        chart,
        notice: notice.map(str::to_string),
    }
}

/// Lecture weightage per subject; `None` when there is nothing to draw.
pub fn build_chart(entries: &[Entry]) -> Option<ChartData> {
    if entries.is_empty() {
        return None;
    }

    let total_per_week: u64 = entries
        .iter()
        .map(|entry| u64::from(entry.subject.lectures_per_week))
        .sum();
    let slices: Vec<ChartSlice> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let value = entry.subject.lectures_per_week;
            ChartSlice {
                label: entry.subject.name.clone(),
                value,
                color: PALETTE[index % PALETTE.len()],
                share_percent: share_percent(value, total_per_week),
            }
        })
        .collect();

    Some(ChartData {
        labels: entries.iter().map(|entry| entry.subject.name.clone()).collect(),
        values: entries.iter().map(|entry| entry.subject.lectures_per_week).collect(),
        total_per_week,
        slices,
    })
}

fn share_percent(value: u32, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(value) / total as f64 * 1000.0).round() / 10.0
}
