//! Downloadable artifacts: the raw log as CSV and single charts as
//! self-contained HTML pages with inline SVG.

use crate::models::{SeriesHistogram, TimeSeries};
use crate::store::SessionStore;
use chrono::NaiveDateTime;
use std::fmt::Write as _;

pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 320.0;
const PAD_X: f64 = 56.0;
const PAD_Y: f64 = 40.0;
const PALETTE: [&str; 4] = ["#2f4858", "#ff6b4a", "#2d7a4b", "#8b5cf6"];

/// Full store in insertion order, one row per observation.
pub fn to_csv(store: &SessionStore) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(["timestamp", "type", "value"])?;
    for obs in store.iter() {
        writer.serialize((
            obs.timestamp.format(CSV_TIMESTAMP_FORMAT).to_string(),
            obs.kind.as_deref(),
            obs.value,
        ))?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

pub fn timeseries_document(title: &str, series: &[TimeSeries]) -> String {
    let points = series.iter().flat_map(|s| s.points.iter());
    let (mut t_min, mut t_max) = (None::<NaiveDateTime>, None::<NaiveDateTime>);
    let (mut v_min, mut v_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for point in points {
        t_min = Some(t_min.map_or(point.timestamp, |t| t.min(point.timestamp)));
        t_max = Some(t_max.map_or(point.timestamp, |t| t.max(point.timestamp)));
        v_min = v_min.min(point.value);
        v_max = v_max.max(point.value);
    }

    let (Some(t_min), Some(t_max)) = (t_min, t_max) else {
        return document(title, &empty_chart());
    };
    let (v_min, v_max) = widen(v_min.min(0.0), v_max);
    let span_ms = (t_max - t_min).num_milliseconds() as f64;

    let x = |ts: NaiveDateTime| {
        if span_ms <= 0.0 {
            WIDTH / 2.0
        } else {
            PAD_X + (ts - t_min).num_milliseconds() as f64 / span_ms * (WIDTH - PAD_X * 2.0)
        }
    };
    let y = |value: f64| scale_y(value, v_min, v_max);

    let mut svg = axes(v_min, v_max);
    for (index, s) in series.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        let path: Vec<String> = s
            .points
            .iter()
            .map(|p| format!("{:.2},{:.2}", x(p.timestamp), y(p.value)))
            .collect();
        let _ = write!(
            svg,
            r#"<polyline fill="none" stroke="{color}" stroke-width="2.5" points="{}" />"#,
            path.join(" ")
        );
        for p in &s.points {
            let _ = write!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="3.5" fill="{color}" />"#,
                x(p.timestamp),
                y(p.value)
            );
        }
        let _ = write!(
            svg,
            r#"<text x="{:.0}" y="{:.0}" fill="{color}" font-size="13">{}</text>"#,
            WIDTH - PAD_X - 120.0,
            24.0 + index as f64 * 18.0,
            escape(&s.title)
        );
    }
    let _ = write!(
        svg,
        r##"<text x="{PAD_X}" y="{:.0}" font-size="12" fill="#6f6a65">{}</text><text x="{:.0}" y="{:.0}" font-size="12" fill="#6f6a65" text-anchor="end">{}</text>"##,
        HEIGHT - PAD_Y + 20.0,
        t_min.format("%m-%d %H:%M"),
        WIDTH - PAD_X,
        HEIGHT - PAD_Y + 20.0,
        t_max.format("%m-%d %H:%M"),
    );

    document(title, &wrap_svg(&svg))
}

pub fn histogram_document(histogram: &SeriesHistogram) -> String {
    if histogram.bins.is_empty() {
        return document(&histogram.title, &empty_chart());
    }

    let max_count = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0);
    let (c_min, c_max) = widen(0.0, max_count as f64);
    let slot = (WIDTH - PAD_X * 2.0) / histogram.bins.len() as f64;

    let mut svg = axes(c_min, c_max);
    for (index, bin) in histogram.bins.iter().enumerate() {
        let top = scale_y(bin.count as f64, c_min, c_max);
        let _ = write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>{:.1} to {:.1}: {}</title></rect>"#,
            PAD_X + slot * index as f64 + 1.0,
            top,
            (slot - 2.0).max(1.0),
            HEIGHT - PAD_Y - top,
            PALETTE[0],
            bin.start,
            bin.end,
            bin.count
        );
    }
    if let (Some(first), Some(last)) = (histogram.bins.first(), histogram.bins.last()) {
        let _ = write!(
            svg,
            r##"<text x="{PAD_X}" y="{:.0}" font-size="12" fill="#6f6a65">{:.1}</text><text x="{:.0}" y="{:.0}" font-size="12" fill="#6f6a65" text-anchor="end">{:.1}</text>"##,
            HEIGHT - PAD_Y + 20.0,
            first.start,
            WIDTH - PAD_X,
            HEIGHT - PAD_Y + 20.0,
            last.end,
        );
    }

    document(&histogram.title, &wrap_svg(&svg))
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

fn scale_y(value: f64, min: f64, max: f64) -> f64 {
    HEIGHT - PAD_Y - (value - min) / (max - min) * (HEIGHT - PAD_Y * 2.0)
}

fn axes(min: f64, max: f64) -> String {
    let mut svg = String::new();
    let ticks = 4;
    for i in 0..=ticks {
        let value = min + (max - min) * i as f64 / ticks as f64;
        let y = scale_y(value, min, max);
        let _ = write!(
            svg,
            r##"<line x1="{PAD_X}" y1="{y:.2}" x2="{:.0}" y2="{y:.2}" stroke="#e5ded4" /><text x="{:.0}" y="{:.2}" font-size="12" fill="#6f6a65" text-anchor="end">{value:.1}</text>"##,
            WIDTH - PAD_X,
            PAD_X - 8.0,
            y + 4.0,
        );
    }
    svg
}

fn empty_chart() -> String {
    wrap_svg(&format!(
        r#"<text x="{:.0}" y="{:.0}" text-anchor="middle" font-size="14">No data yet</text>"#,
        WIDTH / 2.0,
        HEIGHT / 2.0
    ))
}

fn wrap_svg(body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img">{body}</svg>"#
    )
}

fn document(title: &str, svg: &str) -> String {
    let title = escape(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>{title}</title>
  <style>
    body {{ font-family: "Trebuchet MS", sans-serif; background: #f8f3e6; color: #2b2a28; padding: 24px; }}
    svg {{ width: 100%; max-width: 960px; background: white; border-radius: 18px; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  {svg}
</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistogramBin, Observation, TimePoint};
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn csv_has_header_and_rows_in_insertion_order() {
        let mut store = SessionStore::new();
        store.append([
            Observation::typed(at(12), "glucose", 130.0),
            Observation::typed(at(12), "insulin", 12.5),
        ]);
        store.append([Observation::untyped(at(8), 3.0)]);

        let csv = String::from_utf8(to_csv(&store).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "timestamp,type,value");
        assert_eq!(lines[1], "2026-01-05 12:30:00,glucose,130.0");
        assert_eq!(lines[2], "2026-01-05 12:30:00,insulin,12.5");
        assert_eq!(lines[3], "2026-01-05 08:30:00,,3.0");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn csv_of_empty_store_is_header_only() {
        let csv = String::from_utf8(to_csv(&SessionStore::new()).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), "timestamp,type,value");
    }

    #[test]
    fn timeseries_document_draws_one_line_per_series() {
        let series = vec![
            TimeSeries {
                label: Some("glucose".into()),
                title: "Blood glucose".into(),
                points: vec![
                    TimePoint { timestamp: at(8), value: 85.0 },
                    TimePoint { timestamp: at(12), value: 130.0 },
                ],
            },
            TimeSeries {
                label: Some("insulin".into()),
                title: "Insulin <dose>".into(),
                points: vec![TimePoint { timestamp: at(8), value: 10.0 }],
            },
        ];
        let html = timeseries_document("Trend", &series);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("<polyline").count(), 2);
        assert!(html.contains("Insulin &lt;dose&gt;"));
    }

    #[test]
    fn histogram_document_draws_bars() {
        let histogram = SeriesHistogram {
            label: Some("glucose".into()),
            title: "Blood glucose".into(),
            bins: vec![
                HistogramBin { start: 80.0, end: 100.0, count: 2 },
                HistogramBin { start: 100.0, end: 120.0, count: 1 },
            ],
        };
        let html = histogram_document(&histogram);
        assert_eq!(html.matches("<rect").count(), 2);
        assert!(html.contains("<title>Blood glucose</title>"));
    }

    #[test]
    fn empty_chart_says_so() {
        let html = timeseries_document("Trend", &[]);
        assert!(html.contains("No data yet"));
    }
}
