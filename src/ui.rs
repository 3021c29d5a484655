use crate::config::AppConfig;

pub fn render_index(config: &AppConfig) -> String {
    let fields: String = config
        .series()
        .iter()
        .map(|spec| {
            let unit = if spec.unit.is_empty() {
                String::new()
            } else {
                format!(" ({})", spec.unit)
            };
            format!(
                r#"<label class="field"><span>{}{}</span><input type="number" name="{}" min="0" step="any" value="0" required /></label>"#,
                spec.title, unit, spec.field
            )
        })
        .collect();

    let exports = if config.variant.exports_enabled() {
        r#"<section class="exports" id="exports" hidden>
      <a class="btn-link" href="/export/data.csv">Download CSV</a>
      <a class="btn-link" href="/export/chart/timeseries.html" target="_blank">Trend chart</a>
      <span id="histogram-links"></span>
    </section>"#
    } else {
        ""
    };

    let subtitle = match config.thresholds {
        Some(t) => format!(
            "Log readings for this session. Glucose between {} and {} mg/dL counts as normal.",
            t.low, t.high
        ),
        None => "Log numeric readings for this session.".to_string(),
    };

    INDEX_HTML
        .replace("{{TITLE}}", config.variant.title())
        .replace("{{SUBTITLE}}", &subtitle)
        .replace("{{FIELDS}}", &fields)
        .replace("{{EXPORTS}}", exports)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --ok: #2d7a4b;
      --warn: #c63b2b;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.2rem;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
    }

    form.entry {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
      align-items: end;
    }

    .field {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: #6b645d;
    }

    input {
      font: inherit;
      padding: 12px 14px;
      border-radius: 14px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button,
    .btn-link {
      font: inherit;
      font-weight: 600;
      border: none;
      border-radius: 16px;
      padding: 14px 20px;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      text-decoration: none;
      display: inline-block;
    }

    button.danger {
      background: var(--warn);
    }

    .alert {
      padding: 14px 18px;
      border-radius: 16px;
      font-weight: 600;
    }

    .alert[data-status="LOW"],
    .alert[data-status="HIGH"] {
      background: #fde3dc;
      color: var(--warn);
    }

    .alert[data-status="NORMAL"] {
      background: #dff3e6;
      color: var(--ok);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
      gap: 16px;
    }

    .series {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .metrics {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 8px;
    }

    .metrics .label {
      display: block;
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: #8b857d;
    }

    .metrics .value {
      font-size: 1.3rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .chart-card {
      background: white;
      border-radius: 18px;
      padding: 12px;
    }

    svg {
      width: 100%;
      height: auto;
    }

    .chart-grid {
      stroke: #e5ded4;
    }

    .chart-label {
      font-size: 11px;
      fill: #6f6a65;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border-radius: 18px;
      overflow: hidden;
    }

    th,
    td {
      text-align: left;
      padding: 10px 14px;
      border-bottom: 1px solid #f0e9df;
    }

    .exports {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] {
      color: var(--warn);
    }

    .status[data-type="ok"] {
      color: var(--ok);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{TITLE}}</h1>
      <p class="subtitle">{{SUBTITLE}}</p>
    </header>

    <form class="entry" id="entry-form" method="post" action="/submit">
      {{FIELDS}}
      <button type="submit">Submit</button>
    </form>

    <div class="status" id="status"></div>
    <div class="alert" id="alert" hidden></div>
    <p id="empty" class="subtitle">No readings yet. Enter values above to start logging.</p>

    <div id="data" hidden>
      <section>
        <h2>Summary</h2>
        <div class="panel" id="summaries"></div>
      </section>

      <section>
        <h2>Over time</h2>
        <div class="chart-card"><svg id="trend" viewBox="0 0 600 260" role="img"></svg></div>
      </section>

      <section>
        <h2>Distribution</h2>
        <div class="panel" id="histograms"></div>
      </section>

      <section>
        <h2>Records</h2>
        <table>
          <thead><tr><th>Time</th><th>Type</th><th>Value</th></tr></thead>
          <tbody id="rows"></tbody>
        </table>
      </section>

      {{EXPORTS}}

      <form id="clear-form" method="post" action="/clear">
        <button class="danger" type="submit">Clear all data</button>
      </form>
    </div>
  </main>

  <script>
    const COLORS = ['#2f4858', '#ff6b4a', '#2d7a4b', '#8b5cf6'];
    const statusEl = document.getElementById('status');
    const alertEl = document.getElementById('alert');
    const emptyEl = document.getElementById('empty');
    const dataEl = document.getElementById('data');
    const summariesEl = document.getElementById('summaries');
    const trendEl = document.getElementById('trend');
    const histogramsEl = document.getElementById('histograms');
    const rowsEl = document.getElementById('rows');
    const exportsEl = document.getElementById('exports');
    const histogramLinksEl = document.getElementById('histogram-links');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const fmt = (value) => (typeof value === 'number' ? value.toFixed(1) : '--');

    const escapeHtml = (text) =>
      String(text).replace(/[&<>"]/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;' }[c]));

    const renderAlert = (alert) => {
      if (!alert) {
        alertEl.hidden = true;
        return;
      }
      const messages = {
        LOW: `Warning: ${alert.label} is low (${fmt(alert.value)} < ${alert.low})`,
        HIGH: `Warning: ${alert.label} is high (${fmt(alert.value)} > ${alert.high})`,
        NORMAL: `${alert.label} is within the normal range (${fmt(alert.value)})`
      };
      alertEl.dataset.status = alert.status;
      alertEl.textContent = messages[alert.status];
      alertEl.hidden = false;
    };

    const renderSummaries = (summaries) => {
      summariesEl.innerHTML = summaries
        .map((s) => `
          <div class="series">
            <h2>${escapeHtml(s.title)}${s.unit ? ` (${escapeHtml(s.unit)})` : ''}</h2>
            <div class="metrics">
              <div><span class="label">Mean</span><span class="value">${fmt(s.mean)}</span></div>
              <div><span class="label">Latest</span><span class="value">${fmt(s.latest)}</span></div>
              <div><span class="label">Count</span><span class="value">${s.count}</span></div>
              <div><span class="label">Median</span><span class="value">${fmt(s.median)}</span></div>
              <div><span class="label">Std dev</span><span class="value">${fmt(s.std_dev)}</span></div>
            </div>
          </div>`)
        .join('');
    };

    const axis = (min, max, y, width, paddingX) => {
      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = min + ((max - min) * i) / 4;
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${y(value)}" x2="${width - paddingX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${paddingX - 8}" y="${y(value) + 4}" text-anchor="end">${value.toFixed(1)}</text>`;
      }
      return grid;
    };

    const renderTrend = (series) => {
      const width = 600;
      const height = 260;
      const paddingX = 44;
      const paddingY = 30;
      const points = series.flatMap((s) => s.points);
      const times = points.map((p) => Date.parse(p.timestamp));
      const values = points.map((p) => p.value);
      const tMin = Math.min(...times);
      const tMax = Math.max(...times);
      let min = Math.min(0, ...values);
      let max = Math.max(...values);
      if (min === max) {
        min -= 1;
        max += 1;
      }
      const x = (t) => (tMax === tMin ? width / 2 : paddingX + ((t - tMin) / (tMax - tMin)) * (width - paddingX * 2));
      const y = (v) => height - paddingY - ((v - min) / (max - min)) * (height - paddingY * 2);

      let body = axis(min, max, y, width, paddingX);
      series.forEach((s, index) => {
        const color = COLORS[index % COLORS.length];
        const coords = s.points.map((p) => `${x(Date.parse(p.timestamp)).toFixed(2)},${y(p.value).toFixed(2)}`);
        body += `<polyline fill="none" stroke="${color}" stroke-width="2.5" points="${coords.join(' ')}" />`;
        body += coords.map((c) => {
          const [cx, cy] = c.split(',');
          return `<circle cx="${cx}" cy="${cy}" r="3.5" fill="${color}" />`;
        }).join('');
        body += `<text class="chart-label" x="${width - paddingX - 100}" y="${16 + index * 14}" fill="${color}">${escapeHtml(s.title)}</text>`;
      });
      trendEl.innerHTML = body;
    };

    const renderHistogram = (histogram, color) => {
      const width = 300;
      const height = 180;
      const paddingX = 34;
      const paddingY = 24;
      const maxCount = Math.max(...histogram.bins.map((b) => b.count));
      const y = (v) => height - paddingY - (v / maxCount) * (height - paddingY * 2);
      const slot = (width - paddingX * 2) / histogram.bins.length;
      const bars = histogram.bins
        .map((b, i) => `<rect x="${paddingX + slot * i + 1}" y="${y(b.count)}" width="${Math.max(slot - 2, 1)}" height="${height - paddingY - y(b.count)}" fill="${color}"><title>${fmt(b.start)} to ${fmt(b.end)}: ${b.count}</title></rect>`)
        .join('');
      return `
        <div class="series">
          <h2>${escapeHtml(histogram.title)}</h2>
          <svg viewBox="0 0 ${width} ${height}" role="img">${axis(0, maxCount, y, width, paddingX)}${bars}</svg>
        </div>`;
    };

    const renderRows = (table) => {
      rowsEl.innerHTML = table
        .map((o) => `<tr><td>${escapeHtml(o.timestamp.replace('T', ' ').slice(0, 19))}</td><td>${escapeHtml(o.type ?? '')}</td><td>${fmt(o.value)}</td></tr>`)
        .join('');
    };

    const render = (view) => {
      const hasData = view.total_count > 0;
      emptyEl.hidden = hasData;
      dataEl.hidden = !hasData;
      renderAlert(view.alert);
      if (!hasData) {
        return;
      }
      renderSummaries(view.summaries);
      renderTrend(view.time_series);
      histogramsEl.innerHTML = view.histograms
        .map((h, index) => renderHistogram(h, COLORS[index % COLORS.length]))
        .join('');
      renderRows(view.table);
      if (exportsEl) {
        exportsEl.hidden = !view.exports_enabled;
        histogramLinksEl.innerHTML = view.histograms
          .filter((h) => h.label)
          .map((h) => `<a class="btn-link" href="/export/chart/histogram/${encodeURIComponent(h.label)}.html" target="_blank">${escapeHtml(h.title)} histogram</a>`)
          .join(' ');
      }
    };

    const request = async (url, options) => {
      const res = await fetch(url, options);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const entryForm = document.getElementById('entry-form');
    const clearForm = document.getElementById('clear-form');

    entryForm.addEventListener('submit', (event) => {
      event.preventDefault();
      const payload = {};
      new FormData(entryForm).forEach((value, key) => {
        payload[key] = Number(value);
      });
      setStatus('Saving...', 'info');
      request('/api/observations', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(payload)
      })
        .then((view) => {
          render(view);
          setStatus('Saved', 'ok');
          setTimeout(() => setStatus('', ''), 1200);
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    clearForm.addEventListener('submit', (event) => {
      event.preventDefault();
      request('/api/clear', { method: 'POST' })
        .then(render)
        .catch((err) => setStatus(err.message, 'error'));
    });

    request('/api/dashboard')
      .then(render)
      .catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    #[test]
    fn tracker_page_has_both_inputs() {
        let html = render_index(&AppConfig::for_variant(Variant::Tracker));
        assert!(html.contains(r#"name="glucose""#));
        assert!(html.contains(r#"name="insulin""#));
        assert!(html.contains("between 90 and 120"));
        assert!(!html.contains("/export/data.csv"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn generic_page_has_single_input() {
        let html = render_index(&AppConfig::for_variant(Variant::Generic));
        assert!(html.contains(r#"name="value""#));
        assert!(!html.contains(r#"name="glucose""#));
    }

    #[test]
    fn export_variant_links_downloads() {
        let html = render_index(&AppConfig::for_variant(Variant::TrackerExport));
        assert!(html.contains("/export/data.csv"));
        assert!(html.contains("between 90 and 200"));
    }
}
