use crate::models::DATE_FORMAT;
use chrono::NaiveDate;

pub fn render_index(today: NaiveDate, goal_months: &[String]) -> String {
    let goal_fields: String = goal_months.iter().map(|month| goal_fieldset(month)).collect();
    INDEX_HTML
        .replace("{{TODAY}}", &today.format(DATE_FORMAT).to_string())
        .replace("{{GOAL_FIELDS}}", &goal_fields)
}

fn goal_fieldset(month: &str) -> String {
    let month = escape_html(month);
    let input = |metric: &str, label: &str| {
        format!(
            r#"<label>{label}<input type="number" step="0.1" value="0" data-month="{month}" data-metric="{metric}" /></label>"#
        )
    };
    format!(
        r#"
        <fieldset class="goal-month">
          <legend>{month}</legend>
          {}{}{}{}
        </fieldset>"#,
        input("weight", "Weight"),
        input("chest", "Chest"),
        input("tummy", "Tummy"),
        input("glutes", "Glutes"),
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Fitness Dashboard</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-track: #f3e5f5;
      --bg-goals: #ffe4f2;
      --bg-progress: #fffde7;
      --ink: #2b2a28;
      --accent: #f48fb1;
      --heading: #a64d79;
      --nav: #e0f8e9;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(166, 77, 121, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg-track);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
      transition: background 300ms ease;
    }

    body[data-tab="goals"] {
      background: var(--bg-goals);
    }

    body[data-tab="progress"] {
      background: var(--bg-progress);
    }

    .app {
      width: min(900px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1, h2 {
      font-family: "Fraunces", "Georgia", serif;
      color: var(--heading);
      margin: 0;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: var(--nav);
      border-radius: 999px;
      width: fit-content;
    }

    .tab {
      background: transparent;
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font: inherit;
      font-weight: 600;
      color: #6c757d;
      cursor: pointer;
    }

    .tab.active {
      background: #c8e6c9;
      color: var(--ink);
    }

    .page[hidden] {
      display: none;
    }

    .fields {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 14px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: #6f6a65;
    }

    input {
      font: inherit;
      padding: 10px 12px;
      border: none;
      border-radius: 8px;
      background: #fde2f3;
    }

    .goal-month {
      border: 1px solid rgba(166, 77, 121, 0.18);
      border-radius: 16px;
      padding: 14px;
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
    }

    .submit {
      margin-top: 18px;
      border: none;
      border-radius: 12px;
      padding: 12px 22px;
      font: inherit;
      font-weight: 600;
      color: white;
      background: var(--accent);
      cursor: pointer;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
    }

    #chart {
      width: 100%;
      height: 300px;
      display: block;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      font-size: 0.9rem;
    }

    .legend span::before {
      content: "";
      display: inline-block;
      width: 12px;
      height: 12px;
      border-radius: 50%;
      margin-right: 6px;
      background: var(--swatch);
    }

    .summary {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: #f8bbd0;
      border-radius: 10px;
      padding: 1em;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }
  </style>
</head>
<body data-tab="track">
  <main class="app">
    <nav class="tabs" role="tablist">
      <button class="tab active" type="button" data-tab="track">Track</button>
      <button class="tab" type="button" data-tab="goals">Set Goals</button>
      <button class="tab" type="button" data-tab="progress">Progress</button>
    </nav>

    <section class="page" id="page-track">
      <h1>Daily Measurement Tracker</h1>
      <form id="track-form">
        <div class="fields">
          <label>Date<input type="date" name="date" value="{{TODAY}}" required /></label>
          <label>Weight (kg)<input type="number" name="weight" min="0" step="0.1" value="0" /></label>
          <label>Chest (cm)<input type="number" name="chest" min="0" step="0.1" value="0" /></label>
          <label>Tummy (cm)<input type="number" name="tummy" min="0" step="0.1" value="0" /></label>
          <label>Glutes (cm)<input type="number" name="glutes" min="0" step="0.1" value="0" /></label>
        </div>
        <button class="submit" type="submit">Submit</button>
      </form>
    </section>

    <section class="page" id="page-goals" hidden>
      <h1>Set Monthly Goals</h1>
      <form id="goals-form">
        <div class="fields">{{GOAL_FIELDS}}
        </div>
        <button class="submit" type="submit">Save Goals</button>
      </form>
    </section>

    <section class="page" id="page-progress" hidden>
      <h1>Your Progress Overview</h1>
      <div class="chart-card">
        <svg id="chart" viewBox="0 0 600 300" aria-label="Measurement trends" role="img"></svg>
      </div>
      <div class="legend" id="legend"></div>
      <h2>Weekly Summary</h2>
      <div class="summary">
        <div class="stat">
          <span class="label">Avg Weight</span>
          <span class="value" id="avg-weight">--</span>
        </div>
        <div class="stat">
          <span class="label">Avg Tummy</span>
          <span class="value" id="avg-tummy">--</span>
        </div>
      </div>
      <p id="trend"></p>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const METRICS = [
      { key: 'weight', label: 'Weight', color: '#f06292' },
      { key: 'chest', label: 'Chest', color: '#ce93d8' },
      { key: 'tummy', label: 'Tummy', color: '#f8bbd0' },
      { key: 'glutes', label: 'Glutes', color: '#ba68c8' }
    ];

    const statusEl = document.getElementById('status');
    const chartEl = document.getElementById('chart');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const send = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const renderChart = (series) => {
      if (!series.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data available yet. Start tracking!</text>';
        return;
      }

      const width = 600;
      const height = 300;
      const paddingX = 44;
      const paddingY = 34;
      const top = 20;

      const values = series.flatMap((row) => METRICS.map((metric) => row[metric.key]));
      let min = Math.min(...values);
      let max = Math.max(...values);
      if (min === max) {
        min -= 1;
        max += 1;
      }

      const range = max - min;
      const dayOf = (row) => Date.parse(`${row.date}T00:00:00Z`) / 86400000;
      const firstDay = dayOf(series[0]);
      const span = dayOf(series[series.length - 1]) - firstDay;
      const scaleX = span > 0 ? (width - paddingX * 2) / span : 0;
      const scaleY = (height - top - paddingY) / range;
      const x = (row) => paddingX + (dayOf(row) - firstDay) * scaleX;
      const y = (value) => height - paddingY - (value - min) * scaleY;

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = min + (range * i) / 4;
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${y(value)}" x2="${width - paddingX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${paddingX - 10}" y="${y(value) + 4}" text-anchor="end">${value.toFixed(1)}</text>`;
      }

      const lines = METRICS.map((metric) => {
        const path = series
          .map((row, index) => `${index === 0 ? 'M' : 'L'} ${x(row).toFixed(2)} ${y(row[metric.key]).toFixed(2)}`)
          .join(' ');
        const points = series
          .map((row) => `<circle cx="${x(row)}" cy="${y(row[metric.key])}" r="4" fill="white" stroke="${metric.color}" stroke-width="2" />`)
          .join('');
        return `<path d="${path}" fill="none" stroke="${metric.color}" stroke-width="3" />${points}`;
      }).join('');

      const labelEvery = Math.max(1, Math.ceil(series.length / 8));
      const xLabels = series
        .map((row, index) => index % labelEvery === 0
          ? `<text class="chart-label" x="${x(row)}" y="${height - paddingY + 18}" text-anchor="middle">${row.date.slice(5)}</text>`
          : '')
        .join('');

      chartEl.innerHTML = `${grid}${lines}${xLabels}`;
    };

    const renderSummary = (summary) => {
      const trendEl = document.getElementById('trend');
      if (!summary) {
        document.getElementById('avg-weight').textContent = '--';
        document.getElementById('avg-tummy').textContent = '--';
        trendEl.textContent = '';
        return;
      }
      document.getElementById('avg-weight').textContent = `${summary.avg_weight.toFixed(1)} kg`;
      document.getElementById('avg-tummy').textContent = `${summary.avg_tummy.toFixed(1)} cm`;
      trendEl.textContent = summary.trend === 'improving'
        ? "Great job this week! You're making progress!"
        : 'Keep going! Every day counts!';
    };

    const loadProgress = async () => {
      const res = await fetch('/api/progress');
      if (!res.ok) {
        throw new Error(await res.text() || 'Unable to load progress');
      }
      const progress = await res.json();
      renderChart(progress.series);
      renderSummary(progress.weekly_summary);
    };

    const loadGoals = async () => {
      const res = await fetch('/api/goals');
      if (!res.ok) {
        throw new Error(await res.text() || 'Unable to load goals');
      }
      const goals = await res.json();
      goals.forEach((goal) => {
        METRICS.forEach((metric) => {
          const input = document.querySelector(`[data-month="${CSS.escape(goal.month)}"][data-metric="${metric.key}"]`);
          if (input) {
            input.value = goal[metric.key];
          }
        });
      });
    };

    const setActiveTab = (tab) => {
      document.body.dataset.tab = tab;
      tabs.forEach((button) => button.classList.toggle('active', button.dataset.tab === tab));
      ['track', 'goals', 'progress'].forEach((name) => {
        document.getElementById(`page-${name}`).hidden = name !== tab;
      });
      setStatus('', '');
      if (tab === 'progress') {
        loadProgress().catch((err) => setStatus(err.message, 'error'));
      } else if (tab === 'goals') {
        loadGoals().catch((err) => setStatus(err.message, 'error'));
      }
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setActiveTab(button.dataset.tab));
    });

    document.getElementById('legend').innerHTML = METRICS
      .map((metric) => `<span style="--swatch: ${metric.color}">${metric.label}</span>`)
      .join('');

    document.getElementById('track-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      const body = { date: form.get('date') };
      METRICS.forEach((metric) => {
        body[metric.key] = Number(form.get(metric.key));
      });
      setStatus('Saving...', 'info');
      send('/api/measurements', body)
        .then(() => setStatus('Your progress has been saved!', 'ok'))
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('goals-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const goals = new Map();
      document.querySelectorAll('[data-month]').forEach((input) => {
        const month = input.dataset.month;
        if (!goals.has(month)) {
          goals.set(month, { month });
        }
        goals.get(month)[input.dataset.metric] = Number(input.value);
      });
      setStatus('Saving...', 'info');
      send('/api/goals', { goals: Array.from(goals.values()) })
        .then(() => setStatus('Goals saved! You got this!', 'ok'))
        .catch((err) => setStatus(err.message, 'error'));
    });
  </script>
</body>
</html>
"#;
