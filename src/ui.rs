use crate::session::Session;

pub fn render_index(session: &Session) -> String {
    INDEX_HTML
        .replace("{{CRITERION}}", &escape_attr(session.attendance_criterion()))
        .replace("{{WORKING_DAYS}}", &escape_attr(session.working_days()))
        .replace("{{DURATION}}", &session.duration().to_string())
        .replace("{{MODE}}", session.mode().as_str())
        .replace("{{LECTURES}}", &session.last_lectures_per_week().to_string())
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Bunk Calculator</title>
  <style>
    :root {
      --bg: #111827;
      --surface: #1f2937;
      --ink: #e0e0e0;
      --muted: #9ca3af;
      --accent: #4c5c96;
      --safe: #22d3ee;
      --danger: #f87171;
      --border: #4a5568;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    .card {
      background: var(--surface);
      border-radius: 18px;
      padding: 20px;
      border: 1px solid var(--border);
      display: grid;
      gap: 16px;
    }

    .fields {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: var(--muted);
    }

    input {
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid var(--border);
      background: var(--bg);
      color: var(--ink);
      font-size: 1rem;
    }

    input.is-invalid {
      border-color: var(--danger);
    }

    .error {
      color: var(--danger);
      font-size: 0.8rem;
      min-height: 1em;
    }

    .toggle-buttons {
      display: flex;
      gap: 6px;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    .toggle-btn {
      background: transparent;
      border: 1px solid var(--border);
      color: var(--muted);
    }

    .toggle-btn.active {
      background: var(--accent);
      color: white;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      padding: 10px;
      text-align: left;
      border-bottom: 1px solid var(--border);
    }

    .editable-cell {
      cursor: text;
    }

    .safe {
      color: var(--safe);
    }

    .danger {
      color: var(--danger);
    }

    .remove-btn {
      background: transparent;
      color: var(--danger);
      padding: 4px 10px;
      font-size: 1.2rem;
    }

    #clear-all-btn {
      justify-self: end;
      background: var(--danger);
    }

    #chart {
      width: 100%;
      max-width: 360px;
      height: 360px;
      display: block;
      margin: 0 auto;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 10px 18px;
      justify-content: center;
      font-size: 0.9rem;
    }

    .legend span::before {
      content: "";
      display: inline-block;
      width: 10px;
      height: 10px;
      margin-right: 6px;
      border-radius: 2px;
      background: var(--swatch);
    }

    #toast-container {
      position: fixed;
      bottom: 20px;
      right: 20px;
      display: grid;
      gap: 8px;
    }

    .toast {
      background: var(--surface);
      border: 1px solid var(--border);
      padding: 10px 16px;
      border-radius: 10px;
      opacity: 0;
      transition: opacity 300ms ease;
    }

    .toast.show {
      opacity: 1;
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>Bunk Calculator</h1>

    <section class="card">
      <div class="fields">
        <label>Attendance criterion (%)
          <input id="attendance-criterion" value="{{CRITERION}}" inputmode="decimal" />
          <span class="error" id="attendanceCriterion-error"></span>
        </label>
        <label>Working days per week
          <input id="working-days" value="{{WORKING_DAYS}}" inputmode="numeric" />
          <span class="error" id="workingDays-error"></span>
        </label>
        <label><span id="duration-label">Semester Duration (weeks)</span>
          <input id="duration-input" value="{{DURATION}}" inputmode="decimal" />
          <span class="error" id="duration-error"></span>
        </label>
      </div>
      <div class="toggle-buttons" data-active="{{MODE}}">
        <button class="toggle-btn" type="button" data-mode="weeks">Weeks</button>
        <button class="toggle-btn" type="button" data-mode="days">Days</button>
        <button class="toggle-btn" type="button" data-mode="months">Months</button>
      </div>
    </section>

    <section class="card">
      <form id="add-subject-form" class="fields">
        <label>Subject name
          <input id="subject-name" autocomplete="off" />
          <span class="error" id="subjectName-error"></span>
        </label>
        <label>Lectures per week
          <input id="lectures-per-week" value="{{LECTURES}}" inputmode="numeric" />
          <span class="error" id="lecturesPerWeek-error"></span>
        </label>
        <button type="submit">Add subject</button>
      </form>
    </section>

    <section class="card">
      <table id="results-table">
        <thead>
          <tr>
            <th>Subject</th>
            <th>Total Lectures</th>
            <th>Min. Required</th>
            <th>Max Bunks</th>
            <th>Weekly Skip Limit</th>
            <th></th>
          </tr>
        </thead>
        <tbody></tbody>
      </table>
      <p id="empty-state">No subjects yet. Add one above.</p>
      <button id="clear-all-btn" type="button">Clear all</button>
    </section>

    <section class="card" id="dashboard-section">
      <h2>Lecture weightage</h2>
      <svg id="chart" viewBox="-1 -1 2 2" role="img" aria-label="Lecture weightage"></svg>
      <div class="legend" id="legend"></div>
    </section>
  </main>
  <div id="toast-container"></div>

  <script>
    const criterionInput = document.getElementById('attendance-criterion');
    const workingDaysInput = document.getElementById('working-days');
    const durationInput = document.getElementById('duration-input');
    const durationLabel = document.getElementById('duration-label');
    const toggle = document.querySelector('.toggle-buttons');
    const addForm = document.getElementById('add-subject-form');
    const nameInput = document.getElementById('subject-name');
    const lecturesInput = document.getElementById('lectures-per-week');
    const tbody = document.querySelector('#results-table tbody');
    const emptyState = document.getElementById('empty-state');
    const clearAllBtn = document.getElementById('clear-all-btn');
    const dashboard = document.getElementById('dashboard-section');
    const chartEl = document.getElementById('chart');
    const legendEl = document.getElementById('legend');
    const toasts = document.getElementById('toast-container');

    const configInputs = {
      attendanceCriterion: criterionInput,
      workingDays: workingDaysInput,
      duration: durationInput
    };
    const subjectInputs = {
      subjectName: nameInput,
      lecturesPerWeek: lecturesInput
    };
    const labels = {
      weeks: 'Semester Duration (weeks)',
      days: 'Total Working Days',
      months: 'Number of Months'
    };

    const showToast = (message) => {
      const toast = document.createElement('div');
      toast.className = 'toast';
      toast.textContent = message;
      toasts.appendChild(toast);
      setTimeout(() => toast.classList.add('show'), 100);
      setTimeout(() => {
        toast.classList.remove('show');
        setTimeout(() => toast.remove(), 300);
      }, 3000);
    };

    const showErrors = (inputs, errors) => {
      Object.entries(inputs).forEach(([field, input]) => {
        const error = errors.find((item) => item.field === field);
        input.classList.toggle('is-invalid', Boolean(error));
        document.getElementById(`${field}-error`).textContent = error ? error.message : '';
      });
    };

    const request = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
      });
      if (res.status === 422) {
        const failure = await res.json();
        return { failure: failure.errors };
      }
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return { view: await res.json() };
    };

    const cell = (text, className) => {
      const td = document.createElement('td');
      td.textContent = text;
      if (className) {
        td.className = className;
      }
      return td;
    };

    const renderRows = (view) => {
      tbody.innerHTML = '';
      view.rows.forEach((row) => {
        const tr = document.createElement('tr');
        const name = cell(row.name, 'editable-cell');
        name.contentEditable = 'true';
        name.addEventListener('blur', () => renameSubject(row.id, name.innerText, row.name));
        name.addEventListener('keydown', (event) => {
          if (event.key === 'Escape' || event.key === 'Enter') {
            event.preventDefault();
            name.blur();
          }
        });
        const actions = document.createElement('td');
        const remove = document.createElement('button');
        remove.className = 'remove-btn';
        remove.type = 'button';
        remove.textContent = '×';
        remove.setAttribute('aria-label', `Remove ${row.name}`);
        remove.addEventListener('click', () => removeSubject(row.id));
        actions.appendChild(remove);

        tr.append(
          name,
          cell(row.totalLectures),
          cell(row.requiredLectures),
          cell(row.maxBunkable, row.bunkableStanding),
          cell(row.weeklySkipLimit, row.skipLimitStanding),
          actions
        );
        tbody.appendChild(tr);
      });
    };

    const renderChart = (chart) => {
      chartEl.innerHTML = '';
      legendEl.innerHTML = '';
      if (!chart) {
        dashboard.style.display = 'none';
        return;
      }
      dashboard.style.display = 'grid';

      let angle = -Math.PI / 2;
      chart.slices.forEach((slice) => {
        const sweep = (slice.value / chart.totalPerWeek) * Math.PI * 2;
        let shape;
        if (chart.slices.length === 1) {
          shape = document.createElementNS('http://www.w3.org/2000/svg', 'circle');
          shape.setAttribute('r', '0.95');
        } else {
          const end = angle + sweep;
          const large = sweep > Math.PI ? 1 : 0;
          const x1 = (Math.cos(angle) * 0.95).toFixed(4);
          const y1 = (Math.sin(angle) * 0.95).toFixed(4);
          const x2 = (Math.cos(end) * 0.95).toFixed(4);
          const y2 = (Math.sin(end) * 0.95).toFixed(4);
          shape = document.createElementNS('http://www.w3.org/2000/svg', 'path');
          shape.setAttribute('d', `M 0 0 L ${x1} ${y1} A 0.95 0.95 0 ${large} 1 ${x2} ${y2} Z`);
          angle = end;
        }
        shape.setAttribute('fill', slice.color);
        shape.setAttribute('stroke', '#1F2937');
        shape.setAttribute('stroke-width', '0.01');
        const title = document.createElementNS('http://www.w3.org/2000/svg', 'title');
        title.textContent = `${slice.label}: ${slice.value} lectures/week (${slice.sharePercent.toFixed(1)}%)`;
        shape.appendChild(title);
        chartEl.appendChild(shape);

        const item = document.createElement('span');
        item.style.setProperty('--swatch', slice.color);
        item.textContent = slice.label;
        legendEl.appendChild(item);
      });
    };

    const render = (view) => {
      showErrors(configInputs, view.errors);
      emptyState.style.display = view.subjects.length === 0 ? 'block' : 'none';
      clearAllBtn.style.display = view.subjects.length === 0 ? 'none' : 'block';
      toggle.querySelectorAll('.toggle-btn').forEach((button) => {
        button.classList.toggle('active', button.dataset.mode === view.mode);
      });
      durationLabel.textContent = labels[view.mode];
      renderRows(view);
      renderChart(view.chart);
      if (view.notice) {
        showToast(view.notice);
      }
    };

    const run = (promise, inputs) =>
      promise
        .then(({ view, failure }) => {
          if (failure) {
            showErrors(inputs, failure);
            return null;
          }
          render(view);
          return view;
        })
        .catch((err) => showToast(err.message));

    const renameSubject = (id, value, previous) => {
      if (value.trim() === previous) {
        return;
      }
      request('PUT', `/api/subjects/${id}`, { name: value }).then(({ view, failure }) => {
        if (failure) {
          showToast('Subject name cannot be empty.');
          refresh();
          return;
        }
        render(view);
      }).catch((err) => showToast(err.message));
    };

    const removeSubject = (id) => run(request('DELETE', `/api/subjects/${id}`), {});

    const refresh = () => run(request('GET', '/api/session'), configInputs).then((view) => {
      if (view) {
        durationInput.value = view.duration;
      }
    });

    Object.entries(configInputs).forEach(([field, input]) => {
      input.addEventListener('input', () => {
        run(request('PUT', '/api/config', { [field]: input.value }), configInputs);
      });
    });

    toggle.addEventListener('click', (event) => {
      const mode = event.target.dataset.mode;
      if (!mode) {
        return;
      }
      run(request('PUT', '/api/mode', { mode }), configInputs).then((view) => {
        if (view) {
          durationInput.value = view.duration;
        }
      });
    });

    addForm.addEventListener('submit', (event) => {
      event.preventDefault();
      run(
        request('POST', '/api/subjects', { name: nameInput.value, lecturesPerWeek: lecturesInput.value }),
        subjectInputs
      ).then((view) => {
        if (view) {
          showErrors(subjectInputs, []);
          nameInput.value = '';
          lecturesInput.value = view.lastLecturesPerWeek;
          nameInput.focus();
        }
      });
    });

    clearAllBtn.addEventListener('click', () => {
      if (confirm('Are you sure you want to clear all subjects? This action cannot be undone.')) {
        run(request('POST', '/api/subjects/clear', { confirm: true }), {});
      }
    });

    refresh();
  </script>
</body>
</html>
"#;
