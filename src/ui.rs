use crate::calendar::{CalendarGrid, GridCell, WEEKDAY_LABELS};
use crate::tooltip::TooltipContent;
use std::fmt::Write;

pub fn render_index(today: &str) -> String {
    INDEX_HTML.replace("{{TODAY}}", today)
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn entries_word(count: u32) -> &'static str {
    if count == 1 { "entry" } else { "entries" }
}

pub fn render_tooltip(content: &TooltipContent) -> String {
    let mut html = format!(
        r#"<div class="tooltip-date">{}</div>"#,
        escape_html(&content.date_label)
    );
    let Some(average) = content.average_score else {
        html.push_str(r#"<div class="tooltip-empty"><em>No entries</em></div>"#);
        return html;
    };

    let _ = write!(
        html,
        r#"<div class="tooltip-summary"><strong>{average:.1}/5</strong> <span>({} {})</span></div>"#,
        content.entries_count,
        entries_word(content.entries_count)
    );

    if !content.chips.is_empty() {
        html.push_str(r#"<div class="tooltip-scores">Scores: "#);
        for chip in &content.chips {
            let _ = write!(
                html,
                r#"<span class="chip" style="background: {};">{}×{}</span>"#,
                chip.color, chip.score, chip.count
            );
        }
        html.push_str("</div>");
    }

    if !content.mood_types.is_empty() {
        let types: Vec<String> = content.mood_types.iter().map(|t| escape_html(t)).collect();
        let _ = write!(
            html,
            r#"<div class="tooltip-types">{}{}</div>"#,
            types.join(", "),
            if content.more_types { "..." } else { "" }
        );
    }
    html
}

pub fn render_board(grid: &CalendarGrid) -> String {
    let mut html = format!(
        r#"<div class="board" data-year="{}" data-month="{}"><div class="board-title">{}</div><div class="board-grid">"#,
        grid.cursor.year,
        grid.cursor.month,
        escape_html(&grid.title)
    );
    for label in WEEKDAY_LABELS {
        let _ = write!(html, r#"<div class="cell header">{label}</div>"#);
    }

    for cell in &grid.cells {
        let day = match cell {
            GridCell::Blank => {
                html.push_str(r#"<div class="cell blank"></div>"#);
                continue;
            }
            GridCell::Day(day) => day,
        };

        let class = if day.is_today { "cell day today" } else { "cell day" };
        let _ = write!(
            html,
            r#"<div class="{class}" data-date="{}" data-has-data="{}" style="background-color: {};">{}"#,
            day.date, day.has_dot, day.color, day.day
        );
        if day.has_dot {
            html.push_str(r#"<span class="dot"></span>"#);
        }
        if let Some(count) = day.badge {
            let _ = write!(
                html,
                r#"<span class="badge" title="{count} entries">{count}</span>"#
            );
        }
        let _ = write!(
            html,
            r#"<template class="tip">{}</template></div>"#,
            render_tooltip(&TooltipContent::for_day(&day.info))
        );
    }

    html.push_str("</div></div>");
    html
}

pub fn render_board_error(message: &str) -> String {
    format!(
        r#"<div class="board-error">Calendar failed to load<br><small>{}</small></div>"#,
        escape_html(message)
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mood Flow</title>
  <style>
    :root {
      --bg: #f4f6fb;
      --ink: #2d3748;
      --muted: #718096;
      --card: #ffffff;
      --accent: #5a67d8;
      --shadow: 0 18px 40px rgba(45, 55, 72, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      padding: 28px 16px 48px;
    }

    .app {
      width: min(980px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    h1, h2 {
      margin: 0 0 12px;
    }

    form, .filters, .range {
      display: grid;
      gap: 10px;
    }

    .scores {
      display: flex;
      gap: 8px;
    }

    .score-btn {
      flex: 1;
      border: 2px solid #e2e8f0;
      background: white;
      border-radius: 10px;
      padding: 8px 0;
      cursor: pointer;
    }

    .score-btn.active {
      border-color: var(--accent);
      font-weight: 600;
    }

    button.primary {
      background: var(--accent);
      color: white;
      border: none;
      border-radius: 10px;
      padding: 10px 16px;
      cursor: pointer;
    }

    .message {
      display: none;
      padding: 10px 14px;
      border-radius: 10px;
    }

    .message.info { background: #ebf4ff; }
    .message.success { background: #e6fffa; }
    .message.error { background: #fff5f5; color: #c53030; }

    .mood-list {
      display: grid;
      gap: 12px;
    }

    .mood-card {
      border-left: 6px solid #e2e8f0;
      padding: 12px 16px;
      border-radius: 10px;
      background: #f7fafc;
    }

    .mood-date, .stat-hint {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .distribution-bar {
      background: #edf2f7;
      border-radius: 6px;
      height: 10px;
    }

    .distribution-fill {
      height: 100%;
      border-radius: 6px;
    }

    .mood-type-badge {
      display: inline-flex;
      gap: 6px;
      padding: 4px 10px;
      margin: 4px;
      border-radius: 999px;
      background: #edf2f7;
    }

    .board-nav {
      display: flex;
      align-items: center;
      justify-content: space-between;
    }

    .board-title {
      display: none;
    }

    .board-grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }

    .cell {
      position: relative;
      aspect-ratio: 1;
      border-radius: 8px;
      display: flex;
      align-items: center;
      justify-content: center;
      font-size: 0.9rem;
    }

    .cell.header {
      aspect-ratio: auto;
      color: var(--muted);
      font-weight: 600;
    }

    .cell.blank {
      visibility: hidden;
    }

    .cell.day {
      cursor: pointer;
    }

    .cell.today {
      outline: 3px solid var(--accent);
    }

    .dot {
      position: absolute;
      top: 4px;
      right: 4px;
      width: 6px;
      height: 6px;
      border-radius: 50%;
      background: white;
    }

    .badge {
      position: absolute;
      bottom: 2px;
      right: 4px;
      font-size: 0.7rem;
      font-weight: 700;
    }

    .board-error {
      grid-column: 1 / -1;
      text-align: center;
      padding: 20px;
      color: #e53e3e;
    }

    #dayTooltip {
      position: absolute;
      display: none;
      max-width: 260px;
      background: #2d3748;
      color: white;
      border-radius: 10px;
      padding: 10px 12px;
      font-size: 0.85rem;
      pointer-events: none;
      transition: opacity 150ms ease, transform 150ms ease;
      z-index: 10;
    }

    #dayTooltip .chip {
      display: inline-block;
      margin: 0 2px;
      padding: 1px 4px;
      color: white;
      border-radius: 3px;
    }

    #dayTooltip .tooltip-types, #dayTooltip .tooltip-empty {
      color: #a0aec0;
      margin-top: 6px;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Mood Flow</h1>
      <div id="message" class="message"></div>
    </header>

    <section class="card">
      <h2>How do you feel?</h2>
      <form id="moodForm">
        <input id="mood_type" maxlength="50" placeholder="Mood type (happy, calm, ...)" />
        <div class="scores">
          <button type="button" class="score-btn" data-value="1">1</button>
          <button type="button" class="score-btn" data-value="2">2</button>
          <button type="button" class="score-btn active" data-value="3">3</button>
          <button type="button" class="score-btn" data-value="4">4</button>
          <button type="button" class="score-btn" data-value="5">5</button>
        </div>
        <input type="hidden" id="mood_score" value="3" />
        <textarea id="notes" maxlength="500" placeholder="What happened?"></textarea>
        <small><span id="charCount">0</span>/500</small>
        <button class="primary" type="submit">Save mood</button>
      </form>
    </section>

    <section class="card">
      <div class="board-nav">
        <button id="prevMonthBtn" type="button">&larr;</button>
        <h2 id="currentMonth">&nbsp;</h2>
        <button id="nextMonthBtn" type="button">&rarr;</button>
      </div>
      <div id="moodCalendar"></div>
    </section>

    <section class="card">
      <h2>Statistics</h2>
      <div class="range">
        <input type="date" id="startDate" />
        <input type="date" id="endDate" value="{{TODAY}}" />
        <button class="primary" id="loadStatsBtn" type="button">Load statistics</button>
      </div>
      <div id="statsContent"></div>
    </section>

    <section class="card mood-list-section">
      <h2>Entries</h2>
      <div class="filters">
        <input type="date" id="filterDate" />
        <input id="filterType" placeholder="Mood type" />
        <div>
          <button id="applyFilters" type="button">Apply</button>
          <button id="clearFilters" type="button">Clear</button>
          <button id="refreshBtn" type="button">Refresh</button>
        </div>
      </div>
      <div id="emptyState" style="display: none;">No entries yet.</div>
      <div id="moodList" class="mood-list"></div>
    </section>
  </main>
  <div id="dayTooltip"></div>

  <script>
    const COLORS = { 1: '#ef4444', 2: '#f97316', 3: '#eab308', 4: '#62f28b', 5: '#048509' };
    const colorFor = (score) => COLORS[score] || '#e2e8f0';
    const $ = (id) => document.getElementById(id);

    const messageEl = $('message');
    const tooltip = $('dayTooltip');
    const calendarEl = $('moodCalendar');

    const today = new Date('{{TODAY}}T00:00:00');
    const weekAgo = new Date(today);
    weekAgo.setDate(today.getDate() - 7);
    $('startDate').value = weekAgo.toISOString().slice(0, 10);

    let filters = { date_filter: null, mood_type: null };
    let cursor = { year: today.getFullYear(), month: today.getMonth() + 1 };
    let messageTimer = null;

    const escapeHtml = (value) => String(value).replace(/[&<>"']/g, (c) => ({
      '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
    }[c]));

    const showMessage = (text, type, dismissAfter) => {
      clearTimeout(messageTimer);
      messageEl.textContent = text;
      messageEl.className = `message ${type || 'info'}`;
      messageEl.style.display = 'block';
      if (dismissAfter) {
        messageTimer = setTimeout(hideMessage, dismissAfter);
      }
    };

    const hideMessage = () => {
      messageEl.style.display = 'none';
    };

    const fetchJson = async (url, options) => {
      const res = await fetch(url, options);
      if (!res.ok) {
        let detail = `HTTP error ${res.status}`;
        try {
          detail = (await res.json()).detail || detail;
        } catch (_) {}
        throw new Error(detail);
      }
      return res.json();
    };

    const renderMoods = (moods) => {
      moods.sort((a, b) => new Date(b.created_at) - new Date(a.created_at));
      $('emptyState').style.display = moods.length ? 'none' : 'block';
      $('moodList').innerHTML = moods.map((mood) => `
        <div class="mood-card" style="border-left-color: ${colorFor(mood.mood_score)};">
          <strong>${escapeHtml(mood.mood_type)}</strong> &middot; ${mood.mood_score}/5
          <div class="mood-date">${mood.date} &middot; ${new Date(mood.created_at).toLocaleString()}</div>
          ${mood.notes ? `<div>${escapeHtml(mood.notes)}</div>` : ''}
        </div>`).join('');
    };

    const loadMoods = async () => {
      const url = new URL('/moods/', window.location.origin);
      if (filters.date_filter) url.searchParams.append('date_filter', filters.date_filter);
      if (filters.mood_type) url.searchParams.append('mood_type', filters.mood_type);
      try {
        renderMoods(await fetchJson(url));
      } catch (err) {
        showMessage(`Could not load entries: ${err.message}`, 'error');
      }
    };

    const applyFilters = (date, type) => {
      filters = { date_filter: date || null, mood_type: (type || '').trim() || null };
      loadMoods();
      if (filters.date_filter || filters.mood_type) {
        showMessage('Filters applied', 'info', 2000);
      }
    };

    const loadCalendar = async () => {
      hideTooltipNow();
      calendarEl.style.opacity = '0.5';
      try {
        const res = await fetch(`/board/?year=${cursor.year}&month=${cursor.month}`);
        calendarEl.innerHTML = await res.text();
        const title = calendarEl.querySelector('.board-title');
        $('currentMonth').textContent = title ? title.textContent : '';
      } catch (err) {
        calendarEl.innerHTML = `<div class="board-error">Calendar failed to load<br><small>${escapeHtml(err.message)}</small></div>`;
      }
      calendarEl.style.opacity = '1';
    };

    const changeMonth = (delta) => {
      const index = cursor.year * 12 + cursor.month - 1 + delta;
      cursor = { year: Math.floor(index / 12), month: (index % 12 + 12) % 12 + 1 };
      loadCalendar();
    };

    // hover intent: 100ms before showing, 200ms grace before hiding
    let showTimer = null;
    let hideTimer = null;
    let activeCell = null;

    const hideTooltipNow = () => {
      clearTimeout(showTimer);
      clearTimeout(hideTimer);
      activeCell = null;
      tooltip.style.display = 'none';
    };

    const showTooltip = (cell) => {
      const template = cell.querySelector('template.tip');
      tooltip.innerHTML = template ? template.innerHTML : '';
      tooltip.style.visibility = 'hidden';
      tooltip.style.display = 'block';
      requestAnimationFrame(() => {
        const rect = cell.getBoundingClientRect();
        const scrollX = window.pageXOffset;
        const scrollY = window.pageYOffset;
        const width = tooltip.offsetWidth;
        const height = tooltip.offsetHeight;
        let left = rect.left + scrollX + rect.width / 2 - width / 2;
        if (left > window.innerWidth - width - 10) left = window.innerWidth - width - 10;
        if (left < 10) left = 10;
        let top = rect.top + scrollY - height - 8;
        if (top < scrollY + 10) top = rect.top + scrollY + rect.height + 8;
        tooltip.style.left = `${left}px`;
        tooltip.style.top = `${top}px`;
        tooltip.style.visibility = 'visible';
      });
    };

    calendarEl.addEventListener('mouseover', (event) => {
      const cell = event.target.closest('.cell.day');
      if (!cell || cell.contains(event.relatedTarget)) return;
      clearTimeout(hideTimer);
      if (cell === activeCell && tooltip.style.display === 'block') return;
      activeCell = cell;
      clearTimeout(showTimer);
      showTimer = setTimeout(() => {
        if (activeCell === cell) showTooltip(cell);
      }, 100);
    });

    calendarEl.addEventListener('mouseout', (event) => {
      const cell = event.target.closest('.cell.day');
      if (!cell || cell.contains(event.relatedTarget)) return;
      clearTimeout(showTimer);
      hideTimer = setTimeout(() => {
        if (activeCell === cell) hideTooltipNow();
      }, 200);
    });

    calendarEl.addEventListener('click', (event) => {
      const cell = event.target.closest('.cell.day');
      if (!cell) return;
      if (cell.dataset.hasData === 'true') {
        $('filterDate').value = cell.dataset.date;
        applyFilters(cell.dataset.date, $('filterType').value);
        document.querySelector('.mood-list-section').scrollIntoView({ behavior: 'smooth' });
      } else {
        showMessage(`Selected date: ${cell.dataset.date}. Fill in the form.`, 'info');
      }
    });

    document.addEventListener('click', (event) => {
      if (!event.target.closest('.cell.day')) hideTooltipNow();
    });

    const renderStatistics = (stats) => {
      const buckets = {};
      (stats.entries_data || []).forEach((entry) => {
        buckets[entry.mood_score] = (buckets[entry.mood_score] || 0) + 1;
      });
      const bars = Object.entries(buckets).sort((a, b) => a[0] - b[0]).map(([score, count]) => {
        const pct = ((count / stats.total_entries) * 100).toFixed(1);
        return `<div>Score ${score}: ${count} (${pct}%)
          <div class="distribution-bar"><div class="distribution-fill" style="width: ${pct}%; background: ${colorFor(score)};"></div></div></div>`;
      }).join('') || '<div>No score data</div>';
      const types = Object.entries(stats.mood_types || {}).map(([type, count]) => {
        const label = type.length > 15 ? `${type.substring(0, 15)}...` : type;
        return `<span class="mood-type-badge" title="${escapeHtml(type)}">${escapeHtml(label)} <b>${count}</b></span>`;
      }).join('') || '<div>No data</div>';
      $('statsContent').innerHTML = `
        <p>Average score: <strong>${stats.average_score || 0}</strong> <span class="stat-hint">on a 1 to 5 scale</span></p>
        <p>Entries in range: <strong>${stats.total_entries || 0}</strong></p>
        ${bars}
        <div>${types}</div>`;
    };

    $('loadStatsBtn').addEventListener('click', async () => {
      const start = $('startDate').value;
      const end = $('endDate').value;
      if (!start || !end) {
        showMessage('Please choose both a start and an end date', 'error');
        return;
      }
      try {
        const url = new URL('/moods/statistics/', window.location.origin);
        url.searchParams.append('start_date', start);
        url.searchParams.append('end_date', end);
        renderStatistics(await fetchJson(url));
        hideMessage();
      } catch (err) {
        showMessage(`Error: ${err.message}`, 'error');
      }
    });

    document.querySelectorAll('.score-btn').forEach((button) => {
      button.addEventListener('click', () => {
        document.querySelectorAll('.score-btn').forEach((b) => b.classList.remove('active'));
        button.classList.add('active');
        $('mood_score').value = button.dataset.value;
      });
    });

    $('notes').addEventListener('input', () => {
      $('charCount').textContent = $('notes').value.length;
    });

    $('moodForm').addEventListener('submit', async (event) => {
      event.preventDefault();
      const payload = {
        mood_type: $('mood_type').value.trim(),
        mood_score: parseInt($('mood_score').value, 10),
        notes: $('notes').value.trim() || null
      };
      if (!payload.mood_type) {
        showMessage('Please enter a mood type', 'error');
        return;
      }
      if (payload.mood_type.length > 50) {
        showMessage('Mood type must be at most 50 characters', 'error');
        return;
      }
      if (!(payload.mood_score >= 1 && payload.mood_score <= 5)) {
        showMessage('Score must be between 1 and 5', 'error');
        return;
      }
      try {
        showMessage('Saving mood...', 'info');
        await fetchJson('/moods/', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify(payload)
        });
        $('moodForm').reset();
        $('mood_score').value = '3';
        document.querySelectorAll('.score-btn').forEach((b, i) => b.classList.toggle('active', i === 2));
        $('charCount').textContent = '0';
        showMessage('Mood saved!', 'success', 1500);
        loadMoods();
        loadCalendar();
      } catch (err) {
        showMessage(`Error: ${err.message}`, 'error');
      }
    });

    $('applyFilters').addEventListener('click', () => applyFilters($('filterDate').value, $('filterType').value));
    $('clearFilters').addEventListener('click', () => {
      $('filterDate').value = '';
      $('filterType').value = '';
      filters = { date_filter: null, mood_type: null };
      loadMoods();
      showMessage('Filters cleared', 'info', 2000);
    });
    $('refreshBtn').addEventListener('click', loadMoods);
    $('prevMonthBtn').addEventListener('click', () => changeMonth(-1));
    $('nextMonthBtn').addEventListener('click', () => changeMonth(1));

    window.addEventListener('error', (event) => {
      showMessage(`Unexpected error: ${event.message}`, 'error');
    });
    window.addEventListener('unhandledrejection', (event) => {
      const reason = event.reason && event.reason.message ? event.reason.message : event.reason;
      showMessage(`Operation failed: ${reason}`, 'error');
    });

    loadMoods();
    loadCalendar();
  </script>
</body>
</html>
"#;
