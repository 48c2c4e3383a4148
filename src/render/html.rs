use crate::model::ScalingReport;

/// Render a self-contained HTML report (data embedded as JSON).
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(data: &ScalingReport) -> anyhow::Result<String> {
    // `</` inside a string would otherwise end the script element.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>TAU Scaling Report</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  main { padding: 12px 16px; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .muted { color: #777; font-size: 12px; }

  .charts { display: grid; grid-template-columns: repeat(auto-fill, minmax(560px, 1fr)); gap: 16px; }
  .chart { border: 1px solid #eee; border-radius: 6px; padding: 8px; }
  .chart h3 { margin: 4px 0 8px; font-size: 15px; }
  svg text { font-size: 11px; fill: #333; }
  .legend { display: flex; flex-wrap: wrap; gap: 12px; font-size: 12px; margin-top: 4px; }
  .swatch { display: inline-block; width: 18px; height: 0; border-top: 2px solid; vertical-align: middle; margin-right: 4px; }

  table { border-collapse: collapse; width: 100%; margin: 8px 0 24px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<main>
  <div class="charts" id="charts"></div>
  <div id="tables"></div>
</main>

<script>
// Embedded report data (JSON object literal)
const DATA = __DATA__;

const COLORS = { blocking: "#1f77b4", nonblocking: "#ff7f0e" };
const LABELS = { blocking: "Blocking", nonblocking: "Non-Blocking" };
const SVGNS = "http://www.w3.org/2000/svg";

function group(comm, scaling) {
  return DATA.groups.find(g => g.comm_mode === comm && g.scaling === scaling) || { rows: [] };
}

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function el(name, attrs, text) {
  const e = document.createElementNS(SVGNS, name);
  for (const [k, v] of Object.entries(attrs)) e.setAttribute(k, v);
  if (text !== undefined) e.textContent = text;
  return e;
}

function renderSummary() {
  const counts = DATA.groups.map(g =>
    `<span class="pill">${g.comm_mode} ${g.scaling}: <b>${g.rows.length}</b></span>`).join("");
  document.getElementById("summary").innerHTML =
    `<span class="pill">experiments: <b>${DATA.experiments}</b></span>` + counts;
}

// series: [{ name, color, dash, points: [[x, y], ...] }]
// opts: { title, ylabel, yMin, yMax, hline, fmt }
function lineChart(series, opts) {
  const W = 560, H = 340, L = 60, R = 16, T = 16, B = 44;
  const pts = series.flatMap(s => s.points);
  const box = document.createElement("div");
  box.className = "chart";
  box.innerHTML = `<h3>${escapeHtml(opts.title)}</h3>`;
  if (!pts.length) {
    box.innerHTML += `<div class="muted">no data</div>`;
    return box;
  }

  const xs = [...new Set(pts.map(p => p[0]))].sort((a, b) => a - b);
  const ys = pts.map(p => p[1]).concat(opts.hline !== undefined ? [opts.hline] : []);
  let y0 = opts.yMin !== undefined ? opts.yMin : Math.min(0, ...ys);
  let y1 = opts.yMax !== undefined ? opts.yMax : Math.max(...ys) * 1.1;
  if (y1 <= y0) y1 = y0 + 1;
  const x0 = xs[0], x1 = xs.length > 1 ? xs[xs.length - 1] : xs[0] + 1;

  const sx = x => L + (x - x0) / (x1 - x0) * (W - L - R);
  const sy = y => H - B - (y - y0) / (y1 - y0) * (H - T - B);

  const svg = el("svg", { width: W, height: H, viewBox: `0 0 ${W} ${H}` });
  svg.appendChild(el("line", { x1: L, y1: H - B, x2: W - R, y2: H - B, stroke: "#999" }));
  svg.appendChild(el("line", { x1: L, y1: T, x2: L, y2: H - B, stroke: "#999" }));

  for (const x of xs) {
    svg.appendChild(el("text", { x: sx(x), y: H - B + 16, "text-anchor": "middle" }, x));
  }
  for (let i = 0; i <= 5; i++) {
    const v = y0 + (y1 - y0) * i / 5;
    svg.appendChild(el("line", { x1: L, y1: sy(v), x2: W - R, y2: sy(v), stroke: "#eee" }));
    svg.appendChild(el("text", { x: L - 6, y: sy(v) + 4, "text-anchor": "end" }, v.toFixed(1)));
  }
  svg.appendChild(el("text", { x: (L + W - R) / 2, y: H - 8, "text-anchor": "middle" }, "Number of Processors"));
  svg.appendChild(el("text", { x: 14, y: (T + H - B) / 2, "text-anchor": "middle",
    transform: `rotate(-90 14 ${(T + H - B) / 2})` }, opts.ylabel));

  if (opts.hline !== undefined) {
    svg.appendChild(el("line", { x1: L, y1: sy(opts.hline), x2: W - R, y2: sy(opts.hline),
      stroke: "black", "stroke-dasharray": "6 4", opacity: 0.5 }));
  }

  for (const s of series) {
    if (!s.points.length) continue;
    const d = s.points.map((p, i) => `${i ? "L" : "M"}${sx(p[0])},${sy(p[1])}`).join(" ");
    svg.appendChild(el("path", { d, fill: "none", stroke: s.color, "stroke-width": s.width || 2,
      "stroke-dasharray": s.dash || "", opacity: s.opacity || 1 }));
    for (const p of s.points) {
      svg.appendChild(el("circle", { cx: sx(p[0]), cy: sy(p[1]), r: 3, fill: s.color, opacity: s.opacity || 1 }));
      if (s.annotate) {
        svg.appendChild(el("text", { x: sx(p[0]), y: sy(p[1]) - 8, "text-anchor": "middle", opacity: 0.7 },
          opts.fmt(p[1])));
      }
    }
  }
  box.appendChild(svg);

  const legend = document.createElement("div");
  legend.className = "legend";
  const entries = series.map(s => ({ name: s.name, color: s.color, dash: s.dash }));
  if (opts.hline !== undefined) entries.push({ name: opts.hlineLabel, color: "black", dash: "6 4" });
  legend.innerHTML = entries.map(e =>
    `<span><span class="swatch" style="border-color:${e.color};border-top-style:${e.dash ? "dashed" : "solid"}"></span>${escapeHtml(e.name)}</span>`
  ).join("");
  box.appendChild(legend);
  return box;
}

function points(rows, field) {
  return rows.filter(r => r[field] !== null).map(r => [r.processors, r[field]]);
}

function timeChart(scaling, title) {
  const series = [];
  for (const comm of ["blocking", "nonblocking"]) {
    const rows = group(comm, scaling).rows;
    series.push({ name: `${LABELS[comm]} Total`, color: COLORS[comm], width: 2.5, annotate: true,
      points: points(rows, "total_time") });
    series.push({ name: `${LABELS[comm]} Comm`, color: COLORS[comm], dash: "6 4", opacity: 0.6,
      points: points(rows, "comm_time") });
    series.push({ name: `${LABELS[comm]} Comp`, color: COLORS[comm], dash: "2 3", opacity: 0.5,
      points: points(rows, "comp_time") });
  }
  return lineChart(series, { title, ylabel: "Execution Time (seconds)", fmt: v => `${v.toFixed(1)}s` });
}

function metricChart(scaling, field, title, ylabel, fmt, extra) {
  const series = ["blocking", "nonblocking"].map(comm => ({
    name: `${LABELS[comm]} MPI`, color: COLORS[comm], annotate: true,
    points: points(group(comm, scaling).rows, field),
  }));
  return lineChart(series.concat(extra.series || []), Object.assign({ title, ylabel, fmt }, extra.opts || {}));
}

function idealSpeedup() {
  const rows = group("blocking", "strong").rows;
  if (!rows.length) return [];
  const base = rows[0].processors;
  return [{ name: "Ideal Speedup", color: "black", dash: "6 4", opacity: 0.5,
    points: rows.map(r => [r.processors, r.processors / base]) }];
}

function renderCharts() {
  const root = document.getElementById("charts");
  const pct = v => `${v.toFixed(1)}%`;
  const ideal = { hline: 100, hlineLabel: "Ideal (100%)", yMin: 0, yMax: 110 };
  root.appendChild(timeChart("strong", "Strong Scaling: Execution Time Comparison"));
  root.appendChild(timeChart("weak", "Weak Scaling: Execution Time Comparison"));
  root.appendChild(metricChart("strong", "speedup", "Strong Scaling: Speedup Comparison", "Speedup",
    v => `${v.toFixed(2)}x`, { series: idealSpeedup() }));
  root.appendChild(metricChart("strong", "efficiency", "Strong Scaling: Efficiency Comparison", "Efficiency (%)",
    pct, { opts: ideal }));
  root.appendChild(metricChart("weak", "efficiency", "Weak Scaling: Efficiency Comparison", "Efficiency (%)",
    pct, { opts: ideal }));
}

function renderTables() {
  const root = document.getElementById("tables");
  for (const g of DATA.groups) {
    if (!g.rows.length) continue;
    const strong = g.scaling === "strong";
    const h = document.createElement("h2");
    h.textContent = `${LABELS[g.comm_mode]} / ${g.scaling} scaling`;
    root.appendChild(h);

    const tbl = document.createElement("table");
    tbl.innerHTML = `
      <thead><tr>
        <th class="num">processors</th><th class="num">nodes</th>
        <th class="num">total_time</th><th class="num">comm_time</th><th class="num">comp_time</th>
        <th class="num">comm_percent</th>${strong ? '<th class="num">speedup</th>' : ""}
        <th class="num">efficiency</th>
      </tr></thead>`;
    const body = document.createElement("tbody");
    for (const r of g.rows) {
      const tr = document.createElement("tr");
      tr.innerHTML = `
        <td class="num">${r.processors}</td>
        <td class="num">${r.nodes}</td>
        <td class="num">${r.total_time.toFixed(4)}</td>
        <td class="num">${r.comm_time.toFixed(4)}</td>
        <td class="num">${r.comp_time.toFixed(4)}</td>
        <td class="num">${r.comm_percent.toFixed(2)}</td>
        ${strong ? `<td class="num">${r.speedup.toFixed(2)}</td>` : ""}
        <td class="num">${r.efficiency.toFixed(2)}</td>
      `;
      body.appendChild(tr);
    }
    tbl.appendChild(body);
    root.appendChild(tbl);
  }
}

renderSummary();
renderCharts();
renderTables();
</script>
</body>
</html>
"##;

    Ok(TEMPLATE.replace("__DATA__", &json))
}
