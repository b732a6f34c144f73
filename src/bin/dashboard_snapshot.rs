use chart_join::api::{Dashboard, DashboardConfig};
use chart_join::render::{Renderer, SvgRenderer};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

const USAGE: &str = "usage: dashboard_snapshot --internet-use <csv> --gapminder <csv> --output <dir> [--config <json>] [--year <year>] [--cap <count>] [--chips <CODE,CODE>]";

#[derive(Debug, Default)]
struct CliArgs {
    internet_use: Option<PathBuf>,
    gapminder: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    year: Option<i32>,
    cap: Option<String>,
    chips: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ViewSummary {
    view_id: &'static str,
    file: String,
    rects: usize,
    circles: usize,
    paths: usize,
    lines: usize,
    texts: usize,
}

#[derive(Debug, Serialize)]
struct SnapshotSummary {
    settled_after_ms: f64,
    views: Vec<ViewSummary>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let _ = chart_join::telemetry::init_tracing("chart_join=info");
    let args = parse_args()?;
    let output = args.output.ok_or_else(|| USAGE.to_owned())?;

    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_path(path).map_err(|err| err.to_string())?,
        None => DashboardConfig::default(),
    };
    if let Some(path) = args.internet_use {
        config.internet_use_path = path;
    }
    if let Some(path) = args.gapminder {
        config.gapminder_path = path;
    }

    let mut dashboard = Dashboard::load(config);
    if let Some(year) = args.year {
        dashboard
            .select_year(year)
            .map_err(|err| format!("failed to select year {year}: {err}"))?;
    }
    if let Some(cap) = &args.cap {
        dashboard
            .set_scatter_cap(cap)
            .map_err(|err| format!("failed to apply cap `{cap}`: {err}"))?;
    }
    for code in &args.chips {
        dashboard
            .toggle_chip(code)
            .map_err(|err| format!("failed to toggle chip `{code}`: {err}"))?;
    }
    let settled_after_ms = dashboard.settle();

    fs::create_dir_all(&output)
        .map_err(|err| format!("failed to create `{}`: {err}", output.display()))?;

    let mut views = Vec::new();
    for (view_id, frame) in dashboard.frames() {
        let mut renderer = SvgRenderer::new();
        renderer
            .render(&frame)
            .map_err(|err| format!("failed to render {view_id}: {err}"))?;
        let file = format!("{view_id}.svg");
        let path = output.join(&file);
        fs::write(&path, renderer.document())
            .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?;
        views.push(ViewSummary {
            view_id,
            file,
            rects: frame.rects.len(),
            circles: frame.circles.len(),
            paths: frame.paths.len(),
            lines: frame.lines.len(),
            texts: frame.texts.len(),
        });
    }
    if views.is_empty() {
        return Err("no view could be built from the given data".to_owned());
    }

    let summary = SnapshotSummary {
        settled_after_ms,
        views,
    };
    write_json(&output.join("summary.json"), &summary)
}

fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize json: {err}"))?;
    fs::write(path, payload).map_err(|err| format!("failed to write `{}`: {err}", path.display()))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut parsed = CliArgs::default();

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--internet-use" => parsed.internet_use = Some(PathBuf::from(value()?)),
            "--gapminder" => parsed.gapminder = Some(PathBuf::from(value()?)),
            "--output" => parsed.output = Some(PathBuf::from(value()?)),
            "--config" => parsed.config = Some(PathBuf::from(value()?)),
            "--year" => {
                let raw = value()?;
                let year = raw
                    .parse::<i32>()
                    .map_err(|err| format!("invalid --year `{raw}`: {err}"))?;
                parsed.year = Some(year);
            }
            "--cap" => parsed.cap = Some(value()?),
            "--chips" => {
                parsed.chips = value()?
                    .split(',')
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .map(str::to_owned)
                    .collect();
            }
            "--help" | "-h" => return Err(USAGE.to_owned()),
            other => return Err(format!("unknown argument `{other}`\n{USAGE}")),
        }
    }

    Ok(parsed)
}
