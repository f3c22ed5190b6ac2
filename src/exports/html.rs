use std::path::Path;

use serde::Serialize;

use crate::{error::ModelError, simulation::SimulationResult, summary::SimulationSummary};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-latest.min.js";

/// Payload embedded in the page; the plotting script reads its arrays
/// directly.
#[derive(Serialize)]
struct PlotData<'a> {
    time: &'a [f64],
    susceptible: &'a [f64],
    infected: &'a [f64],
    recovered: &'a [f64],
    hammer_threshold: f64,
    dance_threshold: f64,
}

const PLOT_SCRIPT: &str = r"
var tEnd = data.time.length > 0 ? data.time[data.time.length - 1] : 0;
Plotly.newPlot('sirGraph', [
    {x: data.time, y: data.susceptible, type: 'scatter', mode: 'lines', name: 'Susceptible (S)', line: {color: 'blue'}},
    {x: data.time, y: data.infected, type: 'scatter', mode: 'lines', name: 'Infected (I)', line: {color: 'red'}},
    {x: data.time, y: data.recovered, type: 'scatter', mode: 'lines', name: 'Recovered (R)', line: {color: 'green'}}
], {
    title: 'SIR model under dynamic Hammer & Dance control',
    xaxis: {title: 'Time (days)'},
    yaxis: {title: 'People'},
    showlegend: true
});
Plotly.newPlot('infectedGraph', [
    {x: data.time, y: data.infected, type: 'scatter', mode: 'lines', name: 'Infected', line: {color: 'red', width: 3}},
    {x: [0, tEnd], y: [data.hammer_threshold, data.hammer_threshold], type: 'scatter', mode: 'lines',
     name: 'Hammer threshold', line: {color: 'orange', width: 2, dash: 'dash'}},
    {x: [0, tEnd], y: [data.dance_threshold, data.dance_threshold], type: 'scatter', mode: 'lines',
     name: 'Dance threshold', line: {color: 'lightblue', width: 2, dash: 'dot'}}
], {
    title: 'Infected over time',
    xaxis: {title: 'Time (days)'},
    yaxis: {title: 'Infected'},
    showlegend: true
});
";

const STYLE: &str = "
body { font-family: Arial, sans-serif; margin: 20px; }
.graph-container { margin: 20px 0; }
.stats { background-color: #f0f0f0; padding: 15px; border-radius: 5px; margin: 20px 0; }
.control-info { background-color: #e3f2fd; padding: 15px; border-radius: 5px; margin: 20px 0; }
";

/// Render a self-contained HTML page plotting the run.
/// # Errors
/// - If the series cannot be serialized.
pub fn render(result: &SimulationResult) -> Result<String, ModelError> {
    let params = &result.params;
    let summary = SimulationSummary::from_result(result);
    let data = serde_json::to_string(&PlotData {
        time: &result.series.time,
        susceptible: &result.series.susceptible,
        infected: &result.series.infected,
        recovered: &result.series.recovered,
        hammer_threshold: params.hammer_threshold,
        dance_threshold: params.dance_threshold,
    })?;

    let release_rule = match (params.enforce_phase_timeouts, params.hammer_duration) {
        (true, Some(duration)) => format!(
            "when infections fall below {} or after {duration} days of hammer",
            params.dance_threshold
        ),
        _ => format!("when infections fall below {}", params.dance_threshold),
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Hammer &amp; Dance simulation</title>
    <script src="{PLOTLY_CDN}"></script>
    <style>{STYLE}</style>
</head>
<body>
    <h1>Epidemic simulation under a dynamic Hammer &amp; Dance strategy</h1>
    <div class="control-info">
        <h3>Control rules</h3>
        <p><strong>Hammer begins</strong> when infections exceed {hammer_threshold}</p>
        <p><strong>Dance resumes</strong> {release_rule}</p>
    </div>
    <div class="stats">
        <h3>Parameters</h3>
        <p>Population: {population} | Initial infected: {initial_infected} | Hammer transmission rate: {beta_hammer} | Dance transmission rate: {beta_dance} | Recovery rate: {gamma} | Step: {dt} days</p>
    </div>
    <div class="graph-container"><div id="sirGraph" style="width:100%;height:500px;"></div></div>
    <div class="graph-container"><div id="infectedGraph" style="width:100%;height:400px;"></div></div>
    <script>
var data = {data};
{PLOT_SCRIPT}
    </script>
    <div class="stats">
        <h3>Summary</h3>
        <p>Peak infected: {peak:.1} (day {peak_time:.1})</p>
        <p>Final susceptible: {s:.1}</p>
        <p>Final infected: {i:.1}</p>
        <p>Final recovered: {r:.1}</p>
        <p>Attack rate: {attack:.1}%</p>
        <p>Transitions: {d2h} to hammer, {h2d} to dance</p>
        <p>Simulated days: {days:.1}</p>
    </div>
</body>
</html>
"#,
        hammer_threshold = params.hammer_threshold,
        population = params.population,
        initial_infected = params.initial_infected,
        beta_hammer = params.beta_hammer,
        beta_dance = params.beta_dance,
        gamma = params.gamma,
        dt = params.dt,
        peak = summary.peak_infected,
        peak_time = summary.peak_time,
        s = summary.final_state.susceptible,
        i = summary.final_state.infected,
        r = summary.final_state.recovered,
        attack = summary.attack_rate * 100.0,
        d2h = summary.dance_to_hammer,
        h2d = summary.hammer_to_dance_threshold + summary.hammer_to_dance_timeout,
        days = summary.final_time,
    ))
}

/// # Errors
/// - If the page cannot be rendered or the file cannot be written.
pub fn write(result: &SimulationResult, path: &Path) -> Result<(), ModelError> {
    let page = render(result)?;
    std::fs::write(path, page)?;
    Ok(())
}
