use anyhow::{Context, Result, bail};

use crate::cli::RunParams;
use crate::config::Config;
use crate::data::loader::{Header, load_entity, load_pair, load_scalar, load_table};
use crate::data::model::{EntitySeries, ScalarSeries};
use crate::data::summary::summarize;
use crate::render::{Projection, artifact_path, chart_path, plot_lines, plot_pairs, render_animation};

// ---------------------------------------------------------------------------
// One function per subcommand: load everything, render, write.
// ---------------------------------------------------------------------------

/// Animate all entities, one GIF per configured projection (or just `only`).
pub fn mobility(config: &Config, only: Option<Projection>) -> Result<()> {
    let m = &config.mobility;
    let series: Vec<EntitySeries> = (0..m.entities)
        .map(|id| load_entity(&config.input(&m.source, &[("id", id)]), id))
        .collect::<Result<_>>()?;
    log::info!("Loaded {} entity series", series.len());

    let classifier = m.classifier()?;
    let views: Vec<_> = m
        .projections
        .iter()
        .filter(|v| only.map_or(true, |p| p == v.projection))
        .collect();
    if views.is_empty() {
        bail!("no projection configured to render");
    }

    for view in views {
        let spec = m.frame_spec(view, config.annotate);
        let path = artifact_path(&config.output_dir, &m.prefix, view.projection);
        render_animation(&series, &spec, &classifier, &path)
            .with_context(|| format!("rendering {}", path.display()))?;
    }
    Ok(())
}

/// Pair plots; all configured ones, or the one whose prefix matches.
pub fn distance(config: &Config, prefix: Option<&str>) -> Result<()> {
    let plots: Vec<_> = config
        .distance
        .iter()
        .filter(|p| prefix.map_or(true, |want| want == p.prefix))
        .collect();
    if plots.is_empty() {
        bail!("no pair plot configured with prefix {:?}", prefix.unwrap_or_default());
    }

    for plot in plots {
        let pairs = plot
            .pairs
            .iter()
            .map(|&(u, v)| {
                log::debug!("loading pair {u}-{v}");
                load_pair(
                    &config.input(&plot.source, &[("u", u), ("v", v)]),
                    u,
                    v,
                    &plot.value_column,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let path = chart_path(&config.output_dir, &plot.prefix);
        plot_pairs(&pairs, &plot.chart.spec(None, config.annotate), &path)
            .with_context(|| format!("plotting {}", path.display()))?;
    }
    Ok(())
}

/// One line per configured node.
pub fn velocity(config: &Config) -> Result<()> {
    let v = &config.velocity;
    let series = v
        .nodes
        .iter()
        .map(|&id| {
            let label = crate::config::expand(&v.label, &[("id", id)]);
            load_scalar(
                &config.input(&v.source, &[("id", id)]),
                &v.value_column,
                Some(label),
            )
        })
        .collect::<Result<Vec<ScalarSeries>>>()?;
    let path = chart_path(&config.output_dir, &v.prefix);
    plot_lines(&series, &v.chart.spec(None, config.annotate), &path)
        .with_context(|| format!("plotting {}", path.display()))?;
    Ok(())
}

/// The aggregate counter of one run, named and titled by its parameters.
pub fn total_rx(config: &Config, params: &RunParams) -> Result<()> {
    let t = &config.total_rx;
    let series = load_scalar(&config.input(&t.source, &[]), &t.value_column, None)?;
    let path = chart_path(&config.output_dir, &params.prefix(&t.prefix));
    plot_lines(
        &[series],
        &t.chart.spec(Some(params.title()), config.annotate),
        &path,
    )
    .with_context(|| format!("plotting {}", path.display()))?;
    Ok(())
}

/// The sweep table sorted by `sort_by` and its correlation matrix, as text or JSON.
pub fn corr(config: &Config, sort_by: Option<&str>, json: bool) -> Result<String> {
    let c = &config.correlation;
    let header = if c.columns.is_empty() {
        Header::Present
    } else {
        Header::Names(c.columns.clone())
    };
    let table = load_table(&config.input(&c.source, &[]), &header)?;
    let summary = summarize(&table, sort_by.unwrap_or(&c.sort_by))?;

    if json {
        Ok(serde_json::to_string_pretty(&summary)?)
    } else {
        Ok(format!("{}\n{}", summary.sorted, summary.correlation))
    }
}
