use crate::config::toml_config::HazardsConfig;
use crate::core::loader::{FirePointDataLoader, FIRE_TAG};
use crate::core::selection::{filter_since, report_date_window, resolve_since, summary_line};
use crate::core::validation::coerce_records;
use crate::domain::fire_point::FirePoint;
use crate::domain::model::{OutputFile, Record, TransformResult, ValidationReport};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{HazardsError, Result};
use crate::visuals::maps::{make_deck, make_fire_popups};
use crate::visuals::page::render_html;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const CSV_FILE: &str = "fires.csv";
pub const DECK_FILE: &str = "fires_deck.json";
pub const HTML_FILE: &str = "fires_map.html";
pub const GEOJSON_FILE: &str = "fires.geojson";
pub const REPORT_FILE: &str = "validation_report.json";

/// NFDB fire points from download to rendered map.
pub struct FirePipeline<S: Storage> {
    storage: S,
    config: HazardsConfig,
    loader: FirePointDataLoader<HazardsConfig>,
    force_reload: bool,
}

impl<S: Storage> FirePipeline<S> {
    pub fn new(storage: S, config: HazardsConfig) -> Self {
        let loader =
            FirePointDataLoader::new(config.clone()).with_tolerance(config.validation.tolerance);
        Self {
            storage,
            config,
            loader,
            force_reload: false,
        }
    }

    pub fn with_force_reload(mut self, force_reload: bool) -> Self {
        self.force_reload = force_reload;
        self
    }

    fn render_outputs(
        &self,
        fires: &[FirePoint],
        displayed: &[&FirePoint],
        report: Option<&ValidationReport>,
        summary: &str,
    ) -> Result<Vec<OutputFile>> {
        let mut outputs = Vec::new();

        if self.config.wants("csv") {
            outputs.push(OutputFile {
                name: CSV_FILE.to_string(),
                contents: fires_to_csv(fires)?,
            });
        }

        let wants_deck = self.config.wants("json") || self.config.wants("html");
        if wants_deck {
            let deck = make_deck(displayed, &self.config.map_options()?);

            if self.config.wants("json") {
                outputs.push(OutputFile {
                    name: DECK_FILE.to_string(),
                    contents: serde_json::to_vec_pretty(&deck)?,
                });
            }

            if self.config.wants("html") {
                let preview_len = self.config.map.preview_rows.min(fires.len());
                let html = render_html(&self.config.app, &deck, &fires[..preview_len], summary)?;
                outputs.push(OutputFile {
                    name: HTML_FILE.to_string(),
                    contents: html.into_bytes(),
                });
            }
        }

        if self.config.wants("geojson") {
            let popups = make_fire_popups(displayed, self.config.map.zoom_start);
            outputs.push(OutputFile {
                name: GEOJSON_FILE.to_string(),
                contents: serde_json::to_vec_pretty(&popups)?,
            });
        }

        if let (true, Some(report)) = (self.config.wants("report"), report) {
            outputs.push(OutputFile {
                name: REPORT_FILE.to_string(),
                contents: serde_json::to_vec_pretty(report)?,
            });
        }

        Ok(outputs)
    }
}

pub fn fires_to_csv(fires: &[FirePoint]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(FirePoint::CSV_HEADERS)?;
    for fire in fires {
        writer.write_record(fire.to_csv_row())?;
    }
    writer
        .into_inner()
        .map_err(|e| HazardsError::ProcessingError {
            message: format!("CSV buffer could not be flushed: {}", e.error()),
        })
}

pub fn bundle_outputs(outputs: &[OutputFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for output in outputs {
        zip.start_file::<_, ()>(output.name.as_str(), FileOptions::default())?;
        zip.write_all(&output.contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for FirePipeline<S> {
    async fn extract(&self) -> Result<Vec<Record>> {
        tracing::info!("🚀 Extracting fire points from: {}", self.config.source());
        self.loader.fetch_records(self.force_reload).await
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        tracing::info!("🔧 Validating {} fire records", data.len());

        let (fires, report) = if self.config.validation.enabled {
            let (fires, report) =
                self.loader
                    .validate(&data, self.config.validation.tolerance, FIRE_TAG);
            report.ensure_healthy(self.config.validation.fail_on_unhealthy)?;
            (fires, Some(report))
        } else {
            tracing::info!("Validation disabled, coercing records");
            (coerce_records::<FirePoint>(&data), None)
        };

        if fires.is_empty() {
            return Err(HazardsError::EmptyDataset {
                message: format!("none of the {} source rows could be used", data.len()),
            });
        }

        let window = report_date_window(&fires);
        if let Some((first, last)) = window {
            tracing::debug!("Report dates span {} to {}", first, last);
        }
        let since = resolve_since(self.config.since()?, window);
        let displayed = filter_since(&fires, since);
        let summary = summary_line(displayed.len(), since);

        let outputs = self.render_outputs(&fires, &displayed, report.as_ref(), &summary)?;
        let displayed_records = displayed.len();

        tracing::info!(
            "✅ Transform complete: {} fire points, {} output files",
            fires.len(),
            outputs.len()
        );

        Ok(TransformResult {
            processed_records: fires,
            displayed_records,
            report,
            summary,
            outputs,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let base = self.config.load.output_path.trim_end_matches('/');

        if let Some(archive_name) = self.config.compression_filename() {
            tracing::debug!("Creating ZIP file with {} files", result.outputs.len());
            let zip_data = bundle_outputs(&result.outputs)?;

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(archive_name, &zip_data).await?;

            let output_path = format!("{}/{}", base, archive_name);
            tracing::info!("📦 Outputs bundled into {}", output_path);
            return Ok(output_path);
        }

        for output in &result.outputs {
            self.storage.write_file(&output.name, &output.contents).await?;
            tracing::debug!("Wrote {} ({} bytes)", output.name, output.contents.len());
        }

        tracing::info!("📁 {} files written to {}", result.outputs.len(), base);
        Ok(base.to_string())
    }
}
