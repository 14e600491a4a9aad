use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::info;

use crate::charts;
use crate::error::RdkError;
use crate::filter::{self, FilterSelection};
use crate::images::{ImageCatalog, ResolvedImage};
use crate::loader::load_dataset;
use crate::metrics::{compute_metrics, MetricsSnapshot};
use crate::normalize::{normalize_activity, normalize_resets};

/// One session's uploaded dataset and the operations the presentation
/// layer drives against it.
///
/// Tables are normalized once at load time; every downstream call is a
/// pure function of the stored tables plus an explicit `FilterSelection`,
/// so a selection change simply reruns the pipeline.
pub struct DashboardModel {
    activity: Option<DataFrame>,
    summary: Option<DataFrame>,
    resets: Option<DataFrame>,
    images: ImageCatalog,
}

impl Default for DashboardModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardModel {
    pub fn new() -> Self {
        Self {
            activity: None,
            summary: None,
            resets: None,
            images: ImageCatalog::new(),
        }
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load and normalize an uploaded file, replacing any previous dataset.
    /// Returns the normalized activity table.
    pub fn load(&mut self, path: &Path) -> Result<DataFrame, RdkError> {
        let bundle = load_dataset(path)?;
        let activity = normalize_activity(bundle.activity)?;
        let resets = normalize_resets(bundle.resets)?;

        info!(
            rows = activity.height(),
            reset_rows = resets.height(),
            path = %path.display(),
            "dataset loaded"
        );

        self.activity = Some(activity.clone());
        self.summary = Some(bundle.summary);
        self.resets = Some(resets);
        Ok(activity)
    }

    pub fn activity(&self) -> Option<&DataFrame> {
        self.activity.as_ref()
    }

    pub fn summary(&self) -> Option<&DataFrame> {
        self.summary.as_ref()
    }

    pub fn resets(&self) -> Option<&DataFrame> {
        self.resets.as_ref()
    }

    // ── Selector population ─────────────────────────────────────────────────

    pub fn vendors(&self) -> Result<Vec<String>, RdkError> {
        filter::distinct_vendors(self.require_activity()?)
    }

    pub fn programs(&self, vendor: &str) -> Result<Vec<String>, RdkError> {
        filter::distinct_programs(self.require_activity()?, vendor)
    }

    // ── Filtering and aggregation ───────────────────────────────────────────

    pub fn filtered(&self, selection: &FilterSelection) -> Result<DataFrame, RdkError> {
        filter::filter_records(self.require_activity()?, selection)
    }

    pub fn metrics(&self, selection: &FilterSelection) -> Result<MetricsSnapshot, RdkError> {
        let filtered = self.filtered(selection)?;
        compute_metrics(&filtered, &self.reset_log(), selection)
    }

    pub fn maintenance_by_store(
        &self,
        selection: &FilterSelection,
    ) -> Result<DataFrame, RdkError> {
        charts::maintenance_by_store(&self.filtered(selection)?)
    }

    pub fn maintenance_by_month(
        &self,
        selection: &FilterSelection,
    ) -> Result<DataFrame, RdkError> {
        charts::maintenance_by_month(&self.filtered(selection)?)
    }

    pub fn resets_by_program(&self, vendor: &str) -> Result<DataFrame, RdkError> {
        charts::resets_by_program(&self.reset_log(), vendor)
    }

    pub fn resets_by_store(&self, vendor: &str) -> Result<DataFrame, RdkError> {
        charts::resets_by_store(&self.reset_log(), vendor)
    }

    // ── Images ──────────────────────────────────────────────────────────────

    /// Reconfigure image lookup. Priority order is fixed: explicit local
    /// folder, then bundle-extracted folders, then the built-in folder.
    pub fn set_image_sources(
        &mut self,
        local_folder: Option<PathBuf>,
        bundle_dirs: &[PathBuf],
        built_in: Option<PathBuf>,
    ) {
        self.images = ImageCatalog::with_sources(local_folder, bundle_dirs, built_in);
    }

    pub fn resolve_image(&self, key: &str) -> Result<Option<ResolvedImage>, RdkError> {
        self.images.resolve(key)
    }

    // ── Private helpers ─────────────────────────────────────────────────────

    fn require_activity(&self) -> Result<&DataFrame, RdkError> {
        self.activity
            .as_ref()
            .ok_or_else(|| RdkError::NotLoaded("activity".into()))
    }

    /// Reset log, or an empty frame when the upload carried none.
    /// DataFrame clones are cheap column-handle copies.
    fn reset_log(&self) -> DataFrame {
        self.resets.clone().unwrap_or_else(DataFrame::empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &std::path::Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("upload.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn calls_before_load_report_not_loaded() {
        let model = DashboardModel::new();
        assert!(matches!(model.vendors(), Err(RdkError::NotLoaded(_))));
    }

    #[test]
    fn csv_session_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "Vendor,Program,Store,Bay,FinishTime\n\
             acme ,P1,S1,B1,15/01/2024\n\
             ACME,P1,S2,B2,20/01/2024\n\
             ACME,P1,S1,B1,03/02/2024\n\
             Zenith,P2,S9,B9,not recorded\n",
        );

        let mut model = DashboardModel::new();
        model.load(&path).unwrap();

        assert_eq!(model.vendors().unwrap(), vec!["ACME", "ZENITH"]);
        assert_eq!(model.programs("ACME").unwrap(), vec!["P1"]);

        let sel = FilterSelection::new("ACME", "P1");
        let m = model.metrics(&sel).unwrap();
        assert_eq!(m.record_count, 3);
        assert_eq!(m.store_count, 2);
        assert_eq!(m.bay_count, 2);
        assert_eq!(m.avg_per_bay, 1.5);
        assert_eq!(m.reset_count, 0); // csv uploads carry no reset log

        let by_store = model.maintenance_by_store(&sel).unwrap();
        assert_eq!(by_store.height(), 2);

        let by_month = model.maintenance_by_month(&sel).unwrap();
        assert_eq!(by_month.height(), 2); // 2024-01 and 2024-02

        // Empty reset log degrades to an empty series, not an error.
        assert_eq!(model.resets_by_program("ACME").unwrap().height(), 0);
    }

    #[test]
    fn reload_replaces_the_previous_session_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_csv(dir.path(), "Vendor,Program\nAcme,P1\n");

        let mut model = DashboardModel::new();
        model.load(&first).unwrap();
        assert_eq!(model.vendors().unwrap(), vec!["ACME"]);

        let second = write_csv(dir.path(), "Vendor,Program\nZen,P2\n");
        model.load(&second).unwrap();
        assert_eq!(model.vendors().unwrap(), vec!["ZEN"]);
    }
}
