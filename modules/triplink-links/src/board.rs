use tracing::debug;
use uuid::Uuid;

use triplink_common::LinkRecord;

/// The enriched link collection for one batch.
///
/// Read-mostly: the pipeline builds and enriches it during a refresh, and
/// callers get exactly one mutation entry point, `set_preview`, for manual
/// overrides. Overrides are ephemeral: the next refresh rebuilds every
/// record and discards them unless a collaborator persists the choice
/// out-of-band.
#[derive(Debug, Default)]
pub struct LinkSet {
    records: Vec<LinkRecord>,
}

impl LinkSet {
    pub fn new(records: Vec<LinkRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LinkRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&LinkRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Manual preview override. Returns false when the id is unknown
    /// (e.g. the set was refreshed since the caller read it).
    pub fn set_preview(
        &mut self,
        id: Uuid,
        url: Option<String>,
        label: Option<String>,
    ) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            debug!(%id, "Preview override for unknown record");
            return false;
        };
        record.preview_image_url = url;
        record.preview_image_source = label;
        true
    }

    pub(crate) fn records_mut(&mut self) -> &mut [LinkRecord] {
        &mut self.records
    }
}
