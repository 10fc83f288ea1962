use estatelens_models::{ComposedQuery, FilterState, MonthsWindow, PropertyType, RangeSelection};
use tracing::debug;

/// Pending and applied filter slots.
///
/// Edits land in the pending slot. Only [`apply`](FilterPanel::apply) and
/// [`reset`](FilterPanel::reset) change what downstream sources query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPanel {
    pending: FilterState,
    applied: FilterState,
}

impl FilterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &FilterState {
        &self.pending
    }

    pub fn applied(&self) -> &FilterState {
        &self.applied
    }

    pub fn toggle_area_range(&mut self, range: RangeSelection) {
        self.pending.toggle_area_range(range);
    }

    pub fn toggle_price_range(&mut self, range: RangeSelection) {
        self.pending.toggle_price_range(range);
    }

    pub fn toggle_dong(&mut self, dong: &str) {
        self.pending.toggle_dong(dong);
    }

    pub fn set_property_type(&mut self, property_type: Option<PropertyType>) {
        self.pending.set_property_type(property_type);
    }

    pub fn set_months_window(&mut self, window: MonthsWindow) {
        self.pending.set_months_window(window);
    }

    /// Whether the pending choices differ from what is applied.
    pub fn has_changes(&self) -> bool {
        self.pending != self.applied
    }

    /// Copy pending into applied and return the new applied filters.
    pub fn apply(&mut self) -> FilterState {
        self.applied = self.pending.clone();
        debug!(
            areas = self.applied.selected_area_ranges().len(),
            prices = self.applied.selected_price_ranges().len(),
            dongs = self.applied.selected_dongs().len(),
            months = self.applied.months_window().months(),
            "Filters applied"
        );
        self.applied.clone()
    }

    /// Restore both slots to defaults, bypassing the apply step.
    pub fn reset(&mut self) -> FilterState {
        self.pending = FilterState::default();
        self.applied = FilterState::default();
        debug!("Filters reset");
        self.applied.clone()
    }

    /// Query for the applied filters.
    pub fn composed_query(&self, page: u32, page_size: u32) -> ComposedQuery {
        self.applied.compose(page, page_size)
    }
}
