use chrono::Local;
use dashboard_engine::compose;
use models::{Country, DashboardCharts, Selection, Year};
use rates_client::{RateProvider, RetrievalError};
use serde::{Deserialize, Serialize};

/// What the page currently shows. Only replaced by a submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    /// Selection the charts were rendered for.
    pub selection: Selection,
    pub description: String,
    /// Absent when the last fetch failed.
    pub charts: Option<DashboardCharts>,
    pub error: Option<String>,
    pub revision: u64,
    pub rendered_at: String,
}

/// Partial selection change coming from one of the dropdowns.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SelectionUpdate {
    pub country: Option<Country>,
    pub year: Option<Year>,
}

/// One browser session: the staged dropdown values and the committed render.
///
/// Changing the dropdowns stages a selection; nothing is fetched until
/// [`InteractionController::submit`] commits it.
#[derive(Debug)]
pub struct InteractionController {
    staged: Selection,
    render: RenderState,
}

impl InteractionController {
    /// Creates a session and renders `defaults` once, so it is never empty on first read.
    pub async fn start(provider: &dyn RateProvider, defaults: Selection) -> Self {
        let mut controller = Self {
            staged: defaults,
            render: RenderState {
                selection: defaults,
                description: defaults.description(),
                charts: None,
                error: None,
                revision: 0,
                rendered_at: Local::now().to_rfc3339(),
            },
        };
        if let Err(err) = controller.submit(provider).await {
            tracing::warn!(error = %err, "initial render failed");
        }
        controller
    }

    pub fn staged(&self) -> Selection {
        self.staged
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render
    }

    pub fn stage_country(&mut self, country: Country) {
        self.staged.country = country;
    }

    pub fn stage_year(&mut self, year: Year) {
        self.staged.year = year;
    }

    pub fn stage(&mut self, update: SelectionUpdate) {
        if let Some(country) = update.country {
            self.stage_country(country);
        }
        if let Some(year) = update.year {
            self.stage_year(year);
        }
    }

    /// Commits the staged selection: fetch, compose, replace the render.
    ///
    /// The description follows the committed selection even when the fetch
    /// fails; the charts are then cleared and the error recorded.
    pub async fn submit(
        &mut self,
        provider: &dyn RateProvider,
    ) -> Result<&RenderState, RetrievalError> {
        let selection = self.staged;
        let outcome = provider.fetch(selection.country, selection.year).await;

        self.render.selection = selection;
        self.render.description = selection.description();
        self.render.revision += 1;
        self.render.rendered_at = Local::now().to_rfc3339();

        match outcome {
            Ok(series) => {
                tracing::debug!(
                    country = %selection.country,
                    year = %selection.year,
                    months = series.len(),
                    "rendering dashboard"
                );
                self.render.charts = Some(compose(&series));
                self.render.error = None;
                Ok(&self.render)
            }
            Err(err) => {
                self.render.charts = None;
                self.render.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
