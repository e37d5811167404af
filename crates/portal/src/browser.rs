use crate::error::{ErrorKind, Result};
use crate::{Driver, Navigation, PROGRAM_SEARCH_INPUT, Portal, Throttle};
use async_trait::async_trait;
use exn::ResultExt;
use mts_models::{DegreeProgram, ModuleDetail, ModuleKey, ModulePart, StudyAreaForest};
use std::time::Duration;
use tracing::instrument;

/// Portal session that renders pages through a [`Driver`] and parses them.
pub struct BrowserPortal<D> {
    driver: D,
    base_url: String,
    throttle: Throttle,
}
impl<D: Driver> BrowserPortal<D> {
    pub fn new(driver: D, base_url: impl Into<String>, rate_limit: Duration) -> Self {
        Self { driver, base_url: base_url.into(), throttle: Throttle::new(rate_limit) }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn navigate(&mut self, navigation: Navigation) -> Result<(String, String)> {
        let url = navigation.url(&self.base_url);
        self.throttle.wait().await;
        tracing::debug!(%navigation, %url, "Rendering page");
        let html = self.driver.render(&url).await?;
        Ok((url, html))
    }
}

#[async_trait]
impl<D: Driver> Portal for BrowserPortal<D> {
    fn name(&self) -> &str {
        "browser"
    }

    /// An empty search lists the whole catalog.
    async fn fetch_program_tree(&mut self) -> Result<Vec<DegreeProgram>> {
        self.search_programs("").await
    }

    #[instrument(skip(self))]
    async fn search_programs(&mut self, text: &str) -> Result<Vec<DegreeProgram>> {
        let url = Navigation::Catalog.url(&self.base_url);
        self.throttle.wait().await;
        tracing::debug!(%url, "Searching program catalog");
        let html = self.driver.search(&url, PROGRAM_SEARCH_INPUT, text).await?;
        mts_extract::catalog(&html).or_raise(|| ErrorKind::UnexpectedMarkup(url))
    }

    #[instrument(skip(self), fields(program = program.id))]
    async fn fetch_study_area_tree(&mut self, program: &DegreeProgram) -> Result<StudyAreaForest> {
        let (url, html) = self.navigate(Navigation::Program(program.id)).await?;
        mts_extract::study_areas(&html).or_raise(|| ErrorKind::UnexpectedMarkup(url))
    }

    #[instrument(skip(self), fields(module = %key))]
    async fn fetch_module_detail(&mut self, key: ModuleKey) -> Result<(ModuleDetail, Vec<ModulePart>)> {
        let (url, html) = self.navigate(Navigation::Module(key)).await?;
        mts_extract::module_detail(&html).or_raise(|| ErrorKind::UnexpectedMarkup(url))
    }
}
