use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Durable byte storage behind the record store.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Plain HTTP fetch of a carrier page body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Opaque handle to a rendered element, valid until the next navigation.
pub type Element = u64;

/// How to address an element in the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Css(String),
    ClassName(String),
    /// The portal's label/value rows: a `div.label` with the given `title`
    /// attribute, resolved to the link text of the sibling value cell.
    LabeledValue(String),
}

impl Locator {
    pub fn id(s: &str) -> Self {
        Locator::Id(s.to_string())
    }

    pub fn css(s: &str) -> Self {
        Locator::Css(s.to_string())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Id(s) => write!(f, "#{}", s),
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::ClassName(s) => write!(f, ".{}", s),
            Locator::LabeledValue(s) => write!(f, "label:{}", s),
        }
    }
}

/// Driving seam for the rendered portal session. A concrete implementation
/// (WebDriver, CDP, whatever the deployment provides) lives outside this
/// crate; the harvester only needs these operations. One session must not be
/// shared by two concurrent runs.
#[async_trait]
pub trait Browser: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;
    async fn back(&mut self) -> Result<()>;
    async fn find_element(&mut self, locator: &Locator) -> Result<Element>;
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<Element>>;
    /// Find a descendant of `parent`.
    async fn find_in(&mut self, parent: Element, locator: &Locator) -> Result<Element>;
    async fn click(&mut self, element: Element) -> Result<()>;
    async fn clear_and_type(&mut self, element: Element, text: &str) -> Result<()>;
    async fn read_text(&mut self, element: Element) -> Result<String>;
    async fn read_attribute(&mut self, element: Element, name: &str) -> Result<Option<String>>;
    async fn page_source(&mut self) -> Result<String>;
    async fn scroll_by(&mut self, container: Element, delta_px: i64) -> Result<()>;
    /// Poll for `locator` until it resolves or `timeout` elapses
    /// (`SyncError::WaitTimeout`).
    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> Result<Element>;
}
