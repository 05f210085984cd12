use super::domain::Suite;
use super::store::{EntityStore, StoreError};

/// Suites that are not attached to any draw.
///
/// Starts from every suite in the store unless a narrower base collection is supplied.
#[derive(Debug, Clone, Default)]
pub struct UndrawnSuitesQuery {
    base: Option<Vec<Suite>>,
}

impl UndrawnSuitesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: Vec<Suite>) -> Self {
        Self { base: Some(base) }
    }

    pub fn call<S: EntityStore>(&self, store: &S) -> Result<Vec<Suite>, StoreError> {
        let drawn = store.drawn_suite_ids()?;
        let base = match &self.base {
            Some(suites) => suites.clone(),
            None => store.suites()?,
        };
        Ok(base
            .into_iter()
            .filter(|suite| !drawn.contains(&suite.id))
            .collect())
    }
}
