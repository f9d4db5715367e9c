//! ProjectFetcher: filtered retrieval in partner-id batches.
//!
//! Batch failures never reach the caller. A batch whose filter keeps being
//! refused, or whose listing fails, simply contributes nothing.

use chrono::{Months, NaiveDate};
use workplan_external::info_rtu::{RtuExternalProject, RtuFilter};

use crate::ports::SessionError;
use crate::session::SessionClient;
use crate::settings::ImportSettings;

pub struct ProjectFetcher<'a> {
    settings: &'a ImportSettings,
}

impl<'a> ProjectFetcher<'a> {
    pub fn new(settings: &'a ImportSettings) -> Self {
        Self { settings }
    }

    /// Filter shared by every batch: fixed lower bound, upper bound
    /// `date_to_years_ahead` years after `today`, restricted to `area_ids`.
    pub fn filter_template(&self, today: NaiveDate, area_ids: &[String]) -> RtuFilter {
        let date_to = today
            .checked_add_months(Months::new(12 * self.settings.date_to_years_ahead))
            .unwrap_or(NaiveDate::MAX);
        RtuFilter {
            area_ids: area_ids.to_vec(),
            ..RtuFilter::new(self.settings.date_from, date_to)
        }
    }

    /// Fetch every batch and concatenate the results.
    ///
    /// `session` must already be open. It may be replaced during the call
    /// and the replacement is kept for later batches.
    pub async fn fetch(
        &self,
        session: &mut SessionClient,
        template: &RtuFilter,
        partner_ids: &[String],
    ) -> Vec<RtuExternalProject> {
        let mut projects = Vec::new();

        for (batch_index, batch) in partner_ids.chunks(self.settings.batch_size.max(1)).enumerate() {
            let filter = template.for_partners(batch);

            if !self.apply_filter(session, &filter, batch_index).await {
                continue;
            }

            match session.list_projects().await {
                Ok(mut batch_projects) => {
                    tracing::debug!(batch_index, fetched = batch_projects.len(), "RTU batch fetched");
                    projects.append(&mut batch_projects);
                }
                Err(e) => {
                    tracing::warn!(batch_index, error = %e, "RTU project listing failed, skipping batch");
                }
            }
        }

        projects
    }

    /// Set the filter, re-opening the session on `Forbidden` up to
    /// `max_session_retries` times. Returns whether the filter is in place.
    async fn apply_filter(&self, session: &mut SessionClient, filter: &RtuFilter, batch_index: usize) -> bool {
        let mut retries = 0;
        loop {
            match session.set_filter(filter).await {
                Ok(()) => return true,
                Err(SessionError::Forbidden) if retries < self.settings.max_session_retries => {
                    retries += 1;
                    tracing::info!(batch_index, retries, "RTU session refused, re-opening");
                    if let Err(e) = session.open().await {
                        tracing::warn!(batch_index, retries, error = %e, "RTU session re-open failed");
                    }
                }
                Err(e) => {
                    tracing::warn!(batch_index, retries, error = %e, "RTU filter failed, skipping batch");
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::ports::RtuApi;

    /// Replays scripted `set_filter` and `list_projects` answers and
    /// records calls.
    #[derive(Default)]
    struct ScriptedApi {
        filter_answers: Mutex<VecDeque<Result<(), SessionError>>>,
        list_answers: Mutex<VecDeque<Result<(), SessionError>>>,
        opened: Mutex<u32>,
        filtered_with: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl RtuApi for ScriptedApi {
        async fn open_session(&self) -> Result<String, SessionError> {
            let mut opened = self.opened.lock().unwrap();
            *opened += 1;
            Ok(format!("s{opened}"))
        }

        async fn set_filter(&self, session_id: &str, filter: &RtuFilter) -> Result<(), SessionError> {
            self.filtered_with
                .lock()
                .unwrap()
                .push((session_id.to_string(), filter.partner_ids.clone()));
            self.filter_answers.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }

        async fn list_projects(&self, session_id: &str) -> Result<Vec<RtuExternalProject>, SessionError> {
            self.list_answers.lock().unwrap().pop_front().unwrap_or(Ok(()))?;
            Ok(vec![RtuExternalProject {
                id: Some(format!("from-{session_id}")),
                ..Default::default()
            }])
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("P{i}")).collect()
    }

    async fn run(api: Arc<ScriptedApi>, settings: ImportSettings, partners: &[String]) -> Vec<RtuExternalProject> {
        let mut session = SessionClient::new(api);
        session.open().await.unwrap();
        let fetcher = ProjectFetcher::new(&settings);
        let template = fetcher.filter_template(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), &[]);
        fetcher.fetch(&mut session, &template, partners).await
    }

    #[test]
    fn template_spans_ten_years() {
        let settings = ImportSettings::default();
        let filter = ProjectFetcher::new(&settings)
            .filter_template(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), &["VM".to_string()]);
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2036, 10, 16).unwrap());
        assert_eq!(filter.area_ids, vec!["VM"]);
        assert!(filter.partner_ids.is_empty());
    }

    #[tokio::test]
    async fn partners_are_sent_in_batches() {
        let api = Arc::new(ScriptedApi::default());
        let settings = ImportSettings {
            batch_size: 2,
            ..Default::default()
        };
        let projects = run(api.clone(), settings, &ids(5)).await;

        assert_eq!(projects.len(), 3);
        let batches: Vec<Vec<String>> = api.filtered_with.lock().unwrap().iter().map(|(_, p)| p.clone()).collect();
        assert_eq!(batches, vec![ids(2), ids(4)[2..].to_vec(), vec!["P4".to_string()]]);
    }

    #[tokio::test]
    async fn refreshed_session_is_reused() {
        let api = Arc::new(ScriptedApi::default());
        api.filter_answers
            .lock()
            .unwrap()
            .extend([Err(SessionError::Forbidden), Ok(()), Ok(())]);
        let settings = ImportSettings {
            batch_size: 1,
            ..Default::default()
        };
        let projects = run(api.clone(), settings, &ids(2)).await;

        let sessions: Vec<String> = api.filtered_with.lock().unwrap().iter().map(|(s, _)| s.clone()).collect();
        assert_eq!(sessions, vec!["s1", "s2", "s2"]);
        assert_eq!(projects.len(), 2);
        assert!(projects.iter().all(|p| p.id.as_deref() == Some("from-s2")));
    }

    #[tokio::test]
    async fn exhausted_retries_drop_only_that_batch() {
        let api = Arc::new(ScriptedApi::default());
        api.filter_answers.lock().unwrap().extend([
            Err(SessionError::Forbidden),
            Err(SessionError::Forbidden),
            Err(SessionError::Forbidden),
        ]);
        let settings = ImportSettings {
            batch_size: 1,
            max_session_retries: 2,
            ..Default::default()
        };
        let projects = run(api.clone(), settings, &ids(2)).await;

        // First batch: initial call plus two retries. Second batch succeeds.
        assert_eq!(api.filtered_with.lock().unwrap().len(), 4);
        assert_eq!(*api.opened.lock().unwrap(), 3);
        assert_eq!(projects.len(), 1);
    }

    #[tokio::test]
    async fn unexpected_filter_error_skips_batch_without_retry() {
        let api = Arc::new(ScriptedApi::default());
        api.filter_answers
            .lock()
            .unwrap()
            .push_back(Err(SessionError::Unexpected("KO".to_string())));
        let settings = ImportSettings {
            batch_size: 1,
            ..Default::default()
        };
        let projects = run(api.clone(), settings, &ids(2)).await;

        assert_eq!(*api.opened.lock().unwrap(), 1);
        assert_eq!(projects.len(), 1);
    }

    #[tokio::test]
    async fn listing_failure_skips_only_that_batch() {
        let api = Arc::new(ScriptedApi::default());
        api.list_answers
            .lock()
            .unwrap()
            .extend([Ok(()), Err(SessionError::Unexpected("timeout".to_string())), Ok(())]);
        let settings = ImportSettings {
            batch_size: 1,
            ..Default::default()
        };
        let projects = run(api.clone(), settings, &ids(3)).await;

        assert_eq!(api.filtered_with.lock().unwrap().len(), 3);
        assert_eq!(*api.opened.lock().unwrap(), 1);
        assert_eq!(projects.len(), 2);
    }

    #[tokio::test]
    async fn forbidden_listing_does_not_refresh_the_session() {
        let api = Arc::new(ScriptedApi::default());
        api.list_answers.lock().unwrap().push_back(Err(SessionError::Forbidden));
        let settings = ImportSettings {
            batch_size: 1,
            ..Default::default()
        };
        let projects = run(api.clone(), settings, &ids(2)).await;

        let sessions: Vec<String> = api.filtered_with.lock().unwrap().iter().map(|(s, _)| s.clone()).collect();
        assert_eq!(sessions, vec!["s1", "s1"]);
        assert_eq!(projects.len(), 1);
    }
}
