//! In-memory `NoticeSource` with an API-like result ceiling and call logs.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use notice_harvester::{DetailRef, FilterSpec, Notice, NoticeSource, Sex, SourceError};
use serde_json::json;

/// One entity in the fake population.
#[derive(Debug, Clone)]
pub struct Person {
    pub id: String,
    pub nationality: String,
    pub sex: Sex,
    pub age: u8,
    /// Extra field that differs between otherwise identical summaries.
    pub stamp: u32,
}

impl Person {
    pub fn new(id: impl Into<String>, nationality: &str, sex: Sex, age: u8) -> Self {
        Self {
            id: id.into(),
            nationality: nationality.to_string(),
            sex,
            age,
            stamp: 0,
        }
    }

    fn matches(&self, filter: &FilterSpec) -> bool {
        filter.facet.as_deref().is_none_or(|f| f == self.nationality)
            && filter.sex.is_none_or(|s| s == self.sex)
            && filter.age_min.is_none_or(|min| self.age >= min)
            && filter.age_max.is_none_or(|max| self.age <= max)
    }

    pub fn summary(&self) -> Notice {
        Notice::from_value(json!({
            "entity_id": self.id,
            "name": format!("NAME-{}", self.id),
            "forename": "TEST",
            "date_of_birth": "1990/01/01",
            "nationalities": [self.nationality],
            "sex_id": self.sex.code(),
            "stamp": self.stamp,
            "_links": {"self": {"href": format!("https://fake.test/red/{}", self.id)}}
        }))
        .unwrap_or_default()
    }
}

/// Fake search API. Every filter serves at most `ceiling` results, like the real one.
pub struct FakeSource {
    people: Vec<Person>,
    ceiling: usize,
    /// When set, every probe reports this total and pages come back empty.
    always_total: Option<u64>,
    failing_probes: HashSet<String>,
    failing_pages: HashSet<(String, u32)>,
    failing_details: HashSet<String>,
    detail_latency: Duration,
    probe_log: Mutex<Vec<FilterSpec>>,
    page_log: Mutex<Vec<(FilterSpec, u32)>>,
    detail_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn new(people: Vec<Person>, ceiling: usize) -> Self {
        Self {
            people,
            ceiling,
            always_total: None,
            failing_probes: HashSet::new(),
            failing_pages: HashSet::new(),
            failing_details: HashSet::new(),
            detail_latency: Duration::ZERO,
            probe_log: Mutex::new(Vec::new()),
            page_log: Mutex::new(Vec::new()),
            detail_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// A source whose every partition reports `total` matches.
    pub fn always_over(total: u64) -> Self {
        Self {
            always_total: Some(total),
            ..Self::new(Vec::new(), 0)
        }
    }

    /// Fails every probe whose facet is `facet` (use "" for the unfiltered probe).
    pub fn fail_probe(mut self, facet: &str) -> Self {
        self.failing_probes.insert(facet.to_string());
        self
    }

    pub fn fail_page(mut self, facet: &str, page: u32) -> Self {
        self.failing_pages.insert((facet.to_string(), page));
        self
    }

    pub fn fail_detail(mut self, id: &str) -> Self {
        self.failing_details.insert(id.to_string());
        self
    }

    pub fn with_detail_latency(mut self, latency: Duration) -> Self {
        self.detail_latency = latency;
        self
    }

    pub fn probes(&self) -> Vec<FilterSpec> {
        self.probe_log.lock().unwrap().clone()
    }

    pub fn pages(&self) -> Vec<(FilterSpec, u32)> {
        self.page_log.lock().unwrap().clone()
    }

    pub fn pages_for_facet(&self, facet: &str) -> usize {
        self.pages()
            .iter()
            .filter(|(filter, _)| filter.facet.as_deref() == Some(facet))
            .count()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn facet_key(filter: &FilterSpec) -> String {
        filter.facet.clone().unwrap_or_default()
    }

    fn matching(&self, filter: &FilterSpec) -> Vec<&Person> {
        self.people.iter().filter(|p| p.matches(filter)).collect()
    }
}

fn unavailable(filter: &FilterSpec) -> SourceError {
    SourceError::http_status(format!("fake://{filter}"), 503)
}

#[async_trait]
impl NoticeSource for FakeSource {
    async fn probe_total(&self, filter: &FilterSpec) -> Result<u64, SourceError> {
        self.probe_log.lock().unwrap().push(filter.clone());
        if self.failing_probes.contains(&Self::facet_key(filter)) {
            return Err(unavailable(filter));
        }
        if let Some(total) = self.always_total {
            return Ok(total);
        }
        Ok(self.matching(filter).len() as u64)
    }

    async fn fetch_page(
        &self,
        filter: &FilterSpec,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Notice>, SourceError> {
        self.page_log.lock().unwrap().push((filter.clone(), page));
        if self
            .failing_pages
            .contains(&(Self::facet_key(filter), page))
        {
            return Err(unavailable(filter));
        }
        let visible: Vec<_> = self
            .matching(filter)
            .into_iter()
            .take(self.ceiling)
            .collect();
        let start = (page.saturating_sub(1) * page_size) as usize;
        Ok(visible
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .map(Person::summary)
            .collect())
    }

    async fn fetch_detail(&self, reference: &DetailRef) -> Result<Notice, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.detail_latency.is_zero() {
            tokio::time::sleep(self.detail_latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let id = match reference {
            DetailRef::Url(url) => url.rsplit('/').next().unwrap_or_default().to_string(),
            DetailRef::EntityId(id) => id.clone(),
        };
        if self.failing_details.contains(&id) {
            return Err(SourceError::http_status(format!("fake://detail/{id}"), 404));
        }
        Ok(Notice::from_value(json!({
            "entity_id": id,
            "height": 1.8,
            "distinguishing_marks": format!("mark-{id}"),
            "languages_spoken_ids": ["ENG"]
        }))
        .unwrap_or_default())
    }
}

/// `count` people of one nationality and sex, ages cycling through `min..=max`.
pub fn cohort(prefix: &str, nationality: &str, sex: Sex, count: usize, min: u8, max: u8) -> Vec<Person> {
    let span = usize::from(max - min) + 1;
    (0..count)
        .map(|i| {
            let age = min + u8::try_from(i % span).unwrap_or(0);
            Person::new(format!("{prefix}-{i}"), nationality, sex, age)
        })
        .collect()
}
