use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex, PoisonError},
};

use lru::LruCache;

use crate::models::{Coordinate, PlaceCategory, PlaceMatch};
use crate::providers::{NearbySearch, PlacesProvider};

/// Search radii tried in order once the initial radius comes back empty.
pub const DEFAULT_RADIUS_LADDER_METERS: [u32; 4] = [5_000, 10_000, 20_000, 40_000];

/// Coordinates are bucketed to ~1 m before they key the cache.
const CACHE_GRID: f64 = 1e5;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    lat: i64,
    lon: i64,
    category: PlaceCategory,
    radius_meters: u32,
    keyword: Option<String>,
}

impl CacheKey {
    fn new(
        location: Coordinate,
        category: PlaceCategory,
        radius_meters: u32,
        keyword: Option<&str>,
    ) -> Self {
        Self {
            lat: (location.lat * CACHE_GRID).round() as i64,
            lon: (location.lon * CACHE_GRID).round() as i64,
            category,
            radius_meters,
            keyword: keyword.map(str::to_owned),
        }
    }
}

/// Turns a coordinate and a category into a single named place.
///
/// Each lookup starts at the caller's radius and escalates through every
/// larger rung of the ladder until the provider returns something. A provider
/// failure on one rung is logged and the next rung is tried.
pub struct PlacesResolver {
    provider: Arc<dyn PlacesProvider>,
    ladder: Vec<u32>,
    cache: Option<Mutex<LruCache<CacheKey, Option<PlaceMatch>>>>,
}

impl PlacesResolver {
    pub fn new(provider: Arc<dyn PlacesProvider>) -> Self {
        Self {
            provider,
            ladder: DEFAULT_RADIUS_LADDER_METERS.to_vec(),
            cache: None,
        }
    }

    pub fn with_ladder(mut self, ladder: impl Into<Vec<u32>>) -> Self {
        let mut ladder = ladder.into();
        ladder.sort_unstable();
        ladder.dedup();
        self.ladder = ladder;
        self
    }

    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        self
    }

    pub fn provider(&self) -> &Arc<dyn PlacesProvider> {
        &self.provider
    }

    /// Radii tried for a lookup starting at `initial_radius_meters`.
    pub fn radii(&self, initial_radius_meters: u32) -> Vec<u32> {
        std::iter::once(initial_radius_meters)
            .chain(
                self.ladder
                    .iter()
                    .copied()
                    .filter(|r| *r > initial_radius_meters),
            )
            .collect()
    }

    /// Best single match around `location`, or `None` once every radius is exhausted.
    pub async fn find_place(
        &self,
        location: Coordinate,
        category: PlaceCategory,
        initial_radius_meters: u32,
        keyword: Option<&str>,
    ) -> Option<PlaceMatch> {
        let key = CacheKey::new(location, category, initial_radius_meters, keyword);
        if let Some(hit) = self.cached(&key) {
            tracing::debug!("places cache hit for {} at {:?}", category.as_str(), location);
            return hit;
        }

        let mut had_failure = false;
        let mut found = None;

        for radius_meters in self.radii(initial_radius_meters) {
            let search = NearbySearch {
                location,
                category,
                radius_meters,
                keyword,
            };
            match self.provider.nearby_search(search).await {
                Ok(places) => {
                    if let Some(place) = places.into_iter().next() {
                        tracing::debug!(
                            "{} '{}' found within {} m",
                            category.as_str(),
                            place.name,
                            radius_meters
                        );
                        found = Some(place);
                        break;
                    }
                    tracing::debug!(
                        "no {} within {} m of {:?}",
                        category.as_str(),
                        radius_meters,
                        location
                    );
                }
                Err(err) => {
                    had_failure = true;
                    tracing::warn!(
                        "{} search at {} m failed, escalating: {}",
                        category.as_str(),
                        radius_meters,
                        err
                    );
                }
            }
        }

        // A miss caused by provider failures may succeed later; don't pin it.
        if found.is_some() || !had_failure {
            self.store(key, found.clone());
        }
        found
    }

    fn cached(&self, key: &CacheKey) -> Option<Option<PlaceMatch>> {
        let cache = self.cache.as_ref()?;
        let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get(key).cloned()
    }

    fn store(&self, key: CacheKey, value: Option<PlaceMatch>) {
        if let Some(cache) = &self.cache {
            let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
            guard.put(key, value);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        collections::HashMap,
        sync::{Mutex, PoisonError},
    };

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use crate::models::{Coordinate, PlaceCategory, PlaceMatch};
    use crate::providers::{NearbySearch, PlacesProvider, ProviderError};

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedSearch {
        pub category: PlaceCategory,
        pub radius_meters: u32,
        pub keyword: Option<String>,
    }

    /// Deterministic places provider for tests.
    ///
    /// Answers are picked per category by the smallest configured radius
    /// that the search reaches. Every call is recorded.
    #[derive(Default)]
    pub struct StubPlaces {
        answers: HashMap<PlaceCategory, Vec<(u32, Vec<String>)>>,
        failing_radii: Vec<u32>,
        gate: Option<Semaphore>,
        calls: Mutex<Vec<RecordedSearch>>,
    }

    impl StubPlaces {
        pub fn new() -> Self {
            Self::default()
        }

        /// Any search for `category` with radius >= `min_radius` returns a place
        /// carrying `tags`.
        pub fn answer(mut self, category: PlaceCategory, min_radius: u32, tags: &[&str]) -> Self {
            self.answers
                .entry(category)
                .or_default()
                .push((min_radius, tags.iter().map(|t| t.to_string()).collect()));
            self
        }

        pub fn fail_at(mut self, radius: u32) -> Self {
            self.failing_radii.push(radius);
            self
        }

        /// Blocks every search until `open` is called.
        pub fn gated(mut self) -> Self {
            self.gate = Some(Semaphore::new(0));
            self
        }

        pub fn open(&self) {
            if let Some(gate) = &self.gate {
                gate.add_permits(1);
            }
        }

        pub fn calls(&self) -> Vec<RecordedSearch> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    pub fn place_at(location: Coordinate, category: PlaceCategory, tags: Vec<String>) -> PlaceMatch {
        PlaceMatch {
            name: format!(
                "{} @ {:.3},{:.3}",
                category.as_str(),
                location.lat,
                location.lon
            ),
            address: String::from("1 Main St"),
            location,
            rating: Some(4.5),
            website: None,
            phone_number: Some(String::from("555-0100")),
            category_tags: tags,
        }
    }

    #[async_trait]
    impl PlacesProvider for StubPlaces {
        async fn nearby_search(
            &self,
            search: NearbySearch<'_>,
        ) -> Result<Vec<PlaceMatch>, ProviderError> {
            if let Some(gate) = &self.gate {
                let _permit = gate.acquire().await;
            }
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedSearch {
                    category: search.category,
                    radius_meters: search.radius_meters,
                    keyword: search.keyword.map(str::to_owned),
                });

            if self.failing_radii.contains(&search.radius_meters) {
                return Err(ProviderError::Timeout);
            }

            let answer = self.answers.get(&search.category).and_then(|answers| {
                answers
                    .iter()
                    .filter(|(min_radius, _)| search.radius_meters >= *min_radius)
                    .min_by_key(|(min_radius, _)| *min_radius)
            });

            Ok(answer
                .map(|(_, tags)| vec![place_at(search.location, search.category, tags.clone())])
                .unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubPlaces;
    use super::*;

    const HERE: Coordinate = Coordinate { lat: 38.57, lon: -109.55 };

    #[tokio::test]
    async fn escalates_until_a_match_is_found() {
        let stub = Arc::new(StubPlaces::new().answer(PlaceCategory::Campground, 20_000, &["campground"]));
        let resolver = PlacesResolver::new(stub.clone());

        let place = resolver
            .find_place(HERE, PlaceCategory::Campground, 5_000, None)
            .await;

        assert!(place.is_some());
        let radii: Vec<u32> = stub.calls().iter().map(|c| c.radius_meters).collect();
        assert_eq!(radii, vec![5_000, 10_000, 20_000]);
    }

    #[tokio::test]
    async fn returns_none_after_exhausting_ladder() {
        let stub = Arc::new(StubPlaces::new());
        let resolver = PlacesResolver::new(stub.clone());

        let place = resolver
            .find_place(HERE, PlaceCategory::Lodging, 5_000, Some("motel"))
            .await;

        assert!(place.is_none());
        assert_eq!(stub.calls().len(), DEFAULT_RADIUS_LADDER_METERS.len());
        assert!(stub.calls().iter().all(|c| c.keyword.as_deref() == Some("motel")));
    }

    #[tokio::test]
    async fn provider_failure_does_not_abort_ladder() {
        let stub = Arc::new(
            StubPlaces::new()
                .answer(PlaceCategory::GasStation, 5_000, &["gas_station"])
                .fail_at(5_000),
        );
        let resolver = PlacesResolver::new(stub.clone());

        let place = resolver
            .find_place(HERE, PlaceCategory::GasStation, 5_000, None)
            .await;

        assert!(place.is_some());
        assert_eq!(stub.calls().len(), 2);
    }

    #[tokio::test]
    async fn initial_radius_above_ladder_tries_once() {
        let stub = Arc::new(StubPlaces::new());
        let resolver = PlacesResolver::new(stub.clone());

        assert_eq!(resolver.radii(50_000), vec![50_000]);
        assert_eq!(resolver.radii(10_000), vec![10_000, 20_000, 40_000]);
        assert!(resolver
            .find_place(HERE, PlaceCategory::Attraction, 50_000, None)
            .await
            .is_none());
        assert_eq!(stub.calls().len(), 1);
    }

    #[tokio::test]
    async fn custom_ladder_is_sorted_and_deduplicated() {
        let stub = Arc::new(StubPlaces::new().answer(PlaceCategory::Lodging, 15_000, &["lodging"]));
        let resolver = PlacesResolver::new(stub.clone()).with_ladder(vec![15_000, 3_000, 15_000, 8_000]);

        assert_eq!(resolver.radii(3_000), vec![3_000, 8_000, 15_000]);
        assert!(resolver
            .find_place(HERE, PlaceCategory::Lodging, 3_000, None)
            .await
            .is_some());
        assert_eq!(stub.calls().len(), 3);
    }

    #[tokio::test]
    async fn cache_serves_repeated_lookups() {
        let stub = Arc::new(StubPlaces::new().answer(PlaceCategory::Restaurant, 5_000, &["restaurant"]));
        let resolver = PlacesResolver::new(stub.clone()).with_cache(16);

        let first = resolver.find_place(HERE, PlaceCategory::Restaurant, 5_000, None).await;
        let second = resolver.find_place(HERE, PlaceCategory::Restaurant, 5_000, None).await;

        assert_eq!(first, second);
        assert_eq!(stub.calls().len(), 1);
    }

    #[tokio::test]
    async fn misses_caused_by_failures_are_not_cached() {
        let stub = Arc::new(StubPlaces::new().fail_at(40_000));
        let resolver = PlacesResolver::new(stub.clone()).with_cache(16);

        resolver.find_place(HERE, PlaceCategory::Lodging, 5_000, None).await;
        resolver.find_place(HERE, PlaceCategory::Lodging, 5_000, None).await;

        assert_eq!(stub.calls().len(), 2 * DEFAULT_RADIUS_LADDER_METERS.len());
    }
}
