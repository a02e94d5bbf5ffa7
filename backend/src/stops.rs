use crate::models::{PlaceCategory, PlaceMatch, RouteGeometry, Stop, StopLists, TripParameters};
use crate::resolver::PlacesResolver;
use crate::route_index::RouteIndex;
use crate::sampler::{
    ATTRACTION_INTERVAL_MILES, Cadence, RESTAURANT_INTERVAL_MILES, SamplePoint, sample_points,
};

/// Radius of the first nearby search for each category.
pub fn search_radius_meters(category: PlaceCategory) -> u32 {
    match category {
        PlaceCategory::GasStation => 5_000,
        PlaceCategory::Lodging => 10_000,
        PlaceCategory::Restaurant => 5_000,
        PlaceCategory::Campground => 20_000,
        PlaceCategory::Attraction => 10_000,
    }
}

/// What a calculator emits when the resolver finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnMiss {
    Omit,
    Placeholder,
}

#[derive(Debug, Clone, Copy)]
struct CategoryPlan<'a> {
    category: PlaceCategory,
    cadence: Cadence,
    keyword: Option<&'a str>,
    /// Sub-type the match's tags must carry, if any.
    required_type: Option<&'a str>,
    on_miss: OnMiss,
}

/// Whether a place's category tags satisfy a requested sub-type.
///
/// `None` accepts anything. Otherwise one whole tag must equal the requested
/// code, ignoring case and reading underscores as spaces ("Historic Site"
/// matches "historic_site", "amusement_park" does not match "park").
pub fn matches_sub_type(tags: &[String], requested: Option<&str>) -> bool {
    let Some(requested) = requested else {
        return true;
    };
    let wanted = normalize_tag(requested);
    tags.iter()
        .any(|tag| tag == requested || normalize_tag(tag) == wanted)
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace('_', " ")
}

/// Per-category stop calculators over a single resolver.
///
/// Every calculator walks its sample points in order and awaits each lookup
/// before issuing the next one, so a category never bursts the provider. A
/// failed or empty lookup only affects its own index.
pub struct StopPlanner {
    resolver: PlacesResolver,
}

impl StopPlanner {
    pub fn new(resolver: PlacesResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PlacesResolver {
        &self.resolver
    }

    pub async fn fuel_stops(&self, route: &RouteGeometry, trip: &TripParameters) -> Vec<Stop> {
        self.collect(route, &RouteIndex::new(route), fuel_plan(trip))
            .await
    }

    pub async fn hotel_stops(&self, route: &RouteGeometry, trip: &TripParameters) -> Vec<Stop> {
        self.collect(route, &RouteIndex::new(route), hotel_plan(trip))
            .await
    }

    pub async fn restaurant_stops(&self, route: &RouteGeometry, trip: &TripParameters) -> Vec<Stop> {
        self.collect(route, &RouteIndex::new(route), restaurant_plan(trip))
            .await
    }

    pub async fn camping_stops(&self, route: &RouteGeometry, trip: &TripParameters) -> Vec<Stop> {
        self.collect(route, &RouteIndex::new(route), camping_plan(trip))
            .await
    }

    pub async fn attraction_stops(&self, route: &RouteGeometry, trip: &TripParameters) -> Vec<Stop> {
        self.collect(route, &RouteIndex::new(route), attraction_plan(trip))
            .await
    }

    /// Runs all five calculators, one category after another.
    pub async fn plan_all(&self, route: &RouteGeometry, trip: &TripParameters) -> StopLists {
        let index = RouteIndex::new(route);
        let lists = StopLists {
            fuel_stops: self.collect(route, &index, fuel_plan(trip)).await,
            hotel_stops: self.collect(route, &index, hotel_plan(trip)).await,
            restaurant_stops: self.collect(route, &index, restaurant_plan(trip)).await,
            camping_stops: self.collect(route, &index, camping_plan(trip)).await,
            attraction_stops: self.collect(route, &index, attraction_plan(trip)).await,
        };
        tracing::info!(
            "planned {} stops over {:.0} mi (fuel={}, hotel={}, restaurant={}, camping={}, attraction={})",
            lists.len(),
            route.total_distance_miles,
            lists.fuel_stops.len(),
            lists.hotel_stops.len(),
            lists.restaurant_stops.len(),
            lists.camping_stops.len(),
            lists.attraction_stops.len()
        );
        lists
    }

    async fn collect(
        &self,
        route: &RouteGeometry,
        index: &RouteIndex,
        plan: CategoryPlan<'_>,
    ) -> Vec<Stop> {
        let samples = sample_points(route, plan.cadence);
        let mut stops = Vec::with_capacity(samples.len());

        for sample in &samples {
            let found = self
                .resolver
                .find_place(
                    sample.coordinate,
                    plan.category,
                    search_radius_meters(plan.category),
                    plan.keyword,
                )
                .await;

            match found {
                Some(place) if matches_sub_type(&place.category_tags, plan.required_type) => {
                    stops.push(stop_from_place(sample, index, &plan, place));
                }
                Some(place) => {
                    tracing::debug!(
                        "dropping {} stop {}: '{}' tags {:?} do not match {:?}",
                        plan.category.as_str(),
                        sample.ordinal,
                        place.name,
                        place.category_tags,
                        plan.required_type
                    );
                }
                None if plan.on_miss == OnMiss::Placeholder => {
                    tracing::warn!(
                        "no {} near mile {}, emitting placeholder",
                        plan.category.as_str(),
                        sample.distance_from_start_miles
                    );
                    stops.push(placeholder_stop(sample, plan.category));
                }
                None => {
                    tracing::debug!(
                        "no {} near mile {}",
                        plan.category.as_str(),
                        sample.distance_from_start_miles
                    );
                }
            }
        }

        tracing::debug!(
            "{}: {} of {} sample points resolved",
            plan.category.as_str(),
            stops.len(),
            samples.len()
        );
        stops
    }
}

fn fuel_plan(trip: &TripParameters) -> CategoryPlan<'static> {
    CategoryPlan {
        category: PlaceCategory::GasStation,
        cadence: Cadence::FuelRange(trip.fuel_range_miles),
        keyword: None,
        required_type: None,
        on_miss: OnMiss::Placeholder,
    }
}

fn hotel_plan(trip: &TripParameters) -> CategoryPlan<'static> {
    CategoryPlan {
        category: PlaceCategory::Lodging,
        cadence: Cadence::DailyBudget(trip.miles_per_day),
        keyword: trip.preferred_lodging.code(),
        required_type: None,
        on_miss: OnMiss::Omit,
    }
}

fn restaurant_plan(trip: &TripParameters) -> CategoryPlan<'static> {
    let code = trip.preferred_restaurant.code();
    CategoryPlan {
        category: PlaceCategory::Restaurant,
        cadence: Cadence::FixedInterval(RESTAURANT_INTERVAL_MILES),
        keyword: code,
        required_type: code,
        on_miss: OnMiss::Omit,
    }
}

fn camping_plan(trip: &TripParameters) -> CategoryPlan<'static> {
    CategoryPlan {
        category: PlaceCategory::Campground,
        cadence: Cadence::DailyBudget(trip.miles_per_day),
        keyword: None,
        required_type: None,
        on_miss: OnMiss::Omit,
    }
}

fn attraction_plan(trip: &TripParameters) -> CategoryPlan<'static> {
    let code = trip.preferred_attraction.code();
    CategoryPlan {
        category: PlaceCategory::Attraction,
        cadence: Cadence::FixedInterval(ATTRACTION_INTERVAL_MILES),
        keyword: code,
        required_type: code,
        on_miss: OnMiss::Omit,
    }
}

fn stop_from_place(
    sample: &SamplePoint,
    index: &RouteIndex,
    plan: &CategoryPlan<'_>,
    place: PlaceMatch,
) -> Stop {
    let sub_type = plan
        .keyword
        .map(str::to_owned)
        .or_else(|| match plan.category {
            PlaceCategory::Attraction => place.category_tags.first().cloned(),
            _ => None,
        });

    Stop {
        category: plan.category,
        location: place.location,
        distance_from_start_miles: sample.distance_from_start_miles,
        detour_miles: index.detour_miles(place.location),
        name: place.name,
        address: Some(place.address).filter(|a| !a.is_empty()),
        rating: place.rating,
        website: place.website,
        phone_number: place.phone_number,
        sub_type,
        placeholder: false,
    }
}

fn placeholder_stop(sample: &SamplePoint, category: PlaceCategory) -> Stop {
    Stop {
        category,
        location: sample.coordinate,
        distance_from_start_miles: sample.distance_from_start_miles,
        name: format!("Gas Station Stop {}", sample.ordinal),
        address: None,
        rating: None,
        website: None,
        phone_number: None,
        sub_type: None,
        detour_miles: Some(0.0),
        placeholder: true,
    }
}
