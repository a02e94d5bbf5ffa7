use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Builds a coordinate from a GeoJSON-ordered `[lon, lat]` pair.
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lon: pair[0],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

/// Kind of point of interest a stop resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    GasStation,
    Lodging,
    Restaurant,
    Campground,
    Attraction,
}

impl PlaceCategory {
    pub const ALL: [PlaceCategory; 5] = [
        PlaceCategory::GasStation,
        PlaceCategory::Lodging,
        PlaceCategory::Restaurant,
        PlaceCategory::Campground,
        PlaceCategory::Attraction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::GasStation => "gas_station",
            PlaceCategory::Lodging => "lodging",
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Campground => "campground",
            PlaceCategory::Attraction => "attraction",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LodgingType {
    #[default]
    Any,
    Hotel,
    Motel,
    Inn,
    BedAndBreakfast,
    Resort,
    Hostel,
    Cabin,
}

impl LodgingType {
    /// Free-text keyword passed to the places provider, `None` for `Any`.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            LodgingType::Any => None,
            LodgingType::Hotel => Some("hotel"),
            LodgingType::Motel => Some("motel"),
            LodgingType::Inn => Some("inn"),
            LodgingType::BedAndBreakfast => Some("bed_and_breakfast"),
            LodgingType::Resort => Some("resort"),
            LodgingType::Hostel => Some("hostel"),
            LodgingType::Cabin => Some("cabin"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantType {
    #[default]
    Any,
    American,
    Italian,
    Mexican,
    Chinese,
    Japanese,
    Thai,
    Indian,
    Barbecue,
    Diner,
    SteakHouse,
    Pizza,
    Seafood,
    Cafe,
    FastFood,
}

impl RestaurantType {
    pub fn code(&self) -> Option<&'static str> {
        match self {
            RestaurantType::Any => None,
            RestaurantType::American => Some("american"),
            RestaurantType::Italian => Some("italian"),
            RestaurantType::Mexican => Some("mexican"),
            RestaurantType::Chinese => Some("chinese"),
            RestaurantType::Japanese => Some("japanese"),
            RestaurantType::Thai => Some("thai"),
            RestaurantType::Indian => Some("indian"),
            RestaurantType::Barbecue => Some("barbecue"),
            RestaurantType::Diner => Some("diner"),
            RestaurantType::SteakHouse => Some("steak_house"),
            RestaurantType::Pizza => Some("pizza"),
            RestaurantType::Seafood => Some("seafood"),
            RestaurantType::Cafe => Some("cafe"),
            RestaurantType::FastFood => Some("fast_food"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttractionType {
    #[default]
    Any,
    Museum,
    Park,
    HistoricSite,
    ScenicViewpoint,
    Landmark,
    AmusementPark,
    Zoo,
    Aquarium,
    ArtGallery,
    Winery,
}

impl AttractionType {
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AttractionType::Any => None,
            AttractionType::Museum => Some("museum"),
            AttractionType::Park => Some("park"),
            AttractionType::HistoricSite => Some("historic_site"),
            AttractionType::ScenicViewpoint => Some("scenic_viewpoint"),
            AttractionType::Landmark => Some("landmark"),
            AttractionType::AmusementPark => Some("amusement_park"),
            AttractionType::Zoo => Some("zoo"),
            AttractionType::Aquarium => Some("aquarium"),
            AttractionType::ArtGallery => Some("art_gallery"),
            AttractionType::Winery => Some("winery"),
        }
    }
}

/// The user-selectable refinements that drive stop recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub lodging: LodgingType,
    #[serde(default)]
    pub restaurant: RestaurantType,
    #[serde(default)]
    pub attraction: AttractionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripParameters {
    #[serde(default)]
    pub start_point: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default = "default_fuel_range")]
    pub fuel_range_miles: f64,
    #[serde(default = "default_miles_per_day")]
    pub miles_per_day: f64,
    #[serde(default)]
    pub preferred_lodging: LodgingType,
    #[serde(default)]
    pub preferred_restaurant: RestaurantType,
    #[serde(default)]
    pub preferred_attraction: AttractionType,
}

impl TripParameters {
    pub fn preferences(&self) -> Preferences {
        Preferences {
            lodging: self.preferred_lodging,
            restaurant: self.preferred_restaurant,
            attraction: self.preferred_attraction,
        }
    }

    pub fn with_preferences(mut self, prefs: Preferences) -> Self {
        self.preferred_lodging = prefs.lodging;
        self.preferred_restaurant = prefs.restaurant;
        self.preferred_attraction = prefs.attraction;
        self
    }
}

impl Default for TripParameters {
    fn default() -> Self {
        Self {
            start_point: String::new(),
            destination: String::new(),
            fuel_range_miles: default_fuel_range(),
            miles_per_day: default_miles_per_day(),
            preferred_lodging: LodgingType::Any,
            preferred_restaurant: RestaurantType::Any,
            preferred_attraction: AttractionType::Any,
        }
    }
}

pub fn default_fuel_range() -> f64 {
    150.0
}

pub fn default_miles_per_day() -> f64 {
    300.0
}

/// Driving path returned by the directions provider, converted to miles/hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub coordinates: Vec<Coordinate>,
    pub total_distance_miles: f64,
    pub total_duration_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMatch {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub location: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub category: PlaceCategory,
    pub location: Coordinate,
    pub distance_from_start_miles: f64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// Straight-line distance from the place to the closest route vertex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detour_miles: Option<f64>,
    /// Synthetic stop emitted when no real place could be resolved.
    #[serde(default)]
    pub placeholder: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopLists {
    pub fuel_stops: Vec<Stop>,
    pub hotel_stops: Vec<Stop>,
    pub restaurant_stops: Vec<Stop>,
    pub camping_stops: Vec<Stop>,
    pub attraction_stops: Vec<Stop>,
}

impl StopLists {
    pub fn get(&self, category: PlaceCategory) -> &[Stop] {
        match category {
            PlaceCategory::GasStation => &self.fuel_stops,
            PlaceCategory::Lodging => &self.hotel_stops,
            PlaceCategory::Restaurant => &self.restaurant_stops,
            PlaceCategory::Campground => &self.camping_stops,
            PlaceCategory::Attraction => &self.attraction_stops,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stop> {
        PlaceCategory::ALL
            .into_iter()
            .flat_map(move |category| self.get(category).iter())
    }

    pub fn len(&self) -> usize {
        PlaceCategory::ALL
            .iter()
            .map(|category| self.get(*category).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub trip: TripParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Coordinate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub route: RouteGeometry,
    pub stops: StopLists,
    pub gpx_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopsRequest {
    pub route: RouteGeometry,
    pub trip: TripParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyRequest {
    pub center: Coordinate,
    pub category: PlaceCategory,
    #[serde(default = "default_nearby_radius")]
    pub radius_miles: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

pub fn default_nearby_radius() -> f64 {
    25.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyPlace {
    #[serde(flatten)]
    pub place: PlaceMatch,
    pub distance_miles: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub places: Vec<NearbyPlace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_default_to_any() {
        let trip: TripParameters = serde_json::from_str(r#"{"destination": "Moab, UT"}"#).unwrap();
        assert_eq!(trip.preferences(), Preferences::default());
        assert_eq!(trip.fuel_range_miles, 150.0);
        assert_eq!(trip.miles_per_day, 300.0);
    }

    #[test]
    fn sub_type_codes_match_wire_names() {
        let json = serde_json::to_string(&AttractionType::HistoricSite).unwrap();
        assert_eq!(json, "\"historic_site\"");
        assert_eq!(AttractionType::HistoricSite.code(), Some("historic_site"));
        assert_eq!(RestaurantType::Any.code(), None);
        assert_eq!(
            serde_json::to_string(&LodgingType::BedAndBreakfast).unwrap(),
            "\"bed_and_breakfast\""
        );
    }

    #[test]
    fn stop_lists_iterate_in_category_order() {
        let stop = |category| Stop {
            category,
            location: Coordinate::new(0.0, 0.0),
            distance_from_start_miles: 0.0,
            name: String::from("x"),
            address: None,
            rating: None,
            website: None,
            phone_number: None,
            sub_type: None,
            detour_miles: None,
            placeholder: false,
        };
        let lists = StopLists {
            fuel_stops: vec![stop(PlaceCategory::GasStation)],
            attraction_stops: vec![stop(PlaceCategory::Attraction)],
            ..Default::default()
        };
        let categories: Vec<_> = lists.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![PlaceCategory::GasStation, PlaceCategory::Attraction]
        );
        assert_eq!(lists.len(), 2);
    }

    #[test]
    fn from_lon_lat_swaps_order() {
        let c = Coordinate::from_lon_lat([-109.55, 38.57]);
        assert_eq!(c.lat, 38.57);
        assert_eq!(c.lon, -109.55);
        assert!(c.is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
    }
}
