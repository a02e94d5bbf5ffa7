pub use shared::{
    ApiError, AttractionType, Coordinate, LodgingType, NearbyPlace, NearbyRequest,
    NearbyResponse, PlaceCategory, PlaceMatch, PlanRequest, PlanResponse, Preferences,
    RestaurantType, RouteGeometry, Stop, StopLists, StopsRequest, TripParameters,
};
