use tripmap_shared::{NavigatorEvents, PointOfInterest, Region, Route};

pub fn current_route() -> Route {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .map(|hash| Route::parse(&hash))
        .unwrap_or(Route::Overview)
}

pub fn push_route(route: &Route) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let hash = route.to_hash();
    let location = window.location();
    if location.hash().ok().as_deref() == Some(hash.as_str()) {
        return;
    }
    if let Err(err) = location.set_hash(&hash) {
        tracing::warn!(%hash, ?err, "failed to update location hash");
    }
}

/// Mirrors navigator notifications into the URL hash.
#[derive(Debug, Default)]
pub struct HashRouter;

impl NavigatorEvents for HashRouter {
    fn region_selected(&mut self, region: &Region) {
        // A list route for the same region already says where we are.
        if current_route().region_id() == Some(region.id.as_str()) {
            return;
        }
        push_route(&Route::Region(region.id.clone()));
    }

    fn city_selected(&mut self, city: &PointOfInterest) {
        tracing::info!(city = %city.id, name = %city.name, "city chosen");
        push_route(&Route::City(city.id.clone()));
    }

    fn back(&mut self) {
        push_route(&Route::Overview);
    }
}
