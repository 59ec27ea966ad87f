use std::fmt;

/// Page-level location, carried in the URL hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `#/`
    Overview,
    /// `#/map/{region_id}`
    Region(String),
    /// `#/list/{region_id}`: the focused region's cities as a list.
    List(String),
    /// `#/city/{city_id}`
    City(String),
}

impl Route {
    /// Parse a location hash (with or without the leading `#`). Anything
    /// unrecognized maps to the overview.
    pub fn parse(hash: &str) -> Self {
        let path = hash.trim_start_matches('#').trim_start_matches('/');
        let mut parts = path.splitn(2, '/');
        match (parts.next(), parts.next()) {
            (Some("map"), Some(id)) if is_segment(id) => Route::Region(id.to_string()),
            (Some("list"), Some(id)) if is_segment(id) => Route::List(id.to_string()),
            (Some("city"), Some(id)) if is_segment(id) => Route::City(id.to_string()),
            _ => Route::Overview,
        }
    }

    pub fn to_hash(&self) -> String {
        self.to_string()
    }

    /// The region a map or list route focuses.
    pub fn region_id(&self) -> Option<&str> {
        match self {
            Route::Region(id) | Route::List(id) => Some(id),
            Route::Overview | Route::City(_) => None,
        }
    }
}

fn is_segment(id: &str) -> bool {
    !id.is_empty() && !id.contains('/')
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Overview => write!(f, "#/"),
            Route::Region(id) => write!(f, "#/map/{id}"),
            Route::List(id) => write!(f, "#/list/{id}"),
            Route::City(id) => write!(f, "#/city/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse("#/"), Route::Overview);
        assert_eq!(Route::parse(""), Route::Overview);
        assert_eq!(Route::parse("#/map/jeju"), Route::Region("jeju".into()));
        assert_eq!(Route::parse("map/jeju"), Route::Region("jeju".into()));
        assert_eq!(Route::parse("#/city/suncheon"), Route::City("suncheon".into()));
        assert_eq!(Route::parse("#/list/jeonnam"), Route::List("jeonnam".into()));
    }

    #[test]
    fn map_and_list_routes_share_a_region() {
        assert_eq!(Route::parse("#/map/jeonnam").region_id(), Some("jeonnam"));
        assert_eq!(Route::parse("#/list/jeonnam").region_id(), Some("jeonnam"));
        assert_eq!(Route::parse("#/list/").region_id(), None);
        assert_eq!(Route::City("yeosu".into()).region_id(), None);
        assert_eq!(Route::Overview.region_id(), None);
    }

    #[test]
    fn malformed_routes_fall_back_to_overview() {
        assert_eq!(Route::parse("#/map/"), Route::Overview);
        assert_eq!(Route::parse("#/map/a/b"), Route::Overview);
        assert_eq!(Route::parse("#/list/a/b"), Route::Overview);
        assert_eq!(Route::parse("#/login"), Route::Overview);
    }

    #[test]
    fn formats_as_hash() {
        assert_eq!(Route::Overview.to_hash(), "#/");
        assert_eq!(Route::Region("gangwon".into()).to_hash(), "#/map/gangwon");
        assert_eq!(Route::List("gangwon".into()).to_hash(), "#/list/gangwon");
        assert_eq!(Route::parse(&Route::City("yeosu".into()).to_hash()), Route::City("yeosu".into()));
    }
}
